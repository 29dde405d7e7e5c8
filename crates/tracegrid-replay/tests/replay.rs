//! End-to-end replay sessions over real files.

#![allow(clippy::unwrap_used)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracegrid_grid::FormatPolicy;
use tracegrid_model::ModelError;
use tracegrid_replay::config::{LogsConfig, ModelConfig, OutputConfig, TimeConfig};
use tracegrid_replay::{OutputMode, ReplayConfig, ReplayError, ReplaySession, WriterSink};
use tracegrid_types::{ExtentError, SimTime};

const LIFE_MA: &str = "\
[top]
components : life

[life]
type : cell
width : 3
height : 2
initialrowvalue : 0 100 1 0x0
neighborports : alive
";

const LOG_A: &str = "\
Mensaje I / 00:00:00:000 / Root(00) para top(01)
Mensaje Y / 00:00:00:100 / life(0,1)(3) / out /      1.000 para life(02)
Mensaje Y / 00:00:00:300 / life(1,1)(3) / out /      5.000 para life(02)
";

const LOG_B: &str = "\
Mensaje X / 00:00:00:050 / life(0,0)(1) / out /      9.000 para life(02)
Mensaje Y / 00:00:00:200 / life(0,0)(1) / out /      0.000 para life(02)
Mensaje Y / 00:00:00:250 / life(1,0)(1) / out_alive /      7.000 para life(02)
";

fn workspace() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("life.ma"), LIFE_MA).unwrap();
    fs::write(dir.path().join("a.log"), LOG_A).unwrap();
    fs::write(dir.path().join("b.log"), LOG_B).unwrap();
    dir
}

fn config(dir: &Path, mode: OutputMode) -> ReplayConfig {
    ReplayConfig {
        model: ModelConfig {
            name: "life".to_owned(),
            descriptor: dir.join("life.ma"),
            port: None,
        },
        logs: LogsConfig {
            files: vec![dir.join("a.log"), dir.join("b.log")],
            index: None,
        },
        time: TimeConfig::default(),
        output: OutputConfig {
            mode,
            format: FormatPolicy {
                width: 2,
                precision: 0,
                print_zero: false,
            },
            flat_plane: 0,
        },
        ..ReplayConfig::default()
    }
}

fn replay(config: &ReplayConfig) -> Result<String, ReplayError> {
    let mut session = ReplaySession::open(config)?;
    let mut sink = WriterSink::new(Vec::new(), config.output.format.clone(), config.render_mode());
    session.run(&mut sink)?;
    Ok(String::from_utf8(sink.into_inner()).unwrap())
}

#[test]
fn framed_replay_of_two_streams() {
    let dir = workspace();
    let text = replay(&config(dir.path(), OutputMode::Framed)).unwrap();

    let expected = "\
Line : 1 - Time: 00:00:00:000
     0 1 2
   +------+
  0| 1    |
  1|   ?  |
   +------+
Line : 2 - Time: 00:00:00:100
     0 1 2
   +------+
  0| 1 1  |
  1|   ?  |
   +------+
Line : 3 - Time: 00:00:00:200
     0 1 2
   +------+
  0|   1  |
  1|   ?  |
   +------+
Line : 4 - Time: 00:00:00:300
     0 1 2
   +------+
  0|   1  |
  1|   5  |
   +------+
";
    assert_eq!(text, expected);
}

#[test]
fn fixed_interval_groups_events() {
    let dir = workspace();
    let mut cfg = config(dir.path(), OutputMode::Flat);
    cfg.time = TimeConfig {
        initial: SimTime::ZERO,
        interval: Some(SimTime::from_millis(150)),
    };
    let text = replay(&cfg).unwrap();
    // Show-times 0, 150 and 300.
    assert_eq!(text, "\n 1    \n   ?  \n\n 1 1  \n   ?  \n\n   1  \n   5  \n");
}

#[test]
fn neighbor_port_replays_tagged_events() {
    let dir = workspace();
    let mut cfg = config(dir.path(), OutputMode::Json);
    cfg.model.port = Some("Alive".to_owned());
    let text = replay(&cfg).unwrap();

    let snapshots: Vec<serde_json::Value> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(snapshots.len(), 2);
    let last = snapshots.last().unwrap();
    assert_eq!(last["time"], "00:00:00:250");
    assert_eq!(
        last["cells"],
        serde_json::json!([1.0, 0.0, 0.0, 7.0, null, 0.0])
    );
}

#[test]
fn log_index_selects_model_streams() {
    let dir = workspace();
    let index = dir.path().join("run.idx");
    fs::write(&index, "[logfiles]\nlife : a.log b.log\n").unwrap();
    let mut cfg = config(dir.path(), OutputMode::Json);
    cfg.logs = LogsConfig {
        files: Vec::new(),
        index: Some(index),
    };
    let text = replay(&cfg).unwrap();
    assert_eq!(text.lines().count(), 4);
}

#[test]
fn coupled_model_output_is_skipped() {
    let dir = workspace();
    fs::write(
        dir.path().join("a.log"),
        "\
Mensaje Y / 00:00:00:100 / life(0,1)(3) / out /      1.000 para life(02)
Mensaje Y / 00:00:00:150 / life(02) / out /      4.000 para top(01)
Mensaje Y / 00:00:00:300 / life(1,1)(3) / out /      5.000 para life(02)
",
    )
    .unwrap();
    let text = replay(&config(dir.path(), OutputMode::Json)).unwrap();

    let snapshots: Vec<serde_json::Value> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    let times: Vec<&str> = snapshots
        .iter()
        .map(|s| s["time"].as_str().unwrap())
        .collect();
    assert_eq!(
        times,
        ["00:00:00:000", "00:00:00:100", "00:00:00:200", "00:00:00:300"]
    );
    assert_eq!(
        snapshots.last().unwrap()["cells"],
        serde_json::json!([0.0, 1.0, 0.0, 0.0, 5.0, 0.0])
    );
}

#[test]
fn zero_width_is_rejected_before_output() {
    let dir = workspace();
    fs::write(
        dir.path().join("life.ma"),
        "[life]\nwidth : 0\nheight : 2\ninitialvalue : 0\n",
    )
    .unwrap();
    let err = replay(&config(dir.path(), OutputMode::Framed)).unwrap_err();
    assert!(matches!(
        err,
        ReplayError::Model(ModelError::Extent {
            source: ExtentError::ZeroDimension { .. },
            ..
        })
    ));
}

#[test]
fn undeclared_port_is_fatal() {
    let dir = workspace();
    let mut cfg = config(dir.path(), OutputMode::Framed);
    cfg.model.port = Some("temp".to_owned());
    let err = replay(&cfg).unwrap_err();
    assert!(matches!(
        err,
        ReplayError::Model(ModelError::UndeclaredPort { .. })
    ));
}

#[test]
fn missing_log_file_is_fatal() {
    let dir = workspace();
    let mut cfg = config(dir.path(), OutputMode::Framed);
    cfg.logs.files.push(PathBuf::from("/nonexistent/c.log"));
    let err = replay(&cfg).unwrap_err();
    assert!(matches!(err, ReplayError::OpenLog { .. }));
}

#[test]
fn flat_plane_must_exist() {
    let dir = workspace();
    fs::write(
        dir.path().join("life.ma"),
        "[life]\ndim : (2, 2, 3)\ninitialvalue : 1\n",
    )
    .unwrap();
    let mut cfg = config(dir.path(), OutputMode::Flat);
    cfg.output.flat_plane = 3;
    let err = replay(&cfg).unwrap_err();
    assert!(matches!(err, ReplayError::Grid(_)));

    cfg.output.flat_plane = 2;
    cfg.logs.files.clear();
    let empty = dir.path().join("empty.log");
    fs::write(&empty, "").unwrap();
    cfg.logs.files.push(empty);
    assert_eq!(replay(&cfg).unwrap(), "\n 1 1\n 1 1\n");
}
