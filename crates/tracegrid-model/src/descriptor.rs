//! Model descriptor lookups and the `.ma` file reader.
//!
//! The replay engine only ever asks two questions of a descriptor: does a
//! model define a key, and what is the key's ordered token list. The
//! [`ModelDescriptor`] trait captures exactly that, so the loader works
//! against any source of definitions.
//!
//! [`MaFile`] reads the section-based text format:
//!
//! ```text
//! [life]
//! width : 20
//! height : 20
//! initialvalue : 0      % comment
//! neighborports : alive temp
//! ```
//!
//! Section names and keys are case-insensitive. A key repeated within a
//! section appends its tokens to the earlier ones.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::ModelError;

/// Starts a comment that runs to the end of the line.
const COMMENT: char = '%';

/// Read-only access to a model descriptor.
pub trait ModelDescriptor {
    /// The ordered tokens of `key` in `model`'s section, if defined.
    fn definition(&self, model: &str, key: &str) -> Option<&[String]>;

    /// Whether `model`'s section defines `key`.
    fn exists(&self, model: &str, key: &str) -> bool {
        self.definition(model, key).is_some()
    }

    /// The first token of `key`, if defined and non-empty.
    fn first(&self, model: &str, key: &str) -> Option<&str> {
        self.definition(model, key)
            .and_then(<[String]>::first)
            .map(String::as_str)
    }

    /// Directory against which relative file references are resolved.
    fn base_dir(&self) -> Option<&Path> {
        None
    }
}

/// A parsed `.ma` model descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaFile {
    /// Section name -> key -> tokens, all names lower-cased.
    sections: BTreeMap<String, BTreeMap<String, Vec<String>>>,
    /// Directory of the file the descriptor was read from.
    base_dir: Option<PathBuf>,
}

impl MaFile {
    /// Parse descriptor text.
    ///
    /// Lines before the first `[section]` header and lines without a `:`
    /// separator are ignored.
    pub fn parse(text: &str) -> Self {
        let mut sections: BTreeMap<String, BTreeMap<String, Vec<String>>> = BTreeMap::new();
        let mut current: Option<String> = None;

        for raw in text.lines() {
            let line = raw.split(COMMENT).next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }

            if let Some(name) = line
                .strip_prefix('[')
                .and_then(|rest| rest.strip_suffix(']'))
            {
                let name = name.trim().to_lowercase();
                sections.entry(name.clone()).or_default();
                current = Some(name);
                continue;
            }

            let Some(section) = current.as_ref() else {
                continue;
            };
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };

            sections
                .entry(section.clone())
                .or_default()
                .entry(key.trim().to_lowercase())
                .or_default()
                .extend(value.split_whitespace().map(str::to_owned));
        }

        Self {
            sections,
            base_dir: None,
        }
    }

    /// Read and parse a descriptor file.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Io`] if the file cannot be read.
    pub fn from_file(path: &Path) -> Result<Self, ModelError> {
        let text = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            context: "given as model descriptor".to_owned(),
            source,
        })?;
        let mut file = Self::parse(&text);
        file.base_dir = path.parent().map(Path::to_path_buf);
        Ok(file)
    }

    /// Names of every section, in sorted order.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }
}

impl ModelDescriptor for MaFile {
    fn definition(&self, model: &str, key: &str) -> Option<&[String]> {
        self.sections
            .get(&model.to_lowercase())?
            .get(&key.to_lowercase())
            .map(Vec::as_slice)
    }

    fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }
}

/// Concatenate tokens without separators, e.g. `["(10,", "10)"]` -> `"(10,10)"`.
pub fn join(tokens: &[String]) -> String {
    tokens.concat()
}

/// Resolve a file reference from a descriptor.
///
/// The reference is trimmed. A relative path is looked up next to the
/// descriptor first and used as given when it is not found there.
pub fn resolve_path(descriptor: &dyn ModelDescriptor, reference: &str) -> PathBuf {
    let path = PathBuf::from(reference.trim());
    if path.is_relative()
        && let Some(dir) = descriptor.base_dir()
    {
        let candidate = dir.join(&path);
        if candidate.exists() {
            return candidate;
        }
    }
    path
}
