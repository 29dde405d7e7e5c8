//! Grid extent resolution from a model descriptor.
//!
//! Planar models declare `width` and `height`; the extent is then
//! `(height, width)` so coordinates read `(row, col)`. Models of any rank
//! declare `dim : (d0, d1, ...)` instead. `width` wins when both exist.

use tracegrid_types::{Extent, codec};

use crate::descriptor::{self, ModelDescriptor};
use crate::error::ModelError;

/// Determine the grid extent of `model`.
///
/// # Errors
///
/// Returns [`ModelError::MissingDimension`] if neither `width` nor `dim` is
/// defined, [`ModelError::MissingKey`] if `width` lacks `height`,
/// [`ModelError::InvalidDimension`] or [`ModelError::Codec`] for
/// unparseable sizes, and [`ModelError::Extent`] if any size is zero.
pub fn resolve_extent(desc: &dyn ModelDescriptor, model: &str) -> Result<Extent, ModelError> {
    let dims = if desc.exists(model, "width") {
        let cols = dimension(desc, model, "width")?;
        let rows = dimension(desc, model, "height")?;
        vec![rows, cols]
    } else if let Some(tokens) = desc.definition(model, "dim") {
        codec::parse_coordinate(&descriptor::join(tokens))?
            .components()
            .to_vec()
    } else {
        return Err(ModelError::MissingDimension {
            model: model.to_owned(),
        });
    };

    Extent::new(dims).map_err(|source| ModelError::Extent {
        model: model.to_owned(),
        source,
    })
}

fn dimension(desc: &dyn ModelDescriptor, model: &str, key: &str) -> Result<usize, ModelError> {
    let token = desc.first(model, key).ok_or_else(|| ModelError::MissingKey {
        model: model.to_owned(),
        key: key.to_owned(),
    })?;
    token.parse().map_err(|_parse| ModelError::InvalidDimension {
        model: model.to_owned(),
        key: key.to_owned(),
        value: token.to_owned(),
    })
}
