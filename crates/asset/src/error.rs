//! Errors raised while loading, building and exporting mesh assets.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Which raw array a face index points into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Attribute {
    Position,
    Normal,
    Uv,
    Material,
    /// An id into an already-built vertex list.
    Vertex,
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Attribute::Position => "position",
            Attribute::Normal => "normal",
            Attribute::Uv => "uv",
            Attribute::Material => "material",
            Attribute::Vertex => "vertex",
        })
    }
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("File not found: {}", path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("I/O error on '{source_name}': {source}")]
    Io {
        source_name: String,
        #[source]
        source: io::Error,
    },
    #[error("Malformed line {line} in '{source_name}': {reason}")]
    MalformedLine {
        source_name: String,
        line: usize,
        reason: String,
    },
    #[error("Malformed face on line {line} in '{source_name}': {reason}")]
    MalformedFace {
        source_name: String,
        line: usize,
        reason: String,
    },
    #[error(
        "Face on line {line} in '{source_name}' references {attribute} {index} (1-based), but only {len} exist"
    )]
    /// `line` is 0 when the reference did not come from a face line.
    OutOfRange {
        source_name: String,
        line: usize,
        attribute: Attribute,
        index: usize,
        len: usize,
    },
    #[error("Invalid material on line {line} in '{source_name}': {reason}")]
    InvalidMaterialLine {
        source_name: String,
        line: usize,
        reason: String,
    },
    #[error("Too many {what} in '{source_name}' ({count} > {})", u32::MAX)]
    TooMany {
        source_name: String,
        what: &'static str,
        count: usize,
    },
    #[error("Frame '{source_name}' does not match base layout: expected {expected} vertices, found {found}")]
    FrameMismatch {
        source_name: String,
        expected: usize,
        found: usize,
    },
}

pub type AssetResult<T> = Result<T, AssetError>;

impl AssetError {
    /// Map an `open` failure: missing files become [`AssetError::NotFound`].
    pub(crate) fn open(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            AssetError::NotFound { path, source }
        } else {
            AssetError::Io {
                source_name: path.display().to_string(),
                source,
            }
        }
    }

    pub(crate) fn io(source_name: &str, source: io::Error) -> Self {
        AssetError::Io {
            source_name: source_name.to_owned(),
            source,
        }
    }

    /// 1-based line number, when the error is tied to one.
    pub fn line(&self) -> Option<usize> {
        match self {
            AssetError::MalformedLine { line, .. }
            | AssetError::MalformedFace { line, .. }
            | AssetError::OutOfRange { line, .. }
            | AssetError::InvalidMaterialLine { line, .. } => Some(*line),
            _ => None,
        }
    }
}
