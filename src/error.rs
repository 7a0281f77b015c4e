//! Error taxonomy for database loading and response decoding.
//!
//! Load-time errors abort the load of the current object; decode-time errors
//! abort the current top-level decode. Caches only ever hold successfully
//! loaded records, so a failed load leaves no partial state behind.
//! User-visible messages carry the identifiers (object id, pool id, trouble
//! code, scale label) needed to locate the offending entry in a dump.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("cannot find key file \"{0}\"")]
    KeyfileNotFound(PathBuf),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Reference(#[from] ReferenceError),

    #[error(transparent)]
    Constraint(#[from] ConstraintError),

    #[error(transparent)]
    Semantic(#[from] SemanticError),
}

/// Structural violations of the on-disk formats.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("key length not 4 ({0})")]
    BadKeyLength(usize),

    #[error("duplicate key {key:#010X} in pool records")]
    DuplicateKey { key: u32 },

    #[error("invalid record data length: {0}")]
    BadRecordLength(usize),

    #[error("decompression failed: {0}")]
    Inflate(String),

    #[error("wrong object data length ({got} vs {expected})")]
    DataLengthMismatch { got: usize, expected: usize },

    #[error("duplicate hash {hash:#010X} while loading {table} strings (\"{existing}\")")]
    DuplicateStringHash {
        hash: u32,
        table: char,
        existing: String,
    },

    #[error("cannot read {wanted} bytes, only have {available}")]
    StreamOverrun { wanted: usize, available: usize },

    #[error("invalid object existence flag value ({0})")]
    BadExistenceFlag(u8),

    #[error("native string ({0}) might be hash")]
    NativeStringHash(char),

    #[error("unknown object type {tag:#06X}, cannot load (size {size})")]
    UnknownObjectType { tag: u16, size: usize },

    #[error("no loader for object type {name} ({tag:#06X})")]
    UnsupportedObjectType { tag: u16, name: &'static str },

    #[error("invalid {name} enum value ({value:#06X})")]
    UnknownEnumValue { name: &'static str, value: u32 },
}

/// Cross-pool reference resolution failures.
#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("object {object_id:?} (hash {hash:#010X}) not present in pool {pool_id:?}")]
    ObjectNotFound {
        pool_id: String,
        object_id: String,
        hash: u32,
    },

    #[error("could not find DOP reference: {object_id}")]
    DopNotFound { object_id: String },
}

/// Value-range violations detected while decoding a response.
#[derive(Debug, Error)]
pub enum ConstraintError {
    #[error("{which} value {value} is lower than ({kind}) {scope} lower limit {limit}")]
    BelowLowerLimit {
        which: &'static str,
        scope: &'static str,
        kind: &'static str,
        value: String,
        limit: String,
    },

    #[error("{which} value {value} is higher than ({kind}) {scope} upper limit {limit}")]
    AboveUpperLimit {
        which: &'static str,
        scope: &'static str,
        kind: &'static str,
        value: String,
        limit: String,
    },

    #[error("{which} value {value} falls in scale constraint with validity {validity} (label: {label})")]
    InvalidScale {
        which: &'static str,
        value: String,
        validity: String,
        label: String,
    },
}

/// Load- or decode-time invariant violations in the description data.
///
/// The builder demotes a documented subset of these to `DataNode::Invalid`
/// so callers can still report the rest of the graph.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct SemanticError(pub String);

/// Shorthand for the free-form semantic errors raised all over the loaders
/// and the decoder.
macro_rules! semantic {
    ($($arg:tt)*) => {
        $crate::error::Error::Semantic($crate::error::SemanticError(format!($($arg)*)))
    };
}
pub(crate) use semantic;
