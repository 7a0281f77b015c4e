//! Decoder for MCD/ODX-2D style ECU diagnostic description databases.
//!
//! A *project* is a directory of `.key`/`.db` pool pairs plus hashed string
//! pools. This crate loads the object graph stored in those pools, builds a
//! normalized description tree for a selected measurement, and decodes
//! captured diagnostic response payloads into named physical values.
//!
//! The pipeline, bottom up:
//!
//! - [`keyfile`] - cursor access to a pool's key file (injected driver).
//! - [`pool`] - record headers and zlib-compressed object blobs.
//! - [`strings`] - the ASCII/Unicode hashed string pools.
//! - [`stream`] - a length-checked typed cursor over one object blob.
//! - [`object`] - per-type loaders producing the raw tagged object model.
//! - [`resolver`] - cross-pool reference resolution with per-pool caches.
//! - [`descr`] - the normalized PARAMETER/DOP/STRUCTURE/FIELD/MUX/DTC tree.
//! - [`decode`] - bit extraction, computation methods, output rendering.
//! - [`project`] - drivers walking a project to its measurements.

pub mod decode;
pub mod descr;
pub mod error;
pub mod keyfile;
pub mod object;
pub mod pool;
pub mod project;
pub mod resolver;
pub mod stream;
pub mod strings;
pub mod translate;

pub use decode::{render, Decoder, OutNode};
pub use error::{Error, Result};
pub use project::{decode_mwb, dump_project, dump_projects, MwbRequest, Project};
pub use strings::StringStorage;
pub use translate::Translations;
