//! The file-level facade: Part 10 preamble/magic detection, file-meta group
//! parsing, transfer-syntax resolution, deflate inflation, and the
//! [`DicomFile`] wrapper around a root [`dcm_core::DataSet`].

pub mod error;
pub mod file;
pub mod meta;

pub use error::{Error, Result};
pub use file::DicomFile;
pub use meta::FileMetaTable;
