//! The stateful element walker: header decoding, lazy materialization, and
//! sequence/pixel-data reconstruction on top of `dcm-core`'s data model.
//!
//! `dcm-object` drives this crate to turn a [`dcm_core::Stream`] into a
//! fully or partially populated [`dcm_core::DataSet`]; this crate has no
//! opinion on file-meta groups, preambles, or transfer-syntax resolution.

pub mod dataset_reader;
pub mod error;
pub mod header;
pub mod headerless;
pub mod pixel_sequence;

pub use dataset_reader::{ensure_loaded, parse_dataset};
pub use error::{Error, Result};
pub use header::{read_element_header, ElementHeader, UNDEFINED_LENGTH};
pub use headerless::detect_headerless_syntax;
