//! Pixel decoder orchestrator: metadata extraction, backend selection, and
//! the raw/RLE/JPEG-family decode paths that fill a caller's destination
//! buffer with decoded frame bytes.
//!
//! This crate decodes from a borrowed [`dcm_core::DataSet`] rather than
//! `dcm-object`'s `DicomFile` wrapper, so the file-level facade can depend
//! on this crate for its pixel shortcuts without a dependency cycle.

pub mod decode;
pub mod error;
pub mod format;
pub mod options;
pub mod pixel_info;
pub mod raw;
pub mod rescale;

pub use decode::{decode_into, decode_pixels};
pub use error::{Error, Result};
pub use options::{DecodeOptions, HtJ2kBackend, OutputFormat, OutputLayout};
pub use pixel_info::{extract as pixel_info, PixelInfo, SvDtype};
pub use rescale::{resolve_scaling, Scaling};
