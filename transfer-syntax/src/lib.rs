//! Transfer syntax registry and pixel codec adapter wiring.
//!
//! This crate resolves a transfer syntax UID to its classification flags
//! and byte-order decoder (`registry`), inflates the deflated transfer
//! syntax's raw DEFLATE stream (`deflate`), and dispatches encapsulated
//! pixel data to the matching codec adapter (`adapters`).

pub mod adapters;
pub mod registry;

#[cfg(feature = "deflate")]
pub mod deflate;

pub use registry::{
    lookup, TransferSyntax, DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN, EXPLICIT_VR_BIG_ENDIAN, EXPLICIT_VR_LITTLE_ENDIAN,
    IMPLICIT_VR_LITTLE_ENDIAN,
};
