//! Typed value decoding: VR-dispatched conversions from raw
//! value bytes into scalars, vectors and normalized string views.

pub mod person_name;
pub mod primitive;

pub use primitive::{string_trim_class, vm_of, StringTrim};
