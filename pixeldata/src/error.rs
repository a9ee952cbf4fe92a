//! The pixel decoder's narrow, boundary-facing error taxonomy.
//!
//! Deeper failures (header decode errors, codec errors) are funneled into
//! one of these variants rather than exposed verbatim, so callers can
//! dispatch on a small closed set.

use snafu::Snafu;

use dcm_core::Tag;

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("{source}"))]
    Core { source: dcm_core::Error },

    #[snafu(display("frame index {index} is out of range (0..{frame_count})"))]
    InvalidFrame { index: usize, frame_count: usize },

    #[snafu(display("tag {tag} is missing or empty, required for pixel decoding"))]
    MissingElement { tag: Tag },

    #[snafu(display("transfer syntax {uid} has no pixel decoder backend"))]
    UnsupportedTransferSyntax { uid: String },

    #[snafu(display(
        "destination buffer is too small or misaligned: need {needed} bytes at alignment {alignment}, got {available}"
    ))]
    InsufficientBuffer {
        needed: usize,
        available: usize,
        alignment: usize,
    },

    #[snafu(display("pixel data stream is malformed: {reason}"))]
    CorruptStream { reason: String },

    #[snafu(display("codec failure decoding frame {frame}: {message}"))]
    CodecFailure { frame: usize, message: String },
}

impl From<dcm_core::Error> for Error {
    fn from(source: dcm_core::Error) -> Error {
        Error::Core { source }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
