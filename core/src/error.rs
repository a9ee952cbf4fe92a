//! The error taxonomy shared across the workspace.

use snafu::Snafu;

use crate::tag::Tag;

/// Errors raised by `dcm-core` and propagated upward by every dependent
/// crate.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    /// Dictionary miss on a strict keyword lookup.
    #[snafu(display("unknown attribute keyword `{keyword}`"))]
    UnknownKeyword { keyword: String },

    /// Dictionary miss on a strict UID lookup.
    #[snafu(display("unknown UID `{text}`"))]
    UnknownUid { text: String },

    /// The stream ended inside a span that was declared to hold more bytes.
    #[snafu(display("unexpected end of stream: wanted {wanted} bytes, {available} available"))]
    UnexpectedEof { wanted: usize, available: usize },

    /// A random-access read fell (partially or fully) outside stream bounds.
    #[snafu(display("out of range: offset {offset} + length {length} exceeds stream end {end}"))]
    OutOfRangeSpan {
        offset: u64,
        length: u64,
        end: u64,
    },

    /// An explicit-VR slot was not a recognized or well-formed two-letter VR.
    #[snafu(display("bad VR bytes {bytes:?} for tag {tag}"))]
    BadVr { tag: Tag, bytes: [u8; 2] },

    /// A declared length exceeds its enclosing scope, or a fixed-size VR's
    /// span is not a multiple of its element size.
    #[snafu(display("length mismatch for tag {tag}: {reason}"))]
    LengthMismatch { tag: Tag, reason: String },

    /// An item or delimiter tag appeared outside of its valid context.
    #[snafu(display("invalid tag {tag} in this context: {reason}"))]
    InvalidTag { tag: Tag, reason: String },

    /// `SpecificCharacterSet`'s defined term was not recognized.
    #[snafu(display("unsupported character set defined term `{term}`"))]
    CharsetUnsupported { term: String },

    /// A numeric conversion did not fit the requested target type.
    #[snafu(display("value out of range for tag {tag}"))]
    OutOfRange { tag: Tag },

    /// Internal invariant broken (e.g. a required parent reference was absent).
    #[snafu(display("internal invariant violated: {reason}"))]
    InvariantViolation { reason: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
