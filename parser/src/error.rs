//! The parser's error taxonomy: stream/header failures
//! and the invalid-context failures specific to the element loop.

use dcm_core::Tag;
use snafu::Snafu;

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("{source}"))]
    Core { source: dcm_core::Error },

    #[snafu(display("explicit VR bytes {bytes:?} for tag {tag} are not two printable ASCII letters"))]
    BadVr { tag: Tag, bytes: [u8; 2] },

    #[snafu(display("value length 0xFFFFFFFF on tag {tag} with VR {vr} is not a recognized encapsulated pixel data marker"))]
    UndefinedLengthNotAllowed { tag: Tag, vr: String },

    #[snafu(display("pixel data fragment at tag {tag} has an undefined length, which is not permitted"))]
    UndefinedFragmentLength { tag: Tag },

    #[snafu(display("headerless stream detection failed: no probed mode decoded a plausible first element"))]
    HeaderlessDetectionFailed,
}

impl From<dcm_core::Error> for Error {
    fn from(source: dcm_core::Error) -> Error {
        Error::Core { source }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
