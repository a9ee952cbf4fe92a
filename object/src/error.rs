//! Top-level parse orchestration errors.

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("failed to open DICOM file: {source}"))]
    Io { source: std::io::Error },

    #[snafu(display("{source}"))]
    Core { source: dcm_core::Error },

    #[snafu(display("{source}"))]
    Meta { source: crate::meta::Error },

    #[snafu(display("{source}"))]
    Parse { source: dcm_parser::Error },

    #[snafu(display("transfer syntax {uid} is not recognized"))]
    UnsupportedTransferSyntax { uid: String },

    #[snafu(display("failed to inflate deflated transfer syntax stream: {source}"))]
    Inflate { source: dcm_transfer_syntax::deflate::InflateError },

    #[snafu(display("headerless stream detection failed: {source}"))]
    Headerless { source: dcm_parser::Error },

    #[snafu(display("{source}"))]
    Pixeldata { source: dcm_pixeldata::Error },
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Error {
        Error::Io { source }
    }
}

impl From<dcm_core::Error> for Error {
    fn from(source: dcm_core::Error) -> Error {
        Error::Core { source }
    }
}

impl From<crate::meta::Error> for Error {
    fn from(source: crate::meta::Error) -> Error {
        Error::Meta { source }
    }
}

impl From<dcm_parser::Error> for Error {
    fn from(source: dcm_parser::Error) -> Error {
        Error::Parse { source }
    }
}

impl From<dcm_transfer_syntax::deflate::InflateError> for Error {
    fn from(source: dcm_transfer_syntax::deflate::InflateError) -> Error {
        Error::Inflate { source }
    }
}

impl From<dcm_pixeldata::Error> for Error {
    fn from(source: dcm_pixeldata::Error) -> Error {
        Error::Pixeldata { source }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
