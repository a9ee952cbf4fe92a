//! Byte-level codecs shared by the parser and pixel decoder: endian
//! primitives, text repertoires, RLE PackBits, and the pixel codec
//! adapter contract that JPEG-family crates plug into.

pub mod adapter;
pub mod decode;
pub mod rle;
pub mod text;

pub use adapter::{CodecAdapter, DecodeError, DecodeOutputOpts, DecodedFrameView, DeclaredPixelInfo};
pub use decode::{basic::BasicDecoder, BasicDecode};
