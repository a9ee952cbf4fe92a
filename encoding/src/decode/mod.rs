//! Primitive numeric decoders, parameterized over byte order.
//!
//! These sit one layer below the element-header walker in `dcm-parser`:
//! given a already-positioned reader, pull fixed-width integers and floats
//! out of it without knowing anything about tags, VRs or DICOM framing.

pub mod basic;

use byteordered::Endianness;
use std::io::{self, Read};

pub type Result<T> = io::Result<T>;

/// A decoder of primitive values in a fixed byte order.
pub trait BasicDecode {
    fn endianness(&self) -> Endianness;

    fn decode_us<S: Read>(&self, source: S) -> Result<u16>;
    fn decode_us_into<S: Read>(&self, source: S, target: &mut [u16]) -> Result<()>;
    fn decode_ul<S: Read>(&self, source: S) -> Result<u32>;
    fn decode_ul_into<S: Read>(&self, source: S, target: &mut [u32]) -> Result<()>;
    fn decode_uv<S: Read>(&self, source: S) -> Result<u64>;
    fn decode_uv_into<S: Read>(&self, source: S, target: &mut [u64]) -> Result<()>;
    fn decode_ss<S: Read>(&self, source: S) -> Result<i16>;
    fn decode_ss_into<S: Read>(&self, source: S, target: &mut [i16]) -> Result<()>;
    fn decode_sl<S: Read>(&self, source: S) -> Result<i32>;
    fn decode_sl_into<S: Read>(&self, source: S, target: &mut [i32]) -> Result<()>;
    fn decode_sv<S: Read>(&self, source: S) -> Result<i64>;
    fn decode_sv_into<S: Read>(&self, source: S, target: &mut [i64]) -> Result<()>;
    fn decode_fl<S: Read>(&self, source: S) -> Result<f32>;
    fn decode_fl_into<S: Read>(&self, source: S, target: &mut [f32]) -> Result<()>;
    fn decode_fd<S: Read>(&self, source: S) -> Result<f64>;
    fn decode_fd_into<S: Read>(&self, source: S, target: &mut [f64]) -> Result<()>;
}

pub use basic::BasicDecoder;
