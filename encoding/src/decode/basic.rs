//! Little/big endian implementations of [`BasicDecode`].

use super::BasicDecode;
use byteordered::{byteorder::ReadBytesExt, ByteOrdered, Endianness};
use std::io::Read;

type Result<T> = std::io::Result<T>;

/// Decodes primitive DICOM elements in little endian.
#[derive(Debug, Default, Copy, Clone, Eq, Hash, PartialEq)]
pub struct LittleEndianBasicDecoder;

impl BasicDecode for LittleEndianBasicDecoder {
    fn endianness(&self) -> Endianness {
        Endianness::Little
    }

    fn decode_us<S: Read>(&self, source: S) -> Result<u16> {
        ByteOrdered::le(source).read_u16().map_err(Into::into)
    }
    fn decode_us_into<S: Read>(&self, source: S, target: &mut [u16]) -> Result<()> {
        ByteOrdered::le(source).read_u16_into::<byteordered::byteorder::LittleEndian>(target).map_err(Into::into)
    }
    fn decode_ul<S: Read>(&self, source: S) -> Result<u32> {
        ByteOrdered::le(source).read_u32().map_err(Into::into)
    }
    fn decode_ul_into<S: Read>(&self, source: S, target: &mut [u32]) -> Result<()> {
        ByteOrdered::le(source).read_u32_into::<byteordered::byteorder::LittleEndian>(target).map_err(Into::into)
    }
    fn decode_uv<S: Read>(&self, source: S) -> Result<u64> {
        ByteOrdered::le(source).read_u64().map_err(Into::into)
    }
    fn decode_uv_into<S: Read>(&self, source: S, target: &mut [u64]) -> Result<()> {
        ByteOrdered::le(source).read_u64_into::<byteordered::byteorder::LittleEndian>(target).map_err(Into::into)
    }
    fn decode_ss<S: Read>(&self, source: S) -> Result<i16> {
        ByteOrdered::le(source).read_i16().map_err(Into::into)
    }
    fn decode_ss_into<S: Read>(&self, source: S, target: &mut [i16]) -> Result<()> {
        ByteOrdered::le(source).read_i16_into::<byteordered::byteorder::LittleEndian>(target).map_err(Into::into)
    }
    fn decode_sl<S: Read>(&self, source: S) -> Result<i32> {
        ByteOrdered::le(source).read_i32().map_err(Into::into)
    }
    fn decode_sl_into<S: Read>(&self, source: S, target: &mut [i32]) -> Result<()> {
        ByteOrdered::le(source).read_i32_into::<byteordered::byteorder::LittleEndian>(target).map_err(Into::into)
    }
    fn decode_sv<S: Read>(&self, source: S) -> Result<i64> {
        ByteOrdered::le(source).read_i64().map_err(Into::into)
    }
    fn decode_sv_into<S: Read>(&self, source: S, target: &mut [i64]) -> Result<()> {
        ByteOrdered::le(source).read_i64_into::<byteordered::byteorder::LittleEndian>(target).map_err(Into::into)
    }
    fn decode_fl<S: Read>(&self, source: S) -> Result<f32> {
        ByteOrdered::le(source).read_f32().map_err(Into::into)
    }
    fn decode_fl_into<S: Read>(&self, source: S, target: &mut [f32]) -> Result<()> {
        ByteOrdered::le(source).read_f32_into::<byteordered::byteorder::LittleEndian>(target).map_err(Into::into)
    }
    fn decode_fd<S: Read>(&self, source: S) -> Result<f64> {
        ByteOrdered::le(source).read_f64().map_err(Into::into)
    }
    fn decode_fd_into<S: Read>(&self, source: S, target: &mut [f64]) -> Result<()> {
        ByteOrdered::le(source).read_f64_into::<byteordered::byteorder::LittleEndian>(target).map_err(Into::into)
    }
}

/// Decodes primitive DICOM elements in big endian.
#[derive(Debug, Default, Copy, Clone, Eq, Hash, PartialEq)]
pub struct BigEndianBasicDecoder;

impl BasicDecode for BigEndianBasicDecoder {
    fn endianness(&self) -> Endianness {
        Endianness::Big
    }

    fn decode_us<S: Read>(&self, source: S) -> Result<u16> {
        ByteOrdered::be(source).read_u16().map_err(Into::into)
    }
    fn decode_us_into<S: Read>(&self, source: S, target: &mut [u16]) -> Result<()> {
        ByteOrdered::be(source).read_u16_into::<byteordered::byteorder::BigEndian>(target).map_err(Into::into)
    }
    fn decode_ul<S: Read>(&self, source: S) -> Result<u32> {
        ByteOrdered::be(source).read_u32().map_err(Into::into)
    }
    fn decode_ul_into<S: Read>(&self, source: S, target: &mut [u32]) -> Result<()> {
        ByteOrdered::be(source).read_u32_into::<byteordered::byteorder::BigEndian>(target).map_err(Into::into)
    }
    fn decode_uv<S: Read>(&self, source: S) -> Result<u64> {
        ByteOrdered::be(source).read_u64().map_err(Into::into)
    }
    fn decode_uv_into<S: Read>(&self, source: S, target: &mut [u64]) -> Result<()> {
        ByteOrdered::be(source).read_u64_into::<byteordered::byteorder::BigEndian>(target).map_err(Into::into)
    }
    fn decode_ss<S: Read>(&self, source: S) -> Result<i16> {
        ByteOrdered::be(source).read_i16().map_err(Into::into)
    }
    fn decode_ss_into<S: Read>(&self, source: S, target: &mut [i16]) -> Result<()> {
        ByteOrdered::be(source).read_i16_into::<byteordered::byteorder::BigEndian>(target).map_err(Into::into)
    }
    fn decode_sl<S: Read>(&self, source: S) -> Result<i32> {
        ByteOrdered::be(source).read_i32().map_err(Into::into)
    }
    fn decode_sl_into<S: Read>(&self, source: S, target: &mut [i32]) -> Result<()> {
        ByteOrdered::be(source).read_i32_into::<byteordered::byteorder::BigEndian>(target).map_err(Into::into)
    }
    fn decode_sv<S: Read>(&self, source: S) -> Result<i64> {
        ByteOrdered::be(source).read_i64().map_err(Into::into)
    }
    fn decode_sv_into<S: Read>(&self, source: S, target: &mut [i64]) -> Result<()> {
        ByteOrdered::be(source).read_i64_into::<byteordered::byteorder::BigEndian>(target).map_err(Into::into)
    }
    fn decode_fl<S: Read>(&self, source: S) -> Result<f32> {
        ByteOrdered::be(source).read_f32().map_err(Into::into)
    }
    fn decode_fl_into<S: Read>(&self, source: S, target: &mut [f32]) -> Result<()> {
        ByteOrdered::be(source).read_f32_into::<byteordered::byteorder::BigEndian>(target).map_err(Into::into)
    }
    fn decode_fd<S: Read>(&self, source: S) -> Result<f64> {
        ByteOrdered::be(source).read_f64().map_err(Into::into)
    }
    fn decode_fd_into<S: Read>(&self, source: S, target: &mut [f64]) -> Result<()> {
        ByteOrdered::be(source).read_f64_into::<byteordered::byteorder::BigEndian>(target).map_err(Into::into)
    }
}

/// A basic decoder whose byte order is chosen at run time. Only two
/// variants are possible, so this enum is cheaper than a trait object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasicDecoder {
    Le(LittleEndianBasicDecoder),
    Be(BigEndianBasicDecoder),
}

impl BasicDecoder {
    pub fn new(endianness: Endianness) -> Self {
        match endianness {
            Endianness::Little => BasicDecoder::Le(LittleEndianBasicDecoder),
            Endianness::Big => BasicDecoder::Be(BigEndianBasicDecoder),
        }
    }
}

impl From<Endianness> for BasicDecoder {
    fn from(endianness: Endianness) -> Self {
        BasicDecoder::new(endianness)
    }
}

macro_rules! for_both {
    ($s:expr, |$e:ident| $f:expr) => {
        match $s {
            BasicDecoder::Le(ref $e) => $f,
            BasicDecoder::Be(ref $e) => $f,
        }
    };
}

impl BasicDecode for BasicDecoder {
    fn endianness(&self) -> Endianness {
        match self {
            BasicDecoder::Le(_) => Endianness::Little,
            BasicDecoder::Be(_) => Endianness::Big,
        }
    }

    fn decode_us<S: Read>(&self, source: S) -> Result<u16> {
        for_both!(self, |d| d.decode_us(source))
    }
    fn decode_us_into<S: Read>(&self, source: S, target: &mut [u16]) -> Result<()> {
        for_both!(self, |d| d.decode_us_into(source, target))
    }
    fn decode_ul<S: Read>(&self, source: S) -> Result<u32> {
        for_both!(self, |d| d.decode_ul(source))
    }
    fn decode_ul_into<S: Read>(&self, source: S, target: &mut [u32]) -> Result<()> {
        for_both!(self, |d| d.decode_ul_into(source, target))
    }
    fn decode_uv<S: Read>(&self, source: S) -> Result<u64> {
        for_both!(self, |d| d.decode_uv(source))
    }
    fn decode_uv_into<S: Read>(&self, source: S, target: &mut [u64]) -> Result<()> {
        for_both!(self, |d| d.decode_uv_into(source, target))
    }
    fn decode_ss<S: Read>(&self, source: S) -> Result<i16> {
        for_both!(self, |d| d.decode_ss(source))
    }
    fn decode_ss_into<S: Read>(&self, source: S, target: &mut [i16]) -> Result<()> {
        for_both!(self, |d| d.decode_ss_into(source, target))
    }
    fn decode_sl<S: Read>(&self, source: S) -> Result<i32> {
        for_both!(self, |d| d.decode_sl(source))
    }
    fn decode_sl_into<S: Read>(&self, source: S, target: &mut [i32]) -> Result<()> {
        for_both!(self, |d| d.decode_sl_into(source, target))
    }
    fn decode_sv<S: Read>(&self, source: S) -> Result<i64> {
        for_both!(self, |d| d.decode_sv(source))
    }
    fn decode_sv_into<S: Read>(&self, source: S, target: &mut [i64]) -> Result<()> {
        for_both!(self, |d| d.decode_sv_into(source, target))
    }
    fn decode_fl<S: Read>(&self, source: S) -> Result<f32> {
        for_both!(self, |d| d.decode_fl(source))
    }
    fn decode_fl_into<S: Read>(&self, source: S, target: &mut [f32]) -> Result<()> {
        for_both!(self, |d| d.decode_fl_into(source, target))
    }
    fn decode_fd<S: Read>(&self, source: S) -> Result<f64> {
        for_both!(self, |d| d.decode_fd(source))
    }
    fn decode_fd_into<S: Read>(&self, source: S, target: &mut [f64]) -> Result<()> {
        for_both!(self, |d| d.decode_fd_into(source, target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn little_endian_reads_u16() {
        let dec = LittleEndianBasicDecoder;
        let mut cursor = Cursor::new([0x34u8, 0x12]);
        assert_eq!(dec.decode_us(&mut cursor).unwrap(), 0x1234);
    }

    #[test]
    fn big_endian_reads_u16() {
        let dec = BigEndianBasicDecoder;
        let mut cursor = Cursor::new([0x12u8, 0x34]);
        assert_eq!(dec.decode_us(&mut cursor).unwrap(), 0x1234);
    }

    #[test]
    fn run_time_dispatch_matches_endianness() {
        let dec = BasicDecoder::new(Endianness::Big);
        let mut cursor = Cursor::new([0x00u8, 0x00, 0x00, 0x2A]);
        assert_eq!(dec.decode_ul(&mut cursor).unwrap(), 42);
        assert_eq!(dec.endianness(), Endianness::Big);
    }
}
