//! Endian-aware primitive load/store helpers.
//!
//! Host endianness is resolved at compile time via `cfg(target_endian)`, so
//! the "native" path below compiles to a no-op on hosts that already match.

/// Whether the host is little-endian. Evaluated once, at compile time.
pub const HOST_IS_LITTLE_ENDIAN: bool = cfg!(target_endian = "little");

macro_rules! endian_pair {
    ($name:ident, $ty:ty, $len:literal) => {
        pub mod $name {
            #[inline]
            pub fn le(bytes: &[u8]) -> $ty {
                let mut buf = [0u8; $len];
                buf.copy_from_slice(&bytes[..$len]);
                <$ty>::from_le_bytes(buf)
            }

            #[inline]
            pub fn be(bytes: &[u8]) -> $ty {
                let mut buf = [0u8; $len];
                buf.copy_from_slice(&bytes[..$len]);
                <$ty>::from_be_bytes(buf)
            }

            #[inline]
            pub fn get(bytes: &[u8], little_endian: bool) -> $ty {
                if little_endian {
                    le(bytes)
                } else {
                    be(bytes)
                }
            }

            #[inline]
            pub fn put_le(value: $ty, out: &mut [u8]) {
                out[..$len].copy_from_slice(&value.to_le_bytes());
            }

            #[inline]
            pub fn put_be(value: $ty, out: &mut [u8]) {
                out[..$len].copy_from_slice(&value.to_be_bytes());
            }
        }
    };
}

endian_pair!(u16_rw, u16, 2);
endian_pair!(u32_rw, u32, 4);
endian_pair!(u64_rw, u64, 8);
endian_pair!(i16_rw, i16, 2);
endian_pair!(i32_rw, i32, 4);
endian_pair!(i64_rw, i64, 8);

#[inline]
pub fn f32_le(bytes: &[u8]) -> f32 {
    f32::from_bits(u32_rw::le(bytes))
}

#[inline]
pub fn f32_be(bytes: &[u8]) -> f32 {
    f32::from_bits(u32_rw::be(bytes))
}

#[inline]
pub fn f32_get(bytes: &[u8], little_endian: bool) -> f32 {
    f32::from_bits(u32_rw::get(bytes, little_endian))
}

#[inline]
pub fn f64_le(bytes: &[u8]) -> f64 {
    f64::from_bits(u64_rw::le(bytes))
}

#[inline]
pub fn f64_be(bytes: &[u8]) -> f64 {
    f64::from_bits(u64_rw::be(bytes))
}

#[inline]
pub fn f64_get(bytes: &[u8], little_endian: bool) -> f64 {
    f64::from_bits(u64_rw::get(bytes, little_endian))
}

/// Swaps the byte order of a fixed-width in-place buffer of `width`-byte
/// elements (used by the pixel decoder's byte-swap transform).
pub fn swap_elements_in_place(buf: &mut [u8], width: usize) {
    if width <= 1 {
        return;
    }
    for chunk in buf.chunks_exact_mut(width) {
        chunk.reverse();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endian_consistency_via_byteswap() {
        // load_be(byteswap(b)) == load_le(b)
        let b = [0x12u8, 0x34, 0x56, 0x78];
        let le = u32_rw::le(&b);
        let mut swapped = b;
        swap_elements_in_place(&mut swapped, 4);
        let be_of_swapped = u32_rw::be(&swapped);
        assert_eq!(le, be_of_swapped);
    }

    #[test]
    fn u16_roundtrip() {
        let mut out = [0u8; 2];
        u16_rw::put_le(0xABCD, &mut out);
        assert_eq!(u16_rw::le(&out), 0xABCD);
    }
}
