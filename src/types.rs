//! Physical in-memory representations of fixed-width parquet types.
use crate::schema::types::PhysicalType;

/// A physical native representation of a parquet fixed-width type.
pub trait NativeType: std::fmt::Debug + Send + Sync + 'static + Copy + Clone + PartialEq {
    type Bytes: AsRef<[u8]>
        + std::fmt::Debug
        + Clone
        + Copy
        + Send
        + for<'a> TryFrom<&'a [u8], Error = std::array::TryFromSliceError>;

    const TYPE: PhysicalType;

    fn to_le_bytes(&self) -> Self::Bytes;

    fn from_le_bytes(bytes: Self::Bytes) -> Self;

    /// Order consistent with the column's physical sort order. NaN handling
    /// is the caller's responsibility; comparisons involving NaN collapse to
    /// `Equal`.
    fn ord(&self, other: &Self) -> std::cmp::Ordering;
}

macro_rules! native {
    ($type:ty, $physical_type:expr) => {
        impl NativeType for $type {
            type Bytes = [u8; std::mem::size_of::<Self>()];

            const TYPE: PhysicalType = $physical_type;

            #[inline]
            fn to_le_bytes(&self) -> Self::Bytes {
                Self::to_le_bytes(*self)
            }

            #[inline]
            fn from_le_bytes(bytes: Self::Bytes) -> Self {
                Self::from_le_bytes(bytes)
            }

            #[inline]
            fn ord(&self, other: &Self) -> std::cmp::Ordering {
                self.partial_cmp(other).unwrap_or(std::cmp::Ordering::Equal)
            }
        }
    };
}

native!(i32, PhysicalType::Int32);
native!(i64, PhysicalType::Int64);
native!(f32, PhysicalType::Float);
native!(f64, PhysicalType::Double);

/// The in-memory representation of the INT96 physical type: three little
/// endian `u32` limbs, least significant first.
pub type Int96 = [u32; 3];

impl NativeType for Int96 {
    type Bytes = [u8; 12];

    const TYPE: PhysicalType = PhysicalType::Int96;

    #[inline]
    fn to_le_bytes(&self) -> Self::Bytes {
        let mut bytes = [0; 12];
        let first = self[0].to_le_bytes();
        bytes[0..4].copy_from_slice(&first);
        let second = self[1].to_le_bytes();
        bytes[4..8].copy_from_slice(&second);
        let third = self[2].to_le_bytes();
        bytes[8..12].copy_from_slice(&third);
        bytes
    }

    #[inline]
    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        let mut first = [0; 4];
        first.copy_from_slice(&bytes[0..4]);
        let mut second = [0; 4];
        second.copy_from_slice(&bytes[4..8]);
        let mut third = [0; 4];
        third.copy_from_slice(&bytes[8..12]);
        [
            u32::from_le_bytes(first),
            u32::from_le_bytes(second),
            u32::from_le_bytes(third),
        ]
    }

    #[inline]
    fn ord(&self, other: &Self) -> std::cmp::Ordering {
        // limbs are little endian: compare from the most significant one
        self.iter().rev().cmp(other.iter().rev())
    }
}

/// Reads `T` from the start of a plain-encoded buffer.
/// # Panics
/// If the buffer is shorter than `size_of::<T>()`.
#[inline]
pub fn decode<T: NativeType>(chunk: &[u8]) -> T {
    let chunk: T::Bytes = match chunk[..std::mem::size_of::<T>()].try_into() {
        Ok(v) => v,
        Err(_) => unreachable!(),
    };
    T::from_le_bytes(chunk)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int96_order_uses_high_limb_first() {
        let lo: Int96 = [u32::MAX, 0, 0];
        let hi: Int96 = [0, 0, 1];
        assert_eq!(lo.ord(&hi), std::cmp::Ordering::Less);
    }

    #[test]
    fn int96_byte_roundtrip() {
        let x: Int96 = [1, 2, 3];
        assert_eq!(Int96::from_le_bytes(x.to_le_bytes()), x);
    }

    #[test]
    fn decode_reads_prefix() {
        let buffer = 7i64.to_le_bytes();
        assert_eq!(decode::<i64>(&buffer), 7);
    }
}
