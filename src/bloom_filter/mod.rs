//! Split-block bloom filters, the parquet-standard filter: 256-bit blocks
//! of eight 32-bit words, each toggled by one bit derived from the key's
//! xxhash64.
mod read;
mod split_block;
mod write;

pub use read::read;
pub use split_block::SplitBlockFilter;
pub(crate) use write::write;

#[cfg(feature = "bloom_filter")]
/// The xxhash64 (seed 0) of a value's plain-encoded bytes.
pub fn hash_bytes(bytes: &[u8]) -> u64 {
    xxhash_rust::xxh64::xxh64(bytes, 0)
}

#[cfg(feature = "bloom_filter")]
/// The hash of a fixed-width native value.
pub fn hash_native<T: crate::types::NativeType>(value: T) -> u64 {
    hash_bytes(value.to_le_bytes().as_ref())
}
