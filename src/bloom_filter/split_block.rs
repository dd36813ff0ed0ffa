/// One multiplier per word of a block; from the parquet format
/// specification.
const SALT: [u32; 8] = [
    0x47b6137b, 0x44974d91, 0x8824ad5b, 0xa2b7289d, 0x705495c7, 0x2df1424b, 0x9efc4947,
    0x5c6bfb31,
];

const WORDS_PER_BLOCK: usize = 8;
const BYTES_PER_BLOCK: usize = WORDS_PER_BLOCK * 4;

/// A split-block bloom filter sized at construction. Every inserted key is
/// found by [`SplitBlockFilter::check`]; keys never inserted are found with
/// the (tunable, non-zero) false-positive probability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitBlockFilter {
    words: Vec<u32>,
}

impl SplitBlockFilter {
    /// A filter sized for `num_values` keys at `bits_per_value` bits each,
    /// rounded up to a power-of-two number of blocks.
    pub fn with_capacity(num_values: usize, bits_per_value: usize) -> Self {
        let num_bits = (num_values * bits_per_value).max(BYTES_PER_BLOCK * 8);
        let num_blocks = (num_bits / (BYTES_PER_BLOCK * 8)).next_power_of_two();
        Self {
            words: vec![0; num_blocks * WORDS_PER_BLOCK],
        }
    }

    /// Rebuilds a filter from a bitset read from a file.
    pub fn from_bitset(bitset: &[u8]) -> Self {
        let words = bitset
            .chunks_exact(4)
            .map(|chunk| u32::from_le_bytes(chunk.try_into().unwrap()))
            .collect();
        Self { words }
    }

    fn num_blocks(&self) -> usize {
        self.words.len() / WORDS_PER_BLOCK
    }

    fn block_of(&self, hash: u64) -> usize {
        // unbiased reduction of the high 32 bits onto the block range
        (((hash >> 32) * self.num_blocks() as u64) >> 32) as usize
    }

    fn mask(hash: u64) -> [u32; WORDS_PER_BLOCK] {
        let key = hash as u32;
        let mut mask = [0u32; WORDS_PER_BLOCK];
        for (word, salt) in mask.iter_mut().zip(SALT) {
            *word = 1 << (key.wrapping_mul(salt) >> 27);
        }
        mask
    }

    pub fn insert(&mut self, hash: u64) {
        let block = self.block_of(hash) * WORDS_PER_BLOCK;
        for (i, mask) in Self::mask(hash).into_iter().enumerate() {
            self.words[block + i] |= mask;
        }
    }

    pub fn check(&self, hash: u64) -> bool {
        let block = self.block_of(hash) * WORDS_PER_BLOCK;
        Self::mask(hash)
            .into_iter()
            .enumerate()
            .all(|(i, mask)| self.words[block + i] & mask == mask)
    }

    /// The little-endian bitset, as stored in the file.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.words.len() * 4);
        for word in &self.words {
            bytes.extend_from_slice(&word.to_le_bytes());
        }
        bytes
    }
}

#[cfg(test)]
#[cfg(feature = "bloom_filter")]
mod tests {
    use super::super::hash_bytes;
    use super::*;

    #[test]
    fn every_inserted_key_is_found() {
        let mut filter = SplitBlockFilter::with_capacity(1000, 10);
        let hashes: Vec<u64> = (0..1000)
            .map(|i| hash_bytes(format!("key-{}", i).as_bytes()))
            .collect();
        for hash in &hashes {
            filter.insert(*hash);
        }
        assert!(hashes.iter().all(|hash| filter.check(*hash)));
    }

    #[test]
    fn absent_keys_are_mostly_absent() {
        let mut filter = SplitBlockFilter::with_capacity(1000, 10);
        for i in 0..1000 {
            filter.insert(hash_bytes(format!("key-{}", i).as_bytes()));
        }
        let false_positives = (0..10_000)
            .filter(|i| filter.check(hash_bytes(format!("other-{}", i).as_bytes())))
            .count();
        // ~1% expected at 10 bits per value; leave generous slack
        assert!(false_positives < 500);
    }

    #[test]
    fn bitset_roundtrip() {
        let mut filter = SplitBlockFilter::with_capacity(8, 16);
        filter.insert(hash_bytes(b"Han"));
        let rebuilt = SplitBlockFilter::from_bitset(&filter.to_bytes());
        assert_eq!(rebuilt, filter);
        assert!(rebuilt.check(hash_bytes(b"Han")));
    }
}
