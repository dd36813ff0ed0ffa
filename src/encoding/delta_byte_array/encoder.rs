use super::super::delta_bitpacked;

/// Encodes a sequence of byte slices as `DELTA_BYTE_ARRAY`: the length of
/// the prefix shared with the previous value, the suffix length, and the
/// concatenated suffixes, the two length streams `DELTA_BINARY_PACKED`.
pub fn encode<'a, I: ExactSizeIterator<Item = &'a [u8]> + Clone>(
    iterator: I,
    buffer: &mut Vec<u8>,
) {
    let mut previous: &[u8] = &[];
    let mut prefix_lengths = Vec::with_capacity(iterator.len());
    for value in iterator.clone() {
        let prefix = previous
            .iter()
            .zip(value.iter())
            .take_while(|(a, b)| a == b)
            .count();
        prefix_lengths.push(prefix);
        previous = value;
    }

    delta_bitpacked::encode(prefix_lengths.iter().map(|x| *x as i64), buffer);
    delta_bitpacked::encode(
        iterator
            .clone()
            .zip(prefix_lengths.iter())
            .map(|(value, prefix)| (value.len() - prefix) as i64),
        buffer,
    );
    for (value, prefix) in iterator.zip(prefix_lengths.iter()) {
        buffer.extend_from_slice(&value[*prefix..]);
    }
}
