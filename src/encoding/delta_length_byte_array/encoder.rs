use super::super::delta_bitpacked;

/// Encodes a sequence of byte slices: a `DELTA_BINARY_PACKED` stream of
/// lengths followed by the concatenated payloads.
pub fn encode<'a, I: ExactSizeIterator<Item = &'a [u8]> + Clone>(
    iterator: I,
    buffer: &mut Vec<u8>,
) {
    let lengths = iterator.clone().map(|x| x.len() as i64);
    delta_bitpacked::encode(lengths, buffer);

    for value in iterator {
        buffer.extend_from_slice(value);
    }
}
