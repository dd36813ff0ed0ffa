use crate::types::NativeType;

/// Encodes `data` according to `BYTE_STREAM_SPLIT`: the `n`th byte of every
/// value is gathered into the `n`th of K streams, concatenated.
pub fn encode<T: NativeType>(data: &[T], buffer: &mut Vec<u8>) {
    let element_size = std::mem::size_of::<T>();
    let num_elements = data.len();
    let offset = buffer.len();
    buffer.resize(offset + element_size * num_elements, 0);

    for (i, value) in data.iter().enumerate() {
        let bytes = value.to_le_bytes();
        for (n, byte) in bytes.as_ref().iter().enumerate() {
            buffer[offset + num_elements * n + i] = *byte;
        }
    }
}
