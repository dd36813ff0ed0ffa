// see https://github.com/apache/parquet-format/blob/master/Encodings.md#delta-strings-delta_byte_array--7
mod decoder;
mod encoder;

pub use decoder::Decoder;
pub use encoder::encode;

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(data: &[&[u8]]) {
        let mut buffer = vec![];
        encode(data.iter().copied(), &mut buffer);

        let mut decoder = Decoder::try_new(&buffer).unwrap();
        let prefixes = decoder
            .by_ref()
            .collect::<crate::error::Result<Vec<_>>>()
            .unwrap();
        let mut lengths = decoder.into_lengths().unwrap();
        let suffix_lengths = lengths
            .by_ref()
            .collect::<crate::error::Result<Vec<_>>>()
            .unwrap();
        let suffixes = lengths.into_values();

        let mut offset = 0;
        let mut previous: Vec<u8> = vec![];
        let mut result: Vec<Vec<u8>> = vec![];
        for (prefix, length) in prefixes.iter().zip(suffix_lengths) {
            let suffix = &suffixes[offset..offset + length as usize];
            offset += length as usize;
            let mut value = previous[..*prefix as usize].to_vec();
            value.extend_from_slice(suffix);
            previous = value.clone();
            result.push(value);
        }
        assert_eq!(result, data.iter().map(|x| x.to_vec()).collect::<Vec<_>>());
    }

    #[test]
    fn shared_prefixes() {
        roundtrip(&[b"Hello", b"Helloworld", b"Helm", b"World"]);
    }

    #[test]
    fn sorted_names() {
        roundtrip(&[b"Skywalker", b"Skywalker", b"Solo"]);
    }

    #[test]
    fn no_common_prefix() {
        roundtrip(&[b"abc", b"def"]);
    }
}
