use crate::encoding::{
    byte_stream_split, delta_bitpacked, get_bit_width, hybrid_rle, plain, Encoding,
};
use crate::error::{Error, Result};
use crate::page::DataPage;
use crate::schema::types::PhysicalType;
use crate::value::{Datum, Value};

use super::{dict_datum, DecodedDictionary};

enum Levels<'a> {
    Rle(hybrid_rle::HybridRleDecoder<'a>),
    /// the column has no such level; every value carries zero
    Zero,
}

impl<'a> Levels<'a> {
    fn next(&mut self) -> Result<i16> {
        match self {
            Levels::Rle(decoder) => match decoder.next() {
                Some(level) => Ok(level? as i16),
                None => Err(Error::oos(
                    "the page declares more values than its levels hold",
                )),
            },
            Levels::Zero => Ok(0),
        }
    }
}

/// Materializes values with their levels out of one data page. Emits
/// exactly the page's declared value count and fails when the buffers
/// cannot produce it.
pub struct ValueReader<'a> {
    rep: Levels<'a>,
    def: Levels<'a>,
    values: std::vec::IntoIter<Datum>,
    max_def: i16,
    column_index: usize,
    remaining: usize,
}

/// Builds the [`ValueReader`] of `page`. Dictionary-encoded pages resolve
/// their indices through `dict`, failing on out-of-range indices.
pub fn deserialize_page<'a>(
    page: &'a DataPage,
    dict: Option<&DecodedDictionary>,
) -> Result<ValueReader<'a>> {
    let descriptor = page.descriptor();
    let num_values = page.num_values();
    let (rep_buffer, def_buffer, values_buffer) = page.split_buffer()?;

    let rep = if descriptor.max_rep_level() > 0 {
        Levels::Rle(hybrid_rle::HybridRleDecoder::try_new(
            rep_buffer,
            get_bit_width(descriptor.max_rep_level()),
            num_values,
        )?)
    } else {
        Levels::Zero
    };
    let def = if descriptor.max_def_level() > 0 {
        Levels::Rle(hybrid_rle::HybridRleDecoder::try_new(
            def_buffer,
            get_bit_width(descriptor.max_def_level()),
            num_values,
        )?)
    } else {
        Levels::Zero
    };

    let values = decode_values(
        values_buffer,
        page.encoding()?,
        descriptor.physical_type(),
        num_values,
        dict,
    )?;

    Ok(ValueReader {
        rep,
        def,
        values: values.into_iter(),
        max_def: descriptor.max_def_level(),
        column_index: descriptor.index(),
        remaining: num_values,
    })
}

/// Greedily decodes the defined values of the page; the reader pairs them
/// with the definition levels.
fn decode_values(
    buffer: &[u8],
    encoding: Encoding,
    physical_type: PhysicalType,
    num_values: usize,
    dict: Option<&DecodedDictionary>,
) -> Result<Vec<Datum>> {
    match (encoding, physical_type) {
        (Encoding::Plain, PhysicalType::Boolean) => {
            let length = std::cmp::min(buffer.len() * 8, num_values);
            Ok(plain::decode_boolean(buffer, length)?
                .into_iter()
                .map(Datum::Boolean)
                .collect())
        }
        (Encoding::Plain, PhysicalType::Int32) => {
            decode_plain_native::<i32>(buffer, num_values, Datum::Int32)
        }
        (Encoding::Plain, PhysicalType::Int64) => {
            decode_plain_native::<i64>(buffer, num_values, Datum::Int64)
        }
        (Encoding::Plain, PhysicalType::Int96) => {
            decode_plain_native::<crate::types::Int96>(buffer, num_values, Datum::Int96)
        }
        (Encoding::Plain, PhysicalType::Float) => {
            decode_plain_native::<f32>(buffer, num_values, Datum::Float)
        }
        (Encoding::Plain, PhysicalType::Double) => {
            decode_plain_native::<f64>(buffer, num_values, Datum::Double)
        }
        (Encoding::Plain, PhysicalType::ByteArray) => {
            // nulls do not consume a slot: decode whatever the buffer holds
            let mut values = vec![];
            let mut remaining = buffer;
            while remaining.len() >= 4 && values.len() < num_values {
                let length =
                    u32::from_le_bytes(remaining[..4].try_into().unwrap()) as usize;
                remaining = &remaining[4..];
                if remaining.len() < length {
                    return Err(Error::oos(
                        "a byte-array length prefix exceeds the remaining page buffer",
                    ));
                }
                let (value, rest) = remaining.split_at(length);
                values.push(Datum::ByteArray(value.to_vec()));
                remaining = rest;
            }
            Ok(values)
        }
        (Encoding::Plain, PhysicalType::FixedLenByteArray(size)) => {
            let length = std::cmp::min(buffer.len() / size.max(1), num_values);
            plain::FixedLenIter::new(buffer, size, length)
                .map(|x| x.map(|x| Datum::FixedLenByteArray(x.to_vec())))
                .collect()
        }
        (Encoding::RleDictionary | Encoding::PlainDictionary, _) => {
            let dict = dict.ok_or_else(|| {
                Error::oos("the page is dictionary-encoded but the chunk has no dictionary page")
            })?;
            if buffer.is_empty() {
                return Err(Error::oos("an index page requires a bit-width byte"));
            }
            let num_bits = buffer[0] as u32;
            hybrid_rle::HybridRleDecoder::try_new(&buffer[1..], num_bits, num_values)?
                .map(|index| dict_datum(dict, index?))
                .collect()
        }
        (Encoding::DeltaBinaryPacked, PhysicalType::Int32) => {
            delta_bitpacked::Decoder::try_new(buffer)?
                .map(|x| Ok(Datum::Int32(x? as i32)))
                .collect()
        }
        (Encoding::DeltaBinaryPacked, PhysicalType::Int64) => {
            delta_bitpacked::Decoder::try_new(buffer)?
                .map(|x| Ok(Datum::Int64(x?)))
                .collect()
        }
        (Encoding::DeltaLengthByteArray, PhysicalType::ByteArray) => {
            let mut decoder = crate::encoding::delta_length_byte_array::Decoder::try_new(buffer)?;
            let lengths = decoder.by_ref().collect::<Result<Vec<_>>>()?;
            let mut payload = decoder.into_values();
            lengths
                .into_iter()
                .map(|length| {
                    let length = length as usize;
                    if payload.len() < length {
                        return Err(Error::oos(
                            "the delta-length payload is shorter than its lengths",
                        ));
                    }
                    let (value, rest) = payload.split_at(length);
                    payload = rest;
                    Ok(Datum::ByteArray(value.to_vec()))
                })
                .collect()
        }
        (Encoding::DeltaByteArray, PhysicalType::ByteArray) => {
            let mut decoder = crate::encoding::delta_byte_array::Decoder::try_new(buffer)?;
            let prefix_lengths = decoder.by_ref().collect::<Result<Vec<_>>>()?;
            let mut suffixes = decoder.into_lengths()?;
            let suffix_lengths = suffixes.by_ref().collect::<Result<Vec<_>>>()?;
            let mut payload = suffixes.into_values();

            let mut previous: Vec<u8> = vec![];
            prefix_lengths
                .into_iter()
                .zip(suffix_lengths)
                .map(|(prefix, suffix)| {
                    let (prefix, suffix) = (prefix as usize, suffix as usize);
                    if prefix > previous.len() || payload.len() < suffix {
                        return Err(Error::oos(
                            "the delta-string streams are inconsistent with their payload",
                        ));
                    }
                    let mut value = previous[..prefix].to_vec();
                    let (bytes, rest) = payload.split_at(suffix);
                    value.extend_from_slice(bytes);
                    payload = rest;
                    previous = value.clone();
                    Ok(Datum::ByteArray(value))
                })
                .collect()
        }
        (Encoding::ByteStreamSplit, PhysicalType::Float) => {
            byte_stream_split::Decoder::<f32>::try_new(buffer)?
                .map(|x| x.map(Datum::Float))
                .collect()
        }
        (Encoding::ByteStreamSplit, PhysicalType::Double) => {
            byte_stream_split::Decoder::<f64>::try_new(buffer)?
                .map(|x| x.map(Datum::Double))
                .collect()
        }
        (encoding, physical_type) => Err(Error::oos(format!(
            "values of type {:?} cannot be decoded from {:?}",
            physical_type, encoding
        ))),
    }
}

fn decode_plain_native<T: crate::types::NativeType>(
    buffer: &[u8],
    num_values: usize,
    wrap: fn(T) -> Datum,
) -> Result<Vec<Datum>> {
    let available = buffer.len() / std::mem::size_of::<T>();
    let length = std::cmp::min(available, num_values);
    Ok(plain::decode_native::<T>(buffer, length)?
        .into_iter()
        .map(wrap)
        .collect())
}

impl<'a> Iterator for ValueReader<'a> {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let result = (|| {
            let rep = self.rep.next()?;
            let def = self.def.next()?;
            let datum = if def == self.max_def {
                self.values.next().ok_or_else(|| {
                    Error::oos("the page declares more values than its buffer yields")
                })?
            } else {
                Datum::Null
            };
            Ok(Value::new(datum, rep, def, self.column_index))
        })();
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{ColumnDescriptor, SchemaDescriptor};
    use crate::page::{DataPageHeader, DataPageHeaderV2};
    use crate::schema::types::{PrimitiveNode, Repetition};

    fn descriptor(physical_type: PhysicalType, repetition: Repetition) -> ColumnDescriptor {
        SchemaDescriptor::try_new(
            "s",
            vec![PrimitiveNode::from_physical("c", repetition, physical_type).into()],
        )
        .unwrap()
        .column(0)
        .clone()
    }

    fn page_v2(
        descriptor: ColumnDescriptor,
        encoding: Encoding,
        num_values: i32,
        def_levels: Vec<u8>,
        values: Vec<u8>,
    ) -> DataPage {
        let header = DataPageHeaderV2 {
            num_values,
            num_nulls: 0,
            num_rows: num_values,
            encoding: encoding.into(),
            definition_levels_byte_length: def_levels.len() as i32,
            repetition_levels_byte_length: 0,
            is_compressed: Some(false),
            statistics: None,
        };
        let mut buffer = def_levels;
        buffer.extend(values);
        DataPage::new(DataPageHeader::V2(header), buffer, descriptor)
    }

    #[test]
    fn malformed_delta_header_errors_for_int32() {
        let descriptor = descriptor(PhysicalType::Int32, Repetition::Required);
        // block size 100 is not a multiple of 128
        let page = page_v2(
            descriptor,
            Encoding::DeltaBinaryPacked,
            5,
            vec![],
            vec![100, 1, 5, 2],
        );
        assert!(deserialize_page(&page, None).is_err());
    }

    #[test]
    fn malformed_delta_header_errors_for_int64() {
        let descriptor = descriptor(PhysicalType::Int64, Repetition::Required);
        // zero mini-blocks
        let page = page_v2(
            descriptor,
            Encoding::DeltaBinaryPacked,
            5,
            vec![],
            vec![128, 1, 0, 5, 2],
        );
        assert!(deserialize_page(&page, None).is_err());
    }

    #[test]
    fn malformed_delta_lengths_error() {
        let descriptor = descriptor(PhysicalType::ByteArray, Repetition::Required);
        let page = page_v2(
            descriptor,
            Encoding::DeltaLengthByteArray,
            2,
            vec![],
            vec![100, 1, 2, 0],
        );
        assert!(deserialize_page(&page, None).is_err());
    }

    #[test]
    fn malformed_delta_strings_error() {
        let descriptor = descriptor(PhysicalType::ByteArray, Repetition::Required);
        let page = page_v2(
            descriptor,
            Encoding::DeltaByteArray,
            2,
            vec![],
            vec![100, 1, 2, 0],
        );
        assert!(deserialize_page(&page, None).is_err());
    }

    #[test]
    fn truncated_level_run_errors() {
        let descriptor = descriptor(PhysicalType::Int32, Repetition::Optional);
        // an rle run header whose value byte is missing
        let page = page_v2(
            descriptor,
            Encoding::Plain,
            8,
            vec![0b00010000],
            1i32.to_le_bytes().to_vec(),
        );
        assert!(deserialize_page(&page, None).is_err());
    }

    #[test]
    fn dictionary_index_out_of_bounds_errors() {
        let descriptor = descriptor(PhysicalType::Int32, Repetition::Required);
        let dict = DecodedDictionary::Int32(vec![7]);
        // bit width 1, one bit-packed group whose first index is 1
        let page = page_v2(
            descriptor,
            Encoding::RleDictionary,
            1,
            vec![],
            vec![1, (1 << 1) | 1, 0b00000001],
        );
        assert!(matches!(
            deserialize_page(&page, Some(&dict)),
            Err(Error::IndexOutOfBounds { index: 1, length: 1 })
        ));
    }
}

