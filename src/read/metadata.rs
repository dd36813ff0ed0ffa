use std::cmp::min;
use std::io::{Read, Seek, SeekFrom};

use parquet_format_safe::thrift::protocol::TCompactInputProtocol;
use parquet_format_safe::FileMetaData as FormatFileMetaData;

use crate::error::{Error, Result};
use crate::metadata::FileMetaData;
use crate::{DEFAULT_FOOTER_READ_SIZE, FOOTER_SIZE, HEADER_MAGIC};

pub(super) fn metadata_len(buffer: &[u8], len: usize) -> i32 {
    i32::from_le_bytes(buffer[len - 8..len - 4].try_into().unwrap())
}

// see (unstable) Seek::stream_len
fn stream_len(seek: &mut impl Seek) -> std::result::Result<u64, std::io::Error> {
    let old_pos = seek.seek(SeekFrom::Current(0))?;
    let len = seek.seek(SeekFrom::End(0))?;

    if old_pos != len {
        seek.seek(SeekFrom::Start(old_pos))?;
    }

    Ok(len)
}

/// Distinguishes "not a parquet file" from "parquet file never closed" by
/// the leading magic.
fn missing_magic_error<R: Read + Seek>(reader: &mut R, tail: &[u8]) -> Error {
    let last8: Vec<u8> = tail[tail.len().saturating_sub(8)..].to_vec();

    let mut leading = [0u8; 4];
    let has_leading_magic = reader
        .seek(SeekFrom::Start(0))
        .and_then(|_| reader.read_exact(&mut leading))
        .map(|_| leading == HEADER_MAGIC)
        .unwrap_or(false);

    if has_leading_magic {
        Error::NotProperlyClosed(format!(
            "the trailing magic is missing: the file was truncated or its writer never closed it (last 8 bytes: {:?})",
            last8
        ))
    } else {
        Error::NotAParquetFile(format!(
            "neither the leading nor the trailing magic is present (last 8 bytes: {:?})",
            last8
        ))
    }
}

/// Reads and validates a file's footer metadata.
///
/// The last `DEFAULT_FOOTER_READ_SIZE` bytes are read first; when the
/// footer is larger, a second read covers the remainder.
pub fn read_metadata<R: Read + Seek>(reader: &mut R) -> Result<FileMetaData> {
    let file_size = stream_len(reader)?;
    if file_size < HEADER_MAGIC.len() as u64 + FOOTER_SIZE {
        return Err(Error::NotAParquetFile(format!(
            "the file is {} bytes, smaller than header plus footer",
            file_size
        )));
    }

    let tail_length = min(DEFAULT_FOOTER_READ_SIZE, file_size) as usize;
    reader.seek(SeekFrom::End(-(tail_length as i64)))?;
    let mut tail = vec![0; tail_length];
    reader.read_exact(&mut tail)?;

    if tail[tail_length - 4..] != HEADER_MAGIC {
        return Err(missing_magic_error(reader, &tail));
    }

    let metadata_len = metadata_len(&tail, tail_length);
    let metadata_len: u64 = metadata_len
        .try_into()
        .map_err(|_| Error::oos(format!("negative footer length ({})", metadata_len)))?;

    let footer_len = FOOTER_SIZE + metadata_len;
    if footer_len > file_size {
        return Err(Error::oos(
            "the footer length exceeds the file; the file is corrupted or truncated",
        ));
    }

    let metadata = if (footer_len as usize) <= tail_length {
        // the tail already holds the whole footer
        let start = tail_length - footer_len as usize;
        let slice = &tail[start..tail_length - FOOTER_SIZE as usize];
        let mut protocol = TCompactInputProtocol::new(slice, usize::MAX);
        FormatFileMetaData::read_from_in_protocol(&mut protocol)?
    } else {
        reader.seek(SeekFrom::End(-(footer_len as i64)))?;
        let mut protocol = TCompactInputProtocol::new(reader.by_ref().take(metadata_len), usize::MAX);
        FormatFileMetaData::read_from_in_protocol(&mut protocol)?
    };

    let metadata = FileMetaData::try_from_thrift(metadata)?;
    validate_byte_ranges(&metadata, file_size)?;
    Ok(metadata)
}

/// Every chunk's byte range must fall inside the file.
fn validate_byte_ranges(metadata: &FileMetaData, file_size: u64) -> Result<()> {
    for row_group in &metadata.row_groups {
        for chunk in row_group.columns() {
            let (start, length) = chunk.byte_range();
            if start + length > file_size {
                return Err(Error::oos(format!(
                    "the column chunk \"{}\" claims bytes [{}, {}) beyond the file size {}",
                    chunk.descriptor().name(),
                    start,
                    start + length,
                    file_size
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn random_bytes_are_not_a_parquet_file() {
        let mut reader = Cursor::new(vec![0u8; 64]);
        assert!(matches!(
            read_metadata(&mut reader),
            Err(Error::NotAParquetFile(_))
        ));
    }

    #[test]
    fn unclosed_file_is_distinguished() {
        let mut data = b"PAR1".to_vec();
        data.extend_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8, 9]);
        let mut reader = Cursor::new(data);
        let error = read_metadata(&mut reader).unwrap_err();
        match error {
            Error::NotProperlyClosed(message) => {
                assert!(message.contains("[2, 3, 4, 5, 6, 7, 8, 9]"));
            }
            other => panic!("expected NotProperlyClosed, got {:?}", other),
        }
    }

    #[test]
    fn too_small_file() {
        let mut reader = Cursor::new(b"PAR1".to_vec());
        assert!(matches!(
            read_metadata(&mut reader),
            Err(Error::NotAParquetFile(_))
        ));
    }
}
