//! Errors surfaced by the read and write pipelines.

/// List of errors this crate exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The file or page does not follow the parquet specification.
    OutOfSpec(String),
    /// Neither the leading nor the trailing magic is present.
    NotAParquetFile(String),
    /// The leading magic is present but the trailing one is not: the file
    /// was truncated or its writer never closed it.
    NotProperlyClosed(String),
    /// An option given at construction time is invalid.
    InvalidConfiguration(String),
    /// A value or buffer does not have the physical type the schema declares.
    TypeMismatch(String),
    /// A cross-type write could not be converted.
    Coercion(String),
    /// A dictionary-encoded page referenced an index beyond the dictionary.
    IndexOutOfBounds {
        index: usize,
        length: usize,
    },
    /// The chunk declares no column index.
    MissingColumnIndex,
    /// The chunk declares no offset index.
    MissingOffsetIndex,
    /// The chunk declares no bloom filter.
    MissingBloomFilter,
    /// A concurrent row-group handle committed before an earlier handle.
    OutOfOrderCommit {
        expected: usize,
        found: usize,
    },
    /// The requested compression requires a non-default feature.
    FeatureNotActive(String),
    /// An error from the underlying reader or writer.
    Transport(String),
}

impl Error {
    pub(crate) fn oos<I: Into<String>>(message: I) -> Self {
        Self::OutOfSpec(message.into())
    }
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::OutOfSpec(message) => write!(fmt, "file out of spec: {}", message),
            Error::NotAParquetFile(message) => write!(fmt, "not a parquet file: {}", message),
            Error::NotProperlyClosed(message) => {
                write!(fmt, "parquet file not properly closed: {}", message)
            }
            Error::InvalidConfiguration(message) => {
                write!(fmt, "invalid configuration: {}", message)
            }
            Error::TypeMismatch(message) => write!(fmt, "type mismatch: {}", message),
            Error::Coercion(message) => write!(fmt, "coercion failed: {}", message),
            Error::IndexOutOfBounds { index, length } => write!(
                fmt,
                "index {} out of bounds of a dictionary of length {}",
                index, length
            ),
            Error::MissingColumnIndex => write!(fmt, "the column chunk has no column index"),
            Error::MissingOffsetIndex => write!(fmt, "the column chunk has no offset index"),
            Error::MissingBloomFilter => write!(fmt, "the column chunk has no bloom filter"),
            Error::OutOfOrderCommit { expected, found } => write!(
                fmt,
                "concurrent handle {} committed while handle {} is still pending",
                found, expected
            ),
            Error::FeatureNotActive(message) => {
                write!(fmt, "feature not active: {}", message)
            }
            Error::Transport(message) => write!(fmt, "underlying IO error: {}", message),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::Transport(e.to_string())
    }
}

impl From<parquet_format_safe::thrift::Error> for Error {
    fn from(e: parquet_format_safe::thrift::Error) -> Error {
        Error::OutOfSpec(format!("invalid thrift: {}", e))
    }
}

#[cfg(feature = "snappy")]
impl From<snap::Error> for Error {
    fn from(e: snap::Error) -> Error {
        Error::Transport(format!("underlying snap error: {}", e))
    }
}

impl From<std::num::TryFromIntError> for Error {
    fn from(e: std::num::TryFromIntError) -> Error {
        Error::OutOfSpec(format!("number does not fit its target width: {}", e))
    }
}

impl From<std::array::TryFromSliceError> for Error {
    fn from(e: std::array::TryFromSliceError) -> Error {
        Error::OutOfSpec(format!("unexpected byte length: {}", e))
    }
}

/// A specialized `Result` for this crate's errors.
pub type Result<T> = std::result::Result<T, Error>;
