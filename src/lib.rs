#![forbid(unsafe_code)]
//! A columnar file-format engine for Apache Parquet.
//!
//! The crate is split into a write pipeline (schema shredding, typed column
//! buffers, page encoding, row-group assembly) and a read pipeline (footer
//! parsing, lazy page decoding, record assembly). Both produce and consume
//! files bit-compatible with the Parquet specification, data page versions
//! 1 and 2.

pub mod bloom_filter;
pub mod bounds;
pub mod column;
pub mod compression;
pub mod encoding;
pub mod error;
pub mod indexes;
pub mod metadata;
pub mod page;
pub mod read;
pub mod schema;
pub mod shred;
pub mod statistics;
pub mod types;
pub mod value;
pub mod write;

pub use streaming_decompression::fallible_streaming_iterator;
pub use streaming_decompression::FallibleStreamingIterator;

/// The number of bytes of the footer tail: `<footer_len: u32 LE> + "PAR1"`.
const FOOTER_SIZE: u64 = 8;
/// The 4-byte magic written at both ends of every parquet file.
const HEADER_MAGIC: [u8; 4] = [b'P', b'A', b'R', b'1'];

/// The number of bytes read from the end of the file on the first read.
const DEFAULT_FOOTER_READ_SIZE: u64 = 64 * 1024;

/// The maximum number of leaf columns a schema may declare.
const MAX_LEAF_COLUMNS: usize = 127;
