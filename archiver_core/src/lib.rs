//! Canonical Huffman archive encoding and decoding.
//!
//! An archive is a sequence of independently Huffman-coded file entries,
//! each prefixed by its own canonical code table and terminated by an
//! in-band control symbol that also announces whether another entry
//! follows. See [`ArchiveEncoder`] and [`ArchiveDecoder`] for the entry
//! points; the rest of the modules are the machinery those two build on.

pub mod alphabet;
pub mod bitio;
pub mod canonical;
pub mod encoder;
pub mod error;
pub mod huffman;
pub mod priority_queue;
pub mod tree;

mod decoder;

pub use alphabet::{FrequencyTable, Symbol, ALPHABET_BITS, ALPHABET_SIZE, ARCHIVE_END, FILENAME_END, ONE_MORE_FILE};
pub use bitio::{BitSink, BitSource, StreamBitSink, StreamBitSource, VecBitSink, VecBitSource};
pub use decoder::{ArchiveDecoder, DecodedEntry};
pub use encoder::ArchiveEncoder;
pub use error::ArchiverError;
pub use huffman::HuffmanCodeTable;
