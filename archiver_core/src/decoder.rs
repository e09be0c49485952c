//! Drives the inverse of [`crate::encoder`]: reads one header-prefixed file
//! entry at a time, following the in-band control symbols to know when a
//! file ends and whether another follows.

use std::io::Write;

use crate::alphabet::{Symbol, ALPHABET_BITS, ARCHIVE_END, FILENAME_END, ONE_MORE_FILE};
use crate::bitio::BitSource;
use crate::canonical::{self, DecodingTreeStore};
use crate::error::{truncated, ArchiverError};
use crate::tree::NodeHandle;

/// Decodes a sequence of file entries from an archive read through `R`.
pub struct ArchiveDecoder<R: BitSource> {
    source: R,
    done: bool,
}

/// One decoded file entry: its name bytes (kept raw — the wire format never
/// asserts an encoding) and, separately, the bytes already streamed to the
/// caller's sink.
pub struct DecodedEntry {
    pub name: Vec<u8>,
}

impl<R: BitSource> ArchiveDecoder<R> {
    pub fn new(source: R) -> Self {
        ArchiveDecoder { source, done: false }
    }

    /// Whether the archive terminator has already been read. Calling
    /// [`decode_next`](Self::decode_next) after this is `true` is a
    /// programming error.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Decodes the next file entry, writing its payload to `out` and
    /// returning its name.
    pub fn decode_next<W: Write>(&mut self, out: &mut W) -> Result<DecodedEntry, ArchiverError> {
        if self.done {
            return Err(ArchiverError::Usage(
                "decode_next called after the archive terminator",
            ));
        }

        let (order, length_counts) = read_header(&mut self.source).map_err(truncated)?;
        let (store, root) = canonical::build_tree(&order, &length_counts)?;

        let mut name = Vec::new();
        loop {
            let symbol = read_symbol(&mut self.source, &store, root).map_err(truncated)?;
            match symbol {
                FILENAME_END => break,
                ONE_MORE_FILE | ARCHIVE_END => {
                    return Err(ArchiverError::MalformedArchive(
                        "control symbol encountered while decoding a file name".to_string(),
                    ));
                }
                byte if byte < 256 => name.push(byte as u8),
                _ => unreachable!("symbol is either a byte or a known control value"),
            }
        }

        loop {
            let symbol = read_symbol(&mut self.source, &store, root).map_err(truncated)?;
            match symbol {
                FILENAME_END => {
                    return Err(ArchiverError::MalformedArchive(
                        "FilenameEnd encountered while decoding file contents".to_string(),
                    ));
                }
                ONE_MORE_FILE => break,
                ARCHIVE_END => {
                    self.done = true;
                    break;
                }
                byte if byte < 256 => out.write_all(&[byte as u8])?,
                _ => unreachable!("symbol is either a byte or a known control value"),
            }
        }

        Ok(DecodedEntry { name })
    }
}

fn read_header<R: BitSource>(source: &mut R) -> Result<(Vec<Symbol>, Vec<u32>), ArchiverError> {
    let symbol_count = source.read_int(ALPHABET_BITS)? as usize;
    let mut order = Vec::with_capacity(symbol_count);
    for _ in 0..symbol_count {
        order.push(source.read_int(ALPHABET_BITS)? as Symbol);
    }

    // A single-symbol alphabet gets a zero-length code, so the encoder never
    // writes a length-class field for it; reading one here would consume
    // bits belonging to whatever follows.
    if symbol_count == 1 {
        return Ok((order, Vec::new()));
    }

    let mut length_counts = Vec::new();
    let mut accumulated = 0usize;
    while accumulated < symbol_count {
        let count = source.read_int(ALPHABET_BITS)?;
        accumulated += count as usize;
        if accumulated > symbol_count {
            return Err(ArchiverError::MalformedArchive(
                "length-class counts overshoot the declared symbol count".to_string(),
            ));
        }
        length_counts.push(count);
    }

    Ok((order, length_counts))
}

fn read_symbol<R: BitSource>(
    source: &mut R,
    store: &DecodingTreeStore,
    root: NodeHandle,
) -> Result<Symbol, ArchiverError> {
    let mut node = root;
    while !store.is_leaf(node) {
        let bit = source.read_bit()?;
        let (left, right) = store.children(node).expect("internal node has children");
        node = if bit { right } else { left };
    }
    Ok(*store.info(node))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitio::{BitSink, VecBitSink, VecBitSource};
    use crate::encoder::ArchiveEncoder;

    #[test]
    fn round_trips_a_single_file() {
        let mut encoder = ArchiveEncoder::new(VecBitSink::new());
        encoder.encode_bytes(b"a", &vec![b'a'; 44]).unwrap();
        let sink = encoder.close().unwrap();
        let bytes = sink.into_bytes().unwrap();

        let mut decoder = ArchiveDecoder::new(VecBitSource::new(&bytes));
        let mut content = Vec::new();
        let entry = decoder.decode_next(&mut content).unwrap();
        assert_eq!(entry.name, b"a");
        assert_eq!(content, vec![b'a'; 44]);
        assert!(decoder.is_done());
    }

    #[test]
    fn round_trips_multiple_files_in_order() {
        let mut encoder = ArchiveEncoder::new(VecBitSink::new());
        encoder.encode_bytes(b"first.txt", b"hello world").unwrap();
        encoder.encode_bytes(b"second.txt", b"goodbye").unwrap();
        let sink = encoder.close().unwrap();
        let bytes = sink.into_bytes().unwrap();

        let mut decoder = ArchiveDecoder::new(VecBitSource::new(&bytes));

        let mut first = Vec::new();
        let first_entry = decoder.decode_next(&mut first).unwrap();
        assert_eq!(first_entry.name, b"first.txt");
        assert_eq!(first, b"hello world");
        assert!(!decoder.is_done());

        let mut second = Vec::new();
        let second_entry = decoder.decode_next(&mut second).unwrap();
        assert_eq!(second_entry.name, b"second.txt");
        assert_eq!(second, b"goodbye");
        assert!(decoder.is_done());
    }

    #[test]
    fn round_trips_empty_file() {
        let mut encoder = ArchiveEncoder::new(VecBitSink::new());
        encoder.encode_bytes(b"empty", b"").unwrap();
        let sink = encoder.close().unwrap();
        let bytes = sink.into_bytes().unwrap();

        let mut decoder = ArchiveDecoder::new(VecBitSource::new(&bytes));
        let mut content = Vec::new();
        let entry = decoder.decode_next(&mut content).unwrap();
        assert_eq!(entry.name, b"empty");
        assert!(content.is_empty());
    }

    #[test]
    fn truncated_archive_is_malformed_not_end_of_stream() {
        let mut encoder = ArchiveEncoder::new(VecBitSink::new());
        encoder.encode_bytes(b"a", &vec![b'a'; 44]).unwrap();
        let sink = encoder.close().unwrap();
        let bytes = sink.into_bytes().unwrap();
        let truncated_bytes = &bytes[..bytes.len() / 2];

        let mut decoder = ArchiveDecoder::new(VecBitSource::new(truncated_bytes));
        let mut content = Vec::new();
        let result = decoder.decode_next(&mut content);
        assert!(matches!(result, Err(ArchiverError::MalformedArchive(_))));
    }

    #[test]
    fn overshooting_length_counts_is_malformed_without_partial_output() {
        let mut sink = VecBitSink::new();
        sink.write_int(3, ALPHABET_BITS).unwrap();
        sink.write_int(b'a' as u32, ALPHABET_BITS).unwrap();
        sink.write_int(b'b' as u32, ALPHABET_BITS).unwrap();
        sink.write_int(b'c' as u32, ALPHABET_BITS).unwrap();
        // Claims 4 length-1 symbols when only 3 symbols were declared.
        sink.write_int(4, ALPHABET_BITS).unwrap();
        let bytes = sink.into_bytes().unwrap();

        let mut decoder = ArchiveDecoder::new(VecBitSource::new(&bytes));
        let mut content = Vec::new();
        let result = decoder.decode_next(&mut content);
        assert!(matches!(result, Err(ArchiverError::MalformedArchive(_))));
        assert!(content.is_empty());
    }

    #[test]
    fn control_symbol_during_name_is_malformed() {
        use crate::alphabet::FrequencyTable;
        use crate::huffman;

        let mut freq = FrequencyTable::new();
        freq.increment(b'a' as Symbol);
        freq.prime_control_symbols();
        let table = huffman::build(&freq);

        let mut sink = VecBitSink::new();
        sink.write_int(table.canonical_order().len() as u32, ALPHABET_BITS)
            .unwrap();
        for &symbol in table.canonical_order() {
            sink.write_int(symbol as u32, ALPHABET_BITS).unwrap();
        }
        for &count in table.length_counts() {
            sink.write_int(count, ALPHABET_BITS).unwrap();
        }
        // ArchiveEnd's code appears where the first name byte should be.
        for bit in table.code(ARCHIVE_END).unwrap().iter() {
            sink.write_bit(bit).unwrap();
        }
        let bytes = sink.into_bytes().unwrap();

        let mut decoder = ArchiveDecoder::new(VecBitSource::new(&bytes));
        let mut content = Vec::new();
        let result = decoder.decode_next(&mut content);
        assert!(matches!(result, Err(ArchiverError::MalformedArchive(_))));
        assert!(content.is_empty());
    }

    #[test]
    fn decoding_after_done_is_a_usage_error() {
        let mut encoder = ArchiveEncoder::new(VecBitSink::new());
        encoder.encode_bytes(b"a", b"x").unwrap();
        let sink = encoder.close().unwrap();
        let bytes = sink.into_bytes().unwrap();

        let mut decoder = ArchiveDecoder::new(VecBitSource::new(&bytes));
        let mut content = Vec::new();
        decoder.decode_next(&mut content).unwrap();
        assert!(decoder.is_done());

        let mut discard = Vec::new();
        assert!(matches!(
            decoder.decode_next(&mut discard),
            Err(ArchiverError::Usage(_))
        ));
    }
}
