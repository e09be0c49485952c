//! Drives the multi-file encoding protocol: one canonical Huffman tree per
//! file entry, chained together by in-band control symbols so a decoder
//! reading sequentially never needs an index or a length prefix.

use std::io::{Read, Seek, SeekFrom};

use crate::alphabet::{
    FrequencyTable, Symbol, ALPHABET_BITS, ARCHIVE_END, FILENAME_END, ONE_MORE_FILE,
};
use crate::bitio::BitSink;
use crate::error::ArchiverError;
use crate::huffman::{self, HuffmanCodeTable};

/// Encodes a sequence of named byte streams into an archive written through
/// `S`. Each file gets its own frequency table and code, so the archive
/// stays self-describing without a central index.
pub struct ArchiveEncoder<S: BitSink> {
    sink: Option<S>,
    /// The code table used for the most recently encoded file, needed to
    /// emit the control symbol (`OneMoreFile` or `ArchiveEnd`) that follows
    /// it — those symbols are coded under the entry they terminate, not the
    /// one that follows.
    previous_table: Option<HuffmanCodeTable>,
}

impl<S: BitSink> ArchiveEncoder<S> {
    pub fn new(sink: S) -> Self {
        ArchiveEncoder {
            sink: Some(sink),
            previous_table: None,
        }
    }

    /// Encodes one file entry: `name` and the full contents of `source`
    /// (read twice — once to tally frequencies, once to emit codes — so
    /// `source` must support seeking back to the start).
    pub fn encode_file<R: Read + Seek>(
        &mut self,
        name: &[u8],
        source: &mut R,
    ) -> Result<(), ArchiverError> {
        let sink = self.sink.as_mut().expect("encoder used after close");

        if let Some(table) = self.previous_table.take() {
            write_symbol(sink, &table, ONE_MORE_FILE)?;
        }

        let mut frequencies = FrequencyTable::new();
        frequencies.prime_control_symbols();
        for &byte in name {
            frequencies.increment(byte as Symbol);
        }
        source.seek(SeekFrom::Start(0))?;
        let mut buffer = [0u8; 8192];
        loop {
            let read = source.read(&mut buffer)?;
            if read == 0 {
                break;
            }
            for &byte in &buffer[..read] {
                frequencies.increment(byte as Symbol);
            }
        }

        let table = huffman::build(&frequencies);
        write_header(sink, &table)?;

        for &byte in name {
            write_symbol(sink, &table, byte as Symbol)?;
        }
        write_symbol(sink, &table, FILENAME_END)?;

        source.seek(SeekFrom::Start(0))?;
        loop {
            let read = source.read(&mut buffer)?;
            if read == 0 {
                break;
            }
            for &byte in &buffer[..read] {
                write_symbol(sink, &table, byte as Symbol)?;
            }
        }

        self.previous_table = Some(table);
        Ok(())
    }

    /// Convenience wrapper over [`encode_file`](Self::encode_file) for
    /// in-memory content, for callers whose source is not naturally a
    /// seekable stream.
    pub fn encode_bytes(&mut self, name: &[u8], data: &[u8]) -> Result<(), ArchiverError> {
        let mut cursor = std::io::Cursor::new(data);
        self.encode_file(name, &mut cursor)
    }

    /// Terminates the archive, flushes the underlying sink, and hands it
    /// back. Calling this before any file has been encoded is a programming
    /// error: there is no code table yet under which to write `ArchiveEnd`.
    pub fn close(mut self) -> Result<S, ArchiverError> {
        self.close_impl()?;
        Ok(self.sink.take().expect("sink taken before close_impl ran"))
    }

    fn close_impl(&mut self) -> Result<(), ArchiverError> {
        let Some(sink) = self.sink.as_mut() else {
            return Ok(());
        };
        let table = self
            .previous_table
            .take()
            .ok_or(ArchiverError::Usage("closed an encoder with no files written"))?;
        write_symbol(sink, &table, ARCHIVE_END)?;
        sink.close()?;
        Ok(())
    }
}

impl<S: BitSink> Drop for ArchiveEncoder<S> {
    fn drop(&mut self) {
        if self.sink.is_some() && self.previous_table.is_some() {
            let _ = self.close_impl();
        }
    }
}

fn write_header<S: BitSink>(sink: &mut S, table: &HuffmanCodeTable) -> Result<(), ArchiverError> {
    let order = table.canonical_order();
    sink.write_int(order.len() as u32, ALPHABET_BITS)?;
    for &symbol in order {
        sink.write_int(symbol as u32, ALPHABET_BITS)?;
    }
    for &count in table.length_counts() {
        sink.write_int(count, ALPHABET_BITS)?;
    }
    Ok(())
}

fn write_symbol<S: BitSink>(
    sink: &mut S,
    table: &HuffmanCodeTable,
    symbol: Symbol,
) -> Result<(), ArchiverError> {
    let code = table
        .code(symbol)
        .expect("symbol absent from its own file's code table");
    for bit in code.iter() {
        sink.write_bit(bit)?;
    }
    Ok(())
}
