//! Canonical Huffman code construction: build a tree from a frequency
//! table, then reassign its leaves lexicographically-ascending codes within
//! each length class so that code *shape* alone (which symbols got which
//! length) is enough to reconstruct the tree on the other end.

use bit_vec::BitVec;

use crate::alphabet::{FrequencyTable, Symbol, ALPHABET_SIZE};
use crate::priority_queue::{HeapKey, PriorityQueue};
use crate::tree::TreeStore;

/// Per-subtree bookkeeping carried through tree construction: a subtree's
/// total weight and the smallest symbol it contains, the latter used only
/// to keep merges deterministic.
#[derive(Debug, Clone, Copy)]
struct SubtreeInfo {
    occurrences: u64,
    min_symbol: Symbol,
}

/// The canonical code table produced for one file entry's alphabet.
pub struct HuffmanCodeTable {
    codes: Box<[Option<BitVec>; ALPHABET_SIZE]>,
    canonical_order: Vec<Symbol>,
    length_counts: Vec<u32>,
}

impl HuffmanCodeTable {
    /// The code assigned to `symbol`, if it appeared in the source frequency
    /// table.
    pub fn code(&self, symbol: Symbol) -> Option<&BitVec> {
        self.codes[symbol as usize].as_ref()
    }

    /// Symbols in ascending `(length, symbol)` order — the order in which
    /// the header lists them.
    pub fn canonical_order(&self) -> &[Symbol] {
        &self.canonical_order
    }

    /// `length_counts[i]` is the number of symbols assigned a code of length
    /// `i + 1`.
    pub fn length_counts(&self) -> &[u32] {
        &self.length_counts
    }
}

/// Builds a canonical Huffman code table from `frequencies`.
///
/// `frequencies` must have at least one symbol with a positive count; in
/// practice the three control symbols are always primed to at least 1
/// before this is called, so a real file entry never triggers that case.
pub fn build(frequencies: &FrequencyTable) -> HuffmanCodeTable {
    let mut store: TreeStore<SubtreeInfo> = TreeStore::new();
    let mut queue: PriorityQueue<crate::tree::NodeHandle> = PriorityQueue::new();

    for (symbol, frequency) in frequencies.present_symbols() {
        let info = SubtreeInfo {
            occurrences: frequency as u64,
            min_symbol: symbol,
        };
        let handle = store.leaf(info);
        queue.push(
            HeapKey {
                frequency: info.occurrences,
                min_symbol: info.min_symbol,
            },
            handle,
        );
    }

    while queue.len() > 1 {
        let (left_key, left_handle) = queue.pop().expect("len > 1");
        let (right_key, right_handle) = queue.pop().expect("len > 1");
        let combined = SubtreeInfo {
            occurrences: left_key.frequency + right_key.frequency,
            min_symbol: left_key.min_symbol.min(right_key.min_symbol),
        };
        let handle = store.unite(left_handle, right_handle, combined);
        queue.push(
            HeapKey {
                frequency: combined.occurrences,
                min_symbol: combined.min_symbol,
            },
            handle,
        );
    }

    let root = queue.pop().map(|(_, handle)| handle);

    let mut lengths: Vec<(Symbol, usize)> = match root {
        Some(root) => store
            .enumerate_paths(root)
            .into_iter()
            .map(|(info, path)| (info.min_symbol, path.len()))
            .collect(),
        None => Vec::new(),
    };

    // `enumerate_paths` returns leaves keyed by their own info, but a leaf's
    // `SubtreeInfo.min_symbol` is the leaf's own symbol (a leaf's subtree
    // contains only itself), so this is exactly the (symbol, code length)
    // pairing canonical assignment needs.
    lengths.sort_by_key(|&(symbol, length)| (length, symbol));

    let canonical_order: Vec<Symbol> = lengths.iter().map(|&(symbol, _)| symbol).collect();

    let max_length = lengths.iter().map(|&(_, len)| len).max().unwrap_or(0);
    let mut length_counts = vec![0u32; max_length];
    for &(_, len) in &lengths {
        if len > 0 {
            length_counts[len - 1] += 1;
        }
    }

    let mut codes: Box<[Option<BitVec>; ALPHABET_SIZE]> =
        Box::new(std::array::from_fn(|_| None));
    let mut current_code = BitVec::new();
    let mut prev_length = 0usize;
    for &(symbol, length) in &lengths {
        if length == 0 {
            // The single-symbol edge case: one leaf, the root itself, code
            // length zero. Nothing to emit; the symbol is implicit.
            codes[symbol as usize] = Some(BitVec::new());
            continue;
        }
        if prev_length == 0 {
            current_code = BitVec::from_elem(length, false);
        } else {
            current_code.truncate(prev_length.min(length));
            increment_with_carry(&mut current_code);
            current_code.grow(length - current_code.len(), false);
        }
        codes[symbol as usize] = Some(current_code.clone());
        prev_length = length;
    }

    HuffmanCodeTable {
        codes,
        canonical_order,
        length_counts,
    }
}

/// Adds one to a bit string, MSB-first, propagating carry leftward. Given
/// the lengths canonical assignment feeds it, this never carries past the
/// first bit: the Kraft sum of a valid code never permits it.
fn increment_with_carry(bits: &mut BitVec) {
    for i in (0..bits.len()).rev() {
        if !bits.get(i).unwrap() {
            bits.set(i, true);
            return;
        }
        bits.set(i, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::{ARCHIVE_END, FILENAME_END, ONE_MORE_FILE};

    #[test]
    fn single_symbol_gets_empty_code() {
        let mut freq = FrequencyTable::new();
        freq.increment(b'a' as Symbol);
        let table = build(&freq);
        assert_eq!(table.code(b'a' as Symbol).unwrap().len(), 0);
        assert_eq!(table.canonical_order(), &[b'a' as Symbol]);
    }

    #[test]
    fn codes_are_prefix_free_and_lengths_match_counts() {
        let mut freq = FrequencyTable::new();
        for _ in 0..44 {
            freq.increment(b'a' as Symbol);
        }
        freq.prime_control_symbols();
        let table = build(&freq);

        let mut codes: Vec<BitVec> = Vec::new();
        for &symbol in table.canonical_order() {
            codes.push(table.code(symbol).unwrap().clone());
        }
        for i in 0..codes.len() {
            for j in 0..codes.len() {
                if i == j {
                    continue;
                }
                let shorter = &codes[i];
                let longer = &codes[j];
                if shorter.len() <= longer.len() {
                    let prefix: BitVec = longer.iter().take(shorter.len()).collect();
                    assert_ne!(&prefix, shorter, "code {i} is a prefix of code {j}");
                }
            }
        }

        let total: u32 = table.length_counts().iter().sum();
        assert_eq!(total as usize, table.canonical_order().len());
    }

    #[test]
    fn canonical_order_sorted_by_length_then_symbol() {
        let mut freq = FrequencyTable::new();
        freq.increment(FILENAME_END);
        freq.increment(ONE_MORE_FILE);
        freq.increment(ARCHIVE_END);
        freq.increment(b'a' as Symbol);
        let table = build(&freq);

        let lengths: Vec<usize> = table
            .canonical_order()
            .iter()
            .map(|&s| table.code(s).unwrap().len())
            .collect();
        let mut sorted = lengths.clone();
        sorted.sort_unstable();
        assert_eq!(lengths, sorted);
    }
}
