//! Huffman entropy stage for the uz1 pipeline.
//!
//! This is the only stage whose output is not a byte stream: it emits a
//! byte-aligned `total:u32` followed by a single bit stream that runs to the
//! end of the container. The bit stream carries the decoding tree itself
//! (pre-order: bit `1` for an internal node followed by both children, bit
//! `0` for a leaf followed by its symbol in eight LSB-first bits) and then
//! one code word per input byte. The final byte is zero-padded.
//!
//! The tree is a plain ownership hierarchy: each node owns its children and
//! dropping the root drops everything. The encoder's symbol lookup is a
//! separate table of code words built by one traversal after the tree is
//! final, so no node is shared between the tree and the lookup.

use std::io::{Read, Write};
use uzpak_core::{wire, BitReader, BitWriter, Result, UzError};

/// Leaf count of a complete tree; also the cap when rebuilding an embedded
/// tree from untrusted input.
const MAX_LEAVES: usize = 256;

/// Deepest node position a 256-leaf tree can produce.
const MAX_DEPTH: usize = 255;

enum Tree {
    Leaf(u8),
    /// Children in descent order: bit 0 selects the left field.
    Node(Box<Tree>, Box<Tree>),
}

/// Huffman-encode `data`, writing `total:u32` and the bit stream to
/// `output`.
pub fn encode<W: Write>(data: &[u8], output: &mut W) -> Result<()> {
    let mut freq = [0u64; 256];
    for &byte in data {
        freq[byte as usize] += 1;
    }
    wire::write_u32_le(output, data.len() as u32)?;

    let tree = build_tree(&freq);
    let codes = code_table(&tree);

    let mut bits = BitWriter::new(output);
    write_tree(&tree, &mut bits)?;
    for &byte in data {
        for &bit in &codes[byte as usize] {
            bits.write_bit(bit)?;
        }
    }
    bits.flush()
}

/// Decode a Huffman section from `input`, consuming it to the end.
pub fn decode<R: Read>(input: &mut R) -> Result<Vec<u8>> {
    let total = wire::read_u32_le(input)? as usize;

    let mut bits = BitReader::new(input);
    let mut leaves = 0usize;
    let tree = read_tree(&mut bits, &mut leaves, 0)?;

    let mut out = Vec::with_capacity(total);
    for _ in 0..total {
        let mut node = &tree;
        loop {
            match node {
                Tree::Leaf(symbol) => {
                    out.push(*symbol);
                    break;
                }
                Tree::Node(zero, one) => {
                    node = if take_bit(&mut bits)? {
                        one.as_ref()
                    } else {
                        zero.as_ref()
                    };
                }
            }
        }
    }
    Ok(out)
}

/// Build the coding tree from symbol frequencies.
///
/// Leaves are created in symbol order and stable-sorted descending by
/// weight, trailing zero-weight leaves are dropped (always keeping one), and
/// the two rightmost nodes are merged repeatedly: the first one popped
/// becomes child 0, the second child 1, and the merged node re-enters the
/// list ahead of the first strictly lighter entry so the list stays sorted
/// and stable. With a single surviving leaf the root is that leaf and its
/// code word is empty.
fn build_tree(freq: &[u64; 256]) -> Tree {
    struct Weighted {
        weight: u64,
        tree: Tree,
    }

    let mut nodes: Vec<Weighted> = freq
        .iter()
        .enumerate()
        .map(|(symbol, &weight)| Weighted {
            weight,
            tree: Tree::Leaf(symbol as u8),
        })
        .collect();
    nodes.sort_by(|a, b| b.weight.cmp(&a.weight));

    while nodes.len() > 1 && nodes.last().is_some_and(|node| node.weight == 0) {
        nodes.pop();
    }

    while nodes.len() > 1 {
        let zero = nodes.pop().expect("loop guard keeps two nodes");
        let one = nodes.pop().expect("loop guard keeps two nodes");
        let merged = Weighted {
            weight: zero.weight + one.weight,
            tree: Tree::Node(Box::new(zero.tree), Box::new(one.tree)),
        };
        let slot = nodes
            .iter()
            .position(|node| node.weight < merged.weight)
            .unwrap_or(nodes.len());
        nodes.insert(slot, merged);
    }

    nodes
        .pop()
        .map(|node| node.tree)
        .expect("at least one leaf survives")
}

/// Map each symbol to its code word, the root-to-leaf bit path.
fn code_table(tree: &Tree) -> Vec<Vec<bool>> {
    let mut codes = vec![Vec::new(); 256];
    let mut path = Vec::new();
    collect_codes(tree, &mut path, &mut codes);
    codes
}

fn collect_codes(tree: &Tree, path: &mut Vec<bool>, codes: &mut [Vec<bool>]) {
    match tree {
        Tree::Leaf(symbol) => codes[*symbol as usize] = path.clone(),
        Tree::Node(zero, one) => {
            path.push(false);
            collect_codes(zero, path, codes);
            path.pop();
            path.push(true);
            collect_codes(one, path, codes);
            path.pop();
        }
    }
}

fn write_tree<W: Write>(tree: &Tree, bits: &mut BitWriter<W>) -> Result<()> {
    match tree {
        Tree::Leaf(symbol) => {
            bits.write_bit(false)?;
            bits.write_bits(u32::from(*symbol), 8)
        }
        Tree::Node(zero, one) => {
            bits.write_bit(true)?;
            write_tree(zero, bits)?;
            write_tree(one, bits)
        }
    }
}

/// Rebuild a serialized tree, bounding leaves and depth so corrupt input
/// cannot balloon the node count past a complete 256-leaf tree.
fn read_tree<R: Read>(bits: &mut BitReader<R>, leaves: &mut usize, depth: usize) -> Result<Tree> {
    if depth > MAX_DEPTH {
        return Err(UzError::corrupt(
            "huffman",
            "embedded tree exceeds the depth of a complete tree",
        ));
    }

    if take_bit(bits)? {
        let zero = read_tree(bits, leaves, depth + 1)?;
        let one = read_tree(bits, leaves, depth + 1)?;
        Ok(Tree::Node(Box::new(zero), Box::new(one)))
    } else {
        *leaves += 1;
        if *leaves > MAX_LEAVES {
            return Err(UzError::corrupt(
                "huffman",
                "embedded tree has more than 256 leaves",
            ));
        }
        let symbol = bits.read_bits(8).map_err(exhausted)?;
        Ok(Tree::Leaf(symbol as u8))
    }
}

fn take_bit<R: Read>(bits: &mut BitReader<R>) -> Result<bool> {
    bits.read_bit().map_err(exhausted)
}

/// Running out of bits mid-section means the block is corrupt, not merely
/// short.
fn exhausted(err: UzError) -> UzError {
    match err {
        UzError::UnexpectedEof { .. } => {
            UzError::corrupt("huffman", "bit stream exhausted before the section was complete")
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn roundtrip(data: &[u8]) -> Vec<u8> {
        let mut wire = Vec::new();
        encode(data, &mut wire).unwrap();
        decode(&mut Cursor::new(wire)).unwrap()
    }

    #[test]
    fn test_empty_input() {
        let mut wire = Vec::new();
        encode(b"", &mut wire).unwrap();
        // total:u32 plus the 9 tree bits of a lone leaf, padded to 2 bytes.
        assert_eq!(wire.len(), 6);
        assert_eq!(&wire[0..4], &[0, 0, 0, 0]);
        assert_eq!(roundtrip(b""), b"");
    }

    #[test]
    fn test_single_symbol_has_empty_code() {
        // One distinct symbol: the root is a leaf and the code words consume
        // no bits, so the section is just total + the serialized leaf.
        let data = [b'q'; 1000];
        let mut wire = Vec::new();
        encode(&data, &mut wire).unwrap();
        assert_eq!(wire.len(), 6);
        assert_eq!(roundtrip(&data), data);
    }

    #[test]
    fn test_single_byte() {
        assert_eq!(roundtrip(b"\x00"), b"\x00");
    }

    #[test]
    fn test_two_symbols() {
        // Two leaves under one root: one bit per symbol.
        let data = b"ababab";
        let mut wire = Vec::new();
        encode(data, &mut wire).unwrap();
        // total(4) + tree(1 + 2 * 9 = 19 bits) + data(6 bits) = 4 bytes of
        // bit stream.
        assert_eq!(wire.len(), 4 + 4);
        assert_eq!(roundtrip(data), data);
    }

    #[test]
    fn test_leaf_symbol_bits_are_lsb_first() {
        let mut wire = Vec::new();
        encode(b"", &mut wire).unwrap();
        // Lone zero-weight survivor is symbol 0: tree bits are a leaf flag
        // and eight zero bits.
        assert_eq!(&wire[4..], &[0, 0]);

        let data = [0x80u8; 4];
        let mut wire = Vec::new();
        encode(&data, &mut wire).unwrap();
        // Leaf flag 0, then 0x80 LSB-first: bit 7 of the symbol lands in
        // bit position 8 of the stream.
        assert_eq!(&wire[4..], &[0x00, 0x01]);
    }

    #[test]
    fn test_roundtrip_assorted() {
        let cases: &[&[u8]] = &[
            b"hello world",
            b"abracadabra",
            b"aaaaaaaaaabbbbbcccd",
            b"\x00\xFF\x00\xFF\x80\x7F",
        ];
        for &data in cases {
            assert_eq!(roundtrip(data), data, "case {data:?}");
        }
    }

    #[test]
    fn test_roundtrip_all_byte_values() {
        let mut data = Vec::new();
        for round in 0u32..4 {
            for byte in 0u32..=255 {
                for _ in 0..(byte % (round + 2)) {
                    data.push(byte as u8);
                }
            }
        }
        assert_eq!(roundtrip(&data), data);
    }

    #[test]
    fn test_truncated_bit_stream_is_corrupt() {
        let data = b"abracadabra";
        let mut wire = Vec::new();
        encode(data, &mut wire).unwrap();
        wire.truncate(wire.len() - 1);
        assert!(matches!(
            decode(&mut Cursor::new(wire)),
            Err(UzError::CorruptData { stage: "huffman", .. })
        ));
    }

    #[test]
    fn test_overlong_tree_is_corrupt() {
        // total = 1, then an endless run of internal-node flags.
        let mut wire = vec![1, 0, 0, 0];
        wire.extend_from_slice(&[0xFF; 64]);
        assert!(matches!(
            decode(&mut Cursor::new(wire)),
            Err(UzError::CorruptData { stage: "huffman", .. })
        ));
    }
}
