use crate::{bitstreams::{BinaryReader, BinaryWriterBuilder}, error::CodecError};

use super::*;

fn bits(s: &str) -> Vec<bool> {
    s.chars().map(|c| c == '1').collect()
}

fn ten_symbol_trie() -> HuffNode<usize> {
    let mut builder = HuffmanTreeBuilder::new();
    let leaves = (1..=10).map(|i| builder.leaf(i, i as u64)).collect();
    builder.build(leaves).unwrap()
}

#[test]
fn test_trie_creation_and_tree_search() {
    let paths = ["01110", "01111", "0110", "1110", "1111", "010", "100", "101", "110", "00"];

    let root = ten_symbol_trie();
    let codebook = root.codebook();

    assert_eq!(root.weight, 55);
    assert_eq!(root.left.as_ref().unwrap().weight, 22);
    assert_eq!(root.right.as_ref().unwrap().weight, 33);

    for (i, path) in paths.iter().enumerate() {
        let value = i + 1;
        assert_eq!(codebook.find_path(&value).unwrap(), bits(path).as_slice(), "symbol {value}");
        assert_eq!(*root.find_value(&bits(path)).unwrap(), value);
    }
}

#[test]
fn test_merge_weights_are_sums() {
    fn check(node: &HuffNode<usize>) {
        match (&node.left, &node.right) {
            (Some(l), Some(r)) => {
                assert!(node.value.is_none());
                assert_eq!(node.weight, l.weight + r.weight);
                check(l);
                check(r);
            }
            (None, None) => assert!(node.value.is_some()),
            _ => panic!("node {} has a single child", node.id),
        }
    }

    check(&ten_symbol_trie());
}

#[test]
fn test_codebook_covers_every_leaf() {
    let root = ten_symbol_trie();
    let codebook = root.codebook();

    for value in 1..=10 {
        let path = codebook.find_path(&value).unwrap();
        assert_eq!(*root.find_value(path).unwrap(), value);
    }
    assert!(matches!(codebook.find_path(&11), Err(CodecError::InternalInvariantViolation(_))));
}

#[test]
fn test_large_alphabet_builds_quickly() {
    let mut builder = HuffmanTreeBuilder::new();
    let leaves = (0..100_000u64).map(|i| builder.leaf(i, 1 + i % 3)).collect();
    let root = builder.build(leaves).unwrap();

    let weight: u64 = (0..100_000u64).map(|i| 1 + i % 3).sum();
    assert_eq!(root.weight, weight);

    let codebook = root.codebook();
    for value in [0, 1, 2, 50_000, 99_999] {
        assert_eq!(*root.find_value(codebook.find_path(&value).unwrap()).unwrap(), value);
    }
}

#[test]
fn test_find_value_rejects_unresolved_bits() {
    let root = ten_symbol_trie();

    // Stops on an internal node.
    assert!(matches!(root.find_value(&bits("01")), Err(CodecError::CorruptPayload(_))));
    // Walks past a leaf.
    assert!(matches!(root.find_value(&bits("001")), Err(CodecError::CorruptPayload(_))));
}

#[test]
fn test_read_symbol_from_stream() {
    let root = ten_symbol_trie();
    let codebook = root.codebook();
    let message = [3, 10, 1, 7, 7, 5];

    let mut writer = BinaryWriterBuilder::new();
    for value in message.iter() {
        writer.push_code(codebook.find_path(value).unwrap());
    }
    let mut reader = BinaryReader::new(writer.build().os);

    for value in message.iter() {
        assert_eq!(root.read_symbol(&mut reader).unwrap(), value);
    }
}

#[test]
fn test_read_symbol_on_exhausted_stream() {
    let root = ten_symbol_trie();
    let mut reader = BinaryReader::new(Box::new([]));

    assert!(matches!(root.read_symbol(&mut reader), Err(CodecError::CorruptPayload(_))));
}

#[test]
fn test_build_needs_two_symbols() {
    let mut builder = HuffmanTreeBuilder::new();
    let single = vec![builder.leaf("only", 1)];

    assert!(matches!(builder.build(single), Err(CodecError::InternalInvariantViolation(_))));
    assert!(matches!(builder.build(Vec::<HuffNode<u8>>::new()), Err(CodecError::InternalInvariantViolation(_))));
}

#[test]
fn test_ids_are_scoped_to_builder() {
    let first = ten_symbol_trie();
    let second = ten_symbol_trie();

    // 10 leaves + 9 merges, the root is allocated last.
    assert_eq!(first.id, 18);
    assert_eq!(second.id, 18);
}

#[test]
fn test_segment_trie_is_deterministic() {
    let segments: Vec<String> = ["x", "y", "z", "content"].iter().map(|s| s.to_string()).collect();

    let encoder_side = segment_trie(&mut HuffmanTreeBuilder::new(), &segments).unwrap().codebook();

    let mut builder = HuffmanTreeBuilder::new();
    builder.leaf("unrelated", 5);
    let decoder_side = segment_trie(&mut builder, &segments).unwrap();

    for segment in segments.iter().cloned().map(SegmentValue::Name).chain([SegmentValue::EndOfSegments]) {
        let path = encoder_side.find_path(&segment).unwrap();
        assert_eq!(decoder_side.find_value(path).unwrap(), &segment);
    }
}

#[test]
fn test_node_trie_skips_first_position() {
    let values = [NodeValue::Node(0), NodeValue::Node(1), NodeValue::Placeholder];
    let root = node_trie(&mut HuffmanTreeBuilder::new(), &values).unwrap();
    let codebook = root.codebook();

    assert!(codebook.find_path(&NodeValue::Node(0)).is_err());
    assert_eq!(codebook.find_path(&NodeValue::Node(1)).unwrap(), &[false]);
    assert_eq!(codebook.find_path(&NodeValue::Placeholder).unwrap(), &[true]);
    assert_eq!(root.weight, 3);

    // The decoder side only knows positions; the shape is the same.
    let positions = node_trie(&mut HuffmanTreeBuilder::new(), &[0usize, 1, 2]).unwrap();
    assert_eq!(*positions.find_value(&[false]).unwrap(), 1);
    assert_eq!(*positions.find_value(&[true]).unwrap(), 2);
}
