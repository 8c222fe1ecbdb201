use std::{
    cmp::Reverse,
    collections::{BinaryHeap, HashMap},
    fmt::Debug,
    hash::Hash,
};

use tracing::debug;

use crate::{bitstreams::BinaryReader, error::{CodecError, Result}};

/// Symbols of the segment alphabet: every distinct segment name plus a sentinel
/// closing the edge list of a node.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SegmentValue {
    Name(String),
    EndOfSegments,
}

/// Symbols of the node alphabet: a position in the canonical node order, or the
/// padding slot added for single-distinct-path trees.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeValue {
    Node(usize),
    Placeholder,
}

/// A node of a binary prefix-code trie. Leaf iff `value` is set, internal iff
/// both children are set.
#[derive(Debug)]
pub struct HuffNode<T> {
    pub id: usize,
    pub weight: u64,
    pub value: Option<T>,
    pub left: Option<Box<HuffNode<T>>>,
    pub right: Option<Box<HuffNode<T>>>,
}

impl<T> HuffNode<T> {
    #[inline(always)]
    fn step(&self, bit: bool) -> Option<&HuffNode<T>> {
        if bit {
            self.right.as_deref()
        } else {
            self.left.as_deref()
        }
    }

    /// Follows bits from `next_bit` until a leaf resolves.
    fn walk(&self, mut next_bit: impl FnMut() -> Option<bool>) -> Result<&T> {
        let mut node = self;

        loop {
            if let Some(value) = node.value.as_ref() {
                return Ok(value);
            }

            let bit = next_bit()
                .ok_or_else(|| CodecError::CorruptPayload("bit stream exhausted inside a code word".into()))?;

            node = node
                .step(bit)
                .ok_or_else(|| CodecError::CorruptPayload("encoded path not in trie".into()))?;
        }
    }

    /// Resolves a complete code word to its leaf value.
    pub fn find_value(&self, bits: &[bool]) -> Result<&T> {
        let mut bits = bits.iter().copied();
        let value = self.walk(|| bits.next())?;

        if bits.next().is_some() {
            return Err(CodecError::CorruptPayload("code word continues past a leaf".into()));
        }

        Ok(value)
    }

    /// Reads bits until a leaf resolves.
    pub fn read_symbol(&self, reader: &mut BinaryReader) -> Result<&T> {
        self.walk(|| reader.read_bit())
    }
}

impl<T: Clone + Eq + Hash> HuffNode<T> {
    /// Collects the code word of every leaf in one traversal.
    pub fn codebook(&self) -> Codebook<T> {
        let mut codes = HashMap::new();
        let mut stack = vec![(self, Vec::new())];

        while let Some((node, path)) = stack.pop() {
            if let Some(value) = node.value.as_ref() {
                codes.insert(value.clone(), path);
                continue;
            }

            for (bit, child) in [(false, &node.left), (true, &node.right)] {
                if let Some(child) = child {
                    let mut next = path.clone();
                    next.push(bit);
                    stack.push((child.as_ref(), next));
                }
            }
        }

        Codebook { codes }
    }
}

impl<T: Debug> HuffNode<T> {
    pub fn dump(&self, tab: usize) {
        debug!(
            "{}Node [{}], Weight [{}], Value = [{:?}]",
            "  ".repeat(tab + 1),
            self.id,
            self.weight,
            self.value
        );

        if let Some(left) = self.left.as_ref() {
            left.dump(tab + 1);
        }
        if let Some(right) = self.right.as_ref() {
            right.dump(tab + 1);
        }
    }
}

/// Code words of every leaf of one trie, keyed by value.
pub struct Codebook<T> {
    codes: HashMap<T, Vec<bool>>,
}

impl<T: Eq + Hash + Debug> Codebook<T> {
    pub fn find_path(&self, need: &T) -> Result<&[bool]> {
        self.codes
            .get(need)
            .map(Vec::as_slice)
            .ok_or_else(|| CodecError::InternalInvariantViolation(format!("{need:?} has no code word")))
    }
}

/// Greedy Huffman construction. Owns the id counter, so one builder serves one
/// encode or decode call and ids never leak across calls.
#[derive(Default)]
pub struct HuffmanTreeBuilder {
    next_id: usize,
}

impl HuffmanTreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> usize {
        self.next_id += 1;
        self.next_id - 1
    }

    pub fn leaf<T>(&mut self, value: T, weight: u64) -> HuffNode<T> {
        HuffNode { id: self.next_id(), weight, value: Some(value), left: None, right: None }
    }

    fn merge<T>(&mut self, left: HuffNode<T>, right: HuffNode<T>) -> HuffNode<T> {
        HuffNode {
            id: self.next_id(),
            weight: left.weight + right.weight,
            value: None,
            left: Some(Box::new(left)),
            right: Some(Box::new(right)),
        }
    }

    /// Repeatedly merges the two lightest nodes (lowest slot wins ties, the
    /// first one picked goes left) until a single root remains. Leaves take
    /// the first slots in order and every merge is appended after them.
    pub fn build<T>(&mut self, nodes: Vec<HuffNode<T>>) -> Result<HuffNode<T>> {
        if nodes.len() < 2 {
            return Err(CodecError::InternalInvariantViolation(format!(
                "a prefix code needs at least 2 symbols, got {}",
                nodes.len()
            )));
        }

        let mut queue: BinaryHeap<Reverse<(u64, usize)>> =
            nodes.iter().enumerate().map(|(slot, node)| Reverse((node.weight, slot))).collect();
        let mut slots: Vec<Option<HuffNode<T>>> = nodes.into_iter().map(Some).collect();

        while queue.len() > 1 {
            let left = take_lightest(&mut queue, &mut slots)?;
            let right = take_lightest(&mut queue, &mut slots)?;

            let merged = self.merge(left, right);
            queue.push(Reverse((merged.weight, slots.len())));
            slots.push(Some(merged));
        }

        take_lightest(&mut queue, &mut slots)
    }
}

fn take_lightest<T>(queue: &mut BinaryHeap<Reverse<(u64, usize)>>, slots: &mut [Option<HuffNode<T>>]) -> Result<HuffNode<T>> {
    queue
        .pop()
        .and_then(|Reverse((_, slot))| slots[slot].take())
        .ok_or_else(|| CodecError::InternalInvariantViolation("Huffman construction lost a node".into()))
}

/// Trie over the ordered segment dictionary: weights 1..=n in dictionary order,
/// then the end-of-segments sentinel with weight n + 1.
pub fn segment_trie(builder: &mut HuffmanTreeBuilder, segments: &[String]) -> Result<HuffNode<SegmentValue>> {
    let mut leaves = Vec::with_capacity(segments.len() + 1);

    for (i, segment) in segments.iter().enumerate() {
        leaves.push(builder.leaf(SegmentValue::Name(segment.clone()), i as u64 + 1));
    }
    leaves.push(builder.leaf(SegmentValue::EndOfSegments, segments.len() as u64 + 1));

    builder.build(leaves)
}

/// Trie over the node order: weights 0..n by position. The first node is the
/// root, which is never the target of an edge, so it gets no code word.
pub fn node_trie<T: Copy>(builder: &mut HuffmanTreeBuilder, nodes: &[T]) -> Result<HuffNode<T>> {
    let leaves = nodes
        .iter()
        .enumerate()
        .skip(1)
        .map(|(i, &value)| builder.leaf(value, i as u64))
        .collect();

    builder.build(leaves)
}

#[cfg(test)]
mod tests;
