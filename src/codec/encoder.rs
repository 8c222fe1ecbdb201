use std::{collections::HashMap, io::Write};

use flate2::{write::ZlibEncoder, Compression};
use tracing::debug;

use crate::{
    bitstreams::BinaryWriterBuilder,
    error::{CodecError, Result},
    huffman::{node_trie, segment_trie, Codebook, HuffmanTreeBuilder, NodeValue, SegmentValue},
    path_tree::{NodeId, OrderedNode, PathTree},
    properties::CodecProperties,
};

use super::{LONG_NODE_COUNT_FLAG, MAX_NODE_COUNT_BYTES, MAX_SHORT_NODE_COUNT};

pub struct Encoder<'a> {
    properties: &'a CodecProperties,
    huff_builder: HuffmanTreeBuilder,
}

impl<'a> Encoder<'a> {
    pub fn new(properties: &'a CodecProperties) -> Self {
        Self { properties, huff_builder: HuffmanTreeBuilder::new() }
    }

    pub fn encode<S: AsRef<str>>(mut self, paths: &[S]) -> Result<Vec<u8>> {
        let mut tree = PathTree::build(paths)?;
        if self.properties.tree_debug {
            tree.dump();
        }

        tree.condense()?;
        if self.properties.tree_debug {
            tree.dump();
        }

        let segments = tree.order_segments();
        let segment_trie = segment_trie(&mut self.huff_builder, &segments)?;

        let nodes = tree.order_nodes();
        let node_values: Vec<NodeValue> = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| match node {
                OrderedNode::Node(_) => NodeValue::Node(i),
                OrderedNode::Padding => NodeValue::Placeholder,
            })
            .collect();
        let node_trie = node_trie(&mut self.huff_builder, &node_values)?;

        if self.properties.tree_debug {
            segment_trie.dump(0);
            node_trie.dump(0);
        }

        let mut payload = self.write_dictionary(&segments)?;
        let dictionary_bytes = payload.len();

        let mut writer = BinaryWriterBuilder::new();
        write_node_count(&mut writer, nodes.len())?;
        write_adjacency(&mut writer, &tree, &nodes, &segment_trie.codebook(), &node_trie.codebook())?;
        payload.extend_from_slice(&writer.build().os);

        debug!(
            "Encoded {} paths: {} segments, {} nodes, {} dictionary bytes, {} total bytes",
            paths.len(),
            segments.len(),
            nodes.len(),
            dictionary_bytes,
            payload.len()
        );

        Ok(payload)
    }

    /// Deflates the NUL-terminated segment list.
    fn write_dictionary(&self, segments: &[String]) -> Result<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(self.properties.compression_level));

        for segment in segments {
            encoder.write_all(segment.as_bytes())?;
            encoder.write_all(b"\0")?;
        }

        Ok(encoder.finish()?)
    }
}

fn write_node_count(writer: &mut BinaryWriterBuilder, count: usize) -> Result<()> {
    if count <= MAX_SHORT_NODE_COUNT {
        writer.push_bits(count as u64, 8);
        return Ok(());
    }

    let bytes = (count as u64).to_be_bytes();
    let significant = &bytes[bytes.iter().take_while(|&&b| b == 0).count()..];

    if significant.len() > MAX_NODE_COUNT_BYTES {
        return Err(CodecError::MalformedInput(format!("{count} path nodes do not fit the node count header")));
    }

    writer.push_bits((LONG_NODE_COUNT_FLAG as usize + significant.len()) as u64, 8);
    for &b in significant {
        writer.push_bits(b as u64, 8);
    }

    Ok(())
}

fn write_adjacency(
    writer: &mut BinaryWriterBuilder,
    tree: &PathTree,
    nodes: &[OrderedNode],
    segment_codes: &Codebook<SegmentValue>,
    node_codes: &Codebook<NodeValue>,
) -> Result<()> {
    let positions: HashMap<NodeId, usize> = nodes
        .iter()
        .enumerate()
        .filter_map(|(i, node)| match node {
            OrderedNode::Node(id) => Some((*id, i)),
            OrderedNode::Padding => None,
        })
        .collect();

    let end_of_segments = segment_codes.find_path(&SegmentValue::EndOfSegments)?;

    for node in nodes {
        if let OrderedNode::Node(id) = node {
            for pair in tree.node(*id).children() {
                let position = positions.get(&pair.connection).ok_or_else(|| {
                    CodecError::InternalInvariantViolation(format!("node {} is missing from the node order", pair.connection))
                })?;

                writer.push_code(segment_codes.find_path(&SegmentValue::Name(pair.name.clone()))?);
                writer.push_code(node_codes.find_path(&NodeValue::Node(*position))?);
            }
        }

        writer.push_code(end_of_segments);
    }

    Ok(())
}
