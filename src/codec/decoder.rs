use std::io::Read;

use flate2::bufread::ZlibDecoder;
use tracing::{debug, trace};

use crate::{
    bitstreams::BinaryReader,
    error::{CodecError, Result},
    huffman::{node_trie, segment_trie, HuffNode, HuffmanTreeBuilder, SegmentValue},
    path_tree::PathTree,
    properties::CodecProperties,
};

use super::{LONG_NODE_COUNT_FLAG, MAX_NODE_COUNT_BYTES};

/// Everything recovered from a payload before the paths are spelled out.
pub struct DecodedPayload {
    pub segments: Vec<String>,
    pub dictionary_bytes: usize,
    pub header_bytes: usize,
    pub node_count: usize,
    pub tree: PathTree,
}

pub struct Decoder<'a> {
    properties: &'a CodecProperties,
    huff_builder: HuffmanTreeBuilder,
}

impl<'a> Decoder<'a> {
    pub fn new(properties: &'a CodecProperties) -> Self {
        Self { properties, huff_builder: HuffmanTreeBuilder::new() }
    }

    pub fn decode(self, payload: &[u8]) -> Result<Vec<String>> {
        let decoded = self.read_payload(payload)?;
        let urls = decoded.tree.paths()?;

        debug!("Decoded {} paths from {} bytes", urls.len(), payload.len());

        Ok(urls)
    }

    pub fn read_payload(mut self, payload: &[u8]) -> Result<DecodedPayload> {
        let (segments, dictionary_bytes) = read_dictionary(payload)?;
        let segment_trie = segment_trie(&mut self.huff_builder, &segments)?;

        let mut reader = BinaryReader::new(payload[dictionary_bytes..].into());
        let (node_count, header_bytes) = read_node_count(&mut reader)?;

        // The encoder never emits fewer than three nodes, and each node costs at
        // least one bit of adjacency data.
        if node_count < 3 || node_count > reader.remaining_bits() {
            return Err(CodecError::CorruptPayload(format!(
                "node count {node_count} does not fit {} bits of adjacency data",
                reader.remaining_bits()
            )));
        }

        let positions: Vec<usize> = (0..node_count).collect();
        let node_trie = node_trie(&mut self.huff_builder, &positions)?;

        if self.properties.tree_debug {
            segment_trie.dump(0);
            node_trie.dump(0);
        }

        let links = read_adjacency(&mut reader, node_count, &segment_trie, &node_trie)?;

        if reader.remaining_bits() >= 8 {
            return Err(CodecError::CorruptPayload(format!(
                "{} unread bits after the last node",
                reader.remaining_bits()
            )));
        }

        let tree = PathTree::from_links(node_count, links)?;
        if self.properties.tree_debug {
            tree.dump();
        }

        debug!(
            "Read {} segments and {} nodes from a {} byte dictionary",
            segments.len(),
            node_count,
            dictionary_bytes
        );

        Ok(DecodedPayload { segments, dictionary_bytes, header_bytes, node_count, tree })
    }
}

/// Inflates the leading dictionary and reports how many payload bytes it spans.
fn read_dictionary(payload: &[u8]) -> Result<(Vec<String>, usize)> {
    let mut decoder = ZlibDecoder::new(payload);
    let mut raw = Vec::new();

    decoder
        .read_to_end(&mut raw)
        .map_err(|e| CodecError::CorruptPayload(format!("unreadable segment dictionary: {e}")))?;

    let consumed = decoder.total_in() as usize;

    let body = raw
        .strip_suffix(b"\0")
        .ok_or_else(|| CodecError::CorruptPayload("segment dictionary is empty or unterminated".into()))?;

    let segments = body
        .split(|&b| b == 0)
        .map(|name| {
            String::from_utf8(name.to_vec())
                .map_err(|_| CodecError::CorruptPayload("segment dictionary is not UTF-8".into()))
        })
        .collect::<Result<Vec<String>>>()?;

    Ok((segments, consumed))
}

/// Returns the node count and the number of header bytes it took.
fn read_node_count(reader: &mut BinaryReader) -> Result<(usize, usize)> {
    let missing = || CodecError::CorruptPayload("payload ends before the node count".into());

    let first = reader.read_int(8).ok_or_else(missing)? as u8;
    if first < LONG_NODE_COUNT_FLAG {
        return Ok((first as usize, 1));
    }

    let width = (first - LONG_NODE_COUNT_FLAG) as usize;
    if width == 0 || width > MAX_NODE_COUNT_BYTES {
        return Err(CodecError::CorruptPayload(format!("node count spans {width} bytes")));
    }

    let count = reader.read_int(8 * width as u64).ok_or_else(missing)?;

    Ok((count as usize, 1 + width))
}

type Link = (usize, String, usize);

fn read_adjacency(
    reader: &mut BinaryReader,
    node_count: usize,
    segment_trie: &HuffNode<SegmentValue>,
    node_trie: &HuffNode<usize>,
) -> Result<Vec<Link>> {
    let mut links = Vec::new();

    for parent in 0..node_count {
        loop {
            let name = match segment_trie.read_symbol(reader)? {
                SegmentValue::EndOfSegments => break,
                SegmentValue::Name(name) => name.clone(),
            };

            let child = *node_trie.read_symbol(reader)?;

            trace!("Node {} -> {} via {:?}", parent, child, name);
            links.push((parent, name, child));
        }
    }

    Ok(links)
}
