//! Payload layout:
//!
//! ```text
//! [zlib(segment\0 segment\0 ...)] [node count] [adjacency bits]
//! ```
//!
//! The dictionary lists distinct segments by ascending frequency. The node count is
//! one byte when it is at most 127, otherwise `128 + k` followed by `k` big-endian
//! bytes. For every node in canonical order the adjacency stream holds, per edge,
//! the segment code word then the child code word, and finally the end-of-segments
//! code word. Bits are packed MSB-first and the last byte is zero-padded.

mod decoder;
mod encoder;

pub use decoder::Decoder;
pub use encoder::Encoder;

use serde::Serialize;

use crate::{error::Result, properties::CodecProperties};

/// Largest node count that fits the single-byte header.
pub const MAX_SHORT_NODE_COUNT: usize = 127;
/// Flag bit of the long header form.
pub const LONG_NODE_COUNT_FLAG: u8 = 128;
/// Widest node count accepted by the long header form.
pub const MAX_NODE_COUNT_BYTES: usize = 4;

/// Sizes read back from a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayloadStats {
    pub segment_count: usize,
    pub node_count: usize,
    pub dictionary_bytes: usize,
    pub header_bytes: usize,
    pub adjacency_bytes: usize,
    pub url_count: usize,
}

/// Entry point of the codec. Holds configuration only: every call builds and drops
/// its own trees and id counters, so one instance can serve concurrent callers.
#[derive(Debug, Clone, Default)]
pub struct PathCodec {
    properties: CodecProperties,
}

impl PathCodec {
    pub fn new(properties: CodecProperties) -> Self {
        Self { properties }
    }

    pub fn properties(&self) -> &CodecProperties {
        &self.properties
    }

    /// Compresses content paths. Duplicate paths collapse to one.
    pub fn encode<S: AsRef<str>>(&self, paths: &[S]) -> Result<Vec<u8>> {
        Encoder::new(&self.properties).encode(paths)
    }

    /// Recovers the content paths of a payload, in trie order.
    pub fn decode(&self, payload: &[u8]) -> Result<Vec<String>> {
        Decoder::new(&self.properties).decode(payload)
    }

    pub fn inspect(&self, payload: &[u8]) -> Result<PayloadStats> {
        let decoded = Decoder::new(&self.properties).read_payload(payload)?;

        Ok(PayloadStats {
            segment_count: decoded.segments.len(),
            node_count: decoded.node_count,
            dictionary_bytes: decoded.dictionary_bytes,
            header_bytes: decoded.header_bytes,
            adjacency_bytes: payload.len() - decoded.dictionary_bytes - decoded.header_bytes,
            url_count: decoded.tree.paths()?.len(),
        })
    }
}
