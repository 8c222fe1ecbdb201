pub mod bitstreams;
pub mod codec;
pub mod error;
pub mod huffman;
pub mod path_tree;
pub mod properties;

pub use codec::{PathCodec, PayloadStats};
pub use error::{CodecError, Result};
pub use properties::CodecProperties;

/// Compresses `paths` with the default properties.
pub fn encode<S: AsRef<str>>(paths: &[S]) -> Result<Vec<u8>> {
    PathCodec::default().encode(paths)
}

/// Recovers the content paths of a payload produced by [`encode`].
pub fn decode(payload: &[u8]) -> Result<Vec<String>> {
    PathCodec::default().decode(payload)
}
