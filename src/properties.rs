use std::{collections::HashMap, fs::File, io::BufReader, path::Path};

use crate::error::{CodecError, Result};

/// Highest DEFLATE level, used for the segment dictionary unless overridden.
pub const BEST_COMPRESSION: u32 = 9;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecProperties {
    /// DEFLATE level (0..=9) applied to the segment dictionary.
    pub compression_level: u32,
    /// Dumps the path tree and both Huffman tries at debug level.
    pub tree_debug: bool,
}

impl Default for CodecProperties {
    fn default() -> Self {
        Self {
            compression_level: BEST_COMPRESSION,
            tree_debug: false,
        }
    }
}

impl CodecProperties {
    /// Reads a Java-style `.properties` file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let map = java_properties::read(BufReader::new(file))
            .map_err(|e| CodecError::Properties(format!("failed parsing {}: {e}", path.as_ref().display())))?;

        Self::try_from(map)
    }
}

impl TryFrom<HashMap<String, String>> for CodecProperties {
    type Error = CodecError;

    fn try_from(value: HashMap<String, String>) -> Result<Self> {
        let mut props = CodecProperties::default();

        if let Some(level) = value.get("compressionlevel") {
            let level: u32 = level
                .trim()
                .parse()
                .map_err(|_| CodecError::Properties(format!("compressionlevel is not a number: {level}")))?;

            if level > BEST_COMPRESSION {
                return Err(CodecError::Properties(format!(
                    "compressionlevel must be between 0 and {BEST_COMPRESSION}, got {level}"
                )));
            }

            props.compression_level = level;
        }

        if let Some(debug) = value.get("treedebug") {
            props.tree_debug = match debug.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" | "" => false,
                other => return Err(CodecError::Properties(format!("treedebug is not a boolean: {other}"))),
            };
        }

        Ok(props)
    }
}

impl From<&CodecProperties> for String {
    fn from(val: &CodecProperties) -> Self {
        let mut s = String::new();

        s.push_str("#Content path codec properties\n");
        s.push_str(&format!("compressionlevel={}\n", val.compression_level));
        s.push_str(&format!("treedebug={}\n", val.tree_debug));

        s
    }
}
