/// A finished, byte-aligned bit stream.
#[derive(Debug)]
pub struct BinaryWriter {
    pub os: Box<[u8]>,
}

/// Packs bits MSB-first into bytes. The final partial byte is zero-padded on the right.
pub struct BinaryWriterBuilder {
    os: Vec<u8>,
    current: u64,
    free: usize,
}

impl Default for BinaryWriterBuilder {
    fn default() -> Self {
        BinaryWriterBuilder {
            os: Vec::default(),
            current: 0,
            free: 8,
        }
    }
}

impl BinaryWriterBuilder {
    pub fn build(mut self) -> BinaryWriter {
        if self.free < 8 {
            self.write(self.current);
        }

        BinaryWriter {
            os: self.os.into_boxed_slice()
        }
    }

    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    fn write(&mut self, b: u64) {
        self.os.push(b as u8);
    }

    #[inline(always)]
    fn write_in_current(&mut self, b: u64, len: u64) -> u64 {
        debug_assert!(len as usize <= self.free);

        self.free -= len as usize;
        self.current |= (b & ((1 << len) - 1)) << self.free;

        if self.free == 0 {
            self.write(self.current);
            self.free = 8;
            self.current = 0;
        }

        len
    }

    /// Writes the `len` lowest bits of `x`, most significant first.
    #[inline(always)]
    pub fn push_bits(&mut self, x: u64, len: u64) -> u64 {
        assert!(len <= 64, "Cannot write {} bits from an integer", len);

        let mut remaining = len;

        while remaining > 0 {
            let chunk = remaining.min(self.free as u64);
            remaining -= chunk;
            self.write_in_current(if remaining >= 64 { 0 } else { x >> remaining }, chunk);
        }

        len
    }

    #[inline(always)]
    pub fn push_bit(&mut self, bit: bool) -> u64 {
        self.write_in_current(bit as u64, 1)
    }

    /// Writes a prefix code word given as a left(`false`)/right(`true`) walk.
    pub fn push_code(&mut self, code: &[bool]) -> u64 {
        for &bit in code {
            self.push_bit(bit);
        }

        code.len() as u64
    }
}

/// Reads bits MSB-first. Every read reports exhaustion instead of panicking,
/// since payloads come from outside.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct BinaryReader {
    is: Box<[u8]>,
    position: usize,
    current: u64,
    fill: usize,
}

impl BinaryReader {
    pub fn new(input_stream: Box<[u8]>) -> Self {
        BinaryReader {
            is: input_stream,
            position: 0,
            current: 0,
            fill: 0
        }
    }

    #[inline(always)]
    fn read(&mut self) -> Option<u64> {
        if self.position >= self.is.len() {
            return None;
        }

        self.position += 1;
        Some(self.is[self.position - 1] as u64)
    }

    #[inline(always)]
    pub fn read_bit(&mut self) -> Option<bool> {
        if self.fill == 0 {
            self.current = self.read()?;
            self.fill = 8;
        }

        self.fill -= 1;

        Some((self.current >> self.fill) & 1 == 1)
    }

    /// Reads `len` bits as an unsigned integer, most significant first.
    #[inline(always)]
    pub fn read_int(&mut self, len: u64) -> Option<u64> {
        assert!(len <= 64, "Cannot read {} bits into an integer", len);

        let mut x = 0u64;

        for _ in 0..len {
            x = (x << 1) | self.read_bit()? as u64;
        }

        Some(x)
    }

    /// Number of bits not yet consumed, padding included.
    pub fn remaining_bits(&self) -> usize {
        self.fill + ((self.is.len() - self.position) << 3)
    }
}
