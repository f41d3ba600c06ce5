/// Fixed-capacity MSB-first bit writer.
///
/// Once `limit` bytes have been stored, completed bytes are dropped and the
/// end-of-stream flag is raised. Writing past the limit is not an error; callers
/// inspect [`BitWriter::eos`] afterwards if they care.
pub struct BitWriter {
    data: Vec<u8>,
    bit_buffer: u8,
    bits_count: u8,
    limit: usize,
    eos: bool,
}

impl BitWriter {
    pub fn new(limit: usize) -> Self {
        Self {
            data: Vec::with_capacity(limit),
            bit_buffer: 0,
            bits_count: 0,
            limit,
            eos: false,
        }
    }

    pub fn write_bit(&mut self, bit: u8) {
        self.bit_buffer = (self.bit_buffer << 1) | (bit & 1);
        self.bits_count += 1;
        if self.bits_count == 8 {
            self.flush_byte(self.bit_buffer);
        }
    }

    /// Writes the low `count` bits of `bits`, most significant first.
    pub fn write_bits(&mut self, bits: u64, count: u32) {
        debug_assert!(count <= 64);
        for shift in (0..count).rev() {
            self.write_bit(((bits >> shift) & 1) as u8);
        }
    }

    fn flush_byte(&mut self, b: u8) {
        if self.data.len() < self.limit {
            self.data.push(b);
        } else {
            self.eos = true;
        }
        self.bit_buffer = 0;
        self.bits_count = 0;
    }

    /// Pads the pending byte with zero bits and returns the number of bytes stored.
    pub fn flush(&mut self) -> usize {
        if self.bits_count > 0 {
            let b = self.bit_buffer << (8 - self.bits_count);
            self.flush_byte(b);
        }
        self.data.len()
    }

    pub fn eos(&self) -> bool {
        self.eos
    }

    pub fn get_output(&self) -> &[u8] {
        &self.data
    }
}

/// MSB-first bit reader over a borrowed byte slice.
///
/// Reading past the end raises the end-of-stream flag and yields zero bits.
pub struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
    bit_buffer: u8,
    bits_left: u8,
    eos: bool,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            bit_buffer: 0,
            bits_left: 0,
            eos: false,
        }
    }

    pub fn read_bit(&mut self) -> u8 {
        if self.bits_left == 0 {
            if self.pos < self.data.len() {
                self.bit_buffer = self.data[self.pos];
                self.pos += 1;
            } else {
                self.eos = true;
                self.bit_buffer = 0;
            }
            self.bits_left = 8;
        }

        let bit = (self.bit_buffer >> 7) & 1;
        self.bit_buffer <<= 1;
        self.bits_left -= 1;
        bit
    }

    pub fn read_bits(&mut self, count: u32) -> u64 {
        debug_assert!(count <= 64);
        let mut bits = 0u64;
        for _ in 0..count {
            bits = (bits << 1) | self.read_bit() as u64;
        }
        bits
    }

    pub fn eos(&self) -> bool {
        self.eos
    }

    pub fn position(&self) -> usize {
        self.pos
    }
}
