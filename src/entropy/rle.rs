/// Run-length layer over a binary symbol stream.
///
/// The first symbol is stored raw; after that only run lengths are written,
/// each through the adaptive Golomb state of the symbol it repeats. Runs
/// alternate, so the decoder flips the symbol whenever a run is exhausted.
use crate::entropy::bit_io::{BitReader, BitWriter};
use crate::entropy::golomb::AdaptiveGolomb;

pub struct RleEncoder {
    symbol: Option<u8>,
    count: u32,
    seen_one: bool,
    golomb: [AdaptiveGolomb; 2],
    writer: BitWriter,
}

impl RleEncoder {
    pub fn new(limit: usize) -> Self {
        Self {
            symbol: None,
            count: 0,
            seen_one: false,
            golomb: [AdaptiveGolomb::new(); 2],
            writer: BitWriter::new(limit),
        }
    }

    pub fn write_bit(&mut self, bit: u8) {
        let bit = bit & 1;
        match self.symbol {
            None => {
                self.writer.write_bit(bit);
                self.symbol = Some(bit);
                self.count = 1;
                self.seen_one = bit == 1;
            }
            Some(symbol) if symbol == bit => {
                self.count += 1;
            }
            Some(symbol) => {
                self.golomb[symbol as usize].encode(&mut self.writer, self.count);
                self.symbol = Some(bit);
                self.count = 1;
                self.seen_one = true;
            }
        }
    }

    /// Emits the pending run and pads the last byte.
    ///
    /// A stream made only of zeros stops after its raw first bit: the decoder
    /// runs out of data and clamps to an endless zero run, which is the same thing.
    pub fn flush(&mut self) -> usize {
        if let Some(symbol) = self.symbol {
            if self.seen_one {
                self.golomb[symbol as usize].encode(&mut self.writer, self.count);
            }
        }
        self.writer.flush()
    }

    pub fn eos(&self) -> bool {
        self.writer.eos()
    }

    pub fn get_output(&self) -> &[u8] {
        self.writer.get_output()
    }
}

pub struct RleDecoder<'a> {
    symbol: u8,
    count: u32,
    exhausted: bool,
    golomb: [AdaptiveGolomb; 2],
    reader: BitReader<'a>,
}

impl<'a> RleDecoder<'a> {
    /// Reads the raw first symbol and its run length up front, so
    /// [`RleDecoder::symbol`] and [`RleDecoder::run_length`] describe the
    /// next symbol before it is consumed.
    pub fn new(data: &'a [u8]) -> Self {
        let mut reader = BitReader::new(data);
        let mut golomb = [AdaptiveGolomb::new(); 2];
        let symbol = reader.read_bit();
        let count = golomb[symbol as usize].decode(&mut reader);

        let mut decoder = Self {
            symbol,
            count,
            exhausted: false,
            golomb,
            reader,
        };
        decoder.check_eos();
        decoder
    }

    // Out of data: everything that follows is zero.
    fn check_eos(&mut self) {
        if self.reader.eos() {
            self.symbol = 0;
            self.count = u32::MAX;
            self.exhausted = true;
        }
    }

    pub fn read_bit(&mut self) -> u8 {
        if self.exhausted {
            return 0;
        }
        if self.count == 0 {
            self.symbol ^= 1;
            self.count = self.golomb[self.symbol as usize].decode(&mut self.reader);
            self.check_eos();
            if self.exhausted {
                return 0;
            }
        }
        self.count -= 1;
        self.symbol
    }

    /// Symbol of the current run.
    pub fn symbol(&self) -> u8 {
        self.symbol
    }

    /// Symbols left in the current run; `u32::MAX` once the stream is exhausted.
    pub fn run_length(&self) -> u32 {
        self.count
    }

    /// Consumes `count` symbols of the current run without reading them.
    pub fn skip(&mut self, count: u32) {
        if self.exhausted {
            return;
        }
        debug_assert!(count <= self.count);
        self.count -= count.min(self.count);
    }

    pub fn eos(&self) -> bool {
        self.exhausted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(bits: &[u8]) -> Vec<u8> {
        let mut enc = RleEncoder::new(1024);
        for &b in bits {
            enc.write_bit(b);
        }
        enc.flush();
        enc.get_output().to_vec()
    }

    fn assert_roundtrip(bits: &[u8]) {
        let data = encode(bits);
        let mut dec = RleDecoder::new(&data);
        let decoded: Vec<u8> = bits.iter().map(|_| dec.read_bit()).collect();
        assert_eq!(decoded, bits);
    }

    #[test]
    fn test_alternating_runs() {
        assert_roundtrip(&[0, 0, 0, 1, 1, 0, 1, 1, 1, 1, 0, 0]);
    }

    #[test]
    fn test_starts_with_one() {
        assert_roundtrip(&[1, 1, 1, 0, 1]);
    }

    #[test]
    fn test_all_ones_single_run() {
        assert_roundtrip(&[1; 100]);
    }

    #[test]
    fn test_single_symbols() {
        assert_roundtrip(&[0]);
        assert_roundtrip(&[1]);
    }

    #[test]
    fn test_all_zero_stream_is_one_byte() {
        let data = encode(&[0; 500]);
        assert_eq!(data, vec![0x00]);

        let mut dec = RleDecoder::new(&data);
        assert!(dec.eos());
        for _ in 0..1000 {
            assert_eq!(dec.read_bit(), 0);
        }
    }

    #[test]
    fn test_empty_stream_decodes_zeros() {
        let mut dec = RleDecoder::new(&[]);
        assert!(dec.eos());
        assert_eq!(dec.symbol(), 0);
        assert_eq!(dec.run_length(), u32::MAX);
        assert_eq!(dec.read_bit(), 0);
    }

    #[test]
    fn test_run_length_and_skip() {
        let mut bits = vec![0u8; 40];
        bits.push(1);
        bits.extend_from_slice(&[0; 3]);
        let data = encode(&bits);

        let mut dec = RleDecoder::new(&data);
        assert_eq!(dec.symbol(), 0);
        assert_eq!(dec.run_length(), 40);
        assert_eq!(dec.read_bit(), 0);
        assert_eq!(dec.run_length(), 39);
        dec.skip(39);
        assert_eq!(dec.run_length(), 0);
        assert_eq!(dec.read_bit(), 1);
        assert_eq!(dec.read_bit(), 0);
        assert_eq!(dec.read_bit(), 0);
        assert_eq!(dec.read_bit(), 0);
    }

    #[test]
    fn test_truncation_clamps_to_zeros() {
        let bits: Vec<u8> = (0..400).map(|i| ((i * 7 / 3) % 2) as u8).collect();
        let mut enc = RleEncoder::new(4);
        for &b in &bits {
            enc.write_bit(b);
        }
        assert_eq!(enc.flush(), 4);
        assert!(enc.eos());

        let data = enc.get_output().to_vec();
        let mut dec = RleDecoder::new(&data);
        for _ in 0..bits.len() {
            dec.read_bit();
        }
        assert!(dec.eos());
        assert_eq!(dec.read_bit(), 0);
    }
}
