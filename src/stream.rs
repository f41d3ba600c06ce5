//! Frame-at-a-time session layer.
//!
//! A stream carries one or more layers, each with its own frame size, pixel
//! format and packet budget. The encoder buffers `frames_per_buf` frames of a
//! layer, then emits one [`Packet`] per color component. The decoder collects
//! the packets of every component of a layer and returns the frames they
//! carry. How packets are framed on the wire is up to the caller.

use crate::codec;
use crate::color::PixelFormat;
use crate::constants::LENGTH_TABLE_SIZE;
use crate::error::WaveletError;
use crate::observer::NoopObserver;
use crate::wavelet::buffer::WaveletBuffer;
use crate::wavelet::coeff::Recoding;
use crate::wavelet::lifting::Moments;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerDesc {
    pub width: usize,
    pub height: usize,
    /// Frames transformed together along t.
    pub frames_per_buf: usize,
    pub format: PixelFormat,
    pub moments: Moments,
    pub recoding: Recoding,
    /// Byte limit of each component packet, length table included.
    pub bitstream_len: usize,
}

impl LayerDesc {
    pub fn new(
        width: usize,
        height: usize,
        frames_per_buf: usize,
        format: PixelFormat,
        bitstream_len: usize,
    ) -> Self {
        Self {
            width,
            height,
            frames_per_buf,
            format,
            moments: Moments::default(),
            recoding: Recoding::default(),
            bitstream_len,
        }
    }

    pub fn with_moments(mut self, moments: Moments) -> Self {
        self.moments = moments;
        self
    }

    pub fn with_recoding(mut self, recoding: Recoding) -> Self {
        self.recoding = recoding;
        self
    }

    /// Size in bytes of one interleaved frame.
    pub fn frame_bytes(&self) -> usize {
        self.width * self.height * self.format.bytes_per_pixel()
    }

    pub fn validate(&self) -> Result<(), WaveletError> {
        if self.width == 0 || self.height == 0 || self.frames_per_buf == 0 {
            return Err(WaveletError::InvalidDimensions);
        }
        if self.bitstream_len < LENGTH_TABLE_SIZE {
            return Err(WaveletError::InvalidBitstreamLength);
        }
        Ok(())
    }
}

/// Coded coefficients of one component over one buffer of frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub layer: usize,
    pub component: usize,
    /// Frames of the buffer that carry real input; the rest is padding.
    pub valid_frames: usize,
    pub data: Vec<u8>,
}

/// One layer's description and its per-component buffers.
pub struct Layer {
    desc: LayerDesc,
    buffers: Vec<WaveletBuffer>,
    fill: usize,
}

impl Layer {
    fn new(desc: LayerDesc) -> Result<Self, WaveletError> {
        desc.validate()?;
        let buffers = (0..desc.format.component_count())
            .map(|_| WaveletBuffer::new(desc.width, desc.height, desc.frames_per_buf))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            desc,
            buffers,
            fill: 0,
        })
    }

    pub fn desc(&self) -> &LayerDesc {
        &self.desc
    }

    /// Frames currently buffered.
    pub fn fill(&self) -> usize {
        self.fill
    }

    pub fn buffers(&self) -> &[WaveletBuffer] {
        &self.buffers
    }
}

fn build_layers(descs: &[LayerDesc]) -> Result<Vec<Layer>, WaveletError> {
    if descs.is_empty() {
        return Err(WaveletError::NoLayers);
    }
    descs.iter().map(|&desc| Layer::new(desc)).collect()
}

pub struct StreamEncoder {
    layers: Vec<Layer>,
}

impl StreamEncoder {
    pub fn new(descs: &[LayerDesc]) -> Result<Self, WaveletError> {
        Ok(Self {
            layers: build_layers(descs)?,
        })
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Buffers one interleaved frame of `layer`. Returns the layer's packets
    /// once the buffer is full, and an empty list otherwise.
    #[tracing::instrument(level = "debug", skip(self, pixels))]
    pub fn push_frame(&mut self, layer: usize, pixels: &[u8]) -> Result<Vec<Packet>, WaveletError> {
        let l = self.layers.get_mut(layer).ok_or(WaveletError::UnknownLayer)?;
        if pixels.len() != l.desc.frame_bytes() {
            return Err(WaveletError::InvalidPixelBufferSize);
        }

        let fill = l.fill;
        let mut planes = l
            .buffers
            .iter_mut()
            .map(|b| b.frame_mut(fill))
            .collect::<Result<Vec<_>, _>>()?;
        l.desc.format.to_planes(pixels, &mut planes)?;
        l.fill += 1;

        if l.fill < l.desc.frames_per_buf {
            return Ok(Vec::new());
        }
        encode_layer(layer, l)
    }

    /// Flushes every partially filled layer, padding the missing frames with
    /// copies of the last one.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn finish(&mut self) -> Result<Vec<Packet>, WaveletError> {
        let mut packets = Vec::new();
        for (index, l) in self.layers.iter_mut().enumerate() {
            if l.fill == 0 {
                continue;
            }
            for buf in &mut l.buffers {
                let frame_len = buf.frame_len();
                let last = (l.fill - 1) * frame_len;
                for t in l.fill..l.desc.frames_per_buf {
                    buf.data_mut().copy_within(last..last + frame_len, t * frame_len);
                }
            }
            packets.extend(encode_layer(index, l)?);
        }
        Ok(packets)
    }
}

fn encode_layer(index: usize, l: &mut Layer) -> Result<Vec<Packet>, WaveletError> {
    let valid_frames = l.fill;
    l.fill = 0;

    let mut scratch = vec![0u8; l.desc.bitstream_len];
    let mut packets = Vec::with_capacity(l.buffers.len());
    for (component, buf) in l.buffers.iter_mut().enumerate() {
        let used = codec::encode_with(
            buf,
            l.desc.moments,
            l.desc.recoding,
            &mut scratch,
            &mut NoopObserver,
        )?;
        tracing::debug!(layer = index, component, valid_frames, bytes = used, "packet encoded");
        packets.push(Packet {
            layer: index,
            component,
            valid_frames,
            data: scratch[..used].to_vec(),
        });
    }
    Ok(packets)
}

pub struct StreamDecoder {
    layers: Vec<Layer>,
    received: Vec<Vec<bool>>,
}

impl StreamDecoder {
    pub fn new(descs: &[LayerDesc]) -> Result<Self, WaveletError> {
        let layers = build_layers(descs)?;
        let received = layers.iter().map(|l| vec![false; l.buffers.len()]).collect();
        Ok(Self { layers, received })
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Decodes one component packet. Once every component of the layer has
    /// arrived, returns its `valid_frames` interleaved frames.
    #[tracing::instrument(level = "debug", skip(self, packet), fields(layer = packet.layer, component = packet.component))]
    pub fn push_packet(&mut self, packet: &Packet) -> Result<Option<Vec<Vec<u8>>>, WaveletError> {
        let l = self.layers.get_mut(packet.layer).ok_or(WaveletError::UnknownLayer)?;
        let received = &mut self.received[packet.layer];
        let seen = received
            .get_mut(packet.component)
            .ok_or(WaveletError::UnknownComponent)?;
        if *seen {
            return Err(WaveletError::DuplicateComponent);
        }
        if packet.valid_frames == 0 || packet.valid_frames > l.desc.frames_per_buf {
            return Err(WaveletError::InvalidFrameIndex);
        }
        *seen = true;

        codec::decode_with(
            &mut l.buffers[packet.component],
            l.desc.moments,
            l.desc.recoding,
            &packet.data,
            &mut NoopObserver,
        );
        l.fill = l.fill.max(packet.valid_frames);

        if !received.iter().all(|&r| r) {
            return Ok(None);
        }
        received.fill(false);

        let valid_frames = std::mem::take(&mut l.fill);
        let mut frames = Vec::with_capacity(valid_frames);
        for t in 0..valid_frames {
            let planes = l
                .buffers
                .iter()
                .map(|b| b.frame(t))
                .collect::<Result<Vec<_>, _>>()?;
            let mut pixels = vec![0u8; l.desc.frame_bytes()];
            l.desc.format.from_planes(&planes, &mut pixels)?;
            frames.push(pixels);
        }
        tracing::debug!(frames = valid_frames, "layer decoded");
        Ok(Some(frames))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_frame(desc: &LayerDesc, t: usize) -> Vec<u8> {
        (0..desc.frame_bytes())
            .map(|i| ((i / desc.format.bytes_per_pixel()) % desc.width * 4 + t * 3 + i % 3) as u8)
            .collect()
    }

    #[test]
    fn test_rgb_stream_roundtrip() {
        let desc = LayerDesc::new(16, 8, 4, PixelFormat::Rgb24, 16 * 1024);
        let mut enc = StreamEncoder::new(&[desc]).unwrap();
        let mut dec = StreamDecoder::new(&[desc]).unwrap();

        let input: Vec<Vec<u8>> = (0..4).map(|t| gradient_frame(&desc, t)).collect();
        let mut packets = Vec::new();
        for frame in &input {
            packets.extend(enc.push_frame(0, frame).unwrap());
        }
        assert_eq!(packets.len(), 3);
        assert!(packets.iter().all(|p| p.valid_frames == 4));

        let mut output = None;
        for p in &packets {
            output = dec.push_packet(p).unwrap();
        }
        assert_eq!(output, Some(input));
    }

    #[test]
    fn test_finish_pads_partial_buffer() {
        let desc = LayerDesc::new(8, 8, 4, PixelFormat::Grayscale, 4096);
        let mut enc = StreamEncoder::new(&[desc]).unwrap();
        let input: Vec<Vec<u8>> = (0..2).map(|t| gradient_frame(&desc, t)).collect();
        for frame in &input {
            assert!(enc.push_frame(0, frame).unwrap().is_empty());
        }
        assert_eq!(enc.layers()[0].fill(), 2);
        let packets = enc.finish().unwrap();
        assert_eq!(enc.layers()[0].fill(), 0);
        assert_eq!(packets.len(), 1);
        assert_eq!(packets[0].valid_frames, 2);
        assert!(enc.finish().unwrap().is_empty());

        let mut dec = StreamDecoder::new(&[desc]).unwrap();
        assert_eq!(dec.push_packet(&packets[0]).unwrap(), Some(input.clone()));
        // Padding frames repeat the last real frame.
        let last = dec.layers()[0].buffers()[0].frame(3).unwrap().to_vec();
        let expected: Vec<i16> = input[1].iter().map(|&p| p as i16 - 128).collect();
        assert_eq!(last, expected);
    }

    #[test]
    fn test_packet_errors() {
        let desc = LayerDesc::new(4, 4, 1, PixelFormat::Rgb24, 1024);
        let mut enc = StreamEncoder::new(&[desc]).unwrap();
        let packets = enc.push_frame(0, &[7u8; 48]).unwrap();
        let mut dec = StreamDecoder::new(&[desc]).unwrap();

        assert_eq!(dec.push_packet(&packets[0]).unwrap(), None);
        assert_eq!(dec.push_packet(&packets[0]), Err(WaveletError::DuplicateComponent));

        let mut stray = packets[1].clone();
        stray.layer = 3;
        assert_eq!(dec.push_packet(&stray), Err(WaveletError::UnknownLayer));
        stray.layer = 0;
        stray.component = 5;
        assert_eq!(dec.push_packet(&stray), Err(WaveletError::UnknownComponent));

        assert_eq!(
            enc.push_frame(0, &[0u8; 47]),
            Err(WaveletError::InvalidPixelBufferSize)
        );
        assert_eq!(enc.push_frame(1, &[0u8; 48]), Err(WaveletError::UnknownLayer));
    }

    #[test]
    fn test_invalid_layer_descs() {
        assert!(matches!(StreamEncoder::new(&[]), Err(WaveletError::NoLayers)));
        let tiny = LayerDesc::new(4, 4, 1, PixelFormat::Grayscale, LENGTH_TABLE_SIZE - 1);
        assert!(matches!(
            StreamEncoder::new(&[tiny]),
            Err(WaveletError::InvalidBitstreamLength)
        ));
        let empty = LayerDesc::new(0, 4, 1, PixelFormat::Grayscale, 1024);
        assert!(matches!(
            StreamDecoder::new(&[empty]),
            Err(WaveletError::InvalidDimensions)
        ));
    }
}
