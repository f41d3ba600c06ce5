//! Three-dimensional lifting wavelet video codec.
//!
//! Frames are color-converted into planar 16-bit components, grouped along
//! time into a [`WaveletBuffer`], transformed with integer lifting filters over
//! x, y and t, and packed bit-plane by bit-plane with an adaptive run-length
//! coder into a packet of bounded size. Packets that do not fit are truncated
//! plane by plane and still decode to an approximation.
//!
//! ```no_run
//! use wavelet_codec_rs::{Moments, WaveletBuffer, codec};
//!
//! let mut buf = WaveletBuffer::new(64, 48, 4)?;
//! let mut packet = vec![0u8; 8192];
//! let used = codec::encode(&mut buf, Moments::default(), &mut packet)?;
//!
//! let mut out = WaveletBuffer::new(64, 48, 4)?;
//! codec::decode(&mut out, Moments::default(), &packet[..used]);
//! # Ok::<(), wavelet_codec_rs::WaveletError>(())
//! ```

pub mod codec;
pub mod color;
pub mod constants;
pub mod entropy;
pub mod error;
pub mod observer;
pub mod stream;
pub mod wavelet;

pub use color::PixelFormat;
pub use error::WaveletError;
pub use observer::{CodecObserver, NoopObserver, PlaneClass, RecordingObserver, TransformDirection};
pub use stream::{LayerDesc, Packet, StreamDecoder, StreamEncoder};
pub use wavelet::{FilterMoments, Moments, Recoding, WaveletBuffer};
