//! wavecodec CLI - exercise the wavelet codec on raw video frames.
//!
//! Packets are kept in memory; no container format is written.

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::PathBuf;
use wavelet_codec_rs::{
    LayerDesc, Moments, Packet, PixelFormat, Recoding, StreamDecoder, StreamEncoder, WaveletBuffer,
};

/// 3D lifting wavelet codec playground
#[derive(Parser)]
#[command(name = "wavecodec")]
#[command(version)]
#[command(about = "Encode and decode raw frames with the 3D wavelet codec", long_about = None)]
#[command(after_help = "EXAMPLES:
    wavecodec roundtrip -i clip.rgb -w 320 -H 240 -p rgb24 -f 4 -b 20000 -o decoded.rgb
    wavecodec info -w 320 -H 240 -f 4")]
struct Cli {
    /// Print codec diagnostics (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode raw frames to packets and decode them back
    ///
    /// Reports packet sizes, the largest sample error and the PSNR of the
    /// decoded frames against the input.
    #[command(visible_alias = "r")]
    Roundtrip {
        /// Raw interleaved frames, back to back
        #[arg(short, long)]
        input: PathBuf,

        /// Where to write the decoded frames
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Frame width in pixels
        #[arg(short, long)]
        width: usize,

        /// Frame height in pixels
        #[arg(short = 'H', long)]
        height: usize,

        /// Pixel layout of the input
        #[arg(short, long, default_value = "gray", value_enum)]
        pixel_format: Format,

        /// Frames transformed together along time
        #[arg(short, long, default_value = "4")]
        frames: usize,

        /// Byte limit of each component packet
        #[arg(short, long, default_value = "65536")]
        bitstream_len: usize,

        /// Analysis filter order (1, 2 or 4)
        #[arg(long, default_value = "4")]
        analysis: u8,

        /// Synthesis filter order (1, 2 or 4)
        #[arg(long, default_value = "4")]
        synthesis: u8,

        /// Coefficient recoding
        #[arg(long, default_value = "gray", value_enum)]
        recoding: RecodingArg,
    },

    /// Print the resolution pyramid of a buffer
    #[command(visible_alias = "i")]
    Info {
        #[arg(short, long)]
        width: usize,

        #[arg(short = 'H', long)]
        height: usize,

        #[arg(short, long, default_value = "1")]
        frames: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Gray,
    Rgb24,
    Rgb32,
    Rgba,
}

impl From<Format> for PixelFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Gray => PixelFormat::Grayscale,
            Format::Rgb24 => PixelFormat::Rgb24,
            Format::Rgb32 => PixelFormat::Rgb32,
            Format::Rgba => PixelFormat::Rgba,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum RecodingArg {
    Gray,
    SignMask,
}

impl From<RecodingArg> for Recoding {
    fn from(r: RecodingArg) -> Self {
        match r {
            RecodingArg::Gray => Recoding::Gray,
            RecodingArg::SignMask => Recoding::SignMask,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(match cli.verbose {
            0 => tracing::Level::INFO,
            1 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        })
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let result = match cli.command {
        Commands::Roundtrip {
            input,
            output,
            width,
            height,
            pixel_format,
            frames,
            bitstream_len,
            analysis,
            synthesis,
            recoding,
        } => Moments::from_orders(analysis, synthesis)
            .map_err(Into::into)
            .and_then(|moments| {
                let desc = LayerDesc::new(width, height, frames, pixel_format.into(), bitstream_len)
                    .with_moments(moments)
                    .with_recoding(recoding.into());
                roundtrip(&input, output.as_ref(), desc)
            }),
        Commands::Info {
            width,
            height,
            frames,
        } => show_info(width, height, frames),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn roundtrip(
    input: &PathBuf,
    output: Option<&PathBuf>,
    desc: LayerDesc,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;
    let frame_bytes = desc.frame_bytes();
    if frame_bytes == 0 || data.len() % frame_bytes != 0 {
        return Err(format!(
            "input size {} is not a multiple of the frame size {}",
            data.len(),
            frame_bytes
        )
        .into());
    }

    let mut encoder = StreamEncoder::new(&[desc])?;
    let mut packets: Vec<Packet> = Vec::new();
    for frame in data.chunks_exact(frame_bytes) {
        packets.extend(encoder.push_frame(0, frame)?);
    }
    packets.extend(encoder.finish()?);

    let mut decoder = StreamDecoder::new(&[desc])?;
    let mut decoded = Vec::with_capacity(data.len());
    for packet in &packets {
        if let Some(frames) = decoder.push_packet(packet)? {
            decoded.extend(frames.into_iter().flatten());
        }
    }

    let coded: usize = packets.iter().map(|p| p.data.len()).sum();
    let (max_error, psnr) = compare(&data, &decoded);

    println!("Frames:       {}", data.len() / frame_bytes);
    println!("Packets:      {}", packets.len());
    println!("Input bytes:  {}", data.len());
    println!(
        "Coded bytes:  {} ({:.2} bits/pixel)",
        coded,
        coded as f64 * 8.0 / (data.len() / desc.format.bytes_per_pixel()) as f64
    );
    println!("Max error:    {}", max_error);
    match psnr {
        Some(db) => println!("PSNR:         {:.2} dB", db),
        None => println!("PSNR:         lossless"),
    }

    if let Some(path) = output {
        fs::write(path, &decoded)?;
        println!("✓ Decoded frames written to {:?}", path);
    }
    Ok(())
}

fn compare(a: &[u8], b: &[u8]) -> (u8, Option<f64>) {
    let mut max_error = 0u8;
    let mut squared = 0u64;
    for (&x, &y) in a.iter().zip(b) {
        let e = x.abs_diff(y);
        max_error = max_error.max(e);
        squared += (e as u64) * (e as u64);
    }
    if squared == 0 {
        return (max_error, None);
    }
    let mse = squared as f64 / a.len() as f64;
    (max_error, Some(10.0 * (255.0 * 255.0 / mse).log10()))
}

fn show_info(width: usize, height: usize, frames: usize) -> Result<(), Box<dyn std::error::Error>> {
    let buf = WaveletBuffer::new(width, height, frames)?;
    println!("Buffer: {}x{}x{} ({} scales)", width, height, frames, buf.scales());
    println!();
    for (level, l) in buf.levels().iter().enumerate() {
        println!("Level {}: {}x{}x{}", level, l.width, l.height, l.frames);
        if level + 1 == buf.scales() {
            continue;
        }
        for q in 1..8 {
            if let Some(sb) = buf.subband(level, q) {
                println!(
                    "  subband {} @ {:>8}: {}x{}x{}",
                    q, sb.offset, sb.width, sb.height, sb.frames
                );
            }
        }
    }
    Ok(())
}
