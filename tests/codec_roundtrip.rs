// End-to-end tests over the public API: color conversion, transform, packing
// and the stream session layer.

#[cfg(test)]
mod codec_roundtrip {
    use wavelet_codec_rs::constants::{LENGTH_TABLE_SIZE, SIGNIFICAND_PLANES};
    use wavelet_codec_rs::{
        FilterMoments, LayerDesc, Moments, PixelFormat, PlaneClass, Recoding, RecordingObserver,
        StreamDecoder, StreamEncoder, TransformDirection, WaveletBuffer, codec,
    };

    fn moving_square(width: usize, height: usize, t: usize, bpp: usize) -> Vec<u8> {
        let mut frame = vec![0u8; width * height * bpp];
        for y in 0..height {
            for x in 0..width {
                let inside = (x + 2 * t) % width < width / 3 && y > height / 4 && y < height / 2;
                for c in 0..bpp {
                    frame[(y * width + x) * bpp + c] = if inside {
                        220 - c as u8 * 40
                    } else {
                        (x * 2 + y + c * 17) as u8
                    };
                }
            }
        }
        frame
    }

    #[test]
    fn test_zero_buffer_all_moments() {
        let orders = [FilterMoments::One, FilterMoments::Two, FilterMoments::Four];
        for &a in &orders {
            for &s in &orders {
                let moments = Moments::new(a, s);
                let mut buf = WaveletBuffer::new(4, 4, 1).unwrap();
                let mut dest = vec![0u8; 4096];
                let used = codec::encode(&mut buf, moments, &mut dest).unwrap();
                assert_eq!(used, LENGTH_TABLE_SIZE + SIGNIFICAND_PLANES);

                let mut out = WaveletBuffer::new(4, 4, 1).unwrap();
                codec::decode(&mut out, moments, &dest[..used]);
                assert!(out.data().iter().all(|&v| v == 0));
            }
        }
    }

    #[test]
    fn test_every_pixel_format_is_lossless_with_room() {
        for format in [
            PixelFormat::Grayscale,
            PixelFormat::Rgb24,
            PixelFormat::Rgb32,
            PixelFormat::Rgba,
        ] {
            let bpp = format.bytes_per_pixel();
            let desc = LayerDesc::new(20, 12, 2, format, 32 * 1024);
            let mut enc = StreamEncoder::new(&[desc]).unwrap();
            let mut dec = StreamDecoder::new(&[desc]).unwrap();

            let mut input: Vec<Vec<u8>> = (0..2).map(|t| moving_square(20, 12, t, bpp)).collect();
            let mut packets = Vec::new();
            for frame in &input {
                packets.extend(enc.push_frame(0, frame).unwrap());
            }
            assert_eq!(packets.len(), format.component_count());

            let mut output = None;
            for p in &packets {
                output = dec.push_packet(p).unwrap();
            }
            if format == PixelFormat::Rgb32 {
                for frame in &mut input {
                    frame.iter_mut().skip(3).step_by(4).for_each(|b| *b = 0);
                }
            }
            assert_eq!(output, Some(input), "{:?}", format);
        }
    }

    #[test]
    fn test_tight_budget_degrades_gracefully() {
        let desc = LayerDesc::new(32, 32, 4, PixelFormat::Grayscale, LENGTH_TABLE_SIZE + 300);
        let mut enc = StreamEncoder::new(&[desc]).unwrap();
        let input: Vec<Vec<u8>> = (0..4).map(|t| moving_square(32, 32, t, 1)).collect();
        let mut packets = Vec::new();
        for frame in &input {
            packets.extend(enc.push_frame(0, frame).unwrap());
        }
        assert_eq!(packets.len(), 1);
        assert!(packets[0].data.len() <= desc.bitstream_len);

        let mut dec = StreamDecoder::new(&[desc]).unwrap();
        let output = dec.push_packet(&packets[0]).unwrap().unwrap();
        assert_eq!(output.len(), 4);
        let total_error: u64 = output
            .iter()
            .flatten()
            .zip(input.iter().flatten())
            .map(|(&a, &b)| a.abs_diff(b) as u64)
            .sum();
        // Lossy, but the coarse structure survives.
        assert!(total_error > 0);
        assert!(total_error / (4 * 32 * 32) < 80);
    }

    #[test]
    fn test_observer_reports_transform_and_packing() {
        let mut buf = WaveletBuffer::new(16, 16, 2).unwrap();
        for (i, v) in buf.data_mut().iter_mut().enumerate() {
            *v = (i % 29) as i16 - 14;
        }
        let mut rec = RecordingObserver::new();
        let mut dest = vec![0u8; 600];
        let used = codec::encode_with(
            &mut buf,
            Moments::default(),
            Recoding::Gray,
            &mut dest,
            &mut rec,
        )
        .unwrap();

        let forward: Vec<usize> = rec
            .levels
            .iter()
            .filter(|(d, _)| *d == TransformDirection::Forward)
            .map(|&(_, l)| l)
            .collect();
        assert_eq!(forward, (1..buf.scales()).rev().collect::<Vec<_>>());
        assert_eq!(
            rec.planes.iter().filter(|p| p.class == PlaneClass::Significand).count(),
            16
        );
        assert_eq!(used, LENGTH_TABLE_SIZE + rec.written_bytes());
    }

    #[test]
    fn test_multiple_layers_are_independent() {
        let big = LayerDesc::new(16, 16, 2, PixelFormat::Rgb24, 16 * 1024);
        let small = LayerDesc::new(8, 8, 1, PixelFormat::Grayscale, 4096)
            .with_moments(Moments::new(FilterMoments::Two, FilterMoments::One))
            .with_recoding(Recoding::SignMask);
        let mut enc = StreamEncoder::new(&[big, small]).unwrap();
        let mut dec = StreamDecoder::new(&[big, small]).unwrap();

        let small_frame = moving_square(8, 8, 0, 1);
        let small_packets = enc.push_frame(1, &small_frame).unwrap();
        assert_eq!(small_packets.len(), 1);
        assert!(enc.push_frame(0, &moving_square(16, 16, 0, 3)).unwrap().is_empty());

        assert_eq!(
            dec.push_packet(&small_packets[0]).unwrap(),
            Some(vec![small_frame])
        );

        let rest = enc.finish().unwrap();
        assert_eq!(rest.len(), 3);
        assert!(rest.iter().all(|p| p.layer == 0 && p.valid_frames == 1));
    }
}
