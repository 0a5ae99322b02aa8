use framefx::{
    EffectSpec, Fps, Frame, FrameSequence, FrameStore, ImageCodec, OutputFormat, OutputSequence,
    PixelBuffer, RunOutcome, Sequencer,
};

fn solid(rgba: [u8; 4]) -> PixelBuffer {
    PixelBuffer::filled(4, 4, rgba).unwrap()
}

fn seq_of(bufs: Vec<PixelBuffer>) -> FrameSequence {
    FrameSequence::from_buffers(bufs).unwrap()
}

/// 8x6 frame whose pixels all differ, so any spatial shift is visible.
fn gradient(tag: u8) -> PixelBuffer {
    let mut buf = PixelBuffer::new(8, 6).unwrap();
    for y in 0..6 {
        for x in 0..8 {
            buf.set_pixel(x, y, [x as u8 * 30, y as u8 * 40, tag, 255]);
        }
    }
    buf
}

async fn run(spec: &EffectSpec, inputs: FrameStore, codec: ImageCodec) -> OutputSequence {
    let mut seq = Sequencer::new(codec);
    match seq.start(spec, inputs).unwrap().drive(|_| {}).await.unwrap() {
        RunOutcome::Completed(out) => out,
        RunOutcome::Cancelled(p) => panic!("unexpected cancel at {p:?}"),
    }
}

fn pixels(out: &OutputSequence) -> Vec<PixelBuffer> {
    out.frames()
        .unwrap()
        .enumerate()
        .map(|(i, f)| f.decode(i).unwrap())
        .collect()
}

#[tokio::test]
async fn fade_scales_every_channel() {
    let inputs = FrameStore::new(Fps::new(10, 1).unwrap())
        .with_input1(seq_of(vec![solid([200, 100, 40, 255]); 6]));
    let spec = EffectSpec::FadeInOut {
        fade_in_sec: 0.2,
        fade_out_sec: 0.2,
    };
    let out = pixels(&run(&spec, inputs, ImageCodec::default()).await);

    let first_px: Vec<[u8; 4]> = out.iter().map(|b| b.pixel(0, 0).unwrap()).collect();
    assert_eq!(
        first_px,
        vec![
            [0, 0, 0, 0],
            [100, 50, 20, 128],
            [200, 100, 40, 255],
            [200, 100, 40, 255],
            [100, 50, 20, 128],
            [0, 0, 0, 0],
        ]
    );
}

#[tokio::test]
async fn fade_without_ramps_copies_pixels() {
    let src = gradient(7);
    let inputs = FrameStore::new(Fps::default()).with_input1(seq_of(vec![src.clone(); 3]));
    let spec = EffectSpec::FadeInOut {
        fade_in_sec: 0.0,
        fade_out_sec: 0.0,
    };
    for buf in pixels(&run(&spec, inputs, ImageCodec::default()).await) {
        assert_eq!(buf, src);
    }
}

#[tokio::test]
async fn fade_reads_png_frames_and_stores_png() {
    let src = solid([200, 100, 40, 255]);
    let encoded = Frame::encode_png(&src).unwrap();
    let seq = FrameSequence::new(src.canvas(), vec![encoded; 4]).unwrap();
    let inputs = FrameStore::new(Fps::new(2, 1).unwrap()).with_input1(seq);
    let spec = EffectSpec::FadeInOut {
        fade_in_sec: 1.0,
        fade_out_sec: 0.0,
    };

    let out = run(&spec, inputs, ImageCodec::new(OutputFormat::Png)).await;
    assert!(matches!(out.get(0), Some(Frame::Encoded(_))));
    let bufs = pixels(&out);
    assert_eq!(bufs[0].pixel(1, 1), Some([0, 0, 0, 0]));
    assert_eq!(bufs[1].pixel(1, 1), Some([100, 50, 20, 128]));
    assert_eq!(bufs[3], src);
}

#[tokio::test]
async fn motion_blur_window_of_one_is_identity() {
    let frames: Vec<PixelBuffer> = (0..5).map(gradient).collect();
    let inputs = FrameStore::new(Fps::default()).with_input1(seq_of(frames.clone()));
    let spec = EffectSpec::MotionBlur { window_frames: 1 };
    let out = pixels(&run(&spec, inputs, ImageCodec::default()).await);
    assert_eq!(out, frames);
}

#[tokio::test]
async fn motion_blur_averages_the_trailing_window() {
    let frames = [0u8, 30, 60, 91]
        .map(|v| solid([v, 255 - v, 7, 100]))
        .to_vec();
    let inputs = FrameStore::new(Fps::default()).with_input1(seq_of(frames));
    let spec = EffectSpec::MotionBlur { window_frames: 3 };
    let out = pixels(&run(&spec, inputs, ImageCodec::default()).await);

    let reds: Vec<u8> = out.iter().map(|b| b.pixel(2, 3).unwrap()[0]).collect();
    // (30 + 60 + 91) / 3 = 60.33
    assert_eq!(reds, vec![0, 15, 30, 60]);
    let greens: Vec<u8> = out.iter().map(|b| b.pixel(0, 0).unwrap()[1]).collect();
    assert_eq!(greens, vec![255, 240, 225, 195]);
    assert!(out.iter().all(|b| b.pixel(1, 1).unwrap()[3] == 255));
}

#[tokio::test]
async fn motion_blur_window_longer_than_input() {
    let frames = [10u8, 20].map(|v| solid([v, v, v, 255])).to_vec();
    let inputs = FrameStore::new(Fps::default()).with_input1(seq_of(frames));
    let spec = EffectSpec::MotionBlur { window_frames: 50 };
    let out = pixels(&run(&spec, inputs, ImageCodec::default()).await);
    assert_eq!(out[1].pixel(0, 0), Some([15, 15, 15, 255]));
}

#[tokio::test]
async fn motion_blur_accepts_the_largest_window() {
    let frames = [10u8, 20, 30].map(|v| solid([v, v, v, 255])).to_vec();
    let inputs = FrameStore::new(Fps::default()).with_input1(seq_of(frames));
    let spec = EffectSpec::MotionBlur {
        window_frames: u32::MAX,
    };
    let out = pixels(&run(&spec, inputs, ImageCodec::default()).await);
    assert_eq!(out.len(), 3);
    assert_eq!(out[2].pixel(0, 0), Some([20, 20, 20, 255]));
}

#[tokio::test]
async fn earthquake_with_zero_strength_copies_frames() {
    let frames: Vec<PixelBuffer> = (0..3).map(gradient).collect();
    let inputs = FrameStore::new(Fps::default()).with_input1(seq_of(frames.clone()));
    let spec = EffectSpec::Earthquake {
        strength_px: 0,
        seed: 42,
    };
    assert_eq!(pixels(&run(&spec, inputs, ImageCodec::default()).await), frames);
}

#[tokio::test]
async fn earthquake_keeps_canvas_and_is_reproducible() {
    let frames: Vec<PixelBuffer> = (0..6).map(gradient).collect();
    let spec = EffectSpec::Earthquake {
        strength_px: 2,
        seed: 5,
    };
    let store = || FrameStore::new(Fps::default()).with_input1(seq_of(frames.clone()));

    let a = pixels(&run(&spec, store(), ImageCodec::default()).await);
    let b = pixels(&run(&spec, store(), ImageCodec::default()).await);
    assert_eq!(a, b);
    assert_eq!(a.len(), 6);
    for buf in &a {
        assert_eq!((buf.width(), buf.height()), (8, 6));
    }
    assert!(a.iter().zip(&frames).any(|(out, src)| out != src));
}

#[tokio::test]
async fn cross_fade_passes_through_and_blends() {
    let red = seq_of(vec![solid([200, 0, 0, 255]); 6]);
    let green = seq_of(vec![solid([0, 100, 0, 255]); 5]);
    let inputs = FrameStore::new(Fps::new(10, 1).unwrap())
        .with_input1(red.clone())
        .with_input2(green.clone());

    let spec = EffectSpec::CrossFade { overlap_sec: 0.2 };
    let out = run(&spec, inputs, ImageCodec::default()).await;
    assert_eq!(out.len(), 9);

    for i in 0..4 {
        assert!(out.get(i).unwrap().ptr_eq(red.get(i).unwrap()));
    }
    for i in 6..9 {
        assert!(out.get(i).unwrap().ptr_eq(green.get(i - 4).unwrap()));
    }

    let bufs = pixels(&out);
    // t = 0 at the start of the overlap, 1/2 at its midpoint.
    assert_eq!(bufs[4].pixel(0, 0), Some([200, 0, 0, 255]));
    assert_eq!(bufs[5].pixel(0, 0), Some([100, 50, 0, 255]));
}

#[tokio::test]
async fn cross_fade_with_full_overlap() {
    let a = seq_of(vec![solid([0, 0, 0, 255]); 4]);
    let b = seq_of(vec![solid([255, 255, 255, 255]); 4]);
    let inputs = FrameStore::new(Fps::new(4, 1).unwrap())
        .with_input1(a)
        .with_input2(b);

    let spec = EffectSpec::CrossFade { overlap_sec: 1.0 };
    let out = pixels(&run(&spec, inputs, ImageCodec::default()).await);
    let levels: Vec<u8> = out.iter().map(|b| b.pixel(3, 3).unwrap()[0]).collect();
    assert_eq!(levels, vec![0, 64, 128, 191]);
}
