#[cfg(feature = "media-ffmpeg")]
mod media_pipeline {
    use std::{path::Path, process::Command};

    use framefx::{
        ApplyOutcome, EffectSpec, FfmpegAssembler, FrameStore, ImageCodec, OutputFormat,
        Sequencer, apply_effect, is_ffmpeg_on_path, is_ffprobe_on_path, load_video, probe_video,
    };

    fn ffmpeg_tools_available() -> bool {
        is_ffmpeg_on_path() && is_ffprobe_on_path()
    }

    fn synth_clip(path: &Path) -> anyhow::Result<()> {
        let status = Command::new("ffmpeg")
            .args([
                "-v",
                "error",
                "-y",
                "-f",
                "lavfi",
                "-i",
                "testsrc=size=64x48:rate=25",
                "-t",
                "1",
                "-pix_fmt",
                "yuv420p",
                "-c:v",
                "libx264",
            ])
            .arg(path)
            .status()?;
        anyhow::ensure!(status.success(), "ffmpeg failed creating {}", path.display());
        Ok(())
    }

    #[test]
    fn probe_and_extract_synthesized_clip() {
        if !ffmpeg_tools_available() {
            eprintln!("skipping: ffmpeg/ffprobe not on PATH");
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let clip = dir.path().join("clip.mp4");
        synth_clip(&clip).unwrap();

        let (info, frames) = load_video(&clip).unwrap();
        assert_eq!((info.width, info.height), (64, 48));
        assert_eq!(info.fps.as_integer(), Some(25));
        assert_eq!(frames.len(), 25);
        assert_eq!(frames.canvas(), info.canvas());
    }

    #[tokio::test]
    async fn motion_blur_round_trips_through_ffmpeg() {
        if !ffmpeg_tools_available() {
            eprintln!("skipping: ffmpeg/ffprobe not on PATH");
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let clip = dir.path().join("clip.mp4");
        synth_clip(&clip).unwrap();
        let (info, frames) = load_video(&clip).unwrap();

        let out_path = dir.path().join("nested").join("blur.mp4");
        let mut asm = FfmpegAssembler::new(&out_path, info.fps);
        let mut seq = Sequencer::new(ImageCodec::new(OutputFormat::Png));
        let outcome = apply_effect(
            &mut seq,
            &EffectSpec::MotionBlur { window_frames: 4 },
            FrameStore::new(info.fps).with_input1(frames),
            &mut asm,
            |_| {},
        )
        .await
        .unwrap();

        let ApplyOutcome::Encoded(path) = outcome else {
            panic!("expected encoded output");
        };
        assert_eq!(path, out_path);

        let out_info = probe_video(&path).unwrap();
        assert_eq!((out_info.width, out_info.height), (64, 48));
        assert!((out_info.duration_sec - 1.0).abs() < 0.2);
    }

    #[tokio::test]
    async fn existing_output_is_kept_without_overwrite() {
        if !ffmpeg_tools_available() {
            eprintln!("skipping: ffmpeg/ffprobe not on PATH");
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let clip = dir.path().join("clip.mp4");
        synth_clip(&clip).unwrap();
        let (info, frames) = load_video(&clip).unwrap();

        let out_path = dir.path().join("taken.mp4");
        std::fs::write(&out_path, b"keep me").unwrap();
        let mut asm = FfmpegAssembler::new(&out_path, info.fps);
        asm.overwrite = false;

        let mut seq = Sequencer::new(ImageCodec::default());
        let outcome = apply_effect(
            &mut seq,
            &EffectSpec::Reverse,
            FrameStore::new(info.fps).with_input1(frames),
            &mut asm,
            |_| {},
        )
        .await
        .unwrap();

        let ApplyOutcome::EncodeFailed { output, error } = outcome else {
            panic!("expected encoder failure");
        };
        assert!(error.is_validation());
        assert_eq!(output.len(), 25);
        assert_eq!(std::fs::read(&out_path).unwrap(), b"keep me");
    }
}
