use std::{
    path::{Path, PathBuf},
    process::{Child, ChildStdin, Command, Stdio},
};

use crate::{
    foundation::core::{Canvas, Fps},
    foundation::error::{FxError, FxResult},
    foundation::math::mul_div255,
    frames::PixelBuffer,
    output::OutputSequence,
    pipeline::OutputAssembler,
};

#[derive(Clone, Debug)]
pub struct EncodeConfig {
    pub width: u32,
    pub height: u32,
    pub fps: Fps,
    pub out_path: PathBuf,
    pub overwrite: bool,
}

impl EncodeConfig {
    pub fn validate(&self) -> FxResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(FxError::validation("encode width/height must be non-zero"));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            // yuv420p subsamples chroma 2x2.
            return Err(FxError::validation(
                "encode width/height must be even (required for yuv420p mp4 output)",
            ));
        }
        if self.fps.num == 0 || self.fps.den == 0 {
            return Err(FxError::validation("encode fps must be non-zero"));
        }
        Ok(())
    }
}

pub fn default_mp4_config(out_path: impl Into<PathBuf>, canvas: Canvas, fps: Fps) -> EncodeConfig {
    EncodeConfig {
        width: canvas.width,
        height: canvas.height,
        fps,
        out_path: out_path.into(),
        overwrite: true,
    }
}

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

pub fn ensure_parent_dir(path: &Path) -> FxResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Streams opaque RGBA frames into a system `ffmpeg` process writing an mp4.
pub struct FfmpegEncoder {
    cfg: EncodeConfig,
    bg_rgba: [u8; 4],
    child: Child,
    stdin: Option<ChildStdin>,
    scratch: Vec<u8>,
}

impl FfmpegEncoder {
    pub fn new(cfg: EncodeConfig, bg_rgba: [u8; 4]) -> FxResult<Self> {
        cfg.validate()?;
        ensure_parent_dir(&cfg.out_path)?;

        if !cfg.overwrite && cfg.out_path.exists() {
            return Err(FxError::validation(format!(
                "output file '{}' already exists",
                cfg.out_path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(FxError::encode(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        let frame_len = Canvas {
            width: cfg.width,
            height: cfg.height,
        }
        .byte_len()
        .ok_or_else(|| FxError::validation("encode frame size overflow"))?;

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        if cfg.overwrite {
            cmd.arg("-y");
        } else {
            cmd.arg("-n");
        }

        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-framerate",
            &format!("{}/{}", cfg.fps.num, cfg.fps.den),
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ])
        .arg(&cfg.out_path);

        tracing::debug!(out = %cfg.out_path.display(), "spawning ffmpeg");
        let mut child = cmd.spawn().map_err(|e| {
            FxError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| FxError::encode("failed to open ffmpeg stdin"))?;

        Ok(Self {
            scratch: vec![0u8; frame_len],
            cfg,
            bg_rgba,
            child,
            stdin: Some(stdin),
        })
    }

    pub fn encode_frame(&mut self, frame: &PixelBuffer) -> FxResult<()> {
        if frame.width() != self.cfg.width || frame.height() != self.cfg.height {
            return Err(FxError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width(),
                frame.height(),
                self.cfg.width,
                self.cfg.height
            )));
        }

        flatten_to_opaque_rgba8(&mut self.scratch, frame.data(), self.bg_rgba)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(FxError::encode("ffmpeg encoder is already finalized"));
        };

        use std::io::Write as _;
        stdin
            .write_all(&self.scratch)
            .map_err(|e| FxError::encode(format!("failed to write frame to ffmpeg stdin: {e}")))?;

        Ok(())
    }

    pub fn finish(mut self) -> FxResult<()> {
        drop(self.stdin.take());

        let output = self
            .child
            .wait_with_output()
            .map_err(|e| FxError::encode(format!("failed to wait for ffmpeg to finish: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FxError::encode(format!(
                "ffmpeg exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}

/// Assembles a completed output sequence into one mp4 file.
#[derive(Clone, Debug)]
pub struct FfmpegAssembler {
    pub out_path: PathBuf,
    pub fps: Fps,
    pub overwrite: bool,
    pub bg_rgba: [u8; 4],
}

impl FfmpegAssembler {
    pub fn new(out_path: impl Into<PathBuf>, fps: Fps) -> Self {
        Self {
            out_path: out_path.into(),
            fps,
            overwrite: true,
            bg_rgba: [0, 0, 0, 255],
        }
    }
}

impl OutputAssembler for FfmpegAssembler {
    type Artifact = PathBuf;

    #[tracing::instrument(skip(self, output), fields(out = %self.out_path.display(), frames = output.len()))]
    fn assemble(&mut self, output: &OutputSequence) -> FxResult<PathBuf> {
        let mut frames = output.frames()?;
        let Some(first) = frames.next() else {
            return Err(FxError::encode("cannot encode an empty output sequence"));
        };

        let cfg = EncodeConfig {
            overwrite: self.overwrite,
            ..default_mp4_config(&self.out_path, first.canvas(), self.fps)
        };
        let mut enc = FfmpegEncoder::new(cfg, self.bg_rgba)?;
        for (index, frame) in std::iter::once(first).chain(frames).enumerate() {
            let buf = frame.decode(index)?;
            enc.encode_frame(&buf)?;
        }
        enc.finish()?;

        tracing::info!("encoded output video");
        Ok(self.out_path.clone())
    }
}

/// Composite straight-alpha RGBA8 over an opaque background colour.
fn flatten_to_opaque_rgba8(dst: &mut [u8], src: &[u8], bg_rgba: [u8; 4]) -> FxResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(FxError::validation(
            "flatten_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let bg = [
        u16::from(bg_rgba[0]),
        u16::from(bg_rgba[1]),
        u16::from(bg_rgba[2]),
    ];

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255 - a;
        for c in 0..3 {
            let v = mul_div255(u16::from(s[c]), a) + mul_div255(bg[c], inv);
            d[c] = v.min(255) as u8;
        }
        d[3] = 255;
    }

    Ok(())
}
