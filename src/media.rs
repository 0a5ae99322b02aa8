//! Input frame extraction through the system `ffprobe`/`ffmpeg` binaries.

use std::path::{Path, PathBuf};

use crate::{
    foundation::core::{Canvas, Fps},
    foundation::error::{FxError, FxResult},
    frames::FrameSequence,
};

#[derive(Clone, Debug)]
pub struct VideoSourceInfo {
    pub source_path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub fps: Fps,
    pub duration_sec: f64,
}

impl VideoSourceInfo {
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }
}

pub fn is_ffprobe_on_path() -> bool {
    std::process::Command::new("ffprobe")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(feature = "media-ffmpeg")]
pub fn probe_video(source_path: &Path) -> FxResult<VideoSourceInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        r_frame_rate: Option<String>,
        avg_frame_rate: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let out = std::process::Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| FxError::decode(0, format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(FxError::decode(
            0,
            format!(
                "ffprobe failed for '{}': {}",
                source_path.display(),
                String::from_utf8_lossy(&out.stderr).trim()
            ),
        ));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| FxError::decode(0, format!("ffprobe json parse failed: {e}")))?;
    let video_stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| FxError::validation(format!("no video stream in '{}'", source_path.display())))?;
    let width = video_stream
        .width
        .ok_or_else(|| FxError::decode(0, "missing video width from ffprobe"))?;
    let height = video_stream
        .height
        .ok_or_else(|| FxError::decode(0, "missing video height from ffprobe"))?;

    // avg_frame_rate is "0/0" for some containers; fall back to r_frame_rate.
    let fps = [&video_stream.avg_frame_rate, &video_stream.r_frame_rate]
        .into_iter()
        .flatten()
        .find_map(|s| Fps::parse_ratio(s))
        .ok_or_else(|| FxError::decode(0, "invalid video frame rate from ffprobe"))?;
    let duration_sec = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_ref())
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);

    tracing::debug!(
        path = %source_path.display(),
        width,
        height,
        fps = fps.as_f64(),
        duration_sec,
        "probed video"
    );

    Ok(VideoSourceInfo {
        source_path: source_path.to_path_buf(),
        width,
        height,
        fps,
        duration_sec,
    })
}

#[cfg(not(feature = "media-ffmpeg"))]
pub fn probe_video(_source_path: &Path) -> FxResult<VideoSourceInfo> {
    Err(FxError::validation(
        "video inputs require the 'media-ffmpeg' feature",
    ))
}

/// Decode every frame of `source` to straight RGBA8.
#[cfg(feature = "media-ffmpeg")]
#[tracing::instrument(skip(source), fields(path = %source.source_path.display()))]
pub fn extract_frames(source: &VideoSourceInfo) -> FxResult<FrameSequence> {
    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(&source.source_path)
        .args(["-an", "-f", "rawvideo", "-pix_fmt", "rgba", "pipe:1"])
        .output()
        .map_err(|e| FxError::decode(0, format!("failed to run ffmpeg for video decode: {e}")))?;

    if !out.status.success() {
        return Err(FxError::decode(
            0,
            format!(
                "ffmpeg video decode failed for '{}': {}",
                source.source_path.display(),
                String::from_utf8_lossy(&out.stderr).trim()
            ),
        ));
    }

    split_raw_frames(source.canvas(), &out.stdout)
}

#[cfg(not(feature = "media-ffmpeg"))]
pub fn extract_frames(_source: &VideoSourceInfo) -> FxResult<FrameSequence> {
    Err(FxError::validation(
        "video inputs require the 'media-ffmpeg' feature",
    ))
}

/// Probe and extract in one call.
pub fn load_video(path: &Path) -> FxResult<(VideoSourceInfo, FrameSequence)> {
    let info = probe_video(path)?;
    let frames = extract_frames(&info)?;
    tracing::info!(path = %path.display(), frames = frames.len(), "loaded input video");
    Ok((info, frames))
}

/// Split a tightly packed RGBA8 byte stream into raw frames of `canvas` size.
pub fn split_raw_frames(canvas: Canvas, bytes: &[u8]) -> FxResult<FrameSequence> {
    let frame_len = canvas
        .byte_len()
        .filter(|&n| n > 0)
        .ok_or_else(|| FxError::validation("decoded video frame size is zero or overflows"))?;
    if !bytes.len().is_multiple_of(frame_len) {
        return Err(FxError::decode(
            bytes.len() / frame_len,
            format!(
                "decoded video has invalid size: got {} bytes, expected multiples of {frame_len}",
                bytes.len()
            ),
        ));
    }

    let frames = bytes
        .chunks_exact(frame_len)
        .map(|chunk| {
            crate::frames::PixelBuffer::from_raw(canvas.width, canvas.height, chunk.to_vec())
                .map(crate::frames::Frame::raw)
        })
        .collect::<FxResult<Vec<_>>>()?;
    FrameSequence::new(canvas, frames)
}
