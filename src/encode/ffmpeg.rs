use std::ffi::OsString;
use std::io::{Read as _, Write as _};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

use crate::encode::prepare_output;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{FrameIndex, Rgba8};
use crate::foundation::error::{MathreelError, MathreelResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::surface::FrameRGBA;

/// How MP4 files are encoded. Part of [`VideoConfig`](crate::VideoConfig).
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EncoderSettings {
    /// The `ffmpeg` executable.
    pub program: String,
    /// Video codec passed to `-c:v`.
    pub codec: String,
    /// Constant rate factor, 0 (lossless) to 51.
    pub crf: u8,
    /// Encoder speed preset.
    pub preset: String,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            program: "ffmpeg".to_string(),
            codec: "libx264".to_string(),
            crf: 18,
            preset: "medium".to_string(),
        }
    }
}

impl EncoderSettings {
    /// Apply the `MATHREEL_FFMPEG` override from the environment.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = std::env::var("MATHREEL_FFMPEG")
            && !v.trim().is_empty()
        {
            self.program = v;
        }
        self
    }

    /// Reject settings ffmpeg would refuse.
    pub fn validate(&self) -> MathreelResult<()> {
        if self.crf > 51 {
            return Err(MathreelError::validation("encoder.crf must be <= 51"));
        }
        if self.program.trim().is_empty() || self.codec.trim().is_empty() {
            return Err(MathreelError::validation(
                "encoder.program and encoder.codec must be set",
            ));
        }
        Ok(())
    }

    /// Return `true` when the configured `ffmpeg` can be invoked.
    pub fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|s| s.success())
    }

    /// Command line for encoding raw premultiplied-then-flattened RGBA frames from stdin.
    ///
    /// Odd canvas sizes are padded by one pixel since yuv420p needs even dimensions.
    fn args(&self, cfg: &SinkConfig, out: &Path, overwrite: bool) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();
        let mut push = |a: &str| args.push(a.into());
        push(if overwrite { "-y" } else { "-n" });
        for a in ["-loglevel", "error", "-f", "rawvideo", "-pix_fmt", "rgba"] {
            push(a);
        }
        push("-s");
        push(format!("{}x{}", cfg.width, cfg.height).as_str());
        push("-framerate");
        push(format!("{}/{}", cfg.fps.num, cfg.fps.den).as_str());
        for a in ["-i", "pipe:0", "-an"] {
            push(a);
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            push("-vf");
            push("pad=ceil(iw/2)*2:ceil(ih/2)*2");
        }
        push("-c:v");
        push(self.codec.as_str());
        push("-crf");
        push(self.crf.to_string().as_str());
        if !self.preset.is_empty() {
            push("-preset");
            push(self.preset.as_str());
        }
        for a in ["-pix_fmt", "yuv420p", "-movflags", "+faststart"] {
            push(a);
        }
        args.push(out.as_os_str().to_owned());
        args
    }
}

/// Sink that pipes frames into the system `ffmpeg` and writes an MP4.
///
/// Frames arrive premultiplied; each one is composited over the video background before it is
/// written, since the encoded output has no alpha.
#[derive(Debug)]
pub struct FfmpegSink {
    out_path: PathBuf,
    settings: EncoderSettings,
    background: Rgba8,
    overwrite: bool,
    encoder: Option<Encoder>,
}

impl FfmpegSink {
    /// Sink writing to `out_path` with `settings`, flattening over `background`.
    pub fn new(out_path: impl Into<PathBuf>, settings: EncoderSettings, background: Rgba8) -> Self {
        Self {
            out_path: out_path.into(),
            settings,
            background,
            overwrite: true,
            encoder: None,
        }
    }

    /// Sink using the encoder settings and background of `cfg`.
    pub fn from_config(out_path: impl Into<PathBuf>, cfg: &crate::VideoConfig) -> Self {
        Self::new(out_path, cfg.encoder.clone(), cfg.background)
    }

    /// Whether an existing output file may be replaced. Defaults to `true`.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Output path.
    pub fn out_path(&self) -> &Path {
        &self.out_path
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> MathreelResult<()> {
        if self.encoder.is_some() {
            return Err(MathreelError::render("ffmpeg sink already started"));
        }
        self.settings.validate()?;
        prepare_output(&self.out_path)?;
        if !self.overwrite && self.out_path.exists() {
            return Err(MathreelError::validation(format!(
                "output file '{}' already exists",
                self.out_path.display()
            )));
        }
        let args = self.settings.args(&cfg, &self.out_path, self.overwrite);
        self.encoder = Some(Encoder::spawn(&self.settings.program, args, cfg)?);
        tracing::info!(
            out = %self.out_path.display(),
            codec = %self.settings.codec,
            crf = self.settings.crf,
            width = cfg.width,
            height = cfg.height,
            "encoding mp4"
        );
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> MathreelResult<()> {
        let background = self.background;
        self.encoder
            .as_mut()
            .ok_or_else(|| MathreelError::render("ffmpeg sink not started"))?
            .write(idx, frame, background)
    }

    fn end(&mut self) -> MathreelResult<()> {
        let encoder = self
            .encoder
            .take()
            .ok_or_else(|| MathreelError::render("ffmpeg sink not started"))?;
        let frames = encoder.frames;
        encoder.finish()?;
        tracing::info!(out = %self.out_path.display(), frames, "wrote mp4");
        Ok(())
    }
}

/// A running `ffmpeg` process.
#[derive(Debug)]
struct Encoder {
    child: Child,
    stdin: ChildStdin,
    stderr: JoinHandle<std::io::Result<Vec<u8>>>,
    cfg: SinkConfig,
    last: Option<FrameIndex>,
    frames: u64,
    opaque: Vec<u8>,
}

impl Encoder {
    fn spawn(program: &str, args: Vec<OsString>, cfg: SinkConfig) -> MathreelResult<Self> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| MathreelError::render(format!("failed to spawn '{program}': {e}")))?;
        let (Some(stdin), Some(mut stderr)) = (child.stdin.take(), child.stderr.take()) else {
            return Err(MathreelError::render("ffmpeg pipes were not opened"));
        };
        // Drained on its own thread; ffmpeg stalls once the stderr pipe fills.
        let stderr = std::thread::spawn(move || {
            let mut buf = Vec::new();
            stderr.read_to_end(&mut buf)?;
            Ok(buf)
        });
        Ok(Self {
            child,
            stdin,
            stderr,
            cfg,
            last: None,
            frames: 0,
            opaque: Vec::new(),
        })
    }

    fn write(&mut self, idx: FrameIndex, frame: &FrameRGBA, background: Rgba8) -> MathreelResult<()> {
        if self.last.is_some_and(|last| idx.0 <= last.0) {
            return Err(MathreelError::render(format!(
                "frame {} arrived after frame {}",
                idx.0,
                self.last.map_or(0, |l| l.0)
            )));
        }
        if (frame.width, frame.height) != (self.cfg.width, self.cfg.height) {
            return Err(MathreelError::validation(format!(
                "frame is {}x{}, the video is {}x{}",
                frame.width, frame.height, self.cfg.width, self.cfg.height
            )));
        }
        flatten_onto(&mut self.opaque, frame, background)?;
        self.stdin
            .write_all(&self.opaque)
            .map_err(|e| MathreelError::render(format!("writing frame {} to ffmpeg: {e}", idx.0)))?;
        self.last = Some(idx);
        self.frames += 1;
        Ok(())
    }

    fn finish(self) -> MathreelResult<()> {
        let Self {
            mut child,
            stdin,
            stderr,
            ..
        } = self;
        drop(stdin);
        let status = child
            .wait()
            .map_err(|e| MathreelError::render(format!("waiting for ffmpeg: {e}")))?;
        let log = stderr
            .join()
            .map_err(|_| MathreelError::render("ffmpeg stderr reader panicked"))?
            .map_err(|e| MathreelError::render(format!("reading ffmpeg stderr: {e}")))?;
        if !status.success() {
            return Err(MathreelError::render(format!(
                "ffmpeg exited with {status}: {}",
                String::from_utf8_lossy(&log).trim()
            )));
        }
        Ok(())
    }
}

/// Fill `dst` with `frame` composited over an opaque `background`.
fn flatten_onto(dst: &mut Vec<u8>, frame: &FrameRGBA, background: Rgba8) -> MathreelResult<()> {
    let expected = (frame.width as usize) * (frame.height as usize) * 4;
    if frame.data.len() != expected {
        return Err(MathreelError::validation(format!(
            "frame holds {} bytes, expected {expected}",
            frame.data.len()
        )));
    }
    let bg = background.to_array();
    dst.clear();
    dst.reserve(expected);
    for px in frame.data.chunks_exact(4) {
        let px = if frame.premultiplied {
            [px[0], px[1], px[2], px[3]]
        } else {
            Rgba8::new(px[0], px[1], px[2], px[3]).to_premul_array()
        };
        dst.extend_from_slice(&over_background(px, bg));
    }
    Ok(())
}

fn over_background(px: [u8; 4], bg: [u8; 4]) -> [u8; 4] {
    let inv = 255 - u16::from(px[3]);
    let ch = |i: usize| (u16::from(px[i]) + mul_div255_u16(u16::from(bg[i]), inv)).min(255) as u8;
    [ch(0), ch(1), ch(2), 255]
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
