//! Video configuration loaded from JSON.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::encode::ffmpeg::EncoderSettings;
use crate::formula::LatexTools;
use crate::foundation::core::{Canvas, Fps, Rgba8};
use crate::foundation::error::{MathreelError, MathreelResult};
use crate::palette;
use crate::scene::{AxesStyle, Scene};

/// Output and rendering settings. Every field has a default, so `{}` is a valid config.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Frame rate.
    pub fps: Fps,
    /// Background color.
    pub background: Rgba8,
    /// Coordinate axes.
    pub axes: AxesStyle,
    /// Graph sampling step in math units.
    pub sample_step: f64,
    /// Font file for labels. Labels are unavailable without one.
    pub font_path: Option<PathBuf>,
    /// External TeX tools for formulas.
    pub latex: LatexTools,
    /// MP4 encoder settings.
    pub encoder: EncoderSettings,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            fps: Fps::DEFAULT,
            background: palette::BACK_GRAY,
            axes: AxesStyle::default(),
            sample_step: 1.0,
            font_path: None,
            latex: LatexTools::default(),
            encoder: EncoderSettings::default(),
        }
    }
}

impl VideoConfig {
    /// Parse a config from a JSON reader and validate it.
    pub fn from_reader<R: std::io::Read>(r: R) -> MathreelResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| MathreelError::serde(format!("parse config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a config from a JSON file on disk and validate it.
    pub fn from_path(path: impl AsRef<Path>) -> MathreelResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            MathreelError::validation(format!("open config JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Reject sizes the raster cannot hold, zero frame rates, bad sampling steps and encoder
    /// settings ffmpeg would refuse.
    pub fn validate(&self) -> MathreelResult<()> {
        self.canvas()?;
        Fps::new(self.fps.num, self.fps.den)?;
        if !(self.sample_step.is_finite() && self.sample_step > 0.0) {
            return Err(MathreelError::validation("sample_step must be > 0"));
        }
        if !(self.axes.width.is_finite() && self.axes.width >= 0.0) {
            return Err(MathreelError::validation("axes.width must be >= 0"));
        }
        self.encoder.validate()
    }

    /// Apply environment overrides (`MATHREEL_LATEX`, `MATHREEL_DVISVGM`, `MATHREEL_FFMPEG`).
    pub fn with_env_overrides(mut self) -> Self {
        self.latex = self.latex.with_env_overrides();
        self.encoder = self.encoder.with_env_overrides();
        self
    }

    /// Canvas described by `width` and `height`.
    pub fn canvas(&self) -> MathreelResult<Canvas> {
        Canvas::new(self.width, self.height)
    }

    /// Empty scene with this config's axes and sampling step.
    pub fn scene(&self) -> MathreelResult<Scene> {
        Scene::new()
            .with_axes(self.axes)
            .with_sample_step(self.sample_step)
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
