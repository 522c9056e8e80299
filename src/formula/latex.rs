use std::io::Read as _;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;

use crate::formula::{FormulaIcon, Typesetter};
use crate::foundation::error::{MathreelError, MathreelResult};

/// Size of the LaTeX body font (10pt) in SVG user units.
const BODY_FONT_UNITS: f64 = 10.0 * 96.0 / 72.0;
const MAX_DIM: u32 = 16_384;

/// Names (or paths) of the external TeX tools.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LatexTools {
    /// The `latex` executable producing DVI.
    pub latex: String,
    /// The `dvisvgm` executable converting DVI to SVG.
    pub dvisvgm: String,
}

impl Default for LatexTools {
    fn default() -> Self {
        Self {
            latex: "latex".to_string(),
            dvisvgm: "dvisvgm".to_string(),
        }
    }
}

impl LatexTools {
    /// Apply `MATHREEL_LATEX` / `MATHREEL_DVISVGM` overrides from the environment.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = std::env::var("MATHREEL_LATEX")
            && !v.trim().is_empty()
        {
            self.latex = v;
        }
        if let Ok(v) = std::env::var("MATHREEL_DVISVGM")
            && !v.trim().is_empty()
        {
            self.dvisvgm = v;
        }
        self
    }

    /// Return `true` when both tools can be invoked.
    pub fn is_available(&self) -> bool {
        probe(&self.latex) && probe(&self.dvisvgm)
    }
}

fn probe(program: &str) -> bool {
    Command::new(program)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// [`Typesetter`] that runs the system `latex` and `dvisvgm` and rasterizes the resulting SVG.
#[derive(Clone, Debug, Default)]
pub struct LatexTypesetter {
    tools: LatexTools,
}

impl LatexTypesetter {
    /// Typesetter using `tools`.
    pub fn new(tools: LatexTools) -> Self {
        Self { tools }
    }

    /// Configured tools.
    pub fn tools(&self) -> &LatexTools {
        &self.tools
    }

    fn run_tools(&self, markup: &str, dir: &Path) -> MathreelResult<Vec<u8>> {
        use anyhow::Context as _;
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create '{}'", dir.display()))?;
        std::fs::write(dir.join("formula.tex"), document(markup))
            .context("failed to write formula.tex")?;

        run(
            Command::new(&self.tools.latex)
                .current_dir(dir)
                .args(["-interaction=nonstopmode", "-halt-on-error", "formula.tex"]),
            &self.tools.latex,
        )?;
        run(
            Command::new(&self.tools.dvisvgm)
                .current_dir(dir)
                .args(["--no-fonts", "--exact-bbox", "-o", "formula.svg", "formula.dvi"]),
            &self.tools.dvisvgm,
        )?;

        std::fs::read(dir.join("formula.svg"))
            .map_err(|e| MathreelError::layout(format!("dvisvgm produced no svg: {e}")))
    }
}

impl Typesetter for LatexTypesetter {
    #[tracing::instrument(level = "debug", skip(self))]
    fn typeset(&mut self, markup: &str, size_px: f64) -> MathreelResult<FormulaIcon> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(MathreelError::validation(
                "formula size must be finite and > 0",
            ));
        }
        let dir = scratch_dir();
        let svg = self.run_tools(markup, &dir);
        let _ = std::fs::remove_dir_all(&dir);
        let svg = svg?;

        let opts = usvg::Options::default();
        let tree = usvg::Tree::from_data(&svg, &opts)
            .map_err(|e| MathreelError::layout(format!("failed to parse formula svg: {e}")))?;
        rasterize_coverage(&tree, size_px / BODY_FONT_UNITS)
    }
}

/// Wrap formula markup into a standalone document. Markup that opens its own environment is
/// placed as-is, everything else is set in display-style math.
fn document(markup: &str) -> String {
    let body = if markup.contains("\\begin{") {
        markup.to_string()
    } else {
        format!("$\\displaystyle {markup}$")
    };
    format!(
        "\\documentclass[preview,varwidth]{{standalone}}\n\
         \\usepackage{{amsmath}}\n\
         \\usepackage{{amssymb}}\n\
         \\begin{{document}}\n\
         {body}\n\
         \\end{{document}}\n"
    )
}

fn scratch_dir() -> PathBuf {
    std::env::temp_dir().join(format!(
        "mathreel_tex_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0)
    ))
}

fn run(cmd: &mut Command, name: &str) -> MathreelResult<()> {
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            MathreelError::layout(format!(
                "failed to spawn {name} (is it installed and on PATH?): {e}"
            ))
        })?;
    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| MathreelError::layout(format!("failed to open {name} stdout")))?;
    let stdout_drain = std::thread::spawn(move || {
        let mut bytes = Vec::new();
        stdout.read_to_end(&mut bytes)?;
        Ok::<_, std::io::Error>(bytes)
    });
    let mut stderr_bytes = Vec::new();
    if let Some(mut stderr) = child.stderr.take() {
        let _ = stderr.read_to_end(&mut stderr_bytes);
    }
    let status = child
        .wait()
        .map_err(|e| MathreelError::layout(format!("failed to wait for {name}: {e}")))?;
    let stdout_bytes = stdout_drain
        .join()
        .map_err(|_| MathreelError::layout(format!("{name} stdout drain thread panicked")))?
        .unwrap_or_default();

    if !status.success() {
        // latex reports errors on stdout, dvisvgm on stderr.
        let out = String::from_utf8_lossy(&stdout_bytes);
        let err = String::from_utf8_lossy(&stderr_bytes);
        let detail = out
            .lines()
            .chain(err.lines())
            .filter(|l| l.starts_with('!') || l.contains("ERROR"))
            .collect::<Vec<_>>()
            .join("; ");
        return Err(MathreelError::layout(format!(
            "{name} exited with status {status}: {detail}"
        )));
    }
    Ok(())
}

fn rasterize_coverage(tree: &usvg::Tree, factor: f64) -> MathreelResult<FormulaIcon> {
    let size = tree.size();
    let to_px = |v: f32| -> MathreelResult<u32> {
        let px = (f64::from(v) * factor).ceil();
        if !px.is_finite() || px <= 0.0 {
            return Err(MathreelError::layout("formula svg has invalid width/height"));
        }
        Ok((px as u32).max(1))
    };
    let width = to_px(size.width())?;
    let height = to_px(size.height())?;
    if width > MAX_DIM || height > MAX_DIM {
        return Err(MathreelError::layout(format!(
            "formula raster size too large: {width}x{height} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| MathreelError::layout("failed to allocate formula pixmap"))?;
    let xform = resvg::tiny_skia::Transform::from_scale(factor as f32, factor as f32);
    resvg::render(tree, xform, &mut pixmap.as_mut());

    let coverage = pixmap.data().chunks_exact(4).map(|px| px[3]).collect();
    Ok(FormulaIcon {
        width,
        height,
        coverage: Arc::new(coverage),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/formula/latex.rs"]
mod tests;
