//! Encoding sinks.
//!
//! Sinks consume rendered frames in timeline order and are fed by
//! [`Player::render_range`](crate::Player::render_range).

use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::MathreelResult;

/// MP4 output via the system `ffmpeg`.
pub mod ffmpeg;
/// PNG image sequence sink.
pub mod png;
/// Generic frame sink trait and the in-memory sink.
pub mod sink;

/// Create the directory an output file will be written into.
pub(crate) fn prepare_output(path: &Path) -> MathreelResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output directory '{}'", parent.display()))?;
    }
    Ok(())
}
