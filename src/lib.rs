//! mathreel renders scripted math-explainer videos.
//!
//! A [`Scene`] holds function graphs, typeset formulas and text labels. A [`Timeline`] schedules
//! driver calls on them (`animate`, `morph`, `animate_delete`, `delete`), and a [`Player`] ticks
//! a fixed frame clock: each frame it fires the due calls, flushes the scene's registry and lets
//! every registered entity draw itself and advance its own transitions.
//!
//! - Math space has its origin at the canvas center with y pointing up; see [`CoordinateSpace`].
//! - Frames are rasterized on the CPU with `vello_cpu` and streamed into a [`FrameSink`]
//!   ([`FfmpegSink`] for MP4, [`PngSequenceSink`] for image sequences).
//! - Text shaping and formula typesetting are collaborators behind [`TextShaper`] and
//!   [`Typesetter`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod animation;
/// Video configuration.
pub mod config;
/// Encoding sinks.
pub mod encode;
pub(crate) mod entity;
pub(crate) mod formula;
/// Named colors.
pub mod palette;
pub(crate) mod paint;
pub(crate) mod render;
pub(crate) mod scene;
pub(crate) mod text;
/// Scripted driver timeline.
pub mod timeline;
pub(crate) mod transform;

pub use crate::foundation::core::{
    Affine, Canvas, Fps, FrameIndex, FrameRange, Point, Rect, Rgba8, Vec2,
};
pub use crate::foundation::error::{MathreelError, MathreelResult};
pub use crate::foundation::math::{ease, inv_lerp, lerp};

pub use crate::animation::ease::Ease;
pub use crate::animation::transition::{Step, Transition};
pub use crate::config::VideoConfig;
pub use crate::encode::ffmpeg::{EncoderSettings, FfmpegSink};
pub use crate::encode::png::{PngSequenceSink, write_png};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::entity::{
    Alignment, Animatable, Deletable, Entity, Formula, FunctionGraph, GraphFn, Handle, Label,
    RenderCx, Renderable, SceneEntity, Segment,
};
pub use crate::formula::{FormulaIcon, LatexTools, LatexTypesetter, Typesetter};
pub use crate::paint::hsb::{Hsb, lerp_hsb};
pub use crate::paint::source::{HeightGradient, PaintSource, ResolvedPaint, VerticalGradient};
pub use crate::render::pipeline::{Player, RenderStats};
pub use crate::render::surface::{FrameRGBA, FrameSurface, TextPaint};
pub use crate::scene::{AxesStyle, EntityId, FrameContext, Mutation, Registry, Scene};
pub use crate::text::{ParleyShaper, PlacedGlyph, ShapedText, TextMetrics, TextShaper};
pub use crate::timeline::Timeline;
pub use crate::transform::clip::clip_segment;
pub use crate::transform::coords::CoordinateSpace;
