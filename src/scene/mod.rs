//! The scene: every entity the driver created, plus the registry deciding which of them are drawn.

pub(crate) mod registry;
#[allow(clippy::module_inception)]
pub(crate) mod scene;

pub use registry::{EntityId, Mutation, Registry};
pub use scene::{AxesStyle, FrameContext, Scene};
