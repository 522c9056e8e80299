//! Renderable entities and the capabilities they share.
//!
//! Every entity owns its visual parameters and its own transition progress. Entities advance
//! their progress inside [`Renderable::render`], right after drawing, so a frame always shows
//! the state reached at the end of the previous one.

pub(crate) mod formula;
pub(crate) mod graph;
pub(crate) mod label;

use std::marker::PhantomData;
use std::time::Duration;

pub use formula::{Alignment, Formula};
pub use graph::{FunctionGraph, GraphFn, Segment};
pub use label::Label;

use crate::formula::Typesetter;
use crate::foundation::core::Fps;
use crate::foundation::error::{MathreelError, MathreelResult};
use crate::render::surface::FrameSurface;
use crate::scene::registry::{EntityId, Registry};
use crate::text::TextShaper;
use crate::transform::coords::CoordinateSpace;

/// Per-entity view of the frame being rendered.
pub struct RenderCx<'a> {
    pub(crate) id: EntityId,
    pub(crate) registry: &'a mut Registry,
    pub(crate) space: CoordinateSpace,
    pub(crate) fps: Fps,
    pub(crate) sample_step: f64,
    pub(crate) shaper: Option<&'a mut (dyn TextShaper + 'static)>,
    pub(crate) typesetter: Option<&'a mut (dyn Typesetter + 'static)>,
}

impl RenderCx<'_> {
    /// Id of the entity being rendered.
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Coordinate space of the current frame.
    pub fn space(&self) -> &CoordinateSpace {
        &self.space
    }

    /// Frame rate that transitions advance at.
    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Graph sampling step in math units.
    pub fn sample_step(&self) -> f64 {
        self.sample_step
    }

    /// Queue removal of the entity being rendered. Takes effect at the next frame boundary.
    pub fn unregister_self(&mut self) {
        self.registry.unregister(self.id);
    }

    /// Queue (re-)registration of the entity being rendered; no-op while it is a member.
    pub fn register_self(&mut self) {
        self.registry.register(self.id);
    }

    /// Text shaper, if the scene has one.
    pub fn shaper(&mut self) -> MathreelResult<&mut (dyn TextShaper + 'static)> {
        self.shaper
            .as_deref_mut()
            .ok_or_else(|| MathreelError::layout("no text shaper configured for labels"))
    }

    /// Formula typesetter, if the scene has one.
    pub fn typesetter(&mut self) -> MathreelResult<&mut (dyn Typesetter + 'static)> {
        self.typesetter
            .as_deref_mut()
            .ok_or_else(|| MathreelError::layout("no typesetter configured for formulas"))
    }
}

/// Draws itself and advances its transitions by one frame.
pub trait Renderable {
    /// Draw the current state into `surface`, then step every transition.
    fn render(&mut self, surface: &mut FrameSurface, cx: &mut RenderCx<'_>) -> MathreelResult<()>;
}

/// Has an entrance transition.
pub trait Animatable {
    /// Arm the entrance transition. Also clears any earlier deletion so the entity is visible
    /// again once it has entered.
    fn animate(&mut self, duration: Duration);
}

/// Has a deletion transition.
pub trait Deletable {
    /// Whether arming the deletion also registers the entity, so that a formula that was never
    /// shown can still fade out.
    const REGISTERS_ON_DELETE: bool = false;

    /// Arm the deletion transition. The entity unregisters itself when it completes.
    fn animate_delete(&mut self, duration: Duration);
}

/// The closed set of entity kinds a scene holds.
#[derive(Clone, Debug)]
pub enum Entity {
    /// A sampled function graph.
    Graph(FunctionGraph),
    /// A typeset formula.
    Formula(Formula),
    /// A text label.
    Label(Label),
}

impl Entity {
    /// Short kind name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Graph(_) => "graph",
            Self::Formula(_) => "formula",
            Self::Label(_) => "label",
        }
    }
}

impl Renderable for Entity {
    fn render(&mut self, surface: &mut FrameSurface, cx: &mut RenderCx<'_>) -> MathreelResult<()> {
        match self {
            Self::Graph(g) => g.render(surface, cx),
            Self::Formula(f) => f.render(surface, cx),
            Self::Label(l) => l.render(surface, cx),
        }
    }
}

/// Conversion between a concrete entity type and [`Entity`].
pub trait SceneEntity: Renderable + Sized + 'static {
    /// Wrap into the entity enum.
    fn into_entity(self) -> Entity;
    /// Borrow the concrete type, if `e` holds one.
    fn from_entity(e: &Entity) -> Option<&Self>;
    /// Mutably borrow the concrete type, if `e` holds one.
    fn from_entity_mut(e: &mut Entity) -> Option<&mut Self>;
}

macro_rules! scene_entity {
    ($ty:ty, $variant:ident) => {
        impl SceneEntity for $ty {
            fn into_entity(self) -> Entity {
                Entity::$variant(self)
            }

            fn from_entity(e: &Entity) -> Option<&Self> {
                match e {
                    Entity::$variant(v) => Some(v),
                    _ => None,
                }
            }

            fn from_entity_mut(e: &mut Entity) -> Option<&mut Self> {
                match e {
                    Entity::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

scene_entity!(FunctionGraph, Graph);
scene_entity!(Formula, Formula);
scene_entity!(Label, Label);

/// Typed reference to an entity stored in a [`crate::Scene`].
pub struct Handle<E> {
    id: EntityId,
    _kind: PhantomData<fn() -> E>,
}

impl<E> Handle<E> {
    pub(crate) fn new(id: EntityId) -> Self {
        Self {
            id,
            _kind: PhantomData,
        }
    }

    /// Untyped id.
    pub fn id(&self) -> EntityId {
        self.id
    }
}

impl<E> Clone for Handle<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for Handle<E> {}

impl<E> PartialEq for Handle<E> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<E> Eq for Handle<E> {}

impl<E> std::fmt::Debug for Handle<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Handle").field(&self.id).finish()
    }
}
