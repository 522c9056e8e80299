use std::collections::HashMap;
use std::time::Duration;

use crate::entity::{
    Animatable, Deletable, Entity, Formula, FunctionGraph, Handle, RenderCx, Renderable,
    SceneEntity,
};
use crate::formula::Typesetter;
use crate::foundation::core::{Canvas, Fps, FrameIndex, Point, Rgba8};
use crate::foundation::error::{MathreelError, MathreelResult};
use crate::render::surface::FrameSurface;
use crate::scene::registry::{EntityId, Registry};
use crate::text::TextShaper;
use crate::transform::coords::CoordinateSpace;

/// Style of the coordinate axes drawn under every frame.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AxesStyle {
    /// Draw the axes at all.
    pub enabled: bool,
    /// Line color.
    pub color: Rgba8,
    /// Line width in pixels.
    pub width: f64,
}

impl Default for AxesStyle {
    fn default() -> Self {
        Self {
            enabled: true,
            color: crate::palette::GRAY,
            width: 0.5,
        }
    }
}

/// Everything a frame render needs to know about the frame itself.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameContext {
    /// Canvas for this frame; may differ from the previous one.
    pub canvas: Canvas,
    /// Index of the frame being rendered.
    pub frame: FrameIndex,
    /// Rate transitions advance at.
    pub fps: Fps,
}

/// Entity arena plus draw registry.
///
/// Entities exist from [`Scene::insert`] on, but are only drawn while registered. All driver
/// calls that change membership go through the registry queue, so they take effect at the start
/// of the next [`Scene::render_frame`].
pub struct Scene {
    entities: HashMap<EntityId, Entity>,
    next_id: u64,
    registry: Registry,
    axes: AxesStyle,
    sample_step: f64,
    shaper: Option<Box<dyn TextShaper>>,
    typesetter: Option<Box<dyn Typesetter>>,
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("entities", &self.entities.len())
            .field("registry", &self.registry)
            .field("axes", &self.axes)
            .field("sample_step", &self.sample_step)
            .field("shaper", &self.shaper.is_some())
            .field("typesetter", &self.typesetter.is_some())
            .finish()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Empty scene with default axes, a sampling step of 1 and no text or formula support.
    pub fn new() -> Self {
        Self {
            entities: HashMap::new(),
            next_id: 0,
            registry: Registry::default(),
            axes: AxesStyle::default(),
            sample_step: 1.0,
            shaper: None,
            typesetter: None,
        }
    }

    /// Use `shaper` for labels.
    pub fn with_shaper(mut self, shaper: impl TextShaper + 'static) -> Self {
        self.shaper = Some(Box::new(shaper));
        self
    }

    /// Use `typesetter` for formulas.
    pub fn with_typesetter(mut self, typesetter: impl Typesetter + 'static) -> Self {
        self.typesetter = Some(Box::new(typesetter));
        self
    }

    /// Axes style.
    pub fn with_axes(mut self, axes: AxesStyle) -> Self {
        self.axes = axes;
        self
    }

    /// Graph sampling step in math units; non-positive or non-finite values are rejected.
    pub fn with_sample_step(mut self, step: f64) -> MathreelResult<Self> {
        if !(step.is_finite() && step > 0.0) {
            return Err(MathreelError::validation("sample step must be > 0"));
        }
        self.sample_step = step;
        Ok(self)
    }

    /// `true` when labels can be rendered.
    pub fn has_shaper(&self) -> bool {
        self.shaper.is_some()
    }

    /// `true` when formulas can be rendered.
    pub fn has_typesetter(&self) -> bool {
        self.typesetter.is_some()
    }

    /// Add an entity to the arena. It is not drawn until registered.
    pub fn insert<E: SceneEntity>(&mut self, entity: E) -> Handle<E> {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.insert(id, entity.into_entity());
        Handle::new(id)
    }

    /// Borrow an entity.
    pub fn get<E: SceneEntity>(&self, handle: Handle<E>) -> Option<&E> {
        self.entities.get(&handle.id()).and_then(E::from_entity)
    }

    /// Mutably borrow an entity, e.g. to build a morph target from a modified clone.
    pub fn get_mut<E: SceneEntity>(&mut self, handle: Handle<E>) -> Option<&mut E> {
        self.entities.get_mut(&handle.id()).and_then(E::from_entity_mut)
    }

    fn entity_mut<E: SceneEntity>(&mut self, handle: Handle<E>) -> MathreelResult<&mut E> {
        self.get_mut(handle)
            .ok_or_else(|| MathreelError::validation(format!("unknown entity {:?}", handle.id())))
    }

    /// Register without any animation.
    pub fn show<E: SceneEntity>(&mut self, handle: Handle<E>) -> MathreelResult<()> {
        self.entity_mut(handle)?;
        self.registry.register(handle.id());
        Ok(())
    }

    /// Arm the entrance and register.
    pub fn animate<E: SceneEntity + Animatable>(
        &mut self,
        handle: Handle<E>,
        duration: Duration,
    ) -> MathreelResult<()> {
        self.entity_mut(handle)?.animate(duration);
        self.registry.register(handle.id());
        Ok(())
    }

    /// Arm the deletion. The entity removes itself when the deletion completes.
    pub fn animate_delete<E: SceneEntity + Deletable>(
        &mut self,
        handle: Handle<E>,
        duration: Duration,
    ) -> MathreelResult<()> {
        self.entity_mut(handle)?.animate_delete(duration);
        if E::REGISTERS_ON_DELETE {
            self.registry.register(handle.id());
        }
        Ok(())
    }

    /// Unregister without animation, at the next frame boundary.
    pub fn delete<E: SceneEntity>(&mut self, handle: Handle<E>) -> MathreelResult<()> {
        self.entity_mut(handle)?;
        self.registry.unregister(handle.id());
        Ok(())
    }

    /// Morph a graph into `target` and register it.
    pub fn morph_graph(
        &mut self,
        handle: Handle<FunctionGraph>,
        duration: Duration,
        target: FunctionGraph,
    ) -> MathreelResult<()> {
        self.entity_mut(handle)?.morph(duration, target);
        self.registry.register(handle.id());
        Ok(())
    }

    /// Retype a formula as `markup` and register it.
    pub fn morph_formula(
        &mut self,
        handle: Handle<Formula>,
        duration: Duration,
        markup: impl Into<String>,
    ) -> MathreelResult<()> {
        self.entity_mut(handle)?.morph(duration, markup);
        self.registry.register(handle.id());
        Ok(())
    }

    /// `true` if the entity was drawn in the last frame (pending changes not applied yet).
    pub fn is_member<E>(&self, handle: Handle<E>) -> bool {
        self.registry.is_member(handle.id())
    }

    /// Drawn entities in draw order.
    pub fn members(&self) -> &[EntityId] {
        self.registry.members()
    }

    /// The registry, including its pending queue.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Number of entities in the arena, drawn or not.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// `true` if no entity was ever inserted.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Draw one frame: background and axes, then flush pending mutations, then render every
    /// member in draw order. Members render against a snapshot of the member list; removals they
    /// request apply at the next frame.
    pub fn render_frame(
        &mut self,
        surface: &mut FrameSurface,
        ctx: FrameContext,
    ) -> MathreelResult<()> {
        surface.resize(ctx.canvas)?;
        surface.begin_frame();
        let space = CoordinateSpace::new(ctx.canvas);
        if self.axes.enabled {
            draw_axes(surface, &space, &self.axes);
        }

        self.registry.flush();
        let members = self.registry.members().to_vec();
        for id in members {
            let Some(entity) = self.entities.get_mut(&id) else {
                tracing::warn!(?id, "registered entity missing from scene");
                continue;
            };
            let kind = entity.kind();
            let mut cx = RenderCx {
                id,
                registry: &mut self.registry,
                space,
                fps: ctx.fps,
                sample_step: self.sample_step,
                shaper: self.shaper.as_deref_mut(),
                typesetter: self.typesetter.as_deref_mut(),
            };
            entity.render(surface, &mut cx).map_err(|e| {
                tracing::error!(?id, kind, frame = ctx.frame.0, "render failed: {e}");
                e
            })?;
        }
        Ok(())
    }
}

fn draw_axes(surface: &mut FrameSurface, space: &CoordinateSpace, axes: &AxesStyle) {
    let h = (
        Point::new(space.left(), 0.0),
        Point::new(space.right(), 0.0),
    );
    let v = (
        Point::new(0.0, space.bottom()),
        Point::new(0.0, space.top()),
    );
    for (a, b) in [h, v] {
        surface.stroke_line(
            space.to_device(a, 1.0),
            space.to_device(b, 1.0),
            axes.width,
            axes.color,
        );
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/scene.rs"]
mod tests;
