use std::collections::VecDeque;

/// Identity of an entity inside a [`crate::Scene`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub(crate) u64);

/// A deferred change to the set of rendered entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mutation {
    /// Add to the end of the draw order.
    Register(EntityId),
    /// Remove from the draw order.
    Unregister(EntityId),
}

/// Draw-ordered set of live entities plus a queue of pending changes to it.
///
/// Mutations requested at any time (including from an entity while it is being rendered) are
/// queued and applied in request order by [`Registry::flush`], which the scene calls once at
/// the start of every frame. The member list therefore never changes during a render pass.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    members: Vec<EntityId>,
    pending: VecDeque<Mutation>,
}

impl Registry {
    /// Queue registration; a no-op for entities that are, or are already queued to become,
    /// members.
    pub fn register(&mut self, id: EntityId) {
        if self.will_be_member(id) {
            return;
        }
        self.pending.push_back(Mutation::Register(id));
    }

    /// Queue removal. Removing an entity that is not a member at flush time is a no-op.
    pub fn unregister(&mut self, id: EntityId) {
        self.pending.push_back(Mutation::Unregister(id));
    }

    /// Apply every queued mutation in the order it was requested.
    pub fn flush(&mut self) {
        while let Some(m) = self.pending.pop_front() {
            match m {
                Mutation::Register(id) => {
                    if !self.members.contains(&id) {
                        self.members.push(id);
                        tracing::debug!(?id, "registered entity");
                    }
                }
                Mutation::Unregister(id) => {
                    if let Some(pos) = self.members.iter().position(|m| *m == id) {
                        self.members.remove(pos);
                        tracing::debug!(?id, "unregistered entity");
                    }
                }
            }
        }
    }

    /// `true` if `id` is currently drawn.
    pub fn is_member(&self, id: EntityId) -> bool {
        self.members.contains(&id)
    }

    /// Membership of `id` once the pending queue has been flushed.
    pub fn will_be_member(&self, id: EntityId) -> bool {
        self.pending
            .iter()
            .fold(self.is_member(id), |member, m| match *m {
                Mutation::Register(x) if x == id => true,
                Mutation::Unregister(x) if x == id => false,
                _ => member,
            })
    }

    /// Members in draw order.
    pub fn members(&self) -> &[EntityId] {
        &self.members
    }

    /// Mutations waiting for the next flush.
    pub fn pending(&self) -> impl Iterator<Item = &Mutation> {
        self.pending.iter()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/registry.rs"]
mod tests;
