use std::ops::{Deref, DerefMut};

use crate::actor::ActorId;
use crate::component::ComponentId;
use crate::error::SceneError;
use crate::phase::Phase;
use crate::world::World;

/// What a hook sees while it runs: the world, the actor (and component) the
/// hook belongs to, and the phase being dispatched.
///
/// Dereferences to [`World`], so hooks call world operations directly.
pub struct PhaseContext<'w> {
    world: &'w mut World,
    actor: ActorId,
    component: Option<ComponentId>,
    phase: Phase,
}

impl<'w> PhaseContext<'w> {
    pub(crate) fn new(
        world: &'w mut World,
        actor: ActorId,
        component: Option<ComponentId>,
        phase: Phase,
    ) -> Self {
        Self {
            world,
            actor,
            component,
            phase,
        }
    }

    /// The actor whose hook is running.
    pub fn actor(&self) -> ActorId {
        self.actor
    }

    /// The component whose hook is running, `None` for actor-level hooks.
    pub fn component_id(&self) -> Option<ComponentId> {
        self.component
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Scaled, clamped seconds since the previous frame.
    pub fn delta(&self) -> f32 {
        self.world.clock().delta_time
    }

    /// Queue removal of the component whose hook is running. Fails with
    /// `UnknownActor` when called from an actor-level hook.
    pub fn remove_self(&mut self) -> Result<(), SceneError> {
        match self.component {
            Some(id) => self.world.remove_component(id),
            None => Err(SceneError::UnknownActor(self.actor)),
        }
    }

    /// Request destruction of the owning actor and its descendants.
    pub fn destroy_self(&mut self) -> Result<(), SceneError> {
        let actor = self.actor;
        self.world.destroy_actor(actor)
    }
}

impl Deref for PhaseContext<'_> {
    type Target = World;

    fn deref(&self) -> &World {
        self.world
    }
}

impl DerefMut for PhaseContext<'_> {
    fn deref_mut(&mut self) -> &mut World {
        self.world
    }
}
