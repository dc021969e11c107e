use std::fmt;

use crate::component::{ComponentSet, HookResult};
use crate::context::PhaseContext;
use crate::transform::Transform;

/// Handle to an actor record in a [`World`](crate::World).
///
/// The slot index is reused once an actor is removed at a frame commit; the
/// generation tells the old handle apart, so it stops resolving instead of
/// reaching the newcomer.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActorId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl ActorId {
    /// Rebuild a handle from its parts, e.g. from a log line.
    pub fn from_raw(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    /// How many earlier actors have occupied this slot.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Actor({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Where an actor is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorState {
    /// Registered with the world, waiting for its spawn callback.
    Registered,
    /// Spawned and receiving updates.
    Active,
    /// Destruction requested; stop and destroy run on a later tick.
    PendingDestroy,
    /// Destroy callbacks have run; the record is dropped at the frame commit.
    Destroyed,
}

/// Actor-level lifecycle hooks. Every hook defaults to a no-op.
///
/// Component dispatch happens inside the actor's update step, after
/// [`ActorBehavior::on_update`].
pub trait ActorBehavior: 'static {
    fn on_spawn(&mut self, _ctx: &mut PhaseContext<'_>) -> HookResult {
        Ok(())
    }

    fn on_start(&mut self, _ctx: &mut PhaseContext<'_>) -> HookResult {
        Ok(())
    }

    fn on_update(&mut self, _ctx: &mut PhaseContext<'_>) -> HookResult {
        Ok(())
    }

    fn on_stop(&mut self, _ctx: &mut PhaseContext<'_>) -> HookResult {
        Ok(())
    }

    fn on_destroy(&mut self, _ctx: &mut PhaseContext<'_>) -> HookResult {
        Ok(())
    }
}

/// Everything the world keeps for one actor.
pub(crate) struct Actor {
    pub name: String,
    pub state: ActorState,
    /// Created on first spatial access.
    pub transform: Option<Transform>,
    pub components: ComponentSet,
    /// Taken out while one of its hooks runs.
    pub behavior: Option<Box<dyn ActorBehavior>>,
}

impl Actor {
    pub fn new(name: String, behavior: Option<Box<dyn ActorBehavior>>) -> Self {
        Self {
            name,
            state: ActorState::Registered,
            transform: None,
            components: ComponentSet::default(),
            behavior,
        }
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        self.transform.get_or_insert_with(Transform::default)
    }
}

/// Generational slot storage for actor records.
pub(crate) struct ActorStore {
    generations: Vec<u32>,
    slots: Vec<Option<Actor>>,
    free_list: Vec<u32>,
    len: usize,
}

impl ActorStore {
    pub fn new() -> Self {
        Self {
            generations: Vec::new(),
            slots: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        }
    }

    /// Store a record, reusing a freed slot if available.
    pub fn insert(&mut self, actor: Actor) -> ActorId {
        self.len += 1;
        if let Some(index) = self.free_list.pop() {
            self.slots[index as usize] = Some(actor);
            ActorId {
                index,
                generation: self.generations[index as usize],
            }
        } else {
            let index = self.generations.len() as u32;
            self.generations.push(0);
            self.slots.push(Some(actor));
            ActorId {
                index,
                generation: 0,
            }
        }
    }

    /// Remove a record and retire its handle.
    pub fn remove(&mut self, id: ActorId) -> Option<Actor> {
        if !self.contains(id) {
            return None;
        }
        let idx = id.index as usize;
        let actor = self.slots[idx].take();
        self.generations[idx] += 1;
        self.free_list.push(id.index);
        self.len -= 1;
        actor
    }

    pub fn contains(&self, id: ActorId) -> bool {
        let idx = id.index as usize;
        idx < self.slots.len()
            && self.slots[idx].is_some()
            && self.generations[idx] == id.generation
    }

    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        if !self.contains(id) {
            return None;
        }
        self.slots[id.index as usize].as_ref()
    }

    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        if !self.contains(id) {
            return None;
        }
        self.slots[id.index as usize].as_mut()
    }

    /// Handles of every stored record, in slot order.
    pub fn ids(&self) -> impl Iterator<Item = ActorId> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(index, _)| ActorId {
                index: index as u32,
                generation: self.generations[index],
            })
    }

    pub fn len(&self) -> usize {
        self.len
    }
}
