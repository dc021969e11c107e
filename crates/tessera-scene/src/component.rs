use std::any::{Any, TypeId};
use std::fmt;

use crate::context::PhaseContext;
use crate::error::SceneError;

/// Return type of every lifecycle hook. An `Err` is logged and counted by
/// the scheduler; it never stops the phase for other actors.
pub type HookResult = anyhow::Result<()>;

/// Type-erasure helpers for components. Implemented for every `'static` type.
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn type_name(&self) -> &'static str;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// A behavior unit attached to exactly one actor.
///
/// Every hook is optional; the defaults do nothing. Hooks receive a
/// [`PhaseContext`] through which they may add or remove components, spawn
/// or destroy actors, and reparent transforms. Structural changes are
/// deferred to the next commit point and never disturb the phase in flight.
///
/// While a hook runs, the component itself is checked out of the world, so
/// looking it up by id from inside its own hook yields `None`.
pub trait Component: AsAny + 'static {
    fn on_create(&mut self, _ctx: &mut PhaseContext<'_>) -> HookResult {
        Ok(())
    }

    fn on_start(&mut self, _ctx: &mut PhaseContext<'_>) -> HookResult {
        Ok(())
    }

    fn on_update(&mut self, _ctx: &mut PhaseContext<'_>) -> HookResult {
        Ok(())
    }

    fn on_post_update(&mut self, _ctx: &mut PhaseContext<'_>) -> HookResult {
        Ok(())
    }

    fn on_pre_render(&mut self, _ctx: &mut PhaseContext<'_>) -> HookResult {
        Ok(())
    }

    fn on_render(&mut self, _ctx: &mut PhaseContext<'_>) -> HookResult {
        Ok(())
    }

    fn on_post_render(&mut self, _ctx: &mut PhaseContext<'_>) -> HookResult {
        Ok(())
    }

    fn on_render_debug(&mut self, _ctx: &mut PhaseContext<'_>) -> HookResult {
        Ok(())
    }

    fn on_destroy(&mut self, _ctx: &mut PhaseContext<'_>) -> HookResult {
        Ok(())
    }
}

impl dyn Component {
    /// Whether the concrete type is exactly `T`.
    pub fn is<T: Component>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }

    pub fn downcast_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut()
    }
}

/// World-unique handle to a component instance. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub(crate) u64);

impl ComponentId {
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// Where a component is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentState {
    /// Queued for attachment; readable and writable but receives no hooks yet.
    PendingAdd,
    /// Created and started; receives update and render hooks.
    Active,
    /// Removal requested; destroyed at the owner's next queue commit.
    PendingRemove,
    /// Destroyed and evicted from its owner.
    Detached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mutation {
    Add,
    Remove,
}

pub(crate) struct ComponentEntry {
    pub id: ComponentId,
    pub type_id: TypeId,
    pub type_name: &'static str,
    pub state: ComponentState,
    /// `None` while a hook on this component is running.
    pub instance: Option<Box<dyn Component>>,
}

impl ComponentEntry {
    /// Type name without its module path.
    pub fn short_type_name(&self) -> &'static str {
        short_type_name(self.type_name)
    }
}

pub(crate) fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// An actor's components plus its pending add/remove queue.
///
/// The entry list is only restructured by [`ComponentSet::evict`], which the
/// owner calls while committing the queue.
#[derive(Default)]
pub(crate) struct ComponentSet {
    entries: Vec<ComponentEntry>,
    queue: Vec<(ComponentId, Mutation)>,
}

impl ComponentSet {
    /// Attach a fresh instance as pending-add.
    pub fn enqueue_add(&mut self, id: ComponentId, instance: Box<dyn Component>) {
        let type_id = (*instance).as_any().type_id();
        let type_name = (*instance).type_name();
        self.entries.push(ComponentEntry {
            id,
            type_id,
            type_name,
            state: ComponentState::PendingAdd,
            instance: Some(instance),
        });
        self.queue.push((id, Mutation::Add));
    }

    /// Queue removal of a pending-add or active component.
    pub fn request_remove(&mut self, id: ComponentId) -> Result<(), SceneError> {
        let entry = self.entry_mut(id).ok_or(SceneError::UnknownComponent(id))?;
        match entry.state {
            ComponentState::PendingAdd | ComponentState::Active => {
                entry.state = ComponentState::PendingRemove;
                self.queue.push((id, Mutation::Remove));
                Ok(())
            }
            ComponentState::PendingRemove => Err(SceneError::AlreadyRemoving(id)),
            ComponentState::Detached => Err(SceneError::UnknownComponent(id)),
        }
    }

    /// Queue removal of every component not already pending removal.
    pub fn request_remove_all(&mut self) -> usize {
        let ids: Vec<_> = self
            .entries
            .iter()
            .filter(|e| {
                matches!(e.state, ComponentState::PendingAdd | ComponentState::Active)
            })
            .map(|e| e.id)
            .collect();
        for id in &ids {
            let _ = self.request_remove(*id);
        }
        ids.len()
    }

    /// Take the queued mutations in enqueue order.
    pub fn take_queue(&mut self) -> Vec<(ComponentId, Mutation)> {
        std::mem::take(&mut self.queue)
    }

    pub fn has_queued(&self) -> bool {
        !self.queue.is_empty()
    }

    pub fn entry(&self, id: ComponentId) -> Option<&ComponentEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn entry_mut(&mut self, id: ComponentId) -> Option<&mut ComponentEntry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    pub fn entries(&self) -> impl Iterator<Item = &ComponentEntry> {
        self.entries.iter()
    }

    /// Check an instance out for a hook call.
    pub fn take_instance(&mut self, id: ComponentId) -> Option<Box<dyn Component>> {
        self.entry_mut(id)?.instance.take()
    }

    /// Return a checked-out instance. Returns `false` if the entry is gone.
    pub fn restore_instance(&mut self, id: ComponentId, instance: Box<dyn Component>) -> bool {
        match self.entry_mut(id) {
            Some(entry) if entry.instance.is_none() => {
                entry.instance = Some(instance);
                true
            }
            _ => false,
        }
    }

    /// Drop an entry from the set, preserving the order of the rest.
    pub fn evict(&mut self, id: ComponentId) -> Option<ComponentEntry> {
        let pos = self.entries.iter().position(|e| e.id == id)?;
        let mut entry = self.entries.remove(pos);
        entry.state = ComponentState::Detached;
        Some(entry)
    }

    /// Components in the live set: started, and not yet destroyed.
    pub fn live_ids(&self) -> Vec<ComponentId> {
        self.entries
            .iter()
            .filter(|e| {
                matches!(e.state, ComponentState::Active | ComponentState::PendingRemove)
            })
            .map(|e| e.id)
            .collect()
    }
}
