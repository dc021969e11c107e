use std::any::TypeId;
use std::collections::HashMap;

use tessera_core::{ClockConfig, FrameClock};
use tracing::{debug, error, warn};

use crate::actor::{Actor, ActorBehavior, ActorId, ActorState, ActorStore};
use crate::component::{Component, ComponentId, ComponentState, HookResult, Mutation};
use crate::config::WorldConfig;
use crate::context::PhaseContext;
use crate::error::SceneError;
use crate::factory::ComponentFactories;
use crate::phase::Phase;
use crate::registry::ActorRegistry;
use crate::scheduler::{FrameScheduler, FrameStats, RenderStats};

/// One simulation context: the actors, their registry, the frame scheduler
/// that drives them, and the clock it advances.
///
/// Every API that needs the world takes it explicitly; hooks reach it
/// through their [`PhaseContext`].
pub struct World {
    config: WorldConfig,
    pub(crate) actors: ActorStore,
    pub(crate) registry: ActorRegistry,
    scheduler: FrameScheduler,
    clock: FrameClock,
    factories: ComponentFactories,
    /// Owner of every attached, not yet destroyed component.
    owners: HashMap<ComponentId, ActorId>,
    next_component: u64,
    in_frame: bool,
}

impl World {
    pub fn new(mut config: WorldConfig) -> Self {
        if let Err(e) = config.clock.validate() {
            warn!(world = %config.name, error = %e, "invalid clock config, using defaults");
            config.clock = ClockConfig::default();
        }
        Self {
            clock: FrameClock::new(config.clock.clone()),
            config,
            actors: ActorStore::new(),
            registry: ActorRegistry::new(),
            scheduler: FrameScheduler::default(),
            factories: ComponentFactories::new(),
            owners: HashMap::new(),
            next_component: 0,
            in_frame: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut FrameClock {
        &mut self.clock
    }

    pub fn registry(&self) -> &ActorRegistry {
        &self.registry
    }

    pub fn factories(&self) -> &ComponentFactories {
        &self.factories
    }

    pub fn factories_mut(&mut self) -> &mut ComponentFactories {
        &mut self.factories
    }

    /// Make `T` constructible by name through [`World::add_component_by_name`].
    pub fn register_component<T: Component + Default>(&mut self, name: impl Into<String>) {
        self.factories.register::<T>(name);
    }

    // ---- Actor management ----

    /// Create an actor and register it; it spawns on the next tick.
    pub fn spawn_actor(&mut self, name: impl Into<String>) -> ActorId {
        self.insert_actor(name.into(), None)
    }

    /// Create an actor with actor-level hooks and register it.
    pub fn spawn_actor_with(
        &mut self,
        name: impl Into<String>,
        behavior: impl ActorBehavior,
    ) -> ActorId {
        self.insert_actor(name.into(), Some(Box::new(behavior)))
    }

    fn insert_actor(&mut self, name: String, behavior: Option<Box<dyn ActorBehavior>>) -> ActorId {
        let id = self.actors.insert(Actor::new(name, behavior));
        self.registry.register(id);
        debug!(
            world = %self.config.name,
            actor = %id,
            actor_name = self.actor_name(id).unwrap_or_default(),
            "actor registered"
        );
        id
    }

    /// Request destruction of an actor and every descendant in its
    /// transform hierarchy. Takes effect at the next tick's destroy phase.
    pub fn destroy_actor(&mut self, actor: ActorId) -> Result<(), SceneError> {
        if !self.actors.contains(actor) {
            warn!(world = %self.config.name, actor = %actor, "destroy requested for unknown actor");
            return Err(SceneError::UnknownActor(actor));
        }
        if !self.registry.unregister(actor) {
            warn!(
                world = %self.config.name,
                actor = %actor,
                "actor is already pending destruction"
            );
            return Err(SceneError::AlreadyDestroying(actor));
        }
        self.set_state(actor, ActorState::PendingDestroy);

        let descendants = self.descendants(actor);
        for child in &descendants {
            if self.registry.unregister(*child) {
                self.set_state(*child, ActorState::PendingDestroy);
            }
        }
        debug!(
            world = %self.config.name,
            actor = %actor,
            descendants = descendants.len(),
            "actor destruction requested"
        );
        Ok(())
    }

    pub fn actor_state(&self, actor: ActorId) -> Option<ActorState> {
        self.actors.get(actor).map(|a| a.state)
    }

    /// Whether the actor exists and its destroy callbacks have not run.
    pub fn is_alive(&self, actor: ActorId) -> bool {
        self.actor_state(actor)
            .is_some_and(|state| state != ActorState::Destroyed)
    }

    /// Number of live actors, including ones pending destruction.
    pub fn actor_count(&self) -> usize {
        self.registry.len()
    }

    /// Snapshot of the live actors.
    pub fn live_actors(&self) -> Vec<ActorId> {
        self.registry.live_actors()
    }

    pub fn actor_name(&self, actor: ActorId) -> Option<&str> {
        self.actors.get(actor).map(|a| a.name.as_str())
    }

    pub fn set_actor_name(
        &mut self,
        actor: ActorId,
        name: impl Into<String>,
    ) -> Result<(), SceneError> {
        let record = self
            .actors
            .get_mut(actor)
            .ok_or(SceneError::UnknownActor(actor))?;
        record.name = name.into();
        Ok(())
    }

    /// First live actor with the given name. Names are not unique.
    pub fn find_actor_by_name(&self, name: &str) -> Option<ActorId> {
        self.actors
            .ids()
            .find(|&id| self.is_alive(id) && self.actor_name(id) == Some(name))
    }

    pub(crate) fn set_state(&mut self, actor: ActorId, state: ActorState) {
        if let Some(record) = self.actors.get_mut(actor) {
            record.state = state;
        }
    }

    // ---- Component management ----

    /// Queue `component` for attachment to `actor`. The returned handle is
    /// usable immediately; the component is created and started at the
    /// actor's next queue commit.
    pub fn add_component<T: Component>(
        &mut self,
        actor: ActorId,
        component: T,
    ) -> Option<ComponentId> {
        self.attach_logged(actor, Box::new(component))
    }

    /// Queue a default-constructed `T` for attachment to `actor`.
    pub fn add_default_component<T: Component + Default>(
        &mut self,
        actor: ActorId,
    ) -> Option<ComponentId> {
        self.add_component(actor, T::default())
    }

    /// Queue a component built by a fallible constructor. A failed
    /// construction is logged and yields `None`.
    pub fn try_add_component<T, F>(&mut self, actor: ActorId, construct: F) -> Option<ComponentId>
    where
        T: Component,
        F: FnOnce() -> anyhow::Result<T>,
    {
        if !self.actors.contains(actor) {
            warn!(
                world = %self.config.name,
                actor = %actor,
                "cannot add component to unknown actor"
            );
            return None;
        }
        match construct() {
            Ok(component) => self.add_component(actor, component),
            Err(e) => {
                let e = SceneError::ConstructionFailed {
                    type_name: std::any::type_name::<T>().to_string(),
                    reason: format!("{e:#}"),
                };
                warn!(
                    world = %self.config.name,
                    actor = %actor,
                    error = %e,
                    "component construction failed"
                );
                None
            }
        }
    }

    /// Queue a component built by the factory registered under `type_name`.
    pub fn add_component_by_name(
        &mut self,
        actor: ActorId,
        type_name: &str,
    ) -> Option<ComponentId> {
        if !self.actors.contains(actor) {
            warn!(
                world = %self.config.name,
                actor = %actor,
                "cannot add component to unknown actor"
            );
            return None;
        }
        match self.factories.create(type_name) {
            Ok(instance) => self.attach_logged(actor, instance),
            Err(e) => {
                warn!(
                    world = %self.config.name,
                    actor = %actor,
                    error = %e,
                    "component construction failed"
                );
                None
            }
        }
    }

    fn attach_logged(
        &mut self,
        actor: ActorId,
        instance: Box<dyn Component>,
    ) -> Option<ComponentId> {
        match self.attach(actor, instance) {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(world = %self.config.name, actor = %actor, error = %e, "component rejected");
                None
            }
        }
    }

    fn attach(
        &mut self,
        actor: ActorId,
        instance: Box<dyn Component>,
    ) -> Result<ComponentId, SceneError> {
        let record = self
            .actors
            .get_mut(actor)
            .ok_or(SceneError::UnknownActor(actor))?;
        if record.state == ActorState::Destroyed {
            return Err(SceneError::ActorDestroyed(actor));
        }
        let id = ComponentId(self.next_component);
        self.next_component += 1;
        record.components.enqueue_add(id, instance);
        self.owners.insert(id, actor);
        debug!(actor = %actor, component = %id, "component queued for add");
        Ok(id)
    }

    /// Queue a pending-add or active component for removal. It receives its
    /// destroy hook at the owner's next queue commit.
    pub fn remove_component(&mut self, id: ComponentId) -> Result<(), SceneError> {
        let actor = self
            .owners
            .get(&id)
            .copied()
            .ok_or(SceneError::UnknownComponent(id))?;
        let record = self
            .actors
            .get_mut(actor)
            .ok_or(SceneError::UnknownComponent(id))?;
        let result = record.components.request_remove(id);
        match &result {
            Ok(()) => debug!(actor = %actor, component = %id, "component queued for removal"),
            Err(e) => {
                warn!(
                    actor = %actor,
                    component = %id,
                    error = %e,
                    "component removal rejected"
                );
            }
        }
        result
    }

    pub fn component<T: Component>(&self, id: ComponentId) -> Option<&T> {
        let actor = *self.owners.get(&id)?;
        self.actors
            .get(actor)?
            .components
            .entry(id)?
            .instance
            .as_deref()?
            .downcast_ref::<T>()
    }

    pub fn component_mut<T: Component>(&mut self, id: ComponentId) -> Option<&mut T> {
        let actor = *self.owners.get(&id)?;
        self.actors
            .get_mut(actor)?
            .components
            .entry_mut(id)?
            .instance
            .as_deref_mut()?
            .downcast_mut::<T>()
    }

    /// Lifecycle state of a component. Handles issued by this world that
    /// no longer resolve are `Detached`.
    pub fn component_state(&self, id: ComponentId) -> Option<ComponentState> {
        match self.owners.get(&id) {
            Some(&actor) => Some(self.actors.get(actor)?.components.entry(id)?.state),
            None if id.0 < self.next_component => Some(ComponentState::Detached),
            None => None,
        }
    }

    pub fn component_owner(&self, id: ComponentId) -> Option<ActorId> {
        self.owners.get(&id).copied()
    }

    /// `"<actor name>.<type name>"` while attached.
    pub fn component_name(&self, id: ComponentId) -> Option<String> {
        let actor = self.actors.get(*self.owners.get(&id)?)?;
        let entry = actor.components.entry(id)?;
        Some(format!("{}.{}", actor.name, entry.short_type_name()))
    }

    /// Every attached component of the actor, in attachment order.
    pub fn components(&self, actor: ActorId) -> Vec<ComponentId> {
        self.actors
            .get(actor)
            .map(|a| a.components.entries().map(|e| e.id).collect())
            .unwrap_or_default()
    }

    /// First component whose concrete type is exactly `T`.
    pub fn find_component<T: Component>(&self, actor: ActorId) -> Option<ComponentId> {
        self.components_of::<T>(actor).into_iter().next()
    }

    /// Every component whose concrete type is exactly `T`.
    pub fn components_of<T: Component>(&self, actor: ActorId) -> Vec<ComponentId> {
        let wanted = TypeId::of::<T>();
        self.actors
            .get(actor)
            .map(|a| {
                a.components
                    .entries()
                    .filter(|e| e.type_id == wanted)
                    .map(|e| e.id)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Components matching an arbitrary predicate. Instances whose hook is
    /// currently running are skipped.
    pub fn components_where(
        &self,
        actor: ActorId,
        predicate: impl Fn(&dyn Component) -> bool,
    ) -> Vec<ComponentId> {
        self.actors
            .get(actor)
            .map(|a| {
                a.components
                    .entries()
                    .filter(|e| e.instance.as_deref().is_some_and(&predicate))
                    .map(|e| e.id)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn live_component_ids(&self, actor: ActorId) -> Vec<ComponentId> {
        self.actors
            .get(actor)
            .map(|a| a.components.live_ids())
            .unwrap_or_default()
    }

    // ---- Frame ----

    /// Advance the clock by `raw_delta` seconds and run one frame.
    ///
    /// Calling this from inside a hook is rejected and returns empty stats.
    pub fn tick(&mut self, raw_delta: f32) -> FrameStats {
        if self.in_frame {
            warn!(world = %self.config.name, "tick requested from inside a phase; ignored");
            return FrameStats::default();
        }
        self.clock.advance(raw_delta);

        let mut scheduler = std::mem::take(&mut self.scheduler);
        self.in_frame = true;
        let stats = scheduler.run_frame(self);
        self.in_frame = false;
        self.scheduler = scheduler;

        debug!(world = %self.config.name, ?stats, "frame complete");
        stats
    }

    /// Run the render phases over every started actor's live components.
    pub fn render(&mut self) -> RenderStats {
        if self.in_frame {
            warn!(world = %self.config.name, "render requested from inside a phase; ignored");
            return RenderStats::default();
        }
        let scheduler = std::mem::take(&mut self.scheduler);
        self.in_frame = true;
        let stats = scheduler.run_render(self);
        self.in_frame = false;
        self.scheduler = scheduler;
        stats
    }

    // ---- Hook dispatch ----

    /// Run one actor-level hook. Returns `false` if the hook failed.
    pub(crate) fn run_actor_hook(&mut self, actor: ActorId, phase: Phase) -> bool {
        let Some(mut behavior) = self.actors.get_mut(actor).and_then(|a| a.behavior.take()) else {
            return true;
        };
        let result = {
            let mut ctx = PhaseContext::new(self, actor, None, phase);
            phase.invoke_actor(&mut *behavior, &mut ctx)
        };
        if let Some(record) = self.actors.get_mut(actor) {
            record.behavior.get_or_insert(behavior);
        }
        self.report(actor, None, phase, result)
    }

    /// Run one component hook. Returns `false` if the hook failed.
    pub(crate) fn run_component_hook(
        &mut self,
        actor: ActorId,
        id: ComponentId,
        phase: Phase,
    ) -> bool {
        let Some(components) = self.actors.get_mut(actor).map(|a| &mut a.components) else {
            return true;
        };
        let Some(type_name) = components.entry(id).map(|e| e.short_type_name()) else {
            return true;
        };
        let Some(mut instance) = components.take_instance(id) else {
            return true;
        };
        let result = {
            let mut ctx = PhaseContext::new(self, actor, Some(id), phase);
            phase.invoke_component(&mut *instance, &mut ctx)
        };
        if let Some(record) = self.actors.get_mut(actor) {
            record.components.restore_instance(id, instance);
        }
        self.report(actor, Some(type_name), phase, result)
    }

    fn report(
        &self,
        actor: ActorId,
        component: Option<&str>,
        phase: Phase,
        result: HookResult,
    ) -> bool {
        let Err(e) = result else {
            return true;
        };
        let message = format!("{e:#}");
        error!(
            world = %self.config.name,
            actor = %actor,
            actor_name = self.actor_name(actor).unwrap_or("<removed>"),
            component = component.unwrap_or("-"),
            phase = %phase,
            error = %message,
            "hook failed"
        );
        false
    }

    /// Commit the actor's component queue: pending adds are created and
    /// started, pending removals are destroyed and evicted, in enqueue order.
    /// Mutations queued by these hooks wait for the next commit.
    pub(crate) fn process_component_queue(&mut self, actor: ActorId, stats: &mut FrameStats) {
        let batch = match self.actors.get_mut(actor) {
            Some(record) => record.components.take_queue(),
            None => return,
        };
        for (id, mutation) in batch {
            match mutation {
                Mutation::Add => {
                    let Some(entry) = self
                        .actors
                        .get_mut(actor)
                        .and_then(|a| a.components.entry_mut(id))
                    else {
                        continue;
                    };
                    if entry.state == ComponentState::PendingAdd {
                        entry.state = ComponentState::Active;
                    }
                    for phase in [Phase::Create, Phase::Start] {
                        if !self.run_component_hook(actor, id, phase) {
                            stats.faults += 1;
                        }
                    }
                    stats.components_started += 1;
                }
                Mutation::Remove => {
                    let known = self
                        .actors
                        .get(actor)
                        .is_some_and(|a| a.components.entry(id).is_some());
                    if !known {
                        continue;
                    }
                    if !self.run_component_hook(actor, id, Phase::Destroy) {
                        stats.faults += 1;
                    }
                    if let Some(record) = self.actors.get_mut(actor) {
                        record.components.evict(id);
                    }
                    self.owners.remove(&id);
                    stats.components_destroyed += 1;
                    debug!(actor = %actor, component = %id, "component detached");
                }
            }
        }
    }

    /// Destroy phase for one actor: its destroy hook, then every component
    /// (pending adds included) is destroyed, then its hierarchy links are cut.
    pub(crate) fn teardown_actor(&mut self, actor: ActorId, stats: &mut FrameStats) {
        self.set_state(actor, ActorState::Destroyed);
        if !self.run_actor_hook(actor, Phase::Destroy) {
            stats.faults += 1;
        }
        loop {
            let Some(record) = self.actors.get_mut(actor) else {
                break;
            };
            record.components.request_remove_all();
            if !record.components.has_queued() {
                break;
            }
            self.process_component_queue(actor, stats);
        }
        self.unlink_hierarchy(actor);
    }

    pub(crate) fn mark_spawned(&mut self, actor: ActorId) {
        if self.actor_state(actor) == Some(ActorState::Registered) {
            self.set_state(actor, ActorState::Active);
        }
        debug!(world = %self.config.name, actor = %actor, "actor spawned");
    }

    /// Drop the records of actors the registry has just removed.
    pub(crate) fn retire(&mut self, removed: &[ActorId]) {
        for &actor in removed {
            if let Some(record) = self.actors.remove(actor) {
                for entry in record.components.entries() {
                    self.owners.remove(&entry.id);
                }
                debug!(
                    world = %self.config.name,
                    actor = %actor,
                    actor_name = %record.name,
                    remaining = self.actors.len(),
                    "actor removed"
                );
            }
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(WorldConfig::default())
    }
}
