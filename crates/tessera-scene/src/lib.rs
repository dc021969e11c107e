//! Tessera Scene - actor/component lifecycle and transform hierarchy
//!
//! A [`World`] owns actors. Each actor carries a lazily created
//! [`Transform`], a set of [`Component`]s behind a deferred add/remove
//! queue, and optional [`ActorBehavior`] hooks. [`World::tick`] drives the
//! fixed phase sequence once per frame; structural changes requested from
//! inside a phase are applied at the next commit point, so hooks can spawn,
//! destroy, attach, detach, and reparent without disturbing the iteration
//! in progress.

mod actor;
mod component;
mod config;
mod context;
mod error;
mod factory;
mod phase;
mod registry;
mod scheduler;
mod transform;
mod world;

pub use actor::{ActorBehavior, ActorId, ActorState};
pub use component::{AsAny, Component, ComponentId, ComponentState, HookResult};
pub use config::WorldConfig;
pub use context::PhaseContext;
pub use error::{HierarchyError, SceneError};
pub use factory::ComponentFactories;
pub use phase::Phase;
pub use registry::ActorRegistry;
pub use scheduler::{FrameStats, RenderStats};
pub use tessera_core::Pose;
pub use transform::Transform;
pub use world::World;
