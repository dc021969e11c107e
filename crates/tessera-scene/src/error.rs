use crate::actor::ActorId;
use crate::component::ComponentId;

/// Errors returned by world-level actor and component operations.
///
/// Every variant describes a rejected request; the world is left unchanged.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("unknown actor {0}")]
    UnknownActor(ActorId),

    #[error("actor {0} is already pending destruction")]
    AlreadyDestroying(ActorId),

    #[error("actor {0} has been destroyed and no longer accepts components")]
    ActorDestroyed(ActorId),

    #[error("unknown component {0}")]
    UnknownComponent(ComponentId),

    #[error("component {0} is already pending removal")]
    AlreadyRemoving(ComponentId),

    #[error("no component factory registered for '{0}'")]
    UnknownComponentType(String),

    #[error("failed to construct component '{type_name}': {reason}")]
    ConstructionFailed { type_name: String, reason: String },
}

/// Errors returned when a reparent request would break the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HierarchyError {
    #[error("unknown actor {0}")]
    UnknownActor(ActorId),

    #[error("actor {0} cannot be its own parent")]
    SelfParent(ActorId),

    #[error("actor {0} is pending destruction and cannot take new children")]
    ParentDestroying(ActorId),

    #[error("parenting {child} to {parent} would create a cycle")]
    Cycle { child: ActorId, parent: ActorId },
}
