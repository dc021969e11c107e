//! Transform hierarchy.
//!
//! Parent and child links are plain actor handles. A parent does not own its
//! children: destroying an actor cascades through [`World::destroy_actor`],
//! never through the links themselves. World poses are folded from the root
//! on every read.

use glam::{Mat4, Quat, Vec3};
use tessera_core::Pose;
use tracing::{debug, warn};

use crate::actor::{ActorId, ActorState};
use crate::error::HierarchyError;
use crate::world::World;

/// Local pose plus hierarchy links of one actor.
#[derive(Debug, Clone, Default)]
pub struct Transform {
    /// Pose relative to the parent, or to the world for roots.
    pub local: Pose,
    pub(crate) parent: Option<ActorId>,
    pub(crate) children: Vec<ActorId>,
}

impl Transform {
    pub fn parent(&self) -> Option<ActorId> {
        self.parent
    }

    pub fn children(&self) -> &[ActorId] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

impl World {
    /// The actor's transform, if it has been created yet.
    pub fn transform(&self, actor: ActorId) -> Option<&Transform> {
        self.actors.get(actor)?.transform.as_ref()
    }

    /// The actor's transform, created as an identity root on first access.
    pub fn transform_mut(&mut self, actor: ActorId) -> Option<&mut Transform> {
        Some(self.actors.get_mut(actor)?.transform_mut())
    }

    pub fn has_transform(&self, actor: ActorId) -> bool {
        self.transform(actor).is_some()
    }

    /// Local pose; identity for an actor whose transform was never touched.
    pub fn local_pose(&self, actor: ActorId) -> Option<Pose> {
        let record = self.actors.get(actor)?;
        Some(record.transform.as_ref().map(|t| t.local).unwrap_or_default())
    }

    pub fn set_local_pose(&mut self, actor: ActorId, pose: Pose) -> bool {
        match self.transform_mut(actor) {
            Some(transform) => {
                transform.local = pose;
                true
            }
            None => false,
        }
    }

    /// Move the actor by `offset` in its parent's space.
    pub fn translate(&mut self, actor: ActorId, offset: Vec3) -> bool {
        match self.transform_mut(actor) {
            Some(transform) => {
                transform.local.translate(offset);
                true
            }
            None => false,
        }
    }

    pub fn parent(&self, actor: ActorId) -> Option<ActorId> {
        self.transform(actor)?.parent
    }

    /// Live view of the actor's children.
    pub fn children(&self, actor: ActorId) -> &[ActorId] {
        self.transform(actor)
            .map(|t| t.children.as_slice())
            .unwrap_or(&[])
    }

    /// Reparent `child` under `parent`, or make it a root with `None`.
    ///
    /// Rejects parenting an actor to itself, to any of its descendants, or
    /// to an actor pending destruction; on rejection the hierarchy is
    /// unchanged.
    pub fn set_parent(
        &mut self,
        child: ActorId,
        parent: Option<ActorId>,
    ) -> Result<(), HierarchyError> {
        let result = self.try_set_parent(child, parent);
        match &result {
            Ok(()) => debug!(child = %child, parent = ?parent, "reparented"),
            Err(e) => warn!(child = %child, error = %e, "reparent rejected"),
        }
        result
    }

    fn try_set_parent(
        &mut self,
        child: ActorId,
        parent: Option<ActorId>,
    ) -> Result<(), HierarchyError> {
        if !self.accepts_links(child) {
            return Err(HierarchyError::UnknownActor(child));
        }
        if let Some(parent) = parent {
            if !self.accepts_links(parent) {
                return Err(HierarchyError::UnknownActor(parent));
            }
            if parent == child {
                return Err(HierarchyError::SelfParent(child));
            }
            if self.registry.is_pending_destruction(parent) {
                return Err(HierarchyError::ParentDestroying(parent));
            }
            if self.is_descendant_of(parent, child) {
                return Err(HierarchyError::Cycle { child, parent });
            }
        }

        let old_parent = self.parent(child);
        if old_parent == parent {
            return Ok(());
        }
        if let Some(old) = old_parent {
            if let Some(transform) = self.actors.get_mut(old).and_then(|a| a.transform.as_mut()) {
                transform.children.retain(|&c| c != child);
            }
        }
        if let Some(parent) = parent {
            if let Some(record) = self.actors.get_mut(parent) {
                record.transform_mut().children.push(child);
            }
        }
        if let Some(record) = self.actors.get_mut(child) {
            record.transform_mut().parent = parent;
        }
        Ok(())
    }

    /// Make the actor a root.
    pub fn detach(&mut self, child: ActorId) -> Result<(), HierarchyError> {
        self.set_parent(child, None)
    }

    fn accepts_links(&self, actor: ActorId) -> bool {
        self.actors
            .get(actor)
            .is_some_and(|a| a.state != ActorState::Destroyed)
    }

    /// Whether `ancestor` appears on the parent chain of `actor`.
    pub fn is_descendant_of(&self, actor: ActorId, ancestor: ActorId) -> bool {
        let mut cursor = self.parent(actor);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// Topmost ancestor of the actor (the actor itself for roots).
    pub fn root_of(&self, actor: ActorId) -> Option<ActorId> {
        if !self.actors.contains(actor) {
            return None;
        }
        let mut current = actor;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        Some(current)
    }

    /// Every actor below `actor` in the hierarchy, depth-first.
    pub fn descendants(&self, actor: ActorId) -> Vec<ActorId> {
        let mut out = Vec::new();
        let mut stack: Vec<ActorId> = self.children(actor).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// World-space pose, folded from the root down to the actor.
    pub fn world_pose(&self, actor: ActorId) -> Option<Pose> {
        let mut chain = Vec::new();
        let mut cursor = Some(actor);
        while let Some(current) = cursor {
            let transform = self.actors.get(current)?.transform.as_ref();
            chain.push(transform.map(|t| t.local).unwrap_or_default());
            cursor = transform.and_then(|t| t.parent);
        }
        Some(
            chain
                .iter()
                .rev()
                .fold(Pose::IDENTITY, |acc, local| Pose::compose(&acc, local)),
        )
    }

    pub fn world_position(&self, actor: ActorId) -> Option<Vec3> {
        self.world_pose(actor).map(|p| p.position)
    }

    pub fn world_rotation(&self, actor: ActorId) -> Option<Quat> {
        self.world_pose(actor).map(|p| p.rotation)
    }

    pub fn world_scale(&self, actor: ActorId) -> Option<Vec3> {
        self.world_pose(actor).map(|p| p.scale)
    }

    pub fn world_matrix(&self, actor: ActorId) -> Option<Mat4> {
        self.world_pose(actor).map(|p| p.matrix())
    }

    /// Move the actor so its world position becomes `position`, keeping its
    /// parent. Fails if an ancestor has a zero scale axis.
    pub fn set_world_position(&mut self, actor: ActorId, position: Vec3) -> bool {
        let parent_pose = match self.parent(actor) {
            Some(parent) => self.world_pose(parent).unwrap_or_default(),
            None => Pose::IDENTITY,
        };
        let Some(local) = parent_pose.inverse_transform_point(position) else {
            return false;
        };
        match self.transform_mut(actor) {
            Some(transform) => {
                transform.local.position = local;
                true
            }
            None => false,
        }
    }

    /// Cut every link to and from the actor. Former children become roots.
    pub(crate) fn unlink_hierarchy(&mut self, actor: ActorId) {
        let Some(transform) = self.actors.get_mut(actor).and_then(|a| a.transform.as_mut()) else {
            return;
        };
        let parent = transform.parent.take();
        let children = std::mem::take(&mut transform.children);

        if let Some(parent) = parent {
            if let Some(t) = self.actors.get_mut(parent).and_then(|a| a.transform.as_mut()) {
                t.children.retain(|&c| c != actor);
            }
        }
        for child in children {
            if let Some(t) = self.actors.get_mut(child).and_then(|a| a.transform.as_mut()) {
                t.parent = None;
            }
        }
    }
}
