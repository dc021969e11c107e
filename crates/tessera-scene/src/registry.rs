//! Entity registry: which actors are new, live, or pending destruction.
//!
//! Membership only changes in two ways: `register`/`unregister` record a
//! request, and the scheduler's `claim_*`/`commit` calls apply them. An
//! actor registered or unregistered after the scheduler has claimed this
//! frame's batch waits in the queue for the next frame.

use std::collections::HashSet;

use crate::actor::ActorId;

#[derive(Debug, Default)]
pub struct ActorRegistry {
    live: HashSet<ActorId>,
    /// Registered, spawn not yet claimed.
    new: HashSet<ActorId>,
    /// Spawn claimed this frame.
    spawning: HashSet<ActorId>,
    /// Unregistered, destroy not yet claimed.
    pending: HashSet<ActorId>,
    /// Destroy claimed this frame.
    destroying: HashSet<ActorId>,
}

impl ActorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an actor as newly spawned. Returns `false` if already registered.
    pub fn register(&mut self, actor: ActorId) -> bool {
        if !self.live.insert(actor) {
            return false;
        }
        self.new.insert(actor);
        true
    }

    /// Mark a live actor as pending destruction. Returns `false` if the actor
    /// is unknown or already pending.
    pub fn unregister(&mut self, actor: ActorId) -> bool {
        if !self.live.contains(&actor) || self.is_pending_destruction(actor) {
            return false;
        }
        self.pending.insert(actor);
        true
    }

    /// Take the actors waiting for spawn. They stay "new" until `commit`.
    pub(crate) fn claim_new(&mut self) -> Vec<ActorId> {
        let claimed: Vec<_> = self.new.drain().collect();
        self.spawning.extend(claimed.iter().copied());
        claimed
    }

    /// Take the actors waiting for destruction. Actors whose spawn has not
    /// been claimed yet are left queued so they spawn before they stop.
    pub(crate) fn claim_pending(&mut self) -> Vec<ActorId> {
        let claimed: Vec<_> = self
            .pending
            .iter()
            .copied()
            .filter(|actor| !self.new.contains(actor))
            .collect();
        for actor in &claimed {
            self.pending.remove(actor);
            self.destroying.insert(*actor);
        }
        claimed
    }

    /// Retire this frame's claims: spawned actors stop being new and
    /// destroyed actors leave the live set. Returns the removed actors.
    pub fn commit(&mut self) -> Vec<ActorId> {
        self.spawning.clear();
        let removed: Vec<_> = self.destroying.drain().collect();
        for actor in &removed {
            self.live.remove(actor);
        }
        removed
    }

    pub fn is_live(&self, actor: ActorId) -> bool {
        self.live.contains(&actor)
    }

    pub fn is_new(&self, actor: ActorId) -> bool {
        self.new.contains(&actor) || self.spawning.contains(&actor)
    }

    pub fn is_pending_destruction(&self, actor: ActorId) -> bool {
        self.pending.contains(&actor) || self.destroying.contains(&actor)
    }

    /// Snapshot of actors registered since the last commit.
    pub fn new_actors(&self) -> Vec<ActorId> {
        self.new.union(&self.spawning).copied().collect()
    }

    /// Snapshot of every live actor, including ones pending destruction.
    pub fn live_actors(&self) -> Vec<ActorId> {
        self.live.iter().copied().collect()
    }

    /// Snapshot of actors whose destruction has been requested.
    pub fn pending_destruction(&self) -> Vec<ActorId> {
        self.pending.union(&self.destroying).copied().collect()
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}
