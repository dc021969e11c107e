//! Frame scheduler.
//!
//! One tick runs, in order: spawn, start, update (with each actor's
//! component queue commit and component updates), post-update, stop,
//! destroy, and finally the registry commit. Every phase iterates a copied
//! snapshot, so hooks may spawn, destroy, or reparent freely; the effects
//! show up in later snapshots, never in the one being walked.

use std::collections::HashSet;

use crate::actor::ActorId;
use crate::phase::Phase;
use crate::world::World;

/// Counters for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Clock frame number this tick ran as.
    pub frame: u64,
    pub spawned: usize,
    pub started: usize,
    pub updated: usize,
    pub stopped: usize,
    pub destroyed: usize,
    pub components_started: usize,
    pub components_destroyed: usize,
    /// Hooks that returned an error. Each was logged and skipped.
    pub faults: usize,
}

/// Counters for one render pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub invocations: usize,
    pub faults: usize,
}

/// Tracks which actors are eligible for update across frames.
#[derive(Debug, Default)]
pub(crate) struct FrameScheduler {
    updating: HashSet<ActorId>,
}

impl FrameScheduler {
    pub(crate) fn run_frame(&mut self, world: &mut World) -> FrameStats {
        let mut stats = FrameStats {
            frame: world.clock().frame_count,
            ..Default::default()
        };

        let spawned = world.registry.claim_new();
        self.updating.extend(spawned.iter().copied());

        for &actor in &spawned {
            world.mark_spawned(actor);
            Self::hook(world, actor, Phase::Spawn, &mut stats);
            stats.spawned += 1;
        }

        for &actor in &spawned {
            Self::hook(world, actor, Phase::Start, &mut stats);
            stats.started += 1;
        }

        let to_update: Vec<ActorId> = self.updating.iter().copied().collect();
        for &actor in &to_update {
            if !world.actors.contains(actor) {
                continue;
            }
            Self::hook(world, actor, Phase::Update, &mut stats);
            world.process_component_queue(actor, &mut stats);
            Self::component_hooks(world, actor, Phase::Update, &mut stats.faults);
            stats.updated += 1;
        }

        for &actor in &to_update {
            Self::component_hooks(world, actor, Phase::PostUpdate, &mut stats.faults);
        }

        let doomed = world.registry.claim_pending();

        for &actor in &doomed {
            self.updating.remove(&actor);
            Self::hook(world, actor, Phase::Stop, &mut stats);
            stats.stopped += 1;
        }

        for &actor in &doomed {
            world.teardown_actor(actor, &mut stats);
            stats.destroyed += 1;
        }

        let removed = world.registry.commit();
        world.retire(&removed);
        stats
    }

    pub(crate) fn run_render(&self, world: &mut World) -> RenderStats {
        let mut stats = RenderStats::default();
        let actors: Vec<ActorId> = self.updating.iter().copied().collect();

        let mut phases = vec![Phase::PreRender, Phase::Render, Phase::PostRender];
        if world.config().render_debug {
            phases.push(Phase::RenderDebug);
        }
        for phase in phases {
            for &actor in &actors {
                let ids = world.live_component_ids(actor);
                stats.invocations += ids.len();
                for id in ids {
                    if !world.run_component_hook(actor, id, phase) {
                        stats.faults += 1;
                    }
                }
            }
        }
        stats
    }

    fn hook(world: &mut World, actor: ActorId, phase: Phase, stats: &mut FrameStats) {
        if !world.run_actor_hook(actor, phase) {
            stats.faults += 1;
        }
    }

    fn component_hooks(world: &mut World, actor: ActorId, phase: Phase, faults: &mut usize) {
        for id in world.live_component_ids(actor) {
            if !world.run_component_hook(actor, id, phase) {
                *faults += 1;
            }
        }
    }
}
