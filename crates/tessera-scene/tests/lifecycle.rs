//! End-to-end lifecycle behavior through the public API.

use std::sync::Arc;

use glam::Vec3;
use parking_lot::Mutex;
use tessera_scene::{
    ActorBehavior, ActorId, Component, ComponentId, ComponentState, HierarchyError, HookResult,
    PhaseContext, World,
};

type Log = Arc<Mutex<Vec<String>>>;

fn drain(log: &Log) -> Vec<String> {
    std::mem::take(&mut *log.lock())
}

fn count(log: &[String], entry: &str) -> usize {
    log.iter().filter(|e| *e == entry).count()
}

fn position(log: &[String], entry: &str) -> usize {
    log.iter()
        .position(|e| e == entry)
        .unwrap_or_else(|| panic!("{entry} missing from {log:?}"))
}

/// Records every component hook as `tag:phase`.
struct Recorder {
    tag: String,
    log: Log,
}

impl Recorder {
    fn new(tag: impl Into<String>, log: &Log) -> Self {
        Self {
            tag: tag.into(),
            log: log.clone(),
        }
    }

    fn record(&self, ctx: &PhaseContext<'_>) -> HookResult {
        self.log.lock().push(format!("{}:{}", self.tag, ctx.phase()));
        Ok(())
    }
}

impl Component for Recorder {
    fn on_create(&mut self, ctx: &mut PhaseContext<'_>) -> HookResult {
        self.record(ctx)
    }
    fn on_start(&mut self, ctx: &mut PhaseContext<'_>) -> HookResult {
        self.record(ctx)
    }
    fn on_update(&mut self, ctx: &mut PhaseContext<'_>) -> HookResult {
        self.record(ctx)
    }
    fn on_post_update(&mut self, ctx: &mut PhaseContext<'_>) -> HookResult {
        self.record(ctx)
    }
    fn on_destroy(&mut self, ctx: &mut PhaseContext<'_>) -> HookResult {
        self.record(ctx)
    }
}

/// Records every actor hook as `name:phase`.
struct ActorRecorder {
    name: String,
    log: Log,
}

impl ActorRecorder {
    fn new(name: impl Into<String>, log: &Log) -> Self {
        Self {
            name: name.into(),
            log: log.clone(),
        }
    }

    fn record(&self, ctx: &PhaseContext<'_>) -> HookResult {
        self.log.lock().push(format!("{}:{}", self.name, ctx.phase()));
        Ok(())
    }
}

impl ActorBehavior for ActorRecorder {
    fn on_spawn(&mut self, ctx: &mut PhaseContext<'_>) -> HookResult {
        self.record(ctx)
    }
    fn on_start(&mut self, ctx: &mut PhaseContext<'_>) -> HookResult {
        self.record(ctx)
    }
    fn on_update(&mut self, ctx: &mut PhaseContext<'_>) -> HookResult {
        self.record(ctx)
    }
    fn on_stop(&mut self, ctx: &mut PhaseContext<'_>) -> HookResult {
        self.record(ctx)
    }
    fn on_destroy(&mut self, ctx: &mut PhaseContext<'_>) -> HookResult {
        self.record(ctx)
    }
}

const DT: f32 = 1.0 / 60.0;

#[test]
fn add_then_remove_before_commit_starts_and_destroys_once() {
    let log = Log::default();
    let mut world = World::default();
    let a = world.spawn_actor("a");
    let x = world.add_component(a, Recorder::new("x", &log)).unwrap();
    world.remove_component(x).unwrap();
    assert_eq!(world.component_state(x), Some(ComponentState::PendingRemove));

    let stats = world.tick(DT);
    let events = drain(&log);
    assert_eq!(count(&events, "x:start"), 1);
    assert_eq!(count(&events, "x:destroy"), 1);
    assert!(position(&events, "x:start") < position(&events, "x:destroy"));
    assert_eq!(stats.components_started, 1);
    assert_eq!(stats.components_destroyed, 1);
    assert_eq!(world.component_state(x), Some(ComponentState::Detached));

    for _ in 0..3 {
        world.tick(DT);
    }
    assert!(drain(&log).is_empty());
}

#[test]
fn remove_requested_from_own_start_still_destroys_once() {
    struct Ephemeral {
        log: Log,
    }
    impl Component for Ephemeral {
        fn on_start(&mut self, ctx: &mut PhaseContext<'_>) -> HookResult {
            self.log.lock().push("start".into());
            ctx.remove_self()?;
            Ok(())
        }
        fn on_destroy(&mut self, _ctx: &mut PhaseContext<'_>) -> HookResult {
            self.log.lock().push("destroy".into());
            Ok(())
        }
    }

    let log = Log::default();
    let mut world = World::default();
    let a = world.spawn_actor("a");
    world.add_component(a, Ephemeral { log: log.clone() });

    for _ in 0..3 {
        world.tick(DT);
    }
    assert_eq!(drain(&log), vec!["start", "destroy"]);
    assert!(world.components(a).is_empty());
}

#[test]
fn structural_changes_inside_hooks_leave_current_iteration_alone() {
    /// On its first update: spawns an actor, destroys a sibling, reparents
    /// itself, and adds a component to its own actor.
    struct Meddler {
        log: Log,
        victim: ActorId,
        new_parent: ActorId,
        fired: bool,
    }
    impl Component for Meddler {
        fn on_update(&mut self, ctx: &mut PhaseContext<'_>) -> HookResult {
            if self.fired {
                return Ok(());
            }
            self.fired = true;
            let me = ctx.actor();
            let spawned = ctx.spawn_actor("spawned");
            ctx.add_component(spawned, Recorder::new("spawned", &self.log));
            ctx.destroy_actor(self.victim)?;
            ctx.set_parent(me, Some(self.new_parent))?;
            ctx.add_component(me, Recorder::new("late", &self.log));
            Ok(())
        }
    }

    let log = Log::default();
    let mut world = World::default();
    let victim = world.spawn_actor_with("victim", ActorRecorder::new("victim", &log));
    world.add_component(victim, Recorder::new("victim-x", &log));
    let anchor = world.spawn_actor("anchor");
    let meddler = world.spawn_actor("meddler");
    world.tick(DT);
    drain(&log);

    world.add_component(
        meddler,
        Meddler {
            log: log.clone(),
            victim,
            new_parent: anchor,
            fired: false,
        },
    );
    world.tick(DT);
    let events = drain(&log);

    // The victim was updated this frame regardless of visit order: either
    // before the request, or after it since destruction is deferred.
    assert_eq!(count(&events, "victim:update"), 1);
    assert_eq!(count(&events, "victim:stop"), 1);
    assert_eq!(count(&events, "victim-x:destroy"), 1);
    assert!(position(&events, "victim:stop") < position(&events, "victim-x:destroy"));
    // Nothing created this frame ran in it.
    assert_eq!(count(&events, "spawned:start"), 0);
    assert_eq!(count(&events, "late:start"), 0);
    assert_eq!(world.parent(meddler), Some(anchor));

    world.tick(DT);
    let events = drain(&log);
    assert_eq!(count(&events, "spawned:start"), 1);
    assert_eq!(count(&events, "late:start"), 1);
    assert!(!world.registry().is_live(victim));
}

#[test]
fn removing_a_sibling_mid_update_keeps_its_current_dispatch() {
    #[derive(Default)]
    struct Pruner {
        target: Option<ComponentId>,
    }
    impl Component for Pruner {
        fn on_update(&mut self, ctx: &mut PhaseContext<'_>) -> HookResult {
            if let Some(target) = self.target.take() {
                ctx.remove_component(target)?;
            }
            Ok(())
        }
    }

    let log = Log::default();
    let mut world = World::default();
    let a = world.spawn_actor("a");
    let pruner = world.add_default_component::<Pruner>(a).unwrap();
    let sibling = world.add_component(a, Recorder::new("sibling", &log)).unwrap();
    world.component_mut::<Pruner>(pruner).unwrap().target = Some(sibling);

    let stats = world.tick(DT);
    let events = drain(&log);
    assert_eq!(stats.faults, 0);
    assert_eq!(count(&events, "sibling:update"), 1);
    assert_eq!(count(&events, "sibling:post-update"), 1);
    assert_eq!(count(&events, "sibling:destroy"), 0);
    assert_eq!(world.component_state(sibling), Some(ComponentState::PendingRemove));

    world.tick(DT);
    let events = drain(&log);
    assert_eq!(events, vec!["sibling:destroy"]);
    assert_eq!(world.component_state(sibling), Some(ComponentState::Detached));
    assert_eq!(world.components(a), vec![pruner]);
}

#[test]
fn actor_destroyed_before_first_tick_runs_full_lifecycle_once() {
    let log = Log::default();
    let mut world = World::default();
    let a = world.spawn_actor_with("a", ActorRecorder::new("a", &log));
    world.add_component(a, Recorder::new("x", &log));
    world.destroy_actor(a).unwrap();

    let stats = world.tick(DT);
    let events = drain(&log);
    let order = ["a:spawn", "a:start", "a:update", "a:stop", "a:destroy", "x:destroy"];
    for entry in order {
        assert_eq!(count(&events, entry), 1, "{entry} in {events:?}");
    }
    for pair in order.windows(2) {
        assert!(position(&events, pair[0]) < position(&events, pair[1]));
    }
    assert!(position(&events, "x:start") < position(&events, "x:destroy"));
    assert_eq!(stats.spawned, 1);
    assert_eq!(stats.destroyed, 1);
    assert!(!world.registry().is_live(a));
    assert!(!world.is_alive(a));

    world.tick(DT);
    assert!(drain(&log).is_empty());
}

#[test]
fn child_cannot_join_a_parent_pending_destruction() {
    let mut world = World::default();
    let parent = world.spawn_actor("parent");
    let linked = world.spawn_actor("linked");
    let late = world.spawn_actor("late");
    world.set_parent(linked, Some(parent)).unwrap();
    world.tick(DT);

    world.destroy_actor(parent).unwrap();
    assert_eq!(
        world.set_parent(late, Some(parent)),
        Err(HierarchyError::ParentDestroying(parent))
    );
    world.tick(DT);

    assert!(!world.is_alive(parent));
    assert!(!world.is_alive(linked));
    assert!(world.is_alive(late));
    assert_eq!(world.parent(late), None);
}

#[test]
fn reparenting_to_self_or_descendant_is_rejected() {
    let mut world = World::default();
    let root = world.spawn_actor("root");
    let child = world.spawn_actor("child");
    let grandchild = world.spawn_actor("grandchild");
    world.set_parent(child, Some(root)).unwrap();
    world.set_parent(grandchild, Some(child)).unwrap();

    assert_eq!(
        world.set_parent(root, Some(root)),
        Err(HierarchyError::SelfParent(root))
    );
    assert_eq!(
        world.set_parent(root, Some(child)),
        Err(HierarchyError::Cycle {
            child: root,
            parent: child
        })
    );
    assert!(matches!(
        world.set_parent(root, Some(grandchild)),
        Err(HierarchyError::Cycle { .. })
    ));

    assert_eq!(world.parent(root), None);
    assert_eq!(world.children(root), &[child]);
    assert_eq!(world.children(child), &[grandchild]);
    assert_eq!(world.root_of(grandchild), Some(root));
}

#[test]
fn destroying_a_parent_destroys_every_descendant() {
    let log = Log::default();
    let mut world = World::default();
    let root = world.spawn_actor_with("root", ActorRecorder::new("root", &log));
    let mut all = vec![root];
    let mut frontier = vec![root];
    // Two levels of three children each.
    for depth in 0..2 {
        let mut next = Vec::new();
        for &parent in &frontier {
            for i in 0..3 {
                let name = format!("n{depth}-{i}-{}", parent.index());
                let id = world.spawn_actor_with(name.clone(), ActorRecorder::new(name, &log));
                world.set_parent(id, Some(parent)).unwrap();
                next.push(id);
                all.push(id);
            }
        }
        frontier = next;
    }
    let bystander = world.spawn_actor("bystander");
    world.tick(DT);
    drain(&log);
    assert_eq!(world.descendants(root).len(), 12);

    world.destroy_actor(root).unwrap();
    let stats = world.tick(DT);
    let events = drain(&log);

    assert_eq!(stats.destroyed, all.len());
    assert_eq!(events.iter().filter(|e| e.ends_with(":destroy")).count(), all.len());
    for id in &all {
        assert!(!world.registry().is_live(*id));
        assert!(!world.is_alive(*id));
    }
    assert!(world.is_alive(bystander));
    assert_eq!(world.actor_count(), 1);
}

#[test]
fn fresh_actor_runs_spawn_start_update_in_one_frame() {
    let log = Log::default();
    let mut world = World::default();
    let a = world.spawn_actor_with("a", ActorRecorder::new("a", &log));
    world.add_component(a, Recorder::new("x", &log));

    world.tick(DT);
    let events = drain(&log);
    let order = ["a:spawn", "a:start", "a:update", "x:start", "x:update", "x:post-update"];
    for pair in order.windows(2) {
        assert!(
            position(&events, pair[0]) < position(&events, pair[1]),
            "{} should precede {} in {events:?}",
            pair[0],
            pair[1]
        );
    }
    assert!(!events.iter().any(|e| e.ends_with(":stop") || e.ends_with(":destroy")));

    world.tick(DT);
    assert!(!drain(&log).iter().any(|e| e.ends_with(":stop") || e.ends_with(":destroy")));

    world.destroy_actor(a).unwrap();
    world.tick(DT);
    let events = drain(&log);
    assert!(position(&events, "a:stop") < position(&events, "a:destroy"));
    assert_eq!(count(&events, "x:destroy"), 1);
}

#[test]
fn destroying_an_actor_removes_it_after_one_tick() {
    let log = Log::default();
    let mut world = World::default();
    let a = world.spawn_actor("A");
    world.add_component(a, Recorder::new("X", &log));

    world.tick(DT);
    let events = drain(&log);
    assert!(position(&events, "X:start") < position(&events, "X:update"));

    world.destroy_actor(a).unwrap();
    world.tick(DT);
    assert_eq!(count(&drain(&log), "X:destroy"), 1);
    assert!(!world.live_actors().contains(&a));
    assert_eq!(world.find_actor_by_name("A"), None);
}

#[test]
fn child_world_position_follows_parent_without_staleness() {
    let mut world = World::default();
    let p = world.spawn_actor("P");
    let c = world.spawn_actor("C");
    world.translate(c, Vec3::new(0.0, 2.0, 0.0));
    world.set_parent(c, Some(p)).unwrap();

    assert_eq!(world.world_position(c), Some(Vec3::new(0.0, 2.0, 0.0)));
    world.translate(p, Vec3::new(1.0, 0.0, 0.0));
    assert_eq!(world.world_position(c), Some(Vec3::new(1.0, 2.0, 0.0)));
    assert_eq!(world.world_position(c), Some(Vec3::new(1.0, 2.0, 0.0)));

    world.translate(p, Vec3::new(1.0, 0.0, 0.0));
    assert_eq!(world.world_position(c), Some(Vec3::new(2.0, 2.0, 0.0)));
}
