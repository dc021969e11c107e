//! Demo scene: an orbiting rig that periodically spawns short-lived
//! satellites parented under it.

use glam::{Quat, Vec3};
use tessera_scene::{ActorBehavior, ActorId, Component, HookResult, PhaseContext, World};
use tracing::{debug, info};

/// Rotates its actor about an axis.
#[derive(Debug, Clone)]
pub struct Spinner {
    pub axis: Vec3,
    /// Radians per second
    pub speed: f32,
}

impl Default for Spinner {
    fn default() -> Self {
        Self {
            axis: Vec3::Y,
            speed: std::f32::consts::FRAC_PI_2,
        }
    }
}

impl Component for Spinner {
    fn on_update(&mut self, ctx: &mut PhaseContext<'_>) -> HookResult {
        let actor = ctx.actor();
        let step = Quat::from_axis_angle(self.axis.normalize_or_zero(), self.speed * ctx.delta());
        if let Some(transform) = ctx.transform_mut(actor) {
            transform.local.rotate(step);
        }
        Ok(())
    }
}

/// Destroys its actor once `seconds` of scaled time have passed.
#[derive(Debug, Clone)]
pub struct Lifetime {
    pub seconds: f32,
    elapsed: f32,
}

impl Lifetime {
    pub fn new(seconds: f32) -> Self {
        Self {
            seconds,
            elapsed: 0.0,
        }
    }
}

impl Default for Lifetime {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Component for Lifetime {
    fn on_update(&mut self, ctx: &mut PhaseContext<'_>) -> HookResult {
        self.elapsed += ctx.delta();
        let actor = ctx.actor();
        if self.elapsed >= self.seconds && !ctx.registry().is_pending_destruction(actor) {
            ctx.destroy_self()?;
        }
        Ok(())
    }
}

/// Spawns a satellite child every `interval` seconds.
#[derive(Debug, Clone)]
pub struct Spawner {
    pub interval: f32,
    pub radius: f32,
    pub satellite_lifetime: f32,
    timer: f32,
    spawned: u32,
}

impl Default for Spawner {
    fn default() -> Self {
        Self {
            interval: 0.5,
            radius: 2.0,
            satellite_lifetime: 1.25,
            timer: 0.0,
            spawned: 0,
        }
    }
}

impl Component for Spawner {
    fn on_update(&mut self, ctx: &mut PhaseContext<'_>) -> HookResult {
        self.timer += ctx.delta();
        if self.timer < self.interval {
            return Ok(());
        }
        self.timer -= self.interval;
        self.spawned += 1;

        let rig = ctx.actor();
        let satellite = ctx.spawn_actor(format!("satellite-{}", self.spawned));
        ctx.set_parent(satellite, Some(rig))?;
        ctx.translate(satellite, Vec3::X * self.radius);
        ctx.add_component(satellite, Lifetime::new(self.satellite_lifetime));
        ctx.add_component_by_name(satellite, "Spinner");
        Ok(())
    }
}

/// Logs where each satellite ends up when it is torn down.
#[derive(Debug, Default)]
pub struct Announcer;

impl ActorBehavior for Announcer {
    fn on_start(&mut self, ctx: &mut PhaseContext<'_>) -> HookResult {
        info!(actor = ctx.actor_name(ctx.actor()).unwrap_or_default(), "rig online");
        Ok(())
    }

    fn on_update(&mut self, ctx: &mut PhaseContext<'_>) -> HookResult {
        let rig = ctx.actor();
        for &child in ctx.children(rig) {
            if let Some(position) = ctx.world_position(child) {
                debug!(
                    satellite = ctx.actor_name(child).unwrap_or_default(),
                    x = position.x,
                    z = position.z,
                    "satellite position"
                );
            }
        }
        Ok(())
    }

    fn on_stop(&mut self, ctx: &mut PhaseContext<'_>) -> HookResult {
        info!(actor = ctx.actor_name(ctx.actor()).unwrap_or_default(), "rig offline");
        Ok(())
    }
}

/// Populate `world` with the demo rig. Returns the rig actor.
pub fn build(world: &mut World) -> ActorId {
    world.register_component::<Spinner>("Spinner");
    world.register_component::<Lifetime>("Lifetime");
    world.register_component::<Spawner>("Spawner");

    let rig = world.spawn_actor_with("rig", Announcer);
    world.add_component(
        rig,
        Spinner {
            axis: Vec3::Y,
            speed: 1.0,
        },
    );
    world.add_default_component::<Spawner>(rig);
    rig
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn satellites_spawn_and_expire() {
        let mut world = World::default();
        let rig = build(&mut world);

        for _ in 0..40 {
            world.tick(0.05);
        }
        let satellites = world.children(rig).len();
        assert!(satellites > 0);
        // 1.25s lifetime with one spawn per 0.5s keeps at most three alive.
        assert!(satellites <= 3, "{satellites} satellites alive");
        assert!(world.is_alive(rig));
    }

    #[test]
    fn satellite_orbits_in_world_space() {
        let mut world = World::default();
        let rig = build(&mut world);
        world.translate(rig, Vec3::new(0.0, 5.0, 0.0));

        for _ in 0..12 {
            world.tick(0.05);
        }
        let child = world.children(rig)[0];
        let position = world.world_position(child).unwrap();
        assert!((position.y - 5.0).abs() < 1e-4);
        assert!((Vec3::new(position.x, 0.0, position.z).length() - 2.0).abs() < 1e-3);
    }
}
