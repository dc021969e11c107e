use std::fmt;

use crate::actor::ActorBehavior;
use crate::component::{Component, HookResult};
use crate::context::PhaseContext;

/// One named step of the per-frame callback sequence.
///
/// `Spawn` and `Stop` exist only at actor level; `Create`, `PostUpdate` and
/// the render phases exist only at component level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Spawn,
    Create,
    Start,
    Update,
    PostUpdate,
    PreRender,
    Render,
    PostRender,
    RenderDebug,
    Stop,
    Destroy,
}

impl Phase {
    pub fn name(self) -> &'static str {
        match self {
            Phase::Spawn => "spawn",
            Phase::Create => "create",
            Phase::Start => "start",
            Phase::Update => "update",
            Phase::PostUpdate => "post-update",
            Phase::PreRender => "pre-render",
            Phase::Render => "render",
            Phase::PostRender => "post-render",
            Phase::RenderDebug => "render-debug",
            Phase::Stop => "stop",
            Phase::Destroy => "destroy",
        }
    }

    pub(crate) fn invoke_component(
        self,
        component: &mut dyn Component,
        ctx: &mut PhaseContext<'_>,
    ) -> HookResult {
        match self {
            Phase::Create => component.on_create(ctx),
            Phase::Start => component.on_start(ctx),
            Phase::Update => component.on_update(ctx),
            Phase::PostUpdate => component.on_post_update(ctx),
            Phase::PreRender => component.on_pre_render(ctx),
            Phase::Render => component.on_render(ctx),
            Phase::PostRender => component.on_post_render(ctx),
            Phase::RenderDebug => component.on_render_debug(ctx),
            Phase::Destroy => component.on_destroy(ctx),
            Phase::Spawn | Phase::Stop => Ok(()),
        }
    }

    pub(crate) fn invoke_actor(
        self,
        behavior: &mut dyn ActorBehavior,
        ctx: &mut PhaseContext<'_>,
    ) -> HookResult {
        match self {
            Phase::Spawn => behavior.on_spawn(ctx),
            Phase::Start => behavior.on_start(ctx),
            Phase::Update => behavior.on_update(ctx),
            Phase::Stop => behavior.on_stop(ctx),
            Phase::Destroy => behavior.on_destroy(ctx),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
