//! Agent behavior state machine
//!
//! One machine drives every profile. The profile decides what a sighting
//! does (pursue or flee) and whether trigger events can scare the agent.
//!
//! ```text
//!            sighting (guard)             lost for lose_after_seconds
//!   Patrol ──────────────────▶ Seek ─────────────────────────────────▶ Return
//!     ▲  │ sighting (evader)                                            │  │
//!     │  └──────────────────▶ Flee ── flee_until reached ──────────────▶│  │
//!     │                                                                  │  │
//!     └────────────────────────── arrived at waypoint ◀──────────────────┘  │
//!                                 sighting during Return ───────────────────┘
//! ```

use glam::Vec3;
use serde::{Deserialize, Serialize};
use warden_triggers::TriggerEvent;

use crate::config::AgentConfig;
use crate::error::Result;
use crate::navigation::NavigationAgent;
use crate::patrol::PatrolRoute;
use crate::perception::{planar, AgentPose, Target, DEGENERATE_LENGTH_SQ};
use crate::profile::BehaviorProfile;
use crate::spatial::SpatialQuery;

/// Behavior state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentState {
    /// Walking the route
    Patrol,
    /// Pursuing the target
    Seek,
    /// Running from a threat until the flee timer expires
    Flee,
    /// Heading back to the nearest waypoint of the route
    Return { waypoint: usize },
}

impl AgentState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Patrol => "patrol",
            Self::Seek => "seek",
            Self::Flee => "flee",
            Self::Return { .. } => "return",
        }
    }
}

/// Why a transition happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitionReason {
    TargetSighted,
    TargetLost,
    FleeExpired,
    ReachedRoute,
    Triggered,
    EmptyRoute,
}

/// A state change reported to the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateTransition {
    pub agent: u64,
    pub from: AgentState,
    pub to: AgentState,
    pub reason: TransitionReason,
}

/// Timers owned by the state machine
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentTimers {
    /// Seconds since the last destination refresh while seeking
    pub repath_timer: f32,
    /// Seconds the target has been out of sight while seeking
    pub lost_timer: f32,
    /// Agent clock value at which the current flee ends
    pub flee_until: f64,
}

/// Per-tick inputs and collaborators
pub struct AgentContext<'a> {
    pub pose: AgentPose,
    pub target: Option<Target>,
    pub nav: &'a mut dyn NavigationAgent,
    pub spatial: &'a dyn SpatialQuery,
}

impl<'a> AgentContext<'a> {
    pub fn new(
        pose: AgentPose,
        target: Option<Target>,
        nav: &'a mut dyn NavigationAgent,
        spatial: &'a dyn SpatialQuery,
    ) -> Self {
        Self {
            pose,
            target,
            nav,
            spatial,
        }
    }
}

/// Behavior of a single agent
#[derive(Debug, Clone)]
pub struct AgentBrain {
    entity: u64,
    config: AgentConfig,
    route: PatrolRoute,
    state: AgentState,
    previous_state: Option<AgentState>,
    patrol_index: usize,
    timers: AgentTimers,
    clock: f64,
    speed_before_flee: Option<f32>,
}

impl AgentBrain {
    /// Build an agent in Patrol at waypoint 0
    pub fn new(entity: u64, config: AgentConfig, route: PatrolRoute) -> Result<Self> {
        config.validate()?;
        if route.is_empty() {
            log::warn!("Agent {} ({}) has an empty patrol route", entity, config.profile);
        }

        Ok(Self {
            entity,
            config,
            route,
            state: AgentState::Patrol,
            previous_state: None,
            patrol_index: 0,
            timers: AgentTimers::default(),
            clock: 0.0,
            speed_before_flee: None,
        })
    }

    pub fn entity(&self) -> u64 {
        self.entity
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    pub fn previous_state(&self) -> Option<AgentState> {
        self.previous_state
    }

    pub fn patrol_index(&self) -> usize {
        self.patrol_index
    }

    pub fn timers(&self) -> &AgentTimers {
        &self.timers
    }

    pub fn profile(&self) -> BehaviorProfile {
        self.config.profile
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn route(&self) -> &PatrolRoute {
        &self.route
    }

    /// Seconds accumulated through `tick`
    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Apply patrol speed and head for the current waypoint
    pub fn start(&mut self, nav: &mut dyn NavigationAgent) {
        nav.set_speed(self.config.speeds.patrol);
        if let Some(waypoint) = self.route.get(self.patrol_index) {
            nav.set_destination(waypoint);
        }
        log::debug!(
            "Agent {} ({}) started patrolling {} waypoints",
            self.entity,
            self.config.profile,
            self.route.len()
        );
    }

    /// Advance by `dt` seconds
    ///
    /// Patrol and Return check perception before moving; a sighting hands
    /// the tick to the new state, so at most one transition happens per
    /// tick.
    pub fn tick(&mut self, dt: f32, ctx: &mut AgentContext<'_>) -> Option<StateTransition> {
        let dt = dt.max(0.0);
        self.clock += f64::from(dt);

        if matches!(self.state, AgentState::Patrol | AgentState::Return { .. }) {
            if let Some(transition) = self.check_perception(ctx) {
                return Some(transition);
            }
        }

        match self.state {
            AgentState::Patrol => {
                self.update_patrol(ctx);
                None
            }
            AgentState::Seek => self.update_seek(dt, ctx),
            AgentState::Flee => self.update_flee(ctx),
            AgentState::Return { waypoint } => self.update_return(waypoint, ctx),
        }
    }

    /// React to something entering the agent's trigger volume
    ///
    /// Only trigger-fleeing profiles react, and never while already fleeing.
    pub fn on_trigger_enter(
        &mut self,
        event: &TriggerEvent,
        ctx: &mut AgentContext<'_>,
    ) -> Option<StateTransition> {
        if !self.config.profile.capabilities().flee_on_trigger
            || self.state == AgentState::Flee
            || !event.is_enter()
            || !self.config.flee_trigger.passes(event)
        {
            return None;
        }

        log::info!(
            "Agent {} scared by entity {} at {:?}",
            self.entity,
            event.other_entity,
            event.other_center
        );
        let toward_threat = event.other_center - ctx.pose.position;
        Some(self.enter_flee(toward_threat, ctx, TransitionReason::Triggered))
    }

    fn check_perception(&mut self, ctx: &mut AgentContext<'_>) -> Option<StateTransition> {
        let caps = self.config.profile.capabilities();
        if !caps.can_seek && !caps.flee_on_sight {
            return None;
        }

        let target = ctx.target?;
        let sighting = self
            .config
            .perception
            .perceive(&ctx.pose, Some(&target), ctx.spatial)?;

        if caps.can_seek {
            Some(self.enter_seek(&target, ctx))
        } else {
            Some(self.enter_flee(sighting.direction, ctx, TransitionReason::TargetSighted))
        }
    }

    fn update_patrol(&mut self, ctx: &mut AgentContext<'_>) {
        if self.route.is_empty() || !ctx.nav.has_arrived(self.config.waypoint_tolerance) {
            return;
        }

        self.patrol_index = self.route.next_index(self.patrol_index);
        if let Some(waypoint) = self.route.get(self.patrol_index) {
            ctx.nav.set_destination(waypoint);
            log::trace!("Agent {} heading to waypoint {}", self.entity, self.patrol_index);
        }
    }

    fn enter_seek(&mut self, target: &Target, ctx: &mut AgentContext<'_>) -> StateTransition {
        ctx.nav.reset_path();
        if let Some(speed) = self.config.speeds.seek {
            ctx.nav.set_speed(speed);
        }
        ctx.nav.set_destination(target.position);
        self.transition_to(AgentState::Seek, TransitionReason::TargetSighted)
    }

    fn update_seek(&mut self, dt: f32, ctx: &mut AgentContext<'_>) -> Option<StateTransition> {
        self.timers.repath_timer += dt;
        if self.timers.repath_timer >= self.config.repath_every {
            self.timers.repath_timer = 0.0;
            if let Some(target) = ctx.target {
                ctx.nav.set_destination(target.position);
            }
        }

        let visible = self
            .config
            .perception
            .is_target_visible(&ctx.pose, ctx.target.as_ref(), ctx.spatial);
        if visible {
            self.timers.lost_timer = 0.0;
            return None;
        }

        self.timers.lost_timer += dt;
        if self.timers.lost_timer < self.config.lose_after_seconds {
            return None;
        }

        log::debug!(
            "Agent {} lost its target after {:.2}s",
            self.entity,
            self.timers.lost_timer
        );
        self.timers.lost_timer = 0.0;
        if self.config.speeds.seek.is_some() {
            ctx.nav.set_speed(self.config.speeds.patrol);
        }
        Some(self.enter_return(ctx, TransitionReason::TargetLost))
    }

    fn enter_flee(
        &mut self,
        toward_threat: Vec3,
        ctx: &mut AgentContext<'_>,
        reason: TransitionReason,
    ) -> StateTransition {
        let away = self.flee_direction(toward_threat, &ctx.pose);
        let (point, found) = self.config.flee_search.resolve_flee_destination(
            ctx.pose.position,
            away,
            self.config.flee_distance,
            ctx.spatial,
        );
        if !found {
            log::warn!(
                "Agent {} found no navigable flee point near {:?}, running toward {:?}",
                self.entity,
                ctx.pose.position,
                point
            );
        }

        ctx.nav.reset_path();
        if self.speed_before_flee.is_none() {
            self.speed_before_flee = Some(ctx.nav.speed());
        }
        ctx.nav.set_speed(self.config.speeds.flee);
        ctx.nav.set_destination(point);

        let transition = self.transition_to(AgentState::Flee, reason);
        self.timers.flee_until = self.clock + f64::from(self.config.flee_duration);
        transition
    }

    /// Planar unit direction opposite `toward_threat`, falling back to forward
    fn flee_direction(&self, toward_threat: Vec3, pose: &AgentPose) -> Vec3 {
        let away = planar(-toward_threat);
        if away.length_squared() >= DEGENERATE_LENGTH_SQ {
            return away.normalize();
        }
        let forward = planar(pose.forward);
        if forward.length_squared() >= DEGENERATE_LENGTH_SQ {
            forward.normalize()
        } else {
            Vec3::Z
        }
    }

    fn update_flee(&mut self, ctx: &mut AgentContext<'_>) -> Option<StateTransition> {
        if self.clock < self.timers.flee_until {
            return None;
        }

        let speed = self.speed_before_flee.take().unwrap_or(self.config.speeds.patrol);
        ctx.nav.set_speed(speed);
        Some(self.enter_return(ctx, TransitionReason::FleeExpired))
    }

    fn enter_return(
        &mut self,
        ctx: &mut AgentContext<'_>,
        reason: TransitionReason,
    ) -> StateTransition {
        match self.route.nearest_planar(ctx.pose.position) {
            Some(waypoint) => {
                if let Some(point) = self.route.get(waypoint) {
                    ctx.nav.set_destination(point);
                }
                self.transition_to(AgentState::Return { waypoint }, reason)
            }
            None => self.transition_to(AgentState::Patrol, TransitionReason::EmptyRoute),
        }
    }

    fn update_return(
        &mut self,
        waypoint: usize,
        ctx: &mut AgentContext<'_>,
    ) -> Option<StateTransition> {
        if !ctx.nav.has_arrived(self.config.waypoint_tolerance) {
            return None;
        }

        self.patrol_index = waypoint;
        ctx.nav.set_speed(self.config.speeds.patrol);
        if let Some(point) = self.route.get(waypoint) {
            ctx.nav.set_destination(point);
        }
        Some(self.transition_to(AgentState::Patrol, TransitionReason::ReachedRoute))
    }

    fn transition_to(&mut self, to: AgentState, reason: TransitionReason) -> StateTransition {
        let from = self.state;
        self.previous_state = Some(from);
        self.state = to;
        self.timers.repath_timer = 0.0;
        self.timers.lost_timer = 0.0;

        log::debug!(
            "Agent {} ({}): {} -> {} ({:?})",
            self.entity,
            self.config.profile,
            from.name(),
            to.name(),
            reason
        );

        StateTransition {
            agent: self.entity,
            from,
            to,
            reason,
        }
    }
}
