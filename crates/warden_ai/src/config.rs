//! Agent tuning

use serde::{Deserialize, Serialize};
use warden_triggers::{TriggerFilter, KEY_ITEM_TAG};

use crate::error::{non_negative, AiError, Result};
use crate::flee::FleeSearch;
use crate::perception::PerceptionConfig;
use crate::profile::BehaviorProfile;
use crate::spatial::LayerMask;

/// Collision layer agents live on unless configured otherwise
pub const DEFAULT_AGENT_LAYER: u8 = 2;

/// Travel speeds per state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedProfile {
    /// Speed while patrolling and returning
    pub patrol: f32,
    /// Speed while seeking, `None` keeps the current speed
    #[serde(default)]
    pub seek: Option<f32>,
    /// Speed while fleeing
    pub flee: f32,
}

impl Default for SpeedProfile {
    fn default() -> Self {
        Self {
            patrol: 3.5,
            seek: None,
            flee: 3.6,
        }
    }
}

/// Complete configuration of one agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub profile: BehaviorProfile,
    pub perception: PerceptionConfig,
    /// Collision layer of the agent's own body
    pub agent_layer: u8,
    /// Extra slack on top of the navigation stopping distance
    pub waypoint_tolerance: f32,
    /// Seconds between destination refreshes while seeking
    pub repath_every: f32,
    /// Seconds without sight before giving up pursuit
    pub lose_after_seconds: f32,
    pub speeds: SpeedProfile,
    /// How far to run when fleeing
    pub flee_distance: f32,
    /// How long a flee lasts in seconds
    pub flee_duration: f32,
    pub flee_search: FleeSearch,
    /// What may scare a trigger-fleeing agent
    pub flee_trigger: TriggerFilter,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::for_profile(BehaviorProfile::default())
    }
}

impl AgentConfig {
    /// Stock tuning for a profile
    pub fn for_profile(profile: BehaviorProfile) -> Self {
        let guard = Self {
            profile,
            perception: PerceptionConfig::new(10.0, 90.0),
            agent_layer: DEFAULT_AGENT_LAYER,
            waypoint_tolerance: 0.3,
            repath_every: 0.2,
            lose_after_seconds: 1.0,
            speeds: SpeedProfile::default(),
            flee_distance: 6.0,
            flee_duration: 2.0,
            flee_search: FleeSearch::new(20.0, 3),
            flee_trigger: TriggerFilter::held_item(KEY_ITEM_TAG),
        };

        match profile {
            BehaviorProfile::StandardGuard | BehaviorProfile::TriggerableGuard => guard,
            BehaviorProfile::WaryEvader => Self {
                perception: PerceptionConfig::new(12.0, 120.0)
                    .with_eye_height(1.2)
                    .with_los_mask(LayerMask::all_except(DEFAULT_AGENT_LAYER)),
                speeds: SpeedProfile {
                    patrol: 2.0,
                    seek: None,
                    flee: 3.6,
                },
                flee_search: FleeSearch::new(20.0, 4),
                ..guard
            },
        }
    }

    pub fn with_perception(mut self, perception: PerceptionConfig) -> Self {
        self.perception = perception;
        self
    }

    pub fn with_speeds(mut self, speeds: SpeedProfile) -> Self {
        self.speeds = speeds;
        self
    }

    /// Move the agent to another layer
    ///
    /// Profiles that ignore their own layer for line of sight follow it.
    pub fn with_agent_layer(mut self, layer: u8) -> Self {
        if !self.perception.los_mask.contains(self.agent_layer) {
            self.perception.los_mask = self
                .perception
                .los_mask
                .including(self.agent_layer)
                .excluding(layer);
        }
        self.agent_layer = layer;
        self
    }

    pub fn with_flee(mut self, distance: f32, duration: f32) -> Self {
        self.flee_distance = distance;
        self.flee_duration = duration;
        self
    }

    pub fn with_flee_trigger(mut self, filter: TriggerFilter) -> Self {
        self.flee_trigger = filter;
        self
    }

    /// Check every tuning value
    pub fn validate(&self) -> Result<()> {
        self.perception.validate()?;
        self.flee_search.validate()?;

        non_negative("waypoint_tolerance", self.waypoint_tolerance)?;
        non_negative("repath_every", self.repath_every)?;
        non_negative("lose_after_seconds", self.lose_after_seconds)?;
        non_negative("patrol_speed", self.speeds.patrol)?;
        if let Some(seek) = self.speeds.seek {
            non_negative("seek_speed", seek)?;
        }
        non_negative("flee_speed", self.speeds.flee)?;
        non_negative("flee_distance", self.flee_distance)?;
        non_negative("flee_duration", self.flee_duration)?;

        if self.agent_layer >= 32 {
            return Err(AiError::InvalidParameter {
                name: "agent_layer",
                value: self.agent_layer as f32,
            });
        }

        if self.profile.capabilities().flee_on_trigger
            && self.flee_trigger.required_tags.is_empty()
        {
            return Err(AiError::UntaggedFleeTrigger);
        }

        Ok(())
    }
}
