//! The reward surface: a typed event vocabulary and its valuation.
//!
//! Environments translate discrete occurrences into [`RewardEvent`]s and
//! publish them on a [`RewardBus`]. The bus delivers each event to its
//! subscribers in registration order, so fitness accrual is deterministic
//! and ordered rather than riding on an engine's implicit multicast.
//!
//! What can happen ([`RewardEvent`]) is decoupled from what it is worth
//! ([`RewardPolicy`] over [`RewardWeights`]): retuning a reward scheme never
//! touches network or environment code, and when evolution is disabled the
//! policy is simply never subscribed, leaving every publish a no-op.

use crate::{agent::Agent, config::RewardWeights};

/// One environment-driven occurrence addressed to a specific agent.
///
/// Time and distance channels carry a magnitude that scales their weight;
/// the remaining channels apply a flat constant per occurrence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RewardEvent {
    TimeTick { delta_time: f32 },
    DistanceReduced { delta: f32 },
    DistanceIncreased { delta: f32 },
    Kill,
    ParrySuccess,
    Hit,
    Death,
    WhiffLight,
    WhiffHeavy,
    ParryMiss,
    ObstacleContact,
}

/// A subscriber on the reward bus.
pub trait RewardSink {
    fn on_event(&mut self, agent: &mut Agent, event: RewardEvent);
}

/// Multi-subscriber event surface with deterministic, ordered delivery.
#[derive(Default)]
pub struct RewardBus {
    sinks: Vec<Box<dyn RewardSink>>,
}

impl std::fmt::Debug for RewardBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RewardBus")
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

impl RewardBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, sink: Box<dyn RewardSink>) {
        self.sinks.push(sink);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Delivers `event` to every sink, in subscription order.
    pub fn publish(&mut self, agent: &mut Agent, event: RewardEvent) {
        for sink in &mut self.sinks {
            sink.on_event(agent, event);
        }
    }
}

/// The standard valuation: `fitness += weight * magnitude` for scaled
/// channels, `fitness += weight` for flat ones.
#[derive(Debug, Clone)]
pub struct RewardPolicy {
    weights: RewardWeights,
}

impl RewardPolicy {
    #[must_use]
    pub fn new(weights: RewardWeights) -> Self {
        Self { weights }
    }
}

impl RewardSink for RewardPolicy {
    fn on_event(&mut self, agent: &mut Agent, event: RewardEvent) {
        let w = &self.weights;
        let delta = match event {
            RewardEvent::TimeTick { delta_time } => w.time_tick * delta_time,
            RewardEvent::DistanceReduced { delta } => w.distance_reduced * delta,
            RewardEvent::DistanceIncreased { delta } => w.distance_increased * delta,
            RewardEvent::Kill => w.kill,
            RewardEvent::ParrySuccess => w.parry_success,
            RewardEvent::Hit => w.hit,
            RewardEvent::Death => w.death,
            RewardEvent::WhiffLight => w.whiff_light,
            RewardEvent::WhiffHeavy => w.whiff_heavy,
            RewardEvent::ParryMiss => w.parry_miss,
            RewardEvent::ObstacleContact => w.obstacle_contact,
        };
        agent.add_fitness(delta);
    }
}
