//! The externally supplied configuration surface of a training run.
//!
//! Values are validated once, at population construction; a bad value is a
//! fatal [`ConfigError`] there, never a mid-loop surprise.

use serde::{Deserialize, Serialize};

/// A configuration value a population cannot be built from.
#[derive(Debug, Clone, Copy, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("generation size must be at least 1")]
    EmptyGeneration,
    #[display("mutation rate {rate} is outside [0, 1]")]
    MutationRateOutOfRange { rate: f32 },
    #[display("mutation strength {strength} is negative")]
    NegativeMutationStrength { strength: f32 },
    #[display("elitism count {elitism_count} exceeds generation size {generation_size}")]
    ElitismExceedsGeneration {
        elitism_count: usize,
        generation_size: usize,
    },
    #[display("generation duration {duration} is not positive")]
    NonPositiveDuration { duration: f32 },
    #[display("arena rotation needs at least one layout")]
    NoArenas,
}

/// Parameters of the generational loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Population cardinality.
    pub generation_size: usize,
    /// Per-parameter mutation probability, in `[0, 1]`.
    pub mutation_rate: f32,
    /// Bound of the uniform mutation perturbation.
    pub mutation_strength: f32,
    /// Top ranks exempt from mutation (strictly-greater cutoff, see
    /// [`Population::reset`](crate::Population::reset)).
    pub elitism_count: usize,
    /// Generation timer, in seconds.
    pub generation_duration: f32,
    /// When false, fitness never accrues and genomes are never mutated;
    /// the population still resets positions each generation.
    pub evolution_enabled: bool,
    /// When false, ignore any persisted best genome and start fresh.
    pub load_from_disk: bool,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            generation_size: 20,
            mutation_rate: 0.1,
            mutation_strength: 0.5,
            elitism_count: 2,
            generation_duration: 50.0,
            evolution_enabled: true,
            load_from_disk: false,
        }
    }
}

impl EvolutionConfig {
    /// Checks every field against its documented range.
    ///
    /// # Errors
    ///
    /// The first violated constraint, as a [`ConfigError`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.generation_size == 0 {
            return Err(ConfigError::EmptyGeneration);
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(ConfigError::MutationRateOutOfRange {
                rate: self.mutation_rate,
            });
        }
        if self.mutation_strength < 0.0 {
            return Err(ConfigError::NegativeMutationStrength {
                strength: self.mutation_strength,
            });
        }
        if self.elitism_count > self.generation_size {
            return Err(ConfigError::ElitismExceedsGeneration {
                elitism_count: self.elitism_count,
                generation_size: self.generation_size,
            });
        }
        if self.generation_duration <= 0.0 {
            return Err(ConfigError::NonPositiveDuration {
                duration: self.generation_duration,
            });
        }
        Ok(())
    }
}

/// One signed scalar per reward channel: the valuation half of the reward
/// surface, independent of the event vocabulary.
///
/// Penalties are expressed as negative weights. The defaults mirror the
/// hand-tuned values the system was trained with: strong terminal signals
/// (kill, death), moderate per-event combat shaping, and small per-second
/// pressure terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardWeights {
    /// Per second, scaled by elapsed time.
    pub time_tick: f32,
    /// Per distance unit closed toward the target.
    pub distance_reduced: f32,
    /// Per distance unit retreated from the target.
    pub distance_increased: f32,
    pub kill: f32,
    pub parry_success: f32,
    pub hit: f32,
    pub death: f32,
    pub whiff_light: f32,
    pub whiff_heavy: f32,
    pub parry_miss: f32,
    /// Per contact event while touching an obstacle.
    pub obstacle_contact: f32,
}

impl Default for RewardWeights {
    fn default() -> Self {
        Self {
            time_tick: -1.0,
            distance_reduced: 3.0,
            distance_increased: -4.0,
            kill: 200.0,
            parry_success: 50.0,
            hit: 20.0,
            death: -50.0,
            whiff_light: -3.0,
            whiff_heavy: -5.0,
            parry_miss: -5.0,
            obstacle_contact: -0.1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(EvolutionConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_empty_generation() {
        let config = EvolutionConfig {
            generation_size: 0,
            ..EvolutionConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyGeneration));
    }

    #[test]
    fn test_rejects_out_of_range_mutation_rate() {
        let config = EvolutionConfig {
            mutation_rate: 1.5,
            ..EvolutionConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::MutationRateOutOfRange { rate: 1.5 })
        );
    }

    #[test]
    fn test_rejects_elitism_above_generation_size() {
        let config = EvolutionConfig {
            generation_size: 4,
            elitism_count: 5,
            ..EvolutionConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ElitismExceedsGeneration {
                elitism_count: 5,
                generation_size: 4
            })
        );
    }

    #[test]
    fn test_rejects_negative_mutation_strength() {
        let config = EvolutionConfig {
            mutation_strength: -0.1,
            ..EvolutionConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::NegativeMutationStrength { strength: -0.1 })
        );
    }

    #[test]
    fn test_config_json_roundtrip() {
        let config = EvolutionConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: EvolutionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EvolutionConfig = serde_json::from_str(r#"{"generation_size": 8}"#).unwrap();
        assert_eq!(config.generation_size, 8);
        assert_eq!(config.mutation_rate, EvolutionConfig::default().mutation_rate);
    }
}
