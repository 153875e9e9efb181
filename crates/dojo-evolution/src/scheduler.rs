//! The outer generation loop: timer, termination predicate, arena cycling.
//!
//! A generation ends when the timer expires or any population has no agents
//! left alive. The scheduler then runs every population's evolving
//! transition, advances to the next arena layout, and re-spawns everyone.

use std::io;

use rand::Rng;

use crate::{config::ConfigError, population::Population};

/// Spawn placement for one arena: one point set per population, indexed
/// alongside the scheduler's population slice.
#[derive(Debug, Clone, Default)]
pub struct ArenaLayout {
    pub spawn_points: Vec<Vec<[f32; 2]>>,
}

impl ArenaLayout {
    #[must_use]
    pub fn new(spawn_points: Vec<Vec<[f32; 2]>>) -> Self {
        Self { spawn_points }
    }

    /// Spawn points for population `index`; empty when the layout defines
    /// none for it (agents then revive in place).
    #[must_use]
    pub fn points_for(&self, index: usize) -> &[[f32; 2]] {
        self.spawn_points.get(index).map_or(&[], Vec::as_slice)
    }
}

/// Round-robin cycle over a non-empty set of arena layouts.
#[derive(Debug, Clone)]
pub struct ArenaRotation {
    layouts: Vec<ArenaLayout>,
    current: usize,
}

impl ArenaRotation {
    /// # Errors
    ///
    /// [`ConfigError::NoArenas`] when `layouts` is empty.
    pub fn new(layouts: Vec<ArenaLayout>) -> Result<Self, ConfigError> {
        if layouts.is_empty() {
            return Err(ConfigError::NoArenas);
        }
        Ok(Self {
            layouts,
            current: 0,
        })
    }

    #[must_use]
    pub fn current(&self) -> &ArenaLayout {
        &self.layouts[self.current]
    }

    /// Moves to the next layout, wrapping around at the end.
    pub fn advance(&mut self) {
        self.current = (self.current + 1) % self.layouts.len();
    }
}

#[derive(Debug)]
pub struct Scheduler {
    rotation: ArenaRotation,
    generation_duration: f32,
    timer: f32,
    generation: u32,
}

impl Scheduler {
    #[must_use]
    pub fn new(rotation: ArenaRotation, generation_duration: f32) -> Self {
        Self {
            rotation,
            generation_duration,
            timer: 0.0,
            generation: 1,
        }
    }

    /// 1-based index of the generation currently running.
    #[must_use]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Spawns all populations on the current layout and zeroes the timer.
    pub fn start(&mut self, populations: &mut [Population]) {
        self.timer = 0.0;
        let layout = self.rotation.current();
        for (index, population) in populations.iter_mut().enumerate() {
            population.spawn(layout.points_for(index));
        }
    }

    /// Advances the generation timer by one world tick.
    pub fn tick(&mut self, delta_time: f32) {
        self.timer += delta_time;
    }

    /// True when the timer has expired or any population is fully dead.
    #[must_use]
    pub fn generation_over(&self, populations: &[Population]) -> bool {
        self.timer >= self.generation_duration
            || populations.iter().any(Population::all_dead)
    }

    /// Ends the current generation: evolves every population, cycles to the
    /// next arena layout, re-spawns, and restarts the timer.
    ///
    /// Returns each population's top fitness, in population order.
    ///
    /// # Errors
    ///
    /// An [`io::Error`] from persisting a new best genome.
    pub fn end_generation<R>(
        &mut self,
        populations: &mut [Population],
        rng: &mut R,
    ) -> io::Result<Vec<f32>>
    where
        R: Rng + ?Sized,
    {
        let mut top_fitnesses = Vec::with_capacity(populations.len());
        for population in &mut *populations {
            top_fitnesses.push(population.reset(rng)?);
        }

        self.rotation.advance();
        self.generation += 1;
        self.start(populations);

        Ok(top_fitnesses)
    }
}

#[cfg(test)]
mod tests {
    use dojo_brain::{Seed, Topology};
    use rand_pcg::Pcg64Mcg;

    use crate::{
        config::{EvolutionConfig, RewardWeights},
        store::NullGenomeStore,
    };

    use super::*;

    fn rng(byte: u8) -> Pcg64Mcg {
        Seed::from_bytes([byte; 16]).rng()
    }

    fn population(size: usize, rng: &mut Pcg64Mcg) -> Population {
        let config = EvolutionConfig {
            generation_size: size,
            ..EvolutionConfig::default()
        };
        Population::new(
            "team",
            config,
            RewardWeights::default(),
            Topology::new(vec![2, 6]).unwrap(),
            None,
            Box::new(NullGenomeStore),
            rng,
        )
        .unwrap()
    }

    fn two_layouts() -> ArenaRotation {
        ArenaRotation::new(vec![
            ArenaLayout::new(vec![vec![[0.0, 0.0]]]),
            ArenaLayout::new(vec![vec![[5.0, 5.0]]]),
        ])
        .unwrap()
    }

    #[test]
    fn test_rotation_rejects_empty_layouts() {
        assert!(matches!(
            ArenaRotation::new(vec![]),
            Err(ConfigError::NoArenas)
        ));
    }

    #[test]
    fn test_rotation_wraps_around() {
        let mut rotation = two_layouts();
        assert_eq!(rotation.current().points_for(0), [[0.0, 0.0]]);
        rotation.advance();
        assert_eq!(rotation.current().points_for(0), [[5.0, 5.0]]);
        rotation.advance();
        assert_eq!(rotation.current().points_for(0), [[0.0, 0.0]]);
    }

    #[test]
    fn test_timer_expiry_ends_generation() {
        let mut rng = rng(1);
        let populations = vec![population(2, &mut rng)];
        let mut scheduler = Scheduler::new(two_layouts(), 10.0);

        assert!(!scheduler.generation_over(&populations));
        for _ in 0..9 {
            scheduler.tick(1.0);
        }
        assert!(!scheduler.generation_over(&populations));
        scheduler.tick(1.0);
        assert!(scheduler.generation_over(&populations));
    }

    #[test]
    fn test_any_population_all_dead_ends_generation() {
        let mut rng = rng(2);
        let mut populations = vec![population(2, &mut rng), population(2, &mut rng)];
        let scheduler = Scheduler::new(two_layouts(), 10.0);

        assert!(!scheduler.generation_over(&populations));
        for agent in populations[1].agents_mut() {
            agent.kill();
        }
        assert!(scheduler.generation_over(&populations));
    }

    #[test]
    fn test_end_generation_cycles_arena_and_respawns() {
        let mut rng = rng(3);
        let mut populations = vec![population(3, &mut rng)];
        let mut scheduler = Scheduler::new(two_layouts(), 10.0);
        scheduler.start(&mut populations);
        assert_eq!(populations[0].agents()[0].position(), [0.0, 0.0]);

        for agent in populations[0].agents_mut() {
            agent.kill();
            agent.genome_mut().set_fitness(4.0);
        }
        scheduler.tick(2.5);
        let tops = scheduler.end_generation(&mut populations, &mut rng).unwrap();

        assert_eq!(tops, vec![4.0]);
        assert_eq!(scheduler.generation(), 2);
        // New generation: second layout, everyone alive, timer restarted.
        for agent in populations[0].agents() {
            assert!(agent.is_alive());
            assert_eq!(agent.position(), [5.0, 5.0]);
        }
        assert!(!scheduler.generation_over(&populations));
    }
}
