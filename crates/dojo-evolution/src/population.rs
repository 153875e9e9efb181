//! Fixed-size agent populations and the evolving transition.
//!
//! A [`Population`] cycles through Spawning, Active (fitness accrual via the
//! reward bus), and Evolving ([`Population::reset`]). The agent array is
//! allocated once: across generations genomes are overwritten in place from
//! the best genome, never reallocated.

use std::io;

use rand::Rng;

use dojo_brain::{Network, Topology};

use crate::{
    agent::Agent,
    config::{ConfigError, EvolutionConfig, RewardWeights},
    reward::{RewardBus, RewardEvent, RewardPolicy},
    stats::FitnessStats,
    store::GenomeStore,
};

pub struct Population {
    name: String,
    config: EvolutionConfig,
    agents: Vec<Agent>,
    bus: RewardBus,
    store: Box<dyn GenomeStore>,
    /// Best top-of-generation fitness seen so far; gates persistence.
    best_ever: f32,
}

impl std::fmt::Debug for Population {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Population")
            .field("name", &self.name)
            .field("agents", &self.agents.len())
            .field("best_ever", &self.best_ever)
            .finish_non_exhaustive()
    }
}

impl Population {
    /// Builds a population of `config.generation_size` agents.
    ///
    /// Genomes are seeded from, in priority order: the explicit `initial`
    /// snapshot, the store's persisted best (only when
    /// `config.load_from_disk`), or fresh random networks. A missing or
    /// corrupt stored genome, or one with a different topology, falls back
    /// to random initialization rather than a partial load.
    ///
    /// The reward policy is subscribed only while evolution is enabled; with
    /// it disabled the bus stays empty and publishes are no-ops.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] when the configuration fails validation.
    pub fn new<R>(
        name: impl Into<String>,
        config: EvolutionConfig,
        reward_weights: RewardWeights,
        topology: Topology,
        initial: Option<Network>,
        mut store: Box<dyn GenomeStore>,
        rng: &mut R,
    ) -> Result<Self, ConfigError>
    where
        R: Rng + ?Sized,
    {
        config.validate()?;

        let baseline = initial
            .or_else(|| config.load_from_disk.then(|| store.load()).flatten())
            .filter(|net| *net.topology() == topology);
        let agents = (0..config.generation_size)
            .map(|_| {
                let genome = match &baseline {
                    Some(base) => {
                        let mut genome = base.clone();
                        genome.set_fitness(0.0);
                        genome
                    }
                    None => Network::random(topology.clone(), rng),
                };
                Agent::new(genome)
            })
            .collect();

        let mut bus = RewardBus::new();
        if config.evolution_enabled {
            bus.subscribe(Box::new(RewardPolicy::new(reward_weights)));
        }

        Ok(Self {
            name: name.into(),
            config,
            agents,
            bus,
            store,
            best_ever: f32::MIN,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    #[must_use]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agents_mut(&mut self) -> &mut [Agent] {
        &mut self.agents
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.agents.iter().filter(|agent| agent.is_alive()).count()
    }

    #[must_use]
    pub fn all_dead(&self) -> bool {
        self.alive_count() == 0
    }

    /// Best top-of-generation fitness observed across the whole run.
    #[must_use]
    pub fn best_ever(&self) -> f32 {
        self.best_ever
    }

    /// Routes one reward event to the agent at `index` through the bus.
    pub fn publish(&mut self, index: usize, event: RewardEvent) {
        self.bus.publish(&mut self.agents[index], event);
    }

    /// Distributes agents across `spawn_points` and revives them.
    ///
    /// Agents are partitioned as evenly as possible; any remainder lands on
    /// the last point. With no points given, agents revive in place.
    pub fn spawn(&mut self, spawn_points: &[[f32; 2]]) {
        if spawn_points.is_empty() {
            for agent in &mut self.agents {
                let position = agent.position();
                agent.respawn(position);
            }
            return;
        }
        let per_point = self.agents.len() / spawn_points.len();
        let last = spawn_points.len() - 1;
        for (i, agent) in self.agents.iter_mut().enumerate() {
            let point = if per_point == 0 { last } else { usize::min(i / per_point, last) };
            agent.respawn(spawn_points[point]);
        }
    }

    /// The evolving transition, run once per generation boundary.
    ///
    /// Ranks agents by fitness (stable sort, descending), persists the top
    /// genome when it beats the best ever seen, overwrites every rank
    /// strictly greater than `elitism_count` with a mutated copy of the top
    /// genome, resets all fitness to 0, and Fisher–Yates shuffles the array
    /// so spawn assignment is not fitness-correlated. Ranks `0..=elitism_count`
    /// keep their weights untouched (the strictly-greater cutoff).
    ///
    /// Returns the top fitness observed this generation; 0 when evolution is
    /// disabled or the population is empty.
    ///
    /// # Errors
    ///
    /// An [`io::Error`] from persisting a new best genome.
    pub fn reset<R>(&mut self, rng: &mut R) -> io::Result<f32>
    where
        R: Rng + ?Sized,
    {
        // Stable sort: ties keep their pre-sort order, so ranking is
        // deterministic for a fixed input.
        self.agents
            .sort_by(|a, b| b.fitness().partial_cmp(&a.fitness()).unwrap());

        let top_fitness = if self.config.evolution_enabled
            && let Some((best, rest)) = self.agents.split_first_mut()
        {
            let top = best.fitness();
            if top > self.best_ever {
                self.best_ever = top;
                self.store.save(best.genome())?;
            }
            for (offset, agent) in rest.iter_mut().enumerate() {
                let rank = offset + 1;
                if rank > self.config.elitism_count {
                    agent.genome_mut().overwrite_from(best.genome());
                    agent.genome_mut().mutate(
                        self.config.mutation_rate,
                        self.config.mutation_strength,
                        rng,
                    );
                }
            }
            top
        } else {
            0.0
        };

        for agent in &mut self.agents {
            agent.genome_mut().set_fitness(0.0);
        }

        // Index-based Fisher–Yates, uniform over permutations.
        let mut n = self.agents.len();
        while n > 1 {
            n -= 1;
            let k = rng.random_range(0..=n);
            self.agents.swap(k, n);
        }

        Ok(top_fitness)
    }

    /// Fitness distribution of the current generation, `None` when empty.
    #[must_use]
    pub fn fitness_stats(&self) -> Option<FitnessStats> {
        FitnessStats::new(self.agents.iter().map(Agent::fitness))
    }
}
