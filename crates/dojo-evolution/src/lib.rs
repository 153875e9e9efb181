//! Generational evolution over populations of [`dojo_brain`] networks.
//!
//! Each agent carries one genome and accumulates a scalar fitness from
//! environment-driven reward events. At every generation boundary the
//! population is ranked, the top genomes survive unchanged (elitism), and
//! every other slot is overwritten in place with a mutated copy of the best
//! genome. No crossover, no gradient anywhere: mutation is the only search
//! operator.
//!
//! # Pieces
//!
//! - [`Population`] owns a fixed array of [`Agent`]s and runs the evolving
//!   transition: stable ranking, best-genome persistence, elitism-guarded
//!   overwrite-and-mutate, Fisher–Yates reshuffle.
//! - [`RewardBus`] / [`RewardPolicy`] translate typed reward events into
//!   fitness deltas; the event vocabulary is fixed, the valuation
//!   ([`RewardWeights`]) is configuration.
//! - [`Scheduler`] bounds generations with a timer or an "all agents dead"
//!   predicate and cycles arena layouts between generations.
//! - [`GenomeStore`] persists the best genome seen so far; loading failures
//!   degrade to fresh random genomes, never partial state.
//!
//! # Determinism
//!
//! Every randomized step (initialization, mutation, shuffling) draws from a
//! caller-supplied generator, so a fixed [`dojo_brain::Seed`] plus fixed
//! reward and sensor inputs reproduces a run exactly. The simulation model
//! is single-threaded and discrete-tick; mutation and persistence happen
//! only at generation boundaries, strictly after fitness accrual stops.
//!
//! # Example
//!
//! ```
//! use dojo_brain::{Seed, Topology};
//! use dojo_evolution::{
//!     ArenaLayout, ArenaRotation, EvolutionConfig, NullGenomeStore, Population, RewardEvent,
//!     RewardWeights, Scheduler,
//! };
//!
//! let seed = Seed::from_bytes([7; 16]);
//! let mut rng = seed.rng();
//! let config = EvolutionConfig::default();
//! let mut populations = vec![
//!     Population::new(
//!         "east",
//!         config.clone(),
//!         RewardWeights::default(),
//!         Topology::new(vec![4, 8, 6]).unwrap(),
//!         None,
//!         Box::new(NullGenomeStore),
//!         &mut rng,
//!     )
//!     .unwrap(),
//! ];
//!
//! let rotation = ArenaRotation::new(vec![ArenaLayout::new(vec![vec![[0.0, 0.0]]])]).unwrap();
//! let mut scheduler = Scheduler::new(rotation, config.generation_duration);
//! scheduler.start(&mut populations);
//!
//! // One world tick: the environment publishes reward events.
//! populations[0].publish(0, RewardEvent::TimeTick { delta_time: 0.02 });
//! scheduler.tick(0.02);
//! if scheduler.generation_over(&populations) {
//!     let tops = scheduler.end_generation(&mut populations, &mut rng).unwrap();
//!     println!("best fitness: {:?}", tops);
//! }
//! ```

pub use self::{
    agent::{Agent, AgentIo},
    config::{ConfigError, EvolutionConfig, RewardWeights},
    population::Population,
    reward::{RewardBus, RewardEvent, RewardPolicy, RewardSink},
    scheduler::{ArenaLayout, ArenaRotation, Scheduler},
    stats::FitnessStats,
    store::{FileGenomeStore, GenomeStore, NullGenomeStore},
};

pub mod agent;
pub mod config;
pub mod population;
pub mod reward;
pub mod scheduler;
pub mod stats;
pub mod store;
