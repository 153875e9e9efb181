use std::{fs, path::PathBuf};

use anyhow::Context as _;
use dojo_brain::{Seed, Topology};
use dojo_evolution::{
    ArenaRotation, EvolutionConfig, FileGenomeStore, Population, RewardWeights, Scheduler,
};
use rand::Rng as _;
use serde::{Deserialize, Serialize};

use crate::arena::{self, Arena, TICK_DT};

const TEAMS: [&str; 2] = ["east", "west"];

/// On-disk training configuration. Every field is optional; omitted
/// sections fall back to the built-in defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct TrainConfig {
    evolution: EvolutionConfig,
    rewards: RewardWeights,
    hidden_layers: Vec<usize>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            evolution: EvolutionConfig::default(),
            rewards: RewardWeights::default(),
            hidden_layers: vec![16, 12],
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Number of generations to run
    #[arg(long, default_value_t = 50)]
    generations: u32,
    /// 32-hex-digit seed for a reproducible run (random if omitted)
    #[arg(long)]
    seed: Option<Seed>,
    /// JSON training configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory for persisted best genomes
    #[arg(long, default_value = "models")]
    output: PathBuf,
    /// Resume from genomes previously persisted in the output directory
    #[arg(long)]
    load: bool,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let config = match &arg.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config from {}", path.display()))?;
            serde_json::from_str::<TrainConfig>(&text)
                .with_context(|| format!("failed to parse config from {}", path.display()))?
        }
        None => TrainConfig::default(),
    };
    let mut evolution = config.evolution;
    if arg.load {
        evolution.load_from_disk = true;
    }

    let seed = arg.seed.unwrap_or_else(|| rand::rng().random());
    eprintln!("Seed: {seed}");
    let mut rng = seed.rng();

    let mut layer_sizes = vec![arena::INPUT_LEN];
    layer_sizes.extend(&config.hidden_layers);
    layer_sizes.push(arena::OUTPUT_LEN);
    let topology = Topology::new(layer_sizes).context("invalid network topology")?;

    let mut populations = TEAMS
        .iter()
        .map(|team| {
            let store = FileGenomeStore::new(arg.output.join(format!("best_{team}.genome")));
            Population::new(
                *team,
                evolution.clone(),
                config.rewards.clone(),
                topology.clone(),
                None,
                Box::new(store),
                &mut rng,
            )
        })
        .collect::<Result<Vec<_>, _>>()
        .context("failed to build populations")?;

    let rotation = ArenaRotation::new(arena::layouts()).context("no arena layouts")?;
    let mut scheduler = Scheduler::new(rotation, evolution.generation_duration);
    scheduler.start(&mut populations);
    let mut dojo = Arena::new(&populations);

    for _ in 0..arg.generations {
        dojo.begin_generation(&populations);
        while !scheduler.generation_over(&populations) {
            dojo.step(&mut populations, TICK_DT)
                .context("network evaluation failed")?;
            scheduler.tick(TICK_DT);
        }

        let generation = scheduler.generation();
        let alive: Vec<_> = populations.iter().map(Population::alive_count).collect();
        let stats: Vec<_> = populations.iter().map(Population::fitness_stats).collect();
        let tops = scheduler
            .end_generation(&mut populations, &mut rng)
            .context("failed to finish generation")?;

        let report = populations
            .iter()
            .enumerate()
            .map(|(index, population)| {
                format!(
                    "{}: best {:.2} alive {}/{}",
                    population.name(),
                    tops[index],
                    alive[index],
                    population.len(),
                )
            })
            .collect::<Vec<_>>()
            .join(" | ");
        eprintln!("[Gen {generation}] {report}");
        for (population, stats) in populations.iter().zip(&stats) {
            if let Some(stats) = stats {
                eprintln!(
                    "  {}: min {:.2} mean {:.2} median {:.2} max {:.2} sd {:.2}",
                    population.name(),
                    stats.min,
                    stats.mean,
                    stats.median,
                    stats.max,
                    stats.std_dev,
                );
            }
        }
    }

    eprintln!("Training complete.");
    for (team, population) in TEAMS.iter().zip(&populations) {
        eprintln!(
            "  {}: best ever {:.2} -> {}",
            population.name(),
            population.best_ever(),
            arg.output.join(format!("best_{team}.genome")).display(),
        );
    }
    Ok(())
}
