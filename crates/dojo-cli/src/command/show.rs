use std::path::PathBuf;

use anyhow::Context as _;
use dojo_brain::Network;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ShowArg {
    /// Genome file to inspect
    #[arg(long)]
    input: PathBuf,
}

pub(crate) fn run(arg: &ShowArg) -> anyhow::Result<()> {
    let network = Network::load(&arg.input)
        .with_context(|| format!("failed to load genome from {}", arg.input.display()))?;
    println!("Layers:     {:?}", network.topology().layer_sizes());
    println!("Parameters: {}", network.topology().parameter_count());
    println!("Fitness:    {:.3}", network.fitness());
    Ok(())
}
