//! Durable storage for a population's best genome.
//!
//! Written at most once per generation, serially, from the evolving
//! transition. Absence and decode failure both surface as "no prior genome
//! available" on load; callers substitute fresh random genomes, never a
//! partially decoded one.

use std::{
    io,
    path::{Path, PathBuf},
};

use dojo_brain::Network;

pub trait GenomeStore {
    /// Persists `genome`, replacing any previous snapshot.
    fn save(&mut self, genome: &Network) -> io::Result<()>;

    /// Retrieves the persisted genome, or `None` when there is nothing
    /// usable (missing, unreadable, or corrupt).
    fn load(&mut self) -> Option<Network>;
}

/// Stores the genome as one binary file.
#[derive(Debug, Clone)]
pub struct FileGenomeStore {
    path: PathBuf,
}

impl FileGenomeStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GenomeStore for FileGenomeStore {
    fn save(&mut self, genome: &Network) -> io::Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        genome.save(&self.path)
    }

    fn load(&mut self) -> Option<Network> {
        Network::load(&self.path).ok()
    }
}

/// Discards saves and never loads; used when persistence is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullGenomeStore;

impl GenomeStore for NullGenomeStore {
    fn save(&mut self, _genome: &Network) -> io::Result<()> {
        Ok(())
    }

    fn load(&mut self) -> Option<Network> {
        None
    }
}
