use dojo_brain::{Network, ShapeMismatchError};

/// One genome plus its live simulation context.
///
/// The agent exclusively owns its [`Network`]; "best genome" snapshots are
/// deep-copied into other agents, never aliased. Everything environment
/// specific (sensing, actuation) lives behind [`AgentIo`], not here.
#[derive(Debug, Clone)]
pub struct Agent {
    genome: Network,
    position: [f32; 2],
    alive: bool,
}

impl Agent {
    #[must_use]
    pub fn new(genome: Network) -> Self {
        Self {
            genome,
            position: [0.0, 0.0],
            alive: true,
        }
    }

    #[must_use]
    pub fn genome(&self) -> &Network {
        &self.genome
    }

    pub fn genome_mut(&mut self) -> &mut Network {
        &mut self.genome
    }

    #[must_use]
    pub fn fitness(&self) -> f32 {
        self.genome.fitness()
    }

    pub fn add_fitness(&mut self, delta: f32) {
        self.genome.add_fitness(delta);
    }

    /// Evaluates the genome on the current sensed inputs.
    ///
    /// # Errors
    ///
    /// Propagates [`ShapeMismatchError`] when the input length does not match
    /// the genome's input layer.
    pub fn think(&mut self, inputs: &[f32]) -> Result<&[f32], ShapeMismatchError> {
        self.genome.feed_forward(inputs)
    }

    #[must_use]
    pub fn position(&self) -> [f32; 2] {
        self.position
    }

    pub fn set_position(&mut self, position: [f32; 2]) {
        self.position = position;
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn kill(&mut self) {
        self.alive = false;
    }

    /// Places the agent at a spawn position and marks it alive. Fitness is
    /// generation state and is reset by the population, not here.
    pub fn respawn(&mut self, position: [f32; 2]) {
        self.position = position;
        self.alive = true;
    }
}

/// Sensor/actuator adapter for an environment.
///
/// A single agent abstraction parameterized by its adapters replaces a
/// hierarchy of concrete bot variants: the environment decides what an agent
/// senses and how its outputs act on the world, while the evolution loop
/// stays variant-free.
pub trait AgentIo {
    /// Fills `inputs` with the agent's current sensed values. The buffer is
    /// cleared by the caller; its final length must match the genome's input
    /// layer.
    fn collect_inputs(&mut self, agent: &Agent, inputs: &mut Vec<f32>);

    /// Applies one evaluation's outputs (2 movement axes, then action
    /// logits) back to the world.
    fn apply_outputs(&mut self, agent: &mut Agent, outputs: &[f32]);
}
