//! The genome: weights, biases, feedforward evaluation, and mutation.
//!
//! Weight matrices are stored as one flat row-major buffer per layer
//! transition (`layer_sizes[i] * layer_sizes[i + 1]` entries, row = source
//! neuron), so element offsets derive purely from the topology and no shape
//! information is re-computed per access. Activation buffers are allocated
//! once and reused across [`Network::feed_forward`] calls.

use rand::Rng;

use crate::{ShapeMismatchError, Topology};

/// Negative-side slope of the hidden-layer activation.
const LEAKY_RELU_SLOPE: f32 = 0.01;

/// Output neurons below this index are movement axes (tanh); the rest are
/// action triggers (sigmoid).
const MOVEMENT_NEURONS: usize = 2;

/// A feedforward network plus the scalar fitness that selection acts on.
///
/// Cloning deep-copies topology, weights, biases, and fitness; clones never
/// alias the source genome.
#[derive(Debug, Clone)]
pub struct Network {
    topology: Topology,
    fitness: f32,
    /// One flat row-major matrix per transition.
    weights: Vec<Vec<f32>>,
    /// One vector per non-input layer.
    biases: Vec<Vec<f32>>,
    /// Transient per-layer buffers, overwritten by every evaluation.
    activations: Vec<Vec<f32>>,
}

impl Network {
    /// Creates a network with every weight and bias drawn independently from
    /// a uniform distribution over `[-0.5, 0.5]`. Fitness starts at 0.
    pub fn random<R>(topology: Topology, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let sizes = topology.layer_sizes();
        let weights = sizes
            .windows(2)
            .map(|pair| (0..pair[0] * pair[1]).map(|_| rng.random_range(-0.5..=0.5)).collect())
            .collect();
        let biases = sizes
            .windows(2)
            .map(|pair| (0..pair[1]).map(|_| rng.random_range(-0.5..=0.5)).collect())
            .collect();
        Self::assemble(topology, weights, biases, 0.0)
    }

    /// Builds a network from explicit parameter buffers.
    ///
    /// # Panics
    ///
    /// Panics if any buffer length disagrees with the topology.
    #[must_use]
    pub fn from_parts(
        topology: Topology,
        weights: Vec<Vec<f32>>,
        biases: Vec<Vec<f32>>,
        fitness: f32,
    ) -> Self {
        let sizes = topology.layer_sizes();
        assert_eq!(weights.len(), topology.transition_count());
        assert_eq!(biases.len(), topology.transition_count());
        for (i, pair) in sizes.windows(2).enumerate() {
            assert_eq!(weights[i].len(), pair[0] * pair[1]);
            assert_eq!(biases[i].len(), pair[1]);
        }
        Self::assemble(topology, weights, biases, fitness)
    }

    fn assemble(
        topology: Topology,
        weights: Vec<Vec<f32>>,
        biases: Vec<Vec<f32>>,
        fitness: f32,
    ) -> Self {
        let activations = topology
            .layer_sizes()
            .iter()
            .map(|&width| vec![0.0; width])
            .collect();
        Self {
            topology,
            fitness,
            weights,
            biases,
            activations,
        }
    }

    #[must_use]
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    #[must_use]
    pub fn fitness(&self) -> f32 {
        self.fitness
    }

    pub fn set_fitness(&mut self, fitness: f32) {
        self.fitness = fitness;
    }

    pub fn add_fitness(&mut self, delta: f32) {
        self.fitness += delta;
    }

    /// Flat row-major weight matrices, one per transition.
    #[must_use]
    pub fn weights(&self) -> &[Vec<f32>] {
        &self.weights
    }

    /// Bias vectors, one per non-input layer.
    #[must_use]
    pub fn biases(&self) -> &[Vec<f32>] {
        &self.biases
    }

    /// Propagates `inputs` through the network and returns the output layer.
    ///
    /// Hidden layers apply leaky ReLU; on the output layer, neurons 0 and 1
    /// apply tanh (signed movement axes) and neurons 2+ apply the logistic
    /// sigmoid (independent action triggers). The returned slice borrows a
    /// buffer owned by the network and is overwritten by the next call.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeMismatchError`] unless `inputs.len()` equals the input
    /// width exactly. Inputs are never truncated or padded.
    pub fn feed_forward(&mut self, inputs: &[f32]) -> Result<&[f32], ShapeMismatchError> {
        let sizes = self.topology.layer_sizes();
        if inputs.len() != sizes[0] {
            return Err(ShapeMismatchError {
                expected: sizes[0],
                actual: inputs.len(),
            });
        }
        self.activations[0].copy_from_slice(inputs);

        let layer_count = sizes.len();
        for layer in 1..layer_count {
            let transition = layer - 1;
            let weights = &self.weights[transition];
            let biases = &self.biases[transition];
            let (done, todo) = self.activations.split_at_mut(layer);
            let src = &done[transition];
            let dst = &mut todo[0];

            let dst_len = sizes[layer];
            let is_output = layer == layer_count - 1;
            for (j, out) in dst.iter_mut().enumerate() {
                let mut value = biases[j];
                for (k, &activation) in src.iter().enumerate() {
                    value += weights[k * dst_len + j] * activation;
                }
                *out = if is_output {
                    if j < MOVEMENT_NEURONS {
                        value.tanh()
                    } else {
                        1.0 / (1.0 + (-value).exp())
                    }
                } else if value >= 0.0 {
                    value
                } else {
                    value * LEAKY_RELU_SLOPE
                };
            }
        }
        Ok(&self.activations[layer_count - 1])
    }

    /// Perturbs each weight and bias independently: with probability `rate`,
    /// adds a uniform random value in `[-magnitude, magnitude]`.
    ///
    /// This is the sole source of genetic variation; there is no crossover
    /// between genomes.
    pub fn mutate<R>(&mut self, rate: f32, magnitude: f32, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        for buffer in self.weights.iter_mut().chain(self.biases.iter_mut()) {
            for param in buffer {
                if rng.random::<f32>() < rate {
                    *param += rng.random_range(-magnitude..=magnitude);
                }
            }
        }
    }

    /// Copies all weights and biases from `source` and resets fitness to 0.
    ///
    /// Turns this genome into a mutation candidate derived from `source`
    /// without reallocating any buffer.
    ///
    /// # Panics
    ///
    /// Panics if the topologies differ; populations hold one fixed topology.
    pub fn overwrite_from(&mut self, source: &Self) {
        assert_eq!(
            self.topology, source.topology,
            "cannot overwrite a genome from a different topology"
        );
        for (dst, src) in self.weights.iter_mut().zip(&source.weights) {
            dst.copy_from_slice(src);
        }
        for (dst, src) in self.biases.iter_mut().zip(&source.biases) {
            dst.copy_from_slice(src);
        }
        self.fitness = 0.0;
    }
}
