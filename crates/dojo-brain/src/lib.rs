//! Fixed-structure feedforward networks evolved by mutation.
//!
//! A [`Network`] is a genome: an immutable [`Topology`], one weight matrix
//! per layer transition, one bias vector per non-input layer, and a scalar
//! fitness accumulated by the surrounding training loop. The crate provides
//! feedforward evaluation, the uniform-perturbation mutation operator, and
//! an exact binary codec for genome persistence.
//!
//! There is no backpropagation and no configurable activation graph: hidden
//! layers are always leaky ReLU, and the output layer splits into two tanh
//! movement neurons followed by sigmoid action neurons.

pub use self::{
    codec::{DecodeError, LoadError},
    network::Network,
    seed::Seed,
    topology::Topology,
};

pub mod codec;
pub mod network;
pub mod seed;
pub mod topology;

/// A layer-size sequence that cannot describe a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum InvalidTopologyError {
    #[display("topology must have at least 2 layers, got {layer_count}")]
    TooFewLayers { layer_count: usize },
    #[display("layer {index} has zero width")]
    ZeroWidthLayer { index: usize },
    #[display("layer {index} width {width} exceeds the encodable range")]
    OversizedLayer { index: usize, width: usize },
}

/// Feedforward was called with the wrong number of inputs.
///
/// This is a programmer error at the call site, never coerced by truncating
/// or padding the input vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("expected {expected} network inputs, got {actual}")]
pub struct ShapeMismatchError {
    pub expected: usize,
    pub actual: usize,
}

/// A serialized genome that cannot be decoded.
///
/// Decoding validates the full required length up front, so a corrupt buffer
/// never yields a partially filled network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum CorruptDataError {
    #[display("genome buffer too short: need {needed} bytes, got {actual}")]
    Truncated { needed: usize, actual: usize },
    #[display("genome declares a negative {field}: {value}")]
    NegativeField { field: &'static str, value: i32 },
    #[display("genome declares more parameters than can be addressed")]
    Oversized,
}
