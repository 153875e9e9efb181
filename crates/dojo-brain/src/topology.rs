use crate::InvalidTopologyError;

/// Widest layer the binary genome format can describe (sizes are stored as `i32`).
const MAX_LAYER_WIDTH: usize = i32::MAX as usize;

/// An ordered sequence of layer widths, validated at construction.
///
/// Index 0 is the input width, the last index is the output width. The
/// sequence is immutable once built; every [`Network`](crate::Network) shape
/// is derived from it.
///
/// # Example
///
/// ```
/// use dojo_brain::Topology;
///
/// let topology = Topology::new(vec![3, 5, 6]).unwrap();
/// assert_eq!(topology.input_len(), 3);
/// assert_eq!(topology.output_len(), 6);
/// assert_eq!(topology.transition_count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    layer_sizes: Vec<usize>,
}

impl Topology {
    /// Validates and wraps a layer-size sequence.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTopologyError`] if fewer than 2 layers are given or
    /// any layer width is zero or too wide to encode.
    pub fn new(layer_sizes: Vec<usize>) -> Result<Self, InvalidTopologyError> {
        if layer_sizes.len() < 2 {
            return Err(InvalidTopologyError::TooFewLayers {
                layer_count: layer_sizes.len(),
            });
        }
        for (index, &width) in layer_sizes.iter().enumerate() {
            if width == 0 {
                return Err(InvalidTopologyError::ZeroWidthLayer { index });
            }
            if width > MAX_LAYER_WIDTH {
                return Err(InvalidTopologyError::OversizedLayer { index, width });
            }
        }
        Ok(Self { layer_sizes })
    }

    #[must_use]
    pub fn layer_sizes(&self) -> &[usize] {
        &self.layer_sizes
    }

    #[must_use]
    pub fn input_len(&self) -> usize {
        self.layer_sizes[0]
    }

    #[must_use]
    pub fn output_len(&self) -> usize {
        self.layer_sizes[self.layer_sizes.len() - 1]
    }

    /// Number of layer transitions, i.e. weight matrices / bias vectors.
    #[must_use]
    pub fn transition_count(&self) -> usize {
        self.layer_sizes.len() - 1
    }

    /// Total count of weights and biases across all transitions.
    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.layer_sizes
            .windows(2)
            .map(|pair| pair[0] * pair[1] + pair[1])
            .sum()
    }

    /// Exact byte length of this topology's serialized genome.
    ///
    /// Header (fitness + layer count) plus the layer-size table plus one
    /// `f32` per parameter; the format carries no padding.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        8 + 4 * self.layer_sizes.len() + 4 * self.parameter_count()
    }

    /// [`encoded_len`](Self::encoded_len) with overflow checking.
    ///
    /// Individual widths are bounded at construction, but their products are
    /// not, so a hostile or corrupt layer-size table can overflow `usize`.
    /// Decoding uses this form and treats `None` as corrupt data.
    #[must_use]
    pub fn checked_encoded_len(&self) -> Option<usize> {
        let parameters = self.layer_sizes.windows(2).try_fold(0_usize, |acc, pair| {
            let weights = pair[0].checked_mul(pair[1])?;
            acc.checked_add(weights)?.checked_add(pair[1])
        })?;
        let sizes_table = self.layer_sizes.len().checked_mul(4)?;
        parameters
            .checked_mul(4)?
            .checked_add(sizes_table)?
            .checked_add(8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_too_few_layers() {
        assert_eq!(
            Topology::new(vec![]),
            Err(InvalidTopologyError::TooFewLayers { layer_count: 0 })
        );
        assert_eq!(
            Topology::new(vec![4]),
            Err(InvalidTopologyError::TooFewLayers { layer_count: 1 })
        );
    }

    #[test]
    fn test_rejects_zero_width_layer() {
        assert_eq!(
            Topology::new(vec![4, 0, 6]),
            Err(InvalidTopologyError::ZeroWidthLayer { index: 1 })
        );
    }

    #[test]
    fn test_parameter_count() {
        // 3*5 + 5 + 5*6 + 6 = 66
        let topology = Topology::new(vec![3, 5, 6]).unwrap();
        assert_eq!(topology.parameter_count(), 66);
        assert_eq!(topology.transition_count(), 2);
    }

    #[test]
    fn test_encoded_len() {
        // header 8 + sizes 2*4 + params (2*2 + 2) * 4 = 40
        let topology = Topology::new(vec![2, 2]).unwrap();
        assert_eq!(topology.encoded_len(), 40);
        assert_eq!(topology.checked_encoded_len(), Some(40));
    }

    #[test]
    fn test_checked_encoded_len_detects_overflow() {
        let huge = i32::MAX as usize;
        let topology = Topology::new(vec![huge, huge, huge]).unwrap();
        assert_eq!(topology.checked_encoded_len(), None);
    }
}
