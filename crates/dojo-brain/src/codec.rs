//! Exact binary (de)serialization of genomes.
//!
//! Little-endian, no padding:
//!
//! ```text
//! f32        fitness
//! i32        layer count (N)
//! i32 * N    layer sizes
//! per transition i:  f32 * sizes[i] * sizes[i+1]   weights (row = source)
//! per transition i:  f32 * sizes[i+1]              biases
//! ```
//!
//! The total size is fully determined by the layer sizes
//! ([`Topology::encoded_len`]), and decoding checks the complete required
//! length before reading any parameter: a genome is either fully valid or
//! not produced at all.

use std::{fs, io, path::Path};

use crate::{CorruptDataError, InvalidTopologyError, Network, Topology};

/// Fitness plus layer count.
const HEADER_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum DecodeError {
    #[display("genome topology is invalid")]
    InvalidTopology(InvalidTopologyError),
    #[display("genome data is corrupt")]
    Corrupt(CorruptDataError),
}

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum LoadError {
    #[display("failed to read genome file")]
    Io(io::Error),
    #[display("failed to decode genome file")]
    Decode(DecodeError),
}

impl Network {
    /// Serializes this genome into the binary format.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let topology = self.topology();
        let sizes = topology.layer_sizes();
        let mut buf = Vec::with_capacity(topology.encoded_len());

        buf.extend_from_slice(&self.fitness().to_le_bytes());
        // Widths are validated <= i32::MAX at topology construction.
        let layer_count = i32::try_from(sizes.len()).unwrap();
        buf.extend_from_slice(&layer_count.to_le_bytes());
        for &width in sizes {
            buf.extend_from_slice(&i32::try_from(width).unwrap().to_le_bytes());
        }
        for matrix in self.weights() {
            for weight in matrix {
                buf.extend_from_slice(&weight.to_le_bytes());
            }
        }
        for vector in self.biases() {
            for bias in vector {
                buf.extend_from_slice(&bias.to_le_bytes());
            }
        }
        debug_assert_eq!(buf.len(), topology.encoded_len());
        buf
    }

    /// Decodes a genome from the binary format.
    ///
    /// # Errors
    ///
    /// [`DecodeError::Corrupt`] if the buffer is shorter than its declared
    /// topology requires, declares negative counts, or declares a topology
    /// whose byte length overflows `usize`;
    /// [`DecodeError::InvalidTopology`] if the declared layer sizes cannot
    /// describe a network.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.len() < HEADER_LEN {
            return Err(CorruptDataError::Truncated {
                needed: HEADER_LEN,
                actual: bytes.len(),
            }
            .into());
        }
        let fitness = read_f32(bytes, 0);
        let raw_layer_count = read_i32(bytes, 4);
        let layer_count = usize::try_from(raw_layer_count).map_err(|_| {
            CorruptDataError::NegativeField {
                field: "layer count",
                value: raw_layer_count,
            }
        })?;

        let sizes_end = HEADER_LEN + 4 * layer_count;
        if bytes.len() < sizes_end {
            return Err(CorruptDataError::Truncated {
                needed: sizes_end,
                actual: bytes.len(),
            }
            .into());
        }
        let mut layer_sizes = Vec::with_capacity(layer_count);
        for i in 0..layer_count {
            let raw = read_i32(bytes, HEADER_LEN + 4 * i);
            let width = usize::try_from(raw).map_err(|_| CorruptDataError::NegativeField {
                field: "layer width",
                value: raw,
            })?;
            layer_sizes.push(width);
        }
        let topology = Topology::new(layer_sizes)?;

        let needed = topology
            .checked_encoded_len()
            .ok_or(CorruptDataError::Oversized)?;
        if bytes.len() < needed {
            return Err(CorruptDataError::Truncated {
                needed,
                actual: bytes.len(),
            }
            .into());
        }

        let sizes = topology.layer_sizes().to_vec();
        let mut offset = sizes_end;
        let weights = sizes
            .windows(2)
            .map(|pair| read_f32_block(bytes, &mut offset, pair[0] * pair[1]))
            .collect();
        let biases = sizes
            .windows(2)
            .map(|pair| read_f32_block(bytes, &mut offset, pair[1]))
            .collect();
        Ok(Self::from_parts(topology, weights, biases, fitness))
    }

    /// Writes the serialized genome to `path`, replacing any existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> io::Result<()> {
        fs::write(path, self.to_bytes())
    }

    /// Reads and decodes a genome file.
    ///
    /// # Errors
    ///
    /// [`LoadError::Io`] when the file cannot be read (including a missing
    /// file; callers treat that as "no prior genome available"), or
    /// [`LoadError::Decode`] when the contents do not decode.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let bytes = fs::read(path)?;
        Ok(Self::from_bytes(&bytes)?)
    }
}

fn read_f32(bytes: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
}

fn read_i32(bytes: &[u8], offset: usize) -> i32 {
    i32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
}

/// Reads `count` consecutive `f32`s, advancing `offset`. Bounds were
/// validated against the topology's full encoded length beforehand.
fn read_f32_block(bytes: &[u8], offset: &mut usize, count: usize) -> Vec<f32> {
    let mut values = Vec::with_capacity(count);
    for _ in 0..count {
        values.push(read_f32(bytes, *offset));
        *offset += 4;
    }
    values
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64Mcg;

    use super::*;

    #[test]
    fn test_round_trip_is_bit_exact() {
        let topology = Topology::new(vec![7, 4, 3, 6]).unwrap();
        let mut net = Network::random(topology, &mut Pcg64Mcg::seed_from_u64(42));
        net.set_fitness(-17.25);

        let decoded = Network::from_bytes(&net.to_bytes()).unwrap();
        assert_eq!(decoded.fitness(), -17.25);
        assert_eq!(decoded.topology(), net.topology());
        assert_eq!(decoded.weights(), net.weights());
        assert_eq!(decoded.biases(), net.biases());
        // Re-encoding must reproduce the exact bytes.
        assert_eq!(decoded.to_bytes(), net.to_bytes());
    }

    #[test]
    fn test_known_genome_layout() {
        let topology = Topology::new(vec![2, 2]).unwrap();
        let net = Network::from_parts(
            topology,
            vec![vec![0.5, -0.5, 0.25, 0.25]],
            vec![vec![0.0, 0.0]],
            3.5,
        );

        let bytes = net.to_bytes();
        assert_eq!(bytes.len(), 40);
        assert_eq!(&bytes[..4], &3.5_f32.to_le_bytes());
        assert_eq!(&bytes[4..8], &2_i32.to_le_bytes());
        assert_eq!(&bytes[8..12], &2_i32.to_le_bytes());
        assert_eq!(&bytes[12..16], &2_i32.to_le_bytes());
        assert_eq!(&bytes[16..20], &0.5_f32.to_le_bytes());

        let decoded = Network::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.fitness(), 3.5);
        assert_eq!(decoded.weights(), &[vec![0.5, -0.5, 0.25, 0.25]]);
        assert_eq!(decoded.biases(), &[vec![0.0, 0.0]]);
    }

    #[test]
    fn test_truncated_buffer_is_rejected() {
        // Declares [4, 4] but carries no parameters at all.
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0.0_f32.to_le_bytes());
        bytes.extend_from_slice(&2_i32.to_le_bytes());
        bytes.extend_from_slice(&4_i32.to_le_bytes());
        bytes.extend_from_slice(&4_i32.to_le_bytes());

        let err = Network::from_bytes(&bytes).unwrap_err();
        let needed = Topology::new(vec![4, 4]).unwrap().encoded_len();
        assert_eq!(
            err,
            DecodeError::Corrupt(CorruptDataError::Truncated {
                needed,
                actual: bytes.len()
            })
        );
    }

    #[test]
    fn test_partially_missing_parameters_are_rejected() {
        let topology = Topology::new(vec![4, 4]).unwrap();
        let net = Network::random(topology, &mut Pcg64Mcg::seed_from_u64(7));
        let bytes = net.to_bytes();
        let cut = &bytes[..bytes.len() - 4];
        assert!(matches!(
            Network::from_bytes(cut),
            Err(DecodeError::Corrupt(CorruptDataError::Truncated { .. }))
        ));
    }

    #[test]
    fn test_empty_and_header_only_buffers_are_rejected() {
        assert!(matches!(
            Network::from_bytes(&[]),
            Err(DecodeError::Corrupt(CorruptDataError::Truncated { .. }))
        ));
        assert!(matches!(
            Network::from_bytes(&[0; 7]),
            Err(DecodeError::Corrupt(CorruptDataError::Truncated { .. }))
        ));
    }

    #[test]
    fn test_oversized_declared_widths_are_rejected() {
        // Five i32::MAX widths: the required byte length overflows usize,
        // so the length check must fail cleanly instead of wrapping.
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0.0_f32.to_le_bytes());
        bytes.extend_from_slice(&5_i32.to_le_bytes());
        for _ in 0..5 {
            bytes.extend_from_slice(&i32::MAX.to_le_bytes());
        }
        assert_eq!(
            Network::from_bytes(&bytes).unwrap_err(),
            DecodeError::Corrupt(CorruptDataError::Oversized)
        );
    }

    #[test]
    fn test_invalid_declared_topology_is_rejected() {
        // Declares a zero-width layer.
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0.0_f32.to_le_bytes());
        bytes.extend_from_slice(&2_i32.to_le_bytes());
        bytes.extend_from_slice(&0_i32.to_le_bytes());
        bytes.extend_from_slice(&3_i32.to_le_bytes());
        assert_eq!(
            Network::from_bytes(&bytes).unwrap_err(),
            DecodeError::InvalidTopology(InvalidTopologyError::ZeroWidthLayer { index: 0 })
        );
    }

    #[test]
    fn test_negative_layer_count_is_rejected() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0.0_f32.to_le_bytes());
        bytes.extend_from_slice(&(-1_i32).to_le_bytes());
        assert_eq!(
            Network::from_bytes(&bytes).unwrap_err(),
            DecodeError::Corrupt(CorruptDataError::NegativeField {
                field: "layer count",
                value: -1
            })
        );
    }

    #[test]
    fn test_file_round_trip() {
        let path = std::env::temp_dir().join(format!("dojo-brain-codec-{}.genome", std::process::id()));
        let topology = Topology::new(vec![3, 5, 6]).unwrap();
        let mut net = Network::random(topology, &mut Pcg64Mcg::seed_from_u64(99));
        net.set_fitness(8.0);

        net.save(&path).unwrap();
        let loaded = Network::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded.fitness(), 8.0);
        assert_eq!(loaded.weights(), net.weights());
        assert_eq!(loaded.biases(), net.biases());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = Network::load("/nonexistent/dojo-genome").unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }
}
