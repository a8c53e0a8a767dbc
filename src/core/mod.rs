// src/core/mod.rs

/// SHA256 digests rendered as lowercase hex, and node combination.
pub mod hash;
/// Versioned canonical encoding of committed figures into leaf strings.
pub mod leaf;
/// Implements Merkle tree construction, root calculation, and proof generation/verification.
pub mod merkle;

pub use hash::{sha256_hex, Digest};
pub use leaf::LeafEncoding;
pub use merkle::{MerkleError, MerkleTree, Proof, ProofPosition, ProofStep};
