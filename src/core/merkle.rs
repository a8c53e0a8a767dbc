// src/core/merkle.rs

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::hash::{hash_pair, sha256_hex, Digest};

/// Errors raised by misuse of the commitment engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MerkleError {
    /// A tree was requested over zero leaves.
    #[error("Cannot build a Merkle tree from an empty list of leaves")]
    EmptyInput,

    /// A proof was requested for a leaf that is not in the tree.
    #[error("Leaf index {index} out of range for tree with {leaf_count} leaves")]
    IndexOutOfRange {
        /// The requested leaf index.
        index: usize,
        /// Number of leaves in the tree.
        leaf_count: usize,
    },
}

/// Side of the path value on which a proof sibling sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProofPosition {
    /// Sibling is on the left: the parent is `hash(sibling ‖ current)`.
    Left,
    /// Sibling is on the right: the parent is `hash(current ‖ sibling)`.
    Right,
}

/// One level of an inclusion proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofStep {
    /// Digest of the sibling node at this level.
    pub sibling: Digest,
    /// Where the sibling sits relative to the path value.
    pub position: ProofPosition,
}

/// Sibling path from a leaf up to, but not including, the root.
pub type Proof = Vec<ProofStep>;

/// Merkle tree over an ordered list of canonical leaf strings.
///
/// Every level is retained so proofs can be produced without rehashing.
/// Level 0 holds the hashed leaves; the last level holds only the root.
/// Odd-sized levels pair their last node with itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTree {
    levels: Vec<Vec<Digest>>,
}

impl MerkleTree {
    /// Builds a tree from the given leaves, in order.
    ///
    /// # Errors
    ///
    /// Returns `MerkleError::EmptyInput` if `leaves` is empty.
    pub fn new<S: AsRef<str>>(leaves: &[S]) -> Result<Self, MerkleError> {
        if leaves.is_empty() {
            return Err(MerkleError::EmptyInput);
        }

        let mut current_level: Vec<Digest> = leaves
            .iter()
            .map(|leaf| sha256_hex(leaf.as_ref().as_bytes()))
            .collect();
        let mut levels = Vec::new();

        while current_level.len() > 1 {
            let next_level: Vec<Digest> = current_level
                .chunks(2)
                .map(|pair| match pair {
                    [left, right] => hash_pair(left, right),
                    // For odd number of nodes, duplicate the last one
                    [last] => hash_pair(last, last),
                    _ => unreachable!("chunks(2) yields one or two nodes"),
                })
                .collect();
            levels.push(current_level);
            current_level = next_level;
        }
        levels.push(current_level);

        Ok(Self { levels })
    }

    /// Gets the root hash of the Merkle tree.
    pub fn root_hash(&self) -> &str {
        // `new` guarantees at least one level holding exactly one digest.
        &self.levels[self.levels.len() - 1][0]
    }

    /// Number of leaves committed by this tree.
    pub fn leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    /// All levels, from hashed leaves (index 0) up to the root.
    pub fn levels(&self) -> &[Vec<Digest>] {
        &self.levels
    }

    /// Generates the inclusion proof for the leaf at `index`.
    ///
    /// # Errors
    ///
    /// Returns `MerkleError::IndexOutOfRange` if `index >= leaf_count()`.
    pub fn generate_proof(&self, index: usize) -> Result<Proof, MerkleError> {
        let leaf_count = self.leaf_count();
        if index >= leaf_count {
            return Err(MerkleError::IndexOutOfRange { index, leaf_count });
        }

        let mut proof = Vec::with_capacity(self.levels.len() - 1);
        let mut current_index = index;

        // The root level contributes no step.
        for level in &self.levels[..self.levels.len() - 1] {
            let is_left_node = current_index % 2 == 0;
            let sibling_index = if is_left_node {
                current_index + 1
            } else {
                current_index - 1
            };
            // Last node on an odd level is paired with itself
            let sibling = level
                .get(sibling_index)
                .unwrap_or(&level[current_index])
                .clone();

            proof.push(ProofStep {
                sibling,
                position: if is_left_node {
                    ProofPosition::Right
                } else {
                    ProofPosition::Left
                },
            });
            current_index /= 2;
        }

        Ok(proof)
    }

    /// Verifies that `leaf` is committed under `root_hash` by `proof`.
    ///
    /// Never fails: a mismatching leaf, proof or root simply yields `false`.
    pub fn verify_proof(leaf: &str, proof: &[ProofStep], root_hash: &str) -> bool {
        let computed = proof
            .iter()
            .fold(sha256_hex(leaf.as_bytes()), |current, step| match step.position {
                ProofPosition::Right => hash_pair(&current, &step.sibling),
                ProofPosition::Left => hash_pair(&step.sibling, &current),
            });
        computed == root_hash
    }
}

/// Builds a tree from `leaves`. See [`MerkleTree::new`].
pub fn build_tree<S: AsRef<str>>(leaves: &[S]) -> Result<MerkleTree, MerkleError> {
    MerkleTree::new(leaves)
}

/// Builds a tree from `leaves` and returns the proof for `index`.
pub fn generate_proof<S: AsRef<str>>(leaves: &[S], index: usize) -> Result<Proof, MerkleError> {
    if index >= leaves.len() {
        return Err(MerkleError::IndexOutOfRange {
            index,
            leaf_count: leaves.len(),
        });
    }
    MerkleTree::new(leaves)?.generate_proof(index)
}

/// Verifies an inclusion proof. See [`MerkleTree::verify_proof`].
pub fn verify_proof(leaf: &str, proof: &[ProofStep], root_hash: &str) -> bool {
    MerkleTree::verify_proof(leaf, proof, root_hash)
}
