use revenue_attest::core::merkle::{build_tree, generate_proof, verify_proof};
use revenue_attest::core::{sha256_hex, MerkleError, MerkleTree, ProofPosition};
use revenue_attest::test_utils::numbered_leaves;

#[test]
fn test_root_is_deterministic() {
    for size in 1..=17 {
        let leaves = numbered_leaves(size);
        let a = build_tree(&leaves).unwrap();
        let b = build_tree(&leaves).unwrap();
        assert_eq!(a.root_hash(), b.root_hash(), "size {}", size);
    }
}

#[test]
fn test_every_index_verifies_across_sizes() {
    for size in 1..=33 {
        let leaves = numbered_leaves(size);
        let tree = MerkleTree::new(&leaves).unwrap();
        for (index, leaf) in leaves.iter().enumerate() {
            let proof = tree.generate_proof(index).unwrap();
            assert!(
                MerkleTree::verify_proof(leaf, &proof, tree.root_hash()),
                "size {} index {}",
                size,
                index
            );
        }
    }
}

#[test]
fn test_proof_against_wrong_root_fails() {
    let leaves = numbered_leaves(7);
    let tree = MerkleTree::new(&leaves).unwrap();
    let other = MerkleTree::new(&numbered_leaves(8)).unwrap();
    let proof = tree.generate_proof(3).unwrap();
    assert!(!verify_proof(&leaves[3], &proof, other.root_hash()));
    assert!(!verify_proof(&leaves[3], &proof, ""));
}

#[test]
fn test_substituted_leaf_fails() {
    let leaves = numbered_leaves(6);
    let tree = MerkleTree::new(&leaves).unwrap();
    for index in 0..leaves.len() {
        let proof = tree.generate_proof(index).unwrap();
        assert!(!verify_proof("forged", &proof, tree.root_hash()));
    }
}

#[test]
fn test_tampered_step_fails() {
    let leaves = numbered_leaves(5);
    let tree = MerkleTree::new(&leaves).unwrap();
    let mut proof = tree.generate_proof(1).unwrap();
    proof[0].position = match proof[0].position {
        ProofPosition::Left => ProofPosition::Right,
        ProofPosition::Right => ProofPosition::Left,
    };
    assert!(!verify_proof(&leaves[1], &proof, tree.root_hash()));
}

#[test]
fn test_changing_any_leaf_changes_root() {
    let leaves = numbered_leaves(9);
    let root = build_tree(&leaves).unwrap().root_hash().to_string();
    for index in 0..leaves.len() {
        let mut altered = leaves.clone();
        altered[index].push('!');
        assert_ne!(build_tree(&altered).unwrap().root_hash(), root, "index {}", index);
    }
}

#[test]
fn test_three_leaf_last_index() {
    let leaves = ["a", "b", "c"];
    let proof = generate_proof(&leaves, 2).unwrap();
    let root = build_tree(&leaves).unwrap().root_hash().to_string();
    assert!(verify_proof("c", &proof, &root));
    // the odd leaf is paired with itself
    assert_eq!(proof[0].sibling, sha256_hex(b"c"));
}

#[test]
fn test_error_cases() {
    let empty: [&str; 0] = [];
    assert_eq!(build_tree(&empty).unwrap_err(), MerkleError::EmptyInput);
    assert_eq!(
        generate_proof(&empty, 0).unwrap_err(),
        MerkleError::IndexOutOfRange {
            index: 0,
            leaf_count: 0
        }
    );
    assert_eq!(
        generate_proof(&["a", "b"], 2).unwrap_err(),
        MerkleError::IndexOutOfRange {
            index: 2,
            leaf_count: 2
        }
    );
}

#[test]
fn test_single_leaf_root_is_leaf_hash() {
    let tree = MerkleTree::new(&["solo"]).unwrap();
    assert_eq!(tree.root_hash(), sha256_hex(b"solo"));
    let proof = tree.generate_proof(0).unwrap();
    assert!(proof.is_empty());
    assert!(verify_proof("solo", &proof, tree.root_hash()));
}
