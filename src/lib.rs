//! Binary hash trees over an ordered leaf set, with detachable inclusion proofs.
//!
//! ```
//! use hashproof::{BinaryHashTree, HashTree, blake3_hash};
//!
//! let tree = BinaryHashTree::from_data(&["a", "b", "c"], blake3_hash)?;
//! let proof = tree.prove(b"c")?;
//! assert!(proof.verify_data(tree.root_hash(), b"c", blake3_hash));
//! # Ok::<(), hashproof::Error>(())
//! ```

pub mod error;
pub mod hashtree;
pub mod proof;

pub use error::{Error, Result};
pub use hashtree::binary::BinaryHashTree;
pub use hashtree::{HashTree, LeafMode, blake3_hash, identity_hash};
pub use proof::InclusionProof;
