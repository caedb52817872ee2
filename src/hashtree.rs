use crate::proof::InclusionProof;

pub mod binary;
pub mod render;

/// Node position inside a tree's node arena.
pub type Position = usize;

/// How the leaves handed to a tree are interpreted.
///
/// A tree is built in exactly one mode and `prove` looks leaves up in that same mode: raw data for
/// [`LeafMode::Raw`], leaf hashes for [`LeafMode::Prehashed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeafMode {
  /// Leaves are opaque data; the tree hashes each one to obtain the leaf hash.
  #[default]
  Raw,
  /// Leaves are already hashes and are used unchanged.
  Prehashed,
}

/// Core hash tree abstraction
pub trait HashTree {
  type Error;

  /// Get the number of leaf nodes
  fn size(&self) -> u64;

  /// Number of folding rounds between the leaves and the root
  fn depth(&self) -> u32;

  /// Get the root hash
  fn root_hash(&self) -> &[u8];

  /// Retrieve the leaf hash at the given 0-based position
  fn get(&self, index: u64) -> Option<&[u8]>;

  /// Generate an inclusion proof for the given leaf identity
  fn prove(&self, leaf: &[u8]) -> Result<InclusionProof, Self::Error>;
}

/// BLAKE3 with its default 32-byte output.
pub fn blake3_hash(data: &[u8]) -> Vec<u8> {
  blake3::hash(data).as_bytes().to_vec()
}

/// Returns the input unchanged. Useful only to make tree shapes readable in tests and demos.
pub fn identity_hash(data: &[u8]) -> Vec<u8> {
  data.to_vec()
}

/// `H(left ++ right)` with no separator between the two hashes.
pub(crate) fn combine<H>(hash: &H, left: &[u8], right: &[u8]) -> Vec<u8>
where
  H: Fn(&[u8]) -> Vec<u8> + ?Sized,
{
  let mut buffer = Vec::with_capacity(left.len() + right.len());
  buffer.extend_from_slice(left);
  buffer.extend_from_slice(right);
  hash(&buffer)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn combine_concatenates_without_separator() {
    assert_eq!(b"abcd".to_vec(), combine(&identity_hash, b"ab", b"cd"));
    assert_eq!(blake3_hash(b"leftright"), combine(&blake3_hash, b"left", b"right"));
  }

  #[test]
  fn blake3_digest_is_32_bytes() {
    assert_eq!(blake3::OUT_LEN, blake3_hash(b"").len());
    assert_eq!(blake3::hash(b"hello").as_bytes().as_slice(), blake3_hash(b"hello").as_slice());
  }
}
