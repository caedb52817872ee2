use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt::{self, Display};

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::hashtree::render::Lines;
use crate::hashtree::{HashTree, LeafMode, Position, combine};
use crate::proof::InclusionProof;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
  Leaf,
  Branch { left: Position, right: Position },
}

/// Node representation in the hash tree
///
/// A branch whose right child is the same position as its left child is the padding produced when
/// a folding round has odd length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
  pub hash: Vec<u8>,
  pub kind: NodeKind,
}

impl Node {
  pub fn new_leaf(hash: Vec<u8>) -> Self {
    Node { hash, kind: NodeKind::Leaf }
  }

  pub fn new_internal(hash: Vec<u8>, left: Position, right: Position) -> Self {
    Node { hash, kind: NodeKind::Branch { left, right } }
  }

  pub fn is_leaf(&self) -> bool {
    match self.kind {
      NodeKind::Leaf => true,
      NodeKind::Branch { .. } => false,
    }
  }
}

/// Immutable binary hash tree built by pairwise folding of an ordered leaf list.
///
/// Nodes are kept in an arena: positions `0..size` hold the leaves in input order, followed by the
/// branches of each folding round, with the root last.
#[derive(Debug, Clone)]
pub struct BinaryHashTree {
  nodes: Vec<Node>,
  root: Position,
  depth: u32,
  mode: LeafMode,
  leaves: HashMap<Vec<u8>, u64>,
}

impl BinaryHashTree {
  /// Build a tree whose leaves are raw data, each hashed with `hash`.
  pub fn from_data<L, H>(leaves: &[L], hash: H) -> Result<Self>
  where
    L: AsRef<[u8]>,
    H: Fn(&[u8]) -> Vec<u8>,
  {
    Self::new(leaves, LeafMode::Raw, hash)
  }

  /// Build a tree from precomputed leaf hashes, used unchanged.
  pub fn from_hashes<L, H>(leaves: &[L], hash: H) -> Result<Self>
  where
    L: AsRef<[u8]>,
    H: Fn(&[u8]) -> Vec<u8>,
  {
    Self::new(leaves, LeafMode::Prehashed, hash)
  }

  /// Build a tree from a non-empty leaf sequence.
  ///
  /// When a round has odd length the last node is paired with itself. Fails with
  /// [`Error::EmptyLeafSet`] before doing any work if `leaves` is empty, and with
  /// [`Error::DuplicateLeaf`] if two leaves share the same identity.
  pub fn new<L, H>(leaves: &[L], mode: LeafMode, hash: H) -> Result<Self>
  where
    L: AsRef<[u8]>,
    H: Fn(&[u8]) -> Vec<u8>,
  {
    if leaves.is_empty() {
      return Err(Error::EmptyLeafSet);
    }

    let mut nodes = Vec::with_capacity(2 * leaves.len());
    let mut index = HashMap::with_capacity(leaves.len());
    for (i, leaf) in leaves.iter().enumerate() {
      let leaf = leaf.as_ref();
      match index.entry(leaf.to_vec()) {
        Entry::Occupied(e) => return Err(Error::DuplicateLeaf { index: i as u64, previous: *e.get() }),
        Entry::Vacant(e) => {
          e.insert(i as u64);
        }
      }
      let leaf_hash = match mode {
        LeafMode::Raw => hash(leaf),
        LeafMode::Prehashed => leaf.to_vec(),
      };
      nodes.push(Node::new_leaf(leaf_hash));
    }

    let mut level = (0..leaves.len()).collect::<Vec<Position>>();
    let mut depth = 0;
    while level.len() > 1 {
      let mut next = Vec::with_capacity(level.len().div_ceil(2));
      for pair in level.chunks(2) {
        let left = pair[0];
        let right = pair.get(1).copied().unwrap_or(left);
        let branch_hash = combine(&hash, &nodes[left].hash, &nodes[right].hash);
        next.push(nodes.len());
        nodes.push(Node::new_internal(branch_hash, left, right));
      }
      trace!(round = depth + 1, width = level.len(), padded = level.len() % 2 == 1, "folded level");
      level = next;
      depth += 1;
    }

    let root = level[0];
    debug!(leaves = leaves.len(), depth, ?mode, "built binary hash tree");
    Ok(BinaryHashTree { nodes, root, depth, mode, leaves: index })
  }

  pub fn mode(&self) -> LeafMode {
    self.mode
  }

  pub fn root(&self) -> &Node {
    &self.nodes[self.root]
  }

  pub fn node(&self, position: Position) -> Option<&Node> {
    self.nodes.get(position)
  }

  /// 0-based input position of a leaf identity (raw data or leaf hash, depending on the mode).
  pub fn position_of(&self, leaf: &[u8]) -> Option<u64> {
    self.leaves.get(leaf).copied()
  }

  /// Generate the inclusion proof of the leaf at the given input position.
  pub fn prove_at(&self, index: u64) -> Result<InclusionProof> {
    let target = self.get(index).ok_or(Error::LeafNotFound)?;
    let path = self.collect_path(self.root, target).ok_or(Error::LeafNotFound)?;
    debug!(leaf_index = index, depth = self.depth, "generated inclusion proof");
    Ok(InclusionProof::new(path, index, self.depth))
  }

  /// Render the tree as one line per node, depth first, left before right.
  pub fn lines(&self) -> Lines<'_> {
    Lines::new(self, self.root)
  }

  /// Search for the first leaf, left subtree first, whose hash equals `target` and return the
  /// leaf hash followed by every sibling hash met on the way back up.
  fn collect_path(&self, position: Position, target: &[u8]) -> Option<Vec<Vec<u8>>> {
    let node = &self.nodes[position];
    match node.kind {
      NodeKind::Leaf => (node.hash == target).then(|| vec![node.hash.clone()]),
      NodeKind::Branch { left, right } => {
        if let Some(mut path) = self.collect_path(left, target) {
          path.push(self.nodes[right].hash.clone());
          Some(path)
        } else if let Some(mut path) = self.collect_path(right, target) {
          path.push(self.nodes[left].hash.clone());
          Some(path)
        } else {
          None
        }
      }
    }
  }
}

impl HashTree for BinaryHashTree {
  type Error = Error;

  fn size(&self) -> u64 {
    self.leaves.len() as u64
  }

  fn depth(&self) -> u32 {
    self.depth
  }

  fn root_hash(&self) -> &[u8] {
    &self.root().hash
  }

  fn get(&self, index: u64) -> Option<&[u8]> {
    if index < self.size() { Some(&self.nodes[index as usize].hash) } else { None }
  }

  fn prove(&self, leaf: &[u8]) -> Result<InclusionProof> {
    let index = self.position_of(leaf).ok_or(Error::LeafNotFound)?;
    self.prove_at(index)
  }
}

impl Display for BinaryHashTree {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for line in self.lines() {
      writeln!(f, "{line}")?;
    }
    Ok(())
  }
}
