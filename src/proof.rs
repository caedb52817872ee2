use std::io::{Cursor, ErrorKind, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::hashtree::combine;

/// Deepest tree a proof can describe; the leaf index is a `u64`.
pub const MAX_TREE_DEPTH: u32 = u64::BITS;

/// Membership proof for one leaf, detached from the tree that issued it.
///
/// `path[0]` is the leaf hash, and each following element is the sibling hash met while ascending
/// toward the root. The bits of `leaf_index`, least significant first, tell whether the running hash
/// is the left (0) or right (1) operand at each level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InclusionProof {
  #[serde(with = "hex_path")]
  path: Vec<Vec<u8>>,
  tree_depth: u32,
  leaf_index: u64,
}

impl InclusionProof {
  pub fn new(path: Vec<Vec<u8>>, leaf_index: u64, tree_depth: u32) -> Self {
    InclusionProof { path, tree_depth, leaf_index }
  }

  pub fn path(&self) -> &[Vec<u8>] {
    &self.path
  }

  pub fn leaf_index(&self) -> u64 {
    self.leaf_index
  }

  pub fn tree_depth(&self) -> u32 {
    self.tree_depth
  }

  /// Structural checks that must hold before the path is worth hashing.
  pub fn is_well_formed(&self) -> bool {
    !self.path.is_empty()
      && self.tree_depth <= MAX_TREE_DEPTH
      && self.path.len() as u64 == self.tree_depth as u64 + 1
      && self.leaf_index.checked_shr(self.tree_depth).is_none_or(|rest| rest == 0)
  }

  /// Check that `leaf_hash` is committed to by `root`.
  ///
  /// Malformed proofs are answered with `false`; proofs are untrusted input.
  pub fn verify<H>(&self, root: &[u8], leaf_hash: &[u8], hash: H) -> bool
  where
    H: Fn(&[u8]) -> Vec<u8>,
  {
    if !self.is_well_formed() {
      return false;
    }
    let Some((first, siblings)) = self.path.split_first() else {
      return false;
    };
    if first.as_slice() != leaf_hash {
      return false;
    }

    let mut current = first.clone();
    let mut direction = self.leaf_index;
    for sibling in siblings {
      current = if direction & 1 == 0 { combine(&hash, &current, sibling) } else { combine(&hash, sibling, &current) };
      direction >>= 1;
    }
    current == root
  }

  /// Like [`verify`](Self::verify) for a tree built from raw data: `data` is hashed first.
  pub fn verify_data<H>(&self, root: &[u8], data: &[u8], hash: H) -> bool
  where
    H: Fn(&[u8]) -> Vec<u8>,
  {
    let leaf_hash = hash(data);
    self.verify(root, &leaf_hash, hash)
  }

  pub fn to_json(&self) -> Result<String> {
    Ok(serde_json::to_string(self)?)
  }

  pub fn to_json_pretty(&self) -> Result<String> {
    Ok(serde_json::to_string_pretty(self)?)
  }

  pub fn from_json(json: &str) -> Result<Self> {
    Ok(serde_json::from_str(json)?)
  }

  /// Compact little-endian form:
  /// `tree_depth: u32 | leaf_index: u64 | count: u32 | (len: u32 | bytes)*count`
  pub fn write<W: Write>(&self, w: &mut W) -> Result<usize> {
    w.write_u32::<LittleEndian>(self.tree_depth)?;
    w.write_u64::<LittleEndian>(self.leaf_index)?;
    w.write_u32::<LittleEndian>(length(self.path.len())?)?;
    let mut size = 4 + 8 + 4;
    for hash in self.path.iter() {
      w.write_u32::<LittleEndian>(length(hash.len())?)?;
      w.write_all(hash)?;
      size += 4 + hash.len();
    }
    Ok(size)
  }

  pub fn read<R: Read>(r: &mut R) -> Result<Self> {
    let tree_depth = r.read_u32::<LittleEndian>().map_err(truncated)?;
    let leaf_index = r.read_u64::<LittleEndian>().map_err(truncated)?;
    let count = r.read_u32::<LittleEndian>().map_err(truncated)?;
    if count > MAX_TREE_DEPTH + 1 {
      return Err(Error::InvalidEncoding(format!("path of {count} hashes is longer than any tree")));
    }

    let mut path = Vec::with_capacity(count as usize);
    for _ in 0..count {
      let len = r.read_u32::<LittleEndian>().map_err(truncated)? as u64;
      let mut hash = Vec::new();
      r.by_ref().take(len).read_to_end(&mut hash)?;
      if hash.len() as u64 != len {
        return Err(Error::InvalidEncoding(format!("expected {len} hash bytes, found {}", hash.len())));
      }
      path.push(hash);
    }
    Ok(InclusionProof { path, tree_depth, leaf_index })
  }

  pub fn to_bytes(&self) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    self.write(&mut buffer)?;
    Ok(buffer)
  }

  pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
    let mut cursor = Cursor::new(bytes);
    let proof = Self::read(&mut cursor)?;
    let consumed = cursor.position() as usize;
    if consumed != bytes.len() {
      return Err(Error::InvalidEncoding(format!("{} trailing bytes", bytes.len() - consumed)));
    }
    Ok(proof)
  }
}

fn length(len: usize) -> Result<u32> {
  u32::try_from(len).map_err(|_| Error::InvalidEncoding(format!("length {len} does not fit in u32")))
}

fn truncated(err: std::io::Error) -> Error {
  match err.kind() {
    ErrorKind::UnexpectedEof => Error::InvalidEncoding("truncated proof".to_string()),
    _ => err.into(),
  }
}

/// Path hashes as an array of lowercase hex strings.
mod hex_path {
  use serde::de::Error as _;
  use serde::{Deserialize, Deserializer, Serializer};

  pub fn serialize<S>(path: &[Vec<u8>], s: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    s.collect_seq(path.iter().map(hex::encode))
  }

  pub fn deserialize<'de, D>(d: D) -> Result<Vec<Vec<u8>>, D::Error>
  where
    D: Deserializer<'de>,
  {
    let path = Vec::<String>::deserialize(d)?;
    path.iter().map(|h| hex::decode(h).map_err(D::Error::custom)).collect()
  }
}
