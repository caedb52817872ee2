use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
  /// A tree needs at least one leaf.
  #[error("cannot build a hash tree from an empty leaf set")]
  EmptyLeafSet,

  #[error("leaf not found in hash tree")]
  LeafNotFound,

  #[error("leaf #{index} duplicates leaf #{previous}")]
  DuplicateLeaf { index: u64, previous: u64 },

  #[error("invalid proof encoding: {0}")]
  InvalidEncoding(String),

  #[error(transparent)]
  Json(#[from] serde_json::Error),

  #[error(transparent)]
  Hex(#[from] hex::FromHexError),

  #[error(transparent)]
  Io(#[from] std::io::Error),
}
