use crate::hashtree::Position;
use crate::hashtree::binary::{BinaryHashTree, NodeKind};

const BRANCH: &str = "├─ ";
const LAST: &str = "└─ ";
const VERTICAL: &str = "│  ";
const BLANK: &str = "   ";

/// Lazily renders a tree as a box-drawing diagram, one node per line with its hash in lowercase hex.
///
/// ```text
/// └─ 61626363
///    ├─ 6162
///    │  ├─ 61
///    │  └─ 62
///    └─ 6363
///       ├─ 63
///       └─ 63
/// ```
pub struct Lines<'a> {
  tree: &'a BinaryHashTree,
  // (node, indentation inherited from ancestors, whether the node is a left child)
  stack: Vec<(Position, String, bool)>,
}

impl<'a> Lines<'a> {
  pub(crate) fn new(tree: &'a BinaryHashTree, root: Position) -> Self {
    Lines { tree, stack: vec![(root, String::new(), false)] }
  }
}

impl Iterator for Lines<'_> {
  type Item = String;

  fn next(&mut self) -> Option<String> {
    let (position, indent, is_left) = self.stack.pop()?;
    let node = self.tree.node(position)?;
    let line = format!("{indent}{}{}", if is_left { BRANCH } else { LAST }, hex::encode(&node.hash));
    if let NodeKind::Branch { left, right } = node.kind {
      let indent = format!("{indent}{}", if is_left { VERTICAL } else { BLANK });
      self.stack.push((right, indent.clone(), false));
      self.stack.push((left, indent, true));
    }
    Some(line)
  }
}
