use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use hashproof::{BinaryHashTree, HashTree, InclusionProof, LeafMode, Result, blake3_hash, identity_hash};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hashproof")]
#[command(author, version, about = "Build binary hash trees and issue or check inclusion proofs")]
struct Args {
  /// Hash function for leaves and node pairs
  #[arg(long, value_enum, default_value_t = Algorithm::Blake3, global = true)]
  hash: Algorithm,

  /// Log level written to stderr; RUST_LOG takes precedence when set
  #[arg(long, default_value = "warn", global = true)]
  log_level: String,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Print the root hash in hex
  Root(TreeArgs),
  /// Print the whole tree
  Show(TreeArgs),
  /// Print the JSON inclusion proof of a leaf
  Prove {
    #[command(flatten)]
    tree: TreeArgs,
    /// Leaf data, or hex leaf hash with --prehashed
    leaf: String,
  },
  /// Check a JSON inclusion proof against a root; exits with 1 when it does not hold
  Verify {
    /// Proof file as written by `prove`
    #[arg(short, long)]
    proof: PathBuf,
    /// Expected root hash in hex
    #[arg(short, long)]
    root: String,
    /// Leaf is given as a hex leaf hash
    #[arg(long)]
    prehashed: bool,
    /// Leaf data, or hex leaf hash with --prehashed
    leaf: String,
  },
}

#[derive(clap::Args)]
struct TreeArgs {
  /// File with one leaf per line, `-` for stdin
  #[arg(short, long, default_value = "-")]
  input: PathBuf,

  /// Lines are hex-encoded leaf hashes instead of raw data
  #[arg(long)]
  prehashed: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Algorithm {
  Blake3,
  /// No hashing; only meaningful for small demonstrations
  Identity,
}

impl Algorithm {
  fn function(self) -> fn(&[u8]) -> Vec<u8> {
    match self {
      Algorithm::Blake3 => blake3_hash,
      Algorithm::Identity => identity_hash,
    }
  }
}

fn main() -> Result<ExitCode> {
  let args = Args::parse();

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
  tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();

  let stdout = io::stdout();
  let holds = run(&args, &mut stdout.lock())?;
  Ok(if holds { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Execute the subcommand; the returned flag is false only for a proof that does not verify.
fn run<W: Write>(args: &Args, out: &mut W) -> Result<bool> {
  let hash = args.hash.function();
  match &args.command {
    Command::Root(tree) => {
      let tree = build(tree, hash)?;
      writeln!(out, "{}", hex::encode(tree.root_hash()))?;
    }
    Command::Show(tree) => {
      let tree = build(tree, hash)?;
      write!(out, "{tree}")?;
    }
    Command::Prove { tree: tree_args, leaf } => {
      let tree = build(tree_args, hash)?;
      let proof = tree.prove(&leaf_bytes(leaf, tree_args.prehashed)?)?;
      writeln!(out, "{}", proof.to_json_pretty()?)?;
    }
    Command::Verify { proof, root, prehashed, leaf } => {
      let proof = InclusionProof::from_json(&fs::read_to_string(proof)?)?;
      let root = hex::decode(root)?;
      let leaf = leaf_bytes(leaf, *prehashed)?;
      let holds = if *prehashed { proof.verify(&root, &leaf, hash) } else { proof.verify_data(&root, &leaf, hash) };
      writeln!(out, "{holds}")?;
      return Ok(holds);
    }
  }
  Ok(true)
}

fn build(args: &TreeArgs, hash: fn(&[u8]) -> Vec<u8>) -> Result<BinaryHashTree> {
  let leaves = read_leaves(&args.input, args.prehashed)?;
  let mode = if args.prehashed { LeafMode::Prehashed } else { LeafMode::Raw };
  BinaryHashTree::new(&leaves, mode, hash)
}

fn read_leaves(input: &Path, prehashed: bool) -> Result<Vec<Vec<u8>>> {
  let text = if input == Path::new("-") { io::read_to_string(io::stdin())? } else { fs::read_to_string(input)? };
  let leaves = text.lines().map(|line| leaf_bytes(line, prehashed)).collect::<Result<Vec<_>>>()?;
  debug!(leaves = leaves.len(), input = %input.display(), "read leaves");
  Ok(leaves)
}

fn leaf_bytes(leaf: &str, prehashed: bool) -> Result<Vec<u8>> {
  if prehashed { Ok(hex::decode(leaf)?) } else { Ok(leaf.as_bytes().to_vec()) }
}

#[cfg(test)]
mod tests {
  use super::*;
  use hashproof::Error;
  use tempfile::NamedTempFile;

  fn leaves_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
  }

  fn exec(argv: &[&str]) -> (Result<bool>, String) {
    let args = Args::try_parse_from(argv).unwrap();
    let mut out = Vec::new();
    let result = run(&args, &mut out);
    (result, String::from_utf8(out).unwrap())
  }

  #[test]
  fn root_with_identity_hash() {
    let file = leaves_file("a\nb\nc\n");
    let path = file.path().to_str().unwrap();
    let (result, out) = exec(&["hashproof", "--hash", "identity", "root", "--input", path]);
    assert!(result.unwrap());
    assert_eq!("61626363\n", out);
  }

  #[test]
  fn show_renders_tree() {
    let file = leaves_file("a\nb\n");
    let path = file.path().to_str().unwrap();
    let (result, out) = exec(&["hashproof", "show", "-i", path, "--hash", "identity"]);
    assert!(result.unwrap());
    assert_eq!("└─ 6162\n   ├─ 61\n   └─ 62\n", out);
  }

  #[test]
  fn prove_then_verify() {
    let file = leaves_file("alpha\nbeta\ngamma\ndelta\nepsilon\n");
    let path = file.path().to_str().unwrap();
    let (_, root) = exec(&["hashproof", "root", "-i", path]);
    let root = root.trim().to_string();
    assert_eq!(hex::encode(blake3_hash(&[])).len(), root.len());

    let (result, json) = exec(&["hashproof", "prove", "-i", path, "epsilon"]);
    assert!(result.unwrap());
    let proof = leaves_file(&json);
    let proof_path = proof.path().to_str().unwrap();

    let (result, out) = exec(&["hashproof", "verify", "--proof", proof_path, "--root", &root, "epsilon"]);
    assert!(result.unwrap());
    assert_eq!("true\n", out);

    let (result, out) = exec(&["hashproof", "verify", "--proof", proof_path, "--root", &root, "delta"]);
    assert!(!result.unwrap());
    assert_eq!("false\n", out);
  }

  #[test]
  fn prehashed_leaves() {
    let hashes = ["a", "b", "c"].map(|d| hex::encode(blake3_hash(d.as_bytes())));
    let file = leaves_file(&hashes.join("\n"));
    let path = file.path().to_str().unwrap();
    let (_, root) = exec(&["hashproof", "root", "-i", path, "--prehashed"]);
    let expected = BinaryHashTree::from_data(&["a", "b", "c"], blake3_hash).unwrap();
    assert_eq!(format!("{}\n", hex::encode(expected.root_hash())), root);

    let (result, json) = exec(&["hashproof", "prove", "-i", path, "--prehashed", &hashes[2]]);
    assert!(result.unwrap());
    let proof = InclusionProof::from_json(&json).unwrap();
    assert_eq!(2, proof.leaf_index());
  }

  #[test]
  fn prove_unknown_leaf_fails() {
    let file = leaves_file("a\nb\nc\n");
    let path = file.path().to_str().unwrap();
    let (result, out) = exec(&["hashproof", "prove", "-i", path, "z"]);
    assert!(matches!(result, Err(Error::LeafNotFound)));
    assert!(out.is_empty());
  }

  #[test]
  fn empty_input_fails() {
    let file = leaves_file("");
    let path = file.path().to_str().unwrap();
    let (result, _) = exec(&["hashproof", "root", "-i", path]);
    assert!(matches!(result, Err(Error::EmptyLeafSet)));
  }

  #[test]
  fn bad_hex_leaf_fails() {
    let file = leaves_file("zz\n");
    let path = file.path().to_str().unwrap();
    let (result, _) = exec(&["hashproof", "root", "-i", path, "--prehashed"]);
    assert!(matches!(result, Err(Error::Hex(_))));
  }
}
