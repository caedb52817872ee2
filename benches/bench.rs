use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use hashproof::{BinaryHashTree, HashTree, blake3_hash};

fn leaves(n: u64) -> Vec<[u8; 8]> {
  (0..n).map(|i| i.to_le_bytes()).collect()
}

fn bench_build(c: &mut Criterion) {
  let mut group = c.benchmark_group("build");
  for n in [1_000u64, 1_023, 65_536] {
    let data = leaves(n);
    group.bench_with_input(BenchmarkId::from_parameter(n), &data, |b, data| {
      b.iter(|| BinaryHashTree::from_data(data, blake3_hash).unwrap())
    });
  }
  group.finish();
}

fn bench_prove_and_verify(c: &mut Criterion) {
  let data = leaves(65_536);
  let tree = BinaryHashTree::from_data(&data, blake3_hash).unwrap();
  let target = data[data.len() / 3];

  c.bench_function("prove", |b| b.iter(|| tree.prove(&target).unwrap()));

  let proof = tree.prove(&target).unwrap();
  c.bench_function("verify", |b| b.iter(|| assert!(proof.verify_data(tree.root_hash(), &target, blake3_hash))));
}

criterion_group!(benches, bench_build, bench_prove_and_verify);
criterion_main!(benches);
