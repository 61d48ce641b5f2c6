use criterion::{black_box, criterion_group, criterion_main, Criterion};

use balcao_authz::ModuleKey;

/// Normalization runs on every capability check, so it sits on the hot path
/// of every permission-gated render.
fn bench_normalize(c: &mut Criterion) {
    c.bench_function("normalize/alias_hit", |b| {
        b.iter(|| ModuleKey::normalize(black_box("ponto-de-venda")))
    });

    c.bench_function("normalize/fallback_transform", |b| {
        b.iter(|| ModuleKey::normalize(black_box("contas-pagar")))
    });

    c.bench_function("normalize/already_normalized", |b| {
        b.iter(|| ModuleKey::normalize(black_box("contas_pagar")))
    });
}

criterion_group!(benches, bench_normalize);
criterion_main!(benches);
