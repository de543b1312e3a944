use criterion::{criterion_group, criterion_main, Criterion};

use groundcheck::{GroundCheck, GroundCheckOptions, Memory, VerifyMode};

fn make_verifier_with_memories() -> (GroundCheck, Vec<Memory>) {
    let verifier = GroundCheck::new(GroundCheckOptions::default()).unwrap();

    // Seed memories so verification measures realistic work: profile
    // facts, stack facts, and a deliberate employer conflict.
    let mut memories = vec![
        Memory::with_trust("m0", "User works at Microsoft", 0.9),
        Memory::with_trust("m1", "User lives in Seattle", 0.8),
        Memory::with_trust("m2", "User is named Alice", 0.95),
        Memory::with_trust("m3", "we migrated from MySQL to PostgreSQL", 0.85),
        Memory::with_trust("m4", "User works at Amazon", 0.4),
    ];
    for i in 0..64u32 {
        memories.push(Memory::with_trust(
            format!("s{i}"),
            format!("service {i} is handled by worker pool {i}"),
            0.75,
        ));
    }
    (verifier, memories)
}

fn bench_verify_strict(c: &mut Criterion) {
    let (verifier, memories) = make_verifier_with_memories();
    let draft = "Your name is Alice, you work at Google and live in Seattle. \
                 The database is PostgreSQL.";

    c.bench_function("verify/strict_mixed_draft", |b| {
        b.iter(|| {
            verifier
                .verify(std::hint::black_box(draft), &memories, VerifyMode::Strict)
                .unwrap()
        });
    });
}

fn bench_extract_claims(c: &mut Criterion) {
    let (verifier, _) = make_verifier_with_memories();
    let draft = "frontend is React, backend is FastAPI, and the database is PostgreSQL. \
                 Max retries should be 5. auth is handled by Keycloak.";

    c.bench_function("verify/extract_claims", |b| {
        b.iter(|| verifier.extract_claims(std::hint::black_box(draft)));
    });
}

fn bench_knowledge_extraction(c: &mut Criterion) {
    let (verifier, _) = make_verifier_with_memories();
    let draft = "we ended up going with Postgres after the whole MySQL disaster, \
                 and we are considering migrating from Jenkins to GitHub";

    c.bench_function("verify/knowledge_facts", |b| {
        b.iter(|| verifier.extract_knowledge_facts(std::hint::black_box(draft)));
    });
}

criterion_group!(
    benches,
    bench_verify_strict,
    bench_extract_claims,
    bench_knowledge_extraction
);
criterion_main!(benches);
