//! # Market Network Benchmarks
//!
//! Costs paid inline on every untrusted payload:
//!
//! | Path | Operation |
//! |------|-----------|
//! | Identity | GUID binding + proof-of-work check |
//! | Signed payloads | Ed25519 verification |
//! | Messaging | Ephemeral-box seal and open |
//! | Contracts | Canonical serialization + content hash |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use market_network::test_utils::{fixture_identity, sample_contract, sample_listing};
use market_network::{verify_identity, verify_signature, ContentHash, Contract};
use shared_crypto::{open, seal};
use std::time::Duration;

// ============================================================================
// Identity and signatures
// ============================================================================

fn bench_identity_verification(c: &mut Criterion) {
    let mut group = c.benchmark_group("identity");
    group.measurement_time(Duration::from_secs(5));

    let identity = fixture_identity(0);
    let signed_pubkey = identity.signed_pubkey().clone();
    let guid = identity.guid();
    group.bench_function("verify_identity", |b| {
        b.iter(|| black_box(verify_identity(&signed_pubkey, &guid)))
    });

    let message = vec![0x5a; 512];
    let signature = identity.sign(&message);
    let verify_key = signed_pubkey.verify_key().to_vec();
    group.bench_function("verify_signature_512b", |b| {
        b.iter(|| black_box(verify_signature(&verify_key, &message, &signature).is_ok()))
    });

    group.finish();
}

// ============================================================================
// Ephemeral box
// ============================================================================

fn bench_sealed_box(c: &mut Criterion) {
    let mut group = c.benchmark_group("sealed_box");
    let recipient = fixture_identity(1);
    let recipient_key = recipient.encryption_public_key();

    for size in [140usize, 1500, 16 * 1024] {
        let plaintext = vec![0x42; size];
        let sealed = seal(&recipient_key, &plaintext).unwrap();

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("seal", size), &plaintext, |b, plaintext| {
            b.iter(|| black_box(seal(&recipient_key, plaintext).unwrap()))
        });
        group.bench_with_input(BenchmarkId::new("open", size), &sealed, |b, sealed| {
            b.iter(|| {
                black_box(
                    open(
                        recipient.encryption_keys(),
                        &sealed.ephemeral_public_key,
                        &sealed.ciphertext,
                    )
                    .unwrap(),
                )
            })
        });
    }

    group.finish();
}

// ============================================================================
// Contracts
// ============================================================================

fn bench_contract_hashing(c: &mut Criterion) {
    let mut group = c.benchmark_group("contract");
    let vendor = fixture_identity(0);
    let buyer = fixture_identity(1);
    let moderators = [fixture_identity(2), fixture_identity(3)];
    let moderator_refs: Vec<_> = moderators.iter().collect();

    let contract = sample_contract(&vendor, &buyer, &moderator_refs);
    group.bench_function("order_id", |b| {
        b.iter(|| black_box(contract.order_id().unwrap()))
    });

    let images: Vec<ContentHash> = (0..8u8).map(|i| ContentHash::of(&[i])).collect();
    let offer = Contract::signed_offer(sample_listing(&vendor, &moderator_refs, &images), &vendor)
        .unwrap();
    group.bench_function("canonical_bytes_and_hash", |b| {
        b.iter(|| black_box(ContentHash::of(&offer.to_canonical_bytes().unwrap())))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_identity_verification,
    bench_sealed_box,
    bench_contract_hashing
);
criterion_main!(benches);
