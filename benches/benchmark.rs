use criterion::{criterion_group, criterion_main, Criterion};
use mceliece_hy::traits::{Decrypt, Encrypt, KeyGen, SerDes};
use mceliece_hy::{mce_10_50, mce_11_32, mce_12_41};
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;


pub fn criterion_benchmark(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    let (pk_10, sk_10) = mce_10_50::KG::try_keygen_with_rng(&mut rng).unwrap();
    let pt_10 = mce_10_50::Plaintext::try_from_bytes(vec![0x5a; mce_10_50::PT_LEN]).unwrap();
    let ct_10 = pk_10.try_encrypt(&pt_10).unwrap();

    let (pk_11, sk_11) = mce_11_32::KG::try_keygen_with_rng(&mut rng).unwrap();
    let pt_11 = mce_11_32::Plaintext::try_from_bytes(vec![0x5a; mce_11_32::PT_LEN]).unwrap();
    let ct_11 = pk_11.try_encrypt(&pt_11).unwrap();

    let (pk_12, sk_12) = mce_12_41::KG::try_keygen_with_rng(&mut rng).unwrap();
    let pt_12 = mce_12_41::Plaintext::try_from_bytes(vec![0x5a; mce_12_41::PT_LEN]).unwrap();
    let ct_12 = pk_12.try_encrypt(&pt_12).unwrap();

    c.bench_function("mce_10_50 KeyGen", |b| {
        b.iter(|| mce_10_50::KG::try_keygen_with_rng(&mut rng))
    });
    c.bench_function("mce_11_32 KeyGen", |b| {
        b.iter(|| mce_11_32::KG::try_keygen_with_rng(&mut rng))
    });
    c.bench_function("mce_12_41 KeyGen", |b| {
        b.iter(|| mce_12_41::KG::try_keygen_with_rng(&mut rng))
    });

    c.bench_function("mce_10_50 Encrypt", |b| b.iter(|| pk_10.try_encrypt(&pt_10)));
    c.bench_function("mce_11_32 Encrypt", |b| b.iter(|| pk_11.try_encrypt(&pt_11)));
    c.bench_function("mce_12_41 Encrypt", |b| b.iter(|| pk_12.try_encrypt(&pt_12)));

    c.bench_function("mce_10_50 Decrypt", |b| b.iter(|| sk_10.try_decrypt(&ct_10)));
    c.bench_function("mce_11_32 Decrypt", |b| b.iter(|| sk_11.try_decrypt(&ct_11)));
    c.bench_function("mce_12_41 Decrypt", |b| b.iter(|| sk_12.try_decrypt(&ct_12)));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
