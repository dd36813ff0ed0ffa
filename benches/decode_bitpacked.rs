use criterion::{criterion_group, criterion_main, Criterion};

use parquetry::encoding::bitpacked;

fn add_benchmark(c: &mut Criterion) {
    (10..=20).step_by(2).for_each(|log2_size| {
        let size = 2usize.pow(log2_size);
        let num_bits = 3;

        let values: Vec<u32> = (0..size).map(|x| (x % 8) as u32).collect();
        let mut packed = vec![0u8; (size * num_bits + 7) / 8 + 256];
        bitpacked::encode(&values, num_bits, &mut packed);

        c.bench_function(&format!("bitpacked 2^{}", log2_size), |b| {
            b.iter(|| {
                bitpacked::Decoder::<u32>::new(&packed, num_bits, size).collect::<Vec<_>>()
            })
        });
    });
}

criterion_group!(benches, add_benchmark);
criterion_main!(benches);
