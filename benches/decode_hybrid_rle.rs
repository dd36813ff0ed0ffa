use criterion::{criterion_group, criterion_main, Criterion};

use parquetry::encoding::hybrid_rle;

fn add_benchmark(c: &mut Criterion) {
    (10..=20).step_by(2).for_each(|log2_size| {
        let size = 2usize.pow(log2_size);
        let num_bits = 2;

        // runs and literal groups interleaved
        let values: Vec<u32> = (0..size)
            .map(|x| if (x / 32) % 2 == 0 { 1 } else { (x % 4) as u32 })
            .collect();
        let mut buffer = vec![];
        hybrid_rle::encode(&mut buffer, &values, num_bits).unwrap();

        c.bench_function(&format!("hybrid_rle 2^{}", log2_size), |b| {
            b.iter(|| {
                hybrid_rle::HybridRleDecoder::try_new(&buffer, num_bits as u32, size)
                    .unwrap()
                    .collect::<Result<Vec<_>, _>>()
                    .unwrap()
            })
        });
    });
}

criterion_group!(benches, add_benchmark);
criterion_main!(benches);
