use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use preprocess::{ChannelOrder, CpuPreProcessor, InputSpec};

/// Create raw BGR pixel buffer for benchmarking (gradient pattern)
fn create_test_pixels(width: u32, height: u32) -> Vec<u8> {
    let mut pixels = vec![0u8; (width * height * 3) as usize];
    for y in 0..height {
        for x in 0..width {
            let idx = ((y * width + x) * 3) as usize;
            pixels[idx] = ((x + y) % 256) as u8; // B
            pixels[idx + 1] = (y % 256) as u8; // G
            pixels[idx + 2] = (x % 256) as u8; // R
        }
    }
    pixels
}

fn benchmark_cpu_preprocess(c: &mut Criterion) {
    let mut group = c.benchmark_group("cpu_preprocess");

    let resolutions = [(640, 480), (1280, 720), (1920, 1080)];
    let specs = [
        (
            "coco",
            InputSpec {
                min_size: 800,
                max_size: 1333,
                mean: [123.152, 115.903, 103.063],
            },
        ),
        (
            "sbd",
            InputSpec {
                min_size: 600,
                max_size: 1000,
                mean: [123.152, 115.903, 103.063],
            },
        ),
    ];

    for (name, spec) in specs {
        let mut preprocessor = CpuPreProcessor::new(spec);

        for (width, height) in resolutions.iter() {
            let pixels = create_test_pixels(*width, *height);

            group.bench_with_input(
                BenchmarkId::new(name, format!("{}x{}", width, height)),
                &pixels,
                |b, pixels| {
                    b.iter(|| {
                        preprocessor
                            .preprocess_from_u8_slice(
                                black_box(pixels),
                                black_box(*width),
                                black_box(*height),
                                ChannelOrder::Bgr,
                            )
                            .unwrap()
                    });
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, benchmark_cpu_preprocess);
criterion_main!(benches);
