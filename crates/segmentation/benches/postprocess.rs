use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use ndarray::{Array2, ArrayD, IxDyn};
use segmentation::{
    InferenceOutput,
    processing::{
        post::{PostProcessor, TransformParams},
        roi_mask::mask_to_roi_mask,
    },
};

/// Create mock network output with N high-confidence detections among R candidates
fn create_mock_output(
    num_candidates: usize,
    num_detections: usize,
    input_size: (usize, usize),
) -> InferenceOutput {
    let (h, w) = input_size;
    let mut label_data = vec![0i64; num_candidates];
    let mut box_data = vec![0.0f32; num_candidates * 4];
    let mut score_data = vec![0.01f32; num_candidates];

    for i in 0..num_detections.min(num_candidates) {
        label_data[i] = (i % 80) as i64;
        box_data[i * 4] = 100.0;
        box_data[i * 4 + 1] = 150.0;
        box_data[i * 4 + 2] = 400.0;
        box_data[i * 4 + 3] = 600.0;
        score_data[i] = 0.9;
    }

    InferenceOutput {
        bboxes: ArrayD::from_shape_vec(IxDyn(&[1, num_candidates, 4]), box_data).unwrap(),
        masks: ArrayD::from_elem(IxDyn(&[1, num_candidates, h, w]), 0.6),
        labels: ArrayD::from_shape_vec(IxDyn(&[1, num_candidates]), label_data).unwrap(),
        scores: ArrayD::from_shape_vec(IxDyn(&[1, num_candidates]), score_data).unwrap(),
    }
}

fn benchmark_postprocessing(c: &mut Criterion) {
    let mut group = c.benchmark_group("postprocessing");
    group.sample_size(20);

    let mut post_processor = PostProcessor::new(0.3);

    // 640x480 frame through the COCO bounds: scale 800 / 480
    let input_size = (800, 1067);
    let transform = TransformParams {
        orig_width: 640,
        orig_height: 480,
        scale: 800.0 / 480.0,
    };

    for num_detections in [0, 5, 20] {
        let output = create_mock_output(20, num_detections, input_size);

        group.bench_with_input(
            BenchmarkId::new("process", num_detections),
            &output,
            |b, output| {
                b.iter(|| {
                    post_processor
                        .process(black_box(output), black_box(&transform))
                        .unwrap()
                });
            },
        );
    }

    group.finish();
}

fn benchmark_roi_crop(c: &mut Criterion) {
    let mut group = c.benchmark_group("roi_crop");

    let masks = vec![Array2::from_elem((480, 640), 200u8); 20];
    let bboxes = vec![[60, 90, 240, 360]; 20];

    group.bench_function("mask_to_roi_mask_20", |b| {
        b.iter(|| mask_to_roi_mask(black_box(&masks), black_box(&bboxes)));
    });

    group.finish();
}

criterion_group!(benches, benchmark_postprocessing, benchmark_roi_crop);
criterion_main!(benches);
