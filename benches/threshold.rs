use criterion::*;
use ndarray::Array2;

use rjpeg::dji::{ColorBar, MeasurementParams};
use rjpeg::features::{regenerate_for_block, Block, Feature, FeatureKind, PixelBox};
use rjpeg::{threshold, ThermalFrame};

/// A 640x512 frame (the common drone sensor resolution) with a
/// radial hot spot in the middle.
fn synthetic_frame() -> ThermalFrame {
    let (width, height) = (640usize, 512usize);
    let matrix = Array2::from_shape_fn((height, width), |(y, x)| {
        let dx = x as f32 - width as f32 / 2.;
        let dy = y as f32 - height as f32 / 2.;
        20. + 80. * (-(dx * dx + dy * dy) / 10_000.).exp()
    });
    ThermalFrame::from_parts(matrix, MeasurementParams::default(), ColorBar::default())
}

fn pipeline(c: &mut Criterion) {
    let frame = synthetic_frame();

    c.bench_function("hot_pixel_mask", |b| {
        b.iter(|| threshold::hot_pixel_mask(black_box(&frame), 200))
    });

    c.bench_function("regenerate_block", |b| {
        let mut block = Block::new(0, 63);
        for id in 0..64 {
            let x0 = (id % 8) as i64 * 80;
            let y0 = (id / 8) as i64 * 64;
            block.push(Feature::new(
                id,
                FeatureKind::Thresholded,
                PixelBox::new(x0, y0, x0 + 79, y0 + 63),
            ));
        }
        b.iter(|| {
            for feature in block.features.iter_mut() {
                feature.clear_pixels();
            }
            regenerate_for_block(&mut block, &frame, 200, |_, _, _, _| false)
        })
    });
}

criterion_group! {
    name = threshold_benches;
    config = Criterion::default().sample_size(10);
    targets = pipeline
}

criterion_main!(threshold_benches);
