use canvas_raster::{BufferInfo, Canvas, ColorMode, CompositeOperation, Paint, PaintStyle, PointD, RectI, Rgba8};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const W: u32 = 512;
const H: u32 = 512;

fn render(canvas: &mut Canvas, data: &mut [u8]) {
    let mut dst = BufferInfo::new(data, W, H, (W * 4) as usize, ColorMode::Argb8888).unwrap();
    canvas.on_draw(&mut dst, RectI::new(0, 0, W as i32 - 1, H as i32 - 1));
}

fn scene(paint: &Paint, count: usize) -> Canvas {
    let mut canvas = Canvas::new(W, H);
    for i in 0..count {
        let c = PointD::new(40.0 + (i * 37 % 430) as f64, 40.0 + (i * 53 % 430) as f64);
        canvas.draw_circle(c, 30.0, paint);
    }
    canvas
}

fn bench_solid_fill(c: &mut Criterion) {
    let mut paint = Paint::new();
    paint.set_fill_style(Rgba8::new(30, 120, 200, 200));
    let mut canvas = scene(&paint, 64);
    let mut data = vec![0u8; (W * H * 4) as usize];
    c.bench_function("fill_solid_circles", |b| {
        b.iter(|| {
            render(&mut canvas, &mut data);
            black_box(&data);
        })
    });
}

fn bench_gradient_fill(c: &mut Criterion) {
    let mut paint = Paint::new();
    paint.set_style(PaintStyle::Gradient);
    paint.create_radial_gradient(200.0, 200.0, 0.0, 256.0, 256.0, 300.0);
    paint.add_color_stop(0.0, Rgba8::RED);
    paint.add_color_stop(0.5, Rgba8::GREEN);
    paint.add_color_stop(1.0, Rgba8::BLUE);
    let mut canvas = scene(&paint, 64);
    let mut data = vec![0u8; (W * H * 4) as usize];
    c.bench_function("fill_radial_gradient_circles", |b| {
        b.iter(|| {
            render(&mut canvas, &mut data);
            black_box(&data);
        })
    });
}

fn bench_stroke(c: &mut Criterion) {
    let mut paint = Paint::new();
    paint.set_stroke_style(Rgba8::BLACK);
    paint.set_stroke_width(3.0);
    paint.set_line_dash(&[8.0, 4.0]);
    let mut canvas = scene(&paint, 64);
    let mut data = vec![0u8; (W * H * 4) as usize];
    c.bench_function("stroke_dashed_circles", |b| {
        b.iter(|| {
            render(&mut canvas, &mut data);
            black_box(&data);
        })
    });
}

fn bench_blend(c: &mut Criterion) {
    let mut paint = Paint::new();
    paint.set_fill_style(Rgba8::new(200, 40, 40, 255));
    let mut canvas = scene(&paint, 32);
    let mut target = Paint::new();
    target.set_fill_style(Rgba8::new(40, 40, 200, 180));
    target.set_global_composite_operation(CompositeOperation::Xor);
    canvas.draw_rect(PointD::new(100.0, 100.0), 300.0, 300.0, &target);
    let mut data = vec![0u8; (W * H * 4) as usize];
    c.bench_function("blend_xor_rect", |b| {
        b.iter(|| {
            render(&mut canvas, &mut data);
            black_box(&data);
        })
    });
}

criterion_group!(
    rasterize_benches,
    bench_solid_fill,
    bench_gradient_fill,
    bench_stroke,
    bench_blend
);
criterion_main!(rasterize_benches);
