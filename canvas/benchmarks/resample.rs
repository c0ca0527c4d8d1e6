//! Benchmarks the resampling algorithms and layer compositing.
use brunch::Bench;

use grayedit_canvas::composite::composite;
use grayedit_canvas::resample::resample;
use grayedit_canvas::{Algorithm, BlendMode, EditorConfig, LayerStack, PixelBuffer, Rgba};

struct Resize {
    algorithm: Algorithm,
    from: u32,
    into: u32,
}

impl Resize {
    const fn new(algorithm: Algorithm, from: u32, into: u32) -> Self {
        Resize {
            algorithm,
            from,
            into,
        }
    }

    fn name(&self) -> String {
        format!("resample({:?}, {} -> {})", self.algorithm, self.from, self.into)
    }

    fn prepare(self) -> impl FnMut() -> PixelBuffer {
        let src = gradient(self.from);
        move || resample(&src, self.into, self.into, self.algorithm)
    }
}

fn gradient(sz: u32) -> PixelBuffer {
    PixelBuffer::from_fn(sz, sz, |x, y| Rgba::new(x as u8, y as u8, (x ^ y) as u8, 255))
}

fn stack() -> LayerStack {
    let config = EditorConfig::default();
    let mut stack = LayerStack::new(gradient(256), &config);
    let tint = stack.add_layer().expect("below the layer limit");
    stack.fill_color(tint, Rgba::new(40, 90, 200, 160)).expect("layer exists");
    stack.set_blend_mode(tint, BlendMode::Overlay).expect("layer exists");
    stack
}

fn main() {
    let tests = [
        Resize::new(Algorithm::Nearest, 256, 512),
        Resize::new(Algorithm::Bilinear, 256, 512),
        Resize::new(Algorithm::Bicubic, 256, 512),
        Resize::new(Algorithm::Bilinear, 512, 200),
        Resize::new(Algorithm::Bicubic, 512, 200),
    ];

    let mut benches = brunch::Benches::default();
    benches.extend(tests.map(|resize| {
        Bench::new(format!("grayedit::resample::main::{}", resize.name())).run(resize.prepare())
    }));

    let stack = stack();
    benches.push(
        Bench::new("grayedit::composite::main::overlay(256 -> 640x480)")
            .run(|| composite(&stack, 640, 480)),
    );
    benches.finish();
}
