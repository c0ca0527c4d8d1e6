//! Benchmarks GrayBit-7 encoding and decoding.
use brunch::Bench;

use grayedit_canvas::codec;
use grayedit_canvas::{PixelBuffer, Rgba};

struct Roundtrip {
    sz: u32,
    mask: bool,
}

impl Roundtrip {
    const fn new(sz: u32, mask: bool) -> Self {
        Roundtrip { sz, mask }
    }

    fn image(&self) -> PixelBuffer {
        PixelBuffer::from_fn(self.sz, self.sz, |x, y| {
            Rgba::new(x as u8, y as u8, 7, (x + y) as u8)
        })
    }
}

fn main() {
    let tests = [
        Roundtrip::new(128, false),
        Roundtrip::new(1024, false),
        Roundtrip::new(1024, true),
    ];

    let mut benches = brunch::Benches::default();
    for test in tests {
        let image = test.image();
        let file = codec::encode(&image, test.mask).expect("fits the header");

        benches.push(
            Bench::new(format!("grayedit::codec::encode({}, mask: {})", test.sz, test.mask))
                .run(|| codec::encode(&image, test.mask)),
        );
        benches.push(
            Bench::new(format!("grayedit::codec::decode({}, mask: {})", test.sz, test.mask))
                .run(|| codec::decode(&file)),
        );
    }
    benches.finish();
}
