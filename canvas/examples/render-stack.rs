use grayedit_canvas::composite::composite;
use grayedit_canvas::{codec, BlendMode, EditorConfig, LayerStack, PixelBuffer, Position, Rgba};

const SZ: u32 = 256;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A soft disc fading out towards the edge, its transparency gets a checkerboard.
    let disc = PixelBuffer::from_fn(SZ, SZ, |x, y| {
        let (dx, dy) = (x as f32 - 128., y as f32 - 128.);
        let dist = (dx * dx + dy * dy).sqrt() / 128.;
        let alpha = (255. * (1. - dist)).clamp(0., 255.) as u8;
        Rgba::gray((x / 2 + 64) as u8, alpha)
    });

    // Round-trip through the 7-bit format first, as if the user had opened a GrayBit-7 file.
    let file = codec::encode_auto(&disc)?;
    let decoded = codec::decode(&file)?;

    let config = EditorConfig {
        max_layers: 3,
        ..EditorConfig::default()
    };
    let mut stack = LayerStack::new(decoded.buffer, &config);

    let warm = stack.add_layer()?;
    stack.fill_color(warm, Rgba::opaque(255, 160, 64))?;
    stack.set_blend_mode(warm, BlendMode::Multiply)?;
    stack.set_opacity(warm, 60)?;

    let stripe = stack.add_layer()?;
    let bar = PixelBuffer::filled(64, 8, Rgba::new(20, 20, 120, 200));
    stack.load_image(stripe, bar, Some("stripe"))?;
    stack.set_blend_mode(stripe, BlendMode::Screen)?;
    stack.set_position(stripe, Position { x: 0, y: 40 })?;

    let out = composite(&stack, 320, 256);

    let image = image::RgbaImage::from_raw(out.width(), out.height(), out.into_vec())
        .ok_or("buffer does not match its dimensions")?;

    let output = concat!(env!("CARGO_MANIFEST_DIR"), "/../render-stack.png");
    image.save(output)?;

    Ok(())
}
