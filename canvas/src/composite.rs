//! Flattening a layer stack into one image.
//!
//! Layers are painted bottom to top into a straight-alpha accumulator of `f64` channels, blend
//! modes follow the separable blend modes of the W3C compositing specification:
//!
//! ```text
//! Cs' = (1 - αb)·Cs + αb·B(Cb, Cs)
//! co  = αs·Cs' + αb·Cb·(1 - αs)
//! αo  = αs + αb·(1 - αs)
//! ```
use std::borrow::Cow;

use grayedit_texel::{PixelBuffer, Rgba};

use crate::config::CheckerConfig;
use crate::layer::{BlendMode, Layer, LayerContent, LayerStack, Position};
use crate::math;
use crate::resample;
use crate::rows::for_each_chunk;

/// An axis-aligned rectangle in output coordinates, possibly outside of the output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

/// Composite for display, with the default checkerboard.
pub fn composite(stack: &LayerStack, width: u32, height: u32) -> PixelBuffer {
    composite_with(stack, width, height, Some(&CheckerConfig::default()))
}

/// Paint all visible layers of `stack` into a new `width`×`height` buffer.
///
/// With a `checker`, image regions whose transparency is shown get a checkerboard background
/// unless a layer beneath them covers the whole output opaquely. Without one, transparency is
/// kept as is, which is what an exported file needs. The stack itself is not modified.
pub fn composite_with(
    stack: &LayerStack,
    width: u32,
    height: u32,
    checker: Option<&CheckerConfig>,
) -> PixelBuffer {
    let mut out = PixelBuffer::new(width, height);
    if out.is_empty() {
        return out;
    }

    let rendered: Vec<&Layer> = stack.paint_order().filter(|layer| layer.is_rendered()).collect();
    log::debug!(
        "compositing {} of {} layers into {}x{}",
        rendered.len(),
        stack.len(),
        width,
        height
    );

    let mut acc = vec![[0.0f64; 4]; out.len()];
    if let Some(checker) = checker {
        paint_checkerboard(&mut acc, &rendered, width, height, checker);
    }

    for layer in &rendered {
        let Some(source) = Source::resolve(layer, width, height) else {
            log::trace!("layer {} resolves to nothing", layer.id());
            continue;
        };

        log::trace!(
            "blending layer {} ({}, {}%)",
            layer.id(),
            layer.blend_mode(),
            layer.opacity()
        );

        let opacity = f64::from(layer.opacity()) / 100.0;
        let mode = layer.blend_mode();
        for_each_chunk(&mut acc, width as usize, |y, row| {
            for (x, dst) in (0u32..).zip(row.iter_mut()) {
                if let Some(pixel) = source.sample(x, y) {
                    blend_pixel(dst, pixel, opacity, mode);
                }
            }
        });
    }

    for (pixel, value) in out.as_texels_mut().iter_mut().zip(&acc) {
        *pixel = Rgba(value.map(|channel| math::round_u8(channel * 255.0)));
    }

    out
}

/// Where an image of the given size is drawn: fitted into the output keeping its aspect ratio,
/// centered, then moved by `position`.
///
/// Returns `None` for an image without pixels.
pub fn placement(
    image_width: u32,
    image_height: u32,
    width: u32,
    height: u32,
    position: Position,
) -> Option<Rect> {
    if image_width == 0 || image_height == 0 {
        return None;
    }

    let (iw, ih) = (f64::from(image_width), f64::from(image_height));
    let (ow, oh) = (f64::from(width), f64::from(height));
    let scale = (ow / iw).min(oh / ih);
    let (sw, sh) = (iw * scale, ih * scale);

    Some(Rect {
        x: math::round_half_up((ow - sw) / 2.0) as i64 + i64::from(position.x),
        y: math::round_half_up((oh - sh) / 2.0) as i64 + i64::from(position.y),
        width: (math::round_half_up(sw) as u32).max(1),
        height: (math::round_half_up(sh) as u32).max(1),
    })
}

/// The blend function `B(Cb, Cs)` on normalized channel values.
pub fn blend_channel(mode: BlendMode, backdrop: f64, source: f64) -> f64 {
    match mode {
        BlendMode::Normal => source,
        BlendMode::Multiply => backdrop * source,
        BlendMode::Screen => screen(backdrop, source),
        BlendMode::Overlay => {
            // Hard light with the operands swapped.
            if backdrop <= 0.5 {
                source * 2.0 * backdrop
            } else {
                screen(source, 2.0 * backdrop - 1.0)
            }
        }
    }
}

fn screen(backdrop: f64, source: f64) -> f64 {
    backdrop + source - backdrop * source
}

fn blend_pixel(dst: &mut [f64; 4], pixel: Rgba, opacity: f64, mode: BlendMode) {
    let alpha_s = f64::from(pixel.a()) / 255.0 * opacity;
    if alpha_s <= 0.0 {
        return;
    }

    let alpha_b = dst[3];
    let alpha_o = alpha_s + alpha_b * (1.0 - alpha_s);
    for (backdrop, &value) in dst[..3].iter_mut().zip(&pixel.0[..3]) {
        let source = f64::from(value) / 255.0;
        let mixed = (1.0 - alpha_b) * source + alpha_b * blend_channel(mode, *backdrop, source);
        let premultiplied = alpha_s * mixed + alpha_b * *backdrop * (1.0 - alpha_s);
        *backdrop = premultiplied / alpha_o;
    }
    dst[3] = alpha_o;
}

/// A layer resolved against the output size.
enum Source<'a> {
    Fill(Rgba),
    Image {
        pixels: Cow<'a, PixelBuffer>,
        rect: Rect,
        opaque: bool,
    },
}

impl<'a> Source<'a> {
    fn resolve(layer: &'a Layer, width: u32, height: u32) -> Option<Self> {
        match layer.content() {
            LayerContent::Empty => None,
            LayerContent::Color(color) => Some(Source::Fill(*color)),
            LayerContent::Image(image) => {
                let rect = image_rect(layer, image, width, height)?;
                let pixels = if (rect.width, rect.height) == (image.width(), image.height()) {
                    Cow::Borrowed(image)
                } else {
                    Cow::Owned(resample::bilinear(image, rect.width, rect.height))
                };

                Some(Source::Image {
                    pixels,
                    rect,
                    opaque: !layer.shows_transparency(),
                })
            }
        }
    }

    fn sample(&self, x: u32, y: u32) -> Option<Rgba> {
        match self {
            Source::Fill(color) => Some(*color),
            Source::Image { pixels, rect, opaque } => {
                let lx = u32::try_from(i64::from(x) - rect.x).ok()?;
                let ly = u32::try_from(i64::from(y) - rect.y).ok()?;
                let pixel = pixels.get(lx, ly)?;
                Some(if *opaque { pixel.with_alpha(0xff) } else { pixel })
            }
        }
    }
}

fn image_rect(layer: &Layer, image: &PixelBuffer, width: u32, height: u32) -> Option<Rect> {
    placement(image.width(), image.height(), width, height, layer.position())
}

/// Whether a layer hides everything beneath it.
fn covers(layer: &Layer, width: u32, height: u32) -> bool {
    if layer.opacity() < 100 {
        return false;
    }

    match layer.content() {
        LayerContent::Empty => false,
        LayerContent::Color(color) => color.is_opaque(),
        LayerContent::Image(image) => {
            if layer.shows_transparency() {
                return false;
            }

            image_rect(layer, image, width, height).is_some_and(|rect| {
                rect.x <= 0
                    && rect.y <= 0
                    && rect.x + i64::from(rect.width) >= i64::from(width)
                    && rect.y + i64::from(rect.height) >= i64::from(height)
            })
        }
    }
}

/// Paint the background of every transparent image region without a covering layer beneath.
///
/// `rendered` is in paint order, bottom first.
fn paint_checkerboard(
    acc: &mut [[f64; 4]],
    rendered: &[&Layer],
    width: u32,
    height: u32,
    checker: &CheckerConfig,
) {
    for (index, layer) in rendered.iter().enumerate() {
        let LayerContent::Image(image) = layer.content() else {
            continue;
        };

        if !layer.shows_transparency()
            || rendered[..index].iter().any(|below| covers(below, width, height))
        {
            continue;
        }

        let Some(rect) = image_rect(layer, image, width, height) else {
            continue;
        };

        let x0 = rect.x.clamp(0, i64::from(width));
        let x1 = (rect.x + i64::from(rect.width)).clamp(0, i64::from(width));
        let y0 = rect.y.clamp(0, i64::from(height));
        let y1 = (rect.y + i64::from(rect.height)).clamp(0, i64::from(height));

        for y in y0..y1 {
            let row = &mut acc[(y as usize) * width as usize..][..width as usize];
            for x in x0..x1 {
                // Offsets within the region are non-negative after clipping.
                let color = checker.color_at((x - rect.x) as u32, (y - rect.y) as u32);
                row[x as usize] = color.0.map(|channel| f64::from(channel) / 255.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;

    fn config(max_layers: usize) -> EditorConfig {
        EditorConfig {
            max_layers,
            ..EditorConfig::default()
        }
    }

    fn gradient(width: u32, height: u32) -> PixelBuffer {
        PixelBuffer::from_fn(width, height, |x, y| {
            Rgba::opaque((x * 40) as u8, (y * 40) as u8, 100)
        })
    }

    #[test]
    fn single_opaque_layer_is_reproduced() {
        let image = gradient(6, 4);
        let stack = LayerStack::new(image.clone(), &EditorConfig::default());
        assert_eq!(composite(&stack, 6, 4), image);
    }

    #[test]
    fn output_has_requested_size() {
        let stack = LayerStack::new(gradient(5, 3), &EditorConfig::default());
        for (w, h) in [(1, 1), (10, 2), (3, 30), (5, 3)] {
            let out = composite(&stack, w, h);
            assert_eq!((out.width(), out.height()), (w, h));
            assert_eq!(out.as_bytes().len(), (w * h * 4) as usize);
        }
        assert!(composite(&stack, 0, 7).is_empty());
    }

    #[test]
    fn contain_fit_centers_the_image() {
        let white = PixelBuffer::filled(4, 4, Rgba::WHITE);
        let stack = LayerStack::new(white, &EditorConfig::default());
        let out = composite(&stack, 8, 4);

        assert_eq!(out.pixel(1, 2), Rgba::TRANSPARENT);
        assert_eq!(out.pixel(2, 0), Rgba::WHITE);
        assert_eq!(out.pixel(5, 3), Rgba::WHITE);
        assert_eq!(out.pixel(6, 1), Rgba::TRANSPARENT);
    }

    #[test]
    fn placement_scales_and_offsets() {
        let rect = placement(100, 50, 200, 200, Position::default()).unwrap();
        let expected = Rect {
            x: 0,
            y: 50,
            width: 200,
            height: 100,
        };
        assert_eq!(rect, expected);

        let moved = placement(100, 50, 200, 200, Position { x: -10, y: 5 }).unwrap();
        assert_eq!((moved.x, moved.y), (-10, 55));

        assert!(placement(0, 10, 20, 20, Position::default()).is_none());
    }

    #[test]
    fn position_shifts_content() {
        let black = PixelBuffer::filled(2, 2, Rgba::BLACK);
        let mut stack = LayerStack::new(black, &EditorConfig::default());
        let id = stack.active_id();
        stack.set_position(id, Position { x: 1, y: 0 }).unwrap();

        let out = composite(&stack, 2, 2);
        assert_eq!(out.pixel(0, 0), Rgba::TRANSPARENT);
        assert_eq!(out.pixel(1, 1), Rgba::BLACK);
    }

    #[test]
    fn opacity_zero_equals_hidden() {
        let mut stack = LayerStack::new(gradient(4, 4), &config(2));
        let top = stack.add_layer().unwrap();
        stack.fill_color(top, Rgba::new(200, 10, 10, 180)).unwrap();
        stack.set_blend_mode(top, BlendMode::Overlay).unwrap();

        let mut hidden = stack.clone();
        hidden.set_visible(top, false).unwrap();
        stack.set_opacity(top, 0).unwrap();

        assert_eq!(composite(&stack, 4, 4), composite(&hidden, 4, 4));
    }

    #[test]
    fn opacity_zero_transparent_image_has_no_checkerboard() {
        let image = PixelBuffer::filled(2, 2, Rgba::TRANSPARENT);
        let mut stack = LayerStack::new(image, &EditorConfig::default());
        let id = stack.active_id();

        let mut hidden = stack.clone();
        hidden.set_visible(id, false).unwrap();
        stack.set_opacity(id, 0).unwrap();

        let out = composite(&stack, 2, 2);
        assert_eq!(out, composite(&hidden, 2, 2));
        assert!(out.as_texels().iter().all(|&p| p == Rgba::TRANSPARENT));
    }

    #[test]
    fn compositing_does_not_touch_layers() {
        let mut stack = LayerStack::new(gradient(3, 3), &config(2));
        let top = stack.add_layer().unwrap();
        stack.fill_color(top, Rgba::new(0, 0, 255, 100)).unwrap();

        let before = stack.layers().to_vec();
        let _ = composite(&stack, 7, 5);
        assert_eq!(stack.layers(), &before[..]);
    }

    #[test]
    fn checkerboard_under_transparent_image() {
        let image = PixelBuffer::filled(20, 20, Rgba::TRANSPARENT);
        let stack = LayerStack::new(image, &EditorConfig::default());
        let out = composite(&stack, 20, 20);

        let light = Rgba::WHITE;
        let dark = Rgba::opaque(0xe0, 0xe0, 0xe0);
        assert_eq!(out.pixel(0, 0), light);
        assert_eq!(out.pixel(10, 0), dark);
        assert_eq!(out.pixel(19, 19), light);
        assert_eq!(out.pixel(5, 15), dark);
    }

    #[test]
    fn checkerboard_follows_the_region_origin() {
        let image = PixelBuffer::filled(2, 1, Rgba::TRANSPARENT);
        let stack = LayerStack::new(image, &EditorConfig::default());
        let checker = CheckerConfig {
            square: 1,
            ..CheckerConfig::default()
        };

        // Centered at y = round(1.5) = 2 in a 2x4 output.
        let out = composite_with(&stack, 2, 4, Some(&checker));
        assert_eq!(out.pixel(0, 1), Rgba::TRANSPARENT);
        assert_eq!(out.pixel(0, 2), checker.light);
        assert_eq!(out.pixel(1, 2), checker.dark);
        assert_eq!(out.pixel(0, 3), Rgba::TRANSPARENT);
    }

    #[test]
    fn no_checkerboard_keeps_transparency() {
        let mut image = PixelBuffer::filled(2, 1, Rgba::gray(200, 255));
        image.as_texels_mut()[1] = Rgba::TRANSPARENT;
        let stack = LayerStack::new(image.clone(), &EditorConfig::default());

        assert_eq!(composite_with(&stack, 2, 1, None), image);
        assert_eq!(composite(&stack, 2, 1).pixel(1, 0), Rgba::WHITE);
    }

    #[test]
    fn opaque_layer_beneath_suppresses_checkerboard() {
        let image = PixelBuffer::filled(2, 2, Rgba::TRANSPARENT);
        let mut stack = LayerStack::new(image, &config(2));
        let base = stack.active_id();
        let top = stack.add_layer().unwrap();
        stack.load_image(top, PixelBuffer::filled(2, 2, Rgba::new(0, 0, 0, 0)), None).unwrap();
        stack.fill_color(base, Rgba::opaque(10, 20, 30)).unwrap();

        let out = composite(&stack, 2, 2);
        assert!(out.as_texels().iter().all(|&p| p == Rgba::opaque(10, 20, 30)));
    }

    #[test]
    fn hidden_alpha_flattens_the_image() {
        let image = PixelBuffer::filled(1, 1, Rgba::new(50, 60, 70, 0));
        let mut stack = LayerStack::new(image, &EditorConfig::default());
        let id = stack.active_id();
        stack.toggle_alpha_visibility(id).unwrap();

        assert_eq!(composite(&stack, 1, 1).pixel(0, 0), Rgba::opaque(50, 60, 70));
    }

    #[test]
    fn normal_over_transparent_keeps_straight_color() {
        let image = PixelBuffer::filled(1, 1, Rgba::new(200, 100, 50, 128));
        let mut stack = LayerStack::new(image, &EditorConfig::default());
        let id = stack.active_id();
        stack.set_opacity(id, 50).unwrap();

        // The color is unchanged and alpha halved.
        let out = composite_with(&stack, 1, 1, None);
        assert_eq!(out.pixel(0, 0), Rgba::new(200, 100, 50, 64));
    }

    #[test]
    fn blend_modes_over_opaque_backdrop() {
        let backdrop = Rgba::opaque(255, 128, 0);
        let color = Rgba::opaque(128, 128, 128);
        let expected = [
            (BlendMode::Normal, Rgba::opaque(128, 128, 128)),
            (BlendMode::Multiply, Rgba::opaque(128, 64, 0)),
            (BlendMode::Screen, Rgba::opaque(255, 192, 128)),
            (BlendMode::Overlay, Rgba::opaque(255, 128, 0)),
        ];

        for (mode, pixel) in expected {
            let mut stack = LayerStack::new(PixelBuffer::filled(1, 1, backdrop), &config(2));
            let top = stack.add_layer().unwrap();
            stack.fill_color(top, color).unwrap();
            stack.set_blend_mode(top, mode).unwrap();
            assert_eq!(composite(&stack, 1, 1).pixel(0, 0), pixel, "{}", mode);
        }
    }

    #[test]
    fn blend_functions() {
        assert_eq!(blend_channel(BlendMode::Multiply, 1.0, 0.3), 0.3);
        assert_eq!(blend_channel(BlendMode::Screen, 0.0, 0.3), 0.3);
        assert_eq!(blend_channel(BlendMode::Screen, 1.0, 0.3), 1.0);
        assert_eq!(blend_channel(BlendMode::Overlay, 0.25, 0.5), 0.25);
        assert_eq!(blend_channel(BlendMode::Overlay, 0.75, 0.5), 0.75);
        assert_eq!(blend_channel(BlendMode::Overlay, 0.0, 1.0), 0.0);
    }

    #[test]
    fn partial_opacity_mixes_linearly() {
        let mut stack = LayerStack::new(PixelBuffer::filled(1, 1, Rgba::BLACK), &config(2));
        let top = stack.add_layer().unwrap();
        stack.fill_color(top, Rgba::WHITE).unwrap();
        stack.set_opacity(top, 25).unwrap();

        // 0.25 * 255 = 63.75
        assert_eq!(composite(&stack, 1, 1).pixel(0, 0), Rgba::opaque(64, 64, 64));
    }
}
