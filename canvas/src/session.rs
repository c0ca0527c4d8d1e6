//! An editing session: one layer stack and the state needed to redraw and export it.
use grayedit_texel::PixelBuffer;

use crate::codec::{self, FormatError, FormatMetadata};
use crate::color::{ColorSample, Rgb8};
use crate::composite;
use crate::config::EditorConfig;
use crate::layer::LayerStack;
use crate::loader::LoadedImage;

/// Owns the layers of the image being edited.
///
/// Changes to the stack only mark the session dirty, the caller's render loop decides when to
/// call [`Session::render`].
#[derive(Debug)]
pub struct Session {
    config: EditorConfig,
    stack: LayerStack,
    /// Header of the loaded file, when it was GrayBit-7.
    metadata: Option<FormatMetadata>,
    image_width: u32,
    image_height: u32,
    color_depth: String,
    needs_redraw: bool,
    composite: Option<PixelBuffer>,
}

impl Session {
    pub fn new(image: LoadedImage, config: EditorConfig) -> Self {
        let metadata = image.metadata().copied();
        let LoadedImage {
            buffer, color_depth, ..
        } = image;

        let (image_width, image_height) = (buffer.width(), buffer.height());
        let stack = LayerStack::new(buffer, &config);
        log::debug!(
            "session for {}x{} image ({}), {} metadata",
            image_width,
            image_height,
            color_depth,
            if metadata.is_some() { "GrayBit-7" } else { "no" }
        );

        Session {
            config,
            stack,
            metadata,
            image_width,
            image_height,
            color_depth,
            needs_redraw: true,
            composite: None,
        }
    }

    /// Continue with metadata restored from storage, e.g. after navigating back to the editor.
    pub fn with_metadata(mut self, metadata: Option<FormatMetadata>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn layers(&self) -> &LayerStack {
        &self.stack
    }

    /// Edit the layers, which schedules a redraw.
    pub fn layers_mut(&mut self) -> &mut LayerStack {
        self.needs_redraw = true;
        &mut self.stack
    }

    pub fn metadata(&self) -> Option<&FormatMetadata> {
        self.metadata.as_ref()
    }

    /// Size of the loaded image.
    pub fn image_size(&self) -> (u32, u32) {
        (self.image_width, self.image_height)
    }

    pub fn color_depth(&self) -> &str {
        &self.color_depth
    }

    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    pub fn mark_dirty(&mut self) {
        self.needs_redraw = true;
    }

    /// Composite if anything changed since the last render, or the output size differs.
    pub fn render(&mut self, width: u32, height: u32) -> Option<&PixelBuffer> {
        let resized = self
            .composite
            .as_ref()
            .is_some_and(|last| (last.width(), last.height()) != (width, height));

        if !self.needs_redraw && !resized {
            return None;
        }

        Some(self.force_render(width, height))
    }

    /// Composite unconditionally.
    pub fn force_render(&mut self, width: u32, height: u32) -> &PixelBuffer {
        let checker = Some(&self.config.checker);
        let out = composite::composite_with(&self.stack, width, height, checker);
        self.needs_redraw = false;
        self.composite.insert(out)
    }

    /// The result of the last render.
    pub fn last_composite(&self) -> Option<&PixelBuffer> {
        self.composite.as_ref()
    }

    /// Encode the layers, composited at the size of the loaded image, as GrayBit-7.
    ///
    /// The display checkerboard is left out. A mask is stored when the composite has any
    /// transparency.
    pub fn export_gb7(&self) -> Result<Vec<u8>, FormatError> {
        let (width, height) = self.image_size();
        let flat = composite::composite_with(&self.stack, width, height, None);
        codec::encode_auto(&flat)
    }

    /// The color under the pipette in the last composite.
    pub fn sample(&self, x: u32, y: u32) -> Option<ColorSample> {
        let pixel = self.composite.as_ref()?.get(x, y)?;
        Some(ColorSample::new(Rgb8::from(pixel)))
    }

    /// The status line of the pipette, gray levels for GrayBit-7 sources.
    pub fn pipette_label(&self, x: u32, y: u32) -> Option<String> {
        let pixel = self.composite.as_ref()?.get(x, y)?;
        let rgb = Rgb8::from(pixel);
        Some(match self.metadata {
            Some(_) => format!("{} → {}", rgb, codec::gray7_label(pixel)),
            None => rgb.to_string(),
        })
    }
}
