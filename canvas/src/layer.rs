//! The ordered stack of layers of an editing session.
//!
//! Index 0 of a [`LayerStack`] is the topmost layer, painting happens from the last index
//! towards the first. A stack is never empty and always has exactly one active layer.
use core::fmt;

use grayedit_texel::{PixelBuffer, Rgba};

use crate::config::EditorConfig;

/// Identifies a layer within its stack. Never reused by the same stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(u64);

/// How a layer's colors combine with the composite beneath it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
}

/// What a layer paints.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayerContent {
    /// An image, fitted into the output and then offset by the layer position.
    Image(PixelBuffer),
    /// A solid color covering the whole output.
    Color(Rgba),
    Empty,
}

/// Offset of a layer's content in output pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

/// The transparency of an image layer, extracted into a gray mask.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlphaChannel {
    /// When hidden, the image is composited fully opaque.
    pub visible: bool,
    /// The source alpha in every color channel, itself fully opaque.
    pub mask: PixelBuffer,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layer {
    id: LayerId,
    name: String,
    visible: bool,
    opacity: u8,
    blend_mode: BlendMode,
    content: LayerContent,
    position: Position,
    alpha_channel: Option<AlphaChannel>,
    /// State before the first color fill, restored by [`LayerStack::reset`].
    before_fill: Option<Box<Snapshot>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Snapshot {
    name: String,
    content: LayerContent,
    alpha_channel: Option<AlphaChannel>,
}

/// The layers of one session.
#[derive(Clone, Debug)]
pub struct LayerStack {
    layers: Vec<Layer>,
    active: LayerId,
    next_id: u64,
    max_layers: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StackError {
    #[error("a stack holds at most {0} layers")]
    LayerLimit(usize),
    #[error("no layer {0} in the stack")]
    UnknownLayer(LayerId),
}

/// Summary for the layer panel header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayersInfo {
    pub total: usize,
    pub visible: usize,
    pub active: LayerId,
    pub has_alpha_channels: bool,
}

impl BlendMode {
    pub const ALL: [BlendMode; 4] = [
        BlendMode::Normal,
        BlendMode::Multiply,
        BlendMode::Screen,
        BlendMode::Overlay,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BlendMode::Normal => "Normal",
            BlendMode::Multiply => "Multiply",
            BlendMode::Screen => "Screen",
            BlendMode::Overlay => "Overlay",
        }
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Layer {
    fn new(id: LayerId, name: String, content: LayerContent) -> Self {
        Layer {
            id,
            name,
            visible: true,
            opacity: 100,
            blend_mode: BlendMode::Normal,
            content,
            position: Position::default(),
            alpha_channel: None,
            before_fill: None,
        }
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Opacity in percent, `0..=100`.
    pub fn opacity(&self) -> u8 {
        self.opacity
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    pub fn content(&self) -> &LayerContent {
        &self.content
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn alpha_channel(&self) -> Option<&AlphaChannel> {
        self.alpha_channel.as_ref()
    }

    /// Whether the layer contributes anything to a composite.
    ///
    /// Hidden, fully transparent and empty layers do not.
    pub fn is_rendered(&self) -> bool {
        self.visible && self.opacity > 0 && !matches!(self.content, LayerContent::Empty)
    }

    /// Whether compositing keeps the transparency of the image.
    pub fn shows_transparency(&self) -> bool {
        self.alpha_channel.as_ref().is_some_and(|alpha| alpha.visible)
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            name: self.name.clone(),
            content: self.content.clone(),
            alpha_channel: self.alpha_channel.clone(),
        }
    }
}

impl LayerStack {
    /// A stack with a single active layer showing `image`.
    pub fn new(image: PixelBuffer, config: &EditorConfig) -> Self {
        let mut stack = LayerStack {
            layers: Vec::new(),
            active: LayerId(1),
            next_id: 1,
            max_layers: config.max_layers.max(1),
        };

        let id = stack.allocate_id();
        let mut base = Layer::new(id, config.base_layer_name.clone(), LayerContent::Empty);
        set_image(&mut base, image);
        stack.layers.push(base);
        stack.active = id;
        stack
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Always `false`, the last layer can not be removed.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn max_layers(&self) -> usize {
        self.max_layers
    }

    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    /// Position of the layer counted from the top.
    pub fn index_of(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|layer| layer.id == id)
    }

    pub fn active_id(&self) -> LayerId {
        self.active
    }

    pub fn active(&self) -> &Layer {
        // The active id always refers to a layer of the stack.
        self.get(self.active).unwrap_or(&self.layers[0])
    }

    pub fn set_active(&mut self, id: LayerId) -> Result<(), StackError> {
        self.layer_mut(id)?;
        self.active = id;
        Ok(())
    }

    /// Add an empty layer on top and make it active.
    pub fn add_layer(&mut self) -> Result<LayerId, StackError> {
        if self.layers.len() >= self.max_layers {
            log::warn!("refusing to add a layer beyond the limit of {}", self.max_layers);
            return Err(StackError::LayerLimit(self.max_layers));
        }

        let id = self.allocate_id();
        let name = format!("Layer {}", self.layers.len() + 1);
        self.layers.insert(0, Layer::new(id, name, LayerContent::Empty));
        self.active = id;
        Ok(id)
    }

    /// Remove a layer, returns whether it was removed.
    ///
    /// Removing the last remaining layer does nothing. When the active layer is removed, the
    /// topmost layer becomes active.
    pub fn remove(&mut self, id: LayerId) -> Result<bool, StackError> {
        let index = self.index_of(id).ok_or(StackError::UnknownLayer(id))?;
        if self.layers.len() <= 1 {
            log::warn!("refusing to remove the last layer {}", id);
            return Ok(false);
        }

        self.layers.remove(index);
        if self.active == id {
            self.active = self.layers[0].id;
        }

        Ok(true)
    }

    /// Move `dragged` to the index currently held by `target`.
    pub fn reorder(&mut self, dragged: LayerId, target: LayerId) -> Result<(), StackError> {
        let from = self.index_of(dragged).ok_or(StackError::UnknownLayer(dragged))?;
        let to = self.index_of(target).ok_or(StackError::UnknownLayer(target))?;

        let layer = self.layers.remove(from);
        self.layers.insert(to, layer);
        Ok(())
    }

    pub fn set_visible(&mut self, id: LayerId, visible: bool) -> Result<(), StackError> {
        self.layer_mut(id)?.visible = visible;
        Ok(())
    }

    /// Flip the visibility, returns the new state.
    pub fn toggle_visibility(&mut self, id: LayerId) -> Result<bool, StackError> {
        let layer = self.layer_mut(id)?;
        layer.visible = !layer.visible;
        Ok(layer.visible)
    }

    /// Set the opacity in percent, larger values are clamped to 100.
    pub fn set_opacity(&mut self, id: LayerId, opacity: u8) -> Result<(), StackError> {
        self.layer_mut(id)?.opacity = opacity.min(100);
        Ok(())
    }

    pub fn set_blend_mode(&mut self, id: LayerId, mode: BlendMode) -> Result<(), StackError> {
        self.layer_mut(id)?.blend_mode = mode;
        Ok(())
    }

    pub fn set_position(&mut self, id: LayerId, position: Position) -> Result<(), StackError> {
        self.layer_mut(id)?.position = position;
        Ok(())
    }

    pub fn rename(&mut self, id: LayerId, name: impl Into<String>) -> Result<(), StackError> {
        self.layer_mut(id)?.name = name.into();
        Ok(())
    }

    /// Show `image` in a layer, named after its file when a name is given.
    ///
    /// The alpha channel is extracted when the image has any transparency.
    pub fn load_image(
        &mut self,
        id: LayerId,
        image: PixelBuffer,
        name: Option<&str>,
    ) -> Result<(), StackError> {
        let layer = self.layer_mut(id)?;
        set_image(layer, image);
        if let Some(name) = name.filter(|name| !name.is_empty()) {
            layer.name = name.to_owned();
        }

        Ok(())
    }

    /// Fill a layer with a solid color.
    ///
    /// The content before the first fill is remembered for [`LayerStack::reset`], filling an
    /// already filled layer only changes its color.
    pub fn fill_color(&mut self, id: LayerId, color: Rgba) -> Result<(), StackError> {
        let layer = self.layer_mut(id)?;
        if !matches!(layer.content, LayerContent::Color(_)) {
            layer.before_fill = Some(Box::new(layer.snapshot()));
        }

        layer.content = LayerContent::Color(color);
        layer.name = color_name(color);
        Ok(())
    }

    /// Undo color fills of a layer, or clear it when it was never filled.
    pub fn reset(&mut self, id: LayerId) -> Result<(), StackError> {
        let layer = self.layer_mut(id)?;
        match layer.before_fill.take() {
            Some(snapshot) => {
                let Snapshot {
                    name,
                    content,
                    alpha_channel,
                } = *snapshot;
                layer.name = name;
                layer.content = content;
                layer.alpha_channel = alpha_channel;
            }
            None => {
                if !layer.name.contains("Layer") {
                    layer.name = format!("Layer {}", layer.id);
                }
                layer.content = LayerContent::Empty;
                layer.alpha_channel = None;
            }
        }

        Ok(())
    }

    /// Create the alpha channel of an image layer or drop an existing one.
    ///
    /// Returns whether the layer has an alpha channel afterwards. Layers without an image can
    /// not have one.
    pub fn toggle_alpha_channel(&mut self, id: LayerId) -> Result<bool, StackError> {
        let layer = self.layer_mut(id)?;
        if layer.alpha_channel.take().is_some() {
            return Ok(false);
        }

        if let LayerContent::Image(image) = &layer.content {
            layer.alpha_channel = Some(AlphaChannel {
                visible: true,
                mask: alpha_mask(image),
            });
        } else {
            log::debug!("layer {} has no image to take an alpha channel from", id);
        }

        Ok(layer.alpha_channel.is_some())
    }

    /// Show or hide the transparency of an image layer. Without an alpha channel, nothing happens.
    pub fn toggle_alpha_visibility(&mut self, id: LayerId) -> Result<(), StackError> {
        if let Some(alpha) = self.layer_mut(id)?.alpha_channel.as_mut() {
            alpha.visible = !alpha.visible;
        }
        Ok(())
    }

    pub fn delete_alpha_channel(&mut self, id: LayerId) -> Result<(), StackError> {
        self.layer_mut(id)?.alpha_channel = None;
        Ok(())
    }

    pub fn info(&self) -> LayersInfo {
        LayersInfo {
            total: self.layers.len(),
            visible: self.layers.iter().filter(|layer| layer.visible).count(),
            active: self.active,
            has_alpha_channels: self.layers.iter().any(|layer| layer.alpha_channel.is_some()),
        }
    }

    /// Layers in paint order, bottom first.
    pub fn paint_order(&self) -> impl Iterator<Item = &Layer> + '_ {
        self.layers.iter().rev()
    }

    fn layer_mut(&mut self, id: LayerId) -> Result<&mut Layer, StackError> {
        self.layers
            .iter_mut()
            .find(|layer| layer.id == id)
            .ok_or(StackError::UnknownLayer(id))
    }

    fn allocate_id(&mut self) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        id
    }
}

/// The alpha of `image` as an opaque gray mask, or `None` when every pixel is opaque.
pub fn extract_alpha(image: &PixelBuffer) -> Option<PixelBuffer> {
    image.has_transparency().then(|| alpha_mask(image))
}

/// The alpha of `image` as an opaque gray mask.
pub fn alpha_mask(image: &PixelBuffer) -> PixelBuffer {
    image.map(|pixel| Rgba::gray(pixel.a(), 0xff))
}

fn set_image(layer: &mut Layer, image: PixelBuffer) {
    layer.alpha_channel = extract_alpha(&image).map(|mask| AlphaChannel { visible: true, mask });
    layer.content = LayerContent::Image(image);
}

fn color_name(color: Rgba) -> String {
    let [r, g, b, a] = color.0;
    if a == 0xff {
        format!("Color #{r:02x}{g:02x}{b:02x}")
    } else {
        format!("Color #{r:02x}{g:02x}{b:02x}{a:02x}")
    }
}
