//! Editor settings.
use grayedit_texel::Rgba;

/// Settings of an editing [`Session`](crate::Session).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditorConfig {
    /// Upper bound on the number of layers in a stack.
    pub max_layers: usize,
    /// Name of the layer created from a freshly loaded image.
    pub base_layer_name: String,
    /// Background drawn under transparent image areas.
    pub checker: CheckerConfig,
    /// Depth analysis looks at most at this many pixels in each direction.
    pub depth_sample_limit: u32,
}

/// A checkerboard of two alternating colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CheckerConfig {
    /// Edge length of one square, in pixels.
    pub square: u32,
    /// Color of the square at the origin of a region.
    pub light: Rgba,
    pub dark: Rgba,
}

impl Default for EditorConfig {
    fn default() -> Self {
        EditorConfig {
            max_layers: 2,
            base_layer_name: "Layer 1".into(),
            checker: CheckerConfig::default(),
            depth_sample_limit: 200,
        }
    }
}

impl Default for CheckerConfig {
    fn default() -> Self {
        CheckerConfig {
            square: 10,
            light: Rgba::WHITE,
            dark: Rgba::opaque(0xe0, 0xe0, 0xe0),
        }
    }
}

impl CheckerConfig {
    /// The color at `(x, y)` relative to the region origin.
    pub fn color_at(&self, x: u32, y: u32) -> Rgba {
        let square = self.square.max(1);
        if (x / square + y / square) % 2 == 0 {
            self.light
        } else {
            self.dark
        }
    }
}
