//! The image core of a grayscale-first editor.
//!
//! Everything works on [`PixelBuffer`]s, straight-alpha RGBA images with one byte per channel.
//! The crate decodes and encodes the GrayBit-7 format, resizes images, converts colors for the
//! pipette and flattens a stack of layers for display.
//!
//! # Usage
//!
//! Loading a file and drawing it is a matter of:
//! 1. Decoding the bytes, GrayBit-7 natively or through a platform decoder
//! 2. Starting a session with the configuration of the editor
//! 3. Rendering whenever the session has changed
//!
//! ```
//! use grayedit_canvas::{codec, loader, EditorConfig, PixelBuffer, Rgba, Session};
//!
//! // A tiny GrayBit-7 file, as a user would open it.
//! let file = codec::encode(&PixelBuffer::filled(4, 4, Rgba::WHITE), false)?;
//!
//! let image = loader::load(&file, &loader::NoPlatformDecoder, 200)?;
//! assert_eq!(image.color_depth, "7-bit Grayscale");
//!
//! let mut session = Session::new(image, EditorConfig::default());
//! let frame = session.render(8, 8).expect("a new session is dirty");
//! assert_eq!(frame.width(), 8);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Editing the layers marks the session for redraw:
//!
//! ```
//! use grayedit_canvas::{BlendMode, EditorConfig, LayerStack, PixelBuffer, Rgba, composite};
//!
//! let white = PixelBuffer::filled(2, 2, Rgba::WHITE);
//! let mut stack = LayerStack::new(white, &EditorConfig::default());
//! let tint = stack.add_layer()?;
//! stack.fill_color(tint, Rgba::opaque(255, 0, 0))?;
//! stack.set_blend_mode(tint, BlendMode::Multiply)?;
//!
//! let out = composite::composite(&stack, 2, 2);
//! assert_eq!(out.pixel(0, 0), Rgba::opaque(255, 0, 0));
//! # Ok::<(), grayedit_canvas::StackError>(())
//! ```
#![deny(unsafe_code)]

/// The GrayBit-7 file format.
pub mod codec;
/// Color spaces for the pipette and contrast checks.
pub mod color;
mod color_matrix;
pub mod composite;
pub mod config;
pub mod depth;
pub mod layer;
pub mod loader;
mod math;
pub mod resample;
mod rows;
mod session;


pub use grayedit_texel::{Layout, LayoutError, PixelBuffer, Rgba};

pub use self::codec::{FormatError, FormatMetadata};
pub use self::config::{CheckerConfig, EditorConfig};
pub use self::layer::{BlendMode, LayerContent, LayerId, LayerStack, Position, StackError};
pub use self::loader::{LoadError, LoadedImage, PlatformDecoder};
pub use self::resample::{resample, Algorithm};
pub use self::session::Session;
