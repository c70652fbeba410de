//! Cell-level rendering primitives
//!
//! A [`Block`] is one character cell with a foreground and background
//! [`Color`]. Scenes draw blocks; surfaces map them onto whatever they
//! actually paint (terminal cells, pixels, HTML spans).
//!
//! # Compositing
//!
//! Transitions never touch a scene's drawing logic. They composite whole
//! canvases with the "over" operator implemented here, so a translucent
//! block darkens or tints whatever lies below it.

use serde::{Deserialize, Serialize};

/// Surface-agnostic RGBA color
///
/// # Examples
///
/// ```
/// use stagehand_core::surface::Color;
///
/// let red = Color::rgb(255, 0, 0);
/// assert!(red.is_opaque());
///
/// let shade = Color::rgba(0, 0, 0, 128);
/// assert!(!shade.is_opaque());
/// assert!(Color::transparent().is_transparent());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    /// Red component (0-255)
    pub r: u8,
    /// Green component (0-255)
    pub g: u8,
    /// Blue component (0-255)
    pub b: u8,
    /// Alpha component (0=transparent, 255=opaque)
    pub a: u8,
}

impl Color {
    /// Opaque black
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    /// Opaque white
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    /// Create a fully opaque color from RGB components
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create a color with explicit alpha channel
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// The "nothing here" color
    #[must_use]
    pub const fn transparent() -> Self {
        Self::rgba(0, 0, 0, 0)
    }

    /// Check if this color is fully transparent
    #[must_use]
    pub const fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Check if this color is fully opaque
    #[must_use]
    pub const fn is_opaque(&self) -> bool {
        self.a == 255
    }

    /// Same color with the alpha channel replaced by `opacity` (0.0..=1.0)
    #[must_use]
    pub fn with_opacity(self, opacity: f32) -> Self {
        Self {
            a: unit_to_byte(opacity),
            ..self
        }
    }

    /// Blend this color over another
    ///
    /// Uses the "over" operator: result = src + dst * (1 - `src_alpha`)
    ///
    /// # Examples
    ///
    /// ```
    /// use stagehand_core::surface::Color;
    ///
    /// let veil = Color::rgba(0, 0, 0, 128);
    /// let blended = veil.blend_over(Color::rgb(200, 200, 200));
    /// assert!(blended.r < 200);
    /// assert!(blended.is_opaque());
    /// ```
    #[must_use]
    pub fn blend_over(&self, background: Color) -> Color {
        if self.is_opaque() {
            return *self;
        }
        if self.is_transparent() {
            return background;
        }

        let src_a = f32::from(self.a) / 255.0;
        let dst_a = f32::from(background.a) / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);

        if out_a <= f32::EPSILON {
            return Color::transparent();
        }

        let channel = |src: u8, dst: u8| -> u8 {
            let s = f32::from(src) / 255.0;
            let d = f32::from(dst) / 255.0;
            unit_to_byte((s * src_a + d * dst_a * (1.0 - src_a)) / out_a)
        };

        Color {
            r: channel(self.r, background.r),
            g: channel(self.g, background.g),
            b: channel(self.b, background.b),
            a: unit_to_byte(out_a),
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::transparent()
    }
}

/// Map 0.0..=1.0 onto 0..=255, clamping out-of-range input
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn unit_to_byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// A single character cell
///
/// An empty block (space on a transparent background) lets whatever is
/// underneath show through when composited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Block {
    /// Glyph drawn in the cell
    pub character: char,
    /// Glyph color
    pub fg: Color,
    /// Cell background
    pub bg: Color,
}

impl Block {
    /// Fully transparent cell
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            character: ' ',
            fg: Color::transparent(),
            bg: Color::transparent(),
        }
    }

    /// Cell filled with a background color
    #[must_use]
    pub const fn solid(bg: Color) -> Self {
        Self {
            character: ' ',
            fg: Color::transparent(),
            bg,
        }
    }

    /// Glyph on a transparent background
    #[must_use]
    pub const fn text(character: char, fg: Color) -> Self {
        Self {
            character,
            fg,
            bg: Color::transparent(),
        }
    }

    /// Set the background of this block
    #[must_use]
    pub const fn with_bg(mut self, bg: Color) -> Self {
        self.bg = bg;
        self
    }

    /// Check if this block draws nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.character == ' ' && self.bg.is_transparent()
    }

    /// Composite this block over `below`
    ///
    /// A glyph on this block replaces the glyph below. A blank, translucent
    /// block keeps the glyph below but tints it with its own background.
    #[must_use]
    pub fn blend_over(&self, below: Block) -> Block {
        let bg = self.bg.blend_over(below.bg);

        if self.character != ' ' {
            Block {
                character: self.character,
                fg: self.fg.blend_over(bg),
                bg,
            }
        } else if self.bg.is_opaque() {
            Block::solid(bg)
        } else {
            Block {
                character: below.character,
                fg: self.bg.blend_over(below.fg),
                bg,
            }
        }
    }
}

impl Default for Block {
    fn default() -> Self {
        Self::empty()
    }
}
