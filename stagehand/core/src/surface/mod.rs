//! Surface-agnostic drawing target
//!
//! Scenes present into a [`Canvas`], a fixed-size grid of [`Block`]s. The
//! core never talks to a terminal or a window: a surface (the demo's
//! ratatui frontend, a test harness, anything else) owns the real output
//! and copies the canvas into it after each present.
//!
//! # Design Philosophy
//!
//! Transitions composite *whole frames*. They render both endpoint scenes
//! offscreen with [`pre_render`] and then combine the results with
//! [`Canvas::blit`] and [`Canvas::dim`]. That keeps every effect independent
//! of how a scene draws.

pub mod block;

pub use block::{Block, Color};

use crate::unit::Unit;

/// A `width` x `height` grid of blocks, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: u16,
    height: u16,
    blocks: Vec<Block>,
}

impl Canvas {
    /// Create a canvas filled with empty blocks
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            blocks: vec![Block::empty(); usize::from(width) * usize::from(height)],
        }
    }

    /// Width in cells
    #[must_use]
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Height in cells
    #[must_use]
    pub fn height(&self) -> u16 {
        self.height
    }

    fn index(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| usize::from(y) * usize::from(self.width) + usize::from(x))
    }

    /// Block at `(x, y)`, or `None` outside the canvas
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Block> {
        self.index(x, y).map(|i| &self.blocks[i])
    }

    /// Overwrite the block at `(x, y)`; writes outside the canvas are clipped
    pub fn set(&mut self, x: u16, y: u16, block: Block) {
        if let Some(i) = self.index(x, y) {
            self.blocks[i] = block;
        }
    }

    /// Overwrite every block
    pub fn fill(&mut self, block: Block) {
        self.blocks.fill(block);
    }

    /// Reset every block to empty
    pub fn clear(&mut self) {
        self.fill(Block::empty());
    }

    /// Write `text` left to right from `(x, y)`, keeping each cell's background
    pub fn put_str(&mut self, x: u16, y: u16, text: &str, fg: Color) {
        for (col, character) in (x..self.width).zip(text.chars()) {
            if let Some(i) = self.index(col, y) {
                let bg = self.blocks[i].bg;
                self.blocks[i] = Block::text(character, fg).with_bg(bg);
            }
        }
    }

    /// Iterate over rows of blocks, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Block]> {
        self.blocks.chunks(usize::from(self.width.max(1)))
    }

    /// Composite `src` over this canvas, shifted by `(dx, dy)` cells
    ///
    /// Cells of `src` that land outside this canvas are dropped.
    pub fn blit(&mut self, src: &Canvas, dx: i32, dy: i32) {
        for sy in 0..src.height {
            let Ok(ty) = u16::try_from(i32::from(sy) + dy) else {
                continue;
            };
            for sx in 0..src.width {
                let Ok(tx) = u16::try_from(i32::from(sx) + dx) else {
                    continue;
                };
                let (Some(from), Some(to)) = (src.index(sx, sy), self.index(tx, ty)) else {
                    continue;
                };
                self.blocks[to] = src.blocks[from].blend_over(self.blocks[to]);
            }
        }
    }

    /// Darken every cell towards black by `amount` (0.0 = unchanged, 1.0 = black)
    pub fn dim(&mut self, amount: f32) {
        if amount <= 0.0 {
            return;
        }
        let veil = Block::solid(Color::BLACK.with_opacity(amount));
        for block in &mut self.blocks {
            *block = veil.blend_over(*block);
        }
    }
}

/// Present two units onto fresh offscreen canvases of the given size
///
/// Returns `(from, to)`.
pub fn pre_render<F, G>(width: u16, height: u16, from: &mut F, to: &mut G) -> (Canvas, Canvas)
where
    F: Unit + ?Sized,
    G: Unit + ?Sized,
{
    let mut from_canvas = Canvas::new(width, height);
    from.present(&mut from_canvas);

    let mut to_canvas = Canvas::new(width, height);
    to.present(&mut to_canvas);

    (from_canvas, to_canvas)
}
