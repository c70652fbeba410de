//! Canvas to ratatui buffer translation

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color as TermColor;
use stagehand_core::{Canvas, Color};

/// Convert a canvas color to a terminal color
///
/// Transparent cells fall back to the terminal's own colors.
pub fn to_term_color(color: Color) -> TermColor {
    if color.is_transparent() {
        TermColor::Reset
    } else {
        TermColor::Rgb(color.r, color.g, color.b)
    }
}

/// Copy `canvas` into `buf`, clipped to `area`
pub fn draw_canvas(canvas: &Canvas, buf: &mut Buffer, area: Rect) {
    for (dy, row) in (0..area.height).zip(canvas.rows()) {
        for (dx, block) in (0..area.width).zip(row) {
            let x = area.x + dx;
            let y = area.y + dy;
            buf[(x, y)]
                .set_char(block.character)
                .set_fg(to_term_color(block.fg))
                .set_bg(to_term_color(block.bg));
        }
    }
}
