//! The Unit capability
//!
//! Everything the host loop drives is a [`Unit`]: scenes, transitions, and
//! the controllers themselves. The host calls [`Unit::tick`] once per
//! logical step, [`Unit::present`] once per frame, and [`Unit::resize`]
//! whenever its viewport changes.

use crate::surface::Canvas;

/// Something that can be stepped, drawn, and laid out
pub trait Unit {
    /// Advance one logical step
    ///
    /// # Errors
    ///
    /// Returns whatever error the unit's own logic produces. Controllers and
    /// transitions pass these through unchanged.
    fn tick(&mut self) -> anyhow::Result<()>;

    /// Draw the current state onto `canvas`
    fn present(&mut self, canvas: &mut Canvas);

    /// Adapt to an outer viewport and return the logical size to draw at
    fn resize(&mut self, width: u16, height: u16) -> (u16, u16);
}
