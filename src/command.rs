//! Typed commands produced by the control panel.

use crate::customize::ColorSlot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Recolour one part of the model, `hex` is `0xRRGGBB` in sRGB.
    SetColor(ColorSlot, u32),
    ResetColors,
    SelectClip(String),
}
