/*
 * Conversions from the platform-agnostic color primitives into GDI values.
 * GDI fills are opaque, so translucent caption colors are flattened against a
 * known base color before they reach a brush.
 */

use crate::styling_primitives::{Color, Rgba};
use windows::Win32::Foundation::COLORREF;

/*
 * Creates a Win32 COLORREF from the platform-agnostic `Color` struct.
 * Win32 expects colors in BGR format, so this function handles the conversion.
 */
pub(crate) fn color_to_colorref(color: &Color) -> COLORREF {
    COLORREF((color.r as u32) | ((color.g as u32) << 8) | ((color.b as u32) << 16))
}

/// Flattens a translucent color over `base` and converts it to a COLORREF.
pub(crate) fn rgba_to_colorref(color: &Rgba, base: Color) -> COLORREF {
    color_to_colorref(&color.blend_over(base))
}
