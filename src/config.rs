/*
 * Tunable constants for the frameless chrome. The defaults reproduce the stock
 * Windows 11 caption metrics; applications normally use `FramelessConfig::default()`
 * and override single fields when embedding a taller bar or a wider border.
 */
use crate::error::{FramelessError, Result};
use crate::monitor::AUTO_HIDE_THICKNESS;
use crate::styling_primitives::Rgba;

use std::time::Duration;

/// First Windows build that shows snap layouts when hovering a maximize button.
pub const SNAP_LAYOUT_MIN_BUILD: u32 = 22000;

#[derive(Debug, Clone, PartialEq)]
pub struct FramelessConfig {
    /// Width of the resize hit zone along every window edge, in pixels.
    pub border_width: i32,
    /// Caption bar height in logical pixels.
    pub title_bar_height: i32,
    /// Width of each caption button in logical pixels.
    pub button_width: i32,
    /// Icon slot width before an icon is set.
    pub icon_slot_width: i32,
    /// Icon slot width once a window icon is set.
    pub icon_slot_width_with_icon: i32,
    /// Edge length of the window icon in logical pixels.
    pub icon_size: i32,
    /// Delay before the backdrop effect is re-enabled after the last move or resize.
    pub effect_debounce: Duration,
    /// Pixels kept free along an auto-hide taskbar edge while maximized.
    pub auto_hide_thickness: i32,
    pub snap_layout_min_build: u32,
    pub acrylic_tint_light: Rgba,
    pub acrylic_tint_dark: Rgba,
}

impl Default for FramelessConfig {
    fn default() -> Self {
        Self {
            border_width: 4,
            title_bar_height: 32,
            button_width: 46,
            icon_slot_width: 10,
            icon_slot_width_with_icon: 32,
            icon_size: 16,
            effect_debounce: Duration::from_millis(100),
            auto_hide_thickness: AUTO_HIDE_THICKNESS,
            snap_layout_min_build: SNAP_LAYOUT_MIN_BUILD,
            acrylic_tint_light: Rgba::new(0xFC, 0xFC, 0xFC, 0x99),
            acrylic_tint_dark: Rgba::new(0x2C, 0x2C, 0x2C, 0x99),
        }
    }
}

impl FramelessConfig {
    pub fn validate(&self) -> Result<()> {
        if self.border_width < 0 {
            return Err(FramelessError::InvalidConfig(format!(
                "border_width must not be negative (got {})",
                self.border_width
            )));
        }
        if self.auto_hide_thickness < 0 {
            return Err(FramelessError::InvalidConfig(format!(
                "auto_hide_thickness must not be negative (got {})",
                self.auto_hide_thickness
            )));
        }
        for (name, value) in [
            ("title_bar_height", self.title_bar_height),
            ("button_width", self.button_width),
            ("icon_slot_width", self.icon_slot_width),
            ("icon_slot_width_with_icon", self.icon_slot_width_with_icon),
            ("icon_size", self.icon_size),
        ] {
            if value <= 0 {
                return Err(FramelessError::InvalidConfig(format!(
                    "{name} must be positive (got {value})"
                )));
            }
        }
        if self.effect_debounce.is_zero() {
            return Err(FramelessError::InvalidConfig(
                "effect_debounce must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn supports_snap_layout(&self, os_build: u32) -> bool {
        os_build >= self.snap_layout_min_build
    }

    /// Acrylic gradient color for the current theme.
    pub fn acrylic_tint(&self, is_dark: bool) -> Rgba {
        if is_dark {
            self.acrylic_tint_dark
        } else {
            self.acrylic_tint_light
        }
    }
}
