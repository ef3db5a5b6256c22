/*
 * Process-wide desktop theme: the light/dark preference and the accent color.
 * One `ThemeProvider` is created per process and shared by reference with every
 * frameless window; `refresh` is called at window construction and again on
 * every WM_SETTINGCHANGE. Reads are best-effort: a failed read keeps the
 * previous value.
 */
use crate::styling_primitives::Color;

use std::cell::Cell;

/// Accent color Windows ships with, used until the first successful read.
pub const DEFAULT_ACCENT: Color = Color::rgb(0, 120, 215);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeState {
    pub is_dark: bool,
    pub accent: Color,
}

impl Default for ThemeState {
    fn default() -> Self {
        Self {
            is_dark: false,
            accent: DEFAULT_ACCENT,
        }
    }
}

/*
 * Reads the two OS settings behind the theme. Implementations return `None`
 * when the value cannot be read; the provider then keeps what it had.
 */
pub trait ThemeSource {
    /// Raw `AppsUseLightTheme` value: 0 means dark.
    fn read_apps_use_light_theme(&self) -> Option<u32>;
    /// Accent color as `0xAARRGGBB`.
    fn read_accent_color(&self) -> Option<u32>;
}

/// Drops the alpha byte of an ARGB value and unpacks the color channels.
pub fn decode_accent_color(argb: u32) -> Color {
    let rgb = argb & 0x00FF_FFFF;
    Color::rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}

pub struct ThemeProvider {
    source: Box<dyn ThemeSource>,
    state: Cell<ThemeState>,
}

impl std::fmt::Debug for ThemeProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeProvider")
            .field("state", &self.state.get())
            .finish_non_exhaustive()
    }
}

impl ThemeProvider {
    /// Creates the provider with default values and performs the initial read.
    pub fn new(source: Box<dyn ThemeSource>) -> Self {
        let provider = Self {
            source,
            state: Cell::new(ThemeState::default()),
        };
        provider.refresh();
        provider
    }

    /// Provider backed by the OS registry (or a no-op source off Windows).
    pub fn system() -> Self {
        Self::new(Box::new(crate::system_theme::SystemThemeSource))
    }

    pub fn current(&self) -> ThemeState {
        self.state.get()
    }

    /*
     * Re-reads both settings and returns whether the theme changed. Each value
     * is read independently, so a failing accent read does not prevent a dark
     * mode switch from being picked up.
     */
    pub fn refresh(&self) -> bool {
        let previous = self.state.get();
        let mut next = previous;

        match self.source.read_apps_use_light_theme() {
            Some(value) => next.is_dark = value == 0,
            None => log::debug!(
                "[Theme] AppsUseLightTheme unavailable; keeping is_dark={}",
                previous.is_dark
            ),
        }
        match self.source.read_accent_color() {
            Some(argb) => next.accent = decode_accent_color(argb),
            None => log::debug!(
                "[Theme] Accent color unavailable; keeping {:?}",
                previous.accent
            ),
        }

        if next == previous {
            log::trace!("[Theme] Refresh found no change");
            return false;
        }
        log::debug!("[Theme] Theme changed: {previous:?} -> {next:?}");
        self.state.set(next);
        true
    }
}
