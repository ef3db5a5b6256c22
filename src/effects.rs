/*
 * Backdrop effects behind the caption bar and client area.
 *
 * Windows 11 builds get Mica, which the compositor keeps alive while the
 * window moves. Older builds get Acrylic, which stutters badly during a drag;
 * there the effect is switched off on every move/resize and switched back on
 * once the window has been still for a short while (`EffectDebounce`).
 */
use crate::config::FramelessConfig;
use crate::error::Result;
use crate::styling_primitives::{Color, Rgba};
use crate::theme::ThemeState;
use crate::types::WindowHandle;

use std::time::{Duration, Instant};

/// Opacity of the plain background painted while no effect is active.
pub const FALLBACK_BACKGROUND_ALPHA: u8 = 204;

pub trait BackdropEffects {
    /// Restores the minimize/maximize animations a borderless style loses.
    fn enable_window_animation(&self, handle: WindowHandle) -> Result<()>;
    fn apply_mica(&self, handle: WindowHandle, is_dark: bool) -> Result<()>;
    fn apply_acrylic(&self, handle: WindowHandle, tint: Rgba) -> Result<()>;
    fn remove_backdrop(&self, handle: WindowHandle) -> Result<()>;
    fn enable_shadow(&self, handle: WindowHandle) -> Result<()>;
    fn enable_blur_behind(&self, handle: WindowHandle) -> Result<()>;
    /// Asks for the whole window to be repainted.
    fn request_repaint(&self, handle: WindowHandle);
}

/// Monotonic time source, injectable for tests.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Background painted under the caption bar and client area.
pub fn background_fill(effect_enabled: bool, is_dark: bool) -> Rgba {
    if effect_enabled {
        return Rgba::TRANSPARENT;
    }
    let base = if is_dark { Color::BLACK } else { Color::WHITE };
    Rgba::new(base.r, base.g, base.b, FALLBACK_BACKGROUND_ALPHA)
}

/*
 * Restartable one-shot deadline. Every `rearm` pushes the deadline out;
 * `poll` fires once the deadline has passed and then disarms, so a burst of
 * moves collapses into a single re-enable.
 */
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EffectDebounce {
    deadline: Option<Instant>,
}

impl EffectDebounce {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn rearm(&mut self, now: Instant, delay: Duration) {
        self.deadline = Some(now + delay);
    }

    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AppliedEffect {
    enabled: bool,
    is_dark: bool,
    accent: Color,
}

#[derive(Debug, Clone)]
pub struct BackdropController {
    use_mica: bool,
    config: FramelessConfig,
    applied: Option<AppliedEffect>,
}

impl BackdropController {
    pub fn new(use_mica: bool, config: &FramelessConfig) -> Self {
        Self {
            use_mica,
            config: config.clone(),
            applied: None,
        }
    }

    /// Mica survives window moves; Acrylic has to be suspended while dragging.
    pub fn uses_mica(&self) -> bool {
        self.use_mica
    }

    pub fn is_enabled(&self) -> bool {
        self.applied.is_some_and(|a| a.enabled)
    }

    /*
     * Applies or removes the effect for the given theme. Returns false without
     * touching the window when the same combination is already applied.
     * A failed OS call is logged and still recorded, so the next attempt is
     * driven by a real change rather than retried on every message.
     */
    pub fn set_effect(
        &mut self,
        enable: bool,
        theme: ThemeState,
        host: &impl BackdropEffects,
        handle: WindowHandle,
    ) -> bool {
        let next = AppliedEffect {
            enabled: enable,
            is_dark: theme.is_dark,
            accent: theme.accent,
        };
        if self.applied == Some(next) {
            return false;
        }

        let result = if !enable {
            host.remove_backdrop(handle)
        } else if self.use_mica {
            host.apply_mica(handle, theme.is_dark)
        } else {
            host.apply_acrylic(handle, self.config.acrylic_tint(theme.is_dark))
        };
        if let Err(e) = result {
            log::warn!("[Backdrop] Failed to update effect (enable={enable}): {e}");
        } else {
            log::debug!(
                "[Backdrop] Effect {} (mica={}, dark={})",
                if enable { "enabled" } else { "disabled" },
                self.use_mica,
                theme.is_dark
            );
        }

        self.applied = Some(next);
        host.request_repaint(handle);
        true
    }
}
