/*
 * Provides the public entry point for the framelessui crate: application-drawn
 * window chrome for Win32 top-level windows. The default frame is replaced by
 * a custom caption bar while native resize borders, moving, maximize/restore,
 * the auto-hide taskbar and the Windows 11 snap-layout flyout keep working.
 *
 * The non-client logic (hit-testing, NCCALCSIZE adjustment, caption bar state,
 * backdrop debounce) is portable and talks to the OS only through the
 * capability traits bundled as `router::HostWindow`. Conditional compilation
 * keeps these pieces available on every platform so non-Windows builds can
 * still compile and test them; the Win32 window class, window procedure, GDI
 * painting and DWM effects are compiled on Windows only.
 */
#[cfg(target_os = "windows")]
pub mod app;
pub mod caption_bar;
pub mod config;
#[cfg(target_os = "windows")]
pub(crate) mod controls;
pub mod effects;
pub mod error;
pub mod metrics;
pub mod monitor;
#[cfg(target_os = "windows")]
pub mod native_host;
pub mod router;
pub mod styling_primitives;
#[cfg(not(target_os = "windows"))]
pub(crate) mod system_theme_stub;
#[cfg(target_os = "windows")]
pub(crate) mod system_theme_windows;
#[cfg(not(target_os = "windows"))]
pub(crate) use system_theme_stub as system_theme;
#[cfg(target_os = "windows")]
pub(crate) use system_theme_windows as system_theme;
#[cfg(test)]
pub(crate) mod test_support;
pub mod theme;
pub mod types;
#[cfg(target_os = "windows")]
pub(crate) mod window_common;

#[cfg(target_os = "windows")]
pub use app::{FramelessApp, FramelessWindow};
pub use caption_bar::{CaptionBar, CaptionButtonKind, CaptionButtonState, PaintOp};
pub use config::FramelessConfig;
pub use error::{FramelessError, Result as FramelessResult};
pub use router::{HostWindow, NonClientRouter};
pub use styling_primitives::{Color, Rgba};
pub use theme::{ThemeProvider, ThemeSource, ThemeState};
pub use types::{HitTestCode, MessageOutcome, NativeMessage, WindowConfig, WindowHandle};
