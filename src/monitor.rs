/*
 * Monitor and taskbar inspection for a top-level window. The OS queries sit
 * behind `DesktopQuery` so the decisions built on them (maximized, full
 * screen, auto-hide taskbar edge) can be exercised without a real desktop.
 *
 * Every function here answers with a safe default when a query is unavailable:
 * not maximized, not full screen, no auto-hide, no taskbar position. Nothing
 * is cached; the taskbar may move or change mode between two messages.
 */
use crate::types::{ScreenRect, ShowState, TaskbarPosition, WindowHandle};

/// Pixels left uncovered along an auto-hide taskbar edge so it can still be summoned.
pub const AUTO_HIDE_THICKNESS: i32 = 2;

const ABS_AUTOHIDE: u32 = 0x1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorInfo {
    pub monitor_rect: ScreenRect,
}

/// Raw `ABM_GETSTATE` answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AppBarState(pub u32);

impl AppBarState {
    pub fn is_auto_hide(&self) -> bool {
        self.0 & ABS_AUTOHIDE != 0
    }
}

pub trait DesktopQuery {
    fn window_show_state(&self, handle: WindowHandle) -> Option<ShowState>;
    fn window_rect(&self, handle: WindowHandle) -> Option<ScreenRect>;
    /// Client area in screen coordinates.
    fn client_rect(&self, handle: WindowHandle) -> Option<ScreenRect>;
    /// Monitor the window is on, or the nearest one when it is on none.
    fn monitor_info(&self, handle: WindowHandle) -> Option<MonitorInfo>;
    /// `None` when the shell appbar API is unavailable.
    fn appbar_state(&self) -> Option<AppBarState>;
    /// Whether an auto-hide appbar is registered on `edge` of the given monitor.
    fn auto_hide_bar_on_edge(&self, monitor_rect: ScreenRect, edge: TaskbarPosition) -> bool;
}

pub fn is_maximized(query: &impl DesktopQuery, handle: WindowHandle) -> bool {
    if handle.is_null() {
        return false;
    }
    query.window_show_state(handle) == Some(ShowState::Maximized)
}

pub fn monitor_info(query: &impl DesktopQuery, handle: WindowHandle) -> Option<MonitorInfo> {
    if handle.is_null() {
        return None;
    }
    query.monitor_info(handle)
}

/*
 * A window is full screen when its bounding rectangle is exactly its
 * monitor's rectangle. Either rectangle missing means "not full screen".
 */
pub fn is_full_screen(query: &impl DesktopQuery, handle: WindowHandle) -> bool {
    if handle.is_null() {
        return false;
    }
    let Some(window_rect) = query.window_rect(handle) else {
        return false;
    };
    let Some(info) = monitor_info(query, handle) else {
        return false;
    };
    window_rect == info.monitor_rect
}

pub fn taskbar_auto_hide(query: &impl DesktopQuery) -> bool {
    query
        .appbar_state()
        .map(|state| state.is_auto_hide())
        .unwrap_or(false)
}

pub fn taskbar_position(query: &impl DesktopQuery, handle: WindowHandle) -> TaskbarPosition {
    let Some(info) = monitor_info(query, handle) else {
        return TaskbarPosition::None;
    };
    TaskbarPosition::PROBE_ORDER
        .into_iter()
        .find(|&edge| query.auto_hide_bar_on_edge(info.monitor_rect, edge))
        .unwrap_or(TaskbarPosition::None)
}
