/*
 * Win32 implementation of the capabilities the non-client router consumes.
 * Queries return `None` (or a neutral default) on failure and log the reason
 * at trace level; the message path never sees an error.
 *
 * All window commands are posted rather than sent. The router issues them
 * from inside the window procedure, and a synchronous SC_MOVE or ShowWindow
 * would re-enter it while the router is still borrowed.
 */

use crate::controls::backdrop_handler;
use crate::effects::{BackdropEffects, Clock};
use crate::error::Result;
use crate::metrics::{MetricsQuery, SystemMetric};
use crate::monitor::{AppBarState, DesktopQuery, MonitorInfo};
use crate::router::{ShowCommand, WindowCommands};
use crate::styling_primitives::Rgba;
use crate::types::{ScreenRect, ShowState, TaskbarPosition, WindowHandle};

use std::ffi::c_void;
use std::time::{Duration, Instant};

use windows::Wdk::System::SystemServices::RtlGetVersion;
use windows::Win32::{
    Foundation::{HWND, LPARAM, POINT, RECT, WPARAM},
    Graphics::Dwm::DwmIsCompositionEnabled,
    Graphics::Gdi::{
        ClientToScreen, GetMonitorInfoW, InvalidateRect, MONITOR_DEFAULTTONEAREST, MONITORINFO,
        MonitorFromWindow,
    },
    System::SystemInformation::OSVERSIONINFOW,
    UI::HiDpi::GetDpiForWindow,
    UI::Input::KeyboardAndMouse::ReleaseCapture,
    UI::Shell::{ABM_GETSTATE, APPBARDATA, SHAppBarMessage},
    UI::WindowsAndMessaging::{
        GetClientRect, GetSystemMetrics, GetWindowPlacement, GetWindowRect, HTCAPTION, KillTimer,
        PostMessageW, SC_MAXIMIZE, SC_MINIMIZE, SC_MOVE, SC_RESTORE, SM_CXPADDEDBORDER,
        SM_CXSIZEFRAME, SW_SHOWMAXIMIZED, SW_SHOWMINIMIZED, SetTimer, WINDOWPLACEMENT, WM_CLOSE,
        WM_SYSCOMMAND,
    },
};

// Not exported by windows-rs.
const ABM_GETAUTOHIDEBAREX: u32 = 0x0000_000B;
const USER_DEFAULT_SCREEN_DPI: f64 = 96.0;

pub(crate) fn to_hwnd(handle: WindowHandle) -> HWND {
    HWND(handle.0 as *mut c_void)
}

pub(crate) fn to_handle(hwnd: HWND) -> WindowHandle {
    WindowHandle(hwnd.0 as isize)
}

fn to_screen_rect(rect: &RECT) -> ScreenRect {
    ScreenRect::new(rect.left, rect.top, rect.right, rect.bottom)
}

pub(crate) fn to_rect(rect: &ScreenRect) -> RECT {
    RECT {
        left: rect.left,
        top: rect.top,
        right: rect.right,
        bottom: rect.bottom,
    }
}

/// Reads the real OS build number; `GetVersionEx` lies to unmanifested processes.
pub fn query_os_build() -> u32 {
    let mut info = OSVERSIONINFOW {
        dwOSVersionInfoSize: std::mem::size_of::<OSVERSIONINFOW>() as u32,
        ..Default::default()
    };
    let status = unsafe { RtlGetVersion(&mut info) };
    if status.is_ok() {
        info.dwBuildNumber
    } else {
        log::warn!("[Host] RtlGetVersion failed: {status:?}");
        0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Win32Host {
    os_build: u32,
}

impl Win32Host {
    pub fn new() -> Self {
        Self::with_os_build(query_os_build())
    }

    pub fn with_os_build(os_build: u32) -> Self {
        Self { os_build }
    }

    fn post_syscommand(&self, handle: WindowHandle, command: u32) {
        let param = WPARAM(command as usize);
        if let Err(e) = unsafe { PostMessageW(Some(to_hwnd(handle)), WM_SYSCOMMAND, param, LPARAM(0)) } {
            log::warn!("[Host] Posting WM_SYSCOMMAND {command:#x} failed: {e}");
        }
    }
}

impl Default for Win32Host {
    fn default() -> Self {
        Self::new()
    }
}

impl DesktopQuery for Win32Host {
    fn window_show_state(&self, handle: WindowHandle) -> Option<ShowState> {
        let mut placement = WINDOWPLACEMENT {
            length: std::mem::size_of::<WINDOWPLACEMENT>() as u32,
            ..Default::default()
        };
        if let Err(e) = unsafe { GetWindowPlacement(to_hwnd(handle), &mut placement) } {
            log::trace!("[Host] GetWindowPlacement failed: {e}");
            return None;
        }
        let state = match placement.showCmd {
            cmd if cmd == SW_SHOWMAXIMIZED.0 as u32 => ShowState::Maximized,
            cmd if cmd == SW_SHOWMINIMIZED.0 as u32 => ShowState::Minimized,
            _ => ShowState::Normal,
        };
        Some(state)
    }

    fn window_rect(&self, handle: WindowHandle) -> Option<ScreenRect> {
        let mut rect = RECT::default();
        unsafe { GetWindowRect(to_hwnd(handle), &mut rect) }.ok()?;
        Some(to_screen_rect(&rect))
    }

    fn client_rect(&self, handle: WindowHandle) -> Option<ScreenRect> {
        let hwnd = to_hwnd(handle);
        let mut rect = RECT::default();
        unsafe { GetClientRect(hwnd, &mut rect) }.ok()?;
        let mut origin = POINT { x: 0, y: 0 };
        if !unsafe { ClientToScreen(hwnd, &mut origin) }.as_bool() {
            return None;
        }
        Some(ScreenRect::from_origin_size(
            origin.x,
            origin.y,
            rect.right - rect.left,
            rect.bottom - rect.top,
        ))
    }

    fn monitor_info(&self, handle: WindowHandle) -> Option<MonitorInfo> {
        let monitor = unsafe { MonitorFromWindow(to_hwnd(handle), MONITOR_DEFAULTTONEAREST) };
        if monitor.is_invalid() {
            return None;
        }
        let mut info = MONITORINFO {
            cbSize: std::mem::size_of::<MONITORINFO>() as u32,
            ..Default::default()
        };
        if !unsafe { GetMonitorInfoW(monitor, &mut info) }.as_bool() {
            log::trace!("[Host] GetMonitorInfoW failed for {handle:?}");
            return None;
        }
        Some(MonitorInfo {
            monitor_rect: to_screen_rect(&info.rcMonitor),
        })
    }

    fn appbar_state(&self) -> Option<AppBarState> {
        let mut data = APPBARDATA {
            cbSize: std::mem::size_of::<APPBARDATA>() as u32,
            ..Default::default()
        };
        let state = unsafe { SHAppBarMessage(ABM_GETSTATE, &mut data) };
        Some(AppBarState(state as u32))
    }

    fn auto_hide_bar_on_edge(&self, monitor_rect: ScreenRect, edge: TaskbarPosition) -> bool {
        let Some(edge) = edge.appbar_edge() else {
            return false;
        };
        let mut data = APPBARDATA {
            cbSize: std::mem::size_of::<APPBARDATA>() as u32,
            uEdge: edge,
            rc: to_rect(&monitor_rect),
            ..Default::default()
        };
        unsafe { SHAppBarMessage(ABM_GETAUTOHIDEBAREX, &mut data) != 0 }
    }
}

impl MetricsQuery for Win32Host {
    fn system_metric(&self, metric: SystemMetric) -> i32 {
        let index = match metric {
            SystemMetric::SizeFrameX => SM_CXSIZEFRAME,
            SystemMetric::PaddedBorderX => SM_CXPADDEDBORDER,
        };
        unsafe { GetSystemMetrics(index) }
    }

    fn composition_enabled(&self) -> bool {
        unsafe { DwmIsCompositionEnabled() }
            .map(|enabled| enabled.as_bool())
            .unwrap_or(false)
    }

    fn device_pixel_ratio(&self, handle: WindowHandle) -> Option<f64> {
        match unsafe { GetDpiForWindow(to_hwnd(handle)) } {
            0 => None,
            dpi => Some(f64::from(dpi) / USER_DEFAULT_SCREEN_DPI),
        }
    }
}

impl BackdropEffects for Win32Host {
    fn enable_window_animation(&self, handle: WindowHandle) -> Result<()> {
        backdrop_handler::enable_window_animation(to_hwnd(handle))
    }

    fn apply_mica(&self, handle: WindowHandle, is_dark: bool) -> Result<()> {
        backdrop_handler::apply_mica(to_hwnd(handle), is_dark, self.os_build)
    }

    fn apply_acrylic(&self, handle: WindowHandle, tint: Rgba) -> Result<()> {
        backdrop_handler::apply_acrylic(to_hwnd(handle), tint)
    }

    fn remove_backdrop(&self, handle: WindowHandle) -> Result<()> {
        backdrop_handler::remove_backdrop(to_hwnd(handle))
    }

    fn enable_shadow(&self, handle: WindowHandle) -> Result<()> {
        backdrop_handler::enable_shadow(to_hwnd(handle))
    }

    fn enable_blur_behind(&self, handle: WindowHandle) -> Result<()> {
        backdrop_handler::enable_blur_behind(to_hwnd(handle))
    }

    fn request_repaint(&self, handle: WindowHandle) {
        let _ = unsafe { InvalidateRect(Some(to_hwnd(handle)), None, true) };
    }
}

impl WindowCommands for Win32Host {
    fn show(&self, handle: WindowHandle, command: ShowCommand) {
        let syscommand = match command {
            ShowCommand::Maximize => SC_MAXIMIZE,
            ShowCommand::Restore => SC_RESTORE,
            ShowCommand::Minimize => SC_MINIMIZE,
        };
        self.post_syscommand(handle, syscommand);
    }

    fn close(&self, handle: WindowHandle) {
        if let Err(e) = unsafe { PostMessageW(Some(to_hwnd(handle)), WM_CLOSE, WPARAM(0), LPARAM(0)) } {
            log::warn!("[Host] Posting WM_CLOSE failed: {e}");
        }
    }

    fn begin_system_move(&self, handle: WindowHandle) {
        let _ = unsafe { ReleaseCapture() };
        self.post_syscommand(handle, SC_MOVE | HTCAPTION);
    }

    fn invalidate(&self, handle: WindowHandle, rect: Option<ScreenRect>) {
        let rect = rect.map(|r| to_rect(&r));
        let ptr = rect.as_ref().map(|r| r as *const RECT);
        let _ = unsafe { InvalidateRect(Some(to_hwnd(handle)), ptr, false) };
    }

    fn arm_timer(&self, handle: WindowHandle, id: usize, delay: Duration) {
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        if unsafe { SetTimer(Some(to_hwnd(handle)), id, millis, None) } == 0 {
            log::warn!("[Host] SetTimer({id}) failed");
        }
    }

    fn kill_timer(&self, handle: WindowHandle, id: usize) {
        let _ = unsafe { KillTimer(Some(to_hwnd(handle)), id) };
    }

    fn os_build(&self) -> u32 {
        self.os_build
    }
}

impl Clock for Win32Host {
    fn now(&self) -> Instant {
        Instant::now()
    }
}
