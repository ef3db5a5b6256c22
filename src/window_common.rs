/*
 * This module provides the Win32 windowing plumbing for frameless windows:
 * window class registration, native window creation and the window procedure
 * (WndProc). Per-window state lives in `FramelessWindowState`, boxed into
 * GWLP_USERDATA at WM_NCCREATE and released at WM_NCDESTROY.
 *
 * The window procedure decodes messages into `NativeMessage` values and hands
 * them to the window's `NonClientRouter`; painting executes the router's
 * caption bar plan through `controls::caption_painter`.
 */
use crate::controls::caption_painter;
use crate::controls::styling_handler::color_to_colorref;
use crate::error::{FramelessError, Result};
use crate::native_host::{Win32Host, to_handle};
use crate::router::NonClientRouter;
use crate::styling_primitives::Color;
use crate::types::{self, NativeMessage, ScreenRect, WindowConfig};

use windows::core::{HSTRING, PCSTR, w};
use windows::Win32::{
    Foundation::{GetLastError, HINSTANCE, HMODULE, HWND, LPARAM, LRESULT, RECT, WPARAM},
    Graphics::Gdi::{
        BLACK_BRUSH, BeginPaint, CreateSolidBrush, DeleteObject, EndPaint, FillRect, GetStockObject,
        HBRUSH, PAINTSTRUCT,
    },
    System::LibraryLoader::{GetProcAddress, LoadLibraryW},
    UI::Input::KeyboardAndMouse::{TME_LEAVE, TME_NONCLIENT, TRACKMOUSEEVENT, TrackMouseEvent},
    UI::WindowsAndMessaging::{
        CREATESTRUCTW, CS_DBLCLKS, CS_HREDRAW, CS_VREDRAW, CW_USEDEFAULT, CreateWindowExW,
        DefWindowProcW, GWLP_USERDATA, GetClientRect, GetClassInfoExW, GetWindowLongPtrW, HICON,
        IDC_ARROW, IDI_APPLICATION, LoadCursorW, LoadIconW, MINMAXINFO, NCCALCSIZE_PARAMS,
        PostQuitMessage, RegisterClassExW, SetWindowLongPtrW, WINDOW_EX_STYLE, WM_CREATE,
        WM_DESTROY, WM_ERASEBKGND, WM_GETMINMAXINFO, WM_MOUSEMOVE, WM_NCCREATE,
        WM_NCDESTROY, WM_NCMOUSEMOVE, WM_PAINT, WNDCLASSEXW, WS_CLIPCHILDREN, WS_OVERLAPPEDWINDOW,
    },
};

use std::cell::{Cell, RefCell};
use std::ffi::c_void;
use std::sync::OnceLock;

pub(crate) const CLASS_NAME: &str = "FramelessUI_WindowClass";

const HANDLED: LRESULT = LRESULT(0);
const MIN_TRACK_WIDTH: i32 = 300;
const MIN_TRACK_HEIGHT: i32 = 200;

// Caption fills are flattened against these while a backdrop shows through.
const BACKDROP_BASE_DARK: Color = Color::rgb(0x20, 0x20, 0x20);
const BACKDROP_BASE_LIGHT: Color = Color::rgb(0xF3, 0xF3, 0xF3);

/*
 * Frameless windows alive on this UI thread. The message loop ends when the
 * last one is destroyed, not when the first one is.
 */
#[derive(Debug, Default)]
pub(crate) struct LiveWindows {
    count: Cell<usize>,
}

impl LiveWindows {
    pub(crate) const fn new() -> Self {
        Self {
            count: Cell::new(0),
        }
    }

    pub(crate) fn opened(&self) {
        self.count.set(self.count.get() + 1);
    }

    /// Returns true when the closed window was the last one.
    pub(crate) fn closed(&self) -> bool {
        let remaining = self.count.get().saturating_sub(1);
        self.count.set(remaining);
        remaining == 0
    }

    pub(crate) fn count(&self) -> usize {
        self.count.get()
    }
}

thread_local! {
    static LIVE_WINDOWS: LiveWindows = const { LiveWindows::new() };
}

/*
 * Native state of one frameless window. The router sits in a RefCell: the
 * window procedure can be re-entered by calls made while it is borrowed, and
 * such nested messages fall back to default processing.
 */
pub(crate) struct FramelessWindowState {
    router: RefCell<NonClientRouter<Win32Host>>,
    client_tracking: Cell<bool>,
    nonclient_tracking: Cell<bool>,
    icon: Cell<Option<HICON>>,
}

impl FramelessWindowState {
    pub(crate) fn new(router: NonClientRouter<Win32Host>) -> Self {
        Self {
            router: RefCell::new(router),
            client_tracking: Cell::new(false),
            nonclient_tracking: Cell::new(false),
            icon: Cell::new(None),
        }
    }

    pub(crate) fn with_router<R>(
        &self,
        f: impl FnOnce(&mut NonClientRouter<Win32Host>) -> R,
    ) -> Option<R> {
        match self.router.try_borrow_mut() {
            Ok(mut router) => Some(f(&mut router)),
            Err(_) => {
                log::trace!("[Window] Router busy; message handled by default processing");
                None
            }
        }
    }

    pub(crate) fn set_icon(&self, icon: Option<HICON>) {
        self.icon.set(icon);
    }
}

/*
 * Registers the frameless window class if not already registered.
 * CS_DBLCLKS is required for double-click-to-maximize on the caption bar.
 */
pub(crate) fn register_window_class(h_instance: HINSTANCE) -> Result<()> {
    let class_name = HSTRING::from(CLASS_NAME);

    unsafe {
        let mut wc_test = WNDCLASSEXW::default();
        if GetClassInfoExW(Some(h_instance), &class_name, &mut wc_test).is_ok() {
            log::debug!("[Window] Window class '{CLASS_NAME}' already registered.");
            return Ok(());
        }

        let wc = WNDCLASSEXW {
            cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
            style: CS_HREDRAW | CS_VREDRAW | CS_DBLCLKS,
            lpfnWndProc: Some(facade_wnd_proc_router),
            cbClsExtra: 0,
            cbWndExtra: 0,
            hInstance: h_instance,
            hIcon: LoadIconW(None, IDI_APPLICATION)?,
            hCursor: LoadCursorW(None, IDC_ARROW)?,
            hbrBackground: HBRUSH(GetStockObject(BLACK_BRUSH).0),
            lpszMenuName: windows::core::PCWSTR::null(),
            lpszClassName: windows::core::PCWSTR(class_name.as_ptr()),
            hIconSm: LoadIconW(None, IDI_APPLICATION)?,
        };

        if RegisterClassExW(&wc) == 0 {
            let error = GetLastError();
            log::error!("[Window] RegisterClassExW failed: {error:?}");
            Err(FramelessError::InitializationFailed(format!(
                "RegisterClassExW failed: {error:?}"
            )))
        } else {
            log::debug!("[Window] Window class '{CLASS_NAME}' registered successfully.");
            Ok(())
        }
    }
}

/*
 * Creates the native window and hands it `state` through `lpCreateParams`.
 * From WM_NCCREATE on the window owns the state; WM_NCDESTROY drops it.
 */
pub(crate) fn create_native_window(
    h_instance: HINSTANCE,
    config: &WindowConfig,
    state: Box<FramelessWindowState>,
) -> Result<HWND> {
    let class_name = HSTRING::from(CLASS_NAME);
    let state_ptr = Box::into_raw(state);

    let hwnd = unsafe {
        CreateWindowExW(
            WINDOW_EX_STYLE(0),
            &class_name,
            &HSTRING::from(config.title.as_str()),
            WS_OVERLAPPEDWINDOW | WS_CLIPCHILDREN,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            config.width,
            config.height,
            None,
            None,
            Some(h_instance),
            Some(state_ptr as *const c_void),
        )
    };
    match hwnd {
        Ok(hwnd) => {
            log::debug!("[Window] Created frameless window {hwnd:?} '{}'", config.title);
            Ok(hwnd)
        }
        Err(e) => {
            log::error!("[Window] CreateWindowExW failed: {e}");
            Err(e.into())
        }
    }
}

/// Returns the state attached to `hwnd`, if the window is one of ours and still alive.
pub(crate) fn window_state<'a>(hwnd: HWND) -> Option<&'a FramelessWindowState> {
    let ptr = unsafe { GetWindowLongPtrW(hwnd, GWLP_USERDATA) } as *const FramelessWindowState;
    if ptr.is_null() {
        None
    } else {
        Some(unsafe { &*ptr })
    }
}

/*
 * Main window procedure router. Stores the state pointer at WM_NCCREATE,
 * dispatches every later message and frees the state at WM_NCDESTROY.
 */
unsafe extern "system" fn facade_wnd_proc_router(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let state_ptr = if msg == WM_NCCREATE {
        let create_struct = unsafe { &*(lparam.0 as *const CREATESTRUCTW) };
        let raw = create_struct.lpCreateParams as *mut FramelessWindowState;
        unsafe { SetWindowLongPtrW(hwnd, GWLP_USERDATA, raw as isize) };
        if !raw.is_null() {
            LIVE_WINDOWS.with(LiveWindows::opened);
        }
        raw
    } else {
        unsafe { GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *mut FramelessWindowState }
    };

    if state_ptr.is_null() {
        return unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) };
    }

    let result = {
        let state = unsafe { &*state_ptr };
        handle_window_message(state, hwnd, msg, wparam, lparam)
    };

    if msg == WM_NCDESTROY {
        unsafe { SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0) };
        let _ = unsafe { Box::from_raw(state_ptr) };
        log::debug!("[Window] State for {hwnd:?} released.");
    }
    result
}

fn handle_window_message(
    state: &FramelessWindowState,
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let handle = to_handle(hwnd);
    match msg {
        WM_CREATE => {
            state.with_router(|router| router.initialize(handle));
            return unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) };
        }
        WM_ERASEBKGND => return LRESULT(1),
        WM_PAINT => return handle_wm_paint(state, hwnd),
        WM_GETMINMAXINFO => return handle_wm_getminmaxinfo(lparam),
        WM_DESTROY => {
            if LIVE_WINDOWS.with(LiveWindows::closed) {
                log::debug!("[Window] Last window {hwnd:?} destroyed; leaving message loop.");
                unsafe { PostQuitMessage(0) };
            } else {
                log::debug!(
                    "[Window] WM_DESTROY for {hwnd:?}; {} window(s) still open.",
                    LIVE_WINDOWS.with(LiveWindows::count)
                );
            }
            return HANDLED;
        }
        WM_MOUSEMOVE => track_mouse_leave(hwnd, &state.client_tracking, false),
        WM_NCMOUSEMOVE => track_mouse_leave(hwnd, &state.nonclient_tracking, true),
        types::WM_MOUSELEAVE => state.client_tracking.set(false),
        types::WM_NCMOUSELEAVE => state.nonclient_tracking.set(false),
        _ => {}
    }

    let message = NativeMessage::decode(msg, wparam.0, lparam.0, || unsafe {
        read_calc_size_rect(wparam, lparam)
    });
    if let NativeMessage::Other(_) = message {
        return unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) };
    }

    let Some(outcome) = state.with_router(|router| router.handle(handle, &message)) else {
        return unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) };
    };
    if !outcome.consumed {
        return unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) };
    }
    if let Some(rect) = outcome.client_rect {
        unsafe { write_calc_size_rect(wparam, lparam, &rect) };
    }
    LRESULT(outcome.result)
}

/*
 * WM_NCCALCSIZE carries either NCCALCSIZE_PARAMS (wparam != 0), whose first
 * rectangle is the proposed window rect, or a bare RECT.
 */
unsafe fn calc_size_rect_ptr(wparam: WPARAM, lparam: LPARAM) -> *mut RECT {
    if lparam.0 == 0 {
        return std::ptr::null_mut();
    }
    if wparam.0 != 0 {
        let params = lparam.0 as *mut NCCALCSIZE_PARAMS;
        unsafe { &mut (*params).rgrc[0] as *mut RECT }
    } else {
        lparam.0 as *mut RECT
    }
}

pub(crate) unsafe fn read_calc_size_rect(wparam: WPARAM, lparam: LPARAM) -> Option<ScreenRect> {
    let ptr = unsafe { calc_size_rect_ptr(wparam, lparam) };
    if ptr.is_null() {
        return None;
    }
    let rect = unsafe { &*ptr };
    Some(ScreenRect::new(rect.left, rect.top, rect.right, rect.bottom))
}

pub(crate) unsafe fn write_calc_size_rect(wparam: WPARAM, lparam: LPARAM, rect: &ScreenRect) {
    let ptr = unsafe { calc_size_rect_ptr(wparam, lparam) };
    if ptr.is_null() {
        return;
    }
    let target = unsafe { &mut *ptr };
    target.left = rect.left;
    target.top = rect.top;
    target.right = rect.right;
    target.bottom = rect.bottom;
}

// Requests WM_MOUSELEAVE / WM_NCMOUSELEAVE once per hover.
fn track_mouse_leave(hwnd: HWND, tracking: &Cell<bool>, nonclient: bool) {
    if tracking.get() {
        return;
    }
    let flags = if nonclient {
        TME_LEAVE | TME_NONCLIENT
    } else {
        TME_LEAVE
    };
    let mut tme = TRACKMOUSEEVENT {
        cbSize: std::mem::size_of::<TRACKMOUSEEVENT>() as u32,
        dwFlags: flags,
        hwndTrack: hwnd,
        dwHoverTime: 0,
    };
    if unsafe { TrackMouseEvent(&mut tme) }.is_ok() {
        tracking.set(true);
    }
}

/*
 * Paints the window background and the caption bar. While a backdrop effect
 * is active the client is filled black, which DWM renders as fully
 * transparent over the extended frame.
 */
fn handle_wm_paint(state: &FramelessWindowState, hwnd: HWND) -> LRESULT {
    let handle = to_handle(hwnd);
    let Some((background, ops, is_dark, ratio)) = state.with_router(|router| {
        let ratio = router.device_pixel_ratio(handle);
        (
            router.background(),
            router.paint_ops(handle),
            router.theme().is_dark,
            ratio,
        )
    }) else {
        return unsafe { DefWindowProcW(hwnd, WM_PAINT, WPARAM(0), LPARAM(0)) };
    };

    unsafe {
        let mut ps = PAINTSTRUCT::default();
        let hdc = BeginPaint(hwnd, &mut ps);
        if !hdc.is_invalid() {
            let mut client = RECT::default();
            let _ = GetClientRect(hwnd, &mut client);

            let (fill, base) = if background.is_transparent() {
                let base = if is_dark {
                    BACKDROP_BASE_DARK
                } else {
                    BACKDROP_BASE_LIGHT
                };
                (Color::BLACK, base)
            } else {
                (background.rgb(), background.rgb())
            };
            let brush = CreateSolidBrush(color_to_colorref(&fill));
            FillRect(hdc, &client, brush);
            let _ = DeleteObject(brush.into());

            caption_painter::paint_caption(hdc, &ops, base, state.icon.get(), ratio);
            let _ = EndPaint(hwnd, &ps);
        }
    }
    HANDLED
}

/*
 * Handles WM_GETMINMAXINFO: keeps the window wide enough for the caption
 * buttons and a sliver of title.
 */
fn handle_wm_getminmaxinfo(lparam: LPARAM) -> LRESULT {
    if lparam.0 != 0 {
        let mmi = unsafe { &mut *(lparam.0 as *mut MINMAXINFO) };
        mmi.ptMinTrackSize.x = MIN_TRACK_WIDTH;
        mmi.ptMinTrackSize.y = MIN_TRACK_HEIGHT;
    }
    HANDLED
}

// uxtheme exports these by ordinal only.
const ORDINAL_SET_PREFERRED_APP_MODE: u16 = 135;
const ORDINAL_FLUSH_MENU_THEMES: u16 = 136;
const APP_MODE_ALLOW_DARK: i32 = 1;

type SetAppModeProc = unsafe extern "system" fn(i32) -> i32;
type FlushMenusProc = unsafe extern "system" fn();

fn uxtheme_export(uxtheme: HMODULE, ordinal: u16) -> Option<unsafe extern "system" fn() -> isize> {
    unsafe { GetProcAddress(uxtheme, PCSTR(usize::from(ordinal) as *const u8)) }
}

/// Lets the system menu (Alt+Space) follow the dark theme. Runs once per process.
pub(crate) fn allow_dark_system_menus() {
    static DONE: OnceLock<bool> = OnceLock::new();
    DONE.get_or_init(|| {
        let uxtheme = match unsafe { LoadLibraryW(w!("uxtheme.dll")) } {
            Ok(module) => module,
            Err(e) => {
                log::debug!("[Window] uxtheme.dll unavailable, menus stay light: {e}");
                return false;
            }
        };
        let Some(set_mode) = uxtheme_export(uxtheme, ORDINAL_SET_PREFERRED_APP_MODE) else {
            return false;
        };
        unsafe {
            let set_mode = std::mem::transmute::<_, SetAppModeProc>(set_mode);
            set_mode(APP_MODE_ALLOW_DARK);
            if let Some(flush) = uxtheme_export(uxtheme, ORDINAL_FLUSH_MENU_THEMES) {
                std::mem::transmute::<_, FlushMenusProc>(flush)();
            }
        }
        log::debug!("[Window] Dark system menus allowed.");
        true
    });
}
