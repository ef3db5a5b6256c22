/*
 * DWM backdrop effects for a frameless top-level window.
 *
 * Mica is requested through documented DWM window attributes. Acrylic has no
 * public API on Windows 10; it is set through the accent policy of the
 * undocumented `SetWindowCompositionAttribute` export of user32, which is
 * resolved once by name and skipped when missing.
 */

use crate::error::{FramelessError, Result};
use crate::styling_primitives::Rgba;

use std::ffi::c_void;
use std::sync::OnceLock;

use windows::Win32::{
    Foundation::HWND,
    Graphics::Dwm::{
        DWM_BB_BLURREGION, DWM_BB_ENABLE, DWM_BLURBEHIND, DWMWINDOWATTRIBUTE,
        DwmEnableBlurBehindWindow, DwmExtendFrameIntoClientArea, DwmSetWindowAttribute,
    },
    Graphics::Gdi::{CreateRectRgn, DeleteObject},
    System::LibraryLoader::{GetProcAddress, LoadLibraryW},
    UI::Controls::MARGINS,
    UI::WindowsAndMessaging::{
        GWL_STYLE, GetWindowLongPtrW, SetWindowLongPtrW, WS_CAPTION, WS_MAXIMIZEBOX,
        WS_MINIMIZEBOX, WS_THICKFRAME,
    },
};
use windows::core::{BOOL, s, w};

const DWMWA_USE_IMMERSIVE_DARK_MODE: DWMWINDOWATTRIBUTE = DWMWINDOWATTRIBUTE(20);
const DWMWA_SYSTEMBACKDROP_TYPE: DWMWINDOWATTRIBUTE = DWMWINDOWATTRIBUTE(38);
// Pre-release attribute used by 22000 builds before the backdrop type existed.
const DWMWA_MICA_EFFECT: DWMWINDOWATTRIBUTE = DWMWINDOWATTRIBUTE(1029);
const DWMSBT_MAINWINDOW: i32 = 2;
const SYSTEMBACKDROP_MIN_BUILD: u32 = 22523;

const WCA_ACCENT_POLICY: u32 = 19;
const ACCENT_DISABLED: u32 = 0;
const ACCENT_ENABLE_ACRYLICBLURBEHIND: u32 = 4;
// Draw all four borders of the accent.
const ACCENT_FLAGS_ALL_BORDERS: u32 = 0x20 | 0x40 | 0x80 | 0x100;

#[repr(C)]
struct AccentPolicy {
    accent_state: u32,
    accent_flags: u32,
    gradient_color: u32,
    animation_id: u32,
}

#[repr(C)]
struct WindowCompositionAttribData {
    attribute: u32,
    data: *mut c_void,
    size_of_data: usize,
}

type SetWindowCompositionAttributeFn =
    unsafe extern "system" fn(HWND, *mut WindowCompositionAttribData) -> BOOL;

fn set_window_composition_attribute() -> Option<SetWindowCompositionAttributeFn> {
    static PROC: OnceLock<Option<SetWindowCompositionAttributeFn>> = OnceLock::new();
    *PROC.get_or_init(|| unsafe {
        let module = match LoadLibraryW(w!("user32.dll")) {
            Ok(module) => module,
            Err(err) => {
                log::debug!("[Backdrop] Failed to load user32.dll: {err:?}");
                return None;
            }
        };
        let proc = GetProcAddress(module, s!("SetWindowCompositionAttribute"));
        if proc.is_none() {
            log::debug!("[Backdrop] SetWindowCompositionAttribute is not exported");
        }
        proc.map(|func| {
            std::mem::transmute::<unsafe extern "system" fn() -> isize, SetWindowCompositionAttributeFn>(
                func,
            )
        })
    })
}

fn set_dword_attribute(hwnd: HWND, attribute: DWMWINDOWATTRIBUTE, value: i32) -> Result<()> {
    unsafe {
        DwmSetWindowAttribute(
            hwnd,
            attribute,
            &value as *const i32 as *const c_void,
            std::mem::size_of::<i32>() as u32,
        )?;
    }
    Ok(())
}

fn extend_frame_into_client_area(hwnd: HWND) -> Result<()> {
    let margins = MARGINS {
        cxLeftWidth: -1,
        cxRightWidth: -1,
        cyTopHeight: -1,
        cyBottomHeight: -1,
    };
    unsafe { DwmExtendFrameIntoClientArea(hwnd, &margins)? };
    Ok(())
}

fn set_accent(hwnd: HWND, accent_state: u32, accent_flags: u32, gradient_color: u32) -> Result<()> {
    let Some(set_attribute) = set_window_composition_attribute() else {
        return Err(FramelessError::OperationFailed(
            "SetWindowCompositionAttribute unavailable".into(),
        ));
    };
    let mut policy = AccentPolicy {
        accent_state,
        accent_flags,
        gradient_color,
        animation_id: 0,
    };
    let mut data = WindowCompositionAttribData {
        attribute: WCA_ACCENT_POLICY,
        data: &mut policy as *mut AccentPolicy as *mut c_void,
        size_of_data: std::mem::size_of::<AccentPolicy>(),
    };
    let ok = unsafe { set_attribute(hwnd, &mut data) };
    if ok.as_bool() {
        Ok(())
    } else {
        Err(FramelessError::OperationFailed(format!(
            "SetWindowCompositionAttribute rejected accent state {accent_state}"
        )))
    }
}

/*
 * A borderless style drops the caption and frame bits, and with them the
 * minimize/maximize animations. Adding them back is safe because the
 * NCCALCSIZE handler claims the whole window as client area.
 */
pub(crate) fn enable_window_animation(hwnd: HWND) -> Result<()> {
    unsafe {
        let style = GetWindowLongPtrW(hwnd, GWL_STYLE);
        let wanted = (WS_MINIMIZEBOX.0 | WS_MAXIMIZEBOX.0 | WS_CAPTION.0 | WS_THICKFRAME.0) as isize;
        SetWindowLongPtrW(hwnd, GWL_STYLE, style | wanted);
    }
    Ok(())
}

pub(crate) fn apply_mica(hwnd: HWND, is_dark: bool, os_build: u32) -> Result<()> {
    extend_frame_into_client_area(hwnd)?;
    set_dword_attribute(hwnd, DWMWA_USE_IMMERSIVE_DARK_MODE, i32::from(is_dark))?;
    if os_build >= SYSTEMBACKDROP_MIN_BUILD {
        set_dword_attribute(hwnd, DWMWA_SYSTEMBACKDROP_TYPE, DWMSBT_MAINWINDOW)
    } else {
        set_dword_attribute(hwnd, DWMWA_MICA_EFFECT, 1)
    }
}

pub(crate) fn apply_acrylic(hwnd: HWND, tint: Rgba) -> Result<()> {
    set_accent(
        hwnd,
        ACCENT_ENABLE_ACRYLICBLURBEHIND,
        ACCENT_FLAGS_ALL_BORDERS,
        tint.to_abgr(),
    )
}

pub(crate) fn remove_backdrop(hwnd: HWND) -> Result<()> {
    set_accent(hwnd, ACCENT_DISABLED, 0, 0)
}

pub(crate) fn enable_shadow(hwnd: HWND) -> Result<()> {
    extend_frame_into_client_area(hwnd)
}

pub(crate) fn enable_blur_behind(hwnd: HWND) -> Result<()> {
    unsafe {
        // An empty region blurs nothing but keeps the window in the blur-behind path.
        let region = CreateRectRgn(0, 0, -1, -1);
        let blur = DWM_BLURBEHIND {
            dwFlags: DWM_BB_ENABLE | DWM_BB_BLURREGION,
            fEnable: true.into(),
            hRgnBlur: region,
            fTransitionOnMaximized: false.into(),
        };
        let result = DwmEnableBlurBehindWindow(hwnd, &blur);
        let _ = DeleteObject(region.into());
        result?;
    }
    Ok(())
}
