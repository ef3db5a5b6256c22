/*
 * Public Win32 entry point. `FramelessApp` owns the process-wide pieces (module
 * instance, window class, shared theme provider) and the message loop;
 * `FramelessWindow` is a thin handle to one frameless top-level window whose
 * state lives inside the window itself.
 */
use crate::config::FramelessConfig;
use crate::error::{FramelessError, Result};
use crate::native_host::{Win32Host, to_handle};
use crate::router::NonClientRouter;
use crate::theme::ThemeProvider;
use crate::types::{WindowConfig, WindowHandle};
use crate::window_common::{self, FramelessWindowState};

use std::rc::Rc;

use windows::Win32::{
    Foundation::{GetLastError, HINSTANCE, HWND},
    System::LibraryLoader::GetModuleHandleW,
    UI::WindowsAndMessaging::{
        DestroyWindow, DispatchMessageW, GetMessageW, HICON, MSG, SW_SHOW, SetWindowTextW,
        ShowWindow, TranslateMessage,
    },
};
use windows::core::HSTRING;

pub struct FramelessApp {
    h_instance: HINSTANCE,
    theme: Rc<ThemeProvider>,
}

impl FramelessApp {
    /// Uses the system theme source (registry backed).
    pub fn new() -> Result<Self> {
        Self::with_theme(Rc::new(ThemeProvider::system()))
    }

    pub fn with_theme(theme: Rc<ThemeProvider>) -> Result<Self> {
        let h_instance: HINSTANCE = unsafe { GetModuleHandleW(None)? }.into();
        window_common::allow_dark_system_menus();
        window_common::register_window_class(h_instance)?;
        log::debug!("[App] Initialized with theme {:?}", theme.current());
        Ok(Self { h_instance, theme })
    }

    pub fn theme(&self) -> &Rc<ThemeProvider> {
        &self.theme
    }

    /*
     * Creates a hidden frameless window. The router is built and validated
     * here so a bad `chrome` config fails before any native window exists.
     */
    pub fn create_window(
        &self,
        config: &WindowConfig,
        chrome: FramelessConfig,
    ) -> Result<FramelessWindow> {
        let mut router = NonClientRouter::new(Win32Host::new(), Rc::clone(&self.theme), chrome)?;
        router.caption_bar_mut().set_title(&config.title);
        let state = Box::new(FramelessWindowState::new(router));
        let hwnd = window_common::create_native_window(self.h_instance, config, state)?;
        Ok(FramelessWindow { hwnd })
    }

    /*
     * Runs the message loop until WM_QUIT and returns its exit code. WM_QUIT
     * is posted once the last frameless window has been destroyed.
     */
    pub fn run(&self) -> Result<i32> {
        let mut msg = MSG::default();
        loop {
            let status = unsafe { GetMessageW(&mut msg, None, 0, 0) };
            match status.0 {
                0 => break,
                -1 => {
                    let error = unsafe { GetLastError() };
                    log::error!("[App] GetMessageW failed: {error:?}");
                    return Err(FramelessError::OperationFailed(format!(
                        "GetMessageW failed: {error:?}"
                    )));
                }
                _ => unsafe {
                    let _ = TranslateMessage(&msg);
                    DispatchMessageW(&msg);
                },
            }
        }
        log::debug!("[App] Message loop exited with code {}", msg.wParam.0);
        Ok(msg.wParam.0 as i32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramelessWindow {
    hwnd: HWND,
}

impl FramelessWindow {
    pub fn handle(&self) -> WindowHandle {
        to_handle(self.hwnd)
    }

    fn state(&self) -> Result<&FramelessWindowState> {
        window_common::window_state(self.hwnd).ok_or_else(|| {
            FramelessError::InvalidHandle(format!("{:?} is not a live frameless window", self.hwnd))
        })
    }

    pub fn show(&self) {
        let _ = unsafe { ShowWindow(self.hwnd, SW_SHOW) };
    }

    /// Sets both the native window text (taskbar, Alt+Tab) and the caption bar title.
    pub fn set_title(&self, title: &str) -> Result<()> {
        unsafe { SetWindowTextW(self.hwnd, &HSTRING::from(title))? };
        let handle = self.handle();
        self.state()?
            .with_router(|router| router.set_title(handle, title))
            .ok_or_else(|| FramelessError::OperationFailed("window is busy".into()))
    }

    /*
     * Shows `icon` in the caption bar, or reserves the narrow slot again when
     * `None`. The caller keeps ownership of the icon and must keep it alive
     * while the window uses it.
     */
    pub fn set_icon(&self, icon: Option<HICON>) -> Result<()> {
        let handle = self.handle();
        let state = self.state()?;
        state.set_icon(icon);
        state
            .with_router(|router| router.set_icon_present(handle, icon.is_some()))
            .ok_or_else(|| FramelessError::OperationFailed("window is busy".into()))
    }

    /// Whether the backdrop effect is currently applied (it is suspended while moving).
    pub fn effect_enabled(&self) -> Result<bool> {
        let state = self.state()?;
        state
            .with_router(|router| router.effect_enabled())
            .ok_or_else(|| FramelessError::OperationFailed("window is busy".into()))
    }

    pub fn destroy(self) -> Result<()> {
        unsafe { DestroyWindow(self.hwnd)? };
        Ok(())
    }
}
