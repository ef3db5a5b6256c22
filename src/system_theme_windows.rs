/*
 * Reads the desktop theme from the current user's registry hive. Both values
 * are plain DWORDs; any failure is reported as `None` so the theme provider
 * keeps its previous state.
 */
use crate::theme::ThemeSource;

use windows::Win32::{
    Foundation::ERROR_SUCCESS,
    System::Registry::{HKEY_CURRENT_USER, RRF_RT_REG_DWORD, RegGetValueW},
};
use windows::core::{PCWSTR, w};

const PERSONALIZE_KEY: PCWSTR = w!("Software\\Microsoft\\Windows\\CurrentVersion\\Themes\\Personalize");
const APPS_USE_LIGHT_THEME: PCWSTR = w!("AppsUseLightTheme");
const ACCENT_KEY: PCWSTR = w!("Software\\Microsoft\\Windows\\CurrentVersion\\Explorer\\Accent");
const ACCENT_COLOR_MENU: PCWSTR = w!("AccentColorMenu");

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemThemeSource;

fn read_dword(subkey: PCWSTR, value: PCWSTR) -> Option<u32> {
    let mut data: u32 = 0;
    let mut size = std::mem::size_of::<u32>() as u32;
    let status = unsafe {
        RegGetValueW(
            HKEY_CURRENT_USER,
            subkey,
            value,
            RRF_RT_REG_DWORD,
            None,
            Some(&mut data as *mut u32 as *mut std::ffi::c_void),
            Some(&mut size),
        )
    };
    if status == ERROR_SUCCESS {
        Some(data)
    } else {
        log::debug!("[Theme] RegGetValueW failed: {status:?}");
        None
    }
}

/// The shell stores the accent as `0xAABBGGRR`; swap red and blue to get ARGB.
pub(crate) fn abgr_to_argb(abgr: u32) -> u32 {
    (abgr & 0xFF00_FF00) | ((abgr & 0xFF) << 16) | ((abgr >> 16) & 0xFF)
}

impl ThemeSource for SystemThemeSource {
    fn read_apps_use_light_theme(&self) -> Option<u32> {
        read_dword(PERSONALIZE_KEY, APPS_USE_LIGHT_THEME)
    }

    fn read_accent_color(&self) -> Option<u32> {
        read_dword(ACCENT_KEY, ACCENT_COLOR_MENU).map(abgr_to_argb)
    }
}
