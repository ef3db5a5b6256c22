/*
 * Theme source for non-Windows builds. There is no registry to read, so every
 * read fails and the provider keeps its defaults. This keeps the portable
 * modules compiling and testable off Windows.
 */
use crate::theme::ThemeSource;

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemThemeSource;

impl ThemeSource for SystemThemeSource {
    fn read_apps_use_light_theme(&self) -> Option<u32> {
        None
    }

    fn read_accent_color(&self) -> Option<u32> {
        None
    }
}
