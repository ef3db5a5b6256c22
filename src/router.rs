/*
 * Non-client message routing for a frameless top-level window.
 *
 * The window procedure decodes each message into a `NativeMessage` and hands
 * it to `NonClientRouter::handle`. The router answers hit-tests with resize
 * codes, shrinks the client area of a maximized window back onto the monitor,
 * emulates the native maximize button so Windows 11 can show its snap-layout
 * flyout, and keeps the backdrop effect and caption bar in step with the
 * window state. Every OS access goes through the `HostWindow` capabilities.
 */
use crate::caption_bar::{
    CaptionAction, CaptionBar, CaptionButtonKind, CaptionButtonState, CaptionResponse, PaintOp,
    scale_rect, to_logical,
};
use crate::config::FramelessConfig;
use crate::effects::{BackdropController, BackdropEffects, Clock, EffectDebounce, background_fill};
use crate::error::Result;
use crate::metrics::{Margins, MetricsQuery, hit_test_margins, resize_border_thickness};
use crate::monitor::{self, DesktopQuery};
use crate::styling_primitives::Rgba;
use crate::theme::{ThemeProvider, ThemeState};
use crate::types::{
    HitTestCode, MessageOutcome, NativeMessage, ScreenPoint, ScreenRect, SizeKind,
    TaskbarPosition, WVR_REDRAW, WindowHandle,
};

use std::rc::Rc;
use std::time::Duration;

/// Timer id used for re-enabling the backdrop effect after a move.
pub const EFFECT_TIMER_ID: usize = 0x4652;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowCommand {
    Maximize,
    Restore,
    Minimize,
}

/// Window-level commands the router issues in response to input.
pub trait WindowCommands {
    fn show(&self, handle: WindowHandle, command: ShowCommand);
    fn close(&self, handle: WindowHandle);
    /// Hands the current drag to the OS move loop.
    fn begin_system_move(&self, handle: WindowHandle);
    /// Invalidates a client rectangle in device pixels, or the whole client area.
    fn invalidate(&self, handle: WindowHandle, rect: Option<ScreenRect>);
    fn arm_timer(&self, handle: WindowHandle, id: usize, delay: Duration);
    fn kill_timer(&self, handle: WindowHandle, id: usize);
    /// OS build number; 0 when unknown.
    fn os_build(&self) -> u32;
}

/// Everything the router needs from the OS for one window.
pub trait HostWindow: DesktopQuery + MetricsQuery + BackdropEffects + WindowCommands + Clock {}

impl<T> HostWindow for T where T: DesktopQuery + MetricsQuery + BackdropEffects + WindowCommands + Clock {}

pub struct NonClientRouter<H: HostWindow> {
    host: H,
    theme: Rc<ThemeProvider>,
    config: FramelessConfig,
    caption: CaptionBar,
    backdrop: BackdropController,
    debounce: EffectDebounce,
    max_button_hovered: bool,
    snap_layout: bool,
    initialized: bool,
}

impl<H: HostWindow> std::fmt::Debug for NonClientRouter<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NonClientRouter")
            .field("caption", &self.caption)
            .field("max_button_hovered", &self.max_button_hovered)
            .field("snap_layout", &self.snap_layout)
            .field("initialized", &self.initialized)
            .finish_non_exhaustive()
    }
}

impl<H: HostWindow> NonClientRouter<H> {
    pub fn new(host: H, theme: Rc<ThemeProvider>, config: FramelessConfig) -> Result<Self> {
        config.validate()?;
        let build = host.os_build();
        let snap_layout = config.supports_snap_layout(build);
        log::debug!("[NonClient] OS build {build}, snap layouts: {snap_layout}");
        Ok(Self {
            caption: CaptionBar::new(&config),
            backdrop: BackdropController::new(snap_layout, &config),
            host,
            theme,
            config,
            debounce: EffectDebounce::new(),
            max_button_hovered: false,
            snap_layout,
            initialized: false,
        })
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn config(&self) -> &FramelessConfig {
        &self.config
    }

    pub fn theme(&self) -> ThemeState {
        self.theme.current()
    }

    pub fn caption_bar(&self) -> &CaptionBar {
        &self.caption
    }

    pub fn caption_bar_mut(&mut self) -> &mut CaptionBar {
        &mut self.caption
    }

    pub fn snap_layout_supported(&self) -> bool {
        self.snap_layout
    }

    pub fn is_max_button_hovered(&self) -> bool {
        self.max_button_hovered
    }

    pub fn effect_enabled(&self) -> bool {
        self.backdrop.is_enabled()
    }

    /*
     * One-time setup once the native window exists: restores the animations
     * a borderless style loses, sizes the caption bar and applies the initial
     * backdrop. Snap-layout builds also get the DWM shadow and blur-behind.
     */
    pub fn initialize(&mut self, handle: WindowHandle) {
        if handle.is_null() {
            log::warn!("[NonClient] initialize called with a null handle");
            return;
        }
        if let Err(e) = self.host.enable_window_animation(handle) {
            log::warn!("[NonClient] Could not enable window animation: {e}");
        }
        if self.snap_layout {
            if let Err(e) = self.host.enable_shadow(handle) {
                log::warn!("[NonClient] Could not enable window shadow: {e}");
            }
            if let Err(e) = self.host.enable_blur_behind(handle) {
                log::warn!("[NonClient] Could not enable blur-behind: {e}");
            }
        }

        if let Some(client) = self.host.client_rect(handle) {
            let width = self.to_logical_length(handle, client.width());
            self.caption.set_width(width);
        }
        self.caption
            .set_maximized(monitor::is_maximized(&self.host, handle));

        self.backdrop
            .set_effect(true, self.theme.current(), &self.host, handle);
        self.initialized = true;
    }

    pub fn set_title(&mut self, handle: WindowHandle, title: &str) {
        self.caption.set_title(title);
        self.repaint_caption(handle);
    }

    pub fn set_icon_present(&mut self, handle: WindowHandle, present: bool) {
        self.caption.set_icon_present(present);
        self.repaint_caption(handle);
    }

    pub fn handle(&mut self, handle: WindowHandle, message: &NativeMessage) -> MessageOutcome {
        if handle.is_null() {
            return MessageOutcome::pass();
        }
        match *message {
            NativeMessage::HitTest { cursor } => self.on_hit_test(handle, cursor),
            NativeMessage::NcLeftButtonDown => self.on_nc_button_down(handle),
            NativeMessage::NcLeftButtonUp | NativeMessage::NcRightButtonUp => {
                self.on_nc_button_up(handle)
            }
            NativeMessage::NcMouseLeave => {
                self.on_emulated_leave(handle);
                MessageOutcome::pass()
            }
            NativeMessage::MouseLeave => {
                self.on_client_leave(handle);
                MessageOutcome::pass()
            }
            NativeMessage::CalcSize {
                validating,
                proposed,
            } => self.on_calc_size(handle, validating, proposed),
            NativeMessage::SettingChange => {
                self.on_setting_change(handle);
                MessageOutcome::pass()
            }
            NativeMessage::Move => {
                self.suspend_effect_while_moving(handle);
                MessageOutcome::pass()
            }
            NativeMessage::Size { kind, width, .. } => {
                self.on_size(handle, kind, width);
                MessageOutcome::pass()
            }
            NativeMessage::Timer { id } if id == EFFECT_TIMER_ID => {
                self.on_effect_timer(handle);
                MessageOutcome::handled(0)
            }
            NativeMessage::MouseMove { x, y, left_down } => {
                let pt = self.client_to_logical(handle, ScreenPoint::new(x, y));
                let response = self.caption.pointer_move(pt, left_down);
                self.apply_caption_response(handle, response)
            }
            NativeMessage::LeftButtonDown { x, y } => {
                let pt = self.client_to_logical(handle, ScreenPoint::new(x, y));
                let response = self.caption.pointer_down(pt);
                self.apply_caption_response(handle, response)
            }
            NativeMessage::LeftButtonUp { x, y } => {
                let pt = self.client_to_logical(handle, ScreenPoint::new(x, y));
                let response = self.caption.pointer_up(pt);
                self.apply_caption_response(handle, response)
            }
            NativeMessage::LeftDoubleClick { x, y } => {
                let pt = self.client_to_logical(handle, ScreenPoint::new(x, y));
                let response = self.caption.double_click(pt);
                self.apply_caption_response(handle, response)
            }
            NativeMessage::Timer { .. } | NativeMessage::Other(_) => MessageOutcome::pass(),
        }
    }

    /// Paint plan for the caption bar in device pixels.
    pub fn paint_ops(&self, handle: WindowHandle) -> Vec<PaintOp> {
        self.caption
            .paint_ops(&self.theme.current(), self.device_pixel_ratio(handle))
    }

    /// Client background; transparent while a backdrop effect shows through.
    pub fn background(&self) -> Rgba {
        background_fill(self.backdrop.is_enabled(), self.theme.current().is_dark)
    }

    /// Device pixels per logical pixel; 1.0 when the host cannot tell.
    pub fn device_pixel_ratio(&self, handle: WindowHandle) -> f64 {
        self.host
            .device_pixel_ratio(handle)
            .filter(|ratio| *ratio > 0.0)
            .unwrap_or(1.0)
    }

    fn to_logical_length(&self, handle: WindowHandle, device: i32) -> i32 {
        (f64::from(device) / self.device_pixel_ratio(handle)).round() as i32
    }

    fn client_to_logical(&self, handle: WindowHandle, pt: ScreenPoint) -> ScreenPoint {
        to_logical(pt, self.device_pixel_ratio(handle))
    }

    fn repaint_caption(&self, handle: WindowHandle) {
        if handle.is_null() {
            return;
        }
        let rect = scale_rect(self.caption.bar_rect(), self.device_pixel_ratio(handle));
        self.host.invalidate(handle, Some(rect));
    }

    fn set_max_button_state(&mut self, handle: WindowHandle, state: CaptionButtonState) {
        if self.caption.set_state(CaptionButtonKind::MaximizeRestore, state) {
            self.repaint_caption(handle);
        }
    }

    /*
     * The emulated maximize button is checked before the resize borders: on
     * snap-layout builds the OS only shows the flyout for HTMAXBUTTON answers.
     * A button that is already pressed keeps its state while the cursor moves.
     */
    fn on_hit_test(&mut self, handle: WindowHandle, cursor: ScreenPoint) -> MessageOutcome {
        if self.snap_layout && self.cursor_over_max_button(handle, cursor) {
            self.max_button_hovered = true;
            if self.caption.state(CaptionButtonKind::MaximizeRestore) == CaptionButtonState::Normal
            {
                self.set_max_button_state(handle, CaptionButtonState::Hovered);
            }
            return MessageOutcome::hit(HitTestCode::MaxButton);
        }

        let Some(window) = self.host.window_rect(handle) else {
            log::trace!("[NonClient] No window rect for {handle:?}; default hit-test");
            return MessageOutcome::pass();
        };
        let margins = hit_test_margins(self.config.border_width);
        match edge_hit_test(window, cursor, margins) {
            Some(code) => MessageOutcome::hit(code),
            None => MessageOutcome::pass(),
        }
    }

    fn cursor_over_max_button(&self, handle: WindowHandle, cursor: ScreenPoint) -> bool {
        let Some(client) = self.host.client_rect(handle) else {
            return false;
        };
        let local = ScreenPoint::new(cursor.x - client.left, cursor.y - client.top);
        let logical = self.client_to_logical(handle, local);
        self.caption.button_at(logical) == Some(CaptionButtonKind::MaximizeRestore)
    }

    fn on_nc_button_down(&mut self, handle: WindowHandle) -> MessageOutcome {
        if !(self.snap_layout && self.max_button_hovered) {
            return MessageOutcome::pass();
        }
        self.set_max_button_state(handle, CaptionButtonState::Pressed);
        MessageOutcome::handled(0)
    }

    /*
     * Windows may echo the release twice (left and right up). Only the first
     * release after a press toggles; both are swallowed so the default
     * handler does not act on the fake maximize button.
     */
    fn on_nc_button_up(&mut self, handle: WindowHandle) -> MessageOutcome {
        if !(self.snap_layout && self.max_button_hovered) {
            return MessageOutcome::pass();
        }
        if self.caption.state(CaptionButtonKind::MaximizeRestore) == CaptionButtonState::Pressed {
            self.set_max_button_state(handle, CaptionButtonState::Hovered);
            self.execute(handle, CaptionAction::ToggleMaximize);
        }
        MessageOutcome::handled(0)
    }

    /*
     * Entering the OS-owned maximize button from the client area raises a
     * client leave right after the hit-test that started the emulated hover.
     * That hover (or press) is kept; only the non-client leave ends it.
     */
    fn on_client_leave(&mut self, handle: WindowHandle) {
        let max_state = self.caption.state(CaptionButtonKind::MaximizeRestore);
        let response = self.caption.pointer_leave();
        if self.snap_layout && self.max_button_hovered {
            self.caption
                .set_state(CaptionButtonKind::MaximizeRestore, max_state);
        }
        self.apply_caption_response(handle, response);
    }

    fn on_emulated_leave(&mut self, handle: WindowHandle) {
        if !(self.snap_layout && self.max_button_hovered) {
            return;
        }
        if self.caption.state(CaptionButtonKind::MaximizeRestore) != CaptionButtonState::Normal {
            self.max_button_hovered = false;
            self.set_max_button_state(handle, CaptionButtonState::Normal);
        }
    }

    /*
     * A maximized borderless window is placed so that its invisible frame
     * hangs off the monitor; pull the client area back in by that thickness.
     * With an auto-hide taskbar, leave a sliver on its edge so the taskbar can
     * still be summoned by the mouse.
     */
    fn on_calc_size(
        &mut self,
        handle: WindowHandle,
        validating: bool,
        proposed: ScreenRect,
    ) -> MessageOutcome {
        let is_max = monitor::is_maximized(&self.host, handle);
        let is_full = monitor::is_full_screen(&self.host, handle);
        let mut rect = proposed;

        if is_max && !is_full {
            let thickness = resize_border_thickness(&self.host, handle);
            rect = rect.inset(thickness);
        }

        if (is_max || is_full) && monitor::taskbar_auto_hide(&self.host) {
            let sliver = self.config.auto_hide_thickness;
            match monitor::taskbar_position(&self.host, handle) {
                TaskbarPosition::Left => rect.left += sliver,
                TaskbarPosition::Top => rect.top += sliver,
                TaskbarPosition::Right => rect.right -= sliver,
                TaskbarPosition::Bottom => rect.bottom -= sliver,
                TaskbarPosition::None => {}
            }
        }

        log::trace!(
            "[NonClient] NCCALCSIZE max={is_max} full={is_full}: {proposed:?} -> {rect:?}"
        );
        let result = if validating { WVR_REDRAW } else { 0 };
        MessageOutcome::client_area(rect, result)
    }

    fn on_setting_change(&mut self, handle: WindowHandle) {
        if self.theme.refresh() {
            self.repaint_caption(handle);
        }
        if self.initialized {
            self.backdrop
                .set_effect(true, self.theme.current(), &self.host, handle);
        }
    }

    fn on_size(&mut self, handle: WindowHandle, kind: SizeKind, width: i32) {
        if kind != SizeKind::Minimized {
            let logical = self.to_logical_length(handle, width);
            self.caption.set_width(logical);
        }
        let maximized = match kind {
            SizeKind::Maximized => Some(true),
            SizeKind::Restored => Some(false),
            SizeKind::Minimized | SizeKind::Other => None,
        };
        if let Some(maximized) = maximized {
            if self.caption.set_maximized(maximized) {
                self.repaint_caption(handle);
            }
        }
        self.suspend_effect_while_moving(handle);
    }

    /*
     * Acrylic redraws too slowly to follow a drag. Turn it off and restart
     * the debounce on every move; the timer turns it back on once the window
     * has been still for the configured delay.
     */
    fn suspend_effect_while_moving(&mut self, handle: WindowHandle) {
        if !self.initialized || self.backdrop.uses_mica() {
            return;
        }
        self.backdrop
            .set_effect(false, self.theme.current(), &self.host, handle);
        self.debounce
            .rearm(self.host.now(), self.config.effect_debounce);
        self.host
            .arm_timer(handle, EFFECT_TIMER_ID, self.config.effect_debounce);
    }

    fn on_effect_timer(&mut self, handle: WindowHandle) {
        if !self.debounce.is_armed() {
            self.host.kill_timer(handle, EFFECT_TIMER_ID);
            return;
        }
        if self.debounce.poll(self.host.now()) {
            self.host.kill_timer(handle, EFFECT_TIMER_ID);
            self.backdrop
                .set_effect(true, self.theme.current(), &self.host, handle);
        }
    }

    fn apply_caption_response(
        &mut self,
        handle: WindowHandle,
        response: CaptionResponse,
    ) -> MessageOutcome {
        if response.repaint {
            self.repaint_caption(handle);
        }
        match response.action {
            Some(action) => {
                self.execute(handle, action);
                MessageOutcome::handled(0)
            }
            None => MessageOutcome::pass(),
        }
    }

    fn execute(&mut self, handle: WindowHandle, action: CaptionAction) {
        log::debug!("[NonClient] Caption action {action:?}");
        match action {
            CaptionAction::Minimize => self.host.show(handle, ShowCommand::Minimize),
            CaptionAction::ToggleMaximize => {
                let command = if monitor::is_maximized(&self.host, handle) {
                    ShowCommand::Restore
                } else {
                    ShowCommand::Maximize
                };
                self.host.show(handle, command);
            }
            CaptionAction::Close => self.host.close(handle),
            CaptionAction::BeginMove => self.host.begin_system_move(handle),
        }
    }
}

/*
 * Resize zones along the window rectangle. A point is in a zone when it lies
 * strictly within that side's margin of the edge; corners win over edges.
 */
pub fn edge_hit_test(
    window: ScreenRect,
    cursor: ScreenPoint,
    margins: Margins,
) -> Option<HitTestCode> {
    let x = cursor.x - window.left;
    let y = cursor.y - window.top;
    let lx = x < margins.left;
    let rx = x > window.width() - margins.right;
    let ty = y < margins.top;
    let by = y > window.height() - margins.bottom;

    match (lx, rx, ty, by) {
        (_, true, _, true) => Some(HitTestCode::BottomRight),
        (_, true, true, _) => Some(HitTestCode::TopRight),
        (true, _, _, true) => Some(HitTestCode::BottomLeft),
        (true, _, true, _) => Some(HitTestCode::TopLeft),
        (_, true, _, _) => Some(HitTestCode::Right),
        (_, _, _, true) => Some(HitTestCode::Bottom),
        (true, _, _, _) => Some(HitTestCode::Left),
        (_, _, true, _) => Some(HitTestCode::Top),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::AppBarState;
    use crate::test_support::{BackdropCall, FakeHost, FakeThemeSource};
    use crate::types::ShowState;

    const HWND: WindowHandle = WindowHandle(0x100);
    const WIN11: u32 = 22631;
    const WIN10: u32 = 19045;

    // Default fake window: (100,100)-(740,580), client area identical.
    fn router_with(host: FakeHost) -> NonClientRouter<FakeHost> {
        let theme = Rc::new(ThemeProvider::new(Box::new(FakeThemeSource::new(
            Some(1),
            None,
        ))));
        let mut router = NonClientRouter::new(host, theme, FramelessConfig::default())
            .expect("default config is valid");
        router.initialize(HWND);
        router
    }

    fn router(os_build: u32) -> NonClientRouter<FakeHost> {
        let host = FakeHost::new();
        host.set_os_build(os_build);
        router_with(host)
    }

    fn hit(router: &mut NonClientRouter<FakeHost>, x: i32, y: i32) -> MessageOutcome {
        router.handle(
            HWND,
            &NativeMessage::HitTest {
                cursor: ScreenPoint::new(x, y),
            },
        )
    }

    fn calc_size(router: &mut NonClientRouter<FakeHost>, proposed: ScreenRect) -> MessageOutcome {
        router.handle(
            HWND,
            &NativeMessage::CalcSize {
                validating: true,
                proposed,
            },
        )
    }

    #[test]
    fn edge_and_corner_zones_map_to_resize_codes() {
        let mut router = router(WIN10);
        let cases = [
            ((102, 300), HitTestCode::Left),
            ((739, 300), HitTestCode::Right),
            ((400, 101), HitTestCode::Top),
            ((400, 579), HitTestCode::Bottom),
            ((100, 100), HitTestCode::TopLeft),
            ((739, 100), HitTestCode::TopRight),
            ((100, 579), HitTestCode::BottomLeft),
            ((738, 578), HitTestCode::BottomRight),
        ];
        for ((x, y), expected) in cases {
            assert_eq!(hit(&mut router, x, y), MessageOutcome::hit(expected), "at ({x}, {y})");
        }
    }

    #[test]
    fn interior_and_border_boundary_fall_through() {
        let mut router = router(WIN10);
        assert!(!hit(&mut router, 400, 300).consumed);
        // x == border is already outside the left zone; x == width - border outside the right one.
        assert!(!hit(&mut router, 104, 300).consumed);
        assert!(!hit(&mut router, 736, 300).consumed);
    }

    #[test]
    fn null_handle_is_never_handled() {
        let mut router = router(WIN11);
        let outcome = router.handle(
            WindowHandle::NULL,
            &NativeMessage::HitTest {
                cursor: ScreenPoint::new(100, 100),
            },
        );
        assert_eq!(outcome, MessageOutcome::pass());
    }

    #[test]
    fn maximize_button_answers_htmaxbutton_on_snap_layout_builds() {
        let mut router = router(WIN11);
        // Max button spans x 548..594 of a 640 px bar.
        let outcome = hit(&mut router, 100 + 560, 100 + 10);
        assert_eq!(outcome, MessageOutcome::hit(HitTestCode::MaxButton));
        assert!(router.is_max_button_hovered());
        assert_eq!(
            router.caption_bar().state(CaptionButtonKind::MaximizeRestore),
            CaptionButtonState::Hovered
        );
    }

    #[test]
    fn maximize_button_is_not_emulated_before_snap_layouts() {
        let mut router = router(WIN10);
        assert!(!hit(&mut router, 100 + 560, 100 + 10).consumed);
        assert!(!router.is_max_button_hovered());
        assert!(!router.handle(HWND, &NativeMessage::NcLeftButtonDown).consumed);
    }

    #[test]
    fn emulated_click_toggles_exactly_once() {
        // Arrange
        let mut router = router(WIN11);
        hit(&mut router, 660, 110);
        // Act
        let down = router.handle(HWND, &NativeMessage::NcLeftButtonDown);
        let pressed = router.caption_bar().state(CaptionButtonKind::MaximizeRestore);
        let up = router.handle(HWND, &NativeMessage::NcLeftButtonUp);
        let echo = router.handle(HWND, &NativeMessage::NcRightButtonUp);
        // Assert
        assert_eq!(down, MessageOutcome::handled(0));
        assert_eq!(pressed, CaptionButtonState::Pressed);
        assert!(up.consumed);
        assert!(echo.consumed);
        assert_eq!(router.host().shows(), vec![ShowCommand::Maximize]);
        assert_eq!(
            router.caption_bar().state(CaptionButtonKind::MaximizeRestore),
            CaptionButtonState::Hovered
        );
    }

    #[test]
    fn emulated_click_restores_a_maximized_window() {
        let mut router = router(WIN11);
        router.host().set_show_state(Some(ShowState::Maximized));
        hit(&mut router, 660, 110);
        router.handle(HWND, &NativeMessage::NcLeftButtonDown);
        router.handle(HWND, &NativeMessage::NcLeftButtonUp);
        assert_eq!(router.host().shows(), vec![ShowCommand::Restore]);
    }

    #[test]
    fn leave_echo_resets_emulated_hover() {
        let mut router = router(WIN11);
        hit(&mut router, 660, 110);

        let outcome = router.handle(HWND, &NativeMessage::NcMouseLeave);
        assert!(!outcome.consumed);
        assert!(!router.is_max_button_hovered());
        assert_eq!(
            router.caption_bar().state(CaptionButtonKind::MaximizeRestore),
            CaptionButtonState::Normal
        );
        // Further echoes are ordinary messages again.
        assert!(!router.handle(HWND, &NativeMessage::NcLeftButtonUp).consumed);
        assert!(router.host().shows().is_empty());
    }

    #[test]
    fn hit_test_keeps_a_pressed_max_button_pressed() {
        // Arrange
        let mut router = router(WIN11);
        hit(&mut router, 660, 110);
        router.handle(HWND, &NativeMessage::NcLeftButtonDown);
        // Act
        let outcome = hit(&mut router, 662, 112);
        // Assert
        assert_eq!(outcome, MessageOutcome::hit(HitTestCode::MaxButton));
        assert_eq!(
            router.caption_bar().state(CaptionButtonKind::MaximizeRestore),
            CaptionButtonState::Pressed
        );
        router.handle(HWND, &NativeMessage::NcLeftButtonUp);
        assert_eq!(router.host().shows(), vec![ShowCommand::Maximize]);
    }

    #[test]
    fn leave_echo_on_a_normal_button_changes_nothing() {
        let mut router = router(WIN11);
        hit(&mut router, 660, 110);
        router
            .caption_bar_mut()
            .set_state(CaptionButtonKind::MaximizeRestore, CaptionButtonState::Normal);
        let before = router.host().invalidations().len();

        let outcome = router.handle(HWND, &NativeMessage::NcMouseLeave);

        assert!(!outcome.consumed);
        assert!(router.is_max_button_hovered());
        assert_eq!(router.host().invalidations().len(), before);
    }

    #[test]
    fn client_leave_into_the_max_button_keeps_emulated_hover() {
        // Arrange: the cursor crosses from the client area onto the button.
        let mut router = router(WIN11);
        hit(&mut router, 660, 110);
        // Act
        let leave = router.handle(HWND, &NativeMessage::MouseLeave);
        let down = router.handle(HWND, &NativeMessage::NcLeftButtonDown);
        // Assert
        assert!(!leave.consumed);
        assert!(router.is_max_button_hovered());
        assert!(down.consumed);
        assert_eq!(
            router.caption_bar().state(CaptionButtonKind::MaximizeRestore),
            CaptionButtonState::Pressed
        );
        assert_eq!(hit(&mut router, 660, 110), MessageOutcome::hit(HitTestCode::MaxButton));
        assert_eq!(
            router.caption_bar().state(CaptionButtonKind::MaximizeRestore),
            CaptionButtonState::Pressed
        );
    }

    #[test]
    fn client_leave_still_clears_other_caption_buttons() {
        let mut router = router(WIN11);
        router.handle(
            HWND,
            &NativeMessage::MouseMove {
                x: 600,
                y: 5,
                left_down: false,
            },
        );
        hit(&mut router, 660, 110);

        router.handle(HWND, &NativeMessage::MouseLeave);

        assert_eq!(
            router.caption_bar().state(CaptionButtonKind::Close),
            CaptionButtonState::Normal
        );
        assert_eq!(
            router.caption_bar().state(CaptionButtonKind::MaximizeRestore),
            CaptionButtonState::Hovered
        );
    }

    #[test]
    fn edge_zones_follow_per_side_margins() {
        let window = ScreenRect::new(0, 0, 200, 100);
        let margins = Margins {
            left: 2,
            top: 8,
            right: 6,
            bottom: 1,
        };
        assert_eq!(edge_hit_test(window, ScreenPoint::new(1, 50), margins), Some(HitTestCode::Left));
        assert_eq!(edge_hit_test(window, ScreenPoint::new(3, 50), margins), None);
        assert_eq!(edge_hit_test(window, ScreenPoint::new(195, 50), margins), Some(HitTestCode::Right));
        assert_eq!(edge_hit_test(window, ScreenPoint::new(100, 7), margins), Some(HitTestCode::Top));
        assert_eq!(edge_hit_test(window, ScreenPoint::new(100, 98), margins), None);
        assert_eq!(edge_hit_test(window, ScreenPoint::new(195, 7), margins), Some(HitTestCode::TopRight));
        assert_eq!(
            edge_hit_test(window, ScreenPoint::new(100, 50), hit_test_margins(4)),
            None
        );
    }

    #[test]
    fn configured_border_width_drives_resize_zones() {
        let host = FakeHost::new();
        let theme = Rc::new(ThemeProvider::new(Box::new(FakeThemeSource::new(Some(1), None))));
        let config = FramelessConfig {
            border_width: 10,
            ..FramelessConfig::default()
        };
        let mut router = NonClientRouter::new(host, theme, config).expect("config is valid");
        router.initialize(HWND);

        assert_eq!(hit(&mut router, 108, 300), MessageOutcome::hit(HitTestCode::Left));
        assert!(!hit(&mut router, 110, 300).consumed);
    }

    #[test]
    fn calc_size_is_handled_while_max_button_is_hovered() {
        let mut router = router(WIN11);
        hit(&mut router, 660, 110);
        let proposed = ScreenRect::new(0, 0, 800, 600);
        let outcome = calc_size(&mut router, proposed);
        assert_eq!(outcome, MessageOutcome::client_area(proposed, WVR_REDRAW));
    }

    #[test]
    fn calc_size_leaves_restored_window_untouched() {
        let mut router = router(WIN10);
        let proposed = ScreenRect::new(100, 100, 740, 580);
        assert_eq!(
            calc_size(&mut router, proposed),
            MessageOutcome::client_area(proposed, WVR_REDRAW)
        );
        let non_validating = router.handle(
            HWND,
            &NativeMessage::CalcSize {
                validating: false,
                proposed,
            },
        );
        assert_eq!(non_validating, MessageOutcome::client_area(proposed, 0));
    }

    #[test]
    fn calc_size_shrinks_maximized_window_by_border_thickness() {
        let host = FakeHost::new();
        host.set_show_state(Some(ShowState::Maximized));
        host.set_window_rect(Some(ScreenRect::new(-8, -8, 1928, 1088)));
        host.set_system_metrics(4, 4);
        let mut router = router_with(host);

        let outcome = calc_size(&mut router, ScreenRect::new(-8, -8, 1928, 1088));
        assert_eq!(outcome.client_rect, Some(ScreenRect::new(0, 0, 1920, 1080)));
        assert_eq!(outcome.result, WVR_REDRAW);
    }

    #[test]
    fn calc_size_does_not_shrink_full_screen_window() {
        let host = FakeHost::new();
        host.set_show_state(Some(ShowState::Maximized));
        host.set_window_rect(Some(host.monitor().monitor_rect));
        let mut router = router_with(host);

        let proposed = ScreenRect::new(0, 0, 1920, 1080);
        assert_eq!(calc_size(&mut router, proposed).client_rect, Some(proposed));
    }

    #[test]
    fn auto_hide_taskbar_keeps_a_sliver_on_its_edge() {
        let cases = [
            (TaskbarPosition::Left, ScreenRect::new(2, 0, 1920, 1080)),
            (TaskbarPosition::Top, ScreenRect::new(0, 2, 1920, 1080)),
            (TaskbarPosition::Right, ScreenRect::new(0, 0, 1918, 1080)),
            (TaskbarPosition::Bottom, ScreenRect::new(0, 0, 1920, 1078)),
        ];
        for (edge, expected) in cases {
            // Arrange: full screen so only the auto-hide adjustment applies.
            let host = FakeHost::new();
            host.set_window_rect(Some(host.monitor().monitor_rect));
            host.set_appbar_state(Some(AppBarState(0x1)));
            host.set_auto_hide_edge(Some(edge));
            let mut router = router_with(host);
            // Act
            let outcome = calc_size(&mut router, ScreenRect::new(0, 0, 1920, 1080));
            // Assert
            assert_eq!(outcome.client_rect, Some(expected), "taskbar on {edge:?}");
        }
    }

    #[test]
    fn auto_hide_adjustment_requires_maximized_or_full_screen() {
        let host = FakeHost::new();
        host.set_appbar_state(Some(AppBarState(0x1)));
        host.set_auto_hide_edge(Some(TaskbarPosition::Bottom));
        let mut router = router_with(host);
        let proposed = ScreenRect::new(100, 100, 740, 580);
        assert_eq!(calc_size(&mut router, proposed).client_rect, Some(proposed));
    }

    #[test]
    fn maximized_with_auto_hide_taskbar_applies_both_adjustments() {
        let host = FakeHost::new();
        host.set_show_state(Some(ShowState::Maximized));
        host.set_window_rect(Some(ScreenRect::new(-8, -8, 1928, 1088)));
        host.set_system_metrics(4, 4);
        host.set_appbar_state(Some(AppBarState(0x1)));
        host.set_auto_hide_edge(Some(TaskbarPosition::Bottom));
        let mut router = router_with(host);

        let outcome = calc_size(&mut router, ScreenRect::new(-8, -8, 1928, 1088));
        assert_eq!(outcome.client_rect, Some(ScreenRect::new(0, 0, 1920, 1078)));
    }

    #[test]
    fn calc_size_survives_missing_monitor_information() {
        let host = FakeHost::new();
        host.set_show_state(Some(ShowState::Maximized));
        host.set_monitor(None);
        host.set_system_metrics(0, 0);
        host.set_device_pixel_ratio(Some(1.5));
        let mut router = router_with(host);

        let outcome = calc_size(&mut router, ScreenRect::new(0, 0, 1000, 800));
        assert_eq!(outcome.client_rect, Some(ScreenRect::new(12, 12, 988, 788)));
    }

    #[test]
    fn moves_collapse_into_one_effect_reenable() {
        // Arrange
        let mut router = router(WIN10);
        let initial = router.host().backdrop_calls();
        assert_eq!(initial.len(), 1);
        // Act
        router.handle(HWND, &NativeMessage::Move);
        router.host().advance(Duration::from_millis(60));
        router.handle(HWND, &NativeMessage::Move);
        router.host().advance(Duration::from_millis(60));
        let early = router.handle(HWND, &NativeMessage::Timer { id: EFFECT_TIMER_ID });
        router.host().advance(Duration::from_millis(50));
        router.handle(HWND, &NativeMessage::Timer { id: EFFECT_TIMER_ID });
        router.handle(HWND, &NativeMessage::Timer { id: EFFECT_TIMER_ID });
        // Assert
        assert!(early.consumed);
        let calls = router.host().backdrop_calls();
        assert_eq!(&calls[1..], &[BackdropCall::Remove, initial[0]]);
        assert_eq!(router.host().timers_armed(), 2);
        assert!(router.host().timers_killed() >= 1);
        assert!(router.effect_enabled());
    }

    #[test]
    fn mica_stays_on_while_moving() {
        let mut router = router(WIN11);
        router.handle(HWND, &NativeMessage::Move);
        router.handle(
            HWND,
            &NativeMessage::Size {
                kind: SizeKind::Restored,
                width: 800,
                height: 600,
            },
        );
        assert_eq!(
            router.host().backdrop_calls(),
            vec![BackdropCall::Mica { is_dark: false }]
        );
        assert_eq!(router.host().timers_armed(), 0);
    }

    #[test]
    fn foreign_timers_pass_through() {
        let mut router = router(WIN10);
        assert!(!router.handle(HWND, &NativeMessage::Timer { id: 7 }).consumed);
    }

    #[test]
    fn setting_change_refreshes_theme_without_redundant_repaint() {
        // Arrange
        let source = FakeThemeSource::new(Some(1), None);
        let theme = Rc::new(ThemeProvider::new(Box::new(source.clone())));
        let host = FakeHost::new();
        host.set_os_build(WIN11);
        let mut router =
            NonClientRouter::new(host, Rc::clone(&theme), FramelessConfig::default())
                .expect("default config is valid");
        router.initialize(HWND);
        let repaints = router.host().repaints();
        // Act
        let outcome = router.handle(HWND, &NativeMessage::SettingChange);
        // Assert
        assert!(!outcome.consumed);
        assert_eq!(router.host().repaints(), repaints);

        source.set(Some(0), None);
        router.handle(HWND, &NativeMessage::SettingChange);
        assert!(router.theme().is_dark);
        assert_eq!(router.host().repaints(), repaints + 1);
        assert_eq!(
            router.host().backdrop_calls().last(),
            Some(&BackdropCall::Mica { is_dark: true })
        );
    }

    #[test]
    fn size_updates_caption_width_and_maximized_glyph() {
        let mut router = router(WIN11);
        router.handle(
            HWND,
            &NativeMessage::Size {
                kind: SizeKind::Maximized,
                width: 1920,
                height: 1080,
            },
        );
        assert_eq!(router.caption_bar().width(), 1920);
        assert!(router.caption_bar().is_maximized());

        router.handle(
            HWND,
            &NativeMessage::Size {
                kind: SizeKind::Minimized,
                width: 0,
                height: 0,
            },
        );
        assert_eq!(router.caption_bar().width(), 1920);
        assert!(router.caption_bar().is_maximized());
    }

    #[test]
    fn caption_width_is_logical_at_high_dpi() {
        let host = FakeHost::new();
        host.set_device_pixel_ratio(Some(2.0));
        host.set_client_rect(Some(ScreenRect::new(100, 100, 1380, 1060)));
        let router = router_with(host);
        assert_eq!(router.caption_bar().width(), 640);
    }

    #[test]
    fn caption_buttons_execute_window_commands() {
        let mut router = router(WIN10);
        let click = |router: &mut NonClientRouter<FakeHost>, x: i32| {
            router.handle(HWND, &NativeMessage::LeftButtonDown { x, y: 10 });
            router.handle(HWND, &NativeMessage::LeftButtonUp { x, y: 10 })
        };

        assert!(click(&mut router, 510).consumed);
        assert!(click(&mut router, 560).consumed);
        assert!(click(&mut router, 600).consumed);
        assert_eq!(
            router.host().shows(),
            vec![ShowCommand::Minimize, ShowCommand::Maximize]
        );
        assert_eq!(router.host().closes(), 1);
    }

    #[test]
    fn dragging_and_double_clicking_the_bar() {
        let mut router = router(WIN10);
        router.handle(HWND, &NativeMessage::LeftButtonDown { x: 200, y: 10 });
        let outcome = router.handle(
            HWND,
            &NativeMessage::MouseMove {
                x: 210,
                y: 12,
                left_down: true,
            },
        );
        assert!(outcome.consumed);
        assert_eq!(router.host().moves_started(), 1);

        router.handle(HWND, &NativeMessage::LeftDoubleClick { x: 200, y: 10 });
        assert_eq!(router.host().shows(), vec![ShowCommand::Maximize]);
    }

    #[test]
    fn hover_changes_invalidate_the_caption_bar() {
        let mut router = router(WIN10);
        let before = router.host().invalidations().len();
        router.handle(
            HWND,
            &NativeMessage::MouseMove {
                x: 600,
                y: 5,
                left_down: false,
            },
        );
        let invalidations = router.host().invalidations();
        assert_eq!(invalidations.len(), before + 1);
        assert_eq!(
            invalidations.last(),
            Some(&Some(ScreenRect::new(0, 0, 640, 32)))
        );

        router.handle(HWND, &NativeMessage::MouseLeave);
        assert_eq!(
            router.caption_bar().state(CaptionButtonKind::Close),
            CaptionButtonState::Normal
        );
    }

    #[test]
    fn background_is_opaque_only_while_effect_is_off() {
        let mut router = router(WIN10);
        assert_eq!(router.background(), Rgba::TRANSPARENT);
        router.handle(HWND, &NativeMessage::Move);
        assert_eq!(router.background(), Rgba::new(255, 255, 255, 204));
    }

    #[test]
    fn initialize_enables_shadow_only_on_snap_layout_builds() {
        let win11 = router(WIN11);
        assert_eq!(win11.host().shadow_calls(), 1);
        assert_eq!(win11.host().animation_calls(), 1);

        let win10 = router(WIN10);
        assert_eq!(win10.host().shadow_calls(), 0);
        assert_eq!(win10.host().animation_calls(), 1);
    }

    #[test]
    fn invalid_config_is_rejected_at_construction() {
        let theme = Rc::new(ThemeProvider::new(Box::new(FakeThemeSource::new(None, None))));
        let config = FramelessConfig {
            title_bar_height: 0,
            ..FramelessConfig::default()
        };
        assert!(NonClientRouter::new(FakeHost::new(), theme, config).is_err());
    }
}
