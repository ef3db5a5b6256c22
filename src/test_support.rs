/*
 * In-memory stand-ins for the OS capabilities, shared by the unit tests of
 * the portable modules. `FakeHost` answers desktop, metrics and effect
 * queries from settable fields and records every command it receives.
 */
use crate::effects::{BackdropEffects, Clock};
use crate::error::{FramelessError, Result};
use crate::metrics::{MetricsQuery, SystemMetric};
use crate::monitor::{AppBarState, DesktopQuery, MonitorInfo};
use crate::router::{ShowCommand, WindowCommands};
use crate::styling_primitives::Rgba;
use crate::theme::ThemeSource;
use crate::types::{ScreenRect, ShowState, TaskbarPosition, WindowHandle};

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default)]
pub struct FakeThemeSource {
    light: Rc<Cell<Option<u32>>>,
    accent: Rc<Cell<Option<u32>>>,
}

impl FakeThemeSource {
    pub fn new(light: Option<u32>, accent: Option<u32>) -> Self {
        let source = Self::default();
        source.set(light, accent);
        source
    }

    /// Changes what the next read returns; visible through every clone.
    pub fn set(&self, light: Option<u32>, accent: Option<u32>) {
        self.light.set(light);
        self.accent.set(accent);
    }
}

impl ThemeSource for FakeThemeSource {
    fn read_apps_use_light_theme(&self) -> Option<u32> {
        self.light.get()
    }

    fn read_accent_color(&self) -> Option<u32> {
        self.accent.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackdropCall {
    Mica { is_dark: bool },
    Acrylic(Rgba),
    Remove,
}

const DEFAULT_MONITOR: MonitorInfo = MonitorInfo {
    monitor_rect: ScreenRect::new(0, 0, 1920, 1080),
};
const DEFAULT_WINDOW: ScreenRect = ScreenRect::new(100, 100, 740, 580);

#[derive(Debug)]
pub struct FakeHost {
    show_state: Cell<Option<ShowState>>,
    window_rect: Cell<Option<ScreenRect>>,
    client_rect: Cell<Option<ScreenRect>>,
    monitor: Cell<Option<MonitorInfo>>,
    appbar_state: Cell<Option<AppBarState>>,
    auto_hide_edge: Cell<Option<TaskbarPosition>>,
    size_frame: Cell<i32>,
    padded_border: Cell<i32>,
    composition: Cell<bool>,
    ratio: Cell<Option<f64>>,
    os_build: Cell<u32>,
    backdrop_fails: Cell<bool>,
    start: Instant,
    elapsed: Cell<Duration>,

    backdrop_calls: RefCell<Vec<BackdropCall>>,
    shows: RefCell<Vec<ShowCommand>>,
    invalidations: RefCell<Vec<Option<ScreenRect>>>,
    repaints: Cell<usize>,
    closes: Cell<usize>,
    moves_started: Cell<usize>,
    timers_armed: Cell<usize>,
    timers_killed: Cell<usize>,
    shadow_calls: Cell<usize>,
    animation_calls: Cell<usize>,
}

impl Default for FakeHost {
    fn default() -> Self {
        Self::new()
    }
}

fn bump(counter: &Cell<usize>) {
    counter.set(counter.get() + 1);
}

impl FakeHost {
    /// A restored 640x480 window on a 1920x1080 monitor at 100 % scale.
    pub fn new() -> Self {
        Self {
            show_state: Cell::new(Some(ShowState::Normal)),
            window_rect: Cell::new(Some(DEFAULT_WINDOW)),
            client_rect: Cell::new(Some(DEFAULT_WINDOW)),
            monitor: Cell::new(Some(DEFAULT_MONITOR)),
            appbar_state: Cell::new(Some(AppBarState(0))),
            auto_hide_edge: Cell::new(None),
            size_frame: Cell::new(4),
            padded_border: Cell::new(4),
            composition: Cell::new(true),
            ratio: Cell::new(Some(1.0)),
            os_build: Cell::new(19045),
            backdrop_fails: Cell::new(false),
            start: Instant::now(),
            elapsed: Cell::new(Duration::ZERO),
            backdrop_calls: RefCell::new(Vec::new()),
            shows: RefCell::new(Vec::new()),
            invalidations: RefCell::new(Vec::new()),
            repaints: Cell::new(0),
            closes: Cell::new(0),
            moves_started: Cell::new(0),
            timers_armed: Cell::new(0),
            timers_killed: Cell::new(0),
            shadow_calls: Cell::new(0),
            animation_calls: Cell::new(0),
        }
    }

    /// The monitor currently reported, or the default one when unset.
    pub fn monitor(&self) -> MonitorInfo {
        self.monitor.get().unwrap_or(DEFAULT_MONITOR)
    }

    pub fn set_show_state(&self, state: Option<ShowState>) {
        self.show_state.set(state);
    }

    pub fn set_window_rect(&self, rect: Option<ScreenRect>) {
        self.window_rect.set(rect);
    }

    pub fn set_client_rect(&self, rect: Option<ScreenRect>) {
        self.client_rect.set(rect);
    }

    pub fn set_monitor(&self, info: Option<MonitorInfo>) {
        self.monitor.set(info);
    }

    pub fn set_appbar_state(&self, state: Option<AppBarState>) {
        self.appbar_state.set(state);
    }

    pub fn set_auto_hide_edge(&self, edge: Option<TaskbarPosition>) {
        self.auto_hide_edge.set(edge);
    }

    pub fn set_system_metrics(&self, size_frame: i32, padded_border: i32) {
        self.size_frame.set(size_frame);
        self.padded_border.set(padded_border);
    }

    pub fn set_composition_enabled(&self, enabled: bool) {
        self.composition.set(enabled);
    }

    pub fn set_device_pixel_ratio(&self, ratio: Option<f64>) {
        self.ratio.set(ratio);
    }

    pub fn set_os_build(&self, build: u32) {
        self.os_build.set(build);
    }

    pub fn set_backdrop_fails(&self, fails: bool) {
        self.backdrop_fails.set(fails);
    }

    pub fn advance(&self, by: Duration) {
        self.elapsed.set(self.elapsed.get() + by);
    }

    pub fn backdrop_calls(&self) -> Vec<BackdropCall> {
        self.backdrop_calls.borrow().clone()
    }

    pub fn shows(&self) -> Vec<ShowCommand> {
        self.shows.borrow().clone()
    }

    pub fn invalidations(&self) -> Vec<Option<ScreenRect>> {
        self.invalidations.borrow().clone()
    }

    pub fn repaints(&self) -> usize {
        self.repaints.get()
    }

    pub fn closes(&self) -> usize {
        self.closes.get()
    }

    pub fn moves_started(&self) -> usize {
        self.moves_started.get()
    }

    pub fn timers_armed(&self) -> usize {
        self.timers_armed.get()
    }

    pub fn timers_killed(&self) -> usize {
        self.timers_killed.get()
    }

    pub fn shadow_calls(&self) -> usize {
        self.shadow_calls.get()
    }

    pub fn animation_calls(&self) -> usize {
        self.animation_calls.get()
    }

    fn record_backdrop(&self, call: BackdropCall) -> Result<()> {
        self.backdrop_calls.borrow_mut().push(call);
        if self.backdrop_fails.get() {
            return Err(FramelessError::OperationFailed(format!("{call:?} rejected")));
        }
        Ok(())
    }
}

impl DesktopQuery for FakeHost {
    fn window_show_state(&self, _handle: WindowHandle) -> Option<ShowState> {
        self.show_state.get()
    }

    fn window_rect(&self, _handle: WindowHandle) -> Option<ScreenRect> {
        self.window_rect.get()
    }

    fn client_rect(&self, _handle: WindowHandle) -> Option<ScreenRect> {
        self.client_rect.get()
    }

    fn monitor_info(&self, _handle: WindowHandle) -> Option<MonitorInfo> {
        self.monitor.get()
    }

    fn appbar_state(&self) -> Option<AppBarState> {
        self.appbar_state.get()
    }

    fn auto_hide_bar_on_edge(&self, _monitor_rect: ScreenRect, edge: TaskbarPosition) -> bool {
        self.auto_hide_edge.get() == Some(edge)
    }
}

impl MetricsQuery for FakeHost {
    fn system_metric(&self, metric: SystemMetric) -> i32 {
        match metric {
            SystemMetric::SizeFrameX => self.size_frame.get(),
            SystemMetric::PaddedBorderX => self.padded_border.get(),
        }
    }

    fn composition_enabled(&self) -> bool {
        self.composition.get()
    }

    fn device_pixel_ratio(&self, _handle: WindowHandle) -> Option<f64> {
        self.ratio.get()
    }
}

impl BackdropEffects for FakeHost {
    fn enable_window_animation(&self, _handle: WindowHandle) -> Result<()> {
        bump(&self.animation_calls);
        Ok(())
    }

    fn apply_mica(&self, _handle: WindowHandle, is_dark: bool) -> Result<()> {
        self.record_backdrop(BackdropCall::Mica { is_dark })
    }

    fn apply_acrylic(&self, _handle: WindowHandle, tint: Rgba) -> Result<()> {
        self.record_backdrop(BackdropCall::Acrylic(tint))
    }

    fn remove_backdrop(&self, _handle: WindowHandle) -> Result<()> {
        self.record_backdrop(BackdropCall::Remove)
    }

    fn enable_shadow(&self, _handle: WindowHandle) -> Result<()> {
        bump(&self.shadow_calls);
        Ok(())
    }

    fn enable_blur_behind(&self, _handle: WindowHandle) -> Result<()> {
        Ok(())
    }

    fn request_repaint(&self, _handle: WindowHandle) {
        bump(&self.repaints);
    }
}

impl WindowCommands for FakeHost {
    fn show(&self, _handle: WindowHandle, command: ShowCommand) {
        self.shows.borrow_mut().push(command);
    }

    fn close(&self, _handle: WindowHandle) {
        bump(&self.closes);
    }

    fn begin_system_move(&self, _handle: WindowHandle) {
        bump(&self.moves_started);
    }

    fn invalidate(&self, _handle: WindowHandle, rect: Option<ScreenRect>) {
        self.invalidations.borrow_mut().push(rect);
    }

    fn arm_timer(&self, _handle: WindowHandle, _id: usize, _delay: Duration) {
        bump(&self.timers_armed);
    }

    fn kill_timer(&self, _handle: WindowHandle, _id: usize) {
        bump(&self.timers_killed);
    }

    fn os_build(&self) -> u32 {
        self.os_build.get()
    }
}

impl Clock for FakeHost {
    fn now(&self) -> Instant {
        self.start + self.elapsed.get()
    }
}
