/*
 * Resize border metrics. The thickness computed here is what Windows would
 * have drawn as a frame; a maximized borderless window overshoots the monitor
 * by exactly this amount and must pull its client area back in.
 */
use crate::types::WindowHandle;

// Fallback frame thickness in logical pixels, with and without DWM composition.
const FALLBACK_THICKNESS_COMPOSED: f64 = 8.0;
const FALLBACK_THICKNESS_CLASSIC: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemMetric {
    /// `SM_CXSIZEFRAME`
    SizeFrameX,
    /// `SM_CXPADDEDBORDER`
    PaddedBorderX,
}

pub trait MetricsQuery {
    fn system_metric(&self, metric: SystemMetric) -> i32;
    fn composition_enabled(&self) -> bool;
    /// `None` while the handle does not resolve to one of our windows.
    fn device_pixel_ratio(&self, handle: WindowHandle) -> Option<f64>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Margins {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Margins {
    pub const fn uniform(width: i32) -> Self {
        Self {
            left: width,
            top: width,
            right: width,
            bottom: width,
        }
    }
}

/*
 * Returns the resize border thickness in physical pixels. The system metrics
 * are preferred; when their sum is not positive the DPI-scaled fallback is used.
 * Zero means "no resize border", which is also the answer for a handle that
 * does not (yet) belong to a resolved window.
 */
pub fn resize_border_thickness(metrics: &impl MetricsQuery, handle: WindowHandle) -> i32 {
    if handle.is_null() {
        return 0;
    }
    let Some(ratio) = metrics.device_pixel_ratio(handle) else {
        log::trace!("[Metrics] Window {handle:?} not resolved; no resize border");
        return 0;
    };

    let from_metrics = metrics.system_metric(SystemMetric::SizeFrameX)
        + metrics.system_metric(SystemMetric::PaddedBorderX);
    if from_metrics > 0 {
        return from_metrics;
    }

    let base = if metrics.composition_enabled() {
        FALLBACK_THICKNESS_COMPOSED
    } else {
        FALLBACK_THICKNESS_CLASSIC
    };
    (base * ratio).round().max(0.0) as i32
}

/// Hit-test margins for the resize zones; one width on every side.
pub fn hit_test_margins(border_width: i32) -> Margins {
    Margins::uniform(border_width.max(0))
}
