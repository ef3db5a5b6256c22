/*
 * Win32 drawing and DWM helpers used by the window procedure and the native
 * host. Each module wraps one group of OS calls and keeps raw handles out of
 * the portable code.
 */
pub(crate) mod backdrop_handler;
pub(crate) mod caption_painter;
pub(crate) mod styling_handler;
