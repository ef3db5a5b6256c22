/*
 * Executes a caption bar paint plan with GDI. The plan already carries
 * device-pixel geometry and theme colors; this module only owns GDI objects
 * and must release every pen, brush and font it selects.
 */

use crate::caption_bar::{IconAsset, PaintOp};
use crate::controls::styling_handler::{color_to_colorref, rgba_to_colorref};
use crate::native_host::to_rect;
use crate::styling_primitives::Color;
use crate::types::{ScreenPoint, ScreenRect};

use windows::Win32::{
    Foundation::POINT,
    Graphics::Gdi::{
        CLIP_DEFAULT_PRECIS, CreateFontW, CreatePen, CreateSolidBrush, DEFAULT_CHARSET,
        DEFAULT_QUALITY, DT_END_ELLIPSIS, DT_LEFT, DT_NOPREFIX, DT_SINGLELINE, DT_VCENTER,
        DeleteObject, DrawTextW, FF_DONTCARE, FW_NORMAL, FillRect, GetStockObject, HDC,
        HGDIOBJ, LineTo, MoveToEx, NULL_BRUSH, OUT_DEFAULT_PRECIS, PS_SOLID, Polyline,
        Rectangle, SelectObject, SetBkMode, SetTextColor, TRANSPARENT,
    },
    UI::WindowsAndMessaging::{DI_NORMAL, DrawIconEx, HICON},
};
use windows::core::w;

// Caption font height in logical pixels (9 pt at 96 DPI).
const CAPTION_FONT_HEIGHT: f64 = 12.0;
// Half the extent of the close cross in logical pixels.
const CLOSE_CROSS_HALF: f64 = 5.0;

fn to_point(pt: &ScreenPoint) -> POINT {
    POINT { x: pt.x, y: pt.y }
}

/*
 * Draws `ops` onto `hdc`. `base` is the color translucent fills are
 * flattened against; `icon` is drawn for `IconAsset::WindowIcon` when set.
 */
pub(crate) unsafe fn paint_caption(
    hdc: HDC,
    ops: &[PaintOp],
    base: Color,
    icon: Option<HICON>,
    ratio: f64,
) {
    unsafe { SetBkMode(hdc, TRANSPARENT) };
    for op in ops {
        match op {
            PaintOp::Fill { rect, color } => {
                let brush = unsafe { CreateSolidBrush(rgba_to_colorref(color, base)) };
                let _ = unsafe { FillRect(hdc, &to_rect(rect), brush) };
                let _ = unsafe { DeleteObject(brush.into()) };
            }
            PaintOp::Line { from, to, color } => unsafe {
                with_pen(hdc, *color, ratio, || {
                    let _ = MoveToEx(hdc, from.x, from.y, None);
                    let _ = LineTo(hdc, to.x, to.y);
                });
            },
            PaintOp::RectOutline { rect, color } => unsafe {
                let hollow: HGDIOBJ = GetStockObject(NULL_BRUSH);
                let old_brush = SelectObject(hdc, hollow);
                with_pen(hdc, *color, ratio, || {
                    // Rectangle excludes the right/bottom edge; outlines include it.
                    let _ = Rectangle(hdc, rect.left, rect.top, rect.right + 1, rect.bottom + 1);
                });
                SelectObject(hdc, old_brush);
            },
            PaintOp::Polyline { points, color } => unsafe {
                let points: Vec<POINT> = points.iter().map(to_point).collect();
                with_pen(hdc, *color, ratio, || {
                    let _ = Polyline(hdc, &points);
                });
            },
            PaintOp::Icon { asset, rect } => unsafe {
                paint_icon(hdc, *asset, rect, icon, ratio);
            },
            PaintOp::Text { rect, text, color } => unsafe {
                paint_text(hdc, rect, text, *color, ratio);
            },
        }
    }
}

unsafe fn with_pen(hdc: HDC, color: Color, ratio: f64, draw: impl FnOnce()) {
    let width = ratio.floor().max(1.0) as i32;
    let pen = unsafe { CreatePen(PS_SOLID, width, color_to_colorref(&color)) };
    let old_pen = unsafe { SelectObject(hdc, pen.into()) };
    draw();
    unsafe { SelectObject(hdc, old_pen) };
    let _ = unsafe { DeleteObject(pen.into()) };
}

unsafe fn paint_icon(hdc: HDC, asset: IconAsset, rect: &ScreenRect, icon: Option<HICON>, ratio: f64) {
    match asset {
        IconAsset::WindowIcon => {
            if let Some(icon) = icon {
                let _ = unsafe {
                    DrawIconEx(
                        hdc,
                        rect.left,
                        rect.top,
                        icon,
                        rect.width(),
                        rect.height(),
                        0,
                        None,
                        DI_NORMAL,
                    )
                };
            }
        }
        IconAsset::CloseWhite | IconAsset::CloseBlack => {
            let color = if asset == IconAsset::CloseWhite {
                Color::WHITE
            } else {
                Color::BLACK
            };
            let half = (CLOSE_CROSS_HALF * ratio).round() as i32;
            let cx = rect.left + rect.width() / 2;
            let cy = rect.top + rect.height() / 2;
            unsafe {
                with_pen(hdc, color, ratio, || {
                    let _ = MoveToEx(hdc, cx - half, cy - half, None);
                    let _ = LineTo(hdc, cx + half + 1, cy + half + 1);
                    let _ = MoveToEx(hdc, cx + half, cy - half, None);
                    let _ = LineTo(hdc, cx - half - 1, cy + half + 1);
                });
            }
        }
    }
}

unsafe fn paint_text(hdc: HDC, rect: &ScreenRect, text: &str, color: Color, ratio: f64) {
    let height = -((CAPTION_FONT_HEIGHT * ratio).round() as i32);
    let font = unsafe {
        CreateFontW(
            height,
            0,
            0,
            0,
            FW_NORMAL.0 as i32,
            0,
            0,
            0,
            DEFAULT_CHARSET,
            OUT_DEFAULT_PRECIS,
            CLIP_DEFAULT_PRECIS,
            DEFAULT_QUALITY,
            FF_DONTCARE.0 as u32,
            w!("Segoe UI"),
        )
    };
    let old_font = if font.is_invalid() {
        None
    } else {
        Some(unsafe { SelectObject(hdc, font.into()) })
    };

    let _ = unsafe { SetTextColor(hdc, color_to_colorref(&color)) };
    let mut wide: Vec<u16> = text.encode_utf16().collect();
    let mut bounds = to_rect(rect);
    let _ = unsafe {
        DrawTextW(
            hdc,
            &mut wide,
            &mut bounds,
            DT_LEFT | DT_VCENTER | DT_SINGLELINE | DT_END_ELLIPSIS | DT_NOPREFIX,
        )
    };

    if let Some(old_font) = old_font {
        unsafe { SelectObject(hdc, old_font) };
        let _ = unsafe { DeleteObject(font.into()) };
    }
}
