/*
 * The application-drawn caption bar: icon slot, title label and the three
 * caption buttons (minimize, maximize/restore, close), laid out left to right
 * across the top of the client area.
 *
 * Geometry is kept in fixed logical pixels (46x32 buttons, 32 px bar) and is
 * scaled by the window's device pixel ratio when painting and hit-testing.
 * Painting is expressed as a list of `PaintOp`s; the Win32 painter turns the
 * plan into GDI calls, which keeps every color and glyph decision testable.
 */
use crate::config::FramelessConfig;
use crate::styling_primitives::{Color, Rgba};
use crate::theme::ThemeState;
use crate::types::{ScreenPoint, ScreenRect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptionButtonKind {
    Minimize,
    MaximizeRestore,
    Close,
}

impl CaptionButtonKind {
    /// Left-to-right order inside the bar.
    pub const ALL: [CaptionButtonKind; 3] = [
        CaptionButtonKind::Minimize,
        CaptionButtonKind::MaximizeRestore,
        CaptionButtonKind::Close,
    ];

    fn slot(self) -> usize {
        match self {
            CaptionButtonKind::Minimize => 0,
            CaptionButtonKind::MaximizeRestore => 1,
            CaptionButtonKind::Close => 2,
        }
    }

    fn click_action(self) -> CaptionAction {
        match self {
            CaptionButtonKind::Minimize => CaptionAction::Minimize,
            CaptionButtonKind::MaximizeRestore => CaptionAction::ToggleMaximize,
            CaptionButtonKind::Close => CaptionAction::Close,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptionButtonState {
    #[default]
    Normal,
    Hovered,
    Pressed,
}

/// What the window should do in response to caption bar input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionAction {
    Minimize,
    ToggleMaximize,
    Close,
    /// Hand the pointer to the OS move loop.
    BeginMove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CaptionResponse {
    pub action: Option<CaptionAction>,
    pub repaint: bool,
}

/// Pre-rendered images the painter knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconAsset {
    WindowIcon,
    CloseWhite,
    CloseBlack,
}

/*
 * One drawing primitive in device pixels, relative to the client origin.
 * Outline rectangles include their right and bottom edge, like a 1 px pen
 * stroked along the rectangle.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaintOp {
    Fill { rect: ScreenRect, color: Rgba },
    Line { from: ScreenPoint, to: ScreenPoint, color: Color },
    RectOutline { rect: ScreenRect, color: Color },
    Polyline { points: Vec<ScreenPoint>, color: Color },
    Icon { asset: IconAsset, rect: ScreenRect },
    Text { rect: ScreenRect, text: String, color: Color },
}

const CLOSE_HOVER: Rgba = Rgba::from_argb(0xFFC4_2B1C);
const CLOSE_PRESSED: Rgba = Rgba::from_argb(0xFFC8_3C30);

/// Background colors of one button for Normal, Hovered and Pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonPalette {
    pub normal: Rgba,
    pub hovered: Rgba,
    pub pressed: Rgba,
}

impl ButtonPalette {
    pub fn for_button(kind: CaptionButtonKind, is_dark: bool) -> Self {
        match (kind, is_dark) {
            (CaptionButtonKind::Close, _) => Self {
                normal: Rgba::TRANSPARENT,
                hovered: CLOSE_HOVER,
                pressed: CLOSE_PRESSED,
            },
            (_, true) => Self {
                normal: Rgba::TRANSPARENT,
                hovered: Rgba::from_argb(0x20FF_FFFF),
                pressed: Rgba::from_argb(0x40FF_FFFF),
            },
            (_, false) => Self {
                normal: Rgba::TRANSPARENT,
                hovered: Rgba::from_argb(0x2000_0000),
                pressed: Rgba::from_argb(0x4000_0000),
            },
        }
    }

    pub fn color(&self, state: CaptionButtonState) -> Rgba {
        match state {
            CaptionButtonState::Normal => self.normal,
            CaptionButtonState::Hovered => self.hovered,
            CaptionButtonState::Pressed => self.pressed,
        }
    }
}

/// Glyph and title color for the current theme.
pub fn foreground_color(is_dark: bool) -> Color {
    if is_dark { Color::WHITE } else { Color::BLACK }
}

/*
 * The close glyph exists as a white and a black asset. The white one is used
 * in dark mode and whenever the button is highlighted, since the red hover
 * background needs the light glyph in both themes.
 */
pub fn close_glyph_asset(state: CaptionButtonState, is_dark: bool) -> IconAsset {
    if is_dark || state != CaptionButtonState::Normal {
        IconAsset::CloseWhite
    } else {
        IconAsset::CloseBlack
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptionButton {
    pub kind: CaptionButtonKind,
    pub state: CaptionButtonState,
}

impl CaptionButton {
    fn new(kind: CaptionButtonKind) -> Self {
        Self {
            kind,
            state: CaptionButtonState::Normal,
        }
    }

    pub fn background(&self, is_dark: bool) -> Rgba {
        ButtonPalette::for_button(self.kind, is_dark).color(self.state)
    }

    /*
     * Glyph geometry is computed in device pixels with each logical offset
     * truncated after scaling, so 1 px strokes land on whole pixels at any
     * scale factor.
     */
    pub fn glyph_ops(
        &self,
        device_rect: ScreenRect,
        ratio: f64,
        is_dark: bool,
        maximized: bool,
    ) -> Vec<PaintOp> {
        let color = foreground_color(is_dark);
        let ox = device_rect.left;
        let oy = device_rect.top;
        let px = |v: f64| (v * ratio) as i32;

        match self.kind {
            CaptionButtonKind::Minimize => vec![PaintOp::Line {
                from: ScreenPoint::new(ox + px(18.0), oy + px(16.0)),
                to: ScreenPoint::new(ox + px(28.0), oy + px(16.0)),
                color,
            }],
            CaptionButtonKind::MaximizeRestore if !maximized => vec![PaintOp::RectOutline {
                rect: ScreenRect::from_origin_size(
                    ox + px(18.0),
                    oy + px(11.0),
                    px(10.0),
                    px(10.0),
                ),
                color,
            }],
            CaptionButtonKind::MaximizeRestore => {
                let front = ScreenRect::from_origin_size(
                    ox + px(18.0),
                    oy + px(13.0),
                    px(8.0),
                    px(8.0),
                );
                let x0 = f64::from(px(18.0) + px(2.0));
                let y0 = 13.0 * ratio;
                let dw = f64::from(px(2.0));
                let side = 8.0 * ratio;
                let at = |x: f64, y: f64| {
                    ScreenPoint::new(ox + x.round() as i32, oy + y.round() as i32)
                };
                vec![
                    PaintOp::RectOutline { rect: front, color },
                    PaintOp::Polyline {
                        points: vec![
                            at(x0, y0),
                            at(x0, y0 - dw),
                            at(x0 + side, y0 - dw),
                            at(x0 + side, y0 - dw + side),
                            at(x0 + side - dw, y0 - dw + side),
                        ],
                        color,
                    },
                ]
            }
            CaptionButtonKind::Close => vec![PaintOp::Icon {
                asset: close_glyph_asset(self.state, is_dark),
                rect: device_rect,
            }],
        }
    }
}

/// Scales a logical rectangle to device pixels.
pub fn scale_rect(rect: ScreenRect, ratio: f64) -> ScreenRect {
    let s = |v: i32| (f64::from(v) * ratio).round() as i32;
    ScreenRect::new(s(rect.left), s(rect.top), s(rect.right), s(rect.bottom))
}

/// Converts a device-pixel point to logical pixels.
pub fn to_logical(pt: ScreenPoint, ratio: f64) -> ScreenPoint {
    if ratio <= 0.0 {
        return pt;
    }
    ScreenPoint::new(
        (f64::from(pt.x) / ratio).floor() as i32,
        (f64::from(pt.y) / ratio).floor() as i32,
    )
}

#[derive(Debug, Clone)]
pub struct CaptionBar {
    width: i32,
    height: i32,
    button_width: i32,
    icon_slot_width: i32,
    icon_slot_width_with_icon: i32,
    icon_size: i32,
    title: String,
    has_icon: bool,
    maximized: bool,
    buttons: [CaptionButton; 3],
    pressed: Option<CaptionButtonKind>,
    drag_armed: bool,
}

impl CaptionBar {
    pub fn new(config: &FramelessConfig) -> Self {
        Self {
            width: 0,
            height: config.title_bar_height,
            button_width: config.button_width,
            icon_slot_width: config.icon_slot_width,
            icon_slot_width_with_icon: config.icon_slot_width_with_icon,
            icon_size: config.icon_size,
            title: String::new(),
            has_icon: false,
            maximized: false,
            buttons: CaptionButtonKind::ALL.map(CaptionButton::new),
            pressed: None,
            drag_armed: false,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Tracks the window width; the bar always spans the whole client area.
    pub fn set_width(&mut self, logical_width: i32) {
        self.width = logical_width.max(0);
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    pub fn has_icon(&self) -> bool {
        self.has_icon
    }

    pub fn set_icon_present(&mut self, present: bool) {
        self.has_icon = present;
    }

    pub fn is_maximized(&self) -> bool {
        self.maximized
    }

    /// Returns true when the maximize glyph has to be repainted.
    pub fn set_maximized(&mut self, maximized: bool) -> bool {
        let changed = self.maximized != maximized;
        self.maximized = maximized;
        changed
    }

    pub fn bar_rect(&self) -> ScreenRect {
        ScreenRect::new(0, 0, self.width, self.height)
    }

    fn buttons_left(&self) -> i32 {
        self.width - self.button_width * 3
    }

    pub fn button_rect(&self, kind: CaptionButtonKind) -> ScreenRect {
        let left = self.buttons_left() + self.button_width * kind.slot() as i32;
        ScreenRect::from_origin_size(left, 0, self.button_width, self.height)
    }

    pub fn icon_slot_rect(&self) -> ScreenRect {
        let slot = if self.has_icon {
            self.icon_slot_width_with_icon
        } else {
            self.icon_slot_width
        };
        ScreenRect::new(0, 0, slot, self.height)
    }

    /// The icon image itself, centered in its slot.
    pub fn icon_rect(&self) -> ScreenRect {
        let slot = self.icon_slot_rect();
        let left = slot.left + (slot.width() - self.icon_size) / 2;
        let top = slot.top + (slot.height() - self.icon_size) / 2;
        ScreenRect::from_origin_size(left, top, self.icon_size, self.icon_size)
    }

    pub fn title_rect(&self) -> ScreenRect {
        let left = self.icon_slot_rect().right;
        ScreenRect::new(left, 0, self.buttons_left().max(left), self.height)
    }

    pub fn button_at(&self, pt: ScreenPoint) -> Option<CaptionButtonKind> {
        CaptionButtonKind::ALL
            .into_iter()
            .find(|&kind| self.button_rect(kind).contains(pt))
    }

    /// Area of the bar left of the buttons, where dragging moves the window.
    pub fn in_drag_region(&self, pt: ScreenPoint) -> bool {
        self.bar_rect().contains(pt) && pt.x < self.buttons_left()
    }

    pub fn button(&self, kind: CaptionButtonKind) -> &CaptionButton {
        &self.buttons[kind.slot()]
    }

    pub fn state(&self, kind: CaptionButtonKind) -> CaptionButtonState {
        self.button(kind).state
    }

    /// Returns true when the state actually changed.
    pub fn set_state(&mut self, kind: CaptionButtonKind, state: CaptionButtonState) -> bool {
        let button = &mut self.buttons[kind.slot()];
        if button.state == state {
            return false;
        }
        log::trace!("[CaptionBar] {kind:?}: {:?} -> {state:?}", button.state);
        button.state = state;
        true
    }

    /*
     * Moves the hover highlight to `target` (or nowhere). A button held down
     * keeps its pressed state while the left button is still down.
     */
    fn update_hover(&mut self, target: Option<CaptionButtonKind>, left_down: bool) -> bool {
        let mut changed = false;
        for kind in CaptionButtonKind::ALL {
            let current = self.state(kind);
            let next = if current == CaptionButtonState::Pressed && left_down {
                CaptionButtonState::Pressed
            } else if Some(kind) == target {
                CaptionButtonState::Hovered
            } else {
                CaptionButtonState::Normal
            };
            changed |= self.set_state(kind, next);
        }
        changed
    }

    pub fn pointer_move(&mut self, pt: ScreenPoint, left_down: bool) -> CaptionResponse {
        let repaint = self.update_hover(self.button_at(pt), left_down);
        let mut action = None;
        if left_down && self.drag_armed && self.pressed.is_none() && self.in_drag_region(pt) {
            self.drag_armed = false;
            action = Some(CaptionAction::BeginMove);
        }
        CaptionResponse { action, repaint }
    }

    pub fn pointer_down(&mut self, pt: ScreenPoint) -> CaptionResponse {
        match self.button_at(pt) {
            Some(kind) => {
                self.pressed = Some(kind);
                CaptionResponse {
                    action: None,
                    repaint: self.set_state(kind, CaptionButtonState::Pressed),
                }
            }
            None => {
                self.drag_armed = self.in_drag_region(pt);
                CaptionResponse::default()
            }
        }
    }

    /// Completes a click when the pointer is released over the button it pressed.
    pub fn pointer_up(&mut self, pt: ScreenPoint) -> CaptionResponse {
        self.drag_armed = false;
        let Some(kind) = self.pressed.take() else {
            return CaptionResponse::default();
        };
        if self.button_at(pt) == Some(kind) {
            CaptionResponse {
                action: Some(kind.click_action()),
                repaint: self.set_state(kind, CaptionButtonState::Hovered),
            }
        } else {
            CaptionResponse {
                action: None,
                repaint: self.set_state(kind, CaptionButtonState::Normal),
            }
        }
    }

    /// A double-click on the bar toggles maximize; on a button it counts as a press.
    pub fn double_click(&mut self, pt: ScreenPoint) -> CaptionResponse {
        if self.button_at(pt).is_some() {
            return self.pointer_down(pt);
        }
        if self.in_drag_region(pt) {
            self.drag_armed = false;
            return CaptionResponse {
                action: Some(CaptionAction::ToggleMaximize),
                repaint: false,
            };
        }
        CaptionResponse::default()
    }

    pub fn pointer_leave(&mut self) -> CaptionResponse {
        self.pressed = None;
        self.drag_armed = false;
        CaptionResponse {
            action: None,
            repaint: self.update_hover(None, false),
        }
    }

    pub fn paint_ops(&self, theme: &ThemeState, ratio: f64) -> Vec<PaintOp> {
        let mut ops = Vec::new();
        if self.has_icon {
            ops.push(PaintOp::Icon {
                asset: IconAsset::WindowIcon,
                rect: scale_rect(self.icon_rect(), ratio),
            });
        }
        if !self.title.is_empty() {
            ops.push(PaintOp::Text {
                rect: scale_rect(self.title_rect(), ratio),
                text: self.title.clone(),
                color: foreground_color(theme.is_dark),
            });
        }
        for button in &self.buttons {
            let device_rect = scale_rect(self.button_rect(button.kind), ratio);
            let background = button.background(theme.is_dark);
            if !background.is_transparent() {
                ops.push(PaintOp::Fill {
                    rect: device_rect,
                    color: background,
                });
            }
            ops.extend(button.glyph_ops(device_rect, ratio, theme.is_dark, self.maximized));
        }
        ops
    }
}
