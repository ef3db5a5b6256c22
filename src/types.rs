/*
 * Platform-agnostic types shared between the router and the Win32 glue:
 * window handles, screen geometry, hit-test codes and the decoded message
 * model. The raw message constants are spelled out here (rather than imported
 * from the windows crate) so message decoding can be unit-tested on any target.
 */

/// Opaque identifier of a top-level window. The router borrows it for the
/// window's lifetime and never owns or destroys it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WindowHandle(pub isize);

impl WindowHandle {
    pub const NULL: WindowHandle = WindowHandle(0);

    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

impl ScreenPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Rectangle with exclusive right/bottom edges, same convention as Win32 `RECT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScreenRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl ScreenRect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub const fn from_origin_size(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn contains(&self, pt: ScreenPoint) -> bool {
        pt.x >= self.left && pt.x < self.right && pt.y >= self.top && pt.y < self.bottom
    }

    pub fn inset(&self, amount: i32) -> Self {
        Self::new(
            self.left + amount,
            self.top + amount,
            self.right - amount,
            self.bottom - amount,
        )
    }
}

/*
 * Answers to WM_NCHITTEST that this crate produces. Values match the Win32
 * `HT*` constants.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum HitTestCode {
    MaxButton = 9,
    Left = 10,
    Right = 11,
    Top = 12,
    TopLeft = 13,
    TopRight = 14,
    Bottom = 15,
    BottomLeft = 16,
    BottomRight = 17,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskbarPosition {
    Left,
    Top,
    Right,
    Bottom,
    None,
}

impl TaskbarPosition {
    /// Edges in the order the shell is probed for an auto-hide appbar.
    pub const PROBE_ORDER: [TaskbarPosition; 4] = [
        TaskbarPosition::Left,
        TaskbarPosition::Top,
        TaskbarPosition::Right,
        TaskbarPosition::Bottom,
    ];

    /// The `ABE_*` value used by `SHAppBarMessage`.
    pub fn appbar_edge(self) -> Option<u32> {
        match self {
            TaskbarPosition::Left => Some(0),
            TaskbarPosition::Top => Some(1),
            TaskbarPosition::Right => Some(2),
            TaskbarPosition::Bottom => Some(3),
            TaskbarPosition::None => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowState {
    Normal,
    Minimized,
    Maximized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeKind {
    Restored,
    Minimized,
    Maximized,
    Other,
}

// Raw message identifiers the router cares about.
pub const WM_MOVE: u32 = 0x0003;
pub const WM_SIZE: u32 = 0x0005;
pub const WM_SETTINGCHANGE: u32 = 0x001A;
pub const WM_NCCALCSIZE: u32 = 0x0083;
pub const WM_NCHITTEST: u32 = 0x0084;
pub const WM_NCLBUTTONDOWN: u32 = 0x00A1;
pub const WM_NCLBUTTONUP: u32 = 0x00A2;
pub const WM_NCRBUTTONUP: u32 = 0x00A5;
pub const WM_TIMER: u32 = 0x0113;
pub const WM_MOUSEMOVE: u32 = 0x0200;
pub const WM_LBUTTONDOWN: u32 = 0x0201;
pub const WM_LBUTTONUP: u32 = 0x0202;
pub const WM_LBUTTONDBLCLK: u32 = 0x0203;
pub const WM_NCMOUSELEAVE: u32 = 0x02A2;
pub const WM_MOUSELEAVE: u32 = 0x02A3;

pub const WVR_REDRAW: isize = 0x0300;
const MK_LBUTTON: usize = 0x0001;
const SIZE_RESTORED: usize = 0;
const SIZE_MINIMIZED: usize = 1;
const SIZE_MAXIMIZED: usize = 2;

/*
 * A window message decoded into the shape the router consumes. Pointer
 * payloads (the NCCALCSIZE rectangle) are read by the Win32 glue and arrive
 * here as plain values.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeMessage {
    HitTest { cursor: ScreenPoint },
    CalcSize { validating: bool, proposed: ScreenRect },
    NcLeftButtonDown,
    NcLeftButtonUp,
    NcRightButtonUp,
    NcMouseLeave,
    MouseLeave,
    SettingChange,
    Move,
    Size { kind: SizeKind, width: i32, height: i32 },
    Timer { id: usize },
    MouseMove { x: i32, y: i32, left_down: bool },
    LeftButtonDown { x: i32, y: i32 },
    LeftButtonUp { x: i32, y: i32 },
    LeftDoubleClick { x: i32, y: i32 },
    Other(u32),
}

#[inline]
fn signed_x_from_lparam(lparam: isize) -> i32 {
    (lparam & 0xFFFF) as i16 as i32
}

#[inline]
fn signed_y_from_lparam(lparam: isize) -> i32 {
    ((lparam >> 16) & 0xFFFF) as i16 as i32
}

impl NativeMessage {
    /*
     * Decodes a raw message whose payload is carried by value. WM_NCCALCSIZE is
     * the exception: its rectangle lives behind `lparam`, so the caller supplies
     * it through `read_calc_size_rect`. A missing rectangle decodes as `Other`
     * and is left to default processing.
     */
    pub fn decode(
        msg: u32,
        wparam: usize,
        lparam: isize,
        read_calc_size_rect: impl FnOnce() -> Option<ScreenRect>,
    ) -> Self {
        let x = signed_x_from_lparam(lparam);
        let y = signed_y_from_lparam(lparam);
        match msg {
            WM_NCHITTEST => NativeMessage::HitTest {
                cursor: ScreenPoint::new(x, y),
            },
            WM_NCCALCSIZE => match read_calc_size_rect() {
                Some(proposed) => NativeMessage::CalcSize {
                    validating: wparam != 0,
                    proposed,
                },
                None => NativeMessage::Other(msg),
            },
            WM_NCLBUTTONDOWN => NativeMessage::NcLeftButtonDown,
            WM_NCLBUTTONUP => NativeMessage::NcLeftButtonUp,
            WM_NCRBUTTONUP => NativeMessage::NcRightButtonUp,
            WM_NCMOUSELEAVE => NativeMessage::NcMouseLeave,
            WM_MOUSELEAVE => NativeMessage::MouseLeave,
            WM_SETTINGCHANGE => NativeMessage::SettingChange,
            WM_MOVE => NativeMessage::Move,
            WM_SIZE => NativeMessage::Size {
                kind: match wparam {
                    SIZE_RESTORED => SizeKind::Restored,
                    SIZE_MINIMIZED => SizeKind::Minimized,
                    SIZE_MAXIMIZED => SizeKind::Maximized,
                    _ => SizeKind::Other,
                },
                width: (lparam & 0xFFFF) as i32,
                height: ((lparam >> 16) & 0xFFFF) as i32,
            },
            WM_TIMER => NativeMessage::Timer { id: wparam },
            WM_MOUSEMOVE => NativeMessage::MouseMove {
                x,
                y,
                left_down: wparam & MK_LBUTTON != 0,
            },
            WM_LBUTTONDOWN => NativeMessage::LeftButtonDown { x, y },
            WM_LBUTTONUP => NativeMessage::LeftButtonUp { x, y },
            WM_LBUTTONDBLCLK => NativeMessage::LeftDoubleClick { x, y },
            other => NativeMessage::Other(other),
        }
    }
}

/*
 * The router's answer to one message. When `consumed` is false the caller
 * runs default processing and ignores `result`. `client_rect` is only set for
 * calc-size answers and must be written back into the proposed rectangle.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageOutcome {
    pub consumed: bool,
    pub result: isize,
    pub client_rect: Option<ScreenRect>,
}

impl MessageOutcome {
    pub const fn pass() -> Self {
        Self {
            consumed: false,
            result: 0,
            client_rect: None,
        }
    }

    pub const fn handled(result: isize) -> Self {
        Self {
            consumed: true,
            result,
            client_rect: None,
        }
    }

    pub const fn hit(code: HitTestCode) -> Self {
        Self::handled(code as i32 as isize)
    }

    pub const fn client_area(rect: ScreenRect, result: isize) -> Self {
        Self {
            consumed: true,
            result,
            client_rect: Some(rect),
        }
    }
}

/// Parameters for creating a frameless top-level window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowConfig {
    pub title: String,
    pub width: i32,
    pub height: i32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: String::from("Frameless Window"),
            width: 640,
            height: 480,
        }
    }
}
