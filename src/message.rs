// ── Messages ─────────────────────────────────────────────────────────────────
//
// The platform hands every message over as an opaque `(code, wparam, lparam)`
// triple.  This module owns the code table and the per-code payload layout,
// so that the router only ever sees typed arguments.

use bitflags::bitflags;

use crate::platform::WindowHandle;

// ── Message codes ─────────────────────────────────────────────────────────────
//
// Values match the Win32 `WM_*` constants so the Win32 backend can pass codes
// through unchanged.

pub const WM_CREATE: u32 = 0x0001;
pub const WM_DESTROY: u32 = 0x0002;
pub const WM_PAINT: u32 = 0x000F;
pub const WM_CLOSE: u32 = 0x0010;
pub const WM_QUIT: u32 = 0x0012;
pub const WM_SETCURSOR: u32 = 0x0020;
pub const WM_NCCREATE: u32 = 0x0081;
pub const WM_NCDESTROY: u32 = 0x0082;
pub const WM_NCHITTEST: u32 = 0x0084;
pub const WM_MOUSEMOVE: u32 = 0x0200;
pub const WM_LBUTTONDOWN: u32 = 0x0201;
pub const WM_LBUTTONUP: u32 = 0x0202;
pub const WM_LBUTTONDBLCLK: u32 = 0x0203;
pub const WM_USER: u32 = 0x0400;
pub const WM_APP: u32 = 0x8000;

// ── Message ───────────────────────────────────────────────────────────────────

/// One message as delivered by the platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Message {
    pub code: u32,
    pub wparam: usize,
    pub lparam: isize,
}

impl Message {
    pub const fn new(code: u32, wparam: usize, lparam: isize) -> Self {
        Self { code, wparam, lparam }
    }

    /// `WM_DESTROY`.
    pub const fn destroy() -> Self {
        Self::new(WM_DESTROY, 0, 0)
    }

    /// `WM_PAINT`.
    pub const fn paint() -> Self {
        Self::new(WM_PAINT, 0, 0)
    }

    /// `WM_LBUTTONUP` at client coordinates `(x, y)`.
    pub fn left_button_up(x: i32, y: i32, flags: ModifierFlags) -> Self {
        Self::new(WM_LBUTTONUP, flags.bits() as usize, pack_point(x, y))
    }

    /// `WM_MOUSEMOVE` at client coordinates `(x, y)`.
    pub fn mouse_move(x: i32, y: i32, flags: ModifierFlags) -> Self {
        Self::new(WM_MOUSEMOVE, flags.bits() as usize, pack_point(x, y))
    }

    /// `WM_NCHITTEST` at screen coordinates `(x, y)`.
    pub fn hittest(x: i32, y: i32) -> Self {
        Self::new(WM_NCHITTEST, 0, pack_point(x, y))
    }

    /// `WM_SETCURSOR` for the window under the cursor.
    pub fn set_cursor(target: Option<WindowHandle>, hit: HitRegion, trigger: u32) -> Self {
        let target = target.map_or(0, WindowHandle::as_raw) as usize;
        // codeHitTest and the triggering mouse message share lparam as two
        // 16-bit halves; negative hit codes keep their low word only.
        Self::new(WM_SETCURSOR, target, make_lparam(hit.0 as u16, trigger as u16))
    }

    /// Decode the payload according to `code`.
    ///
    /// Codes without a dedicated handler decode to [`Decoded::Other`].
    pub fn decode(&self) -> Decoded {
        match self.code {
            WM_DESTROY => Decoded::Destroy,
            WM_LBUTTONUP => Decoded::LeftButtonUp {
                x: x_of(self.lparam),
                y: y_of(self.lparam),
                flags: ModifierFlags::from_bits_retain(self.wparam as u32),
            },
            WM_MOUSEMOVE => Decoded::MouseMove {
                x: x_of(self.lparam),
                y: y_of(self.lparam),
                flags: ModifierFlags::from_bits_retain(self.wparam as u32),
            },
            WM_NCHITTEST => Decoded::HitTest {
                x: x_of(self.lparam),
                y: y_of(self.lparam),
            },
            WM_PAINT => Decoded::Paint,
            WM_SETCURSOR => Decoded::SetCursor {
                target: WindowHandle::from_raw(self.wparam as isize),
                hit: HitRegion(i32::from(low_word(self.lparam) as i16)),
                trigger: u32::from(high_word(self.lparam)),
            },
            _ => Decoded::Other,
        }
    }
}

/// Typed view of a [`Message`] payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decoded {
    Destroy,
    LeftButtonUp { x: i32, y: i32, flags: ModifierFlags },
    MouseMove { x: i32, y: i32, flags: ModifierFlags },
    HitTest { x: i32, y: i32 },
    Paint,
    SetCursor {
        /// Window that contains the cursor, if any.
        target: Option<WindowHandle>,
        hit: HitRegion,
        /// Mouse message that triggered the query, `0` in menu mode.
        trigger: u32,
    },
    Other,
}

// ── Payload types ─────────────────────────────────────────────────────────────

bitflags! {
    /// Mouse-button and modifier-key state carried in `wparam` of mouse
    /// messages (`MK_*`).
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ModifierFlags: u32 {
        const LBUTTON = 0x0001;
        const RBUTTON = 0x0002;
        const SHIFT = 0x0004;
        const CONTROL = 0x0008;
        const MBUTTON = 0x0010;
        const XBUTTON1 = 0x0020;
        const XBUTTON2 = 0x0040;
    }
}

/// Answer to a hit-test query: which part of the window a point is in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct HitRegion(pub i32);

impl HitRegion {
    pub const ERROR: Self = Self(-2);
    pub const TRANSPARENT: Self = Self(-1);
    pub const NOWHERE: Self = Self(0);
    pub const CLIENT: Self = Self(1);
    pub const CAPTION: Self = Self(2);
    pub const SYSMENU: Self = Self(3);
    pub const MINBUTTON: Self = Self(8);
    pub const MAXBUTTON: Self = Self(9);
    pub const LEFT: Self = Self(10);
    pub const RIGHT: Self = Self(11);
    pub const TOP: Self = Self(12);
    pub const TOPLEFT: Self = Self(13);
    pub const TOPRIGHT: Self = Self(14);
    pub const BOTTOM: Self = Self(15);
    pub const BOTTOMLEFT: Self = Self(16);
    pub const BOTTOMRIGHT: Self = Self(17);
    pub const CLOSE: Self = Self(20);

    /// Interpret a window-procedure result as a hit region.
    pub fn from_result(result: isize) -> Self {
        Self(result as i32)
    }

    /// Encode as a window-procedure result.
    pub fn into_result(self) -> isize {
        self.0 as isize
    }
}

// ── Word packing ──────────────────────────────────────────────────────────────

/// Pack two 16-bit words into an `lparam` (`MAKELPARAM`).
pub fn make_lparam(low: u16, high: u16) -> isize {
    ((u32::from(high) << 16) | u32::from(low)) as isize
}

fn pack_point(x: i32, y: i32) -> isize {
    make_lparam(x as u16, y as u16)
}

fn low_word(lparam: isize) -> u16 {
    (lparam & 0xFFFF) as u16
}

fn high_word(lparam: isize) -> u16 {
    ((lparam >> 16) & 0xFFFF) as u16
}

// Coordinates are signed: points left of or above the origin arrive as
// negative 16-bit values on multi-monitor setups.
fn x_of(lparam: isize) -> i32 {
    i32::from(low_word(lparam) as i16)
}

fn y_of(lparam: isize) -> i32 {
    i32::from(high_word(lparam) as i16)
}
