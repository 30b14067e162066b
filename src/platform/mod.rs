// ── Platform abstraction layer ────────────────────────────────────────────────
//
// This module defines the interface the rest of the crate uses to talk to the
// windowing system.  No `unsafe` lives here beyond the trait contract; all
// Win32 FFI is confined to the `win32` sub-module and never leaks outward.
//
// Backends:
//   • `win32`    – the real thing, Windows only
//   • `headless` – an in-memory platform for tests and non-Windows hosts

use std::num::NonZeroIsize;

use bitflags::bitflags;

use crate::message::Message;

pub mod headless;
#[cfg(windows)]
pub mod win32;

// ── Error codes ───────────────────────────────────────────────────────────────
//
// The subset of system error codes the crate reacts to.  Values match Win32.

/// The handle does not name a live window.
pub const ERROR_INVALID_WINDOW_HANDLE: u32 = 1400;
/// No window class with the requested name is registered.
pub const ERROR_CANNOT_FIND_WND_CLASS: u32 = 1407;
/// A window class with the requested name already exists.
pub const ERROR_CLASS_ALREADY_EXISTS: u32 = 1410;

// ── Handles ───────────────────────────────────────────────────────────────────

/// Opaque identifier the platform issues for a live window.
///
/// Never null: "no window" is `Option<WindowHandle>::None`.  Handles are plain
/// values and may be sent to other threads, but only the thread that created
/// the window can resolve it back to its owning object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WindowHandle(NonZeroIsize);

impl WindowHandle {
    /// Wrap a raw handle value; `None` for the null handle.
    pub fn from_raw(raw: isize) -> Option<Self> {
        NonZeroIsize::new(raw).map(Self)
    }

    pub fn as_raw(self) -> isize {
        self.0.get()
    }
}

/// Handle of the module (executable or DLL) that owns a window class.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ModuleHandle(pub isize);

// ── Window class template ─────────────────────────────────────────────────────

bitflags! {
    /// Class styles (`CS_*`) applied to every window of a class.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ClassStyle: u32 {
        /// Deliver double-click messages.
        const DOUBLE_CLICKS = 0x0008;
    }
}

/// Built-in cursor shown over the client area.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SystemCursor {
    #[default]
    Arrow,
}

/// Built-in icon shown in the caption and task bar.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SystemIcon {
    #[default]
    Application,
}

/// Brush used to erase the client area.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Background {
    /// The system "window" colour.
    #[default]
    WindowColor,
}

/// Named template describing the default look of a window class.
///
/// The dispatch entry point is not part of the descriptor: every backend
/// registers its own entry point, which always forwards to
/// [`crate::router::dispatch`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassDescriptor {
    pub name: String,
    pub style: ClassStyle,
    pub module: ModuleHandle,
    pub cursor: SystemCursor,
    pub icon: SystemIcon,
    pub background: Background,
}

impl ClassDescriptor {
    /// The default template: double-click delivery, arrow cursor, application
    /// icon, window background.
    pub fn new(name: impl Into<String>, module: ModuleHandle) -> Self {
        Self {
            name: name.into(),
            style: ClassStyle::DOUBLE_CLICKS,
            module,
            cursor: SystemCursor::default(),
            icon: SystemIcon::default(),
            background: Background::default(),
        }
    }
}

// ── Window creation request ───────────────────────────────────────────────────

/// Everything a backend needs to create one top-level window.
#[derive(Clone, Copy, Debug)]
pub struct CreateRequest<'a> {
    pub class_name: &'a str,
    pub caption: &'a str,
    /// Initial position; `None` lets the platform choose.
    pub position: Option<(i32, i32)>,
    /// Initial size; `None` lets the platform choose.
    pub size: Option<(i32, i32)>,
    pub module: ModuleHandle,
    /// Creation-time user value.  The backend must hand it back through
    /// [`Platform::creation_param`] when it delivers `WM_NCCREATE`.
    pub param: usize,
}

// ── Platform ──────────────────────────────────────────────────────────────────

/// The windowing operations this crate consumes.
///
/// Failures are reported as raw platform error codes; callers wrap them in
/// [`crate::PlatformCallFailure`] with the name of the operation.
pub trait Platform {
    /// Module that contains the dispatch entry point.
    fn module_handle(&self) -> ModuleHandle;

    /// Register a window class.
    fn register_class(&self, class: &ClassDescriptor) -> Result<(), u32>;

    /// Create a window.  Messages sent during creation (`WM_NCCREATE`
    /// first) are dispatched before this returns.
    fn create_window(&self, request: &CreateRequest<'_>) -> Result<WindowHandle, u32>;

    /// Run the platform's own destroy sequence for `handle`.
    fn destroy_window(&self, handle: WindowHandle) -> Result<(), u32>;

    /// Default processing for a message no handler consumed.
    ///
    /// # Safety
    ///
    /// `message` must either be the message this platform is currently
    /// delivering to `handle`, or carry no pointers in `wparam`/`lparam`.
    /// Backends hand the payload to the system, which dereferences it for
    /// codes such as `WM_NCCREATE` or `WM_SETTEXT`.
    #[allow(unsafe_code)]
    unsafe fn def_window_proc(&self, handle: WindowHandle, message: Message) -> isize;

    /// Queue `message` for `handle` on the thread that owns it.  Safe to use
    /// from any thread that can reach the platform.
    fn post_message(&self, handle: WindowHandle, message: Message) -> Result<(), u32>;

    /// Ask the calling thread's message pump to stop with `exit_code`.
    fn post_quit(&self, exit_code: i32);

    /// Creation-time user value carried by a `WM_NCCREATE` message.
    ///
    /// # Safety
    ///
    /// `message` must be a `WM_NCCREATE` this platform itself delivered and
    /// that is still being dispatched; backends may read the creation data
    /// `lparam` points to.
    #[allow(unsafe_code)]
    unsafe fn creation_param(&self, message: &Message) -> Option<usize>;

    /// Last error code recorded on the calling thread.
    fn last_error(&self) -> u32;

    /// Human-readable description of `code`, if the platform has one.
    fn describe_error(&self, code: u32) -> Option<String>;
}
