// ── Win32 platform implementation ─────────────────────────────────────────────
//
// This is the only module in the codebase that talks to the real windowing
// system.  Every `unsafe` block MUST carry a `// SAFETY:` comment that states:
//   • which invariant makes the operation sound, and
//   • what the caller is responsible for maintaining.
//
// Nothing in this module is `pub` beyond what callers genuinely need; keep the
// unsafe surface as small as possible.

#![allow(unsafe_code)]

use windows::{
    core::{HSTRING, PCWSTR, PWSTR},
    Win32::{
        Foundation::{GetLastError, HINSTANCE, HMODULE, HWND, LPARAM, WPARAM},
        Graphics::Gdi::{COLOR_WINDOW, HBRUSH},
        System::{
            Diagnostics::Debug::{
                FormatMessageW, FORMAT_MESSAGE_FROM_SYSTEM, FORMAT_MESSAGE_IGNORE_INSERTS,
            },
            LibraryLoader::{
                GetModuleHandleExW, GET_MODULE_HANDLE_EX_FLAG_FROM_ADDRESS,
                GET_MODULE_HANDLE_EX_FLAG_UNCHANGED_REFCOUNT,
            },
        },
        UI::WindowsAndMessaging::{
            CreateWindowExW, DefWindowProcW, DestroyWindow, LoadCursorW, LoadIconW,
            PostMessageW, PostQuitMessage, RegisterClassExW, CREATESTRUCTW, CW_USEDEFAULT,
            HMENU, IDC_ARROW, IDI_APPLICATION, WINDOW_EX_STYLE, WM_NCCREATE, WNDCLASSEXW,
            WNDCLASS_STYLES, WS_CLIPCHILDREN, WS_OVERLAPPEDWINDOW, WS_VISIBLE,
        },
    },
};

use super::{
    Background, ClassDescriptor, CreateRequest, ModuleHandle, Platform, SystemCursor, SystemIcon,
    WindowHandle,
};
use crate::message::Message;

// ── Sub-modules ───────────────────────────────────────────────────────────────

pub mod window; // window procedure, message loop, error dialog

pub use window::{run_message_loop, show_error_dialog};

/// Longest system error description we render, in UTF-16 units.
const DESCRIPTION_CAPACITY: usize = 512;

// ── Handle conversions ────────────────────────────────────────────────────────

impl From<WindowHandle> for HWND {
    fn from(handle: WindowHandle) -> Self {
        HWND(handle.as_raw() as *mut _)
    }
}

impl WindowHandle {
    /// Wrap a raw `HWND`; `None` for the null window.
    pub fn from_hwnd(hwnd: HWND) -> Option<Self> {
        Self::from_raw(hwnd.0 as isize)
    }
}

fn hinstance(module: ModuleHandle) -> HINSTANCE {
    HINSTANCE(module.0 as *mut _)
}

// ── Class template resources ──────────────────────────────────────────────────

fn icon_id(icon: SystemIcon) -> PCWSTR {
    match icon {
        SystemIcon::Application => IDI_APPLICATION,
    }
}

fn cursor_id(cursor: SystemCursor) -> PCWSTR {
    match cursor {
        SystemCursor::Arrow => IDC_ARROW,
    }
}

fn background_brush(background: Background) -> HBRUSH {
    match background {
        // System colour brushes are passed as "index + 1".
        Background::WindowColor => HBRUSH((COLOR_WINDOW.0 + 1) as isize as *mut _),
    }
}

// ── Platform ──────────────────────────────────────────────────────────────────

/// The real Win32 windowing system.
///
/// Stateless: every call goes straight to the API on the calling thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct Win32;

impl Platform for Win32 {
    fn module_handle(&self) -> ModuleHandle {
        let mut module = HMODULE::default();
        // SAFETY: with FROM_ADDRESS the "name" is an address inside the module
        // we want, here the window procedure; UNCHANGED_REFCOUNT means there
        // is nothing to release.  `module` is a valid out-pointer.
        let found = unsafe {
            GetModuleHandleExW(
                GET_MODULE_HANDLE_EX_FLAG_FROM_ADDRESS | GET_MODULE_HANDLE_EX_FLAG_UNCHANGED_REFCOUNT,
                PCWSTR(window::wnd_proc as usize as *const u16),
                &mut module,
            )
        };
        if found.is_err() {
            log::warn!("GetModuleHandleExW failed, using the process module");
        }
        ModuleHandle(module.0 as isize)
    }

    fn register_class(&self, class: &ClassDescriptor) -> Result<(), u32> {
        // SAFETY: a null module plus an IDI_* id loads a built-in icon, which
        // exists on all Windows versions.
        let icon = unsafe { LoadIconW(None, icon_id(class.icon)) }.unwrap_or_default();
        // SAFETY: a null module plus an IDC_* id loads a built-in cursor, which
        // exists on all Windows versions.
        let cursor = unsafe { LoadCursorW(None, cursor_id(class.cursor)) }.unwrap_or_default();

        let name = HSTRING::from(class.name.as_str());
        let wndclass = WNDCLASSEXW {
            // WNDCLASSEXW is ~80 bytes; the cast to u32 is always lossless.
            cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
            style: WNDCLASS_STYLES(class.style.bits()),
            lpfnWndProc: Some(window::wnd_proc),
            cbClsExtra: 0,
            cbWndExtra: 0,
            hInstance: hinstance(class.module),
            hIcon: icon,
            hCursor: cursor,
            hbrBackground: background_brush(class.background),
            lpszMenuName: PCWSTR::null(),
            lpszClassName: PCWSTR(name.as_ptr()),
            hIconSm: icon,
        };

        // SAFETY: wndclass is fully initialised; `name` outlives the call and
        // RegisterClassExW copies the class name.
        let atom = unsafe { RegisterClassExW(&wndclass) };
        if atom == 0 {
            return Err(last_error_code());
        }
        Ok(())
    }

    fn create_window(&self, request: &CreateRequest<'_>) -> Result<WindowHandle, u32> {
        let class = HSTRING::from(request.class_name);
        let caption = HSTRING::from(request.caption);
        let (x, y) = request.position.unwrap_or((CW_USEDEFAULT, CW_USEDEFAULT));
        let (width, height) = request.size.unwrap_or((CW_USEDEFAULT, CW_USEDEFAULT));

        // SAFETY: the class was registered by `class::register_class`; the
        // strings outlive the call.  `request.param` is an integer token, not
        // a pointer: nothing dereferences it.  WM_NCCREATE and friends are
        // dispatched through `wnd_proc` before this returns.
        let hwnd = unsafe {
            CreateWindowExW(
                WINDOW_EX_STYLE(0),
                &class,
                &caption,
                WS_OVERLAPPEDWINDOW | WS_CLIPCHILDREN | WS_VISIBLE,
                x,
                y,
                width,
                height,
                HWND::default(),
                HMENU::default(),
                hinstance(request.module),
                Some(request.param as *const _),
            )
        };

        match hwnd.ok().and_then(WindowHandle::from_hwnd) {
            Some(handle) => Ok(handle),
            None => Err(last_error_code()),
        }
    }

    fn destroy_window(&self, handle: WindowHandle) -> Result<(), u32> {
        // SAFETY: DestroyWindow validates the handle itself and fails for
        // windows that are gone or belong to another thread.
        unsafe { DestroyWindow(HWND::from(handle)) }.map_err(|_| last_error_code())
    }

    unsafe fn def_window_proc(&self, handle: WindowHandle, message: Message) -> isize {
        // SAFETY: the caller guarantees the payload is either in flight for
        // `handle` or free of pointers.
        unsafe {
            DefWindowProcW(
                HWND::from(handle),
                message.code,
                WPARAM(message.wparam),
                LPARAM(message.lparam),
            )
        }
        .0
    }

    fn post_message(&self, handle: WindowHandle, message: Message) -> Result<(), u32> {
        // SAFETY: PostMessageW only queues the message; it is thread safe and
        // fails cleanly for invalid handles.
        unsafe {
            PostMessageW(
                HWND::from(handle),
                message.code,
                WPARAM(message.wparam),
                LPARAM(message.lparam),
            )
        }
        .map_err(|_| last_error_code())
    }

    fn post_quit(&self, exit_code: i32) {
        // SAFETY: PostQuitMessage only flags the calling thread's queue.
        unsafe { PostQuitMessage(exit_code) };
    }

    unsafe fn creation_param(&self, message: &Message) -> Option<usize> {
        if message.code != WM_NCCREATE || message.lparam == 0 {
            return None;
        }
        // SAFETY: the caller guarantees this is a WM_NCCREATE Windows
        // delivered, whose lparam points to the CREATESTRUCTW for the call.
        let create = unsafe { &*(message.lparam as *const CREATESTRUCTW) };
        Some(create.lpCreateParams as usize)
    }

    fn last_error(&self) -> u32 {
        last_error_code()
    }

    fn describe_error(&self, code: u32) -> Option<String> {
        let mut buffer = [0u16; DESCRIPTION_CAPACITY];
        // SAFETY: `buffer` is a writable UTF-16 buffer of the advertised size;
        // IGNORE_INSERTS means no argument array is read.
        let len = unsafe {
            FormatMessageW(
                FORMAT_MESSAGE_FROM_SYSTEM | FORMAT_MESSAGE_IGNORE_INSERTS,
                None,
                code,
                0,
                PWSTR(buffer.as_mut_ptr()),
                buffer.len() as u32,
                None,
            )
        };
        (len > 0).then(|| String::from_utf16_lossy(&buffer[..len as usize]))
    }
}

/// Capture the current Win32 last-error code.
///
/// Call immediately after a Win32 function that signals failure;
/// `GetLastError` reads thread-local state that any later call may overwrite.
pub(crate) fn last_error_code() -> u32 {
    // SAFETY: GetLastError reads thread-local state and never fails.
    unsafe { GetLastError() }.0
}
