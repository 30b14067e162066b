// ── Window procedure & message loop ───────────────────────────────────────────
//
// One window procedure serves every class and does no routing of its own;
// everything goes through `router::dispatch`.

#![allow(unsafe_code)]

use windows::{
    core::{w, HSTRING},
    Win32::{
        Foundation::{HWND, LPARAM, LRESULT, WPARAM},
        UI::WindowsAndMessaging::{
            DispatchMessageW, GetMessageW, MessageBoxW, TranslateMessage, MB_ICONERROR, MB_OK,
            MSG,
        },
    },
};

use super::Win32;
use crate::error::{PlatformCallFailure, Result};
use crate::message::Message;
use crate::platform::WindowHandle;
use crate::router;

// ── Window procedure ──────────────────────────────────────────────────────────

// SAFETY: registered as `lpfnWndProc` for every class; Windows calls it on
// the thread that owns `hwnd`, with the message payload valid for the call.
pub(crate) unsafe extern "system" fn wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let Some(handle) = WindowHandle::from_hwnd(hwnd) else {
        return LRESULT(0);
    };
    let message = Message::new(msg, wparam.0, lparam.0);
    // SAFETY: the message comes straight from Windows for this hwnd and is
    // still in flight.
    LRESULT(unsafe { router::dispatch(&Win32, handle, message) })
}

// ── Message loop ──────────────────────────────────────────────────────────────

/// Drive the calling thread's message loop until `WM_QUIT`.
///
/// Returns the exit code passed to `PostQuitMessage`.
pub fn run_message_loop() -> Result<i32> {
    let mut msg = MSG::default();

    loop {
        // SAFETY: `msg` is a valid out-pointer; a null window and a 0..0
        // filter select every message for this thread.
        let ret = unsafe { GetMessageW(&mut msg, HWND::default(), 0, 0) };

        match ret.0 {
            -1 => return Err(PlatformCallFailure::last_error(&Win32, "GetMessage").into()),
            0 => return Ok(msg.wParam.0 as i32),
            // SAFETY: `msg` was filled by a successful GetMessageW.
            _ => unsafe {
                let _ = TranslateMessage(&msg);
                let _ = DispatchMessageW(&msg);
            },
        }
    }
}

// ── Error dialog ──────────────────────────────────────────────────────────────

/// Report a startup failure in a modal, ownerless message box.
pub fn show_error_dialog(message: &str) {
    let text = HSTRING::from(message);
    // SAFETY: `text` outlives the call.
    unsafe {
        let _ = MessageBoxW(HWND::default(), &text, w!("hwnd-bind"), MB_OK | MB_ICONERROR);
    }
}
