// ── Message router ────────────────────────────────────────────────────────────
//
// `dispatch` is the one entry point every backend calls for every message:
//   1. WM_NCCREATE: claim the staged binding and bind the new handle.
//   2. Resolve the handle to its owning object; unbound → default processing.
//   3. Decode the payload and call the object's typed handler.

use log::trace;

use crate::binding;
use crate::message::{Decoded, HitRegion, Message, WM_NCCREATE};
use crate::platform::{Platform, WindowHandle};
use crate::window::AppWindow;

// ── Context ───────────────────────────────────────────────────────────────────

/// What a handler gets besides its decoded arguments: the window and the
/// message being dispatched, and a way back to the platform.
///
/// Only the router builds one, and handlers only ever borrow it, so it cannot
/// outlive the dispatch it was made for.
pub struct Context<'a> {
    platform: &'a dyn Platform,
    handle: WindowHandle,
    message: Message,
}

impl<'a> Context<'a> {
    pub(crate) fn new(platform: &'a dyn Platform, handle: WindowHandle, message: Message) -> Self {
        Self {
            platform,
            handle,
            message,
        }
    }

    /// Handle of the window being dispatched to.
    pub fn handle(&self) -> WindowHandle {
        self.handle
    }

    /// The message being dispatched, undecoded.
    pub fn message(&self) -> Message {
        self.message
    }

    pub fn platform(&self) -> &'a dyn Platform {
        self.platform
    }

    /// Platform default processing of the message being dispatched.
    pub fn default_proc(&self) -> isize {
        self.forward(self.message)
    }

    /// Default answer to a hit-test query at `(x, y)`.
    pub fn forward_hittest(&self, x: i32, y: i32) -> HitRegion {
        HitRegion::from_result(self.forward(Message::hittest(x, y)))
    }

    /// Default answer to a cursor-shape query.
    pub fn forward_set_cursor(&self, target: Option<WindowHandle>, hit: HitRegion, trigger: u32) -> bool {
        self.forward(Message::set_cursor(target, hit, trigger)) != 0
    }

    /// Ask this thread's message pump to stop with `exit_code`.
    pub fn post_quit(&self, exit_code: i32) {
        self.platform.post_quit(exit_code);
    }

    // Callers pass either `self.message` or a hit-test / set-cursor query,
    // whose payloads are coordinates, codes and a handle value.
    #[allow(unsafe_code)]
    fn forward(&self, message: Message) -> isize {
        // SAFETY: `self.message` is in flight for `self.handle` for as long as
        // this context is borrowed; the re-encoded queries carry no pointers.
        unsafe { self.platform.def_window_proc(self.handle, message) }
    }
}

// ── Dispatch ──────────────────────────────────────────────────────────────────

/// Route one message for `handle` and return the answer for the platform.
///
/// # Safety
///
/// `message` must have been delivered by `platform` for `handle` and still be
/// in flight: the backend may dereference its payload, both to find the
/// creation-time user value on `WM_NCCREATE` and in default processing.
#[allow(unsafe_code)]
pub unsafe fn dispatch(platform: &dyn Platform, handle: WindowHandle, message: Message) -> isize {
    if message.code == WM_NCCREATE {
        // SAFETY: forwarded from this function's own contract.
        if let Some(token) = unsafe { platform.creation_param(&message) } {
            binding::bind(token, handle);
        }
    }

    let Some(owner) = binding::resolve(handle) else {
        trace!("{handle:?}: no owner for message {:#06x}, default processing", message.code);
        // SAFETY: forwarded from this function's own contract.
        return unsafe { platform.def_window_proc(handle, message) };
    };

    route(owner.as_ref(), &Context::new(platform, handle, message), message)
}

fn route(owner: &dyn AppWindow, cx: &Context<'_>, message: Message) -> isize {
    trace!("{:?}: message {:#06x}", cx.handle(), message.code);

    match message.decode() {
        Decoded::Destroy => {
            // Unbind first: nothing may reach the object through this handle
            // once its destroy handler has started.
            binding::unbind(cx.handle());
            owner.on_destroy(cx);
            cx.default_proc()
        }
        Decoded::LeftButtonUp { x, y, flags } => {
            owner.on_left_button_up(cx, x, y, flags);
            owner.on_message(cx, message)
        }
        Decoded::MouseMove { x, y, flags } => {
            owner.on_mouse_move(cx, x, y, flags);
            owner.on_message(cx, message)
        }
        Decoded::HitTest { x, y } => owner.on_hittest(cx, x, y).into_result(),
        Decoded::Paint => {
            owner.on_paint(cx);
            owner.on_message(cx, message)
        }
        Decoded::SetCursor { target, hit, trigger } => {
            isize::from(owner.on_set_cursor(cx, target, hit, trigger))
        }
        Decoded::Other => owner.on_message(cx, message),
    }
}
