// ── Main window ───────────────────────────────────────────────────────────────
//
// A main window ends the application: when it is destroyed, the thread's
// message pump is asked to stop.

use std::ops::Deref;

use crate::message::{HitRegion, Message, ModifierFlags};
use crate::platform::WindowHandle;
use crate::router::Context;
use crate::window::{AppWindow, Window};

/// Exit code a main window posts when it is destroyed.
pub const QUIT_EXIT_CODE: i32 = 1;

/// Wraps an [`AppWindow`] so that destroying it terminates the message pump
/// with [`QUIT_EXIT_CODE`].
///
/// Every handler is forwarded to the wrapped window; its own `on_destroy`
/// still runs, before the quit request is posted.
#[derive(Debug, Default)]
pub struct MainWindow<T> {
    inner: T,
}

impl<T: AppWindow> MainWindow<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T> Deref for MainWindow<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T: AppWindow> AppWindow for MainWindow<T> {
    fn window(&self) -> &Window {
        self.inner.window()
    }

    fn on_destroy(&self, cx: &Context<'_>) {
        self.inner.on_destroy(cx);
        cx.post_quit(QUIT_EXIT_CODE);
    }

    fn on_left_button_up(&self, cx: &Context<'_>, x: i32, y: i32, flags: ModifierFlags) {
        self.inner.on_left_button_up(cx, x, y, flags);
    }

    fn on_mouse_move(&self, cx: &Context<'_>, x: i32, y: i32, flags: ModifierFlags) {
        self.inner.on_mouse_move(cx, x, y, flags);
    }

    fn on_hittest(&self, cx: &Context<'_>, x: i32, y: i32) -> HitRegion {
        self.inner.on_hittest(cx, x, y)
    }

    fn on_paint(&self, cx: &Context<'_>) {
        self.inner.on_paint(cx);
    }

    fn on_set_cursor(
        &self,
        cx: &Context<'_>,
        target: Option<WindowHandle>,
        hit: HitRegion,
        trigger: u32,
    ) -> bool {
        self.inner.on_set_cursor(cx, target, hit, trigger)
    }

    fn on_message(&self, cx: &Context<'_>, message: Message) -> isize {
        self.inner.on_message(cx, message)
    }
}
