// Release builds run as a GUI application (no console window).
// Debug builds keep the console so that log output is visible.
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]
#![deny(unsafe_code)]

use std::cell::Cell;

use hwnd_bind::{AppWindow, Context, CreationParameters, MainWindow, ModifierFlags, Window};
use log::info;

/// Counts clicks; closing it ends the program.
#[derive(Default)]
struct Hello {
    window: Window,
    clicks: Cell<u32>,
}

impl AppWindow for Hello {
    fn window(&self) -> &Window {
        &self.window
    }

    fn on_left_button_up(&self, _cx: &Context<'_>, x: i32, y: i32, _flags: ModifierFlags) {
        self.clicks.set(self.clicks.get() + 1);
        info!("click {} at ({x}, {y})", self.clicks.get());
    }

    fn on_destroy(&self, _cx: &Context<'_>) {
        info!("closing after {} clicks", self.clicks.get());
    }
}

fn params() -> CreationParameters {
    CreationParameters::new().with_caption("Hello")
}

#[cfg(windows)]
fn run() -> hwnd_bind::Result<i32> {
    use hwnd_bind::platform::win32;

    let platform = win32::Win32;
    let _main = MainWindow::new(Hello::default()).create(&platform, params())?;
    win32::run_message_loop()
}

// Without a desktop, replay a short session against the headless platform.
#[cfg(not(windows))]
fn run() -> hwnd_bind::Result<i32> {
    use hwnd_bind::message::{Message, WM_CLOSE};
    use hwnd_bind::platform::headless::Headless;
    use hwnd_bind::Platform;

    let platform = Headless::new();
    let main = MainWindow::new(Hello::default()).create(&platform, params())?;
    let Some(handle) = main.window().handle() else {
        return Ok(0);
    };

    platform.send(handle, Message::left_button_up(12, 34, ModifierFlags::empty()));
    platform
        .post_message(handle, Message::new(WM_CLOSE, 0, 0))
        .map_err(|code| hwnd_bind::PlatformCallFailure::new(&platform, "PostMessage", code))?;
    Ok(platform.pump().unwrap_or(0))
}

fn main() {
    env_logger::init();

    match run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            // Startup failed before or during the message loop.
            log::error!("{e}");
            #[cfg(windows)]
            hwnd_bind::platform::win32::show_error_dialog(&e.to_string());
            std::process::exit(1);
        }
    }
}
