// ── Safety policy ────────────────────────────────────────────────────────────
// Unsafe code is forbidden everywhere except:
//   • `platform::win32`    – Win32 / WinAPI FFI
//   • `platform::headless` – calls into the router entry point
//   • `router`             – the entry point's creation-data contract and
//                            forwarding of in-flight messages
// Each unsafe block in those places MUST carry a `// SAFETY:` comment.
#![deny(unsafe_code)]

//! Bind native windows to typed Rust objects.
//!
//! A window type is an ordinary struct that embeds a [`Window`] and implements
//! [`AppWindow`]. Creating it registers a window class for the type (once per
//! type, idempotently), creates the native window, and binds the new handle
//! back to the object. From then on every message the platform delivers is
//! decoded and routed to the matching typed handler method, or to
//! [`AppWindow::on_message`] when no dedicated handler exists.
//!
//! ```no_run
//! use std::rc::Rc;
//! use hwnd_bind::{AppWindow, Context, CreationParameters, MainWindow, ModifierFlags, Window};
//!
//! #[derive(Default)]
//! struct Hello {
//!     window: Window,
//! }
//!
//! impl AppWindow for Hello {
//!     fn window(&self) -> &Window {
//!         &self.window
//!     }
//!
//!     fn on_left_button_up(&self, _cx: &Context<'_>, x: i32, y: i32, _flags: ModifierFlags) {
//!         println!("clicked at ({x}, {y})");
//!     }
//! }
//!
//! # #[cfg(windows)]
//! # fn main() -> hwnd_bind::Result<()> {
//! let platform = hwnd_bind::platform::win32::Win32;
//! let _main: Rc<MainWindow<Hello>> = MainWindow::new(Hello::default())
//!     .create(&platform, CreationParameters::new().with_caption("Hello"))?;
//! let _exit_code = hwnd_bind::platform::win32::run_message_loop()?;
//! # Ok(())
//! # }
//! # #[cfg(not(windows))]
//! # fn main() {}
//! ```

pub mod binding;
pub mod class;
pub mod error;
pub mod main_window;
pub mod message;
pub mod platform;
pub mod router;
pub mod window;

pub use error::{Error, PlatformCallFailure, Result};
pub use main_window::{MainWindow, QUIT_EXIT_CODE};
pub use message::{HitRegion, Message, ModifierFlags};
pub use platform::{Platform, WindowHandle};
pub use router::Context;
pub use window::{create, AppWindow, CreationParameters, Window};
