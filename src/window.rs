// ── Application windows ───────────────────────────────────────────────────────
//
// `Window` owns the native handle of one application object; `AppWindow` is
// the set of typed handlers a concrete window type may override; `create`
// wires the two together.

use std::cell::Cell;
use std::rc::{Rc, Weak};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::binding;
use crate::class;
use crate::error::{PlatformCallFailure, Result};
use crate::message::{HitRegion, Message, ModifierFlags};
use crate::platform::{CreateRequest, Platform, WindowHandle};
use crate::router::Context;

// ── Window ────────────────────────────────────────────────────────────────────

/// Owner of exactly one native window handle.
///
/// Starts without a handle.  The handle is set when the platform delivers the
/// creation message and cleared when it delivers `WM_DESTROY`.  Dropping a
/// `Window` does not destroy the native window; see [`Window::destroy`].
///
/// Neither `Clone` nor `Copy`: a handle has exactly one owner.
#[derive(Debug, Default)]
pub struct Window {
    handle: Cell<Option<WindowHandle>>,
}

impl Window {
    /// A window that has not been created yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// The live handle, or `None` before creation and after destruction.
    pub fn handle(&self) -> Option<WindowHandle> {
        self.handle.get()
    }

    pub fn is_created(&self) -> bool {
        self.handle.get().is_some()
    }

    /// Ask the platform to destroy the native window.
    ///
    /// The handle stays set until the platform delivers `WM_DESTROY`.  Does
    /// nothing if the window was never created or is already gone.
    pub fn destroy(&self, platform: &dyn Platform) -> Result<()> {
        if let Some(handle) = self.handle.get() {
            platform
                .destroy_window(handle)
                .map_err(|code| PlatformCallFailure::new(platform, "DestroyWindow", code))?;
        }
        Ok(())
    }

    pub(crate) fn attach(&self, handle: WindowHandle) {
        self.handle.set(Some(handle));
    }

    pub(crate) fn detach(&self) {
        self.handle.set(None);
    }
}

#[cfg(windows)]
impl From<&Window> for windows::Win32::Foundation::HWND {
    fn from(window: &Window) -> Self {
        window.handle().map(Self::from).unwrap_or_default()
    }
}

// ── Creation parameters ───────────────────────────────────────────────────────

/// Initial configuration of a window.  Passed once, at creation.
///
/// Readable from JSON; missing fields keep their defaults:
///
/// ```
/// # use hwnd_bind::CreationParameters;
/// let params = CreationParameters::from_json(r#"{ "caption": "Hello", "size": [640, 480] }"#)?;
/// assert_eq!(params.caption(), "Hello");
/// assert_eq!(params.position(), None);
/// # Ok::<(), hwnd_bind::Error>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreationParameters {
    caption: String,
    position: Option<(i32, i32)>,
    size: Option<(i32, i32)>,
}

impl CreationParameters {
    /// Empty caption, platform-chosen position and size.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = caption.into();
        self
    }

    pub fn with_position(mut self, x: i32, y: i32) -> Self {
        self.position = Some((x, y));
        self
    }

    pub fn with_size(mut self, width: i32, height: i32) -> Self {
        self.size = Some((width, height));
        self
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn position(&self) -> Option<(i32, i32)> {
        self.position
    }

    pub fn size(&self) -> Option<(i32, i32)> {
        self.size
    }
}

// ── AppWindow ─────────────────────────────────────────────────────────────────

/// A window type owned by the application.
///
/// Every handler has a default; a concrete type overrides only the ones it
/// cares about and the router always calls the concrete type's version.
/// Handlers take `&self`: the platform may re-enter the window procedure
/// while a handler runs (e.g. `DestroyWindow` from inside a click handler),
/// so per-window state belongs in `Cell`/`RefCell` fields.
pub trait AppWindow: 'static {
    /// The embedded handle owner.
    fn window(&self) -> &Window;

    /// `WM_DESTROY`.  The handle is already unbound when this runs; no other
    /// handler of this object is called for the handle afterward.
    fn on_destroy(&self, _cx: &Context<'_>) {}

    /// `WM_LBUTTONUP` at client coordinates `(x, y)`.
    fn on_left_button_up(&self, _cx: &Context<'_>, _x: i32, _y: i32, _flags: ModifierFlags) {}

    /// `WM_MOUSEMOVE` at client coordinates `(x, y)`.
    fn on_mouse_move(&self, _cx: &Context<'_>, _x: i32, _y: i32, _flags: ModifierFlags) {}

    /// `WM_NCHITTEST` at screen coordinates `(x, y)`.
    fn on_hittest(&self, cx: &Context<'_>, x: i32, y: i32) -> HitRegion {
        cx.forward_hittest(x, y)
    }

    /// `WM_PAINT`.
    fn on_paint(&self, _cx: &Context<'_>) {}

    /// `WM_SETCURSOR`.  Return `true` to stop further cursor processing.
    fn on_set_cursor(
        &self,
        cx: &Context<'_>,
        target: Option<WindowHandle>,
        hit: HitRegion,
        trigger: u32,
    ) -> bool {
        cx.forward_set_cursor(target, hit, trigger)
    }

    /// Every message without a more specific handler, and the answer for the
    /// handlers above that have none of their own.
    fn on_message(&self, cx: &Context<'_>, _message: Message) -> isize {
        cx.default_proc()
    }

    /// Register the class for `Self`, create the native window, and bind it
    /// to the returned object.  See [`create`].
    fn create(self, platform: &dyn Platform, params: CreationParameters) -> Result<Rc<Self>>
    where
        Self: Sized,
    {
        create(platform, self, params)
    }
}

/// Register the class for `T`, create the native window, and bind it.
///
/// On success the returned object has a live handle and the handle resolves
/// back to it.  On failure no handle exists and nothing stays bound.
pub fn create<T: AppWindow>(
    platform: &dyn Platform,
    window: T,
    params: CreationParameters,
) -> Result<Rc<T>> {
    let class_name = class::register_class::<T>(platform)?;

    let owner = Rc::new(window);
    let weak: Weak<dyn AppWindow> = Rc::downgrade(&owner) as Weak<T>;
    let token = binding::stage(weak);

    let request = CreateRequest {
        class_name: &class_name,
        caption: params.caption(),
        position: params.position(),
        size: params.size(),
        module: platform.module_handle(),
        param: token.as_raw(),
    };

    let result = platform.create_window(&request);
    // Claimed by the router on WM_NCCREATE; whatever is left here was not.
    let unclaimed = binding::withdraw(token);

    let handle = match result {
        Ok(handle) => handle,
        Err(code) => {
            // The platform may have delivered WM_NCCREATE before giving up.
            if let Some(handle) = owner.window().handle() {
                binding::unbind(handle);
            }
            owner.window().detach();
            return Err(PlatformCallFailure::new(platform, "CreateWindow", code).into());
        }
    };

    if let Some(weak) = unclaimed {
        debug!("{class_name}: creation message not seen, binding {handle:?} late");
        binding::attach(weak, handle);
    }

    Ok(owner)
}
