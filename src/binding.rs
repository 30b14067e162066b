// ── Handle → object binding ──────────────────────────────────────────────────
//
// Maps each live handle to a weak, non-owning reference to the application
// object that owns it.  The registry is thread local: the platform delivers a
// window's messages only to the thread that created it, so a binding is only
// ever written and read on that thread.
//
// Lifecycle of one entry:
//   stage    – before the creation call; keyed by a bind token that travels
//              through the platform as the creation-time user value
//   bind     – on WM_NCCREATE; the token is claimed (exactly once), the
//              handle is stored in the object's `Window`, the entry moves
//              to the handle map
//   resolve  – on every message
//   unbind   – on WM_DESTROY, before the object's destroy handler runs

use std::cell::RefCell;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::rc::{Rc, Weak};

use log::{debug, warn};

use crate::platform::WindowHandle;
use crate::window::AppWindow;

#[derive(Default)]
struct Bindings {
    last_token: usize,
    staged: HashMap<NonZeroUsize, Weak<dyn AppWindow>>,
    bound: HashMap<WindowHandle, Weak<dyn AppWindow>>,
}

thread_local! {
    static BINDINGS: RefCell<Bindings> = RefCell::new(Bindings::default());
}

/// Identifies one staged binding while its window is being created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BindToken(NonZeroUsize);

impl BindToken {
    /// The value handed to the platform as creation-time user data.
    pub fn as_raw(self) -> usize {
        self.0.get()
    }
}

/// Park `owner` until its window's creation message arrives.
pub(crate) fn stage(owner: Weak<dyn AppWindow>) -> BindToken {
    BINDINGS.with(|b| {
        let mut b = b.borrow_mut();
        b.last_token = b.last_token.wrapping_add(1).max(1);
        let token = NonZeroUsize::new(b.last_token).unwrap_or(NonZeroUsize::MIN);
        b.staged.insert(token, owner);
        BindToken(token)
    })
}

/// Claim the staged binding for `raw_token` and bind it to `handle`.
///
/// Returns `false` when nothing is staged under that value (a window created
/// by someone else, or a token already claimed).
pub(crate) fn bind(raw_token: usize, handle: WindowHandle) -> bool {
    let Some(token) = NonZeroUsize::new(raw_token) else {
        return false;
    };
    let staged = BINDINGS.with(|b| b.borrow_mut().staged.remove(&token));
    match staged {
        Some(owner) => attach(owner, handle),
        None => false,
    }
}

/// Remove a staged binding that was never claimed.
pub(crate) fn withdraw(token: BindToken) -> Option<Weak<dyn AppWindow>> {
    BINDINGS.with(|b| b.borrow_mut().staged.remove(&token.0))
}

/// Bind `handle` to `owner` directly.
pub(crate) fn attach(owner: Weak<dyn AppWindow>, handle: WindowHandle) -> bool {
    let Some(object) = owner.upgrade() else {
        warn!("{handle:?}: owning object dropped before its window was created");
        return false;
    };
    // No registry borrow is held while touching the object.
    object.window().attach(handle);
    let previous = BINDINGS.with(|b| b.borrow_mut().bound.insert(handle, owner));
    if previous.is_some() {
        warn!("{handle:?}: replaced an existing binding");
    }
    debug!("{handle:?}: bound");
    true
}

/// The object that owns `handle`, if one is bound and still alive.
///
/// A binding whose object has been dropped is removed on the way.
pub fn resolve(handle: WindowHandle) -> Option<Rc<dyn AppWindow>> {
    BINDINGS.with(|b| {
        let mut b = b.borrow_mut();
        let object = b.bound.get(&handle)?.upgrade();
        if object.is_none() {
            warn!("{handle:?}: owning object was dropped, removing stale binding");
            b.bound.remove(&handle);
        }
        object
    })
}

/// Remove the binding for `handle` and clear the object's `Window`.
pub(crate) fn unbind(handle: WindowHandle) -> Option<Rc<dyn AppWindow>> {
    let object = BINDINGS
        .with(|b| b.borrow_mut().bound.remove(&handle))
        .and_then(|owner| owner.upgrade());
    if let Some(object) = &object {
        object.window().detach();
    }
    debug!("{handle:?}: unbound");
    object
}

/// Number of handles bound on the calling thread.
pub fn bound_count() -> usize {
    BINDINGS.with(|b| b.borrow().bound.len())
}

/// Number of bindings staged on the calling thread and not yet claimed.
pub fn staged_count() -> usize {
    BINDINGS.with(|b| b.borrow().staged.len())
}
