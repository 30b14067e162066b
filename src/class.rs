// ── Window class registration ─────────────────────────────────────────────────
//
// Every concrete window type gets its own window class.  The class name comes
// from an identifier assigned to the type the first time it is seen, so no
// type has to pick a name and two types can never collide.

use std::any::TypeId;
use std::sync::{Mutex, PoisonError};

use log::{debug, trace};

use crate::error::{PlatformCallFailure, Result};
use crate::platform::{ClassDescriptor, Platform, ERROR_CLASS_ALREADY_EXISTS};

/// Prefix shared by every class name this crate registers.
pub const CLASS_PREFIX: &str = "hwnd-bind";

// Window classes are process wide, unlike bindings, so the type table is too.
// Index in the table = identifier of the type.
static CLASS_IDS: Mutex<Vec<TypeId>> = Mutex::new(Vec::new());

/// Stable, per-type class identifier, assigned on first use.
pub fn class_id<T: 'static>() -> usize {
    let type_id = TypeId::of::<T>();
    let mut ids = CLASS_IDS.lock().unwrap_or_else(PoisonError::into_inner);
    match ids.iter().position(|id| *id == type_id) {
        Some(index) => index,
        None => {
            ids.push(type_id);
            ids.len() - 1
        }
    }
}

/// Window class name used for every window of type `T`.
pub fn class_name<T: 'static>() -> String {
    format!("{CLASS_PREFIX}.{}", class_id::<T>())
}

/// Register the window class for `T` and return its name.
///
/// Runs at every construction.  A platform answer of "class already exists"
/// counts as success, so constructing the same type twice is fine; any other
/// failure becomes a `"RegisterClassEx"` [`PlatformCallFailure`].
pub fn register_class<T: 'static>(platform: &dyn Platform) -> Result<String> {
    let class = ClassDescriptor::new(class_name::<T>(), platform.module_handle());

    match platform.register_class(&class) {
        Ok(()) => debug!("registered window class {} for {}", class.name, std::any::type_name::<T>()),
        Err(ERROR_CLASS_ALREADY_EXISTS) => trace!("window class {} already registered", class.name),
        Err(code) => return Err(PlatformCallFailure::new(platform, "RegisterClassEx", code).into()),
    }

    Ok(class.name)
}
