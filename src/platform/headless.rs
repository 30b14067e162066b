// ── Headless platform ─────────────────────────────────────────────────────────
//
// An in-memory stand-in for the windowing system.  It follows the Win32
// message sequence closely enough for the router and binder to be exercised
// on any host:
//   • create:  WM_NCCREATE (creation value in lparam), then WM_CREATE;
//              FALSE / -1 answers abort creation
//   • destroy: WM_DESTROY, then WM_NCDESTROY, then the handle is gone
//   • WM_CLOSE default processing destroys the window
//   • posted messages and the quit request are delivered by `pump`
//
// Failures can be injected, default answers scripted, and every call to
// default processing is recorded for inspection.

#![allow(unsafe_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::mpsc::{self, Receiver, Sender};

use log::trace;

use super::{
    ClassDescriptor, CreateRequest, ModuleHandle, Platform, WindowHandle,
    ERROR_CANNOT_FIND_WND_CLASS, ERROR_CLASS_ALREADY_EXISTS, ERROR_INVALID_WINDOW_HANDLE,
};
use crate::message::{
    HitRegion, Message, WM_CLOSE, WM_CREATE, WM_DESTROY, WM_NCCREATE, WM_NCDESTROY, WM_NCHITTEST,
};
use crate::router;

/// Module handle reported for every class.
pub const MODULE: ModuleHandle = ModuleHandle(0x40_0000);

const FIRST_HANDLE: isize = 0x1_0000;

/// What the headless platform knows about one live window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WindowRecord {
    pub class_name: String,
    pub caption: String,
    pub position: Option<(i32, i32)>,
    pub size: Option<(i32, i32)>,
}

#[derive(Default)]
struct State {
    last_handle: isize,
    classes: HashMap<String, ClassDescriptor>,
    windows: HashMap<WindowHandle, WindowRecord>,
    registration_attempts: usize,
    fail_register: Option<u32>,
    fail_create: Option<u32>,
    skip_creation_messages: bool,
    answers: HashMap<u32, isize>,
    descriptions: HashMap<u32, String>,
    default_calls: Vec<(WindowHandle, Message)>,
    last_error: u32,
    quit: Option<i32>,
}

impl State {
    fn fail(&mut self, code: u32) -> u32 {
        self.last_error = code;
        code
    }
}

/// In-memory windowing platform.
///
/// Like a real message queue it belongs to the thread that created it.
pub struct Headless {
    state: RefCell<State>,
    sender: Sender<(WindowHandle, Message)>,
    queue: Receiver<(WindowHandle, Message)>,
    _thread: PhantomData<*const ()>,
}

impl Default for Headless {
    fn default() -> Self {
        Self::new()
    }
}

impl Headless {
    pub fn new() -> Self {
        let (sender, queue) = mpsc::channel();
        let mut state = State {
            last_handle: FIRST_HANDLE,
            ..State::default()
        };
        state.answers.insert(WM_NCCREATE, 1);
        state.answers.insert(WM_NCHITTEST, HitRegion::CLIENT.into_result());
        Self {
            state: RefCell::new(state),
            sender,
            queue,
            _thread: PhantomData,
        }
    }

    // ── Message delivery ──────────────────────────────────────────────────────

    /// Deliver `message` to `handle` synchronously, like `SendMessage`.
    ///
    /// Returns `0` without dispatching if the handle is not a live window.
    pub fn send(&self, handle: WindowHandle, message: Message) -> isize {
        if !self.is_alive(handle) {
            return 0;
        }
        // SAFETY: the message is delivered by this platform, and neither
        // headless `creation_param` nor `def_window_proc` dereferences the
        // payload.
        unsafe { router::dispatch(self, handle, message) }
    }

    /// Dispatch every queued message, then report the quit request, if any.
    ///
    /// Messages for windows that are gone by the time they are dequeued are
    /// dropped.  Returns `None` when the queue ran dry without a quit request.
    pub fn pump(&self) -> Option<i32> {
        while let Ok((handle, message)) = self.queue.try_recv() {
            trace!("pump: {handle:?} {:#06x}", message.code);
            self.send(handle, message);
        }
        self.state.borrow_mut().quit.take()
    }

    /// A handle for posting to this platform's queue from other threads.
    pub fn poster(&self) -> Poster {
        Poster {
            sender: self.sender.clone(),
        }
    }

    // ── Scripting ─────────────────────────────────────────────────────────────

    /// Make the next class registration fail with `code`.
    pub fn fail_register_with(&self, code: u32) {
        self.state.borrow_mut().fail_register = Some(code);
    }

    /// Make the next window creation fail with `code`.
    pub fn fail_create_with(&self, code: u32) {
        self.state.borrow_mut().fail_create = Some(code);
    }

    /// Create windows without sending `WM_NCCREATE`/`WM_CREATE`.
    pub fn skip_creation_messages(&self, skip: bool) {
        self.state.borrow_mut().skip_creation_messages = skip;
    }

    /// Answer default processing of `code` with `result`.
    pub fn set_default_result(&self, code: u32, result: isize) {
        self.state.borrow_mut().answers.insert(code, result);
    }

    /// Describe error `code` as `text`.
    pub fn describe_error_as(&self, code: u32, text: &str) {
        self.state.borrow_mut().descriptions.insert(code, text.to_owned());
    }

    pub fn set_last_error(&self, code: u32) {
        self.state.borrow_mut().last_error = code;
    }

    // ── Inspection ────────────────────────────────────────────────────────────

    pub fn is_alive(&self, handle: WindowHandle) -> bool {
        self.state.borrow().windows.contains_key(&handle)
    }

    pub fn window(&self, handle: WindowHandle) -> Option<WindowRecord> {
        self.state.borrow().windows.get(&handle).cloned()
    }

    pub fn class(&self, name: &str) -> Option<ClassDescriptor> {
        self.state.borrow().classes.get(name).cloned()
    }

    /// Calls to `register_class`, successful or not.
    pub fn registration_attempts(&self) -> usize {
        self.state.borrow().registration_attempts
    }

    /// Every message that reached default processing, in order.
    pub fn default_calls(&self) -> Vec<(WindowHandle, Message)> {
        self.state.borrow().default_calls.clone()
    }

    /// Pending quit request, without consuming it.
    pub fn quit_code(&self) -> Option<i32> {
        self.state.borrow().quit
    }

    fn fail(&self, code: u32) -> u32 {
        self.state.borrow_mut().fail(code)
    }
}

impl Platform for Headless {
    fn module_handle(&self) -> ModuleHandle {
        MODULE
    }

    fn register_class(&self, class: &ClassDescriptor) -> Result<(), u32> {
        let mut state = self.state.borrow_mut();
        state.registration_attempts += 1;
        let code = match state.fail_register.take() {
            Some(code) => code,
            None if state.classes.contains_key(&class.name) => ERROR_CLASS_ALREADY_EXISTS,
            None => {
                state.classes.insert(class.name.clone(), class.clone());
                return Ok(());
            }
        };
        Err(state.fail(code))
    }

    fn create_window(&self, request: &CreateRequest<'_>) -> Result<WindowHandle, u32> {
        let (handle, skip) = {
            let mut state = self.state.borrow_mut();
            if let Some(code) = state.fail_create.take() {
                return Err(state.fail(code));
            }
            if !state.classes.contains_key(request.class_name) {
                return Err(state.fail(ERROR_CANNOT_FIND_WND_CLASS));
            }
            state.last_handle += 2;
            let Some(handle) = WindowHandle::from_raw(state.last_handle) else {
                return Err(state.fail(ERROR_INVALID_WINDOW_HANDLE));
            };
            state.windows.insert(
                handle,
                WindowRecord {
                    class_name: request.class_name.to_owned(),
                    caption: request.caption.to_owned(),
                    position: request.position,
                    size: request.size,
                },
            );
            (handle, state.skip_creation_messages)
        };

        if skip {
            return Ok(handle);
        }

        // FALSE from WM_NCCREATE or -1 from WM_CREATE aborts creation; the
        // caller then sees whatever error code the refusing handler left.
        if self.send(handle, Message::new(WM_NCCREATE, 0, request.param as isize)) == 0 {
            trace!("{handle:?}: WM_NCCREATE refused");
            self.send(handle, Message::new(WM_NCDESTROY, 0, 0));
            self.state.borrow_mut().windows.remove(&handle);
            return Err(self.last_error());
        }
        if self.send(handle, Message::new(WM_CREATE, 0, request.param as isize)) == -1 {
            trace!("{handle:?}: WM_CREATE refused");
            let _ = self.destroy_window(handle);
            return Err(self.last_error());
        }
        Ok(handle)
    }

    fn destroy_window(&self, handle: WindowHandle) -> Result<(), u32> {
        if !self.is_alive(handle) {
            return Err(self.fail(ERROR_INVALID_WINDOW_HANDLE));
        }
        self.send(handle, Message::new(WM_DESTROY, 0, 0));
        self.send(handle, Message::new(WM_NCDESTROY, 0, 0));
        self.state.borrow_mut().windows.remove(&handle);
        Ok(())
    }

    unsafe fn def_window_proc(&self, handle: WindowHandle, message: Message) -> isize {
        let answer = {
            let mut state = self.state.borrow_mut();
            state.default_calls.push((handle, message));
            state.answers.get(&message.code).copied().unwrap_or(0)
        };
        if message.code == WM_CLOSE {
            let _ = self.destroy_window(handle);
        }
        answer
    }

    fn post_message(&self, handle: WindowHandle, message: Message) -> Result<(), u32> {
        if !self.is_alive(handle) {
            return Err(self.fail(ERROR_INVALID_WINDOW_HANDLE));
        }
        self.sender
            .send((handle, message))
            .map_err(|_| self.fail(ERROR_INVALID_WINDOW_HANDLE))
    }

    fn post_quit(&self, exit_code: i32) {
        self.state.borrow_mut().quit = Some(exit_code);
    }

    unsafe fn creation_param(&self, message: &Message) -> Option<usize> {
        (message.code == WM_NCCREATE).then_some(message.lparam as usize)
    }

    fn last_error(&self) -> u32 {
        self.state.borrow().last_error
    }

    fn describe_error(&self, code: u32) -> Option<String> {
        self.state.borrow().descriptions.get(&code).cloned()
    }
}

// ── Cross-thread posting ──────────────────────────────────────────────────────

/// Posts messages to a [`Headless`] queue from any thread.
///
/// Messages are dispatched by [`Headless::pump`] on the platform's own
/// thread, never on the posting thread.
#[derive(Clone, Debug)]
pub struct Poster {
    sender: Sender<(WindowHandle, Message)>,
}

impl Poster {
    /// Queue `message` for `handle`.  Fails once the platform is gone.
    pub fn post(&self, handle: WindowHandle, message: Message) -> Result<(), u32> {
        self.sender
            .send((handle, message))
            .map_err(|_| ERROR_INVALID_WINDOW_HANDLE)
    }
}
