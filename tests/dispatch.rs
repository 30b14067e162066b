// Message routing against the headless platform.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use hwnd_bind::binding;
use hwnd_bind::message::{
    WM_CLOSE, WM_CREATE, WM_DESTROY, WM_LBUTTONUP, WM_MOUSEMOVE, WM_NCCREATE, WM_NCDESTROY,
    WM_NCHITTEST, WM_PAINT, WM_SETCURSOR, WM_USER,
};
use hwnd_bind::platform::headless::Headless;
use hwnd_bind::{
    AppWindow, Context, CreationParameters, Error, HitRegion, Message, ModifierFlags, Window,
    WindowHandle,
};

// ── Test windows ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
enum Call {
    Destroy,
    LeftButtonUp(i32, i32, ModifierFlags),
    MouseMove(i32, i32, ModifierFlags),
    HitTest(i32, i32),
    Paint,
    SetCursor(Option<WindowHandle>, HitRegion, u32),
    Message(u32),
}

/// Overrides every handler and records what it was called with.
#[derive(Default)]
struct Recorder {
    window: Window,
    calls: RefCell<Vec<Call>>,
}

impl Recorder {
    fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

impl AppWindow for Recorder {
    fn window(&self) -> &Window {
        &self.window
    }

    fn on_destroy(&self, _cx: &Context<'_>) {
        self.record(Call::Destroy);
    }

    fn on_left_button_up(&self, _cx: &Context<'_>, x: i32, y: i32, flags: ModifierFlags) {
        self.record(Call::LeftButtonUp(x, y, flags));
    }

    fn on_mouse_move(&self, _cx: &Context<'_>, x: i32, y: i32, flags: ModifierFlags) {
        self.record(Call::MouseMove(x, y, flags));
    }

    fn on_hittest(&self, _cx: &Context<'_>, x: i32, y: i32) -> HitRegion {
        self.record(Call::HitTest(x, y));
        HitRegion::CAPTION
    }

    fn on_paint(&self, _cx: &Context<'_>) {
        self.record(Call::Paint);
    }

    fn on_set_cursor(
        &self,
        _cx: &Context<'_>,
        target: Option<WindowHandle>,
        hit: HitRegion,
        trigger: u32,
    ) -> bool {
        self.record(Call::SetCursor(target, hit, trigger));
        true
    }

    fn on_message(&self, cx: &Context<'_>, message: Message) -> isize {
        self.record(Call::Message(message.code));
        cx.default_proc()
    }
}

/// Overrides nothing.
#[derive(Default)]
struct Defaults {
    window: Window,
}

impl AppWindow for Defaults {
    fn window(&self) -> &Window {
        &self.window
    }
}

fn create_recorder(platform: &Headless) -> (Rc<Recorder>, WindowHandle) {
    let recorder = Recorder::default()
        .create(platform, CreationParameters::new())
        .expect("create");
    let handle = recorder.window().handle().expect("created");
    recorder.calls.borrow_mut().clear();
    (recorder, handle)
}

fn same_object<T: AppWindow>(resolved: &Rc<dyn AppWindow>, object: &Rc<T>) -> bool {
    std::ptr::eq(Rc::as_ptr(resolved) as *const (), Rc::as_ptr(object) as *const ())
}

// ── Typed handlers ────────────────────────────────────────────────────────────

#[test]
fn creation_binds_before_create_returns() {
    let platform = Headless::new();
    let recorder = Recorder::default()
        .create(&platform, CreationParameters::new().with_caption("bound"))
        .expect("create");

    let handle = recorder.window().handle().expect("handle set");
    let resolved = binding::resolve(handle).expect("bound");
    assert!(same_object(&resolved, &recorder));
    // WM_NCCREATE is the first message; it already reaches the object.
    assert_eq!(
        recorder.calls()[..2],
        [Call::Message(WM_NCCREATE), Call::Message(WM_CREATE)]
    );
    assert_eq!(platform.window(handle).map(|w| w.caption), Some("bound".to_owned()));
}

#[test]
fn left_button_up_is_decoded() {
    let platform = Headless::new();
    let (recorder, handle) = create_recorder(&platform);

    let flags = ModifierFlags::CONTROL | ModifierFlags::SHIFT;
    platform.send(handle, Message::left_button_up(-5, 70, flags));

    assert_eq!(
        recorder.calls(),
        [Call::LeftButtonUp(-5, 70, flags), Call::Message(WM_LBUTTONUP)]
    );
}

#[test]
fn mouse_move_and_paint_fall_back_to_on_message() {
    let platform = Headless::new();
    let (recorder, handle) = create_recorder(&platform);

    platform.send(handle, Message::mouse_move(1, 2, ModifierFlags::LBUTTON));
    platform.send(handle, Message::paint());

    assert_eq!(
        recorder.calls(),
        [
            Call::MouseMove(1, 2, ModifierFlags::LBUTTON),
            Call::Message(WM_MOUSEMOVE),
            Call::Paint,
            Call::Message(WM_PAINT),
        ]
    );
}

#[test]
fn answering_handlers_return_their_answer() {
    let platform = Headless::new();
    let (recorder, handle) = create_recorder(&platform);

    let region = platform.send(handle, Message::hittest(300, 400));
    let target = Some(handle);
    let handled = platform.send(handle, Message::set_cursor(target, HitRegion::CLIENT, WM_MOUSEMOVE));

    assert_eq!(HitRegion::from_result(region), HitRegion::CAPTION);
    assert_eq!(handled, 1);
    assert_eq!(
        recorder.calls(),
        [
            Call::HitTest(300, 400),
            Call::SetCursor(target, HitRegion::CLIENT, WM_MOUSEMOVE),
        ]
    );
    assert!(platform.default_calls().iter().all(|(_, m)| m.code != WM_NCHITTEST && m.code != WM_SETCURSOR));
}

#[test]
fn unsupported_code_reaches_on_message_once() {
    let platform = Headless::new();
    let (recorder, handle) = create_recorder(&platform);
    platform.set_default_result(WM_USER + 1, 42);

    let result = platform.send(handle, Message::new(WM_USER + 1, 7, 8));

    assert_eq!(result, 42);
    assert_eq!(recorder.calls(), [Call::Message(WM_USER + 1)]);
}

// ── Pass-through defaults ─────────────────────────────────────────────────────

#[test]
fn default_hittest_returns_platform_answer() {
    let platform = Headless::new();
    let window = Defaults::default()
        .create(&platform, CreationParameters::new())
        .expect("create");
    let handle = window.window().handle().expect("created");

    for region in [HitRegion::CLIENT, HitRegion::BOTTOMRIGHT, HitRegion::ERROR] {
        platform.set_default_result(WM_NCHITTEST, region.into_result());
        let answer = platform.send(handle, Message::hittest(-20, 15));
        assert_eq!(HitRegion::from_result(answer), region);
    }
    let (_, forwarded) = *platform.default_calls().last().expect("forwarded");
    assert_eq!(forwarded, Message::hittest(-20, 15));
}

#[test]
fn default_set_cursor_returns_platform_answer() {
    let platform = Headless::new();
    let window = Defaults::default()
        .create(&platform, CreationParameters::new())
        .expect("create");
    let handle = window.window().handle().expect("created");
    let query = Message::set_cursor(Some(handle), HitRegion::CAPTION, WM_MOUSEMOVE);

    assert_eq!(platform.send(handle, query), 0);
    platform.set_default_result(WM_SETCURSOR, 1);
    assert_eq!(platform.send(handle, query), 1);

    let (_, forwarded) = *platform.default_calls().last().expect("forwarded");
    assert_eq!(forwarded, query);
}

// ── Destruction ───────────────────────────────────────────────────────────────

#[test]
fn destroy_unbinds_before_handler_runs() {
    #[derive(Default)]
    struct Probe {
        window: Window,
        bound_during_destroy: Cell<Option<bool>>,
    }

    impl AppWindow for Probe {
        fn window(&self) -> &Window {
            &self.window
        }

        fn on_destroy(&self, cx: &Context<'_>) {
            let bound = binding::resolve(cx.handle()).is_some() || self.window.is_created();
            self.bound_during_destroy.set(Some(bound));
        }
    }

    let platform = Headless::new();
    let probe = Probe::default()
        .create(&platform, CreationParameters::new())
        .expect("create");
    let handle = probe.window().handle().expect("created");

    platform.send(handle, Message::destroy());

    assert_eq!(probe.bound_during_destroy.get(), Some(false));
    assert!(binding::resolve(handle).is_none());
}

#[test]
fn nothing_is_dispatched_after_destroy() {
    let platform = Headless::new();
    let (recorder, handle) = create_recorder(&platform);

    platform.send(handle, Message::destroy());
    platform.send(handle, Message::mouse_move(1, 1, ModifierFlags::empty()));
    platform.send(handle, Message::new(WM_USER, 0, 0));

    assert_eq!(recorder.calls(), [Call::Destroy]);
    let codes: Vec<u32> = platform.default_calls().iter().rev().take(3).map(|(_, m)| m.code).collect();
    assert_eq!(codes, [WM_USER, WM_MOUSEMOVE, WM_DESTROY]);
}

#[test]
fn window_destroy_runs_platform_sequence() {
    let platform = Headless::new();
    let (recorder, handle) = create_recorder(&platform);

    recorder.window().destroy(&platform).expect("destroy");

    assert!(!platform.is_alive(handle));
    assert!(!recorder.window().is_created());
    assert_eq!(recorder.calls(), [Call::Destroy]);
    // Already gone: a second request is a no-op.
    recorder.window().destroy(&platform).expect("no handle, nothing to do");
}

#[test]
fn close_falls_through_to_platform_destroy() {
    let platform = Headless::new();
    let (recorder, handle) = create_recorder(&platform);

    platform.send(handle, Message::new(WM_CLOSE, 0, 0));

    assert_eq!(recorder.calls(), [Call::Message(WM_CLOSE), Call::Destroy]);
    assert!(!platform.is_alive(handle));
}

#[test]
fn handler_may_destroy_its_own_window() {
    #[derive(Default)]
    struct ClosesOnClick {
        window: Window,
        destroyed: Cell<bool>,
    }

    impl AppWindow for ClosesOnClick {
        fn window(&self) -> &Window {
            &self.window
        }

        fn on_left_button_up(&self, cx: &Context<'_>, _x: i32, _y: i32, _flags: ModifierFlags) {
            cx.platform().destroy_window(cx.handle()).expect("destroy");
        }

        fn on_destroy(&self, _cx: &Context<'_>) {
            self.destroyed.set(true);
        }
    }

    let platform = Headless::new();
    let window = ClosesOnClick::default()
        .create(&platform, CreationParameters::new())
        .expect("create");
    let handle = window.window().handle().expect("created");

    platform.send(handle, Message::left_button_up(0, 0, ModifierFlags::empty()));

    assert!(window.destroyed.get());
    assert!(!platform.is_alive(handle));
}

// ── Unbound handles ───────────────────────────────────────────────────────────

#[test]
fn dropped_object_gets_default_processing() {
    let platform = Headless::new();
    let (recorder, handle) = create_recorder(&platform);
    drop(recorder);

    platform.set_default_result(WM_USER, 9);
    assert_eq!(platform.send(handle, Message::new(WM_USER, 0, 0)), 9);
    assert_eq!(binding::bound_count(), 0);
}

#[test]
fn late_binding_when_creation_message_is_missing() {
    let platform = Headless::new();
    platform.skip_creation_messages(true);

    let recorder = Recorder::default()
        .create(&platform, CreationParameters::new())
        .expect("create");
    let handle = recorder.window().handle().expect("bound by create");

    assert!(recorder.calls().is_empty());
    platform.send(handle, Message::paint());
    assert_eq!(recorder.calls()[0], Call::Paint);
    assert_eq!(binding::staged_count(), 0);
}

// ── Creation failure ──────────────────────────────────────────────────────────

#[test]
fn failed_creation_leaves_nothing_bound() {
    let platform = Headless::new();
    platform.describe_error_as(8, "Not enough memory resources are available.\r\n");
    platform.fail_create_with(8);

    let err = Recorder::default()
        .create(&platform, CreationParameters::new())
        .err()
        .expect("creation fails");

    let failure = match err {
        Error::PlatformCall(failure) => failure,
        other => panic!("expected a platform failure, got {other:?}"),
    };
    assert_eq!(failure.context(), "CreateWindow");
    assert_eq!(failure.code(), 8);
    assert_eq!(
        failure.to_string(),
        "CreateWindow: error 8: Not enough memory resources are available."
    );
    assert_eq!(binding::staged_count(), 0);
    assert_eq!(binding::bound_count(), 0);
}

#[test]
fn refused_creation_unbinds_the_object() {
    struct Refusing {
        window: Window,
        seen: Rc<RefCell<Vec<u32>>>,
        created_when_dropped: Rc<Cell<Option<bool>>>,
    }

    impl AppWindow for Refusing {
        fn window(&self) -> &Window {
            &self.window
        }

        fn on_message(&self, cx: &Context<'_>, message: Message) -> isize {
            self.seen.borrow_mut().push(message.code);
            match message.code {
                WM_NCCREATE => 0,
                _ => cx.default_proc(),
            }
        }
    }

    impl Drop for Refusing {
        fn drop(&mut self) {
            self.created_when_dropped.set(Some(self.window.is_created()));
        }
    }

    let platform = Headless::new();
    platform.set_last_error(1234);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let created_when_dropped = Rc::new(Cell::new(None));

    let err = Refusing {
        window: Window::new(),
        seen: Rc::clone(&seen),
        created_when_dropped: Rc::clone(&created_when_dropped),
    }
    .create(&platform, CreationParameters::new())
    .err()
    .expect("creation refused");

    let failure = match err {
        Error::PlatformCall(failure) => failure,
        other => panic!("expected a platform failure, got {other:?}"),
    };
    assert_eq!(failure.context(), "CreateWindow");
    assert_eq!(failure.code(), 1234);
    // The object was reached through its binding before creation failed.
    assert_eq!(*seen.borrow(), [WM_NCCREATE, WM_NCDESTROY]);
    assert_eq!(created_when_dropped.get(), Some(false));
    assert_eq!(binding::bound_count(), 0);
    assert_eq!(binding::staged_count(), 0);
}

// ── Default processing ────────────────────────────────────────────────────────

#[test]
fn default_proc_forwards_the_message_in_flight() {
    #[derive(Default)]
    struct Forwarder {
        window: Window,
        in_flight: Cell<Option<Message>>,
    }

    impl AppWindow for Forwarder {
        fn window(&self) -> &Window {
            &self.window
        }

        fn on_message(&self, cx: &Context<'_>, message: Message) -> isize {
            assert_eq!(cx.message(), message);
            self.in_flight.set(Some(cx.message()));
            cx.default_proc()
        }
    }

    let platform = Headless::new();
    let window = Forwarder::default()
        .create(&platform, CreationParameters::new())
        .expect("create");
    let handle = window.window().handle().expect("created");
    platform.set_default_result(WM_USER + 5, 77);

    let message = Message::new(WM_USER + 5, 0xAB, -3);
    assert_eq!(platform.send(handle, message), 77);

    assert_eq!(window.in_flight.get(), Some(message));
    assert_eq!(platform.default_calls().last(), Some(&(handle, message)));
}
