use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use vkpbr_bridge::binding::LoadedModule;
use vkpbr_bridge::{
    native, ActivityHost, BindingError, BridgeConfig, BridgeResult, EngineBinding, ExitPolicy,
    LifecycleBridge, LoadError, ModuleLoader, ProcessExit, SessionState,
};

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Created(Vec<u8>),
    BackHandled,
    Collected,
    Exit(i32),
}

#[derive(Clone, Default)]
struct Timeline(Arc<Mutex<Vec<(Instant, Event)>>>);

impl Timeline {
    fn push(&self, event: Event) {
        self.0.lock().unwrap().push((Instant::now(), event));
    }

    fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().iter().map(|(_, e)| e.clone()).collect()
    }

    fn first_at(&self) -> Option<Instant> {
        self.0.lock().unwrap().first().map(|(at, _)| *at)
    }

    fn at(&self, wanted: &Event) -> Instant {
        self.0
            .lock()
            .unwrap()
            .iter()
            .find(|(_, e)| e == wanted)
            .map(|(at, _)| *at)
            .expect("event recorded")
    }
}

/// Loader that "maps" a fixed set of paths and counts how often it runs.
struct CountingLoader {
    present: Vec<PathBuf>,
    opens: Arc<AtomicUsize>,
}

impl ModuleLoader for CountingLoader {
    fn open(&self, path: &Path) -> Result<LoadedModule, LoadError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if self.present.iter().any(|p| p == path) {
            Ok(Box::new(()))
        } else {
            Err(LoadError::new(path, "library not found"))
        }
    }

    fn exports(&self, _module: &LoadedModule, _symbol: &str) -> bool {
        true
    }
}

struct RecordingHost {
    timeline: Timeline,
}

impl ActivityHost for RecordingHost {
    type SavedState = Vec<u8>;

    fn default_on_create(&mut self, saved_state: Vec<u8>) -> BridgeResult<()> {
        self.timeline.push(Event::Created(saved_state));
        Ok(())
    }

    fn default_on_back_pressed(&mut self) -> BridgeResult<()> {
        self.timeline.push(Event::BackHandled);
        Ok(())
    }

    fn request_collection(&mut self) -> BridgeResult<bool> {
        self.timeline.push(Event::Collected);
        Ok(true)
    }
}

#[derive(Debug)]
struct Terminated(i32);

struct RecordingExit(Timeline);

impl ProcessExit for RecordingExit {
    fn exit(&self, code: i32) -> ! {
        self.0.push(Event::Exit(code));
        panic::panic_any(Terminated(code))
    }
}

fn binding_with_engine(opens: &Arc<AtomicUsize>) -> EngineBinding<CountingLoader> {
    let loader = CountingLoader {
        present: vec![PathBuf::from(native::dynamic_lib_filename("native-lib"))],
        opens: Arc::clone(opens),
    };
    EngineBinding::from_config(
        loader,
        &BridgeConfig::default().with_engine_module("native-lib"),
    )
}

#[test]
fn ensure_loaded_is_idempotent() {
    let opens = Arc::new(AtomicUsize::new(0));
    let binding = binding_with_engine(&opens);

    let first = binding.ensure_loaded().expect("bind").bound_at();
    for _ in 0..5 {
        assert_eq!(binding.ensure_loaded().expect("rebind").bound_at(), first);
    }

    assert_eq!(opens.load(Ordering::SeqCst), 1);
    assert_eq!(binding.load_attempts(), 1);
}

#[test]
fn binding_completes_before_first_forwarded_event() {
    let opens = Arc::new(AtomicUsize::new(0));
    let binding = binding_with_engine(&opens);
    let timeline = Timeline::default();

    let mut bridge = LifecycleBridge::bind(
        &binding,
        RecordingExit(timeline.clone()),
        ExitPolicy::default(),
    )
    .expect("bind");
    let mut host = RecordingHost {
        timeline: timeline.clone(),
    };
    bridge.on_create(&mut host, b"bundle".to_vec()).expect("create");

    let bound_at = binding.get().expect("bound").bound_at();
    assert!(bound_at <= timeline.first_at().expect("forwarded event"));
}

#[test]
fn saved_state_reaches_host_unmodified() {
    let opens = Arc::new(AtomicUsize::new(0));
    let binding = binding_with_engine(&opens);
    let timeline = Timeline::default();
    let saved = vec![0x00, 0xff, 0x10, 0x7f];

    let mut bridge = LifecycleBridge::bind(
        &binding,
        RecordingExit(timeline.clone()),
        ExitPolicy::default(),
    )
    .expect("bind");
    bridge
        .on_create(
            &mut RecordingHost {
                timeline: timeline.clone(),
            },
            saved.clone(),
        )
        .expect("create");

    assert_eq!(timeline.events(), vec![Event::Created(saved)]);
}

#[test]
fn unresolvable_module_aborts_before_any_event() {
    let opens = Arc::new(AtomicUsize::new(0));
    let loader = CountingLoader {
        present: Vec::new(),
        opens: Arc::clone(&opens),
    };
    let binding = EngineBinding::new(loader, "native-lib");
    let timeline = Timeline::default();

    let result = LifecycleBridge::bind(
        &binding,
        RecordingExit(timeline.clone()),
        ExitPolicy::default(),
    );

    let err = result.err().expect("binding must fail");
    assert!(matches!(err, BindingError::ModuleUnavailable { .. }));
    assert!(timeline.events().is_empty());
    assert!(!binding.is_loaded());
}

#[test]
fn back_navigation_handles_default_before_terminating() {
    let opens = Arc::new(AtomicUsize::new(0));
    let binding = binding_with_engine(&opens);
    let timeline = Timeline::default();
    let mut host = RecordingHost {
        timeline: timeline.clone(),
    };

    let mut bridge = LifecycleBridge::bind(
        &binding,
        RecordingExit(timeline.clone()),
        ExitPolicy::default(),
    )
    .expect("bind");
    bridge.on_create(&mut host, Vec::new()).expect("create");
    assert_eq!(bridge.state(), SessionState::Running);

    let payload = panic::catch_unwind(AssertUnwindSafe(|| {
        bridge.on_back_pressed(&mut host);
    }))
    .expect_err("back navigation must terminate");
    assert_eq!(payload.downcast_ref::<Terminated>().map(|t| t.0), Some(0));

    assert_eq!(
        timeline.events(),
        vec![
            Event::Created(Vec::new()),
            Event::BackHandled,
            Event::Collected,
            Event::Exit(0),
        ]
    );
    assert!(timeline.at(&Event::BackHandled) <= timeline.at(&Event::Exit(0)));

    // Nothing reaches the host once the session is exiting.
    assert!(bridge.on_create(&mut host, b"late".to_vec()).is_err());
    assert_eq!(timeline.events().last(), Some(&Event::Exit(0)));
    assert_eq!(bridge.state(), SessionState::Exiting);
}
