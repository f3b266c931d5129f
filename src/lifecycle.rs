//! Lifecycle bridge between the host activity and the native engine.
//!
//! The host owns the activity object and dispatches two callbacks here:
//! creation and back navigation. Creation is passed through to the host's
//! default behaviour once the engine binding is confirmed. Back navigation
//! runs the host's default handling, asks the managed runtime (if any) for a
//! collection pass, and then terminates the process.

use log::{debug, info, warn};

use crate::binding::{EngineBinding, EngineHandle, ModuleLoader};
use crate::config::ExitPolicy;
use crate::error::{BindingError, BridgeError, BridgeResult};

/// The host framework's default lifecycle behaviour.
pub trait ActivityHost {
    /// Opaque state the host hands to creation; never inspected here.
    type SavedState;

    fn default_on_create(&mut self, saved_state: Self::SavedState) -> BridgeResult<()>;

    fn default_on_back_pressed(&mut self) -> BridgeResult<()>;

    /// Requests an immediate collection pass on the host's managed runtime.
    /// Returns `Ok(false)` when the host has no such runtime.
    fn request_collection(&mut self) -> BridgeResult<bool> {
        Ok(false)
    }
}

/// Terminates the process. Never returns.
pub trait ProcessExit {
    fn exit(&self, code: i32) -> !;
}

/// Exits through `std::process::exit` after flushing the logger.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImmediateExit;

impl ProcessExit for ImmediateExit {
    fn exit(&self, code: i32) -> ! {
        log::logger().flush();
        std::process::exit(code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Created,
    Running,
    Exiting,
}

/// One host activity's view of the bridge.
///
/// Only constructible from a bound engine, so nothing can be forwarded
/// before binding has completed.
pub struct LifecycleBridge<'e, X> {
    engine: &'e EngineHandle,
    exit: X,
    policy: ExitPolicy,
    state: SessionState,
    sessions: u64,
}

impl<'e, X: ProcessExit> LifecycleBridge<'e, X> {
    pub fn new(engine: &'e EngineHandle, exit: X, policy: ExitPolicy) -> Self {
        Self {
            engine,
            exit,
            policy,
            state: SessionState::Created,
            sessions: 0,
        }
    }

    /// Ensures `binding` is loaded and opens a session on it.
    pub fn bind<L: ModuleLoader>(
        binding: &'e EngineBinding<L>,
        exit: X,
        policy: ExitPolicy,
    ) -> Result<Self, BindingError> {
        let engine = binding.ensure_loaded()?;
        Ok(Self::new(engine, exit, policy))
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Number of creation notifications handled so far.
    pub fn sessions(&self) -> u64 {
        self.sessions
    }

    /// Creation hook. `saved_state` reaches the host default untouched.
    pub fn on_create<H: ActivityHost>(
        &mut self,
        host: &mut H,
        saved_state: H::SavedState,
    ) -> BridgeResult<()> {
        if self.state == SessionState::Exiting {
            warn!("creation after exit was requested; ignoring");
            return Err(BridgeError::SessionTerminated);
        }
        if self.state == SessionState::Running {
            debug!("activity recreated; starting a new session");
        }

        self.state = SessionState::Created;
        self.sessions += 1;
        info!(
            "activity created (session {}), engine `{}` bound from {}",
            self.sessions,
            self.engine.module_name(),
            self.engine.location().display()
        );

        host.default_on_create(saved_state)?;
        self.state = SessionState::Running;
        Ok(())
    }

    /// Back-navigation hook. Ends the process.
    pub fn on_back_pressed<H: ActivityHost>(&mut self, host: &mut H) -> ! {
        self.state = SessionState::Exiting;
        info!("back navigation: exiting");

        if let Err(err) = host.default_on_back_pressed() {
            warn!("default back handling failed: {err}");
        }

        if self.policy.collect_before_exit {
            match host.request_collection() {
                Ok(true) => debug!("collection pass requested"),
                Ok(false) => debug!("host has no managed runtime to collect"),
                Err(err) => warn!("collection request failed: {err}"),
            }
        }

        info!("terminating process with code {}", self.policy.code);
        self.exit.exit(self.policy.code)
    }
}
