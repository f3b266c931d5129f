//! Native engine binding.
//!
//! Maps the rendering engine module into the process exactly once. The
//! process-wide binding lives in a `OnceLock` and is never unloaded; the only
//! teardown path is process exit.

use std::any::Any;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock, PoisonError};
use std::time::Instant;

use libloading::Library;
use log::{debug, error, info};

use crate::config::BridgeConfig;
use crate::error::{BindingError, LoadError};
use crate::native;

/// Whatever a loader hands back for a mapped module. Kept alive by the handle.
pub type LoadedModule = Box<dyn Any + Send + Sync>;

/// Seam between the binding state machine and the platform loader.
pub trait ModuleLoader: Send + Sync {
    fn open(&self, path: &Path) -> Result<LoadedModule, LoadError>;

    /// Whether `module` exports `symbol`.
    fn exports(&self, module: &LoadedModule, symbol: &str) -> bool;
}

/// `dlopen`/`LoadLibrary` through `libloading`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLoader;

impl ModuleLoader for SystemLoader {
    fn open(&self, path: &Path) -> Result<LoadedModule, LoadError> {
        // Running the module's initialisers is the point of binding.
        let library =
            unsafe { Library::new(path) }.map_err(|e| LoadError::new(path, e.to_string()))?;
        Ok(Box::new(library))
    }

    fn exports(&self, module: &LoadedModule, symbol: &str) -> bool {
        let Some(library) = module.downcast_ref::<Library>() else {
            return false;
        };
        let mut name = symbol.as_bytes().to_vec();
        name.push(0);
        unsafe { library.get::<*const ()>(&name).is_ok() }
    }
}

/// Proof that the engine module is mapped and its entry points are callable.
pub struct EngineHandle {
    // Held so the module stays mapped for the handle's lifetime.
    _module: LoadedModule,
    module_name: String,
    location: PathBuf,
    bound_at: Instant,
}

impl EngineHandle {
    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    /// The candidate path that mapped successfully.
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// When binding completed.
    pub fn bound_at(&self) -> Instant {
        self.bound_at
    }
}

impl fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineHandle")
            .field("module_name", &self.module_name)
            .field("location", &self.location)
            .field("bound_at", &self.bound_at)
            .finish_non_exhaustive()
    }
}

/// Init-once binding state for one engine module.
///
/// The first successful `ensure_loaded` wins; later calls only read the
/// stored handle. A failed attempt leaves the state unbound.
pub struct EngineBinding<L> {
    loader: L,
    module: String,
    search_dirs: Vec<PathBuf>,
    required_symbols: Vec<String>,
    handle: OnceLock<EngineHandle>,
    init_lock: Mutex<()>,
    attempts: AtomicUsize,
}

impl<L: ModuleLoader> EngineBinding<L> {
    pub fn new(loader: L, module: impl Into<String>) -> Self {
        Self {
            loader,
            module: module.into(),
            search_dirs: Vec::new(),
            required_symbols: Vec::new(),
            handle: OnceLock::new(),
            init_lock: Mutex::new(()),
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn from_config(loader: L, config: &BridgeConfig) -> Self {
        Self {
            search_dirs: config.search_dirs.clone(),
            required_symbols: config.required_symbols.clone(),
            ..Self::new(loader, config.engine_module.clone())
        }
    }

    pub fn with_search_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_dirs.push(dir.into());
        self
    }

    pub fn requiring(mut self, symbol: impl Into<String>) -> Self {
        self.required_symbols.push(symbol.into());
        self
    }

    pub fn module_name(&self) -> &str {
        &self.module
    }

    /// Bound handle, if a previous `ensure_loaded` succeeded.
    pub fn get(&self) -> Option<&EngineHandle> {
        self.handle.get()
    }

    pub fn is_loaded(&self) -> bool {
        self.handle.get().is_some()
    }

    /// How many times the underlying load mechanism has run.
    pub fn load_attempts(&self) -> usize {
        self.attempts.load(Ordering::Acquire)
    }

    /// Maps the engine module if it is not mapped yet.
    ///
    /// Synchronous; returns only once the module is mapped and every
    /// required entry point resolved, or with the reason it cannot be.
    pub fn ensure_loaded(&self) -> Result<&EngineHandle, BindingError> {
        if let Some(handle) = self.handle.get() {
            return Ok(handle);
        }

        let _guard = self.init_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = self.handle.get() {
            return Ok(handle);
        }

        let handle = self.load()?;
        Ok(self.handle.get_or_init(|| handle))
    }

    fn load(&self) -> Result<EngineHandle, BindingError> {
        self.attempts.fetch_add(1, Ordering::AcqRel);

        let candidates = native::candidate_paths(&self.module, &self.search_dirs);
        let mut failures = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            debug!("binding `{}`: trying {}", self.module, candidate.display());
            match self.loader.open(&candidate) {
                Ok(module) => {
                    self.check_entry_points(&module, &candidate)?;
                    info!(
                        "native engine `{}` bound from {}",
                        self.module,
                        candidate.display()
                    );
                    return Ok(EngineHandle {
                        _module: module,
                        module_name: self.module.clone(),
                        location: candidate,
                        bound_at: Instant::now(),
                    });
                }
                Err(err) => {
                    debug!("binding `{}`: {}", self.module, err);
                    failures.push(err);
                }
            }
        }

        let err = BindingError::ModuleUnavailable {
            module: self.module.clone(),
            failures,
        };
        error!("{err}");
        Err(err)
    }

    fn check_entry_points(&self, module: &LoadedModule, location: &Path) -> Result<(), BindingError> {
        let missing = self
            .required_symbols
            .iter()
            .find(|symbol| !self.loader.exports(module, symbol));

        match missing {
            Some(symbol) => {
                let err = BindingError::MissingEntryPoint {
                    module: self.module.clone(),
                    location: location.to_path_buf(),
                    symbol: symbol.clone(),
                };
                error!("{err}");
                Err(err)
            }
            None => Ok(()),
        }
    }
}

impl<L> fmt::Debug for EngineBinding<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineBinding")
            .field("module", &self.module)
            .field("search_dirs", &self.search_dirs)
            .field("required_symbols", &self.required_symbols)
            .field("handle", &self.handle.get())
            .field("attempts", &self.attempts.load(Ordering::Relaxed))
            .finish()
    }
}

static ENGINE: OnceLock<EngineBinding<SystemLoader>> = OnceLock::new();

/// The process-wide engine binding, configured from `BridgeConfig::default()`.
pub fn engine() -> &'static EngineBinding<SystemLoader> {
    ENGINE.get_or_init(|| EngineBinding::from_config(SystemLoader, &BridgeConfig::default()))
}

/// Binds the process-wide engine. Idempotent.
pub fn ensure_loaded() -> Result<&'static EngineHandle, BindingError> {
    engine().ensure_loaded()
}
