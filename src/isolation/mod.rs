//! Isolation boundary
//!
//! Builds an isolation context from a resolved classpath, resolves the
//! bootstrap and application entry points inside it and drives the bundle
//! lifecycle:
//!
//! ```text
//! Created -> Starting -> Running -> Stopped
//!               |
//!               +------> Failed
//! ```

pub mod context;
pub mod launcher;
pub mod registry;
pub mod scheme;

pub use context::{
    Application, ApplicationFactory, Bootstrap, BootstrapFactory, IsolationContext, ModuleLoader,
    StartupError, Symbol, application_factory, current_context,
};
pub use launcher::IsolatedLauncher;
pub use registry::RegistryLoader;

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::Classpath;
use crate::error::{Result, illegal_state, symbol_not_found};

/// Symbol under which the runner artifact exports [`IsolatedLauncher`]
pub const BOOTSTRAP_SYMBOL: &str = "isolated_runner::IsolatedLauncher";

/// Lifecycle state of a launched bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LaunchState {
    Created,
    Starting,
    Running,
    Stopped,
    Failed,
}

impl LaunchState {
    pub fn can_transition_to(self, next: LaunchState) -> bool {
        matches!(
            (self, next),
            (LaunchState::Created, LaunchState::Starting)
                | (LaunchState::Starting, LaunchState::Running | LaunchState::Failed)
                | (LaunchState::Running, LaunchState::Stopped)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, LaunchState::Stopped | LaunchState::Failed)
    }
}

impl fmt::Display for LaunchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LaunchState::Created => "created",
            LaunchState::Starting => "starting",
            LaunchState::Running => "running",
            LaunchState::Stopped => "stopped",
            LaunchState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A launched bundle
pub struct BundleHandle {
    name: String,
    entry_point: String,
    state: LaunchState,
    bootstrap: Box<dyn Bootstrap>,
    context: Arc<dyn IsolationContext>,
}

impl BundleHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    pub fn state(&self) -> LaunchState {
        self.state
    }

    pub fn context(&self) -> &Arc<dyn IsolationContext> {
        &self.context
    }

    fn transition(&mut self, next: LaunchState, operation: &str) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(illegal_state(&self.name, self.state.to_string(), operation));
        }
        debug!(bundle = %self.name, from = %self.state, to = %next, "state transition");
        self.state = next;
        Ok(())
    }

    /// Stop the bundle's application
    pub fn stop(&mut self) -> Result<()> {
        if self.state != LaunchState::Running {
            return Err(illegal_state(&self.name, self.state.to_string(), "stop"));
        }
        self.bootstrap.stop()?;
        self.transition(LaunchState::Stopped, "stop")
    }
}

impl fmt::Debug for BundleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BundleHandle")
            .field("name", &self.name)
            .field("entry_point", &self.entry_point)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Launches bundles into isolation contexts built by a [`ModuleLoader`]
#[derive(Clone)]
pub struct IsolationBoundary {
    loader: Arc<dyn ModuleLoader>,
}

impl IsolationBoundary {
    pub fn new(loader: Arc<dyn ModuleLoader>) -> Self {
        Self { loader }
    }

    /// Launch `application_symbol` through `bootstrap_symbol`, both resolved
    /// inside a fresh context built from `classpath`.
    ///
    /// Blocks until the application has started on its dedicated thread.
    pub fn launch(
        &self,
        classpath: &Classpath,
        bootstrap_symbol: &str,
        application_symbol: &str,
        name: &str,
        args: Vec<String>,
    ) -> Result<BundleHandle> {
        if classpath.has_packaged() {
            scheme::ensure_registered();
        }

        let context = self.loader.create_context(classpath)?;
        let bootstrap = match context.resolve(bootstrap_symbol)? {
            Symbol::Bootstrap(factory) => factory,
            other => return Err(wrong_kind(bootstrap_symbol, &other, classpath)),
        };
        let application = match context.resolve(application_symbol)? {
            Symbol::Application(factory) => factory,
            other => return Err(wrong_kind(application_symbol, &other, classpath)),
        };

        let mut handle = BundleHandle {
            name: name.to_string(),
            entry_point: application_symbol.to_string(),
            state: LaunchState::Created,
            bootstrap: bootstrap(application, args, name.to_string()),
            context: Arc::clone(&context),
        };

        handle.transition(LaunchState::Starting, "start")?;
        info!(bundle = %name, entry_point = %application_symbol, "launching bundle");
        if let Err(e) = handle.bootstrap.run(context) {
            handle.transition(LaunchState::Failed, "start")?;
            warn!(bundle = %name, state = %handle.state, "bundle failed to start");
            return Err(e);
        }
        handle.transition(LaunchState::Running, "start")?;
        Ok(handle)
    }

    /// Stop a running bundle
    pub fn stop(&self, handle: &mut BundleHandle) -> Result<()> {
        handle.stop()
    }
}

fn wrong_kind(symbol: &str, found: &Symbol, classpath: &Classpath) -> crate::error::RunnerError {
    symbol_not_found(
        format!("{symbol} (found {} symbol)", found.kind()),
        context::describe(classpath),
    )
}
