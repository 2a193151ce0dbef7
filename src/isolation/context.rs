//! Loading contexts and the symbols they expose
//!
//! A [`ModuleLoader`] turns a resolved classpath into an [`IsolationContext`].
//! The context only resolves symbols provided by its own classpath and has no
//! link to whatever the calling code has loaded.

use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

use crate::domain::{ArtifactRef, Classpath};
use crate::error::Result;

/// Error returned by an application that fails to start
pub type StartupError = Box<dyn std::error::Error + Send + Sync>;

/// Code running inside an isolation context
pub trait Application: Send {
    /// Start the application. Returns once it is up.
    fn start(&mut self, args: &[String]) -> std::result::Result<(), StartupError>;

    /// Shut the application down
    fn stop(&mut self);
}

/// Drives an application's lifecycle from inside its isolation context
pub trait Bootstrap: Send {
    /// Start the application on a dedicated thread and block until it is
    /// running or has failed
    fn run(&mut self, context: Arc<dyn IsolationContext>) -> Result<()>;

    fn stop(&mut self) -> Result<()>;
}

/// Creates application instances
pub type ApplicationFactory = Arc<dyn Fn() -> Box<dyn Application> + Send + Sync>;

/// Wrap a constructor as an [`ApplicationFactory`]
pub fn application_factory<A, F>(make: F) -> ApplicationFactory
where
    A: Application + 'static,
    F: Fn() -> A + Send + Sync + 'static,
{
    Arc::new(move || Box::new(make()) as Box<dyn Application>)
}

/// Creates a bootstrap from `(application, args, name)`
pub type BootstrapFactory =
    Arc<dyn Fn(ApplicationFactory, Vec<String>, String) -> Box<dyn Bootstrap> + Send + Sync>;

/// A named entry point exported by an artifact
#[derive(Clone)]
pub enum Symbol {
    Bootstrap(BootstrapFactory),
    Application(ApplicationFactory),
}

impl Symbol {
    /// Application symbol built by `make`
    pub fn application<A, F>(make: F) -> Self
    where
        A: Application + 'static,
        F: Fn() -> A + Send + Sync + 'static,
    {
        Symbol::Application(application_factory(make))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Symbol::Bootstrap(_) => "bootstrap",
            Symbol::Application(_) => "application",
        }
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol::{}", self.kind())
    }
}

/// A loading scope built from one classpath
pub trait IsolationContext: Send + Sync {
    fn classpath(&self) -> &Classpath;

    /// Resolve a fully-qualified symbol visible from this context
    fn resolve(&self, symbol: &str) -> Result<Symbol>;

    /// Read a resource from the first classpath entry that provides it
    fn resource(&self, path: &str) -> Result<Option<Vec<u8>>>;
}

/// Builds isolation contexts
pub trait ModuleLoader: Send + Sync {
    fn create_context(&self, classpath: &Classpath) -> Result<Arc<dyn IsolationContext>>;
}

thread_local! {
    static CURRENT: RefCell<Option<Arc<dyn IsolationContext>>> = const { RefCell::new(None) };
}

/// The isolation context pinned to the calling thread, if any
pub fn current_context() -> Option<Arc<dyn IsolationContext>> {
    CURRENT.with(|current| current.borrow().clone())
}

/// Restores the previously pinned context when dropped
#[must_use]
pub struct ContextGuard {
    previous: Option<Arc<dyn IsolationContext>>,
}

/// Pin `context` to the calling thread until the guard is dropped
pub fn enter(context: Arc<dyn IsolationContext>) -> ContextGuard {
    let previous = CURRENT.with(|current| current.borrow_mut().replace(context));
    ContextGuard { previous }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        CURRENT.with(|current| *current.borrow_mut() = previous);
    }
}

/// Classpath dump used in lookup failures
pub(crate) fn describe(classpath: &Classpath) -> String {
    classpath
        .iter()
        .map(ArtifactRef::as_str)
        .collect::<Vec<_>>()
        .join("\n")
}
