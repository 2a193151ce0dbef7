//! Standard bootstrap: runs an application on its own named thread
//!
//! The thread pins the bundle's isolation context, starts the application and
//! signals the launching thread, which waits on a condition variable with a
//! periodic wake. Startup errors and panics are caught on the bundle thread
//! and reported back to the launcher.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use tracing::{debug, error, info};

use super::context::{self, Application, ApplicationFactory, Bootstrap, BootstrapFactory, IsolationContext};
use crate::error::{Result, illegal_state, startup_failure};

/// Periodic wake of the launching thread while the application starts
const WAKE_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
enum Startup {
    Pending,
    Started,
    Failed(String),
}

struct Shared {
    startup: Mutex<Startup>,
    ready: Condvar,
    application: Mutex<Option<Box<dyn Application>>>,
}

/// Bootstrap starting the application on a thread named after the bundle
pub struct IsolatedLauncher {
    factory: ApplicationFactory,
    args: Vec<String>,
    name: String,
    context: Option<Arc<dyn IsolationContext>>,
    shared: Arc<Shared>,
}

impl IsolatedLauncher {
    pub fn new(factory: ApplicationFactory, args: Vec<String>, name: String) -> Self {
        Self {
            factory,
            args,
            name,
            context: None,
            shared: Arc::new(Shared {
                startup: Mutex::new(Startup::Pending),
                ready: Condvar::new(),
                application: Mutex::new(None),
            }),
        }
    }

    /// Factory exported under the bootstrap symbol
    pub fn factory() -> BootstrapFactory {
        Arc::new(
            |application: ApplicationFactory, args: Vec<String>, name: String| -> Box<dyn Bootstrap> {
                Box::new(Self::new(application, args, name))
            },
        )
    }

    fn wait_started(&self) -> Startup {
        let mut startup = self.shared.startup.lock();
        while *startup == Startup::Pending {
            if self.shared.ready.wait_for(&mut startup, WAKE_INTERVAL).timed_out() {
                debug!(bundle = %self.name, "still waiting for application startup");
            }
        }
        startup.clone()
    }
}

/// Wakes the launching thread exactly once, even if the bundle thread unwinds
struct Signal(Arc<Shared>);

impl Signal {
    fn report(self, result: Startup, name: &str) {
        if let Startup::Failed(reason) = &result {
            error!(bundle = %name, %reason, "application failed to start");
        }
        *self.0.startup.lock() = result;
    }
}

impl Drop for Signal {
    fn drop(&mut self) {
        let mut startup = self.0.startup.lock();
        if *startup == Startup::Pending {
            *startup = Startup::Failed("bundle thread exited before reporting startup".to_string());
        }
        drop(startup);
        self.0.ready.notify_all();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "application panicked".to_string()
    }
}

impl Bootstrap for IsolatedLauncher {
    fn run(&mut self, context: Arc<dyn IsolationContext>) -> Result<()> {
        if self.context.is_some() {
            return Err(illegal_state(&self.name, "already run", "run"));
        }
        self.context = Some(Arc::clone(&context));

        let factory = Arc::clone(&self.factory);
        let args = self.args.clone();
        let shared = Arc::clone(&self.shared);
        let name = self.name.clone();

        let spawned = thread::Builder::new()
            .name(self.name.clone())
            .spawn(move || {
                let signal = Signal(Arc::clone(&shared));
                let _pinned = context::enter(context);
                let outcome = catch_unwind(AssertUnwindSafe(|| {
                    let mut application = factory();
                    application
                        .start(&args)
                        .map(|()| application)
                        .map_err(|e| e.to_string())
                }));

                let result = match outcome {
                    Ok(Ok(application)) => {
                        *shared.application.lock() = Some(application);
                        Startup::Started
                    }
                    Ok(Err(reason)) => Startup::Failed(reason),
                    Err(payload) => Startup::Failed(panic_message(payload.as_ref())),
                };
                signal.report(result, &name);
            });

        let handle = spawned.map_err(|e| startup_failure(&self.name, e.to_string()))?;
        let startup = self.wait_started();
        if let Err(payload) = handle.join() {
            error!(
                bundle = %self.name,
                reason = %panic_message(payload.as_ref()),
                "bundle thread panicked after startup was reported"
            );
        }

        match startup {
            Startup::Started => {
                info!(bundle = %self.name, "application started");
                Ok(())
            }
            Startup::Failed(reason) => Err(startup_failure(&self.name, reason)),
            Startup::Pending => Err(startup_failure(&self.name, "startup never completed")),
        }
    }

    fn stop(&mut self) -> Result<()> {
        let Some(mut application) = self.shared.application.lock().take() else {
            return Err(illegal_state(&self.name, "not running", "stop"));
        };
        let _pinned = self.context.clone().map(context::enter);
        application.stop();
        info!(bundle = %self.name, "application stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ArtifactRef, Classpath};
    use crate::error::{RunnerError, symbol_not_found};
    use crate::isolation::context::{StartupError, Symbol, application_factory, current_context};
    use std::sync::atomic::{AtomicBool, Ordering};

    struct Fixed(Classpath);

    impl IsolationContext for Fixed {
        fn classpath(&self) -> &Classpath {
            &self.0
        }

        fn resolve(&self, symbol: &str) -> Result<Symbol> {
            Err(symbol_not_found(symbol, ""))
        }

        fn resource(&self, _path: &str) -> Result<Option<Vec<u8>>> {
            Ok(None)
        }
    }

    fn fixed_context() -> Arc<dyn IsolationContext> {
        Arc::new(Fixed(
            std::iter::once(ArtifactRef::new("file:/bundle/")).collect(),
        ))
    }

    #[derive(Default)]
    struct Observed {
        thread_name: Mutex<Option<String>>,
        saw_context: AtomicBool,
        stopped: AtomicBool,
    }

    struct Recording(Arc<Observed>);

    impl Application for Recording {
        fn start(&mut self, _args: &[String]) -> std::result::Result<(), StartupError> {
            *self.0.thread_name.lock() = thread::current().name().map(str::to_string);
            let pinned = current_context()
                .is_some_and(|c| c.classpath().entries()[0].as_str() == "file:/bundle/");
            self.0.saw_context.store(pinned, Ordering::SeqCst);
            Ok(())
        }

        fn stop(&mut self) {
            self.0.stopped.store(true, Ordering::SeqCst);
        }
    }

    struct Failing;

    impl Application for Failing {
        fn start(&mut self, _args: &[String]) -> std::result::Result<(), StartupError> {
            Err("port already in use".into())
        }

        fn stop(&mut self) {}
    }

    struct Panicking;

    impl Application for Panicking {
        fn start(&mut self, _args: &[String]) -> std::result::Result<(), StartupError> {
            panic!("boom")
        }

        fn stop(&mut self) {}
    }

    #[test]
    fn test_runs_on_named_thread_with_context() {
        let seen = Arc::new(Observed::default());
        let factory_seen = Arc::clone(&seen);
        let factory = application_factory(move || Recording(Arc::clone(&factory_seen)));

        let mut launcher = IsolatedLauncher::new(factory, vec![], "orders-service".to_string());
        launcher.run(fixed_context()).unwrap();

        assert_eq!(seen.thread_name.lock().as_deref(), Some("orders-service"));
        assert!(seen.saw_context.load(Ordering::SeqCst));

        launcher.stop().unwrap();
        assert!(seen.stopped.load(Ordering::SeqCst));
    }

    #[test]
    fn test_startup_error_propagates() {
        let factory: ApplicationFactory = application_factory(|| Failing);
        let mut launcher = IsolatedLauncher::new(factory, vec![], "billing".to_string());

        let err = launcher.run(fixed_context()).unwrap_err();
        assert!(matches!(err, RunnerError::StartupFailure { .. }));
        assert!(err.to_string().contains("port already in use"));
    }

    #[test]
    fn test_panic_is_caught() {
        let factory: ApplicationFactory = application_factory(|| Panicking);
        let mut launcher = IsolatedLauncher::new(factory, vec![], "billing".to_string());

        let err = launcher.run(fixed_context()).unwrap_err();
        assert!(err.to_string().contains("boom"));
    }

    #[derive(Debug)]
    struct Unprintable;

    impl std::fmt::Display for Unprintable {
        fn fmt(&self, _f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            panic!("cannot render startup error")
        }
    }

    impl std::error::Error for Unprintable {}

    struct FailingUnprintably;

    impl Application for FailingUnprintably {
        fn start(&mut self, _args: &[String]) -> std::result::Result<(), StartupError> {
            Err(Box::new(Unprintable))
        }

        fn stop(&mut self) {}
    }

    #[test]
    fn test_panicking_error_message_still_reports() {
        let factory: ApplicationFactory = application_factory(|| FailingUnprintably);
        let mut launcher = IsolatedLauncher::new(factory, vec![], "billing".to_string());

        let err = launcher.run(fixed_context()).unwrap_err();
        assert!(matches!(err, RunnerError::StartupFailure { .. }));
        assert!(err.to_string().contains("cannot render startup error"));
    }

    #[test]
    fn test_unwinding_thread_wakes_launcher() {
        let launcher = IsolatedLauncher::new(application_factory(|| Failing), vec![], "billing".to_string());
        let shared = Arc::clone(&launcher.shared);
        let worker = thread::spawn(move || {
            let _signal = Signal(shared);
            panic!("logging sink failed");
        });

        assert!(worker.join().is_err());
        assert_eq!(
            launcher.wait_started(),
            Startup::Failed("bundle thread exited before reporting startup".to_string())
        );
    }

    #[test]
    fn test_stop_before_start_is_illegal() {
        let factory: ApplicationFactory = application_factory(|| Failing);
        let mut launcher = IsolatedLauncher::new(factory, vec![], "billing".to_string());

        let err = launcher.stop().unwrap_err();
        assert!(matches!(err, RunnerError::IllegalState { .. }));
    }
}
