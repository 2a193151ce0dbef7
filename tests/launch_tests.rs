//! Integration tests for launching bundles into isolation contexts

mod common;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use isolated_runner::config::RunnerConfig;
use isolated_runner::isolation::{Application, RegistryLoader, StartupError, Symbol, current_context};
use isolated_runner::resolver::FixedRepository;
use isolated_runner::{
    ArtifactRef, BundleSelector, HostArtifacts, IsolationBoundary, LaunchState, RunnerError,
};

/// What an application saw while starting
#[derive(Debug, Clone, Default)]
struct Observation {
    thread: Option<String>,
    args: Vec<String>,
    classpath: Vec<String>,
    config: Option<String>,
    version: Option<String>,
}

#[derive(Clone, Default)]
struct Recorder {
    started: Arc<Mutex<Vec<Observation>>>,
    stopped: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    fn observations(&self) -> Vec<Observation> {
        self.started.lock().unwrap().clone()
    }
}

/// Reads its environment from the pinned context
struct RecordingApp {
    name: &'static str,
    recorder: Recorder,
}

impl Application for RecordingApp {
    fn start(&mut self, args: &[String]) -> Result<(), StartupError> {
        let context = current_context().ok_or("no isolation context")?;
        let config = context
            .resource("application.yaml")?
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned());
        let version = context
            .resource("lib.version")?
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned());

        self.recorder.started.lock().unwrap().push(Observation {
            thread: std::thread::current().name().map(str::to_string),
            args: args.to_vec(),
            classpath: context
                .classpath()
                .iter()
                .map(|a| a.as_str().to_string())
                .collect(),
            config,
            version,
        });
        Ok(())
    }

    fn stop(&mut self) {
        self.recorder.stopped.lock().unwrap().push(self.name.to_string());
    }
}

struct FailingApp;

impl Application for FailingApp {
    fn start(&mut self, _args: &[String]) -> Result<(), StartupError> {
        Err("port 8080 already in use".into())
    }

    fn stop(&mut self) {}
}

/// Two directory bundles built against different versions of the same library
struct Fleet {
    workspace: common::TestWorkspace,
    loader: Arc<RegistryLoader>,
    host: Vec<ArtifactRef>,
    orders: ArtifactRef,
    billing: ArtifactRef,
}

impl Fleet {
    fn new() -> Self {
        let workspace = common::TestWorkspace::new();
        let lib_v1 = workspace.create_archive("libs/v1/shared-1.0.jar", &[("lib.version", b"1.0")]);
        let lib_v2 = workspace.create_archive("libs/v2/shared-2.0.jar", &[("lib.version", b"2.0")]);
        let runner = workspace.create_lib("libs/isolated-runner-0.3.0.jar");
        let orders = workspace.create_dir_bundle(
            "orders/target/classes",
            "shared-1.0.jar",
            "com.acme.orders.OrdersApplication",
        );
        workspace.write_file("orders/target/classes/application.yaml", b"name: orders\n");
        let billing = workspace.create_dir_bundle(
            "billing/target/classes",
            "shared-2.0.jar",
            "com.acme.billing.BillingApplication",
        );
        workspace.write_file("billing/target/classes/application.yaml", b"name: billing\n");

        let loader = Arc::new(RegistryLoader::new());
        loader.export_launcher(&workspace.artifact(&runner));

        let host = [&lib_v1, &lib_v2, &runner, &orders, &billing]
            .iter()
            .map(|p| workspace.artifact(p))
            .collect();
        Self {
            orders: workspace.artifact(&orders),
            billing: workspace.artifact(&billing),
            workspace,
            loader,
            host,
        }
    }

    fn export_recording(&self, recorder: &Recorder) {
        let rec = recorder.clone();
        self.loader.export(
            &self.orders,
            "com.acme.orders.OrdersApplication",
            Symbol::application(move || RecordingApp {
                name: "orders",
                recorder: rec.clone(),
            }),
        );
        let rec = recorder.clone();
        self.loader.export(
            &self.billing,
            "com.acme.billing.BillingApplication",
            Symbol::application(move || RecordingApp {
                name: "billing",
                recorder: rec.clone(),
            }),
        );
    }

    fn selector(&self) -> BundleSelector {
        let repository: PathBuf = self.workspace.path.join("m2");
        std::fs::create_dir_all(&repository).unwrap();
        BundleSelector::new(
            RunnerConfig::default(),
            HostArtifacts::new(self.host.clone()),
            IsolationBoundary::new(self.loader.clone()),
        )
        .with_repository(Arc::new(FixedRepository::new(repository)))
    }
}

#[test]
fn test_launch_and_stop_directory_bundle() {
    let fleet = Fleet::new();
    let recorder = Recorder::default();
    fleet.export_recording(&recorder);
    let selector = fleet.selector();

    let mut handle = selector
        .select(None, &["orders"], vec!["--server.port=0".to_string()])
        .unwrap();
    assert_eq!(handle.state(), LaunchState::Running);
    assert_eq!(handle.name(), "orders");
    assert_eq!(handle.entry_point(), "com.acme.orders.OrdersApplication");

    let observed = recorder.observations();
    assert_eq!(observed.len(), 1);
    assert_eq!(observed[0].thread.as_deref(), Some("orders"));
    assert_eq!(observed[0].args, vec!["--server.port=0"]);
    assert_eq!(observed[0].config.as_deref(), Some("name: orders\n"));

    handle.stop().unwrap();
    assert_eq!(handle.state(), LaunchState::Stopped);
    assert_eq!(*recorder.stopped.lock().unwrap(), vec!["orders"]);

    let err = handle.stop().unwrap_err();
    assert!(matches!(err, RunnerError::IllegalState { .. }));
}

#[test]
fn test_bundles_are_isolated_from_each_other() {
    let fleet = Fleet::new();
    let recorder = Recorder::default();
    fleet.export_recording(&recorder);
    let selector = fleet.selector();

    let mut orders = selector.select(None, &["orders"], Vec::new()).unwrap();
    let mut billing = selector.select(None, &["billing"], Vec::new()).unwrap();

    let observed = recorder.observations();
    assert_eq!(observed.len(), 2);
    let (first, second) = (&observed[0], &observed[1]);

    assert_eq!(first.thread.as_deref(), Some("orders"));
    assert_eq!(first.version.as_deref(), Some("1.0"));
    assert_eq!(first.config.as_deref(), Some("name: orders\n"));
    assert!(first.classpath.iter().any(|u| u.ends_with("/shared-1.0.jar")));
    assert!(!first.classpath.iter().any(|u| u.ends_with("/shared-2.0.jar")));

    assert_eq!(second.thread.as_deref(), Some("billing"));
    assert_eq!(second.version.as_deref(), Some("2.0"));
    assert_eq!(second.config.as_deref(), Some("name: billing\n"));
    assert!(!second.classpath.iter().any(|u| u.ends_with("/shared-1.0.jar")));

    // Each context only sees its own bundle's entry point
    assert!(orders.context().resolve("com.acme.billing.BillingApplication").is_err());
    assert!(billing.context().resolve("com.acme.orders.OrdersApplication").is_err());

    orders.stop().unwrap();
    billing.stop().unwrap();
}

#[test]
fn test_explicit_application_symbol() {
    let fleet = Fleet::new();
    let recorder = Recorder::default();
    let rec = recorder.clone();
    fleet.loader.export(
        &fleet.orders,
        "com.acme.orders.AdminApplication",
        Symbol::application(move || RecordingApp {
            name: "admin",
            recorder: rec.clone(),
        }),
    );

    let mut handle = fleet
        .selector()
        .select(Some("com.acme.orders.AdminApplication"), &["orders"], Vec::new())
        .unwrap();
    assert_eq!(handle.entry_point(), "com.acme.orders.AdminApplication");
    handle.stop().unwrap();
    assert_eq!(*recorder.stopped.lock().unwrap(), vec!["admin"]);
}

#[test]
fn test_startup_failure_is_reported() {
    let fleet = Fleet::new();
    fleet.loader.export(
        &fleet.orders,
        "com.acme.orders.OrdersApplication",
        Symbol::application(|| FailingApp),
    );

    let err = fleet
        .selector()
        .select(None, &["orders"], Vec::new())
        .unwrap_err();
    match err {
        RunnerError::StartupFailure { name, reason } => {
            assert_eq!(name, "orders");
            assert!(reason.contains("port 8080 already in use"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_missing_entry_point() {
    let fleet = Fleet::new();
    let err = fleet
        .selector()
        .select(None, &["billing"], Vec::new())
        .unwrap_err();
    match err {
        RunnerError::SymbolNotFound { symbol, classpath } => {
            assert_eq!(symbol, "com.acme.billing.BillingApplication");
            assert!(classpath.contains("shared-2.0.jar"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_launch_packaged_bundle() {
    let workspace = common::TestWorkspace::new();
    let lib = common::zip_bytes(&[("lib.version", b"3.1")]);
    let bundle = workspace.create_archive(
        "dist/payments-app-1.0.jar",
        &[
            (
                "META-INF/MANIFEST.MF",
                b"Manifest-Version: 1.0\nStart-Class: com.acme.payments.PaymentsApplication\n",
            ),
            ("BOOT-INF/classes/application.yaml", b"name: payments\n"),
            ("BOOT-INF/lib/shared-3.1.jar", &lib),
        ],
    );
    let runner = workspace.create_lib("libs/isolated-runner-0.3.0.jar");

    let recorder = Recorder::default();
    let rec = recorder.clone();
    let loader = Arc::new(RegistryLoader::new());
    loader.export_launcher(&workspace.artifact(&runner));
    loader.export(
        &workspace.artifact(&bundle).nested("BOOT-INF/classes/"),
        "com.acme.payments.PaymentsApplication",
        Symbol::application(move || RecordingApp {
            name: "payments",
            recorder: rec.clone(),
        }),
    );

    let selector = BundleSelector::new(
        RunnerConfig::default(),
        HostArtifacts::new(vec![workspace.artifact(&bundle), workspace.artifact(&runner)]),
        IsolationBoundary::new(loader),
    );
    let mut handle = selector
        .select(None, &["payments"], Vec::new())
        .unwrap();

    let observed = recorder.observations();
    assert_eq!(observed[0].thread.as_deref(), Some("payments"));
    assert_eq!(observed[0].config.as_deref(), Some("name: payments\n"));
    assert_eq!(observed[0].version.as_deref(), Some("3.1"));
    handle.stop().unwrap();
}
