//! Scenario tests across the whole stack
//!
//! Each scenario starts from module projects on disk, packs them, and drives
//! the runtime the way a host process would.

use std::sync::Arc;

use modhost_manifest::{Dialect, ModuleDescriptor, parse_dialect};
use modhost_package::ModuleArchive;
use modhost_runtime::{ActivatorFactories, Error, ModuleState, Runtime};
use modhost_test_utils::{
    FailingActivator, Hook, HookLog, ModuleProject, RecordingActivator, RecordingObserver,
    TestHost,
};
use pretty_assertions::assert_eq;

const RECORDING: &str = "it.Recording";
const FAILING: &str = "it.Failing";

struct Host {
    host: TestHost,
    log: HookLog,
}

impl Host {
    fn new() -> Self {
        Self {
            host: TestHost::new(),
            log: HookLog::new(),
        }
    }

    fn module(&self, name: &str, deps: &[&str]) -> &Self {
        self.host
            .add(ModuleProject::new(name).depends_on(deps).activator(RECORDING));
        self
    }

    fn runtime(&self) -> Runtime {
        let mut factories = ActivatorFactories::new();
        factories.register(RECORDING, RecordingActivator::factory(&self.log));
        let log = self.log.clone();
        factories.register(FAILING, move |_: &ModuleDescriptor| {
            Box::new(FailingActivator::erroring(Hook::Activate, log.clone()))
                as Box<dyn modhost_runtime::Activator>
        });
        Runtime::new(self.host.config(), factories)
    }
}

// =============================================================================
// Manifests
// =============================================================================

#[test]
fn manifest_round_trip_through_archive() {
    let host = TestHost::new();
    let archive = host.add(
        ModuleProject::new("org.example.editor")
            .version("3.2")
            .depends_on(&["org.example.core", "org.example.text"])
            .activator(RECORDING)
            .resource("icons/editor.png", b"\x89PNG")
            .resource("help/index.html", b"<html/>"),
    );

    let archive = ModuleArchive::open(&archive).unwrap();
    let descriptor = archive.descriptor().unwrap();

    assert_eq!(descriptor.symbolic_name, "org.example.editor");
    assert_eq!(descriptor.version.to_string(), "3.2.0");
    assert_eq!(
        descriptor.dependencies,
        vec!["org.example.core", "org.example.text"]
    );
    assert_eq!(archive.artifact(), Some("org.example.editor.bin"));

    let mut resources = archive.resources().to_vec();
    resources.sort();
    assert_eq!(resources, vec!["help/index.html", "icons/editor.png"]);
    assert_eq!(
        archive.read_resource("icons/editor.png").unwrap(),
        Some(b"\x89PNG".to_vec())
    );
}

#[test]
fn malformed_chunk_rejects_document() {
    let err = parse_dialect("symbolicName: a\nversion 1.0.0\n", Dialect::Manifest).unwrap_err();
    assert!(matches!(err, modhost_manifest::Error::Parse { .. }));
}

#[test]
fn pack_without_manifest_writes_nothing() {
    let host = TestHost::new();
    let project = host.root().join("bare");
    std::fs::create_dir_all(&project).unwrap();
    let artifact = project.join("bare.bin");
    std::fs::write(&artifact, "bin").unwrap();

    let err = modhost_package::pack(&project, &artifact, &host.modules_dir()).unwrap_err();

    assert!(matches!(err, modhost_package::Error::MissingManifest { .. }));
    assert_eq!(std::fs::read_dir(host.modules_dir()).unwrap().count(), 0);
}

// =============================================================================
// Resolution and activation
// =============================================================================

#[test]
fn chain_activates_leaf_first() {
    let h = Host::new();
    h.module("a", &["b"]).module("b", &["c"]).module("c", &[]);
    let runtime = h.runtime();

    let report = runtime.startup().unwrap();

    assert!(report.errors.is_empty());
    assert_eq!(h.log.modules_for("activate"), vec!["c", "b", "a"]);
}

#[test]
fn cycle_is_reported_and_never_activates() {
    let h = Host::new();
    h.module("a", &["b"]).module("b", &["a"]);
    let runtime = h.runtime();

    let report = runtime.startup().unwrap();

    let cycles: Vec<&Vec<String>> = report
        .errors
        .iter()
        .filter_map(|e| match e {
            Error::CyclicDependency { members } => Some(members),
            _ => None,
        })
        .collect();
    assert_eq!(cycles, vec![&vec!["a".to_string(), "b".to_string()]]);
    assert!(report.activated.is_empty());
    assert_eq!(runtime.state_of("a"), Some(ModuleState::Found));
    assert_eq!(runtime.state_of("b"), Some(ModuleState::Found));
}

#[test]
fn missing_dependency_leaves_module_found() {
    let h = Host::new();
    h.module("a", &["z"]);
    let runtime = h.runtime();

    let report = runtime.startup().unwrap();

    assert!(matches!(
        &report.errors[..],
        [Error::UnresolvedDependency { module, missing }] if module == "a" && missing == &["z"]
    ));
    assert_eq!(runtime.state_of("a"), Some(ModuleState::Found));
}

#[test]
fn repeated_activation_runs_hook_once() {
    let h = Host::new();
    h.module("a", &[]);
    let mut config = h.host.config();
    config.activate_on_startup = false;
    let mut factories = ActivatorFactories::new();
    factories.register(RECORDING, RecordingActivator::factory(&h.log));
    let runtime = Runtime::new(config, factories);
    runtime.startup().unwrap();

    runtime.start("a").unwrap();
    runtime.start("a").unwrap();

    assert_eq!(h.log.count("activate", "a"), 1);
}

#[test]
fn failing_module_is_isolated() {
    let h = Host::new();
    h.module("healthy", &[]);
    h.host
        .add(ModuleProject::new("broken").activator(FAILING));
    h.module("needs-broken", &["broken"]);
    let runtime = h.runtime();
    let observer = Arc::new(RecordingObserver::new());
    runtime.add_observer(observer.clone());

    let report = runtime.startup().unwrap();

    assert_eq!(report.activated, vec!["healthy"]);
    assert_eq!(observer.started(), vec!["healthy"]);
    assert_eq!(runtime.state_of("broken"), Some(ModuleState::Provided));
    assert_eq!(runtime.state_of("needs-broken"), Some(ModuleState::Provided));
    assert_eq!(
        report
            .errors
            .iter()
            .filter(|e| matches!(e, Error::ActivationFailed { .. }))
            .count(),
        2
    );
}

// =============================================================================
// Extensions
// =============================================================================

#[test]
fn extension_without_id_fails_only_its_module() {
    let h = Host::new();
    h.host.add(
        ModuleProject::new("good")
            .extensions("point: org.example.commands\nprefix: command\nid: save\nlabel: Save\n"),
    );
    h.host.add(
        ModuleProject::new("bad")
            .extensions("point: org.example.commands\nprefix: command\nlabel: Broken\n"),
    );
    let runtime = h.runtime();

    let report = runtime.startup().unwrap();

    assert!(report.errors.iter().any(|e| matches!(
        e,
        Error::MissingAttribute { contributor, attribute: "id", .. } if contributor == "bad"
    )));
    let elements = runtime.configuration_elements("org.example.commands");
    assert_eq!(elements.len(), 1);
    assert_eq!(elements[0].id(), "save");
    assert_eq!(elements[0].attribute("label"), Some("Save"));
    assert_eq!(elements[0].contributor, "good");
}

#[test]
fn full_lifecycle_with_shutdown() {
    let h = Host::new();
    h.module("app", &["ui", "core"])
        .module("core", &[])
        .module("ui", &["core"]);
    let runtime = h.runtime();
    let observer = Arc::new(RecordingObserver::new());
    runtime.add_observer(observer.clone());

    runtime.startup().unwrap();
    let outcome = runtime.stop("ui").unwrap();
    assert_eq!(outcome.orphaned, vec!["app"]);
    runtime.start("ui").unwrap();

    let errors = runtime.shutdown();

    assert!(errors.is_empty());
    assert_eq!(observer.started(), vec!["core", "ui", "app", "ui"]);
    assert_eq!(observer.stopped(), vec!["ui", "ui", "app", "core"]);
    assert_eq!(h.log.modules_for("dispose"), vec!["ui", "app", "core"]);
}
