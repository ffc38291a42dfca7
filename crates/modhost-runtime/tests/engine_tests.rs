//! Lifecycle engine behaviour, driven without archives.

use std::sync::{Arc, Mutex};

use modhost_manifest::ModuleDescriptor;
use modhost_runtime::{
    Activator, ActivatorFactories, DiscoveredModule, Error, ExtensionRegistry, LifecycleEngine,
    ModuleEvent, ModuleObserver, ModuleState, Notifier, ObserverError, StopOutcome,
};
use modhost_test_utils::{
    FailingActivator, FailingObserver, Hook, HookLog, RecordingActivator, RecordingObserver,
};

const RECORDING: &str = "test.Recording";

fn module(name: &str, deps: &[&str]) -> DiscoveredModule {
    module_with(name, deps, Some(RECORDING))
}

fn module_with(name: &str, deps: &[&str], activator: Option<&str>) -> DiscoveredModule {
    let mut text = format!("symbolicName: {name}\nversion: 1.0.0\n");
    if !deps.is_empty() {
        text.push_str(&format!("dependencies: {}\n", deps.join(", ")));
    }
    if let Some(activator) = activator {
        text.push_str(&format!("activator: {activator}\n"));
    }
    let descriptor = ModuleDescriptor::from_text(&text).unwrap();
    DiscoveredModule::new(descriptor, format!("/modules/{name}.mpk"))
}

fn factories(log: &HookLog) -> ActivatorFactories {
    let mut factories = ActivatorFactories::new();
    factories.register(RECORDING, RecordingActivator::factory(log));
    let failing = log.clone();
    factories.register("test.FailActivate", move |_: &ModuleDescriptor| -> Box<dyn Activator> {
        Box::new(FailingActivator::erroring(Hook::Activate, failing.clone()))
    });
    let panicking = log.clone();
    factories.register("test.PanicActivate", move |_: &ModuleDescriptor| -> Box<dyn Activator> {
        Box::new(FailingActivator::panicking(Hook::Activate, panicking.clone()))
    });
    let stop = log.clone();
    factories.register("test.FailStop", move |_: &ModuleDescriptor| -> Box<dyn Activator> {
        Box::new(FailingActivator::erroring(Hook::Stop, stop.clone()))
    });
    let dispose = log.clone();
    factories.register("test.FailDispose", move |_: &ModuleDescriptor| -> Box<dyn Activator> {
        Box::new(FailingActivator::panicking(Hook::Dispose, dispose.clone()))
    });
    factories
}

struct Fixture {
    engine: Arc<LifecycleEngine>,
    log: HookLog,
    observer: Arc<RecordingObserver>,
}

fn fixture(modules: Vec<DiscoveredModule>) -> Fixture {
    let log = HookLog::new();
    let notifier = Arc::new(Notifier::new());
    let observer = Arc::new(RecordingObserver::new());
    notifier.subscribe(observer.clone());

    let engine = Arc::new(LifecycleEngine::new(
        factories(&log),
        Arc::new(ExtensionRegistry::new()),
        notifier,
    ));
    let (_, errors) = engine.load(modules);
    assert!(errors.is_empty(), "unexpected load errors: {errors:?}");
    engine.resolve();

    Fixture {
        engine,
        log,
        observer,
    }
}

fn names(snapshots: Vec<modhost_runtime::ModuleSnapshot>) -> Vec<String> {
    snapshots
        .iter()
        .map(|s| s.symbolic_name().to_string())
        .collect()
}

mod activation {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_chain_activates_dependencies_first() {
        let f = fixture(vec![module("a", &["b"]), module("b", &["c"]), module("c", &[])]);
        assert_eq!(f.engine.activation_order(), vec!["c", "b", "a"]);

        f.engine.activate("a").unwrap();

        assert_eq!(f.log.modules_for("activate"), vec!["c", "b", "a"]);
        assert_eq!(f.observer.started(), vec!["c", "b", "a"]);
        assert_eq!(names(f.engine.activated()), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_activate_twice_runs_hook_once() {
        let f = fixture(vec![module("a", &[])]);

        f.engine.activate("a").unwrap();
        f.engine.activate("a").unwrap();

        assert_eq!(f.log.count("activate", "a"), 1);
        assert_eq!(f.observer.started(), vec!["a"]);
    }

    #[test]
    fn test_cycle_blocks_every_member() {
        let f = fixture(vec![module("a", &["b"]), module("b", &["a"]), module("c", &[])]);

        let report = f.engine.activate_all();
        assert_eq!(report.activated, vec!["c"]);

        match f.engine.activate("a").unwrap_err() {
            Error::CyclicDependency { members } => assert_eq!(members, vec!["a", "b"]),
            other => panic!("expected CyclicDependency, got {other:?}"),
        }
        assert_eq!(f.engine.state_of("a"), Some(ModuleState::Found));
        assert_eq!(f.engine.state_of("b"), Some(ModuleState::Found));
        assert!(f.log.modules_for("activate").iter().all(|m| m == "c"));
    }

    #[test]
    fn test_missing_dependency_stays_found() {
        let f = fixture(vec![module("a", &["z"])]);

        match f.engine.activate("a").unwrap_err() {
            Error::UnresolvedDependency { module, missing } => {
                assert_eq!(module, "a");
                assert_eq!(missing, vec!["z"]);
            }
            other => panic!("expected UnresolvedDependency, got {other:?}"),
        }
        assert_eq!(f.engine.state_of("a"), Some(ModuleState::Found));
        assert_eq!(names(f.engine.found()), vec!["a"]);
    }

    #[test]
    fn test_unknown_module() {
        let f = fixture(vec![]);
        assert!(matches!(
            f.engine.activate("ghost"),
            Err(Error::UnknownModule { name }) if name == "ghost"
        ));
        assert!(matches!(f.engine.stop("ghost"), Err(Error::UnknownModule { .. })));
        assert!(matches!(f.engine.dispose("ghost"), Err(Error::UnknownModule { .. })));
    }

    #[test]
    fn test_failing_hook_rolls_back_to_provided() {
        let f = fixture(vec![module_with("a", &[], Some("test.FailActivate"))]);

        let err = f.engine.activate("a").unwrap_err();
        assert!(matches!(err, Error::ActivationFailed { ref module, .. } if module == "a"));
        assert_eq!(f.engine.state_of("a"), Some(ModuleState::Provided));
        assert!(f.observer.started().is_empty());
    }

    #[test]
    fn test_panicking_hook_is_contained() {
        let f = fixture(vec![module_with("a", &[], Some("test.PanicActivate"))]);

        match f.engine.activate("a").unwrap_err() {
            Error::ActivationFailed { reason, .. } => assert!(reason.contains("panicked")),
            other => panic!("expected ActivationFailed, got {other:?}"),
        }
        assert_eq!(f.engine.state_of("a"), Some(ModuleState::Provided));

        // The engine stays usable after a panic inside a hook.
        assert_eq!(f.engine.modules().len(), 1);
    }

    #[test]
    fn test_failed_dependency_fails_dependent() {
        let f = fixture(vec![
            module("app", &["broken"]),
            module_with("broken", &[], Some("test.FailActivate")),
        ]);

        match f.engine.activate("app").unwrap_err() {
            Error::ActivationFailed { module, reason } => {
                assert_eq!(module, "app");
                assert!(reason.contains("broken"));
            }
            other => panic!("expected ActivationFailed, got {other:?}"),
        }
        assert_eq!(f.engine.state_of("app"), Some(ModuleState::Provided));
        assert_eq!(f.log.count("activate", "app"), 0);
    }

    #[test]
    fn test_activate_all_continues_after_failure() {
        let f = fixture(vec![
            module_with("bad", &[], Some("test.FailActivate")),
            module("good", &[]),
            module("needs-bad", &["bad"]),
        ]);

        let report = f.engine.activate_all();

        assert_eq!(report.activated, vec!["good"]);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(f.observer.started(), vec!["good"]);
    }

    #[test]
    fn test_missing_factory_is_activation_failure() {
        let f = fixture(vec![module_with("a", &[], Some("org.example.Unregistered"))]);

        match f.engine.activate("a").unwrap_err() {
            Error::ActivationFailed { reason, .. } => {
                assert!(reason.contains("org.example.Unregistered"));
            }
            other => panic!("expected ActivationFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_module_without_activator() {
        let f = fixture(vec![module_with("plain", &[], None)]);
        f.engine.activate("plain").unwrap();
        assert_eq!(f.engine.state_of("plain"), Some(ModuleState::Activated));
        assert!(f.log.entries().is_empty());
    }

    #[test]
    fn test_load_after_resolve_is_resolved_on_activate() {
        let f = fixture(vec![module("a", &["late"])]);
        assert_eq!(f.engine.state_of("a"), Some(ModuleState::Found));

        let (added, errors) = f.engine.load(vec![module("late", &[])]);
        assert_eq!(added, vec!["late"]);
        assert!(errors.is_empty());

        f.engine.activate("a").unwrap();
        assert_eq!(f.log.modules_for("activate"), vec!["late", "a"]);
    }
}

mod stopping {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_stop_returns_to_provided_and_orphans_dependents() {
        let f = fixture(vec![module("app", &["core"]), module("core", &[])]);
        f.engine.activate("app").unwrap();

        let outcome = f.engine.stop("core").unwrap();

        assert_eq!(
            outcome,
            StopOutcome {
                stopped: true,
                orphaned: vec!["app".to_string()],
            }
        );
        assert_eq!(f.engine.state_of("core"), Some(ModuleState::Provided));
        assert_eq!(f.engine.state_of("app"), Some(ModuleState::Activated));
        assert_eq!(f.observer.stopped(), vec!["core"]);
        assert_eq!(f.log.modules_for("stop"), vec!["core"]);
    }

    #[test]
    fn test_stop_inactive_is_noop() {
        let f = fixture(vec![module("a", &[])]);
        assert_eq!(f.engine.stop("a").unwrap(), StopOutcome::default());
        assert!(f.observer.events().is_empty());
    }

    #[test]
    fn test_restart_reuses_activator() {
        let f = fixture(vec![module("a", &[])]);
        f.engine.activate("a").unwrap();
        f.engine.stop("a").unwrap();
        f.engine.activate("a").unwrap();

        assert_eq!(
            f.log.entries(),
            vec!["activate:a", "stop:a", "activate:a"]
        );
        assert_eq!(
            f.observer.events(),
            vec![
                ModuleEvent::Started("a".into()),
                ModuleEvent::Stopped("a".into()),
                ModuleEvent::Started("a".into()),
            ]
        );
    }

    #[test]
    fn test_failing_stop_hook_still_stops() {
        let f = fixture(vec![module_with("a", &[], Some("test.FailStop"))]);
        f.engine.activate("a").unwrap();

        assert!(matches!(f.engine.stop("a"), Err(Error::StopFailed { .. })));
        assert_eq!(f.engine.state_of("a"), Some(ModuleState::Provided));
        assert_eq!(f.observer.stopped(), vec!["a"]);
    }
}

mod disposal {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_disposed_module_never_reactivates() {
        let f = fixture(vec![module("a", &[])]);
        f.engine.activate("a").unwrap();

        f.engine.dispose("a").unwrap();
        assert_eq!(f.engine.state_of("a"), Some(ModuleState::Disposed));
        assert_eq!(f.observer.stopped(), vec!["a"]);

        assert!(matches!(f.engine.activate("a"), Err(Error::ModuleDisposed { .. })));
        assert!(matches!(f.engine.stop("a"), Err(Error::ModuleDisposed { .. })));
        f.engine.dispose("a").unwrap();
        assert_eq!(f.log.count("dispose", "a"), 1);
    }

    #[test]
    fn test_dispose_never_activated_skips_hook_and_notification() {
        let f = fixture(vec![module("a", &[])]);
        f.engine.dispose("a").unwrap();
        assert!(f.log.entries().is_empty());
        assert!(f.observer.events().is_empty());
    }

    #[test]
    fn test_failing_dispose_hook_still_disposes() {
        let f = fixture(vec![module_with("a", &[], Some("test.FailDispose"))]);
        f.engine.activate("a").unwrap();

        assert!(matches!(
            f.engine.dispose("a"),
            Err(Error::DeactivationFailed { .. })
        ));
        assert_eq!(f.engine.state_of("a"), Some(ModuleState::Disposed));
    }

    #[test]
    fn test_dispose_all_reverses_activation_order() {
        let f = fixture(vec![
            module("app", &["ui"]),
            module("ui", &["core"]),
            module("core", &[]),
            module("idle", &[]),
        ]);
        f.engine.activate("app").unwrap();

        let errors = f.engine.dispose_all();

        assert!(errors.is_empty());
        assert_eq!(f.log.modules_for("dispose"), vec!["app", "ui", "core"]);
        assert_eq!(f.engine.state_of("idle"), Some(ModuleState::Disposed));
        assert!(f
            .engine
            .modules()
            .iter()
            .all(|m| m.state() == ModuleState::Disposed));
    }

    #[test]
    fn test_dependent_of_disposed_module_loses_resolution() {
        let f = fixture(vec![module("app", &["core"]), module("core", &[])]);
        f.engine.dispose("core").unwrap();
        f.engine.resolve();

        assert_eq!(f.engine.state_of("app"), Some(ModuleState::Found));
        assert!(matches!(
            f.engine.activate("app"),
            Err(Error::UnresolvedDependency { .. })
        ));
    }
}

mod loading {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_duplicate_symbolic_name_keeps_first() {
        let f = fixture(vec![module("a", &[])]);
        let mut duplicate = module("a", &[]);
        duplicate.archive = "/elsewhere/a.mpk".into();

        let (added, errors) = f.engine.load(vec![duplicate, module("a", &[])]);

        assert!(added.is_empty());
        assert_eq!(errors.len(), 1);
        match &errors[0] {
            Error::DuplicateModule {
                first, duplicate, ..
            } => {
                assert_eq!(first.to_str(), Some("/modules/a.mpk"));
                assert_eq!(duplicate.to_str(), Some("/elsewhere/a.mpk"));
            }
            other => panic!("expected DuplicateModule, got {other:?}"),
        }
        assert_eq!(f.engine.len(), 1);
    }

    #[test]
    fn test_bad_extension_file_still_loads_module() {
        let f = fixture(vec![]);
        let good = module("good", &[]).with_extensions("point: p\nprefix: x\nid: one");
        let bad = module("bad", &[]).with_extensions("point: p\nprefix: x");

        let (added, errors) = f.engine.load(vec![good, bad]);

        assert_eq!(added, vec!["good", "bad"]);
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], Error::MissingAttribute { .. }));
        let elements = f.engine.extensions().configuration_elements("p");
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].contributor, "good");
    }
}

mod notifications {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Queries the engine from inside the callback.
    struct Inspector {
        engine: Mutex<Option<Arc<LifecycleEngine>>>,
        seen: Mutex<Vec<Option<ModuleState>>>,
    }

    impl ModuleObserver for Inspector {
        fn on_module_started(&self, name: &str) -> Result<(), ObserverError> {
            let engine = self.engine.lock().unwrap().clone().unwrap();
            self.seen.lock().unwrap().push(engine.state_of(name));
            Ok(())
        }

        fn on_module_stopped(&self, _name: &str) -> Result<(), ObserverError> {
            Ok(())
        }
    }

    #[test]
    fn test_observers_run_outside_the_lock() {
        let f = fixture(vec![module("a", &[])]);
        let inspector = Arc::new(Inspector {
            engine: Mutex::new(Some(f.engine.clone())),
            seen: Mutex::new(Vec::new()),
        });
        f.engine.notifier().subscribe(inspector.clone());

        f.engine.activate("a").unwrap();

        assert_eq!(
            *inspector.seen.lock().unwrap(),
            vec![Some(ModuleState::Activated)]
        );
        inspector.engine.lock().unwrap().take();
    }

    #[test]
    fn test_failing_observer_does_not_block_delivery() {
        let f = fixture(vec![module("a", &[])]);
        let late = Arc::new(RecordingObserver::new());
        f.engine.notifier().subscribe(Arc::new(FailingObserver));
        f.engine.notifier().subscribe(late.clone());

        f.engine.activate("a").unwrap();
        f.engine.stop("a").unwrap();

        assert_eq!(late.started(), vec!["a"]);
        assert_eq!(late.stopped(), vec!["a"]);
        assert_eq!(f.observer.started(), vec!["a"]);
    }
}

#[test]
fn test_engine_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<LifecycleEngine>();
    assert_send_sync::<modhost_runtime::Runtime>();
}
