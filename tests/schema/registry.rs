//! Integration tests for guarded registries

use std::sync::Arc;
use std::thread;

use stratus_foundation::ErrorKind;
use stratus_registry::{Registry, RegistryEntry};

#[derive(Debug)]
struct Builder {
    provider: &'static str,
    version: u32,
}

impl RegistryEntry for Builder {
    fn provider(&self) -> &str {
        self.provider
    }

    fn same_builder(&self, other: &Self) -> bool {
        self.version == other.version
    }
}

fn builder(provider: &'static str, version: u32) -> Builder {
    Builder { provider, version }
}

#[test]
fn repeating_a_registration_is_a_no_op() {
    let registry = Registry::new("builder");
    registry.register("aws_vpc", builder("catalog", 1)).unwrap();
    registry.register("aws_vpc", builder("catalog", 1)).unwrap();
    assert_eq!(registry.lookup("aws_vpc").map(|b| b.version), Some(1));
    assert_eq!(registry.len(), 1);
}

#[test]
fn a_second_builder_from_the_same_provider_is_refused() {
    let registry = Registry::new("builder");
    registry.register("aws_vpc", builder("catalog", 1)).unwrap();
    let err = registry.register("aws_vpc", builder("catalog", 2)).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::AmbiguousRegistration { .. }));
    assert_eq!(registry.lookup("aws_vpc").map(|b| b.version), Some(1));
}

#[test]
fn a_second_provider_is_refused() {
    let registry = Registry::new("builder");
    registry.register("aws_vpc", builder("catalog", 1)).unwrap();
    let err = registry.register("aws_vpc", builder("plugin", 1)).unwrap_err();
    match err.kind {
        ErrorKind::AmbiguousRegistration { existing, incoming, .. } => {
            assert_eq!(existing, "catalog");
            assert_eq!(incoming, "plugin");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn freeze_ends_loading() {
    let registry = Registry::new("builder");
    registry.register("aws_vpc", builder("catalog", 1)).unwrap();
    registry.freeze();
    registry.freeze();

    let err = registry.register("aws_subnet", builder("catalog", 1)).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::RegistryFrozen(_)));
    assert!(registry.contains("aws_vpc"));
    assert!(!registry.contains("aws_subnet"));
}

#[test]
fn concurrent_loading_then_lock_free_reads() {
    let registry = Arc::new(Registry::new("builder"));
    thread::scope(|scope| {
        for worker in 0..8 {
            let registry = Arc::clone(&registry);
            scope.spawn(move || {
                for i in 0..25 {
                    registry
                        .register(format!("kind_{worker}_{i}"), builder("catalog", i))
                        .unwrap();
                }
            });
        }
    });
    registry.freeze();
    assert_eq!(registry.len(), 200);

    thread::scope(|scope| {
        for worker in 0..8 {
            let registry = Arc::clone(&registry);
            scope.spawn(move || {
                for i in 0..25 {
                    assert!(registry.lookup(&format!("kind_{worker}_{i}")).is_some());
                }
            });
        }
    });
}

#[test]
fn names_are_sorted() {
    let registry = Registry::new("builder");
    for name in ["cdn", "network", "cache"] {
        registry.register(name, builder("catalog", 1)).unwrap();
    }
    assert_eq!(registry.names(), vec!["cache", "cdn", "network"]);
}
