use ferrous_inject::{Dependency, RequestContext, Scope};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

#[derive(Debug, PartialEq)]
struct TestService {
    name: String,
}

fn service(name: &str) -> TestService {
    TestService {
        name: name.to_string(),
    }
}

fn counting_dependency(scope: Scope) -> (Dependency<TestService>, Arc<AtomicU32>) {
    let count = Arc::new(AtomicU32::new(0));
    let count_clone = count.clone();
    let dep = Dependency::from_fn(move |_| {
        count_clone.fetch_add(1, Ordering::SeqCst);
        Ok(service("foo"))
    })
    .with_scope(scope);
    (dep, count)
}

#[tokio::test]
async fn test_override_replaces_factory_value() {
    let (dep, count) = counting_dependency(Scope::Default);
    dep.override_with(service("bar"));

    let resolved = dep.resolve(&RequestContext::new()).await.unwrap();
    assert_eq!(resolved.name, "bar");
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_override_replaces_cached_instance() {
    let (dep, _) = counting_dependency(Scope::Default);
    assert_eq!(dep.resolve(&RequestContext::new()).await.unwrap().name, "foo");

    dep.override_with(service("bar"));
    assert_eq!(dep.resolve(&RequestContext::new()).await.unwrap().name, "bar");
}

#[tokio::test]
async fn test_override_survives_request_changes() {
    let (dep, count) = counting_dependency(Scope::Request);
    let pinned = Arc::new(service("bar"));
    dep.override_with_arc(pinned.clone());

    for _ in 0..3 {
        let resolved = dep.resolve(&RequestContext::new()).await.unwrap();
        assert!(Arc::ptr_eq(&resolved, &pinned));
    }
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_second_override_wins() {
    let (dep, _) = counting_dependency(Scope::Default);
    dep.override_with(service("bar")).override_with(service("baz"));

    assert_eq!(dep.resolve(&RequestContext::new()).await.unwrap().name, "baz");
}

#[tokio::test]
async fn test_clear_override_returns_to_factory() {
    let (dep, count) = counting_dependency(Scope::Default);
    dep.override_with(service("bar"));
    dep.clear_override();

    let resolved = dep.resolve(&RequestContext::new()).await.unwrap();
    assert_eq!(resolved.name, "foo");
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_clear_override_drops_factory_instance_too() {
    let (dep, count) = counting_dependency(Scope::Default);
    let first = dep.resolve(&RequestContext::new()).await.unwrap();

    dep.clear_override();
    assert!(!dep.is_cached());

    let second = dep.resolve(&RequestContext::new()).await.unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[test]
fn test_clear_override_on_empty_provider_is_noop() {
    let (dep, count) = counting_dependency(Scope::Request);
    dep.clear_override().clear_override();

    assert!(!dep.is_cached());
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_override_seen_through_clones() {
    let (dep, _) = counting_dependency(Scope::Default);
    let step = dep.middleware("service");

    dep.override_with(service("bar"));

    let name = step
        .run(RequestContext::new(), |ctx| async move {
            ctx.require::<TestService>("service").unwrap().name.clone()
        })
        .await
        .unwrap();
    assert_eq!(name, "bar");
}

#[tokio::test]
async fn test_request_scope_after_clear_recreates_for_same_request() {
    let (dep, count) = counting_dependency(Scope::Request);
    let ctx = RequestContext::new();

    let before = dep.resolve(&ctx).await.unwrap();
    dep.clear_override();
    let after = dep.resolve(&ctx).await.unwrap();

    assert!(!Arc::ptr_eq(&before, &after));
    assert_eq!(count.load(Ordering::SeqCst), 2);
}
