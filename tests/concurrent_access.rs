/// Concurrent access tests
///
/// Handlers run on a multi-threaded runtime. The provider does not
/// deduplicate racing factory calls, but every caller of a default-scoped
/// provider must end up with one stable instance, and request-scoped
/// instances must never cross requests.

use ferrous_inject::{Dependency, RequestContext, Scope};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug)]
struct Tagged {
    request: u64,
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_default_scope_racers_converge_on_cached_instance() {
    let calls = Arc::new(AtomicU32::new(0));
    let calls_clone = calls.clone();
    let dep = Dependency::new(move |ctx| {
        calls_clone.fetch_add(1, Ordering::SeqCst);
        let request = ctx.id().as_u64();
        async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            Ok(Tagged { request })
        }
    });

    let mut handles = Vec::new();
    for _ in 0..16 {
        let dep = dep.clone();
        handles.push(tokio::spawn(async move {
            dep.resolve(&RequestContext::new()).await.unwrap()
        }));
    }

    let mut resolved = Vec::new();
    for handle in handles {
        resolved.push(handle.await.unwrap());
    }

    let cached = dep.resolve(&RequestContext::new()).await.unwrap();
    for r in &resolved {
        assert!(Arc::ptr_eq(r, &cached));
    }
    assert!(calls.load(Ordering::SeqCst) >= 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_request_scope_never_leaks_across_requests() {
    let dep = Dependency::new(|ctx| {
        let request = ctx.id().as_u64();
        async move {
            tokio::time::sleep(Duration::from_millis(1)).await;
            Ok(Tagged { request })
        }
    })
    .with_scope(Scope::Request);

    let mut handles = Vec::new();
    for _ in 0..32 {
        let dep = dep.clone();
        handles.push(tokio::spawn(async move {
            let ctx = RequestContext::new();
            for _ in 0..4 {
                let service = dep.resolve(&ctx).await.unwrap();
                assert_eq!(service.request, ctx.id().as_u64());
                tokio::task::yield_now().await;
            }
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_override_under_concurrent_resolution() {
    let dep = Dependency::new(|ctx| {
        let request = ctx.id().as_u64();
        async move { Ok(Tagged { request }) }
    })
    .with_scope(Scope::Request);
    let pinned = Arc::new(Tagged { request: 0 });
    dep.override_with_arc(pinned.clone());

    let mut handles = Vec::new();
    for _ in 0..16 {
        let dep = dep.clone();
        handles.push(tokio::spawn(async move {
            dep.resolve(&RequestContext::new()).await.unwrap()
        }));
    }

    for handle in handles {
        assert!(Arc::ptr_eq(&handle.await.unwrap(), &pinned));
    }
}
