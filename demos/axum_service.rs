//! Axum server wiring two injected services.
//!
//! `Config` is created once for the whole process; `RequestLog` is created
//! for every request and reads the config attached before it.

use axum::{routing::get, Router};
use ferrous_inject::{Dependency, DependencyError, RequestContext, Scope};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

struct Config {
    greeting: String,
}

struct RequestLog {
    sequence: u64,
    greeting: String,
}

async fn hello(ctx: RequestContext) -> Result<String, DependencyError> {
    let log = ctx.require::<RequestLog>("log")?;
    Ok(format!("{} (request #{})\n", log.greeting, log.sequence))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "debug".into()))
        .init();

    let config = Dependency::new(|_ctx| async {
        Ok(Config {
            greeting: "Hello from ferrous-inject".to_string(),
        })
    });

    let sequence = AtomicU64::new(0);
    // DEMO_SCOPE=default makes the log a process-wide singleton instead.
    let log_scope = std::env::var("DEMO_SCOPE")
        .map(|v| Scope::parse(&v))
        .unwrap_or(Scope::Request);
    let log = Dependency::from_fn(move |ctx| {
        let config = ctx.require::<Config>("config")?;
        Ok(RequestLog {
            sequence: sequence.fetch_add(1, Ordering::Relaxed) + 1,
            greeting: config.greeting.clone(),
        })
    })
    .with_scope(log_scope);

    let app = Router::new()
        .route("/", get(hello))
        .layer(log.layer("log"))
        .layer(config.layer("config"));

    let listener = TcpListener::bind("127.0.0.1:3001")
        .await
        .expect("Failed to bind address");

    tracing::info!("listening on http://127.0.0.1:3001");
    axum::serve(listener, app.into_make_service())
        .await
        .expect("Server failed to start");
}
