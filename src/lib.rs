// Countdown Timer Core - Rust countdown engine
// Timer state machine, tick scheduling, and snapshot/event streams for timer UIs

// Module declarations
pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod timer;

// Re-exports for convenience
pub use api::*;

/// Initialize Android logging
#[cfg(target_os = "android")]
pub fn init_logging() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    match tracing_android::layer("countdown-timer") {
        Ok(layer) => {
            let _ = tracing_subscriber::registry().with(layer).try_init();
        }
        Err(err) => eprintln!("Failed to initialize Android tracing layer: {}", err),
    }
}

#[cfg(not(target_os = "android"))]
pub fn init_logging() {
    let _ = tracing_subscriber::fmt::try_init();
}
