//! Application layer.

pub mod service;
pub mod watcher;

pub use service::SignalLifecycleManager;
pub use watcher::ExpiryWatcher;
