use tokio::sync::Mutex;

/// Serializes tests that read or write `TOOLVIEW_*` environment variables.
/// Sync tests take it with `.blocking_lock()`.
pub static ENV_LOCK: Mutex<()> = Mutex::const_new(());
