use std::future::Future;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Spawn on `runtime`, falling back to the caller's runtime; `None` when neither exists
pub(crate) fn spawn_on<F>(runtime: Option<&Handle>, task: F) -> Option<JoinHandle<F::Output>>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    match runtime {
        Some(handle) => Some(handle.spawn(task)),
        None => Handle::try_current().ok().map(|handle| handle.spawn(task)),
    }
}
