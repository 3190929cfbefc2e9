use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;

use palaver_db::ChatStore;
use palaver_types::error::ChatError;

/// Handle to the injected store. Every call runs on the blocking pool and is
/// bounded by `timeout`, so a wedged backend surfaces as `ChatError::Store`
/// instead of hanging the request.
#[derive(Clone)]
pub struct SharedStore {
    inner: Arc<dyn ChatStore>,
    timeout: Duration,
}

impl SharedStore {
    pub fn new(inner: Arc<dyn ChatStore>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub async fn call<F, T>(&self, f: F) -> Result<T, ChatError>
    where
        F: FnOnce(&dyn ChatStore) -> anyhow::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.inner.clone();
        let task = tokio::task::spawn_blocking(move || f(store.as_ref()));

        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(result)) => result.map_err(ChatError::Store),
            Ok(Err(e)) => Err(ChatError::Store(anyhow!("store task failed: {}", e))),
            Err(_) => Err(ChatError::Store(anyhow!(
                "store call timed out after {:?}",
                self.timeout
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::SlowStore;

    #[tokio::test]
    async fn slow_store_times_out() {
        let store = SharedStore::new(
            Arc::new(SlowStore(Duration::from_millis(300))),
            Duration::from_millis(20),
        );
        let result = store.call(|s| s.list_participants()).await;
        assert!(matches!(result, Err(ChatError::Store(_))));
    }

    #[tokio::test]
    async fn panicking_call_becomes_store_failure() {
        let store = SharedStore::new(
            Arc::new(palaver_db::Database::open_in_memory().unwrap()),
            Duration::from_secs(1),
        );
        let result: Result<(), _> = store.call(|_| panic!("boom")).await;
        assert!(matches!(result, Err(ChatError::Store(_))));
    }
}
