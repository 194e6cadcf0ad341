use super::store::SessionStore;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// How often to sweep for a given idle timeout
pub fn sweep_interval(idle_timeout: Duration) -> Duration {
    (idle_timeout / 4).max(Duration::from_secs(1))
}

/// Periodically evict idle sessions until `cancel` fires
pub fn spawn_sweeper(
    store: Arc<SessionStore>,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Session sweeper started, running every {:?}", interval);
        let mut ticker = tokio::time::interval(interval);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let evicted = store.evict_idle(Instant::now()).await;
                    if evicted > 0 {
                        debug!("Evicted {} idle sessions", evicted);
                    }
                }
            }
        }

        info!("Session sweeper stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{SessionKey, SessionState, Trigger};

    #[test]
    fn test_sweep_interval() {
        assert_eq!(sweep_interval(Duration::from_secs(900)), Duration::from_secs(225));
        assert_eq!(sweep_interval(Duration::from_secs(2)), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_sweeper_evicts_and_stops() {
        let store = Arc::new(SessionStore::new(Duration::from_millis(20)));
        let key = SessionKey::new(1, 1);
        store.apply(key, Trigger::AddEvent).await;

        let cancel = CancellationToken::new();
        let task = spawn_sweeper(Arc::clone(&store), Duration::from_millis(10), cancel.clone());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(store.is_empty().await);
        assert_eq!(store.state(key).await, SessionState::Idle);

        cancel.cancel();
        task.await.unwrap();
    }
}
