use std::io::Write;

use anyhow::Result;
use tokio::sync::watch;
use tracing::debug;

use crate::tally::{report::aggregate, store::StoreSnapshot};

use super::render::Renderer;

/// Keeps the running total on screen. It observes the store the same way any other view would,
/// and stops once the store is dropped.
pub struct TotalsWatcher<W> {
    receiver: watch::Receiver<StoreSnapshot>,
    renderer: Renderer<W>,
}

impl<W: Write + Send + 'static> TotalsWatcher<W> {
    pub fn new(receiver: watch::Receiver<StoreSnapshot>, renderer: Renderer<W>) -> Self {
        Self { receiver, renderer }
    }

    pub async fn run(mut self) -> Result<()> {
        while self.receiver.changed().await.is_ok() {
            let snapshot = self.receiver.borrow_and_update().clone();
            debug!("Rendering totals for revision {}", snapshot.revision);
            self.renderer
                .total(aggregate(&snapshot.subjects), snapshot.subjects.len())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::Utc;

    use crate::{
        session::render::Renderer,
        tally::{entities::TimeIncrement, store::SubjectStore},
    };

    use super::TotalsWatcher;

    #[tokio::test]
    async fn test_watcher_renders_latest_total() -> Result<()> {
        let mut store = SubjectStore::new();
        let renderer = Renderer::new(Vec::new(), false);
        let watcher = TotalsWatcher::new(store.subscribe(), renderer.clone());

        let handle = tokio::spawn(watcher.run());

        let a = store.add_subject("A", Utc::now()).unwrap();
        tokio::task::yield_now().await;
        let b = store.add_subject("B", Utc::now()).unwrap();
        store.log_time(a, TimeIncrement::new_opt(1, 50).unwrap())?;
        store.log_time(b, TimeIncrement::new_opt(0, 20).unwrap())?;
        drop(store);

        handle.await??;

        let contents = renderer.contents();
        assert!(contents.starts_with("Total: "));
        assert_eq!(
            contents.lines().last(),
            Some("Total: 2 hr 10 min across 2 subjects")
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_watcher_quiet_without_changes() -> Result<()> {
        let store = SubjectStore::new();
        let renderer = Renderer::new(Vec::new(), false);
        let watcher = TotalsWatcher::new(store.subscribe(), renderer.clone());
        drop(store);

        watcher.run().await?;

        assert!(renderer.contents().is_empty());
        Ok(())
    }
}
