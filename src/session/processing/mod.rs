use anyhow::Result;
use module::EventProcessor;
use tokio::sync::mpsc::Receiver;
use tracing::{debug, error, info, info_span, Instrument};

use super::event::TallyEvent;

pub mod module;
pub mod tally_processor;

/// How the events of a session went. Failed events are logged and skipped, they never end the
/// session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessingSummary {
    pub processed: u64,
    pub failed: u64,
}

/// Receives session events one at a time and hands them to the processor. Because there is a
/// single receiver, mutations are applied strictly in the order they were sent.
pub struct ProcessingModule<Processor> {
    receiver: Receiver<TallyEvent>,
    processor: Processor,
}

impl<P: EventProcessor> ProcessingModule<P> {
    pub fn new(receiver: Receiver<TallyEvent>, processor: P) -> Self {
        Self {
            receiver,
            processor,
        }
    }

    /// Runs until every sender is gone, then finalizes the processor.
    pub async fn run(mut self) -> Result<ProcessingSummary> {
        let mut summary = ProcessingSummary::default();

        while let Some(event) = self.receiver.recv().await {
            let sequence = summary.processed + summary.failed + 1;
            let span = info_span!("Processing event", sequence);
            debug!(parent: &span, "Processing event {:?}", event);

            match self.processor.process_next(event).instrument(span).await {
                Ok(_) => summary.processed += 1,
                Err(e) => {
                    error!("Error processing event #{sequence}: {e:?}");
                    summary.failed += 1;
                }
            }
        }

        self.receiver.close();
        info!(
            "Processed {} events, {} failed",
            summary.processed, summary.failed
        );
        self.processor.finalize().await.map(|_| summary)
    }
}
