use std::io::Write;

use anyhow::Result;
use tracing::{debug, warn};

use crate::{
    session::{event::TallyEvent, render::Renderer},
    tally::{
        entities::TimeIncrement,
        report::{monthly_report, time_report},
        store::{StoreError, SubjectStore},
    },
    utils::clock::Clock,
};

use super::module::EventProcessor;

/// Applies events to the [SubjectStore] of the session and renders the answer to each of them.
pub struct TallyProcessor<W> {
    store: SubjectStore,
    renderer: Renderer<W>,
    clock: Box<dyn Clock>,
}

impl<W: Write + Send + 'static> TallyProcessor<W> {
    pub fn new(store: SubjectStore, renderer: Renderer<W>, clock: Box<dyn Clock>) -> Self {
        Self {
            store,
            renderer,
            clock,
        }
    }

    fn add_subject(&mut self, name: &str) -> Result<()> {
        let Some(id) = self.store.add_subject(name, self.clock.time()) else {
            warn!("Rejected subject name {name:?}");
            return self.renderer.message("Subject name can't be empty");
        };
        let subject = self.store.get(id).ok_or(StoreError::UnknownSubject(id))?;
        self.renderer.added(subject)
    }

    fn log_time(&mut self, position: usize, increment: TimeIncrement) -> Result<()> {
        let id = position
            .checked_sub(1)
            .and_then(|index| self.store.subjects().get(index))
            .map(|v| v.id());
        let Some(id) = id else {
            warn!("No subject at position {position}");
            return self.renderer.message(&format!(
                "No subject at position {position}. There are {} subjects",
                self.store.len()
            ));
        };

        self.store.log_time(id, increment)?;
        let subject = self.store.get(id).ok_or(StoreError::UnknownSubject(id))?;
        self.renderer.updated(subject)
    }
}

impl<W: Write + Send + 'static> EventProcessor for TallyProcessor<W> {
    async fn process_next(&mut self, message: TallyEvent) -> Result<()> {
        match message {
            TallyEvent::AddSubject { name } => self.add_subject(&name),
            TallyEvent::LogTime {
                position,
                increment,
            } => self.log_time(position, increment),
            TallyEvent::List => self.renderer.list(self.store.subjects()),
            TallyEvent::Report { json } => {
                let report = time_report(self.store.subjects());
                if json {
                    self.renderer.json(&report)
                } else {
                    self.renderer.time_report(&report)
                }
            }
            TallyEvent::Monthly { json } => {
                let report = monthly_report(self.store.subjects(), self.clock.local_time());
                if json {
                    self.renderer.json(&report)
                } else {
                    self.renderer.monthly(&report)
                }
            }
            TallyEvent::Help { text } => {
                debug!("Showing help");
                self.renderer.message(&text)
            }
            TallyEvent::Rejected { message } => {
                warn!("Rejected input");
                self.renderer.message(&message)
            }
        }
    }

    async fn finalize(&mut self) -> Result<()> {
        self.renderer.flush()
    }
}
