use anyhow::Result;

use crate::session::event::TallyEvent;

/// Represents an event processor. The session has one, the tally of the current process, but a
/// processor forwarding events elsewhere would plug in the same way.
pub trait EventProcessor {
    fn process_next(&mut self, message: TallyEvent) -> impl std::future::Future<Output = Result<()>>;

    fn finalize(&mut self) -> impl std::future::Future<Output = Result<()>>;
}
