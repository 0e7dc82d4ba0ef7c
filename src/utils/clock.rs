use chrono::{DateTime, Local, Utc};

/// Represents an entity responsible for providing dates across application. Subjects get their
/// creation moment from it and the monthly report its month, so tests can pin both.
pub trait Clock: Sync + Send + 'static {
    fn time(&self) -> DateTime<Utc>;

    fn local_time(&self) -> DateTime<Local> {
        self.time().with_timezone(&Local)
    }
}

pub struct DefaultClock;

impl Clock for DefaultClock {
    fn time(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
