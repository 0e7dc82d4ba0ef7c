use crate::tally::entities::TimeIncrement;

/// A single request coming from the user. Mutating requests are applied to the store in the order
/// they were sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TallyEvent {
    AddSubject {
        name: String,
    },
    /// `position` is 1-based, the same numbering `list` shows.
    LogTime {
        position: usize,
        increment: TimeIncrement,
    },
    List,
    Report {
        json: bool,
    },
    Monthly {
        json: bool,
    },
    /// Usage text the user asked for.
    Help {
        text: String,
    },
    /// Input that couldn't be turned into a request. The message is shown to the user as is.
    Rejected {
        message: String,
    },
}
