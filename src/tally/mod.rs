//! The domain of the application.
//!  - [entities] holds subjects and the time arithmetic.
//!  - [store::SubjectStore] owns the subjects of a session and notifies subscribers on change.
//!  - [report] builds read-only summaries from a slice of subjects.

pub mod entities;
pub mod report;
pub mod store;
