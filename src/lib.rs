//! Tally of the time spent on your subjects, right in the terminal.
//! Add subjects, log the hours and minutes spent on them, and look at the totals. Everything is
//! kept in memory for the duration of a session.
//!

pub mod cli;
pub mod session;
pub mod tally;
pub mod utils;
