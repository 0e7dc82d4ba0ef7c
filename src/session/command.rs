use clap::{error::ErrorKind, Parser, Subcommand};

use crate::tally::entities::{TimeIncrement, MAX_INCREMENT_HOURS, MAX_INCREMENT_MINUTES};

use super::event::TallyEvent;

/// Grammar of a single session line.
#[derive(Parser, Debug)]
#[command(
    name = "session",
    no_binary_name = true,
    disable_version_flag = true,
    about = "Commands available inside a session"
)]
struct SessionLine {
    #[command(subcommand)]
    command: SessionCommand,
}

#[derive(Subcommand, Debug)]
enum SessionCommand {
    #[command(about = "Add a new subject. Example: add Linear algebra")]
    Add {
        // A missing name is passed on as empty and reported by the processor.
        #[arg(
            num_args = 0..,
            trailing_var_arg = true,
            allow_hyphen_values = true,
            help = "Name of the subject"
        )]
        name: Vec<String>,
    },
    #[command(about = "Add time spent on a subject. Example: log 2 1 30")]
    Log {
        #[arg(help = "Position of the subject as shown by `list`")]
        subject: usize,
        #[arg(
            value_parser = clap::value_parser!(u8).range(0..=MAX_INCREMENT_HOURS as i64),
            help = "Hours, from 0 to 23"
        )]
        hours: u8,
        #[arg(
            value_parser = clap::value_parser!(u8).range(0..=MAX_INCREMENT_MINUTES as i64),
            default_value_t = 0,
            help = "Minutes, from 0 to 59"
        )]
        minutes: u8,
    },
    #[command(about = "List subjects with their time")]
    List,
    #[command(about = "Show time spent on every subject")]
    Report {
        #[arg(long, help = "Print as json")]
        json: bool,
    },
    #[command(about = "Show the total time of the month")]
    Monthly {
        #[arg(long, help = "Print as json")]
        json: bool,
    },
    #[command(about = "End the session", alias = "exit")]
    Quit,
}

#[derive(Debug, PartialEq, Eq)]
pub enum SessionInput {
    Event(TallyEvent),
    Quit,
    Blank,
}

pub fn parse_line(line: &str) -> SessionInput {
    let words = line.split_whitespace().collect::<Vec<_>>();
    if words.is_empty() {
        return SessionInput::Blank;
    }

    let command = match SessionLine::try_parse_from(words) {
        Ok(SessionLine { command }) => command,
        Err(e) if e.kind() == ErrorKind::DisplayHelp => {
            return SessionInput::Event(TallyEvent::Help {
                text: e.to_string(),
            })
        }
        Err(e) => {
            return SessionInput::Event(TallyEvent::Rejected {
                message: e.to_string(),
            })
        }
    };

    let event = match command {
        SessionCommand::Add { name } => TallyEvent::AddSubject {
            name: name.join(" "),
        },
        SessionCommand::Log {
            subject,
            hours,
            minutes,
        } => match TimeIncrement::new_opt(hours, minutes) {
            Some(increment) => TallyEvent::LogTime {
                position: subject,
                increment,
            },
            None => TallyEvent::Rejected {
                message: format!("Can't log {hours} hr {minutes} min"),
            },
        },
        SessionCommand::List => TallyEvent::List,
        SessionCommand::Report { json } => TallyEvent::Report { json },
        SessionCommand::Monthly { json } => TallyEvent::Monthly { json },
        SessionCommand::Quit => return SessionInput::Quit,
    };
    SessionInput::Event(event)
}
