use std::{
    io::{self, Write},
    sync::{Arc, Mutex},
};

use ansi_term::{Colour, Style};
use anyhow::{anyhow, Result};
use serde::Serialize;

use crate::tally::{
    entities::{Subject, TimeSpent},
    report::{MonthlyReport, TimeReport},
};

const ACCENT: Colour = Colour::RGB(96, 92, 184);
const TIME: Colour = Colour::RGB(117, 235, 200);
const LABEL: Colour = Colour::RGB(145, 119, 184);

/// Everything the session shows goes through here. Clones share the same output so the processor
/// and the watcher never interleave inside a line.
pub struct Renderer<W> {
    output: Arc<Mutex<W>>,
    colored: bool,
}

impl<W> Clone for Renderer<W> {
    fn clone(&self) -> Self {
        Self {
            output: self.output.clone(),
            colored: self.colored,
        }
    }
}

impl<W: Write + Send + 'static> Renderer<W> {
    pub fn new(output: W, colored: bool) -> Self {
        Self {
            output: Arc::new(Mutex::new(output)),
            colored,
        }
    }

    pub fn banner(&self) -> Result<()> {
        let title = self.paint(ACCENT.bold(), "TimeTally");
        self.write(|w| {
            writeln!(w, "{title}")?;
            writeln!(w, "Type `help` to see the commands, `quit` to leave.")
        })
    }

    pub fn message(&self, message: &str) -> Result<()> {
        let message = message.trim_end();
        self.write(|w| writeln!(w, "{message}"))
    }

    pub fn added(&self, subject: &Subject) -> Result<()> {
        let name = self.paint(Style::new().bold(), subject.name());
        self.write(|w| writeln!(w, "Added: {name}"))
    }

    pub fn updated(&self, subject: &Subject) -> Result<()> {
        let name = self.paint(Style::new().bold(), subject.name());
        let time = self.time(subject.time());
        self.write(|w| writeln!(w, "Updated: {name} - {time}"))
    }

    pub fn total(&self, total: TimeSpent, subject_count: usize) -> Result<()> {
        let time = self.time(total);
        let noun = if subject_count == 1 {
            "subject"
        } else {
            "subjects"
        };
        self.write(|w| writeln!(w, "Total: {time} across {subject_count} {noun}"))
    }

    pub fn list(&self, subjects: &[Subject]) -> Result<()> {
        if subjects.is_empty() {
            return self.message("No subjects yet. Add one with `add <name>`.");
        }
        let lines = subjects
            .iter()
            .enumerate()
            .map(|(i, v)| format!("{}. {}\t{}", i + 1, v.name(), self.time(v.time())))
            .collect::<Vec<_>>();
        self.write(|w| {
            for line in lines {
                writeln!(w, "{line}")?;
            }
            Ok(())
        })
    }

    pub fn time_report(&self, report: &TimeReport) -> Result<()> {
        let title = self.paint(ACCENT.bold(), "Time Report");
        let rows = report
            .subjects
            .iter()
            .map(|v| format!("{}\t{}", v.name, self.time(v.time)))
            .collect::<Vec<_>>();
        let total = self.time(report.total);
        self.write(|w| {
            writeln!(w, "{title}")?;
            for row in rows {
                writeln!(w, "{row}")?;
            }
            writeln!(w, "Total\t{total}")
        })
    }

    pub fn monthly(&self, report: &MonthlyReport) -> Result<()> {
        let title = self.paint(ACCENT.bold(), "Monthly Report");
        let label = self.paint(
            LABEL.normal(),
            &format!("Total Time Spent in {}", report.month),
        );
        let total = self.time(report.total);
        self.write(|w| {
            writeln!(w, "{title}")?;
            writeln!(w, "{label}")?;
            writeln!(w, "{total}")
        })
    }

    pub fn json(&self, value: &impl Serialize) -> Result<()> {
        let text = serde_json::to_string_pretty(value)?;
        self.write(|w| writeln!(w, "{text}"))
    }

    pub fn flush(&self) -> Result<()> {
        self.write(|w| w.flush())
    }

    fn time(&self, time: TimeSpent) -> String {
        self.paint(TIME.normal(), &time.to_string())
    }

    fn paint(&self, style: Style, text: &str) -> String {
        if self.colored {
            style.paint(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn write(&self, f: impl FnOnce(&mut W) -> io::Result<()>) -> Result<()> {
        let mut output = self
            .output
            .lock()
            .map_err(|_| anyhow!("Output lock was poisoned"))?;
        f(&mut *output)?;
        Ok(())
    }
}

#[cfg(test)]
impl Renderer<Vec<u8>> {
    pub fn contents(&self) -> String {
        let output = self.output.lock().unwrap();
        String::from_utf8_lossy(&output).into_owned()
    }
}
