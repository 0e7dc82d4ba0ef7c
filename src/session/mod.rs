//! A session is one run of the application. It is organized as three cooperating modules:
//!  - [input::InputModule] reads lines and turns them into [event::TallyEvent]s.
//!  - [processing::ProcessingModule] owns the [SubjectStore] and applies the events in order.
//!  - [watcher::TotalsWatcher] observes the store and keeps the running total on screen.
//!
//! Subjects live only as long as the session does.

use std::io::Write;

use anyhow::Result;
use event::TallyEvent;
use input::{InputModule, InputSource};
use processing::{tally_processor::TallyProcessor, ProcessingModule};
use render::Renderer;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use watcher::TotalsWatcher;

use crate::{tally::store::SubjectStore, utils::clock::Clock};

pub mod command;
pub mod event;
pub mod input;
pub mod processing;
pub mod render;
pub mod shutdown;
pub mod watcher;

const EVENT_BUFFER: usize = 10;

/// Represents the starting point for a session. Runs until the input ends, the user quits or
/// Ctrl-C is pressed.
pub async fn start_session<W: Write + Send + 'static>(
    source: Box<dyn InputSource>,
    renderer: Renderer<W>,
    clock: impl Clock,
) -> Result<()> {
    let shutdown_token = CancellationToken::new();

    let (_, result) = tokio::join!(
        shutdown::detect_shutdown(shutdown_token.clone()),
        run_session(source, renderer, clock, &shutdown_token),
    );
    result
}

async fn run_session<W: Write + Send + 'static>(
    source: Box<dyn InputSource>,
    renderer: Renderer<W>,
    clock: impl Clock,
    shutdown_token: &CancellationToken,
) -> Result<()> {
    let (sender, receiver) = mpsc::channel::<TallyEvent>(EVENT_BUFFER);

    let store = SubjectStore::new();
    let watcher = TotalsWatcher::new(store.subscribe(), renderer.clone());
    let input = create_input(sender, source, shutdown_token);
    let processor = create_processor(store, receiver, renderer, clock);

    info!("Session started");
    let (input_result, processing_result, watcher_result) =
        tokio::join!(input.run(), processor.run(), watcher.run());

    if let Err(input_result) = &input_result {
        error!("Input module got an error {:?}", input_result);
    }

    if let Err(processing_result) = &processing_result {
        error!("Processing module got an error {:?}", processing_result);
    }

    if let Err(watcher_result) = &watcher_result {
        error!("Totals watcher got an error {:?}", watcher_result);
    }

    info!("Session finished");
    input_result
        .and(processing_result.map(|_| ()))
        .and(watcher_result)
}

fn create_input(
    sender: mpsc::Sender<TallyEvent>,
    source: Box<dyn InputSource>,
    shutdown_token: &CancellationToken,
) -> InputModule {
    InputModule::new(sender, source, shutdown_token.clone())
}

fn create_processor<W: Write + Send + 'static>(
    store: SubjectStore,
    receiver: mpsc::Receiver<TallyEvent>,
    renderer: Renderer<W>,
    clock: impl Clock,
) -> ProcessingModule<TallyProcessor<W>> {
    let processor = TallyProcessor::new(store, renderer, Box::new(clock));
    ProcessingModule::new(receiver, processor)
}

#[cfg(test)]
mod session_tests {
    use std::io::{Cursor, Write};

    use anyhow::Result;
    use chrono::{TimeZone, Utc};
    use tempfile::NamedTempFile;
    use tokio_util::sync::CancellationToken;

    use crate::{
        session::{
            input::{LineSource, MockInputSource},
            render::Renderer,
            run_session,
        },
        utils::{clock::test_clock::FixedClock, logging::TEST_LOGGING},
    };

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2024, 10, 18, 12, 0, 0).unwrap())
    }

    fn lines_of(contents: &str, prefix: &str) -> Vec<String> {
        contents
            .lines()
            .filter(|v| v.starts_with(prefix))
            .map(str::to_string)
            .collect()
    }

    /// Walks through the whole application the way a user would: add subjects, log time on them
    /// and look at the reports.
    #[tokio::test]
    async fn smoke_test_session() -> Result<()> {
        *TEST_LOGGING;
        let script = "\
            add A\n\
            add B\n\
            add\n\
            log 1 1 50\n\
            log 2 0 20\n\
            log 3 1 0\n\
            log 1 24 0\n\
            report\n\
            monthly\n";
        let renderer = Renderer::new(Vec::new(), false);
        let token = CancellationToken::new();

        run_session(
            Box::new(LineSource::new(Cursor::new(script.as_bytes().to_vec()))),
            renderer.clone(),
            clock(),
            &token,
        )
        .await?;

        let contents = renderer.contents();
        assert_eq!(lines_of(&contents, "Added: "), vec!["Added: A", "Added: B"]);
        assert_eq!(
            lines_of(&contents, "Updated: "),
            vec!["Updated: A - 1 hr 50 min", "Updated: B - 0 hr 20 min"]
        );
        assert!(contents.contains("No subject at position 3. There are 2 subjects"));
        assert!(contents.contains("Time Report\nA\t1 hr 50 min\nB\t0 hr 20 min\nTotal\t2 hr 10 min\n"));
        assert!(contents.contains("Monthly Report\nTotal Time Spent in October\n2 hr 10 min\n"));
        assert_eq!(
            lines_of(&contents, "Total: ").last().map(String::as_str),
            Some("Total: 2 hr 10 min across 2 subjects")
        );
        assert!(token.is_cancelled());
        Ok(())
    }

    #[tokio::test]
    async fn test_session_hints_on_missing_name() -> Result<()> {
        *TEST_LOGGING;
        let script = "add\nadd   \nhelp\nlist\n";
        let renderer = Renderer::new(Vec::new(), false);

        run_session(
            Box::new(LineSource::new(Cursor::new(script.as_bytes().to_vec()))),
            renderer.clone(),
            clock(),
            &CancellationToken::new(),
        )
        .await?;

        let contents = renderer.contents();
        assert_eq!(
            lines_of(&contents, "Subject name can't be empty").len(),
            2
        );
        assert!(lines_of(&contents, "Added: ").is_empty());
        assert!(lines_of(&contents, "Total: ").is_empty());
        assert!(contents.contains("No subjects yet"));
        assert!(contents.contains("Commands available inside a session"));
        assert!(!contents.contains("error:"));
        Ok(())
    }

    #[tokio::test]
    async fn test_session_replays_file() -> Result<()> {
        *TEST_LOGGING;
        let mut file = NamedTempFile::new()?;
        writeln!(file, "add History")?;
        writeln!(file, "log 1 2 45")?;
        writeln!(file, "log 1 1 30")?;
        writeln!(file, "quit")?;
        writeln!(file, "log 1 5 0")?;

        let renderer = Renderer::new(Vec::new(), false);
        run_session(
            Box::new(LineSource::open(file.path()).await?),
            renderer.clone(),
            clock(),
            &CancellationToken::new(),
        )
        .await?;

        let contents = renderer.contents();
        assert_eq!(
            lines_of(&contents, "Updated: ").last().map(String::as_str),
            Some("Updated: History - 4 hr 15 min")
        );
        assert_eq!(
            lines_of(&contents, "Total: ").last().map(String::as_str),
            Some("Total: 4 hr 15 min across 1 subject")
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_session_keeps_order() -> Result<()> {
        let mut source = MockInputSource::new();
        let mut lines = ["add A", "add B", "add C", "log 3 1 0", "log 1 0 5", "list"]
            .map(|v| anyhow::Ok(Some(v.to_string())))
            .into_iter();
        source
            .expect_next_line()
            .returning(move || lines.next().unwrap_or(Ok(None)));

        let renderer = Renderer::new(Vec::new(), false);
        run_session(
            Box::new(source),
            renderer.clone(),
            clock(),
            &CancellationToken::new(),
        )
        .await?;

        let contents = renderer.contents();
        assert!(contents.contains("1. A\t0 hr 5 min\n2. B\t0 hr 0 min\n3. C\t1 hr 0 min\n"));
        Ok(())
    }

    #[tokio::test]
    async fn test_session_stops_on_cancellation() -> Result<()> {
        let mut source = MockInputSource::new();
        source
            .expect_next_line()
            .returning(|| Ok(Some("list".to_string())));

        let token = CancellationToken::new();
        token.cancel();
        let renderer = Renderer::new(Vec::new(), false);

        run_session(Box::new(source), renderer.clone(), clock(), &token).await?;

        assert!(renderer.contents().is_empty());
        Ok(())
    }
}
