use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use tokio::{
    fs::File,
    io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin},
    sync::mpsc,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, Instrument};

use super::{
    command::{parse_line, SessionInput},
    event::TallyEvent,
};

/// Where session lines come from. `None` means the input is exhausted.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait InputSource: Send {
    async fn next_line(&mut self) -> Result<Option<String>>;
}

/// [InputSource] over anything that can be read line by line.
pub struct LineSource<R> {
    lines: Lines<R>,
}

impl<R: AsyncBufRead + Unpin + Send> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }
}

impl LineSource<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl LineSource<BufReader<File>> {
    pub async fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .await
            .with_context(|| format!("Failed to open script {path:?}"))?;
        Ok(Self::new(BufReader::new(file)))
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> InputSource for LineSource<R> {
    async fn next_line(&mut self) -> Result<Option<String>> {
        Ok(self.lines.next_line().await?)
    }
}

/// Turns lines of a [InputSource] into [TallyEvent]s. When the input ends, or the user quits, the
/// shutdown token is cancelled so the rest of the session can wind down.
pub struct InputModule {
    next: mpsc::Sender<TallyEvent>,
    source: Box<dyn InputSource>,
    shutdown: CancellationToken,
}

impl InputModule {
    pub fn new(
        next: mpsc::Sender<TallyEvent>,
        source: Box<dyn InputSource>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            next,
            source,
            shutdown,
        }
    }

    /// Executes the input event loop.
    pub async fn run(mut self) -> Result<()> {
        let result = self.read_lines().await;
        self.shutdown.cancel();
        result
    }

    async fn read_lines(&mut self) -> Result<()> {
        loop {
            let line = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => {
                    info!("Input stopped by shutdown");
                    return Ok(())
                }
                line = self.source.next_line() => line,
            };

            let line = match line {
                Ok(Some(line)) => line,
                Ok(None) => {
                    info!("Input exhausted");
                    return Ok(());
                }
                Err(e) => {
                    error!("Failed to read input {e:?}");
                    return Err(e);
                }
            };

            match parse_line(&line) {
                SessionInput::Blank => continue,
                SessionInput::Quit => {
                    info!("Quit requested");
                    return Ok(());
                }
                SessionInput::Event(event) => {
                    let span = info_span!("Sending session event");
                    debug!("Sending event {:?}", event);
                    self.next
                        .send(event)
                        .instrument(span)
                        .await
                        .inspect_err(|e| error!("Unexpected error during sending {e:?}"))?;
                }
            }
        }
    }
}
