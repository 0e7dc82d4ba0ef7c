use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;

use crate::{
    session::{input::LineSource, render::Renderer, start_session},
    utils::{
        clock::DefaultClock,
        dir::create_application_default_path,
        logging::{enable_logging, REPLAY_PREFIX, SESSION_PREFIX},
        runtime::single_thread_runtime,
    },
};

#[derive(Parser, Debug)]
#[command(name = "TimeTally", version, long_about = None)]
#[command(about = "Tally the time you spend on your subjects", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(
        long,
        help = "Application directory, only used for logs. By default tries to use $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
    #[arg(long = "log-filter", help = "Log level. Falls back to RUST_LOG, then to debug")]
    log: Option<LevelFilter>,
    /// This option is for debugging purposes only.
    #[arg(long = "log-console", help = "Also print logs to stderr")]
    log_console: bool,
    #[arg(long, help = "Don't color the output")]
    plain: bool,
    #[arg(short, long, help = "Don't greet on start of an interactive session")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Start an interactive session. Type `help` inside for the commands")]
    Session {},
    #[command(about = "Run session commands from a file, one per line, then exit")]
    Replay {
        #[arg(help = "File with session commands")]
        file: PathBuf,
    },
}

pub fn run_cli() -> Result<()> {
    let args = Args::parse();

    let app_dir = args
        .dir
        .clone()
        .map_or_else(create_application_default_path, Ok)?;
    let prefix = match &args.commands {
        Commands::Session {} => SESSION_PREFIX,
        Commands::Replay { .. } => REPLAY_PREFIX,
    };
    enable_logging(prefix, &app_dir.join("logs"), args.log, args.log_console)?;

    let renderer = Renderer::new(std::io::stdout(), !args.plain);

    // Reading stdin occupies a blocking thread that can't be interrupted, so the runtime must not
    // wait for it on exit.
    let runtime = single_thread_runtime()?;
    let result = runtime.block_on(async move {
        match args.commands {
            Commands::Session {} => {
                if !args.quiet {
                    renderer.banner()?;
                }
                start_session(Box::new(LineSource::stdin()), renderer, DefaultClock).await
            }
            Commands::Replay { file } => {
                let source = LineSource::open(&file).await?;
                start_session(Box::new(source), renderer, DefaultClock).await
            }
        }
    });
    runtime.shutdown_background();
    result
}
