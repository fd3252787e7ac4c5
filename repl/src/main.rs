use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{self, WrapErr};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use adapter::{Adapter, AdapterCommand};
use session::{
    Availability, Location, Session, SessionConfig, SessionHooks, Status, StdioConsole,
};

/// Debug a program through a DAP adapter, driving it with gdb-style
/// commands.
#[derive(Parser, Debug)]
#[command(name = "adept")]
struct Args {
    /// The executable to debug.
    program: PathBuf,

    /// Arguments passed to the debuggee.
    #[arg(trailing_var_arg = true)]
    program_args: Vec<String>,

    /// Adapter command line (defaults to `gdb`; the DAP-mode flag is
    /// added automatically).
    #[arg(long)]
    adapter: Option<String>,

    /// Stop at the beginning of the main subprogram.
    #[arg(long)]
    stop_at_main: bool,
}

/// Prints the session's lifecycle to the terminal.
struct ReplHooks;

impl SessionHooks for ReplHooks {
    fn debugger_started(&mut self) {
        println!("(debugger ready)");
    }

    fn process_stopped(&mut self) {
        println!("(stopped)");
    }

    fn location_changed(&mut self, location: &Location) {
        if let (Some(file), Some(line)) = (&location.file, location.line) {
            println!("at {}:{line}", file.display());
        }
    }

    fn debuggee_terminated(&mut self) {
        println!("(program finished)");
    }

    fn state_changed(&mut self, status: Status, availability: Availability) {
        tracing::debug!(?status, ?availability, "state changed");
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let command = AdapterCommand::resolve(args.adapter.as_deref(), None, None);
    let (adapter, transport) =
        Adapter::spawn(command).wrap_err("starting the debug adapter")?;

    let mut config = SessionConfig::new(&args.program)
        .with_args(args.program_args)
        .with_console(Arc::new(StdioConsole))
        .with_hooks(Box::new(ReplHooks))
        .with_adapter(adapter);
    config.stop_at_main = args.stop_at_main;
    let session = Session::spawn(transport, config);

    session.wait_for_status(|s| s >= Status::Ready).await;
    if session.status() == Status::Terminating {
        eyre::bail!("the debug session could not be started");
    }

    // stdin is read on a plain thread; lines flow into the async loop
    let (input_tx, mut input_rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        let mut buffer = String::new();
        loop {
            buffer.clear();
            match std::io::stdin().read_line(&mut buffer) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    if input_tx.send(buffer.trim().to_string()).is_err() {
                        break;
                    }
                }
            }
        }
    });

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        tokio::select! {
            line = input_rx.recv() => match line {
                Some(line) => {
                    if session.run_command(line).await.is_err() {
                        break;
                    }
                }
                None => {
                    let _ = session.quit();
                    break;
                }
            },
            _ = session.wait_for_status(|s| s == Status::Terminating) => {
                break;
            }
        }
    }

    println!();
    Ok(())
}
