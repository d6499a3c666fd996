use std::io::{stdin, stdout};
use std::thread;
use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use monkey::logger::{self, LogLevel};
use monkey::repl::{self, Mode};

/// Interactive front-end for the Monkey programming language.
#[derive(Parser, Debug)]
#[command(name = "monkey", version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Log more to stderr; repeat for more detail
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Print the tokens of each line
    Tokenize,
    /// Print the syntax tree of each line
    Parse,
    /// Evaluate each line and print its value (the default)
    Evaluate,
}

impl From<Command> for Mode {
    fn from(command: Command) -> Self {
        match command {
            Command::Tokenize => Mode::Tokenize,
            Command::Parse => Mode::Parse,
            Command::Evaluate => Mode::Evaluate,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init(LogLevel::from_verbosity(args.verbose));

    let mode = args.command.map(Mode::from).unwrap_or(Mode::Evaluate);
    let session = thread::Builder::new()
        .name("session".to_string())
        .stack_size(repl::STACK_SIZE)
        .spawn(move || repl::start(mode, stdin().lock(), stdout().lock()))
        .context("failed to spawn the session thread")?;

    session
        .join()
        .map_err(|_| anyhow!("session thread panicked"))?
        .with_context(|| format!("{:?} session failed", mode))
}
