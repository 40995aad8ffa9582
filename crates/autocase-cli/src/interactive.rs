//! Line-driven front end over [`Session`].

use std::path::PathBuf;

use autocase_core::{Analyzer, Session, SessionError};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::display;

const HELP: &str = "\
Commands:
  add <path>...   select documents (replaces the current selection)
  clear           drop the current selection
  analyze         upload the selection and show the report
  toggle <n>      open or close timeline entry n
  another         leave the results and start over
  show            redraw the current view
  help            this text
  quit            exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(Vec<PathBuf>),
    Clear,
    Analyze,
    /// Zero-based timeline index.
    Toggle(usize),
    Another,
    Show,
    Help,
    Quit,
}

impl Command {
    /// Parse one input line. Entry numbers are one-based, as displayed.
    pub fn parse(line: &str) -> Result<Command, String> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(Command::Show);
        };
        match verb {
            "add" => {
                let paths: Vec<PathBuf> = words.map(PathBuf::from).collect();
                if paths.is_empty() {
                    return Err("usage: add <path>...".to_string());
                }
                Ok(Command::Add(paths))
            }
            "clear" => Ok(Command::Clear),
            "analyze" => Ok(Command::Analyze),
            "toggle" => {
                let n: usize = words
                    .next()
                    .and_then(|w| w.parse().ok())
                    .filter(|n| *n > 0)
                    .ok_or_else(|| "usage: toggle <n> (n starts at 1)".to_string())?;
                Ok(Command::Toggle(n - 1))
            }
            "another" => Ok(Command::Another),
            "show" => Ok(Command::Show),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(format!("unknown command `{other}`; try `help`")),
        }
    }
}

/// Apply one command. Returns what to print, or `None` to stop.
pub async fn apply(
    session: &mut Session,
    analyzer: &dyn Analyzer,
    command: Command,
) -> Option<String> {
    let result = match command {
        Command::Quit => return None,
        Command::Help => return Some(format!("{HELP}\n")),
        Command::Show => Ok(()),
        Command::Add(paths) => session.select_files(paths),
        Command::Clear => session.clear_selection(),
        Command::Toggle(index) => session.toggle_event(index),
        Command::Another => session.analyze_another(),
        Command::Analyze => {
            if session.can_submit() {
                println!("{}", display::render_loading().trim_end());
            }
            session.submit(analyzer).await
        }
    };

    Some(match result {
        Ok(()) => display::render_session(session),
        Err(SessionError::NoFiles) => "Select at least one file first.\n".to_string(),
        Err(err) => format!("{err}\n"),
    })
}

/// Read commands from stdin until `quit` or end of input.
pub async fn run(analyzer: &dyn Analyzer) -> anyhow::Result<()> {
    let mut session = Session::new();
    print!("{}", display::render_session(&session));
    println!("Type `help` for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };
        match apply(&mut session, analyzer, command).await {
            Some(output) => print!("{output}"),
            None => break,
        }
    }
    Ok(())
}
