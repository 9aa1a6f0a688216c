//! Interactive commands
//!
//! Each input line parses into a [`Command`]; [`execute`] runs it against
//! the session and writes the outcome. Errors are returned to the loop,
//! which prints their user message and keeps the last good state.

use std::io::Write;
use std::path::{Path, PathBuf};

use viz_engine::{
    export_source, ChartKind, Customization, Generator, HistoryPersistence, Result, Session,
    VisualizationResult, VizError,
};

use crate::constants::repl;

/// A parsed input line
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Generate(String),
    Refine(String),
    Edit(PathBuf),
    Customize(Customization),
    Undo,
    Redo,
    Reset,
    Show,
    History,
    Open(String),
    Delete(String),
    ClearHistory,
    Export(Option<PathBuf>),
    Help,
    Quit,
}

/// What the loop does after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Input lines that are not a valid command
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("Unknown command '{0}'. Type 'help' for a list of commands.")]
    Unknown(String),
    #[error("Usage: {0}")]
    Usage(&'static str),
    #[error("{0}")]
    Invalid(String),
}

pub const HELP: &str = "\
Commands:
  generate <prompt>         create a new visualization
  refine <prompt>           revise the current visualization
  edit <file>               replace the current source with the file's contents
  chart-kind <kind>         bar, line, area, pie, scatter or radar
  color <data-key> <color>  set a chart series color
  legend|grid|tooltip on|off
  title <text>              rename the current visualization
  undo | redo | reset
  show                      print the current visualization
  history                   list recent generations
  open <id> | delete <id> | clear-history
  export [path]             write the current source to a file
  help | quit";

impl Command {
    /// Parse one line. `Ok(None)` for blank input.
    pub fn parse(line: &str) -> std::result::Result<Option<Self>, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };

        let command = match name.to_ascii_lowercase().as_str() {
            "generate" | "gen" => Self::Generate(required(rest, "generate <prompt>")?.to_string()),
            "refine" => Self::Refine(required(rest, "refine <prompt>")?.to_string()),
            "edit" => Self::Edit(PathBuf::from(required(rest, "edit <file>")?)),
            "chart-kind" => {
                let value = required(rest, "chart-kind <kind>")?;
                let kind = ChartKind::parse(value).ok_or_else(|| {
                    CommandError::Invalid(format!("'{}' is not a chart kind.", value))
                })?;
                Self::Customize(Customization::ChartKind(kind))
            }
            "color" => {
                let usage = "color <data-key> <color>";
                let (data_key, color) = required(rest, usage)?
                    .split_once(char::is_whitespace)
                    .ok_or(CommandError::Usage(usage))?;
                Self::Customize(Customization::SeriesColor {
                    data_key: data_key.to_string(),
                    color: color.trim().to_string(),
                })
            }
            "legend" => Self::Customize(Customization::Legend(switch(rest, "legend on|off")?)),
            "grid" => Self::Customize(Customization::Grid(switch(rest, "grid on|off")?)),
            "tooltip" => Self::Customize(Customization::Tooltip(switch(rest, "tooltip on|off")?)),
            "title" => Self::Customize(Customization::Title(
                required(rest, "title <text>")?.to_string(),
            )),
            "undo" => Self::Undo,
            "redo" => Self::Redo,
            "reset" => Self::Reset,
            "show" => Self::Show,
            "history" => Self::History,
            "open" => Self::Open(required(rest, "open <id>")?.to_string()),
            "delete" => Self::Delete(required(rest, "delete <id>")?.to_string()),
            "clear-history" => Self::ClearHistory,
            "export" => Self::Export((!rest.is_empty()).then(|| PathBuf::from(rest))),
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            _ => return Err(CommandError::Unknown(name.to_string())),
        };
        Ok(Some(command))
    }
}

fn required<'a>(rest: &'a str, usage: &'static str) -> std::result::Result<&'a str, CommandError> {
    if rest.is_empty() {
        Err(CommandError::Usage(usage))
    } else {
        Ok(rest)
    }
}

fn switch(rest: &str, usage: &'static str) -> std::result::Result<bool, CommandError> {
    match rest.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        _ => Err(CommandError::Usage(usage)),
    }
}

/// Run `command` against `session`, writing output to `out`
pub async fn execute<G, P, W>(
    session: &mut Session<G, P>,
    command: Command,
    out: &mut W,
) -> Result<Flow>
where
    G: Generator,
    P: HistoryPersistence,
    W: Write,
{
    match command {
        Command::Generate(prompt) => {
            writeln!(out, "Generating...")?;
            let result = session.generate(&prompt).await?;
            write_summary(out, result)?;
        }
        Command::Refine(prompt) => {
            writeln!(out, "Refining...")?;
            let result = session.refine(&prompt).await?;
            write_summary(out, result)?;
        }
        Command::Edit(path) => {
            let text = tokio::fs::read_to_string(&path).await?;
            let result = session.edit_source(&text)?;
            write_summary(out, result)?;
        }
        Command::Customize(customization) => {
            let result = session.customize(&customization)?;
            write_summary(out, result)?;
        }
        Command::Undo => match session.undo()? {
            Some(result) => write_summary(out, result)?,
            None => writeln!(out, "Nothing to undo.")?,
        },
        Command::Redo => match session.redo()? {
            Some(result) => write_summary(out, result)?,
            None => writeln!(out, "Nothing to redo.")?,
        },
        Command::Reset => {
            session.reset();
            writeln!(out, "Session cleared.")?;
        }
        Command::Show => {
            let position = position(session);
            let current = session.current().ok_or(VizError::NoActiveVisualization)?;
            write_details(out, current, &position)?;
        }
        Command::History => write_history(out, session)?,
        Command::Open(id) => {
            let result = session.open_history(&id)?;
            write_summary(out, result)?;
        }
        Command::Delete(id) => {
            session.delete_history(&id)?;
            writeln!(out, "Deleted {}.", id)?;
        }
        Command::ClearHistory => {
            session.clear_history()?;
            writeln!(out, "History cleared.")?;
        }
        Command::Export(path) => {
            let current = session.current().ok_or(VizError::NoActiveVisualization)?;
            let file = export_source(current)?;
            let target = export_target(path.as_deref(), &file.file_name);
            tokio::fs::write(&target, &file.contents).await?;
            log::info!("Exported {} to {:?}", file.mime_type, target);
            writeln!(out, "Wrote {}", target.display())?;
        }
        Command::Help => writeln!(out, "{}", HELP)?,
        Command::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

/// A directory target gets the suggested file name appended
fn export_target(path: Option<&Path>, file_name: &str) -> PathBuf {
    match path {
        Some(path) if path.is_dir() => path.join(file_name),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(file_name),
    }
}

fn position<G: Generator, P: HistoryPersistence>(session: &Session<G, P>) -> String {
    match session.index() {
        Some(idx) => format!("version {} of {}", idx + 1, session.version_count()),
        None => "empty".to_string(),
    }
}

fn write_summary(out: &mut impl Write, result: &VisualizationResult) -> std::io::Result<()> {
    writeln!(out, "[{}] {}", result.kind(), result.title)?;
    if !result.explanation.is_empty() {
        writeln!(out, "{}", result.explanation)?;
    }
    Ok(())
}

fn write_details(
    out: &mut impl Write,
    result: &VisualizationResult,
    position: &str,
) -> Result<()> {
    writeln!(out, "{} ({})", result.title, position)?;
    writeln!(out, "Type: {}", result.kind())?;
    if let Some(id) = &result.id {
        writeln!(out, "Id: {}", id)?;
    }
    if !result.explanation.is_empty() {
        writeln!(out, "{}", result.explanation)?;
    }
    writeln!(out)?;
    writeln!(out, "{}", result.source_text()?)?;
    Ok(())
}

fn write_history<G: Generator, P: HistoryPersistence>(
    out: &mut impl Write,
    session: &Session<G, P>,
) -> std::io::Result<()> {
    let history = session.history();
    if history.is_empty() {
        return writeln!(out, "No history yet.");
    }
    for entry in history.entries() {
        writeln!(
            out,
            "{}  {}  [{}] {}",
            entry.id,
            entry.created_at.format(repl::TIME_FORMAT),
            entry.visualization.kind(),
            entry.visualization.title
        )?;
        writeln!(out, "    {}", entry.prompt)?;
    }
    Ok(())
}
