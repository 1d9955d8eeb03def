use super::WorkerClose;
use crate::events::OperatorCommand;
use crate::utils::sos::SignalOfStop;
use log::{info, warn};
use std::io::BufRead;
use std::sync::mpsc::{SyncSender, TrySendError};
use std::thread::{self, JoinHandle};

/// One line typed by the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    Command(OperatorCommand),
    Quit,
    Help,
    Unknown(String),
}

impl ConsoleInput {
    pub fn parse(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(match trimmed.to_ascii_lowercase().as_str() {
            "q" | "quit" | "exit" => ConsoleInput::Quit,
            "?" | "help" => ConsoleInput::Help,
            other => match other.parse::<OperatorCommand>() {
                Ok(command) => ConsoleInput::Command(command),
                Err(_) => ConsoleInput::Unknown(trimmed.to_string()),
            },
        })
    }
}

pub fn help_line() -> String {
    let labels: Vec<&str> = OperatorCommand::ALL.iter().map(|c| c.label()).collect();
    format!("Commands: {} | q to quit", labels.join(", "))
}

/// Operator control surface read from a line-oriented input (stdin)
///
/// Runs on its own thread; commands reach the loop through a bounded
/// channel that the loop drains without blocking.
pub struct OperatorConsole {
    handle: Option<JoinHandle<()>>,
}

impl OperatorConsole {
    pub fn spawn<R>(input: R, commands: SyncSender<OperatorCommand>, sos: SignalOfStop) -> Self
    where
        R: BufRead + Send + 'static,
    {
        let handle = thread::spawn(move || {
            for line in input.lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        warn!("Operator console read failed: {}", e);
                        break;
                    }
                };

                match ConsoleInput::parse(&line) {
                    Some(ConsoleInput::Command(command)) => match commands.try_send(command) {
                        Ok(()) => {}
                        Err(TrySendError::Full(command)) => {
                            warn!("Operator queue full, dropping {:?}", command);
                        }
                        Err(TrySendError::Disconnected(_)) => break,
                    },
                    Some(ConsoleInput::Quit) => {
                        sos.cancel();
                        break;
                    }
                    Some(ConsoleInput::Help) => println!("{}", help_line()),
                    Some(ConsoleInput::Unknown(text)) => {
                        warn!("Unknown operator command `{}`. {}", text, help_line());
                    }
                    None => {}
                }
            }
            info!("Operator console closed");
        });

        Self {
            handle: Some(handle),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(|h| h.is_finished())
    }
}

impl WorkerClose for OperatorConsole {
    fn close(&mut self) {
        // a thread blocked on stdin cannot be interrupted; only reap a finished one
        if let Some(handle) = self.handle.take()
            && handle.is_finished()
        {
            let _ = handle.join();
        }
    }
}
