// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Line-driven host lifecycle.
//
// Stands in for the photo-booth application: each input line is either a
// phase notification or a change to the current picture.
//
//   failsafe            enter the failsafe phase
//   wait [print]        waiting tick, optionally with a print button press
//   process             enter processing and run one tick (auto-print)
//   prompt [print]      print-prompt tick, optionally with a button press
//   picture <path>      set the last captured picture
//   status              show counters and printer state
//   quit                leave the loop

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use boothgate_core::types::Phase;
use boothgate_print::{AttemptOutcome, PrintArbiter, QuotaTracker, Tick};
use tracing::debug;

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Failsafe,
    Wait { print: bool },
    Process,
    Prompt { print: bool },
    Picture(PathBuf),
    Status,
    Quit,
}

/// Parse an input line. `None` for blank or unknown lines.
pub fn parse_command(line: &str) -> Option<Command> {
    let mut words = line.split_whitespace();
    let verb = words.next()?.to_ascii_lowercase();
    let print = words.next().is_some_and(|w| w.eq_ignore_ascii_case("print"));

    match verb.as_str() {
        "failsafe" => Some(Command::Failsafe),
        "wait" => Some(Command::Wait { print }),
        "process" => Some(Command::Process),
        "prompt" => Some(Command::Prompt { print }),
        "picture" => {
            let rest = line.trim_start()[verb.len()..].trim();
            (!rest.is_empty()).then(|| Command::Picture(PathBuf::from(rest)))
        }
        "status" => Some(Command::Status),
        "quit" | "exit" => Some(Command::Quit),
        _ => None,
    }
}

/// Owns the session state the real booth application would own.
pub struct ConsoleHost<'a> {
    arbiter: &'a PrintArbiter,
    quota: QuotaTracker,
    phase: Option<Phase>,
    picture: Option<PathBuf>,
}

impl<'a> ConsoleHost<'a> {
    pub fn new(arbiter: &'a PrintArbiter) -> Self {
        Self {
            arbiter,
            quota: QuotaTracker::new(arbiter.config().max_duplicates),
            phase: None,
            picture: None,
        }
    }

    pub fn quota(&self) -> &QuotaTracker {
        &self.quota
    }

    /// Read commands until `quit` or end of input.
    pub fn run(&mut self, input: impl BufRead, mut out: impl Write) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;
            let Some(command) = parse_command(&line) else {
                if !line.trim().is_empty() {
                    writeln!(out, "unknown command: {}", line.trim())?;
                }
                continue;
            };
            if command == Command::Quit {
                break;
            }
            self.handle(command, &mut out)?;
        }
        Ok(())
    }

    fn handle(&mut self, command: Command, out: &mut impl Write) -> io::Result<()> {
        debug!(?command, "host command");
        match command {
            Command::Failsafe => self.switch_to(Phase::Failsafe),
            Command::Wait { print } => {
                self.switch_to(Phase::Waiting);
                self.tick(Phase::Waiting, print, out)?;
            }
            Command::Process => {
                // Processing is entered afresh for every new output cycle.
                self.phase = Some(Phase::Processing);
                self.arbiter.enter(Phase::Processing, &mut self.quota);
                self.tick(Phase::Processing, false, out)?;
            }
            Command::Prompt { print } => {
                self.switch_to(Phase::PrintPrompt);
                self.tick(Phase::PrintPrompt, print, out)?;
            }
            Command::Picture(path) => {
                writeln!(out, "picture: {}", path.display())?;
                self.picture = Some(path);
            }
            Command::Status => {
                let snapshot = self.arbiter.health().query();
                writeln!(
                    out,
                    "printed={} remaining_duplicates={} installed={} ready={} fault={}",
                    self.quota.printed(),
                    self.quota.remaining_duplicates(),
                    snapshot.installed,
                    snapshot.ready,
                    snapshot.fault.map_or_else(|| "none".to_string(), |f| f.to_string()),
                )?;
            }
            Command::Quit => {}
        }
        Ok(())
    }

    fn switch_to(&mut self, phase: Phase) {
        if self.phase != Some(phase) {
            self.phase = Some(phase);
            self.arbiter.enter(phase, &mut self.quota);
        }
    }

    fn tick(&mut self, phase: Phase, print_requested: bool, out: &mut impl Write) -> io::Result<()> {
        let tick = Tick {
            picture: self.picture.as_deref(),
            print_requested,
        };
        for outcome in self.arbiter.tick(phase, &mut self.quota, tick) {
            match outcome {
                AttemptOutcome::Printed { copies } => writeln!(out, "printed ({copies} per page)")?,
                AttemptOutcome::Rejected(rejection) => writeln!(out, "not printed: {rejection}")?,
            }
        }
        Ok(())
    }
}
