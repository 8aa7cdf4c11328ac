//! `chores shell`: an interactive session over one loaded list.
//!
//! The list is loaded once and every line runs against it, so the sort
//! direction carries over between commands. Words are split on whitespace
//! and rejoined with single spaces, so item text needs no quoting; runs of
//! spaces collapse and quote characters are kept as typed.

use super::Context;
use super::add::{AddArgs, apply_add};
use super::check::{CheckArgs, apply_check};
use super::edit::{EditArgs, apply_edit};
use super::list::{ListArgs, write_list};
use super::move_cmd::{MoveArgs, apply_move};
use super::rm::{RmArgs, apply_rm};
use super::session::Session;
use super::sort::apply_toggle_sort;
use crate::output::{OutputMode, write_outcome};
use chores_core::{ItemStore, LockMode};
use clap::{Parser, Subcommand};
use std::io::{self, IsTerminal, Write};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(no_binary_name = true, name = "chores", disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand, Debug)]
enum ShellCommand {
    /// Add an item at the top of the list.
    Add(AddArgs),
    /// Remove an item by key.
    Rm(RmArgs),
    /// Replace an item's text.
    Edit(EditArgs),
    /// Mark an item done.
    Check(CheckArgs),
    /// Mark an item not done.
    Uncheck(CheckArgs),
    /// Move an item between 1-based positions.
    Move(MoveArgs),
    /// Toggle the alphabetical sort direction.
    Sort,
    /// Show the list.
    List(ListArgs),
    /// Wait until every change so far is written.
    Flush,
    /// Leave the shell.
    #[command(visible_alias = "exit")]
    Quit,
}

/// What the read loop should do after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Flush,
    Quit,
}

/// Run one shell line against `store`.
///
/// Command output goes to `out`; usage errors go to `err`.
pub fn execute_line(
    store: &mut ItemStore,
    line: &str,
    mode: OutputMode,
    quiet: bool,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> anyhow::Result<Flow> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(Flow::Continue);
    }

    let parsed = match ShellLine::try_parse_from(line.split_whitespace()) {
        Ok(parsed) => parsed,
        Err(parse_err) => {
            write!(err, "{}", parse_err.render())?;
            return Ok(Flow::Continue);
        }
    };
    debug!(command = ?parsed.command, "shell command");

    let outcome = match &parsed.command {
        ShellCommand::Add(args) => apply_add(store, args),
        ShellCommand::Rm(args) => apply_rm(store, args),
        ShellCommand::Edit(args) => apply_edit(store, args),
        ShellCommand::Check(args) => apply_check(store, args, true),
        ShellCommand::Uncheck(args) => apply_check(store, args, false),
        ShellCommand::Move(args) => apply_move(store, args),
        ShellCommand::Sort => apply_toggle_sort(store),
        ShellCommand::List(args) => {
            write_list(out, store, args, mode)?;
            return Ok(Flow::Continue);
        }
        ShellCommand::Flush => return Ok(Flow::Flush),
        ShellCommand::Quit => return Ok(Flow::Quit),
    };
    write_outcome(out, mode, quiet, &outcome)?;
    Ok(Flow::Continue)
}

pub async fn run_shell(ctx: &Context) -> anyhow::Result<()> {
    let mut session = Session::open(ctx, LockMode::Exclusive).await?;
    let looped = read_eval(&mut session, ctx).await;
    session.finish_after(ctx, looped).await
}

async fn read_eval(session: &mut Session, ctx: &Context) -> anyhow::Result<()> {
    let interactive = io::stdin().is_terminal() && !ctx.output.is_json();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        if interactive {
            let mut stderr = io::stderr();
            write!(stderr, "chores> ")?;
            stderr.flush()?;
        }
        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };

        let flow = {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            let mut err = io::stderr();
            let flow = execute_line(
                session.store_mut(),
                &line,
                ctx.output,
                ctx.quiet,
                &mut out,
                &mut err,
            )?;
            out.flush()?;
            flow
        };

        match flow {
            Flow::Continue => {}
            Flow::Flush => session.store().flush().await,
            Flow::Quit => return Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chores_core::{Gateway, MemoryGateway};
    use std::sync::Arc;

    struct Harness {
        store: ItemStore,
        out: Vec<u8>,
        err: Vec<u8>,
    }

    impl Harness {
        fn new() -> Self {
            let gateway: Arc<dyn Gateway> = Arc::new(MemoryGateway::new());
            Self {
                store: ItemStore::new(gateway),
                out: Vec::new(),
                err: Vec::new(),
            }
        }

        fn run(&mut self, line: &str) -> Flow {
            execute_line(
                &mut self.store,
                line,
                OutputMode::Text,
                false,
                &mut self.out,
                &mut self.err,
            )
            .expect("execute line")
        }

        fn texts(&self) -> Vec<&str> {
            self.store.items().iter().map(|i| i.text.as_str()).collect()
        }
    }

    #[tokio::test]
    async fn shell_walks_through_the_basic_scenario() {
        let mut shell = Harness::new();
        assert_eq!(shell.run("add buy milk"), Flow::Continue);
        shell.run("add walk dog");
        assert_eq!(shell.texts(), ["walk dog", "buy milk"]);

        shell.run("sort");
        assert_eq!(shell.texts(), ["buy milk", "walk dog"]);
        shell.run("sort");
        assert_eq!(shell.texts(), ["walk dog", "buy milk"]);

        shell.run("move 2 1");
        assert_eq!(shell.texts(), ["buy milk", "walk dog"]);

        let out = String::from_utf8(shell.out.clone()).expect("utf8");
        assert!(out.contains("sorted\tascending"));
        assert!(out.contains("sorted\tdescending"));
        assert!(out.contains("moved\t"));
    }

    #[tokio::test]
    async fn blank_lines_and_comments_are_ignored() {
        let mut shell = Harness::new();
        assert_eq!(shell.run("   "), Flow::Continue);
        assert_eq!(shell.run("# add nothing"), Flow::Continue);
        assert!(shell.store.is_empty());
        assert!(shell.out.is_empty());
    }

    #[tokio::test]
    async fn bad_input_goes_to_err_and_keeps_going() {
        let mut shell = Harness::new();
        assert_eq!(shell.run("frobnicate"), Flow::Continue);
        assert_eq!(shell.run("rm not-a-key"), Flow::Continue);
        assert!(!shell.err.is_empty());
        assert!(shell.out.is_empty());
    }

    #[tokio::test]
    async fn flush_and_quit_are_signalled() {
        let mut shell = Harness::new();
        assert_eq!(shell.run("flush"), Flow::Flush);
        assert_eq!(shell.run("quit"), Flow::Quit);
        assert_eq!(shell.run("exit"), Flow::Quit);
    }

    #[tokio::test]
    async fn words_are_rejoined_with_single_spaces() {
        let mut shell = Harness::new();
        shell.run("add  \"water   plants\" ");
        assert_eq!(shell.texts(), ["\"water plants\""]);
    }

    #[tokio::test]
    async fn list_writes_rows() {
        let mut shell = Harness::new();
        shell.run("add file taxes");
        shell.out.clear();
        shell.run("list --pending");
        let out = String::from_utf8(shell.out.clone()).expect("utf8");
        assert!(out.contains("\tpending\tfile taxes"));
    }
}
