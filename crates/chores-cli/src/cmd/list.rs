//! `chores list`: show the list, optionally filtered.

use super::Context;
use super::session::Session;
use crate::output::{ItemRow, OutputMode, pretty_section, render_list_to, render_mode};
use chores_core::{ItemCounts, ItemQuery, ItemStore, LockMode};
use clap::Args;
use serde::Serialize;
use std::io::{self, Write};

#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Only items whose text contains this keyword.
    #[arg(short, long)]
    pub search: Option<String>,

    /// Match the keyword ignoring case.
    #[arg(short, long, requires = "search")]
    pub ignore_case: bool,

    /// Only completed items.
    #[arg(long, conflicts_with = "pending")]
    pub done: bool,

    /// Only items still to do.
    #[arg(long)]
    pub pending: bool,
}

impl ListArgs {
    pub fn query(&self) -> ItemQuery {
        let checked = match (self.done, self.pending) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        let mut query = ItemQuery::default()
            .ignore_case(self.ignore_case)
            .checked(checked);
        if let Some(keyword) = &self.search {
            query = query.keyword(keyword.clone());
        }
        query
    }
}

#[derive(Debug, Serialize)]
struct ListReport<'a> {
    items: Vec<ItemRow<'a>>,
    counts: ItemCounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    sort: Option<&'static str>,
}

/// Write the rows of `store` matching `args`. Positions refer to the full list.
pub fn write_list(
    out: &mut dyn Write,
    store: &ItemStore,
    args: &ListArgs,
    mode: OutputMode,
) -> anyhow::Result<()> {
    let query = args.query();
    let items: Vec<ItemRow<'_>> = store
        .query(&query)
        .into_iter()
        .filter_map(|item| {
            store.position(item.key).map(|index| ItemRow {
                position: index + 1,
                item,
            })
        })
        .collect();

    let report = ListReport {
        items,
        counts: store.counts(),
        sort: store.sort_direction().map(|direction| direction.as_str()),
    };

    render_mode(
        out,
        mode,
        &report,
        |report, w| render_list_to(w, &report.items, OutputMode::Text),
        |report, w| {
            let counts = &report.counts;
            pretty_section(
                w,
                &format!(
                    "Chores: {} pending, {} done",
                    counts.pending, counts.completed
                ),
            )?;
            if report.items.is_empty() {
                writeln!(w, "  (no items)")
            } else {
                render_list_to(w, &report.items, OutputMode::Pretty)
            }
        },
    )
}

pub async fn run_list(args: &ListArgs, ctx: &Context) -> anyhow::Result<()> {
    let session = Session::open(ctx, LockMode::Shared).await?;
    let rendered = {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        write_list(&mut out, session.store(), args, ctx.output)
    };
    session.finish_after(ctx, rendered).await
}
