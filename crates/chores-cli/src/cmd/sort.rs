//! `chores sort`: sort the list alphabetically.

use super::Context;
use super::session::Session;
use crate::output::{Outcome, render_outcome};
use chores_core::{ItemStore, LockMode, SortDirection};
use clap::Args;

#[derive(Args, Debug, Clone, Default)]
pub struct SortArgs {
    /// Sort Z to A instead of A to Z.
    #[arg(long)]
    pub descending: bool,
}

/// Toggle the sort until it lands on the requested direction.
///
/// A fresh session has never sorted, so the first toggle is ascending.
pub fn apply_sort(store: &mut ItemStore, args: &SortArgs) -> Outcome<'static> {
    let want = if args.descending {
        SortDirection::Descending
    } else {
        SortDirection::Ascending
    };
    let mut direction = store.toggle_sort();
    if direction != want {
        direction = store.toggle_sort();
    }
    Outcome::changed("sorted", None).with_detail(direction.as_str())
}

/// Advance the session's sort direction by one toggle.
pub fn apply_toggle_sort(store: &mut ItemStore) -> Outcome<'static> {
    let direction = store.toggle_sort();
    Outcome::changed("sorted", None).with_detail(direction.as_str())
}

pub async fn run_sort(args: &SortArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut session = Session::open(ctx, LockMode::Exclusive).await?;
    let rendered = render_outcome(ctx.output, ctx.quiet, &apply_sort(session.store_mut(), args));
    session.finish_after(ctx, rendered).await
}
