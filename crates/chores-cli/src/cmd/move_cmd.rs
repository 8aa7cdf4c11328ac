//! `chores move`: move an item to another position.

use super::Context;
use super::session::Session;
use crate::output::{Outcome, render_outcome};
use chores_core::{ErrorCode, ItemStore, LockMode};
use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct MoveArgs {
    /// Current 1-based position of the item.
    pub from: usize,

    /// 1-based position the item should end up at.
    pub to: usize,
}

pub fn apply_move<'a>(store: &'a mut ItemStore, args: &MoveArgs) -> Outcome<'a> {
    let len = store.len();
    let in_range = |pos: usize| (1..=len).contains(&pos);
    if !in_range(args.from) || !in_range(args.to) {
        return Outcome::unchanged(
            "moved",
            ErrorCode::InvalidPosition,
            format!(
                "positions must be between 1 and {len} (got {} -> {})",
                args.from, args.to
            ),
        );
    }

    let (from, to) = (args.from - 1, args.to - 1);
    if store.reorder(from, to) {
        Outcome::changed("moved", store.items().get(to))
            .with_detail(format!("{} -> {}", args.from, args.to))
    } else {
        Outcome::unchanged(
            "moved",
            ErrorCode::InvalidPosition,
            format!("item is already at position {}", args.to),
        )
    }
}

pub async fn run_move(args: &MoveArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut session = Session::open(ctx, LockMode::Exclusive).await?;
    let rendered = render_outcome(ctx.output, ctx.quiet, &apply_move(session.store_mut(), args));
    session.finish_after(ctx, rendered).await
}
