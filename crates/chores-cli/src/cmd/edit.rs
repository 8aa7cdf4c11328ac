//! `chores edit`: replace an item's text.

use super::session::Session;
use super::{Context, join_words};
use crate::output::{Outcome, render_outcome};
use chores_core::{ErrorCode, ItemKey, ItemStore, LockMode};
use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct EditArgs {
    /// Key of the item to edit.
    pub key: ItemKey,

    /// Replacement text. Multiple words are joined with spaces.
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,
}

pub fn apply_edit<'a>(store: &'a mut ItemStore, args: &EditArgs) -> Outcome<'a> {
    let text = join_words(&args.text);
    if text.trim().is_empty() {
        return Outcome::unchanged("edited", ErrorCode::EmptyText, "item text is empty");
    }
    if store.edit_text(args.key, text) {
        Outcome::changed("edited", store.get(args.key))
    } else {
        Outcome::unchanged(
            "edited",
            ErrorCode::ItemNotFound,
            format!("no item with key {}", args.key),
        )
    }
}

pub async fn run_edit(args: &EditArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut session = Session::open(ctx, LockMode::Exclusive).await?;
    let rendered = render_outcome(ctx.output, ctx.quiet, &apply_edit(session.store_mut(), args));
    session.finish_after(ctx, rendered).await
}
