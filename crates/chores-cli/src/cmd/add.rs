//! `chores add`: put a new item at the top of the list.

use super::{Context, join_words};
use super::session::Session;
use crate::output::{Outcome, render_outcome};
use chores_core::{ErrorCode, ItemStore, LockMode};
use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    /// Item text. Multiple words are joined with spaces.
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,
}

/// Add the item to `store` and describe what happened.
pub fn apply_add<'a>(store: &'a mut ItemStore, args: &AddArgs) -> Outcome<'a> {
    match store.add(join_words(&args.text)) {
        Some(key) => Outcome::changed("added", store.get(key)),
        None => Outcome::unchanged("added", ErrorCode::EmptyText, "item text is empty"),
    }
}

pub async fn run_add(args: &AddArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut session = Session::open(ctx, LockMode::Exclusive).await?;
    let rendered = render_outcome(ctx.output, ctx.quiet, &apply_add(session.store_mut(), args));
    session.finish_after(ctx, rendered).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chores_core::{Gateway, MemoryGateway};
    use clap::Parser;
    use std::sync::Arc;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: AddArgs,
    }

    #[test]
    fn words_are_collected() {
        let w = Wrapper::parse_from(["test", "buy", "oat", "milk"]);
        assert_eq!(w.args.text, ["buy", "oat", "milk"]);
    }

    #[test]
    fn text_is_required() {
        assert!(Wrapper::try_parse_from(["test"]).is_err());
    }

    #[tokio::test]
    async fn blank_text_is_reported_not_added() {
        let gateway: Arc<dyn Gateway> = Arc::new(MemoryGateway::new());
        let mut store = ItemStore::new(gateway);
        let args = AddArgs {
            text: vec!["  ".to_string()],
        };

        let outcome = apply_add(&mut store, &args);
        assert!(!outcome.changed);
        assert_eq!(
            outcome.notice.and_then(|n| n.error_code).as_deref(),
            Some("E2003")
        );
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn joined_text_is_added() {
        let gateway: Arc<dyn Gateway> = Arc::new(MemoryGateway::new());
        let mut store = ItemStore::new(gateway);
        let args = AddArgs {
            text: vec!["walk".to_string(), "dog".to_string()],
        };

        let outcome = apply_add(&mut store, &args);
        assert!(outcome.changed);
        assert_eq!(outcome.item.map(|item| item.text.as_str()), Some("walk dog"));
    }
}
