//! `chores check` / `chores uncheck`: set the completion flag.

use super::Context;
use super::session::Session;
use crate::output::{Outcome, render_outcome};
use chores_core::{ErrorCode, ItemKey, ItemStore, LockMode};
use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Key of the item.
    pub key: ItemKey,
}

pub fn apply_check<'a>(store: &'a mut ItemStore, args: &CheckArgs, checked: bool) -> Outcome<'a> {
    let action = if checked { "checked" } else { "unchecked" };
    if store.toggle_checked(args.key, checked) {
        Outcome::changed(action, store.get(args.key))
    } else {
        Outcome::unchanged(
            action,
            ErrorCode::ItemNotFound,
            format!("no item with key {}", args.key),
        )
    }
}

pub async fn run_check(args: &CheckArgs, checked: bool, ctx: &Context) -> anyhow::Result<()> {
    let mut session = Session::open(ctx, LockMode::Exclusive).await?;
    let rendered = render_outcome(
        ctx.output,
        ctx.quiet,
        &apply_check(session.store_mut(), args, checked),
    );
    session.finish_after(ctx, rendered).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chores_core::{Gateway, MemoryGateway};
    use std::sync::Arc;

    #[tokio::test]
    async fn check_then_uncheck() {
        let gateway: Arc<dyn Gateway> = Arc::new(MemoryGateway::new());
        let mut store = ItemStore::new(gateway);
        let key = store.add("file taxes").expect("key");
        let args = CheckArgs { key };

        let outcome = apply_check(&mut store, &args, true);
        assert_eq!(outcome.action, "checked");
        assert_eq!(outcome.item.map(|item| item.checked), Some(true));

        let outcome = apply_check(&mut store, &args, false);
        assert_eq!(outcome.action, "unchecked");
        assert_eq!(outcome.item.map(|item| item.checked), Some(false));

        let outcome = apply_check(
            &mut store,
            &CheckArgs {
                key: ItemKey::new(3),
            },
            true,
        );
        assert!(!outcome.changed);
    }
}
