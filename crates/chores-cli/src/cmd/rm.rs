//! `chores rm`: delete an item by key.

use super::Context;
use super::session::Session;
use crate::output::{Outcome, render_outcome};
use chores_core::{ErrorCode, ItemKey, ItemStore, LockMode};
use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct RmArgs {
    /// Key of the item to remove (see `chores list`).
    pub key: ItemKey,
}

pub fn apply_rm(store: &mut ItemStore, args: &RmArgs) -> Outcome<'static> {
    if store.remove(args.key) {
        Outcome::changed("removed", None).with_detail(format!("#{}", args.key))
    } else {
        Outcome::unchanged(
            "removed",
            ErrorCode::ItemNotFound,
            format!("no item with key {}", args.key),
        )
    }
}

pub async fn run_rm(args: &RmArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut session = Session::open(ctx, LockMode::Exclusive).await?;
    let rendered = render_outcome(ctx.output, ctx.quiet, &apply_rm(session.store_mut(), args));
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
        args: RmArgs,
    }

    #[test]
    fn key_must_be_numeric() {
        assert!(Wrapper::try_parse_from(["test", "abc"]).is_err());
        let w = Wrapper::parse_from(["test", "1700000000000"]);
        assert_eq!(w.args.key, ItemKey::new(1_700_000_000_000));
    }

    #[tokio::test]
    async fn unknown_key_is_a_notice() {
        let gateway: Arc<dyn Gateway> = Arc::new(MemoryGateway::new());
        let mut store = ItemStore::new(gateway);
        let key = store.add("keep").expect("key");

        let outcome = apply_rm(
            &mut store,
            &RmArgs {
                key: ItemKey::new(key.get() + 1),
            },
        );
        assert!(!outcome.changed);
        assert_eq!(store.len(), 1);

        let outcome = apply_rm(&mut store, &RmArgs { key });
        assert!(outcome.changed);
        assert!(store.is_empty());
    }
}
