//! One store session per command: lock, open, load, and close.

use super::Context;
use crate::output::{CliError, render_write_warning, report};
use chores_core::{
    ErrorCode, Gateway, ItemStore, LockMode, SessionLock, SqliteGateway, WriteReport,
};
use std::sync::Arc;
use tracing::debug;

/// A loaded store plus the lock that guards it.
#[derive(Debug)]
pub struct Session {
    store: ItemStore,
    lock: SessionLock,
}

impl Session {
    /// Lock the database, open it, and load the list.
    ///
    /// Read-only commands pass [`LockMode::Shared`].
    pub async fn open(ctx: &Context, mode: LockMode) -> anyhow::Result<Self> {
        let lock_path = SessionLock::path_for(&ctx.db_path);
        let timeout = ctx.lock_timeout;
        let lock = tokio::task::spawn_blocking(move || SessionLock::acquire(&lock_path, mode, timeout))
            .await?
            .map_err(|err| report(ctx.output, CliError::from(&err)))?;

        let gateway = SqliteGateway::open(&ctx.db_path).map_err(|err| {
            report(
                ctx.output,
                CliError::from_code(ErrorCode::StorageUnavailable, format!("{err:#}")),
            )
        })?;
        let gateway: Arc<dyn Gateway> = Arc::new(gateway);

        let store = ItemStore::open(gateway, ctx.storage_key.clone()).await;
        debug!(
            db = %ctx.db_path.display(),
            key = %ctx.storage_key,
            ?mode,
            items = store.len(),
            "opened session"
        );
        Ok(Self { store, lock })
    }

    pub const fn store(&self) -> &ItemStore {
        &self.store
    }

    pub const fn store_mut(&mut self) -> &mut ItemStore {
        &mut self.store
    }

    /// Flush pending writes and release the lock.
    ///
    /// Failed writes are reported on stderr but do not fail the command.
    pub async fn finish(self, ctx: &Context) -> anyhow::Result<WriteReport> {
        let Self { store, lock } = self;
        let report = store.close().await;
        lock.release();
        render_write_warning(ctx.output, &report)?;
        Ok(report)
    }

    /// [`finish`](Self::finish) regardless of how rendering went, then
    /// surface the rendering error first.
    ///
    /// The mutation is already applied, so a failed stdout must not keep it
    /// from reaching storage.
    pub async fn finish_after(
        self,
        ctx: &Context,
        rendered: anyhow::Result<()>,
    ) -> anyhow::Result<()> {
        let finished = self.finish(ctx).await;
        rendered?;
        finished?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{OutputMode, Reported};
    use std::time::Duration;

    fn context(dir: &tempfile::TempDir) -> Context {
        Context {
            output: OutputMode::Json,
            quiet: true,
            db_path: dir.path().join("chores.sqlite3"),
            storage_key: "TODO_LIST".to_string(),
            lock_timeout: Duration::from_millis(50),
        }
    }

    #[tokio::test]
    async fn session_round_trip() {
        let dir = tempfile::tempdir().expect("temp dir");
        let ctx = context(&dir);

        let mut session = Session::open(&ctx, LockMode::Exclusive).await.expect("open");
        session.store_mut().add("water plants");
        let report = session.finish(&ctx).await.expect("finish");
        assert!(report.is_clean());

        let session = Session::open(&ctx, LockMode::Shared).await.expect("reopen");
        assert_eq!(session.store().len(), 1);
        session.finish(&ctx).await.expect("finish");
    }

    #[tokio::test]
    async fn failed_render_still_persists_the_change() {
        let dir = tempfile::tempdir().expect("temp dir");
        let ctx = context(&dir);

        let mut session = Session::open(&ctx, LockMode::Exclusive).await.expect("open");
        session.store_mut().add("keep me");
        let err = session
            .finish_after(&ctx, Err(anyhow::anyhow!("stdout closed")))
            .await
            .expect_err("render error surfaces");
        assert!(err.to_string().contains("stdout closed"));

        let session = Session::open(&ctx, LockMode::Shared).await.expect("reopen");
        assert_eq!(session.store().items()[0].text, "keep me");
        session.finish(&ctx).await.expect("finish");
    }

    #[tokio::test]
    async fn second_writer_times_out_with_lock_code() {
        let dir = tempfile::tempdir().expect("temp dir");
        let ctx = context(&dir);

        let held = Session::open(&ctx, LockMode::Exclusive).await.expect("open");
        let err = Session::open(&ctx, LockMode::Exclusive)
            .await
            .expect_err("lock is held");

        let reported = err.downcast_ref::<Reported>().expect("already rendered");
        assert_eq!(reported.0.error_code.as_deref(), Some("E5002"));
        held.finish(&ctx).await.expect("finish");
    }
}
