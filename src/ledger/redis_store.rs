/// Redis-backed ledger store.
///
/// One Redis set per user id, members are raw session-token strings.
/// `ConnectionManager` reconnects on its own; a command that still fails is
/// propagated as a store error, never masked as an empty result.

use redis::{aio::ConnectionManager, AsyncCommands};

use crate::error::AppError;
use crate::ledger::LedgerStore;

#[derive(Clone)]
pub struct RedisLedgerStore {
    connection: ConnectionManager,
}

impl RedisLedgerStore {
    /// Connects to Redis at `url` (e.g. `redis://localhost:6379`).
    pub async fn connect(url: &str) -> Result<Self, AppError> {
        let client = redis::Client::open(url)
            .map_err(AppError::from)?;
        let connection = client
            .get_connection_manager()
            .await
            .map_err(AppError::from)?;

        tracing::info!("Connected to revocation ledger store");
        Ok(Self { connection })
    }
}

#[async_trait::async_trait]
impl LedgerStore for RedisLedgerStore {
    async fn add_member(&self, key: &str, member: &str) -> Result<(), AppError> {
        let mut conn = self.connection.clone();
        conn.sadd::<_, _, ()>(key, member).await?;
        Ok(())
    }

    async fn remove_member(&self, key: &str, member: &str) -> Result<(), AppError> {
        let mut conn = self.connection.clone();
        // SREM on an absent member returns 0; that is the idempotent no-op.
        conn.srem::<_, _, ()>(key, member).await?;
        Ok(())
    }

    async fn contains_member(&self, key: &str, member: &str) -> Result<bool, AppError> {
        let mut conn = self.connection.clone();
        let found: bool = conn.sismember(key, member).await?;
        Ok(found)
    }

    async fn delete_key(&self, key: &str) -> Result<(), AppError> {
        let mut conn = self.connection.clone();
        conn.del::<_, ()>(key).await?;
        Ok(())
    }

    async fn flush_all(&self) -> Result<(), AppError> {
        let mut conn = self.connection.clone();
        redis::cmd("FLUSHDB").query_async::<()>(&mut conn).await?;
        Ok(())
    }
}
