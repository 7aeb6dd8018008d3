//! Redis-backed shared tier
//!
//! Uses a single blocking connection guarded by a mutex. Every command runs
//! under the configured read/write timeout. When the server cannot be
//! reached the tier is marked down and stays down until the re-probe
//! interval has elapsed; calls in between fail fast instead of paying a
//! connect timeout each.

use std::time::{Duration, Instant};

use parking_lot::Mutex;
use redis::{Client, Connection, RedisError};
use tracing::{info, warn};

use crate::cache::shared::SharedTier;
use crate::error::{DirError, Result};

const SCAN_BATCH: usize = 100;

pub struct RedisTier {
    client: Client,
    timeout: Duration,
    reprobe_interval: Duration,
    state: Mutex<ConnState>,
}

#[derive(Default)]
struct ConnState {
    conn: Option<Connection>,
    down_since: Option<Instant>,
}

impl std::fmt::Debug for RedisTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("RedisTier")
            .field("timeout", &self.timeout)
            .field("reprobe_interval", &self.reprobe_interval)
            .field("connected", &state.conn.is_some())
            .finish_non_exhaustive()
    }
}

impl RedisTier {
    /// Parse `url` and attempt the initial connection.
    ///
    /// Only a malformed URL is an error. An unreachable server yields a tier
    /// that starts out down and is re-probed later.
    pub fn connect(url: &str, timeout: Duration, reprobe_interval: Duration) -> Result<Self> {
        let client = Client::open(url)?;
        let tier = Self {
            client,
            timeout,
            reprobe_interval,
            state: Mutex::new(ConnState::default()),
        };

        {
            let mut state = tier.state.lock();
            match tier.open_connection() {
                Ok(conn) => {
                    info!("shared cache connected");
                    state.conn = Some(conn);
                }
                Err(err) => {
                    warn!(error = %err, "shared cache unreachable, using local fallback");
                    state.down_since = Some(Instant::now());
                }
            }
        }
        Ok(tier)
    }

    pub fn is_connected(&self) -> bool {
        self.state.lock().conn.is_some()
    }

    fn open_connection(&self) -> std::result::Result<Connection, RedisError> {
        let mut conn = self.client.get_connection_with_timeout(self.timeout)?;
        conn.set_read_timeout(Some(self.timeout))?;
        conn.set_write_timeout(Some(self.timeout))?;
        redis::cmd("PING").query::<String>(&mut conn)?;
        Ok(conn)
    }

    fn with_connection<T>(
        &self,
        op: impl FnOnce(&mut Connection) -> std::result::Result<T, RedisError>,
    ) -> Result<T> {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        if state.conn.is_none() {
            if let Some(since) = state.down_since {
                if since.elapsed() < self.reprobe_interval {
                    return Err(DirError::SharedCacheUnavailable(
                        "waiting to re-probe".to_string(),
                    ));
                }
            }
            match self.open_connection() {
                Ok(conn) => {
                    info!("shared cache reconnected");
                    state.down_since = None;
                    state.conn = Some(conn);
                }
                Err(err) => {
                    state.down_since = Some(Instant::now());
                    return Err(err.into());
                }
            }
        }

        let Some(conn) = state.conn.as_mut() else {
            return Err(DirError::SharedCacheUnavailable("no connection".to_string()));
        };
        let result = op(conn);
        if let Err(err) = &result {
            if is_connection_failure(err) {
                warn!(error = %err, "shared cache connection lost");
                state.conn = None;
                state.down_since = Some(Instant::now());
            }
        }
        result.map_err(DirError::from)
    }
}

fn is_connection_failure(err: &RedisError) -> bool {
    err.is_io_error() || err.is_timeout() || err.is_connection_dropped() || err.is_connection_refusal()
}

impl SharedTier for RedisTier {
    fn name(&self) -> &'static str {
        "redis"
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        self.with_connection(|conn| redis::cmd("GET").arg(key).query(conn))
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let seconds = ttl.as_secs().max(1);
        self.with_connection(|conn| {
            redis::cmd("SET")
                .arg(key)
                .arg(value)
                .arg("EX")
                .arg(seconds)
                .query(conn)
        })
    }

    fn delete_prefix(&self, prefix: &str) -> Result<usize> {
        let pattern = format!("{prefix}*");
        self.with_connection(|conn| {
            let mut cursor: u64 = 0;
            let mut removed = 0usize;
            loop {
                let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                    .arg(cursor)
                    .arg("MATCH")
                    .arg(&pattern)
                    .arg("COUNT")
                    .arg(SCAN_BATCH)
                    .query(conn)?;
                if !keys.is_empty() {
                    removed += redis::cmd("DEL").arg(&keys).query::<usize>(conn)?;
                }
                if next == 0 {
                    break;
                }
                cursor = next;
            }
            Ok(removed)
        })
    }

    fn ping(&self) -> Result<()> {
        self.with_connection(|conn| redis::cmd("PING").query::<String>(conn).map(|_| ()))
    }
}
