//! In-memory backends.
//!
//! [`MemoryRegistry`] stands in for `public.tenants`; [`MemorySource`]
//! simulates a bounded connection pool that reuses its connections, tracks
//! their transaction-local search path, and counts acquires and releases.
//! Both are used by the test suites of every crate in the workspace.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::errors::{BoxError, TenancyError};
use crate::executor::{ConnectionSource, QueryResult, ScopedSession, Statement};
use crate::resolver::TenantRegistry;
use crate::tenant::{SchemaName, TenantRecord, TenantSlug};

/// Registry backed by a map, with a lookup counter and a failure switch.
#[derive(Default)]
pub struct MemoryRegistry {
    tenants: Mutex<HashMap<String, TenantRecord>>,
    calls: AtomicUsize,
    unavailable: AtomicBool,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, record: TenantRecord) {
        self.tenants.lock().insert(record.slug.clone(), record);
    }

    /// Number of lookups that reached the registry.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make every lookup fail as if the database were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn lookup(&self, slug: &TenantSlug) -> Result<Option<TenantRecord>, TenancyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(TenancyError::resolution_failed("connection refused"));
        }
        Ok(self.tenants.lock().get(slug.as_str()).cloned())
    }
}

#[async_trait]
impl TenantRegistry for MemoryRegistry {
    async fn find_active(&self, slug: &TenantSlug) -> Result<Option<TenantRecord>, TenancyError> {
        Ok(self.lookup(slug)?.filter(|r| r.is_active))
    }

    async fn describe(&self, slug: &TenantSlug) -> Result<Option<TenantRecord>, TenancyError> {
        self.lookup(slug)
    }
}

/// Answers statements for [`MemorySource`].
///
/// Receives the schema the connection currently resolves names against
/// (`None` when no tenant path is set) and the statement.
pub type StatementHandler =
    Arc<dyn Fn(Option<&str>, &Statement) -> Result<QueryResult, BoxError> + Send + Sync>;

#[derive(Debug, Clone, Copy)]
pub struct MemorySourceOptions {
    pub max_connections: usize,
    pub acquire_timeout: Duration,
}

impl Default for MemorySourceOptions {
    fn default() -> Self {
        Self {
            max_connections: 20,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// A simulated physical connection.
#[derive(Debug, Default)]
struct MemoryConnection {
    /// Transaction-local search path; gone at commit or rollback.
    local_path: Option<String>,
}

impl MemoryConnection {
    fn effective_path(&self) -> Option<&str> {
        self.local_path.as_deref()
    }
}

struct SourceInner {
    handler: StatementHandler,
    permits: Arc<Semaphore>,
    idle: Mutex<Vec<MemoryConnection>>,
    acquire_timeout: Duration,
    opened: AtomicUsize,
    acquires: AtomicUsize,
    releases: AtomicUsize,
    statements: Mutex<Vec<(Option<String>, String)>>,
}

/// Bounded pool of simulated connections.
#[derive(Clone)]
pub struct MemorySource {
    inner: Arc<SourceInner>,
}

impl fmt::Debug for MemorySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySource")
            .field("acquires", &self.acquires())
            .field("releases", &self.releases())
            .finish()
    }
}

impl MemorySource {
    pub fn new<F>(options: MemorySourceOptions, handler: F) -> Self
    where
        F: Fn(Option<&str>, &Statement) -> Result<QueryResult, BoxError> + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(SourceInner {
                handler: Arc::new(handler),
                permits: Arc::new(Semaphore::new(options.max_connections)),
                idle: Mutex::new(Vec::new()),
                acquire_timeout: options.acquire_timeout,
                opened: AtomicUsize::new(0),
                acquires: AtomicUsize::new(0),
                releases: AtomicUsize::new(0),
                statements: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn acquires(&self) -> usize {
        self.inner.acquires.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.inner.releases.load(Ordering::SeqCst)
    }

    /// Physical connections created so far.
    pub fn connections_opened(&self) -> usize {
        self.inner.opened.load(Ordering::SeqCst)
    }

    /// Effective search path of every idle connection.
    pub fn idle_search_paths(&self) -> Vec<Option<String>> {
        self.inner
            .idle
            .lock()
            .iter()
            .map(|c| c.effective_path().map(str::to_string))
            .collect()
    }

    /// `(schema, statement name)` of every statement run so far.
    pub fn statements(&self) -> Vec<(Option<String>, String)> {
        self.inner.statements.lock().clone()
    }
}

#[async_trait]
impl ConnectionSource for MemorySource {
    type Session = MemorySession;

    async fn acquire(&self) -> Result<MemorySession, TenancyError> {
        let permit = tokio::time::timeout(
            self.inner.acquire_timeout,
            Arc::clone(&self.inner.permits).acquire_owned(),
        )
        .await
        .map_err(|_| TenancyError::pool_exhausted("timed out waiting for a connection"))?
        .map_err(|_| TenancyError::pool_exhausted("pool closed"))?;

        let conn = self.inner.idle.lock().pop().unwrap_or_else(|| {
            self.inner.opened.fetch_add(1, Ordering::SeqCst);
            MemoryConnection::default()
        });
        self.inner.acquires.fetch_add(1, Ordering::SeqCst);

        Ok(MemorySession {
            conn: Some(conn),
            source: Arc::clone(&self.inner),
            _permit: permit,
        })
    }
}

/// A checked-out simulated connection; returns itself to the pool on drop.
pub struct MemorySession {
    conn: Option<MemoryConnection>,
    source: Arc<SourceInner>,
    _permit: OwnedSemaphorePermit,
}

impl MemorySession {
    fn conn(&mut self) -> Result<&mut MemoryConnection, BoxError> {
        self.conn.as_mut().ok_or_else(|| "connection already released".into())
    }
}

#[async_trait]
impl ScopedSession for MemorySession {
    async fn set_search_path(&mut self, schema: &SchemaName) -> Result<(), BoxError> {
        self.conn()?.local_path = Some(schema.as_str().to_string());
        Ok(())
    }

    async fn run(&mut self, statement: &Statement) -> Result<QueryResult, BoxError> {
        let handler = Arc::clone(&self.source.handler);
        let path = self.conn()?.effective_path().map(str::to_string);
        self.source
            .statements
            .lock()
            .push((path.clone(), statement.name().to_string()));
        handler(path.as_deref(), statement)
    }

    async fn commit(mut self) -> Result<(), BoxError> {
        self.conn()?.local_path = None;
        Ok(())
    }
}

impl Drop for MemorySession {
    fn drop(&mut self) {
        if let Some(mut conn) = self.conn.take() {
            // rollback discards transaction-local settings
            conn.local_path = None;
            self.source.idle.lock().push(conn);
            self.source.releases.fetch_add(1, Ordering::SeqCst);
        }
    }
}
