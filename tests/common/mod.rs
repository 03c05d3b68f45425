#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Barrier;

use tarotbot::completion::mock::MockCompleter;
use tarotbot::context::BotContext;
use tarotbot::executor::TaskExecutor;
use tarotbot::store::sqlite::SqliteStore;
use tarotbot::store::{Document, DocumentStore, DocumentStream, Filter, StoreError};

/// Wraps a store and counts the calls that change it.
pub struct CountingStore {
    inner: SqliteStore,
    writes: AtomicUsize,
}

impl CountingStore {
    pub fn new() -> Self {
        Self {
            inner: SqliteStore::in_memory().unwrap(),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for CountingStore {
    async fn read(&self, id: &str, partition_key: &str) -> Result<Document, StoreError> {
        self.inner.read(id, partition_key).await
    }

    async fn create(&self, doc: &Document) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.create(doc).await
    }

    async fn replace(&self, doc: &Document) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.replace(doc).await
    }

    async fn upsert(&self, doc: &Document) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.upsert(doc).await
    }

    async fn scan(
        &self,
        filter: &Filter,
        cross_partition: bool,
    ) -> Result<DocumentStream, StoreError> {
        self.inner.scan(filter, cross_partition).await
    }
}

/// Holds the first `parties` reads until all of them have arrived, so
/// concurrent read-modify-write sequences all see the same state. Later reads
/// pass straight through.
pub struct GatedStore {
    inner: SqliteStore,
    gate: Barrier,
    parties: usize,
    reads: AtomicUsize,
}

impl GatedStore {
    pub fn new(parties: usize) -> Self {
        Self {
            inner: SqliteStore::in_memory().unwrap(),
            gate: Barrier::new(parties),
            parties,
            reads: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl DocumentStore for GatedStore {
    async fn read(&self, id: &str, partition_key: &str) -> Result<Document, StoreError> {
        let result = self.inner.read(id, partition_key).await;
        if self.reads.fetch_add(1, Ordering::SeqCst) < self.parties {
            self.gate.wait().await;
        }
        result
    }

    async fn create(&self, doc: &Document) -> Result<(), StoreError> {
        self.inner.create(doc).await
    }

    async fn replace(&self, doc: &Document) -> Result<(), StoreError> {
        self.inner.replace(doc).await
    }

    async fn upsert(&self, doc: &Document) -> Result<(), StoreError> {
        self.inner.upsert(doc).await
    }

    async fn scan(
        &self,
        filter: &Filter,
        cross_partition: bool,
    ) -> Result<DocumentStream, StoreError> {
        self.inner.scan(filter, cross_partition).await
    }
}

pub fn ctx_with(store: Arc<dyn DocumentStore>, completer: MockCompleter) -> BotContext {
    BotContext::new(store, Arc::new(completer), TaskExecutor::new(5))
}

pub fn ctx(completer: MockCompleter) -> BotContext {
    ctx_with(Arc::new(SqliteStore::in_memory().unwrap()), completer)
}

pub fn short_deadline(ctx: BotContext) -> BotContext {
    ctx.with_completion_timeout(Duration::from_millis(200))
}
