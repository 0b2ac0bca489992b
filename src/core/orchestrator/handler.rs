//! The per-item operation supplied by the surrounding application

use crate::core::item::WorkItem;
use crate::utils::error::ItemFailure;
use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

/// Processes one work item
///
/// Everything specific to the analysis service (request construction, the
/// remote call, response parsing) happens behind this trait. The orchestrator
/// only sees the latency and a result payload or a tagged [`ItemFailure`].
#[async_trait]
pub trait ItemHandler: Send + Sync {
    async fn handle(&self, item: &WorkItem) -> std::result::Result<Value, ItemFailure>;
}

#[async_trait]
impl<T: ItemHandler + ?Sized> ItemHandler for Arc<T> {
    async fn handle(&self, item: &WorkItem) -> std::result::Result<Value, ItemFailure> {
        (**self).handle(item).await
    }
}

/// Adapter returned by [`handler_fn`]
pub struct FnHandler<F, Fut> {
    f: F,
    _future: PhantomData<fn() -> Fut>,
}

/// Build an [`ItemHandler`] from an async closure taking an owned item
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F, Fut>
where
    F: Fn(WorkItem) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = std::result::Result<Value, ItemFailure>> + Send + 'static,
{
    FnHandler {
        f,
        _future: PhantomData,
    }
}

#[async_trait]
impl<F, Fut> ItemHandler for FnHandler<F, Fut>
where
    F: Fn(WorkItem) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = std::result::Result<Value, ItemFailure>> + Send + 'static,
{
    async fn handle(&self, item: &WorkItem) -> std::result::Result<Value, ItemFailure> {
        (self.f)(item.clone()).await
    }
}
