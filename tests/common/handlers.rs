//! Scripted item handlers
//!
//! A [`ScriptedHandler`] succeeds for every item unless a script says
//! otherwise, and counts every call per item.

use async_trait::async_trait;
use batch_review::{ItemFailure, ItemHandler, WorkItem};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

#[derive(Debug, Clone)]
enum Script {
    FailFirst(u32, ItemFailure),
    Always(ItemFailure),
    Panic,
}

#[derive(Debug, Default)]
pub struct ScriptedHandler {
    scripts: HashMap<String, Script>,
    delay: Duration,
    calls: Mutex<HashMap<String, u32>>,
    total_calls: AtomicU32,
}

impl ScriptedHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the first `times` calls for `item_id`, then succeed
    pub fn fail_first(mut self, item_id: &str, times: u32, failure: ItemFailure) -> Self {
        self.scripts
            .insert(item_id.to_string(), Script::FailFirst(times, failure));
        self
    }

    pub fn always_fail(mut self, item_id: &str, failure: ItemFailure) -> Self {
        self.scripts
            .insert(item_id.to_string(), Script::Always(failure));
        self
    }

    pub fn panic_on(mut self, item_id: &str) -> Self {
        self.scripts.insert(item_id.to_string(), Script::Panic);
        self
    }

    /// Simulated service latency per call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self, item_id: &str) -> u32 {
        self.calls.lock().get(item_id).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> u32 {
        self.total_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ItemHandler for ScriptedHandler {
    async fn handle(&self, item: &WorkItem) -> Result<Value, ItemFailure> {
        let call = {
            let mut calls = self.calls.lock();
            let count = calls.entry(item.id.clone()).or_insert(0);
            *count += 1;
            *count
        };
        self.total_calls.fetch_add(1, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match self.scripts.get(&item.id) {
            Some(Script::FailFirst(times, failure)) if call <= *times => Err(failure.clone()),
            Some(Script::Always(failure)) => Err(failure.clone()),
            Some(Script::Panic) => panic!("scripted panic for {}", item.id),
            _ => {
                let score = item.payload["index"].as_f64().unwrap_or(5.0);
                Ok(json!({ "id": item.id, "score": score, "call": call }))
            }
        }
    }
}
