use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{ComputationEngine, EngineCall, EngineError};

/// A scripted engine for tests. Returns pre-defined results in order and
/// records every call so tests can assert on the argument vectors even
/// after the engine is boxed into a dispatcher.
pub struct MockEngine {
    results: Vec<Result<f64, EngineError>>,
    index: AtomicUsize,
    calls: Arc<Mutex<Vec<EngineCall>>>,
}

impl MockEngine {
    pub fn new(results: Vec<Result<f64, EngineError>>) -> Self {
        Self {
            results,
            index: AtomicUsize::new(0),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Handle to the call log. Clone it before handing the engine away.
    pub fn call_log(&self) -> Arc<Mutex<Vec<EngineCall>>> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl ComputationEngine for MockEngine {
    async fn evaluate(&self, call: &EngineCall) -> Result<f64, EngineError> {
        self.calls.lock().unwrap().push(call.clone());
        let i = self.index.fetch_add(1, Ordering::SeqCst);
        self.results.get(i).cloned().unwrap_or_else(|| {
            Err(EngineError::Spawn(format!(
                "MockEngine: no more scripted results (called {} times)",
                i + 1
            )))
        })
    }
}
