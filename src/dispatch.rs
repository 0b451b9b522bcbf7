//! Routing: arithmetic stays in-process, everything else goes to the engine.

use serde::{Deserialize, Serialize};

use crate::engine::{ComputationEngine, EngineCall, EngineError};
use crate::ops;
use crate::request::{CalculationRequest, ValidationError};

/// What a calculation produced, as handed to persistence and response
/// layers. Engine faults never surface as errors here: they degrade to the
/// 0.0 sentinel with `succeeded` false, and the failure text is kept in
/// `detail` so callers can still tell "engine failed" from "answer is zero".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub value: f64,
    pub succeeded: bool,
    pub detail: Option<String>,
}

impl Outcome {
    pub fn of(value: f64) -> Self {
        Self {
            value,
            succeeded: true,
            detail: None,
        }
    }

    pub fn failed(err: &EngineError) -> Self {
        Self {
            value: 0.0,
            succeeded: false,
            detail: Some(err.to_string()),
        }
    }
}

/// The orchestrator. Stateless per call; the engine strategy behind the
/// [`ComputationEngine`] seam is recomputed by the engine itself.
pub struct Dispatcher {
    engine: Box<dyn ComputationEngine>,
}

impl Dispatcher {
    pub fn new(engine: Box<dyn ComputationEngine>) -> Self {
        Self { engine }
    }

    /// Execute one request. Validation failures propagate as errors the
    /// caller must reject; engine failures come back as a sentinel
    /// [`Outcome`] and never abort the request.
    pub async fn dispatch(&self, request: &CalculationRequest) -> Result<Outcome, ValidationError> {
        // Requests are validated at the boundary; re-check before executing.
        request.validate()?;

        match request {
            CalculationRequest::Arithmetic { op, inputs } => {
                Ok(Outcome::of(ops::fold(*op, inputs)?))
            }
            CalculationRequest::Bond(terms) => Ok(self.external(EngineCall::bond(terms)).await),
            CalculationRequest::Wacc(terms) => Ok(self.external(EngineCall::wacc(terms)).await),
            CalculationRequest::Option(terms) => Ok(self.external(EngineCall::option(terms)).await),
            CalculationRequest::Npv(terms) => Ok(self.external(EngineCall::npv(terms)).await),
        }
    }

    async fn external(&self, call: EngineCall) -> Outcome {
        match self.engine.evaluate(&call).await {
            Ok(value) => Outcome::of(value),
            Err(err) => Outcome::failed(&err),
        }
    }
}
