//! The external computation engine boundary.
//!
//! Everything financial goes through [`ComputationEngine`], the single seam
//! the dispatcher depends on. The real implementation spawns the engine as
//! a subprocess ([`subprocess::SubprocessEngine`]); tests swap in a scripted
//! [`mock::MockEngine`] without touching the dispatcher.

pub mod mock;
pub mod subprocess;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::request::{BondTerms, Category, NpvTerms, OptionTerms, WaccTerms};

/// How an engine invocation can fail. All variants degrade to the sentinel
/// outcome at the dispatch layer; none of them abort a request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("engine binary not found and no fallback runner configured")]
    Unavailable,
    #[error("failed to spawn engine process: {0}")]
    Spawn(String),
    #[error("engine exited with status {code}: {stderr}")]
    Failed { code: i32, stderr: String },
    #[error("engine produced non-numeric output: '{0}'")]
    Malformed(String),
    #[error("engine timed out after {0:?}")]
    TimedOut(Duration),
}

/// One external evaluation: the category tag plus the positional argument
/// vector of the wire protocol, every value stringified in decimal form.
/// Built fresh per invocation, never cached across requests.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineCall {
    pub tag: &'static str,
    pub args: Vec<String>,
}

impl EngineCall {
    /// `["bond", face, coupon, market, years, frequency]`
    pub fn bond(terms: &BondTerms) -> Self {
        Self {
            tag: Category::Bond.tag(),
            args: vec![
                terms.face.to_string(),
                terms.coupon.to_string(),
                terms.market.to_string(),
                terms.years.to_string(),
                terms.frequency.to_string(),
            ],
        }
    }

    /// `["wacc", equity, debt, cost_of_equity, cost_of_debt, tax_rate]`
    pub fn wacc(terms: &WaccTerms) -> Self {
        Self {
            tag: Category::Wacc.tag(),
            args: vec![
                terms.equity.to_string(),
                terms.debt.to_string(),
                terms.cost_of_equity.to_string(),
                terms.cost_of_debt.to_string(),
                terms.tax_rate.to_string(),
            ],
        }
    }

    /// `["option", spot, strike, time, rate, volatility, kind]`
    pub fn option(terms: &OptionTerms) -> Self {
        Self {
            tag: Category::Option.tag(),
            args: vec![
                terms.spot.to_string(),
                terms.strike.to_string(),
                terms.time.to_string(),
                terms.rate.to_string(),
                terms.volatility.to_string(),
                terms.kind.as_str().to_string(),
            ],
        }
    }

    /// `["npv", rate, "flow,flow,..."]` — flows ride in one comma-joined
    /// argument.
    pub fn npv(terms: &NpvTerms) -> Self {
        let flows = terms
            .flows
            .iter()
            .map(|f| f.to_string())
            .collect::<Vec<_>>()
            .join(",");
        Self {
            tag: Category::Npv.tag(),
            args: vec![terms.rate.to_string(), flows],
        }
    }
}

/// The engine capability. Real subprocess engine and test doubles both
/// implement this.
#[async_trait]
pub trait ComputationEngine: Send + Sync {
    async fn evaluate(&self, call: &EngineCall) -> Result<f64, EngineError>;
}
