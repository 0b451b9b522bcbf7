//! Typed calculation requests and the validation that gates execution.
//!
//! Raw payloads (an operation/category string plus JSON inputs) are parsed
//! exactly once at this boundary via [`CalculationRequest::from_payload`].
//! Downstream layers only ever see the typed request; the dispatcher
//! re-runs [`CalculationRequest::validate`] as a defensive double-check.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::consts::DEFAULT_BOND_FREQUENCY;

/// Why a request was rejected before execution. First failing rule wins:
/// membership, then shape, then arity, then division semantics.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("unknown operation: '{0}'")]
    UnknownOperation(String),
    #[error("at least two numbers are required for calculation")]
    InsufficientOperands,
    #[error("cannot divide by zero")]
    DivisionByZero,
    #[error("inputs must be a list of numbers")]
    InvalidInputs,
    #[error("missing or non-numeric field: '{0}'")]
    MissingField(&'static str),
    #[error("option kind must be 'call' or 'put', got '{0}'")]
    UnknownOptionKind(String),
}

/// The kind of calculation requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Arithmetic,
    Bond,
    Wacc,
    Option,
    Npv,
}

impl Category {
    /// Wire/storage tag for this category.
    pub fn tag(&self) -> &'static str {
        match self {
            Category::Arithmetic => "arithmetic",
            Category::Bond => "bond",
            Category::Wacc => "wacc",
            Category::Option => "option",
            Category::Npv => "npv",
        }
    }
}

/// Arithmetic operations evaluated in-process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArithmeticOp {
    Addition,
    Subtraction,
    Multiplication,
    Division,
}

impl ArithmeticOp {
    /// Case-insensitive parse. Returns `None` for anything that is not one
    /// of the four recognized operation names.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "addition" => Some(ArithmeticOp::Addition),
            "subtraction" => Some(ArithmeticOp::Subtraction),
            "multiplication" => Some(ArithmeticOp::Multiplication),
            "division" => Some(ArithmeticOp::Division),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ArithmeticOp::Addition => "addition",
            ArithmeticOp::Subtraction => "subtraction",
            ArithmeticOp::Multiplication => "multiplication",
            ArithmeticOp::Division => "division",
        }
    }
}

/// Whether an option request prices a call or a put. Parsed here, passed
/// through to the engine as a plain string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionKind {
    Call,
    Put,
}

impl OptionKind {
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.to_ascii_lowercase().as_str() {
            "call" => Ok(OptionKind::Call),
            "put" => Ok(OptionKind::Put),
            _ => Err(ValidationError::UnknownOptionKind(s.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OptionKind::Call => "call",
            OptionKind::Put => "put",
        }
    }
}

/// Named inputs for a bond pricing request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BondTerms {
    pub face: f64,
    pub coupon: f64,
    pub market: f64,
    pub years: f64,
    pub frequency: f64,
}

/// Named inputs for a weighted average cost of capital request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaccTerms {
    pub equity: f64,
    pub debt: f64,
    pub cost_of_equity: f64,
    pub cost_of_debt: f64,
    pub tax_rate: f64,
}

/// Named inputs for an option pricing request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionTerms {
    pub spot: f64,
    pub strike: f64,
    pub time: f64,
    pub rate: f64,
    pub volatility: f64,
    pub kind: OptionKind,
}

/// Named inputs for a net present value request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpvTerms {
    pub rate: f64,
    pub flows: Vec<f64>,
}

/// A validated calculation request. Constructed per call, consumed by the
/// dispatcher, then discarded (the record store serializes a copy).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CalculationRequest {
    Arithmetic { op: ArithmeticOp, inputs: Vec<f64> },
    Bond(BondTerms),
    Wacc(WaccTerms),
    Option(OptionTerms),
    Npv(NpvTerms),
}

impl CalculationRequest {
    pub fn category(&self) -> Category {
        match self {
            CalculationRequest::Arithmetic { .. } => Category::Arithmetic,
            CalculationRequest::Bond(_) => Category::Bond,
            CalculationRequest::Wacc(_) => Category::Wacc,
            CalculationRequest::Option(_) => Category::Option,
            CalculationRequest::Npv(_) => Category::Npv,
        }
    }

    /// Parse and validate a raw payload: an operation/category string
    /// (case-insensitive) plus its JSON inputs. Arithmetic expects an array
    /// of numbers; financial categories expect an object of named numeric
    /// fields. Never returns a partially validated request.
    pub fn from_payload(kind: &str, inputs: &Value) -> Result<Self, ValidationError> {
        if let Some(op) = ArithmeticOp::parse(kind) {
            let request = CalculationRequest::Arithmetic {
                op,
                inputs: number_list(inputs)?,
            };
            request.validate()?;
            return Ok(request);
        }

        let request = match kind.to_ascii_lowercase().as_str() {
            "bond" => CalculationRequest::Bond(BondTerms {
                face: number_field(inputs, "face")?,
                coupon: number_field(inputs, "coupon")?,
                market: number_field(inputs, "market")?,
                years: number_field(inputs, "years")?,
                frequency: optional_number_field(inputs, "frequency")?
                    .unwrap_or(DEFAULT_BOND_FREQUENCY),
            }),
            "wacc" => CalculationRequest::Wacc(WaccTerms {
                equity: number_field(inputs, "equity")?,
                debt: number_field(inputs, "debt")?,
                cost_of_equity: number_field(inputs, "cost_of_equity")?,
                cost_of_debt: number_field(inputs, "cost_of_debt")?,
                tax_rate: number_field(inputs, "tax_rate")?,
            }),
            "option" => CalculationRequest::Option(OptionTerms {
                spot: number_field(inputs, "spot")?,
                strike: number_field(inputs, "strike")?,
                time: number_field(inputs, "time")?,
                rate: number_field(inputs, "rate")?,
                volatility: number_field(inputs, "volatility")?,
                kind: OptionKind::parse(
                    inputs
                        .get("kind")
                        .and_then(Value::as_str)
                        .ok_or(ValidationError::MissingField("kind"))?,
                )?,
            }),
            "npv" => CalculationRequest::Npv(NpvTerms {
                rate: number_field(inputs, "rate")?,
                flows: inputs
                    .get("flows")
                    .map(number_list)
                    .ok_or(ValidationError::MissingField("flows"))??,
            }),
            _ => return Err(ValidationError::UnknownOperation(kind.to_string())),
        };

        request.validate()?;
        Ok(request)
    }

    /// Semantic rules on an already-typed request. Arithmetic needs at least
    /// two operands; division forbids a zero anywhere past the numerator;
    /// NPV needs a non-empty flow sequence.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            CalculationRequest::Arithmetic { op, inputs } => {
                if inputs.len() < 2 {
                    return Err(ValidationError::InsufficientOperands);
                }
                if *op == ArithmeticOp::Division && inputs[1..].iter().any(|x| *x == 0.0) {
                    return Err(ValidationError::DivisionByZero);
                }
                Ok(())
            }
            CalculationRequest::Npv(terms) => {
                if terms.flows.is_empty() {
                    return Err(ValidationError::InvalidInputs);
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

fn number_list(value: &Value) -> Result<Vec<f64>, ValidationError> {
    let items = value.as_array().ok_or(ValidationError::InvalidInputs)?;
    items
        .iter()
        .map(|v| v.as_f64().ok_or(ValidationError::InvalidInputs))
        .collect()
}

fn number_field(inputs: &Value, name: &'static str) -> Result<f64, ValidationError> {
    inputs
        .get(name)
        .and_then(Value::as_f64)
        .ok_or(ValidationError::MissingField(name))
}

/// `Ok(None)` when the field is absent or null, error when present but
/// non-numeric.
fn optional_number_field(
    inputs: &Value,
    name: &'static str,
) -> Result<Option<f64>, ValidationError> {
    match inputs.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_f64()
            .map(Some)
            .ok_or(ValidationError::MissingField(name)),
    }
}
