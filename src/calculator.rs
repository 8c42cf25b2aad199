use crate::proto::{CalculateRequest, CalculateResponse, Operation};
use crate::rpc::RpcError;
use tracing::debug;

/// In-band message returned when dividing by zero.
pub const DIVISION_BY_ZERO: &str = "division by zero";

/// Result of one calculation, before it is flattened onto the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Value(f64),
    DomainError(String),
}

impl From<Outcome> for CalculateResponse {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Value(result) => CalculateResponse {
                result,
                error: String::new(),
            },
            Outcome::DomainError(error) => CalculateResponse { result: 0.0, error },
        }
    }
}

impl From<CalculateResponse> for Outcome {
    // A non-empty error wins over whatever `result` holds.
    fn from(response: CalculateResponse) -> Self {
        if response.error.is_empty() {
            Outcome::Value(response.result)
        } else {
            Outcome::DomainError(response.error)
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Calculator;

impl Calculator {
    pub fn new() -> Self {
        Self
    }

    /// IEEE-754 arithmetic; NaN and infinities pass through untouched.
    pub fn evaluate(&self, a: f64, b: f64, op: Operation) -> Outcome {
        match op {
            Operation::Add => Outcome::Value(a + b),
            Operation::Subtract => Outcome::Value(a - b),
            Operation::Multiply => Outcome::Value(a * b),
            Operation::Divide if b == 0.0 => Outcome::DomainError(DIVISION_BY_ZERO.to_string()),
            Operation::Divide => Outcome::Value(a / b),
        }
    }
}

/// Implementation of `calculator.CalculatorService`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalculatorService {
    calculator: Calculator,
}

impl CalculatorService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unknown operation codes fail with `invalid_argument`; division by zero
    /// is a successful call carrying an error message.
    pub fn calculate(&self, request: &CalculateRequest) -> Result<CalculateResponse, RpcError> {
        let op = request.operation().ok_or_else(|| {
            RpcError::invalid_argument(format!("unknown operation: {}", request.op))
        })?;

        let outcome = self.calculator.evaluate(request.a, request.b, op);
        debug!(a = request.a, b = request.b, op = %op, ?outcome, "calculated");

        Ok(outcome.into())
    }
}
