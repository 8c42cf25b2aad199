use crate::client::{ClientError, DEFAULT_BASE_URL};
use crate::proto::{CalculateRequest, CalculateResponse, Operation};
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "calc-client",
    version,
    about = "Evaluate <number> <operator> <number> on the calculator service",
    after_help = "Supported operators: +, -, *, /",
    allow_negative_numbers = true
)]
pub struct ClientArgs {
    /// Base URL of the calculator service
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub url: String,

    /// Left operand
    pub a: f64,

    /// One of +, -, *, /
    pub op: Operation,

    /// Right operand
    pub b: f64,
}

impl ClientArgs {
    pub fn request(&self) -> CalculateRequest {
        CalculateRequest::new(self.a, self.b, self.op)
    }

    pub fn expression_line(&self) -> String {
        format!("Calculating: {:.6} {} {:.6}", self.a, self.op, self.b)
    }
}

/// What the client prints for a finished call, and whether it counts as success.
pub fn render_response(response: &CalculateResponse) -> (String, bool) {
    if response.error.is_empty() {
        (format!("Result: {:.6}", response.result), true)
    } else {
        (format!("Error: {}", response.error), false)
    }
}

pub fn render_failure(error: &ClientError) -> String {
    match error {
        ClientError::Rpc(rpc) => format!("Call failed [{}]: {}", rpc.code, rpc.message),
        other => format!("Call failed: {}", other),
    }
}
