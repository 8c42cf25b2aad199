//! Four-operation calculator served over the Connect unary RPC protocol,
//! with a typed client and a command-line front end.

pub mod browser;
pub mod calculator;
pub mod cli;
pub mod client;
pub mod logger;
pub mod proto;
pub mod rpc;
pub mod server;

#[cfg(test)]
mod calculator_tests;

pub use calculator::{Calculator, CalculatorService, Outcome, DIVISION_BY_ZERO};
pub use client::{CalculatorClient, ClientError};
pub use proto::{CalculateRequest, CalculateResponse, Operation};
pub use rpc::{Code, RpcError};
pub use server::{ServerConfig, ServerError};
