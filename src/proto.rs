//! Wire messages of `calculator.CalculatorService`.
//!
//! Messages are exchanged in proto3 JSON form: zero values are omitted,
//! non-finite doubles travel as strings and enums travel by name.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Fully qualified service name.
pub const SERVICE_NAME: &str = "calculator.CalculatorService";

/// Path of the unary `Calculate` method.
pub const CALCULATE_PATH: &str = "/calculator.CalculatorService/Calculate";

/// Arithmetic operation. The ordinals are part of the wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Operation {
    Add = 0,
    Subtract = 1,
    Multiply = 2,
    Divide = 3,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Add,
        Operation::Subtract,
        Operation::Multiply,
        Operation::Divide,
    ];

    /// Enum value name as it appears in proto JSON.
    pub fn as_str_name(&self) -> &'static str {
        match self {
            Operation::Add => "ADD",
            Operation::Subtract => "SUBTRACT",
            Operation::Multiply => "MULTIPLY",
            Operation::Divide => "DIVIDE",
        }
    }

    pub fn from_str_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str_name() == name)
    }

    /// Infix symbol used on the command line.
    pub fn symbol(&self) -> &'static str {
        match self {
            Operation::Add => "+",
            Operation::Subtract => "-",
            Operation::Multiply => "*",
            Operation::Divide => "/",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.symbol() == symbol)
    }
}

impl TryFrom<i32> for Operation {
    type Error = i32;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Operation::Add),
            1 => Ok(Operation::Subtract),
            2 => Ok(Operation::Multiply),
            3 => Ok(Operation::Divide),
            other => Err(other),
        }
    }
}

impl From<Operation> for i32 {
    fn from(op: Operation) -> Self {
        op as i32
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported operator: {0} (expected one of +, -, *, /)")]
pub struct ParseOperationError(String);

impl FromStr for Operation {
    type Err = ParseOperationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::from_symbol(s).ok_or_else(|| ParseOperationError(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CalculateRequest {
    #[serde(default, with = "double", skip_serializing_if = "double::is_default")]
    pub a: f64,
    #[serde(default, with = "double", skip_serializing_if = "double::is_default")]
    pub b: f64,
    /// Raw enum ordinal; unrecognized values are kept so the service can reject them.
    #[serde(default, with = "op_code", skip_serializing_if = "op_code::is_default")]
    pub op: i32,
}

impl CalculateRequest {
    pub fn new(a: f64, b: f64, op: Operation) -> Self {
        Self {
            a,
            b,
            op: op.into(),
        }
    }

    pub fn operation(&self) -> Option<Operation> {
        Operation::try_from(self.op).ok()
    }
}

/// `result` is meaningful only while `error` is empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CalculateResponse {
    #[serde(default, with = "double", skip_serializing_if = "double::is_default")]
    pub result: f64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
}

/// proto3 JSON mapping of `double`.
mod double {
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn is_default(value: &f64) -> bool {
        *value == 0.0 && value.is_sign_positive()
    }

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_nan() {
            serializer.serialize_str("NaN")
        } else if value.is_infinite() {
            serializer.serialize_str(if *value > 0.0 { "Infinity" } else { "-Infinity" })
        } else {
            serializer.serialize_f64(*value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        deserializer.deserialize_any(DoubleVisitor)
    }

    struct DoubleVisitor;

    impl<'de> Visitor<'de> for DoubleVisitor {
        type Value = f64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a number, \"NaN\", \"Infinity\" or \"-Infinity\"")
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
            match v {
                "NaN" => Ok(f64::NAN),
                "Infinity" => Ok(f64::INFINITY),
                "-Infinity" => Ok(f64::NEG_INFINITY),
                other => other
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|n| n.is_finite())
                    .ok_or_else(|| E::invalid_value(de::Unexpected::Str(other), &self)),
            }
        }

        fn visit_unit<E: de::Error>(self) -> Result<f64, E> {
            Ok(0.0)
        }

        fn visit_none<E: de::Error>(self) -> Result<f64, E> {
            Ok(0.0)
        }
    }
}

/// proto3 JSON mapping of the `Operation` enum field.
mod op_code {
    use super::Operation;
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn is_default(value: &i32) -> bool {
        *value == 0
    }

    pub fn serialize<S: Serializer>(value: &i32, serializer: S) -> Result<S::Ok, S::Error> {
        match Operation::try_from(*value) {
            Ok(op) => serializer.serialize_str(op.as_str_name()),
            Err(code) => serializer.serialize_i32(code),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
        deserializer.deserialize_any(OpCodeVisitor)
    }

    struct OpCodeVisitor;

    impl<'de> Visitor<'de> for OpCodeVisitor {
        type Value = i32;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an Operation name or a 32-bit enum number")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<i32, E> {
            i32::try_from(v).map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<i32, E> {
            i32::try_from(v).map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &self))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<i32, E> {
            Operation::from_str_name(v)
                .map(i32::from)
                .ok_or_else(|| E::invalid_value(de::Unexpected::Str(v), &self))
        }

        fn visit_unit<E: de::Error>(self) -> Result<i32, E> {
            Ok(0)
        }

        fn visit_none<E: de::Error>(self) -> Result<i32, E> {
            Ok(0)
        }
    }
}
