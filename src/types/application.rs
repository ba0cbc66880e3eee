//! Loan application data structures

use crate::error::RequestError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Required request fields, in the order they are read from the body.
pub const REQUIRED_FIELDS: [&str; 9] = [
    "amount",
    "term",
    "all_active_acc",
    "acc_opened_12m",
    "acc_age",
    "balance",
    "no_of_defaults",
    "loan_purpose",
    "employment_type",
];

/// Loan application submitted from the apply form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanApplication {
    /// Requested loan amount
    pub amount: f64,

    /// Loan term in months
    pub term: f64,

    /// Number of currently active credit accounts
    pub all_active_acc: f64,

    /// Accounts opened in the last 12 months
    pub acc_opened_12m: f64,

    /// Age of the oldest account in months
    pub acc_age: f64,

    /// Current outstanding balance
    pub balance: f64,

    /// Number of past defaults
    pub no_of_defaults: f64,

    /// Loan purpose (debt, home, other, personal, vehicle)
    pub loan_purpose: String,

    /// Employment type (full, part, self, retired)
    pub employment_type: String,
}

impl LoanApplication {
    /// Create an application with zeroed numeric fields
    pub fn new(loan_purpose: &str, employment_type: &str) -> Self {
        Self {
            amount: 0.0,
            term: 0.0,
            all_active_acc: 0.0,
            acc_opened_12m: 0.0,
            acc_age: 0.0,
            balance: 0.0,
            no_of_defaults: 0.0,
            loan_purpose: loan_purpose.to_string(),
            employment_type: employment_type.to_string(),
        }
    }

    /// Parse an application from a raw request body.
    pub fn from_slice(body: &[u8]) -> Result<Self, RequestError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| RequestError::MalformedBody(e.to_string()))?;
        Self::from_value(&value)
    }

    /// Read the application out of a JSON object.
    ///
    /// Fields are looked up in [`REQUIRED_FIELDS`] order so the first absent
    /// field is the one reported. Unknown fields are ignored. Categorical
    /// values are kept verbatim; non-string values keep their JSON text and
    /// will simply never match a category during encoding.
    pub fn from_value(value: &Value) -> Result<Self, RequestError> {
        let object = value
            .as_object()
            .ok_or_else(|| RequestError::MalformedBody("expected a JSON object".to_string()))?;

        Ok(Self {
            amount: numeric(object, "amount")?,
            term: numeric(object, "term")?,
            all_active_acc: numeric(object, "all_active_acc")?,
            acc_opened_12m: numeric(object, "acc_opened_12m")?,
            acc_age: numeric(object, "acc_age")?,
            balance: numeric(object, "balance")?,
            no_of_defaults: numeric(object, "no_of_defaults")?,
            loan_purpose: categorical(object, "loan_purpose")?,
            employment_type: categorical(object, "employment_type")?,
        })
    }
}

fn field<'a>(object: &'a Map<String, Value>, name: &'static str) -> Result<&'a Value, RequestError> {
    object.get(name).ok_or(RequestError::MissingField(name))
}

/// Booleans count as 0/1, the way the training pipeline coerced them.
fn numeric(object: &Map<String, Value>, name: &'static str) -> Result<f64, RequestError> {
    match field(object, name)? {
        Value::Bool(flag) => Ok(if *flag { 1.0 } else { 0.0 }),
        value => value.as_f64().ok_or(RequestError::InvalidField {
            field: name,
            expected: "a number",
        }),
    }
}

fn categorical(object: &Map<String, Value>, name: &'static str) -> Result<String, RequestError> {
    Ok(match field(object, name)? {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}
