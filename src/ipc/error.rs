use crate::error::CalcError;
use crate::import::ImportError;
use serde::de::DeserializeOwned;
use serde_json::json;

pub struct HandlerErr {
    pub code: &'static str,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl HandlerErr {
    pub fn bad_params(message: impl Into<String>) -> Self {
        Self {
            code: "bad_params",
            message: message.into(),
            details: None,
        }
    }

    pub fn unknown_method(method: &str) -> Self {
        Self {
            code: "not_implemented",
            message: format!("unknown method: {}", method),
            details: None,
        }
    }

    /// A request line that is not a JSON request envelope.
    pub fn bad_json(e: &serde_json::Error) -> Self {
        Self {
            code: "bad_json",
            message: e.to_string(),
            details: None,
        }
    }

    fn into_json(self) -> serde_json::Value {
        let mut error = json!({ "code": self.code, "message": self.message });
        if let Some(d) = self.details {
            error["details"] = d;
        }
        error
    }
}

impl From<CalcError> for HandlerErr {
    fn from(e: CalcError) -> Self {
        Self {
            code: e.code(),
            message: e.to_string(),
            details: None,
        }
    }
}

impl From<ImportError> for HandlerErr {
    fn from(e: ImportError) -> Self {
        let details = match &e {
            ImportError::TooManyRows { rows, max } => Some(json!({ "rows": rows, "max": max })),
            _ => None,
        };
        Self {
            code: e.code(),
            message: e.to_string(),
            details,
        }
    }
}

/// Typed view of `params`; any shape mismatch is a `bad_params` error.
pub fn parse_params<T: DeserializeOwned>(params: &serde_json::Value) -> Result<T, HandlerErr> {
    let raw = if params.is_null() {
        json!({})
    } else {
        params.clone()
    };
    serde_json::from_value(raw).map_err(|e| HandlerErr::bad_params(e.to_string()))
}

pub fn to_result<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, HandlerErr> {
    serde_json::to_value(value).map_err(|e| HandlerErr {
        code: "serialize_failed",
        message: e.to_string(),
        details: None,
    })
}

/// Builds the response line for request `id`: `{id, ok: true, result}` or
/// `{id, ok: false, error: {code, message, details?}}`. Failures are logged.
pub fn respond(id: &str, outcome: Result<serde_json::Value, HandlerErr>) -> serde_json::Value {
    match outcome {
        Ok(result) => json!({ "id": id, "ok": true, "result": result }),
        Err(e) => {
            tracing::warn!(request_id = id, code = e.code, "{}", e.message);
            json!({ "id": id, "ok": false, "error": e.into_json() })
        }
    }
}
