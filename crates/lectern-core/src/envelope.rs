//! Uniform `{success, data | error}` response envelope.
//!
//! The transport layer wraps every service result in an [`Envelope`]
//! and uses [`Envelope::status`] as the response status.

use serde::{Deserialize, Serialize};

use crate::error::{LecternError, LecternResult};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
    #[serde(skip)]
    status: u16,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            status: 200,
        }
    }

    pub fn created(data: T) -> Self {
        Self {
            status: 201,
            ..Self::ok(data)
        }
    }

    pub fn failure(err: &LecternError) -> Self {
        let status = err.status_code();
        // Store and internal failures never leak their details.
        let message = if status >= 500 {
            "Internal Server Error".to_string()
        } else {
            err.to_string()
        };
        Self {
            success: false,
            data: None,
            error: Some(ErrorBody { message }),
            status,
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }
}

impl<T> From<LecternResult<T>> for Envelope<T> {
    fn from(result: LecternResult<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(err) => Self::failure(&err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_omits_error() {
        let env = Envelope::ok(vec![1, 2, 3]);
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], serde_json::json!([1, 2, 3]));
        assert!(json.get("error").is_none());
        assert_eq!(env.status(), 200);
    }

    #[test]
    fn conflict_maps_to_409_with_message() {
        let result: LecternResult<()> = Err(LecternError::Conflict {
            reason: "Already enrolled in this course".into(),
        });
        let env = Envelope::from(result);
        assert_eq!(env.status(), 409);
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(
            json["error"]["message"],
            "Conflict: Already enrolled in this course"
        );
        assert!(json.get("data").is_none());
    }

    #[test]
    fn database_errors_are_masked() {
        let env: Envelope<()> = Envelope::failure(&LecternError::Database("secret".into()));
        assert_eq!(env.status(), 500);
        assert_eq!(env.error.unwrap().message, "Internal Server Error");
    }
}
