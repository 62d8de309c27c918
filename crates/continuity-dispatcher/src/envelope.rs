use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// The `{code, msg, data}` envelope every HTTP response is wrapped in.
/// `code` is `0` on success; error responses go through [`crate::error::DispatcherError`]
/// instead, which renders its own envelope with `code: -1`.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub code: i32,
    pub msg: String,
    pub data: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            code: 0,
            msg: "ok".to_string(),
            data,
        }
    }

    /// For aggregate endpoints (e.g. cascading delete) whose success is a
    /// function of several independent sub-operations: `code: 0` only if
    /// every one of them succeeded, `-1` otherwise, with `data` still
    /// carrying the full per-operation detail.
    pub fn aggregate(all_succeeded: bool, data: T) -> Self {
        Self {
            code: if all_succeeded { 0 } else { -1 },
            msg: if all_succeeded {
                "ok".to_string()
            } else {
                "one or more sub-operations failed".to_string()
            },
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_is_zero_only_when_everything_succeeded() {
        assert_eq!(Envelope::aggregate(true, ()).code, 0);
        assert_eq!(Envelope::aggregate(false, ()).code, -1);
    }
}
