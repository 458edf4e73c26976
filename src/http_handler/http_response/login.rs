use crate::http_handler::http_response::response_common::{HTTPResponseType, ResponseError};

/// Response type for the /ajaxauth/login endpoint.
///
/// The registry answers a rejected login with `200 OK` and `{"Login":"Failed"}`,
/// so the status code alone does not tell success from failure.
pub(crate) struct LoginResponse {}

impl LoginResponse {
    pub(crate) fn is_rejection(body: &str) -> bool {
        if body.trim().is_empty() {
            return true;
        }
        serde_json::from_str::<serde_json::Value>(body).is_ok_and(|value| {
            value
                .get("Login")
                .and_then(serde_json::Value::as_str)
                .is_some_and(|login| login.eq_ignore_ascii_case("failed"))
        })
    }
}

impl HTTPResponseType for LoginResponse {
    /// A successful login carries no payload, only the session cookie.
    type ParsedResponseType = ();

    async fn read_response(
        response: reqwest::Response,
    ) -> Result<Self::ParsedResponseType, ResponseError> {
        let resp = Self::unwrap_return_code(response).await?;
        let body = resp.text().await?;
        if Self::is_rejection(&body) { Err(ResponseError::Unauthorized) } else { Ok(()) }
    }
}
