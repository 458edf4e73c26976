use super::login::LoginResponse;
use super::request_common::{FormBodyHTTPRequestType, HTTPRequestMethod, HTTPRequestType};

/// Request type for the /ajaxauth/login endpoint.
#[derive(serde::Serialize)]
pub(crate) struct LoginRequest {
    /// The registry account name.
    pub(crate) identity: String,
    /// The registry account password.
    pub(crate) password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("identity", &self.identity)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl FormBodyHTTPRequestType for LoginRequest {
    /// The type of the form body.
    type Body = LoginRequest;
    /// Returns the serializable object.
    fn body(&self) -> &Self::Body { self }
}

impl HTTPRequestType for LoginRequest {
    /// Type of the expected response.
    type Response = LoginResponse;
    /// `str` object representing the specific endpoint.
    fn endpoint(&self) -> &'static str { "/ajaxauth/login" }
    /// The corresponding HTTP Request Method.
    fn request_method(&self) -> HTTPRequestMethod { HTTPRequestMethod::Post }
}
