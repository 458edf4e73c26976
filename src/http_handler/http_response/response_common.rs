use strum_macros::Display;

pub(crate) trait JSONBodyHTTPResponseType: HTTPResponseType {
    /// Reads the body as JSON of shape `T`, which need not be the final parsed type.
    async fn parse_json_body<T>(response: reqwest::Response) -> Result<T, ResponseError>
    where T: serde::de::DeserializeOwned {
        Ok(response.json::<T>().await?)
    }
}

pub(crate) trait HTTPResponseType {
    type ParsedResponseType;
    async fn read_response(
        response: reqwest::Response,
    ) -> Result<Self::ParsedResponseType, ResponseError>;

    async fn unwrap_return_code(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ResponseError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            Err(ResponseError::Unauthorized)
        } else if status.is_server_error() {
            Err(ResponseError::InternalServer)
        } else if status.is_client_error() {
            Err(ResponseError::BadRequest(status.as_u16()))
        } else {
            Err(ResponseError::Unknown)
        }
    }
}

#[derive(Debug, Display)]
pub enum ResponseError {
    /// Credentials rejected or session missing.
    Unauthorized,
    InternalServer,
    BadRequest(u16),
    NoConnection,
    /// The body did not have the expected shape.
    Decode,
    Unknown,
}

impl std::error::Error for ResponseError {}
impl From<reqwest::Error> for ResponseError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            ResponseError::Decode
        } else if value.is_timeout() || value.is_redirect() {
            ResponseError::InternalServer
        } else if value.is_connect() {
            ResponseError::NoConnection
        } else {
            ResponseError::Unknown
        }
    }
}
