use crate::http_handler::{
    common::HTTPError, http_client::HTTPClient, http_response::response_common::HTTPResponseType,
};
use strum_macros::Display;

/// Failures before a response was received.
#[derive(Debug, Display)]
pub enum RequestError {
    FailedToConnect,
    Timeout,
    /// The request could not be assembled, e.g. an invalid base URL.
    Builder,
    Unknown,
}

impl std::error::Error for RequestError {}

impl From<reqwest::Error> for RequestError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_connect() {
            RequestError::FailedToConnect
        } else if value.is_timeout() {
            RequestError::Timeout
        } else if value.is_builder() {
            RequestError::Builder
        } else {
            RequestError::Unknown
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HTTPRequestMethod {
    Get,
    Post,
}

impl From<HTTPRequestMethod> for reqwest::Method {
    fn from(value: HTTPRequestMethod) -> Self {
        match value {
            HTTPRequestMethod::Get => reqwest::Method::GET,
            HTTPRequestMethod::Post => reqwest::Method::POST,
        }
    }
}

pub(crate) trait HTTPRequestType {
    /// Type of the expected response.
    type Response: HTTPResponseType;
    /// `str` object representing the specific endpoint, appended to the client base URL.
    fn endpoint(&self) -> &str;
    /// The corresponding HTTP Request Method.
    fn request_method(&self) -> HTTPRequestMethod;
    fn header_params(&self) -> reqwest::header::HeaderMap { reqwest::header::HeaderMap::default() }

    fn get_request_base(&self, client: &HTTPClient) -> reqwest::RequestBuilder {
        let url = format!("{}{}", client.url(), self.endpoint());
        client
            .client()
            .request(self.request_method().into(), url)
            .headers(self.header_params())
    }
}

pub(crate) trait NoBodyHTTPRequestType: HTTPRequestType {
    async fn send_request(
        &self,
        client: &HTTPClient,
    ) -> Result<<Self::Response as HTTPResponseType>::ParsedResponseType, HTTPError> {
        let response = self.get_request_base(client).send().await.map_err(RequestError::from)?;
        Ok(Self::Response::read_response(response).await?)
    }
}

pub(crate) trait FormBodyHTTPRequestType: HTTPRequestType {
    /// The type of the url-encoded form body.
    type Body: serde::Serialize + Sync;
    /// Returns the serializable object.
    fn body(&self) -> &Self::Body;

    async fn send_request(
        &self,
        client: &HTTPClient,
    ) -> Result<<Self::Response as HTTPResponseType>::ParsedResponseType, HTTPError> {
        let response = self
            .get_request_base(client)
            .form(self.body())
            .send()
            .await
            .map_err(RequestError::from)?;
        Ok(Self::Response::read_response(response).await?)
    }
}
