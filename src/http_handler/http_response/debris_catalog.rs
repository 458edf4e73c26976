use crate::catalog::{OrbitalElementRecord, records_from_json};
use crate::http_handler::http_response::response_common::{
    HTTPResponseType, JSONBodyHTTPResponseType, ResponseError,
};

/// Response type for the general perturbations debris query.
pub(crate) struct DebrisCatalogResponse {}

impl JSONBodyHTTPResponseType for DebrisCatalogResponse {}

impl HTTPResponseType for DebrisCatalogResponse {
    /// The catalog in registry order. Entries missing a usable id or element line are
    /// dropped one by one, a body that is not a JSON array fails as a whole.
    type ParsedResponseType = Vec<OrbitalElementRecord>;

    async fn read_response(
        response: reqwest::Response,
    ) -> Result<Self::ParsedResponseType, ResponseError> {
        let resp = Self::unwrap_return_code(response).await?;
        let entries = Self::parse_json_body::<Vec<serde_json::Value>>(resp).await?;
        Ok(records_from_json(entries))
    }
}
