use super::debris_catalog::DebrisCatalogResponse;
use super::request_common::{HTTPRequestMethod, HTTPRequestType, NoBodyHTTPRequestType};

/// Debris-class objects without a decay date whose latest epoch is at most 30 days old,
/// ordered by catalog id, reduced to the four persisted columns.
pub(crate) const DEBRIS_CATALOG_QUERY: &str = concat!(
    "/basicspacedata/query/class/gp/OBJECT_TYPE/DEBRIS/",
    "DECAY_DATE/null-val/EPOCH/%3Enow-30/orderby/NORAD_CAT_ID%20asc/",
    "format/json/predicates/OBJECT_NAME,NORAD_CAT_ID,TLE_LINE1,TLE_LINE2"
);

/// Request type for the debris catalog query. Requires a logged-in session.
#[derive(Debug)]
pub(crate) struct DebrisCatalogRequest {}

impl NoBodyHTTPRequestType for DebrisCatalogRequest {}

impl HTTPRequestType for DebrisCatalogRequest {
    type Response = DebrisCatalogResponse;
    fn endpoint(&self) -> &'static str { DEBRIS_CATALOG_QUERY }
    fn request_method(&self) -> HTTPRequestMethod { HTTPRequestMethod::Get }
}
