use super::http_response::{debris_catalog, login};

pub(crate) mod debris_catalog_get;
pub(crate) mod login_post;
pub(crate) mod request_common;
