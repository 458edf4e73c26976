pub(crate) mod debris_catalog;
pub(crate) mod login;
pub(crate) mod response_common;
