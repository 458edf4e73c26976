mod routes;

pub use routes::{POSITIONS_ROUTE, serve};
