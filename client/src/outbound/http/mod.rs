//! Generic JSON-over-HTTP transport.

mod request_client;

pub use request_client::{
    DEFAULT_TIMEOUT, HEALTH_CHECK_TIMEOUT, HEALTH_PATH, RequestClient, RequestOptions,
    ResponseBody,
};
