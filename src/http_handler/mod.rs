pub mod http_client;
pub mod response_common;

pub use response_common::ResponseError;
