use strum_macros::Display;

/// Failure modes of a single HTTP exchange with the monitoring service or a catalog.
#[derive(Debug, Display)]
pub enum ResponseError {
    InternalServer,
    BadRequest(String),
    Unauthorized,
    NoConnection,
    Unknown,
}

impl ResponseError {
    /// Maps non-success status codes to a [`ResponseError`], passing successful
    /// responses through unchanged.
    pub(crate) async fn unwrap_return_code(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ResponseError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else if status.is_server_error() {
            Err(ResponseError::InternalServer)
        } else if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            Err(ResponseError::Unauthorized)
        } else if status.is_client_error() {
            Err(ResponseError::BadRequest(response.text().await.unwrap_or_default()))
        } else {
            Err(ResponseError::Unknown)
        }
    }
}

impl std::error::Error for ResponseError {}
impl From<reqwest::Error> for ResponseError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_request() || value.is_decode() {
            ResponseError::BadRequest(value.to_string())
        } else if value.is_timeout() || value.is_redirect() {
            ResponseError::InternalServer
        } else if value.is_connect() {
            ResponseError::NoConnection
        } else {
            ResponseError::Unknown
        }
    }
}
