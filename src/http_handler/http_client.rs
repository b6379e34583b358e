use super::response_common::ResponseError;
use std::time::Duration;

/// A simple wrapper around `reqwest::Client` used to manage HTTP requests
/// with a preconfigured base URL and default settings.
///
/// The same client serves the long-lived event stream and the short command requests,
/// so only the connect phase carries a client-wide timeout. Individual command requests
/// set their own total timeout via [`HTTPClient::COMMAND_TIMEOUT`].
#[derive(Debug)]
pub(crate) struct HTTPClient {
    /// The underlying `reqwest::Client` used to perform HTTP requests.
    client: reqwest::Client,
    /// Base URL for the API, prepended to all endpoint paths.
    base_url: String,
}

impl HTTPClient {
    /// Timeout for establishing a TCP connection to the service.
    const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
    /// Total timeout for a single command request.
    pub(crate) const COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

    /// Constructs a new `HTTPClient` with the given base URL.
    ///
    /// # Arguments
    /// * `base_url` – The root URL for all HTTP requests (e.g., `"http://localhost:5000"`).
    ///
    /// # Errors
    /// Returns a [`ResponseError`] if the TLS backend could not be initialized.
    pub(crate) fn new(base_url: &str) -> Result<HTTPClient, ResponseError> {
        let client = reqwest::Client::builder().connect_timeout(Self::CONNECT_TIMEOUT).build()?;
        Ok(HTTPClient { client, base_url: base_url.trim_end_matches('/').to_string() })
    }

    /// Returns a reference to the internal `reqwest::Client`.
    pub(crate) fn client(&self) -> &reqwest::Client { &self.client }
    /// Returns the base URL that the client was initialized with.
    pub(crate) fn url(&self) -> &str { self.base_url.as_str() }

    /// Joins `endpoint` onto the base URL.
    pub(crate) fn endpoint(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// Posts `body` as JSON to `endpoint` and checks the status code.
    ///
    /// # Errors
    /// Returns a [`ResponseError`] for transport failures and non-success status codes.
    pub(crate) async fn post_json<B: serde::Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<(), ResponseError> {
        let response = self
            .client
            .post(self.endpoint(endpoint))
            .timeout(Self::COMMAND_TIMEOUT)
            .json(body)
            .send()
            .await?;
        ResponseError::unwrap_return_code(response).await.map(|_| ())
    }
}
