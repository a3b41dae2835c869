use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("not signed in")]
    NotAuthenticated,
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {code}: {message}")]
    Status { code: u16, message: String },
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// Builds a `Status` error from a non-success response, keeping the
    /// server's `error` field when it sent one.
    pub async fn from_response(resp: reqwest::Response) -> Self {
        let code = resp.status().as_u16();
        let message = match resp.json::<serde_json::Value>().await {
            Ok(body) => body["error"]
                .as_str()
                .unwrap_or("unknown error")
                .to_string(),
            Err(_) => "unknown error".to_string(),
        };
        ApiError::Status { code, message }
    }
}
