//! HTTP status source

use crate::error::StatusError;
use crate::source::{AccountId, StatusReport, StatusSource};
use async_trait::async_trait;
use reqwest::Url;

/// Reads `GET {base_url}/{account}` and expects `{"isVerified": bool}`
#[derive(Clone, Debug)]
pub struct HttpStatusSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpStatusSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Endpoint for `account`, appended to the base path as one
    /// percent-encoded segment
    pub fn url_for(&self, account: &AccountId) -> Result<Url, StatusError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|err| StatusError::Transport(format!("invalid base url: {err}")))?;
        url.path_segments_mut()
            .map_err(|()| StatusError::Transport(format!("{} cannot take a path", self.base_url)))?
            .pop_if_empty()
            .push(account.as_str());
        Ok(url)
    }
}

#[async_trait]
impl StatusSource for HttpStatusSource {
    async fn check(&self, account: &AccountId) -> Result<StatusReport, StatusError> {
        let response = self
            .client
            .get(self.url_for(account)?)
            .send()
            .await
            .map_err(|err| StatusError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StatusError::Status(status.as_u16()));
        }

        response
            .json::<StatusReport>()
            .await
            .map_err(|err| StatusError::Decode(err.to_string()))
    }
}
