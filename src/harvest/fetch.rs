//! HTTP fetch worker backed by `reqwest`.

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::timeout;

use crate::traits::{truncate_chars, FetchError, PageFetcher, MAX_ERROR_LEN};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; PortfolioScraper/1.0)";
const MAX_REDIRECTS: usize = 10;

/// Single-attempt GET with a hard deadline.
///
/// The deadline is set on the client and also enforced with
/// [`tokio::time::timeout`] around the whole request, body included, so a
/// server that trickles bytes cannot hold the window open.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    deadline: Duration,
}

impl HttpFetcher {
    pub fn new(deadline: Duration) -> Result<Self, FetchError> {
        Self::with_user_agent(deadline, DEFAULT_USER_AGENT)
    }

    pub fn with_user_agent(deadline: Duration, user_agent: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(deadline)
            .build()
            .map_err(|e| FetchError::Network(describe(&e)))?;
        Ok(Self { client, deadline })
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response.text().await.map_err(|e| match self.classify(e) {
            FetchError::Network(msg) => FetchError::Body(msg),
            other => other,
        })
    }

    fn classify(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.deadline)
        } else {
            FetchError::Network(describe(&err))
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        timeout(self.deadline, self.get_text(url))
            .await
            .map_err(|_| FetchError::Timeout(self.deadline))?
    }
}

/// reqwest's top-level message hides the cause ("error sending request"),
/// so append the innermost source.
fn describe(err: &reqwest::Error) -> String {
    let root = std::iter::successors(std::error::Error::source(err), |e| e.source()).last();
    let msg = match root {
        Some(cause) => format!("{err}: {cause}"),
        None => err.to_string(),
    };
    truncate_chars(&msg, MAX_ERROR_LEN)
}
