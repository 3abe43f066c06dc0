use async_trait::async_trait;
use shared::{block::Chain, interaction::StatusReport};
use tracing::*;
use url::Url;

/// the remote chain authority, as seen by the session loop and the status reporter
#[async_trait]
pub trait ChainStore: Send + Sync {
    /// `GET /chain`
    async fn fetch_chain(&self) -> anyhow::Result<Chain>;

    /// `POST /chain` with an already encoded chain, returns the response body
    async fn submit_chain(&self, payload: String) -> anyhow::Result<String>;

    /// `POST /status`, returns the response body
    async fn post_status(&self, report: &StatusReport) -> anyhow::Result<String>;
}

pub struct ChainAuthority {
    url: Url,
    client: reqwest::Client,
}

impl ChainAuthority {
    pub fn new(endpoint: &str) -> anyhow::Result<Self> {
        let mut url = Url::parse(endpoint)?;
        // keep a trailing slash so `join` appends instead of replacing the last segment
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(Self {
            url,
            client: reqwest::Client::new(),
        })
    }

    pub fn endpoint(&self, path: &str) -> anyhow::Result<Url> {
        Ok(self.url.join(path)?)
    }
}

#[async_trait]
impl ChainStore for ChainAuthority {
    async fn fetch_chain(&self) -> anyhow::Result<Chain> {
        let url = self.endpoint("chain")?;

        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(err) => anyhow::bail!("fail to connect to chain authority {url}: {err}"),
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(err) => anyhow::bail!("fail to read chain from {url}: {err:#}"),
        };

        if !status.is_success() {
            anyhow::bail!("status code: {status}, response: {text}");
        }

        match serde_json::from_str::<Chain>(&text) {
            Ok(chain) => Ok(chain),
            Err(err) => anyhow::bail!("fail to parse block json: {err:#}, response: {text}"),
        }
    }

    async fn submit_chain(&self, payload: String) -> anyhow::Result<String> {
        let url = self.endpoint("chain")?;

        let response = match self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .body(payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => anyhow::bail!("fail to post updated chain: {err}"),
        };

        let status = response.status();
        match response.text().await {
            Ok(text) => {
                if !status.is_success() {
                    warn!("chain authority answered {status} to the submitted chain");
                }
                Ok(text)
            }
            Err(err) => anyhow::bail!("chain authority did not answer the update: {err:#}"),
        }
    }

    async fn post_status(&self, report: &StatusReport) -> anyhow::Result<String> {
        let url = self.endpoint("status")?;

        let response = match self.client.post(url).json(report).send().await {
            Ok(response) => response,
            Err(err) => anyhow::bail!("fail to send status: {err}"),
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(err) => anyhow::bail!("fail to read status response: {err:#}"),
        };

        if !status.is_success() {
            anyhow::bail!("status code: {status}, response: {text}");
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_join_under_base_path() {
        let authority = ChainAuthority::new("http://localhost:5000").unwrap();
        assert_eq!(authority.endpoint("chain").unwrap().as_str(), "http://localhost:5000/chain");

        let authority = ChainAuthority::new("http://10.0.0.2:5000/pool").unwrap();
        assert_eq!(
            authority.endpoint("status").unwrap().as_str(),
            "http://10.0.0.2:5000/pool/status"
        );
    }

    #[test]
    fn rejects_invalid_endpoint() {
        assert!(ChainAuthority::new("not a url").is_err());
    }
}
