use async_trait::async_trait;
use powchain_core::error::PeerError;
use powchain_core::peers::{PeerClient, PeerNotice};
use powchain_core::wire::ChainResponse;
use powchain_core::Block;
use reqwest::{Client, RequestBuilder};
use std::time::Duration;

/// Talks to peers over their HTTP interface. One attempt per call, bounded
/// by the client-wide timeout.
#[derive(Clone, Debug)]
pub struct HttpPeerClient {
    http: Client,
}

impl HttpPeerClient {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    fn url(peer: &str, path: &str) -> String {
        format!("http://{peer}{path}")
    }

    async fn send(&self, peer: &str, request: RequestBuilder) -> Result<reqwest::Response, PeerError> {
        let res = request.send().await.map_err(|err| PeerError::Transport {
            peer: peer.to_string(),
            reason: err.to_string(),
        })?;
        if !res.status().is_success() {
            return Err(PeerError::Status {
                peer: peer.to_string(),
                status: res.status().as_u16(),
            });
        }
        Ok(res)
    }
}

#[async_trait]
impl PeerClient for HttpPeerClient {
    async fn fetch_chain(&self, peer: &str) -> Result<Vec<Block>, PeerError> {
        let res = self
            .send(peer, self.http.get(Self::url(peer, "/chain")))
            .await?;
        let body: ChainResponse = res.json().await.map_err(|err| PeerError::Decode {
            peer: peer.to_string(),
            reason: err.to_string(),
        })?;
        Ok(body.chain)
    }

    async fn notify(&self, peer: &str, notice: &PeerNotice) -> Result<(), PeerError> {
        let request = match notice {
            PeerNotice::ClearTransactions => self.http.delete(Self::url(peer, "/transactions")),
            PeerNotice::ResolveConflicts => self.http.put(Self::url(peer, "/consensus")),
            PeerNotice::RelayTransaction(transfer) => self
                .http
                .put(Self::url(peer, "/transactions"))
                .json(transfer),
        };
        self.send(peer, request).await.map(|_| ())
    }
}
