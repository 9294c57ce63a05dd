use crate::config::Schedule;
use crate::peers::{Discovery, PeerClient};
use crate::Blockchain;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// A job that runs after `initial_delay`, then again `delay` after each run
/// finishes. Cancelling stops the re-arming; a run already in progress is
/// allowed to finish.
pub struct RepeatingTask {
    name: &'static str,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl RepeatingTask {
    pub fn spawn<F, Fut>(
        name: &'static str,
        initial_delay: Duration,
        delay: Duration,
        mut job: F,
    ) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            let mut wait = initial_delay;
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(wait) => {}
                }
                job().await;
                wait = delay;
            }
            debug!(task = name, "repeating task stopped");
        });
        Self {
            name,
            cancel,
            handle,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Cancel and wait for the task to wind down.
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(err) = self.handle.await {
            error!(task = self.name, error = %err, "repeating task ended abnormally");
        }
    }
}

/// Refresh the peer set from discovery.
pub async fn sync_peers<C, D>(chain: &Blockchain<C>, discovery: &D)
where
    C: PeerClient,
    D: Discovery + ?Sized,
{
    let addrs = discovery.discover().await;
    info!(peers = ?addrs, "peer set refreshed");
    chain.peers().replace(addrs).await;
}

/// Mine now and then every `every`, forever.
pub fn start_mining<C>(chain: Arc<Blockchain<C>>, every: Duration) -> RepeatingTask
where
    C: PeerClient + 'static,
{
    RepeatingTask::spawn("mining", Duration::ZERO, every, move || {
        let chain = Arc::clone(&chain);
        async move {
            if let Err(err) = chain.mine().await {
                error!(error = %err, "mining cycle failed");
            }
        }
    })
}

pub fn start_peer_sync<C, D>(
    chain: Arc<Blockchain<C>>,
    discovery: Arc<D>,
    initial_delay: Duration,
    every: Duration,
) -> RepeatingTask
where
    C: PeerClient + 'static,
    D: Discovery + ?Sized + 'static,
{
    RepeatingTask::spawn("peer-sync", initial_delay, every, move || {
        let chain = Arc::clone(&chain);
        let discovery = Arc::clone(&discovery);
        async move { sync_peers(&chain, &*discovery).await }
    })
}

/// Background activities of a running node.
pub struct NodeTasks {
    pub startup: JoinHandle<bool>,
    pub peer_sync: RepeatingTask,
    pub mining: Option<RepeatingTask>,
}

impl NodeTasks {
    /// Discover peers and resolve conflicts once, then keep refreshing peers
    /// and, if `mine` is set, keep mining.
    pub fn start<C, D>(
        chain: Arc<Blockchain<C>>,
        discovery: Arc<D>,
        schedule: Schedule,
        mine: bool,
    ) -> Self
    where
        C: PeerClient + 'static,
        D: Discovery + ?Sized + 'static,
    {
        let startup = tokio::spawn({
            let chain = Arc::clone(&chain);
            let discovery = Arc::clone(&discovery);
            async move {
                sync_peers(&chain, &*discovery).await;
                chain.resolve_conflicts().await
            }
        });
        let peer_sync = start_peer_sync(
            Arc::clone(&chain),
            discovery,
            schedule.peer_sync_interval,
            schedule.peer_sync_interval,
        );
        let mining = mine.then(|| start_mining(chain, schedule.mining_interval));
        Self {
            startup,
            peer_sync,
            mining,
        }
    }

    pub async fn shutdown(self) {
        self.startup.abort();
        self.peer_sync.stop().await;
        if let Some(mining) = self.mining {
            mining.stop().await;
        }
    }
}
