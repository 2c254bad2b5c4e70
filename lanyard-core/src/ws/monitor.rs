//! Network Liveness Monitor
//!
//! Periodic reachability probe of the session's endpoint host. Transitions
//! are logged and readable via the session manager; they never drive
//! reconnection, which only receive-loop failures do.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

const PROBE_INTERVAL: Duration = Duration::from_secs(10);
const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

pub(crate) struct NetworkMonitor {
    reachable: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl NetworkMonitor {
    /// Starts probing `host:port`. Assumes reachable until the first probe
    /// says otherwise.
    pub(crate) fn start(host: String, port: u16) -> Self {
        let reachable = Arc::new(AtomicBool::new(true));
        let flag = reachable.clone();

        let task = tokio::spawn(async move {
            let mut last = true;
            loop {
                let probe = tokio::time::timeout(
                    PROBE_TIMEOUT,
                    tokio::net::TcpStream::connect((host.as_str(), port)),
                )
                .await;
                let up = matches!(probe, Ok(Ok(_)));

                if up != last {
                    tracing::info!(host = %host, reachable = up, "network path changed");
                    last = up;
                }
                flag.store(up, Ordering::SeqCst);

                tokio::time::sleep(PROBE_INTERVAL).await;
            }
        });

        NetworkMonitor { reachable, task }
    }

    pub(crate) fn is_reachable(&self) -> bool {
        self.reachable.load(Ordering::SeqCst)
    }

    /// Stops probing immediately.
    pub(crate) fn cancel(&self) {
        self.task.abort();
    }
}

impl Drop for NetworkMonitor {
    fn drop(&mut self) {
        self.task.abort();
    }
}
