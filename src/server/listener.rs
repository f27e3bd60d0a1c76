use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::http::connection::Connection;
use crate::server::handler::Handler;

/// Pause after a failed accept so a persistent error (EMFILE, ENFILE) does
/// not spin the loop.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Handle to a running server.
///
/// The accept loop runs on its own task; every accepted connection gets a
/// task of its own. Dropping the handle also stops the accept loop, but
/// without waiting for it; [`Server::close`] waits.
pub struct Server {
    local_addr: SocketAddr,
    closed: Arc<AtomicBool>,
    shutdown_tx: watch::Sender<bool>,
    accept_task: Mutex<Option<JoinHandle<()>>>,
}

impl Server {
    /// Binds `0.0.0.0:<port>` and starts accepting in the background.
    ///
    /// Only a failed bind is reported; accept errors are logged by the loop.
    pub async fn serve<H: Handler>(port: u16, handler: H) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(("0.0.0.0", port)).await?;
        let local_addr = listener.local_addr()?;
        info!("Listening on {}", local_addr);

        let closed = Arc::new(AtomicBool::new(false));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let accept_task = tokio::spawn(accept_loop(
            listener,
            Arc::new(handler),
            Arc::clone(&closed),
            shutdown_rx,
        ));

        Ok(Self {
            local_addr,
            closed,
            shutdown_tx,
            accept_task: Mutex::new(Some(accept_task)),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Stops accepting and releases the listening socket.
    ///
    /// Returns once the accept loop has exited. Connections already accepted
    /// keep running. Calling this again is a no-op.
    pub async fn close(&self) -> anyhow::Result<()> {
        if self
            .closed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(());
        }

        self.shutdown_tx.send_replace(true);

        let task = self
            .accept_task
            .lock()
            .map_err(|_| anyhow::anyhow!("accept task handle poisoned"))?
            .take();
        if let Some(task) = task {
            task.await?;
        }

        info!("Server on {} closed", self.local_addr);
        Ok(())
    }
}

async fn accept_loop<H: Handler>(
    listener: TcpListener,
    handler: Arc<H>,
    closed: Arc<AtomicBool>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        if closed.load(Ordering::Acquire) {
            break;
        }

        let accepted = tokio::select! {
            biased;
            _ = shutdown_rx.changed() => break,
            res = listener.accept() => res,
        };

        match accepted {
            Ok((socket, peer)) => {
                if closed.load(Ordering::Acquire) {
                    debug!(%peer, "Dropping connection accepted during shutdown");
                    break;
                }

                info!("Accepted connection from {}", peer);

                let handler = Arc::clone(&handler);
                tokio::spawn(async move {
                    let conn = Connection::new(socket, peer);
                    if let Err(e) = conn.run(handler.as_ref()).await {
                        tracing::warn!("Connection error from {}: {}", peer, e);
                    }
                });
            }
            Err(e) => {
                if closed.load(Ordering::Acquire) {
                    break;
                }
                error!(error = %e, "Failed to accept connection");
                if backoff(&mut shutdown_rx).await {
                    break;
                }
            }
        }
    }

    debug!("Accept loop stopped");
}

/// Waits out [`ACCEPT_ERROR_BACKOFF`]. Returns true if shutdown was signalled
/// in the meantime.
async fn backoff(shutdown_rx: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        _ = shutdown_rx.changed() => true,
        _ = tokio::time::sleep(ACCEPT_ERROR_BACKOFF) => false,
    }
}
