use super::EngineHandle;
use log::debug;
use std::time::Duration;
use tokio::io::AsyncWrite;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::interval;

/// Spawns the periodic broadcast. The first tick fires immediately; the task
/// ends on shutdown or once the session is terminated.
pub fn start_update_task<W>(
    handle: EngineHandle<W>,
    period: Duration,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> JoinHandle<()>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        update_task(handle, period, &mut shutdown_rx).await;
    })
}

async fn update_task<W>(handle: EngineHandle<W>, period: Duration, shutdown_rx: &mut broadcast::Receiver<()>)
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    let mut interval = interval(period);

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                debug!("Update task shutting down");
                break;
            }
            _ = interval.tick() => {
                match handle.on_tick().await {
                    Some(sent) => debug!("Router {} broadcast its distance vector to {} neighbors", handle.router_id(), sent),
                    None => break,
                }
            }
        }
    }
}
