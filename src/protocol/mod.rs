pub mod messages;
pub mod types;
pub mod routing_table;
pub mod message_handler;
pub mod task_manager;

pub use messages::*;
pub use types::*;
pub use routing_table::*;

use crate::algorithms::bellman_ford::DistanceVectorTable;
use crate::config::RouterConfig;
use crate::error::RouterError;
use crate::network::{self, MessageReader, MessageWriter};
use crate::{RouterId, SharedRouterState};
use log::{debug, error, info, warn};
use message_handler::Dispatch;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;

pub(crate) enum Session {
    Uninitialized,
    Initialized(DistanceVectorTable),
    Terminated(Option<DistanceVectorTable>),
}

/// Everything the receive loop and the update task must not touch at the
/// same time: the cost tables and the outbound side of the relay channel.
pub struct RouterState<W> {
    router_id: RouterId,
    pub(crate) session: Session,
    writer: MessageWriter<W>,
    failure: Option<RouterError>,
}

impl<W: AsyncWrite + Unpin> RouterState<W> {
    fn new(router_id: RouterId, writer: MessageWriter<W>) -> Self {
        Self {
            router_id,
            session: Session::Uninitialized,
            writer,
            failure: None,
        }
    }

    pub fn router_id(&self) -> RouterId {
        self.router_id
    }

    pub fn state(&self) -> SessionState {
        match self.session {
            Session::Uninitialized => SessionState::Uninitialized,
            Session::Initialized(_) => SessionState::Initialized,
            Session::Terminated(_) => SessionState::Terminated,
        }
    }

    pub fn table(&self) -> Option<&DistanceVectorTable> {
        match &self.session {
            Session::Initialized(table) => Some(table),
            Session::Terminated(table) => table.as_ref(),
            Session::Uninitialized => None,
        }
    }

    async fn send(&mut self, packet: &DvrPacket) -> Result<(), RouterError> {
        self.writer.send(packet).await
    }

    /// Sends the current min-cost vector to every neighbor. Stops at the first
    /// failed send; packets already written are not recalled.
    async fn broadcast(&mut self) -> Result<usize, RouterError> {
        let Session::Initialized(table) = &self.session else {
            return Ok(0);
        };

        let snapshot = table.snapshot();
        let neighbors: Vec<RouterId> = table.neighbors().collect();
        let source = Peer::Node(self.router_id);

        for &neighbor in &neighbors {
            let packet = DvrPacket::route(source, Peer::Node(neighbor), snapshot.clone());
            self.writer.send(&packet).await?;
        }

        Ok(neighbors.len())
    }

    fn terminate(&mut self) -> Option<ForwardingTable> {
        let table = match std::mem::replace(&mut self.session, Session::Terminated(None)) {
            Session::Initialized(table) => Some(table),
            Session::Terminated(table) => table,
            Session::Uninitialized => None,
        };

        let forwarding = table.as_ref().map(DistanceVectorTable::forwarding_table);
        self.session = Session::Terminated(table);
        forwarding
    }

    fn fail(&mut self, error: RouterError) {
        if self.failure.is_none() {
            self.failure = Some(error);
        }
        self.terminate();
    }
}

/// Cloneable access to a running engine, used by the periodic update task.
pub struct EngineHandle<W> {
    router_id: RouterId,
    state: SharedRouterState<W>,
    shutdown_tx: broadcast::Sender<()>,
}

impl<W> Clone for EngineHandle<W> {
    fn clone(&self) -> Self {
        Self {
            router_id: self.router_id,
            state: self.state.clone(),
            shutdown_tx: self.shutdown_tx.clone(),
        }
    }
}

impl<W: AsyncWrite + Unpin + Send + 'static> EngineHandle<W> {
    /// Broadcasts the current distance vector to all neighbors.
    ///
    /// Returns the number of packets sent, or `None` once the session is
    /// terminated. A failed send terminates the session and wakes the
    /// receive loop.
    pub async fn on_tick(&self) -> Option<usize> {
        let mut state = self.state.lock().await;
        if state.state() == SessionState::Terminated {
            return None;
        }

        match state.broadcast().await {
            Ok(sent) => Some(sent),
            Err(e) => {
                error!("Connection to relay lost during broadcast, terminating: {}", e);
                state.fail(e);
                drop(state);
                let _ = self.shutdown_tx.send(());
                None
            }
        }
    }

    pub async fn state(&self) -> SessionState {
        self.state.lock().await.state()
    }

    pub async fn snapshot(&self) -> Option<Vec<Cost>> {
        self.state.lock().await.table().map(DistanceVectorTable::snapshot)
    }

    pub async fn forwarding_table(&self) -> Option<ForwardingTable> {
        self.state.lock().await.table().map(DistanceVectorTable::forwarding_table)
    }

    pub fn router_id(&self) -> RouterId {
        self.router_id
    }
}

pub struct ProtocolEngine<R, W> {
    config: RouterConfig,
    reader: MessageReader<R>,
    handle: EngineHandle<W>,
    update_task: Option<JoinHandle<()>>,
}

impl ProtocolEngine<OwnedReadHalf, OwnedWriteHalf> {
    /// Connects to the relay named in `config`. The configuration is checked
    /// before any connection is attempted.
    pub async fn connect(config: RouterConfig) -> Result<Self, RouterError> {
        config.validate()?;
        let (reader, writer) = network::connect(&config.server_host, config.server_port).await?;
        Self::new(config, reader, writer)
    }
}

impl<R, W> ProtocolEngine<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    pub fn new(config: RouterConfig, reader: MessageReader<R>, writer: MessageWriter<W>) -> Result<Self, RouterError> {
        config.validate()?;

        let (shutdown_tx, _) = broadcast::channel(1);
        let state = Arc::new(Mutex::new(RouterState::new(config.router_id, writer)));

        Ok(Self {
            handle: EngineHandle {
                router_id: config.router_id,
                state,
                shutdown_tx,
            },
            config,
            reader,
            update_task: None,
        })
    }

    pub fn handle(&self) -> EngineHandle<W> {
        self.handle.clone()
    }

    pub async fn on_tick(&self) -> Option<usize> {
        self.handle.on_tick().await
    }

    /// Announces this router to the relay, then processes packets until QUIT
    /// or a failure. The forwarding table is returned whenever link costs
    /// were received before the session ended.
    pub async fn start(mut self) -> SessionReport {
        info!(
            "Starting router {} (relay {}:{}, update interval {} ms)",
            self.config.router_id, self.config.server_host, self.config.server_port, self.config.update_interval
        );

        let mut shutdown_rx = self.handle.shutdown_tx.subscribe();
        let outcome = match self.announce().await {
            Ok(()) => self.run(&mut shutdown_rx).await,
            Err(e) => Err(e),
        };

        self.finish(outcome).await
    }

    async fn announce(&mut self) -> Result<(), RouterError> {
        let hello = DvrPacket::hello(Peer::Node(self.config.router_id), Peer::Server);
        self.handle.state.lock().await.send(&hello).await
    }

    async fn run(&mut self, shutdown_rx: &mut broadcast::Receiver<()>) -> Result<(), RouterError> {
        loop {
            let received = tokio::select! {
                biased;
                _ = shutdown_rx.recv() => None,
                received = self.reader.receive() => Some(received),
            };

            // Only a failed broadcast signals shutdown while the loop is live;
            // `finish` reports the stored failure.
            let Some(received) = received else {
                return Err(RouterError::ConnectionClosed);
            };

            let packet = received?;
            debug!("← Received {}", packet);

            let dispatch = {
                let mut state = self.handle.state.lock().await;
                if state.state() == SessionState::Terminated {
                    debug!("Dropping {} received after termination", packet);
                    return Err(RouterError::ConnectionClosed);
                }
                message_handler::handle_packet(&mut *state, &packet)?
            };

            match dispatch {
                Dispatch::Continue => {}
                Dispatch::Initialized => self.arm_updates(),
                Dispatch::Quit => return Ok(()),
            }
        }
    }

    fn arm_updates(&mut self) {
        if self.update_task.is_some() {
            return;
        }

        let shutdown_rx = self.handle.shutdown_tx.subscribe();
        self.update_task = Some(task_manager::start_update_task(
            self.handle.clone(),
            self.config.update_period(),
            shutdown_rx,
        ));
        debug!("Periodic updates armed every {} ms", self.config.update_interval);
    }

    async fn finish(mut self, outcome: Result<(), RouterError>) -> SessionReport {
        let (table, failure) = {
            let mut state = self.handle.state.lock().await;
            let table = state.terminate();
            (table, state.failure.take())
        };

        let _ = self.handle.shutdown_tx.send(());
        if let Some(task) = self.update_task.take() {
            if let Err(e) = task.await {
                warn!("Update task did not stop cleanly: {}", e);
            }
        }

        // A failed broadcast outranks whatever the receive loop saw last.
        let cause = match (failure, outcome) {
            (None, Ok(())) => {
                info!("Router {} terminated normally", self.config.router_id);
                TerminationCause::Quit
            }
            (Some(e), _) | (None, Err(e)) => {
                error!("Router {} terminated: {}", self.config.router_id, e);
                TerminationCause::Failed(e)
            }
        };

        SessionReport { table, cause }
    }
}
