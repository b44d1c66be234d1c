//! Admission and bookkeeping for live sessions. A transport calls
//! [`SessionManager::open`] once a client has logged in and pumps packets
//! through the returned handle.

use crossplay_connector::{Outbound, Registries, Session, SessionConfig, SessionHandle, SessionWorker, Translators};
use crossplay_protocol::bedrock::BedrockPacket;
use crossplay_protocol::java::JavaPacket;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

/// Everything a transport needs to drive one session.
pub struct OpenedSession {
    pub handle: SessionHandle,
    /// Translated packets for the Bedrock client.
    pub to_client: mpsc::UnboundedReceiver<BedrockPacket>,
    /// Translated packets for the Java server.
    pub to_server: mpsc::UnboundedReceiver<JavaPacket>,
}

pub struct SessionManager {
    registries: Registries,
    translators: Arc<Translators>,
    config: SessionConfig,
    tick_interval: Duration,
    max_sessions: usize,
    next_id: AtomicU64,
    live: Arc<Mutex<HashMap<u64, SessionHandle>>>,
    workers: Mutex<Vec<JoinHandle<Session>>>,
}

impl SessionManager {
    pub fn new(
        registries: Registries,
        translators: Arc<Translators>,
        config: SessionConfig,
        tick_interval: Duration,
        max_sessions: usize,
    ) -> Self {
        Self {
            registries,
            translators,
            config,
            tick_interval,
            max_sessions,
            next_id: AtomicU64::new(1),
            live: Arc::new(Mutex::new(HashMap::new())),
            workers: Mutex::new(Vec::new()),
        }
    }

    /// Starts a worker for a new player. Must be called inside a tokio runtime.
    pub fn open(&self, player_uuid: Uuid) -> anyhow::Result<OpenedSession> {
        let mut live = self
            .live
            .lock()
            .map_err(|_| anyhow::anyhow!("session table poisoned"))?;
        live.retain(|_, handle| !handle.is_closed());
        if live.len() >= self.max_sessions {
            warn!("Refusing {}: {} sessions already open", player_uuid, live.len());
            anyhow::bail!("server is full ({} sessions)", self.max_sessions);
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let session = Session::new(id, player_uuid, &self.config, &self.registries)?;
        let (bedrock_tx, to_client) = mpsc::unbounded_channel();
        let (java_tx, to_server) = mpsc::unbounded_channel();
        let (worker, handle) = SessionWorker::new(
            session,
            self.translators.clone(),
            Outbound {
                bedrock: bedrock_tx,
                java: java_tx,
            },
            self.tick_interval,
        );

        let table = self.live.clone();
        let task = tokio::spawn(async move {
            let session = worker.run().await;
            if let Ok(mut live) = table.lock() {
                live.remove(&session.id());
            }
            session
        });
        if let Ok(mut workers) = self.workers.lock() {
            workers.retain(|w| !w.is_finished());
            workers.push(task);
        }

        live.insert(id, handle.clone());
        info!("Session {} opened for {}", id, player_uuid);
        Ok(OpenedSession {
            handle,
            to_client,
            to_server,
        })
    }

    pub fn session_count(&self) -> usize {
        self.live
            .lock()
            .map(|live| live.values().filter(|h| !h.is_closed()).count())
            .unwrap_or(0)
    }

    /// Disconnects every session and waits for the workers to finish.
    pub async fn shutdown(&self, reason: &str) {
        let handles: Vec<SessionHandle> = match self.live.lock() {
            Ok(live) => live.values().cloned().collect(),
            Err(_) => Vec::new(),
        };
        for handle in &handles {
            handle.disconnect(reason);
        }
        let workers = match self.workers.lock() {
            Ok(mut workers) => std::mem::take(&mut *workers),
            Err(_) => Vec::new(),
        };
        for worker in workers {
            if let Err(e) = worker.await {
                warn!("Session worker ended abnormally: {}", e);
            }
        }
        info!("Closed {} sessions", handles.len());
    }
}
