//! One tokio task per session. The task owns the `Session`, so everything
//! that touches it is serialized through the event channel.

use crate::registry::Dispatch;
use crate::session::Session;
use crate::translators::Translators;
use crossplay_protocol::bedrock::BedrockPacket;
use crossplay_protocol::java::JavaPacket;
use crossplay_protocol::Packet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, trace};

/// Work delivered to a session's worker, processed strictly in order.
pub enum SessionEvent {
    /// A decoded packet from the Java server.
    Downstream(Box<dyn Packet>),
    /// A decoded packet from the Bedrock client.
    Upstream(Box<dyn Packet>),
    /// Deferred work, e.g. the result of a blocking job.
    Task(Box<dyn FnOnce(&mut Session) + Send>),
    Disconnect(String),
}

/// Where translated packets go, in the order translators emitted them.
pub struct Outbound {
    pub bedrock: mpsc::UnboundedSender<BedrockPacket>,
    pub java: mpsc::UnboundedSender<JavaPacket>,
}

/// Cheap handle for feeding a running worker.
#[derive(Clone)]
pub struct SessionHandle {
    id: u64,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl SessionHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns false once the worker has stopped.
    pub fn java_packet(&self, packet: impl Packet) -> bool {
        self.events.send(SessionEvent::Downstream(Box::new(packet))).is_ok()
    }

    pub fn bedrock_packet(&self, packet: impl Packet) -> bool {
        self.events.send(SessionEvent::Upstream(Box::new(packet))).is_ok()
    }

    pub fn run(&self, task: impl FnOnce(&mut Session) + Send + 'static) -> bool {
        self.events.send(SessionEvent::Task(Box::new(task))).is_ok()
    }

    pub fn disconnect(&self, reason: impl Into<String>) -> bool {
        self.events.send(SessionEvent::Disconnect(reason.into())).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.events.is_closed()
    }
}

pub struct SessionWorker {
    session: Session,
    translators: Arc<Translators>,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    outbound: Outbound,
    tick_interval: Duration,
}

impl SessionWorker {
    pub fn new(
        mut session: Session,
        translators: Arc<Translators>,
        outbound: Outbound,
        tick_interval: Duration,
    ) -> (Self, SessionHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        session.attach_events(tx.clone());
        let handle = SessionHandle {
            id: session.id(),
            events: tx,
        };
        let worker = Self {
            session,
            translators,
            events: rx,
            outbound,
            tick_interval,
        };
        (worker, handle)
    }

    /// Processes events and ticks until the session disconnects. Returns the
    /// final session state.
    pub async fn run(mut self) -> Session {
        debug!("Session {} worker started", self.session.id());
        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while self.session.is_active() {
            let next = tokio::select! {
                event = self.events.recv() => Some(event),
                _ = ticker.tick() => None,
            };
            match next {
                Some(Some(event)) => self.handle(event),
                Some(None) => self.session.disconnect("event channel closed"),
                None => self.session.tick(),
            }
            if !self.flush() {
                self.session.disconnect("transport closed");
            }
        }

        info!(
            "Session {} closed after {} ticks",
            self.session.id(),
            self.session.ticks()
        );
        self.session
    }

    fn handle(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Downstream(packet) => {
                let outcome = self.translators.java.dispatch(&mut self.session, packet.as_ref());
                trace!("{} from server: {:?}", packet.name(), outcome);
            }
            SessionEvent::Upstream(packet) => {
                let outcome = self.translators.bedrock.dispatch(&mut self.session, packet.as_ref());
                if outcome == Dispatch::Unhandled {
                    trace!("{} from client has no translator", packet.name());
                }
            }
            SessionEvent::Task(task) => {
                if self.session.is_active() {
                    task(&mut self.session);
                }
            }
            SessionEvent::Disconnect(reason) => self.session.disconnect(&reason),
        }
    }

    /// Hands queued packets to the transport in emission order.
    fn flush(&mut self) -> bool {
        for packet in self.session.take_upstream() {
            if self.outbound.bedrock.send(packet).is_err() {
                return false;
            }
        }
        for packet in self.session.take_downstream() {
            if self.outbound.java.send(packet).is_err() {
                return false;
            }
        }
        true
    }
}
