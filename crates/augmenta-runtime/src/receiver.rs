//! Augmenta receiver
//!
//! Owns the tracking session and the socket lifecycle. While connected, a
//! background task drains datagrams, decodes each into OSC messages and
//! ingests them one by one in packet order.
//!
//! Disconnecting closes an ingest gate and waits for the datagram in flight
//! to reach the next message boundary before the scene is cleared, so no
//! message from a half-ingested bundle lands after the clear.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use augmenta_core::{AugmentaError, AugmentaResult, SceneEvent};
use augmenta_state::{ProtocolVersion, SessionStats, SubscriptionId, TrackingSession};
use augmenta_transport::{start_receive_loop, DatagramReceiver, OscUdpSocket};
use augmenta_wire::OscPacket;
use parking_lot::{Mutex, ReentrantMutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::ReceiverConfig;

/// Stops ingestion between messages
struct IngestGate {
    open: AtomicBool,
    in_flight: ReentrantMutex<()>,
}

impl IngestGate {
    fn new() -> Self {
        IngestGate {
            open: AtomicBool::new(true),
            in_flight: ReentrantMutex::new(()),
        }
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    /// [`ingest_datagram`], checking the gate before every message
    fn ingest(&self, session: &TrackingSession, bytes: &[u8], from: SocketAddr) -> usize {
        let _in_flight = self.in_flight.lock();
        if !self.is_open() {
            return 0;
        }
        ingest_while(session, bytes, from, || self.is_open())
    }

    /// Close the gate and wait for the datagram in flight. Reentrant, so an
    /// event handler may disconnect.
    fn close(&self) {
        self.open.store(false, Ordering::Release);
        let _drained = self.in_flight.lock();
    }
}

/// Background tasks of one connection
struct Connection {
    local_addr: SocketAddr,
    gate: Arc<IngestGate>,
    socket_task: JoinHandle<()>,
    ingest_task: JoinHandle<()>,
}

impl Connection {
    fn is_alive(&self) -> bool {
        !self.socket_task.is_finished() && !self.ingest_task.is_finished()
    }

    fn stop(self) {
        self.gate.close();
        self.socket_task.abort();
        self.ingest_task.abort();
    }
}

fn ingest_while<F>(session: &TrackingSession, bytes: &[u8], from: SocketAddr, keep_going: F) -> usize
where
    F: Fn() -> bool,
{
    let messages = match OscPacket::decode(bytes) {
        Ok(packet) => packet.into_messages(),
        Err(e) => {
            warn!(%from, len = bytes.len(), "Dropping undecodable packet: {}", e);
            return 0;
        }
    };

    let mut ingested = 0;
    for msg in &messages {
        if !keep_going() {
            debug!(%from, skipped = messages.len() - ingested, "Ingestion stopped mid-packet");
            break;
        }
        session.ingest(msg);
        ingested += 1;
    }
    ingested
}

/// Decode one datagram and ingest its messages in order.
/// Returns the number of messages ingested.
pub fn ingest_datagram(session: &TrackingSession, bytes: &[u8], from: SocketAddr) -> usize {
    ingest_while(session, bytes, from, || true)
}

async fn run_ingest(
    session: Arc<TrackingSession>,
    gate: Arc<IngestGate>,
    mut datagrams: DatagramReceiver,
) {
    while let Some((bytes, from)) = datagrams.recv().await {
        gate.ingest(&session, &bytes, from);
        if !gate.is_open() {
            break;
        }
    }
    debug!("Receive loop closed");
}

/// Receiver façade over a [`TrackingSession`]
pub struct AugmentaReceiver {
    session: Arc<TrackingSession>,
    channel_capacity: usize,
    connection: Mutex<Option<Connection>>,
}

impl AugmentaReceiver {
    /// Create an idle receiver
    pub fn new(protocol: ProtocolVersion) -> Self {
        AugmentaReceiver::with_config(&ReceiverConfig {
            protocol,
            ..Default::default()
        })
    }

    pub fn with_config(config: &ReceiverConfig) -> Self {
        AugmentaReceiver {
            session: Arc::new(TrackingSession::new(config.protocol)),
            channel_capacity: config.channel_capacity.max(1),
            connection: Mutex::new(None),
        }
    }

    /// Validate the config, build a receiver and connect it
    pub async fn create(config: &ReceiverConfig) -> AugmentaResult<Self> {
        config.validate()?;
        let receiver = AugmentaReceiver::with_config(config);
        receiver.connect(config.socket_addr()?).await?;
        Ok(receiver)
    }

    /// Bind `addr` and start receiving. Returns the bound address.
    pub async fn connect(&self, addr: SocketAddr) -> AugmentaResult<SocketAddr> {
        if self.connection.lock().is_some() {
            return Err(AugmentaError::AlreadyConnected);
        }

        let socket = OscUdpSocket::bind(addr).await?;
        let local_addr = socket.local_addr();

        let mut connection = self.connection.lock();
        if connection.is_some() {
            // Lost a race with a concurrent connect; the new socket is dropped
            return Err(AugmentaError::AlreadyConnected);
        }

        let gate = Arc::new(IngestGate::new());
        let (datagrams, socket_task) = start_receive_loop(socket.socket(), self.channel_capacity);
        let ingest_task = tokio::spawn(run_ingest(
            Arc::clone(&self.session),
            Arc::clone(&gate),
            datagrams,
        ));
        *connection = Some(Connection {
            local_addr,
            gate,
            socket_task,
            ingest_task,
        });

        info!(%local_addr, protocol = %self.session.protocol_version(), "Augmenta receiver connected");
        Ok(local_addr)
    }

    /// Stop receiving and clear the scene. A no-op when idle.
    pub fn disconnect(&self) {
        let Some(connection) = self.connection.lock().take() else {
            return;
        };

        let local_addr = connection.local_addr;
        connection.stop();
        self.session.clear();
        info!(%local_addr, "Augmenta receiver disconnected");
    }

    pub fn is_connected(&self) -> bool {
        self.connection
            .lock()
            .as_ref()
            .map_or(false, Connection::is_alive)
    }

    /// Bound address while connected
    pub fn local_addr(&self) -> AugmentaResult<SocketAddr> {
        self.connection
            .lock()
            .as_ref()
            .map(|c| c.local_addr)
            .ok_or(AugmentaError::NotConnected)
    }

    /// Shared handle to the session, for queries
    pub fn session(&self) -> Arc<TrackingSession> {
        Arc::clone(&self.session)
    }

    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&SceneEvent) + Send + Sync + 'static,
    {
        self.session.subscribe(handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.session.unsubscribe(id)
    }

    pub fn stats(&self) -> SessionStats {
        self.session.stats()
    }
}

impl Drop for AugmentaReceiver {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.get_mut().take() {
            connection.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use augmenta_core::{EventKind, ObjectId, OscArg, OscMessage};
    use augmenta_wire::{OscBundle, TimeTag};
    use tokio::sync::mpsc;

    fn loopback() -> SocketAddr {
        "127.0.0.1:0".parse().unwrap()
    }

    fn object_msg(method: &str, pid: i32, age: f32) -> OscMessage {
        let mut args = vec![
            OscArg::Int(1),
            OscArg::Int(pid),
            OscArg::Int(0),
            OscArg::Float(age),
        ];
        args.extend((4..15).map(|_| OscArg::Float(0.5)));
        OscMessage::with_path(&format!("/object/{}", method), args).unwrap()
    }

    fn event_channel(receiver: &AugmentaReceiver) -> mpsc::UnboundedReceiver<SceneEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        receiver.subscribe(move |event| {
            let _ = tx.send(event.clone());
        });
        rx
    }

    async fn next_event(rx: &mut mpsc::UnboundedReceiver<SceneEvent>) -> SceneEvent {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for event")
            .expect("event channel closed")
    }

    #[test]
    fn test_ingest_datagram_flattens_bundles() {
        let session = TrackingSession::new(ProtocolVersion::V2);
        let bundle = OscPacket::Bundle(OscBundle {
            time_tag: TimeTag::IMMEDIATELY,
            content: vec![
                object_msg("enter", 1, 0.0).into(),
                object_msg("update", 1, 2.5).into(),
                object_msg("enter", 2, 0.0).into(),
            ],
        });
        let bytes = bundle.encode().unwrap();

        assert_eq!(ingest_datagram(&session, &bytes, loopback()), 3);
        assert_eq!(session.object_count(), 2);
        assert_eq!(session.object(ObjectId::new(1)).unwrap().age, 2.5);
    }

    #[test]
    fn test_ingest_datagram_skips_garbage() {
        let session = TrackingSession::new(ProtocolVersion::V2);
        assert_eq!(ingest_datagram(&session, &[0xff; 13], loopback()), 0);
        assert_eq!(session.stats(), SessionStats::default());
    }

    #[test]
    fn test_ingest_datagram_keeps_siblings_of_foreign_messages() {
        let session = TrackingSession::new(ProtocolVersion::V2);
        let color = OscMessage::with_path("/lights/color", vec![OscArg::Char('x')]).unwrap();
        let bundle = OscPacket::Bundle(OscBundle {
            time_tag: TimeTag::IMMEDIATELY,
            content: vec![color.into(), object_msg("enter", 5, 0.0).into()],
        });
        let bytes = bundle.encode().unwrap();

        assert_eq!(ingest_datagram(&session, &bytes, loopback()), 2);
        assert!(session.object(ObjectId::new(5)).is_some());
    }

    #[test]
    fn test_closed_gate_ingests_nothing() {
        let session = TrackingSession::new(ProtocolVersion::V2);
        let gate = IngestGate::new();
        let bytes = OscPacket::from(object_msg("enter", 1, 0.0)).encode().unwrap();

        gate.close();
        assert_eq!(gate.ingest(&session, &bytes, loopback()), 0);
        assert_eq!(session.object_count(), 0);
    }

    #[tokio::test]
    async fn test_connect_receive_disconnect() {
        let receiver = AugmentaReceiver::new(ProtocolVersion::V2);
        assert!(!receiver.is_connected());
        assert!(matches!(receiver.local_addr(), Err(AugmentaError::NotConnected)));

        let addr = receiver.connect(loopback()).await.unwrap();
        assert!(receiver.is_connected());
        let mut events = event_channel(&receiver);

        let sender = OscUdpSocket::bind(loopback()).await.unwrap();
        sender
            .send_packet(&object_msg("enter", 7, 0.1).into(), addr)
            .await
            .unwrap();

        let event = next_event(&mut events).await;
        assert_eq!(event.kind(), EventKind::ObjectEntered);
        assert_eq!(event.entity().unwrap().pid, ObjectId::new(7));
        assert_eq!(receiver.session().object_count(), 1);

        receiver.disconnect();
        assert!(!receiver.is_connected());
        assert_eq!(receiver.session().object_count(), 0);

        // Idle disconnect is a no-op
        receiver.disconnect();
    }

    #[tokio::test]
    async fn test_connect_twice_fails() {
        let receiver = AugmentaReceiver::new(ProtocolVersion::V2);
        receiver.connect(loopback()).await.unwrap();

        assert!(matches!(
            receiver.connect(loopback()).await,
            Err(AugmentaError::AlreadyConnected)
        ));

        receiver.disconnect();
        assert!(receiver.connect(loopback()).await.is_ok());
    }

    #[tokio::test]
    async fn test_bad_packet_does_not_stop_loop() {
        let receiver = AugmentaReceiver::new(ProtocolVersion::V2);
        let addr = receiver.connect(loopback()).await.unwrap();
        let mut events = event_channel(&receiver);

        let sender = OscUdpSocket::bind(loopback()).await.unwrap();
        sender.send_bytes_to(b"garbage!", addr).await.unwrap();
        sender
            .send_packet(&object_msg("enter", 3, 0.0).into(), addr)
            .await
            .unwrap();

        assert_eq!(next_event(&mut events).await.kind(), EventKind::ObjectEntered);
        assert!(receiver.is_connected());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_disconnect_mid_bundle_leaves_scene_empty() {
        let receiver = AugmentaReceiver::new(ProtocolVersion::V2);
        let addr = receiver.connect(loopback()).await.unwrap();

        let (started_tx, mut started_rx) = mpsc::unbounded_channel();
        let first = AtomicBool::new(true);
        receiver.subscribe(move |_| {
            if first.swap(false, Ordering::SeqCst) {
                let _ = started_tx.send(());
                std::thread::sleep(Duration::from_millis(300));
            }
        });

        let bundle = OscPacket::Bundle(OscBundle {
            time_tag: TimeTag::IMMEDIATELY,
            content: (1..=3).map(|pid| object_msg("enter", pid, 0.0).into()).collect(),
        });
        let sender = OscUdpSocket::bind(loopback()).await.unwrap();
        sender.send_packet(&bundle, addr).await.unwrap();

        tokio::time::timeout(Duration::from_secs(5), started_rx.recv())
            .await
            .expect("timed out waiting for the first enter")
            .expect("handler dropped");

        receiver.disconnect();
        assert!(!receiver.is_connected());
        assert_eq!(receiver.session().object_count(), 0);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(receiver.session().objects().is_empty());
    }

    #[tokio::test]
    async fn test_create_from_config() {
        let config = ReceiverConfig {
            bind_address: "127.0.0.1".to_string(),
            port: 0,
            protocol: ProtocolVersion::V1,
            ..Default::default()
        };
        let receiver = AugmentaReceiver::create(&config).await.unwrap();

        assert!(receiver.is_connected());
        assert_eq!(receiver.session().protocol_version(), ProtocolVersion::V1);
        assert_ne!(receiver.local_addr().unwrap().port(), 0);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_config() {
        let config = ReceiverConfig {
            channel_capacity: 0,
            ..Default::default()
        };
        assert!(matches!(
            AugmentaReceiver::create(&config).await,
            Err(AugmentaError::InvalidConfig(_))
        ));
    }
}
