//! UDP socket for OSC traffic
//!
//! One datagram carries exactly one OSC packet. Datagrams are never
//! reassembled; anything longer than [`MAX_PACKET_SIZE`] is truncated by the
//! socket and will fail to decode.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{trace, warn};

use augmenta_core::{AugmentaError, AugmentaResult};
use augmenta_wire::{OscPacket, MAX_PACKET_SIZE};

fn transport_error(e: std::io::Error) -> AugmentaError {
    AugmentaError::TransportError(e.to_string())
}

/// UDP endpoint for OSC packets
pub struct OscUdpSocket {
    socket: Arc<UdpSocket>,
    local_addr: SocketAddr,
}

impl OscUdpSocket {
    /// Bind to a local address. Port 0 picks an ephemeral port.
    pub async fn bind(addr: SocketAddr) -> AugmentaResult<Self> {
        let socket = UdpSocket::bind(addr).await.map_err(transport_error)?;
        let local_addr = socket.local_addr().map_err(transport_error)?;

        Ok(OscUdpSocket {
            socket: Arc::new(socket),
            local_addr,
        })
    }

    /// Get local address
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Encode and send a packet
    pub async fn send_packet(&self, packet: &OscPacket, dest: SocketAddr) -> AugmentaResult<()> {
        let bytes = packet.encode()?;
        self.send_bytes_to(&bytes, dest).await
    }

    /// Send raw bytes to a destination
    pub async fn send_bytes_to(&self, bytes: &[u8], dest: SocketAddr) -> AugmentaResult<()> {
        self.socket
            .send_to(bytes, dest)
            .await
            .map_err(transport_error)?;
        Ok(())
    }

    /// Receive and decode one packet
    pub async fn recv_packet(&self) -> AugmentaResult<(OscPacket, SocketAddr)> {
        let mut buf = vec![0u8; MAX_PACKET_SIZE];
        let (len, addr) = self
            .socket
            .recv_from(&mut buf)
            .await
            .map_err(transport_error)?;

        let packet = OscPacket::decode(&buf[..len])?;
        Ok((packet, addr))
    }

    /// Get a clone of the socket for the receive loop
    pub fn socket(&self) -> Arc<UdpSocket> {
        Arc::clone(&self.socket)
    }
}

/// Raw datagram channel
pub type DatagramReceiver = mpsc::Receiver<(Vec<u8>, SocketAddr)>;

/// Start a background receive loop.
///
/// The loop ends when the returned receiver is dropped or the handle is
/// aborted; aborting also releases the loop's share of the socket. Socket
/// errors are logged and the loop keeps reading.
pub fn start_receive_loop(
    socket: Arc<UdpSocket>,
    buffer_size: usize,
) -> (DatagramReceiver, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(buffer_size);

    let handle = tokio::spawn(async move {
        let mut buf = vec![0u8; MAX_PACKET_SIZE];
        loop {
            match socket.recv_from(&mut buf).await {
                Ok((len, addr)) => {
                    trace!(len, %addr, "Datagram received");
                    if tx.send((buf[..len].to_vec(), addr)).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("UDP receive error: {}", e);
                }
            }
        }
    });

    (rx, handle)
}
