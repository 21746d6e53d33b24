//! Host bridges: where packed state, the bye pattern and user alerts go

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// The native side of the pad
pub trait HostBridge: Send {
    /// A status packet, or the layout announcement right after construction
    fn update_vals(&mut self, bytes: &[u8]);

    /// The packet to replay when the pad goes away
    fn set_bye(&mut self, bytes: &[u8]);

    /// A message for the user
    fn alert(&mut self, message: &str);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BridgeCall {
    UpdateVals(Vec<u8>),
    SetBye(Vec<u8>),
    Alert(String),
}

/// Records every call; clones share the record
#[derive(Clone, Debug, Default)]
pub struct MemoryBridge {
    calls: Arc<Mutex<Vec<BridgeCall>>>,
}

impl MemoryBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<BridgeCall> {
        match self.calls.lock() {
            Ok(calls) => calls.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn updates(&self) -> Vec<Vec<u8>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                BridgeCall::UpdateVals(bytes) => Some(bytes),
                _ => None,
            })
            .collect()
    }

    pub fn last_update(&self) -> Option<Vec<u8>> {
        self.updates().pop()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                BridgeCall::Alert(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn bye(&self) -> Option<Vec<u8>> {
        self.calls().into_iter().rev().find_map(|call| match call {
            BridgeCall::SetBye(bytes) => Some(bytes),
            _ => None,
        })
    }

    fn record(&self, call: BridgeCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl HostBridge for MemoryBridge {
    fn update_vals(&mut self, bytes: &[u8]) {
        self.record(BridgeCall::UpdateVals(bytes.to_vec()));
    }

    fn set_bye(&mut self, bytes: &[u8]) {
        self.record(BridgeCall::SetBye(bytes.to_vec()));
    }

    fn alert(&mut self, message: &str) {
        self.record(BridgeCall::Alert(message.to_string()));
    }
}

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Failed to open UDP socket: {0}")]
    Socket(#[from] std::io::Error),
    #[error("UDP sender task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Streams every packet as one datagram to a host. Packets are queued to a
/// sender task in call order; the bye pattern is queued when the bridge is
/// dropped.
#[derive(Debug)]
pub struct UdpBridge {
    packets: mpsc::UnboundedSender<Vec<u8>>,
    host: SocketAddr,
    bye: Option<Vec<u8>>,
}

/// The sender task behind a [`UdpBridge`]
#[derive(Debug)]
pub struct UdpLink {
    task: JoinHandle<usize>,
}

impl UdpLink {
    /// Waits until the bridge is dropped and every queued packet went out.
    /// Returns how many datagrams were sent.
    pub async fn closed(self) -> Result<usize, BridgeError> {
        Ok(self.task.await?)
    }
}

impl UdpBridge {
    pub async fn connect(
        local: SocketAddr,
        host: SocketAddr,
    ) -> Result<(Self, UdpLink), BridgeError> {
        let socket = UdpSocket::bind(local).await?;
        socket.connect(host).await?;
        info!("Streaming pad state from {} to {}", socket.local_addr()?, host);

        let (packets, queue) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_sender(socket, host, queue));
        let bridge = Self {
            packets,
            host,
            bye: None,
        };
        Ok((bridge, UdpLink { task }))
    }

    pub fn host(&self) -> SocketAddr {
        self.host
    }

    fn send(&self, bytes: &[u8]) {
        if self.packets.send(bytes.to_vec()).is_err() {
            warn!("UDP sender for {} is gone, dropped {} byte packet", self.host, bytes.len());
        }
    }
}

async fn run_sender(
    socket: UdpSocket,
    host: SocketAddr,
    mut queue: mpsc::UnboundedReceiver<Vec<u8>>,
) -> usize {
    let mut sent = 0;
    while let Some(packet) = queue.recv().await {
        match socket.send(&packet).await {
            Ok(_) => sent += 1,
            Err(e) => warn!("Failed to send packet to {}: {}", host, e),
        }
    }
    debug!("UDP sender for {} stopped after {} packets", host, sent);
    sent
}

impl HostBridge for UdpBridge {
    fn update_vals(&mut self, bytes: &[u8]) {
        self.send(bytes);
    }

    fn set_bye(&mut self, bytes: &[u8]) {
        self.bye = Some(bytes.to_vec());
    }

    fn alert(&mut self, message: &str) {
        warn!("Pad alert: {}", message);
    }
}

impl Drop for UdpBridge {
    fn drop(&mut self) {
        if let Some(bye) = self.bye.take() {
            debug!("Sending bye pattern to {}", self.host);
            self.send(&bye);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[test]
    fn memory_bridge_clones_share_record() {
        let bridge = MemoryBridge::new();
        let mut writer = bridge.clone();
        writer.set_bye(&[255, 0]);
        writer.update_vals(&[0, 1]);
        writer.alert("hello");

        assert_eq!(bridge.bye(), Some(vec![255, 0]));
        assert_eq!(bridge.last_update(), Some(vec![0, 1]));
        assert_eq!(bridge.alerts(), vec!["hello".to_string()]);
        assert_eq!(bridge.calls().len(), 3);
    }

    async fn recv_within(host: &UdpSocket, buf: &mut [u8]) -> usize {
        timeout(Duration::from_secs(2), host.recv(buf))
            .await
            .expect("no datagram within 2s")
            .unwrap()
    }

    #[tokio::test]
    async fn udp_bridge_streams_and_says_bye() {
        let host = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let host_addr = host.local_addr().unwrap();
        let (mut bridge, link) = UdpBridge::connect("127.0.0.1:0".parse().unwrap(), host_addr)
            .await
            .unwrap();

        // first packets go out right after connect
        bridge.set_bye(&[255, 0, 0]);
        bridge.update_vals(b"j1");
        bridge.update_vals(&[0, 0x40, 0]);
        drop(bridge);
        assert_eq!(link.closed().await.unwrap(), 3);

        let mut buf = [0u8; 16];
        let n = recv_within(&host, &mut buf).await;
        assert_eq!(&buf[..n], b"j1");
        let n = recv_within(&host, &mut buf).await;
        assert_eq!(&buf[..n], &[0, 0x40, 0]);
        let n = recv_within(&host, &mut buf).await;
        assert_eq!(&buf[..n], &[255, 0, 0]);
    }

    #[tokio::test]
    async fn udp_bridge_keeps_a_burst_in_order() {
        let host = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let host_addr = host.local_addr().unwrap();
        let (mut bridge, link) = UdpBridge::connect("127.0.0.1:0".parse().unwrap(), host_addr)
            .await
            .unwrap();

        for i in 0..64u8 {
            bridge.update_vals(&[0, i]);
        }
        drop(bridge);
        assert_eq!(link.closed().await.unwrap(), 64);

        let mut buf = [0u8; 4];
        for i in 0..64u8 {
            let n = recv_within(&host, &mut buf).await;
            assert_eq!(&buf[..n], &[0, i]);
        }
    }
}
