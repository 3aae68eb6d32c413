use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use async_trait::async_trait;
use rosc::{OscMessage, OscPacket};
use tokio::net::UdpSocket;

use crate::error::BridgeResult;

/// Subscriber for decoded OSC messages on one address.
#[async_trait]
pub trait OscHandler: Send + Sync {
    async fn handle(&self, message: OscMessage);
}

/// UDP listener that decodes incoming OSC packets and hands matching
/// messages to their subscribers.
pub struct OscListener {
    addr: SocketAddr,
    subscriptions: Vec<(String, Arc<dyn OscHandler>)>,
}

impl OscListener {
    #[must_use]
    pub fn new(host: Ipv4Addr, port: u16) -> Self {
        Self {
            addr: SocketAddr::new(host.into(), port),
            subscriptions: vec![],
        }
    }

    /// Register a handler for one OSC address. Must be called before
    /// [`Self::run`]; the subscription set is fixed while listening.
    pub fn subscribe(&mut self, address: impl Into<String>, handler: Arc<dyn OscHandler>) {
        self.subscriptions.push((address.into(), handler));
    }

    pub async fn run(self) -> BridgeResult<()> {
        let socket = UdpSocket::bind(self.addr).await?;
        log::info!("OSC socket open on {}", self.addr);

        let mut buf = [0u8; rosc::decoder::MTU];

        loop {
            let len = match socket.recv_from(&mut buf).await {
                Ok((len, _peer)) => len,
                Err(err) => {
                    log::error!("OSC socket error: {err}");
                    continue;
                }
            };

            match rosc::decoder::decode_udp(&buf[..len]) {
                Ok((_rest, packet)) => self.dispatch(packet),
                Err(err) => log::warn!("Dropping malformed OSC packet: {err:?}"),
            }
        }
    }

    /// Fan out one decoded packet. Handlers run as independent tasks, so
    /// a slow network call never blocks the receive loop, and two rapid
    /// events may overlap.
    fn dispatch(&self, packet: OscPacket) {
        match packet {
            OscPacket::Message(message) => {
                for (address, handler) in &self.subscriptions {
                    if message.addr == *address {
                        let handler = Arc::clone(handler);
                        let message = message.clone();
                        tokio::spawn(async move {
                            handler.handle(message).await;
                        });
                    }
                }
            }
            OscPacket::Bundle(bundle) => {
                for packet in bundle.content {
                    self.dispatch(packet);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rosc::{OscBundle, OscTime, OscType};
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    use super::*;

    struct Probe {
        tx: mpsc::UnboundedSender<OscMessage>,
    }

    #[async_trait]
    impl OscHandler for Probe {
        async fn handle(&self, message: OscMessage) {
            let _ = self.tx.send(message);
        }
    }

    fn listener_with_probe(address: &str) -> (OscListener, mpsc::UnboundedReceiver<OscMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut listener = OscListener::new(Ipv4Addr::LOCALHOST, 0);
        listener.subscribe(address, Arc::new(Probe { tx }));
        (listener, rx)
    }

    fn message(addr: &str, args: Vec<OscType>) -> OscMessage {
        OscMessage {
            addr: addr.to_string(),
            args,
        }
    }

    #[tokio::test]
    async fn matching_message_reaches_subscriber() {
        let (listener, mut rx) = listener_with_probe("/avatar/parameters/Sleep");

        listener.dispatch(OscPacket::Message(message(
            "/avatar/parameters/Sleep",
            vec![OscType::Bool(true)],
        )));

        let received = timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(received.args, vec![OscType::Bool(true)]);
    }

    #[tokio::test]
    async fn other_addresses_are_ignored() {
        let (listener, mut rx) = listener_with_probe("/avatar/parameters/Sleep");

        listener.dispatch(OscPacket::Message(message(
            "/avatar/parameters/Other",
            vec![OscType::Bool(true)],
        )));

        assert!(timeout(Duration::from_millis(50), rx.recv()).await.is_err());
    }

    #[tokio::test]
    async fn bundles_are_unpacked_recursively() {
        let (listener, mut rx) = listener_with_probe("/avatar/parameters/Sleep");

        let inner = OscPacket::Message(message(
            "/avatar/parameters/Sleep",
            vec![OscType::Bool(false)],
        ));
        let bundle = OscPacket::Bundle(OscBundle {
            timetag: OscTime::from((0, 0)),
            content: vec![OscPacket::Bundle(OscBundle {
                timetag: OscTime::from((0, 0)),
                content: vec![inner],
            })],
        });

        listener.dispatch(bundle);

        let received = timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(received.args, vec![OscType::Bool(false)]);
    }
}
