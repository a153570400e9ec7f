use std::net::{Ipv4Addr, SocketAddr, UdpSocket};

use thiserror::Error;

/// One datagram as delivered by the transport. Processed independently
/// of all others and discarded afterwards.
#[derive(Debug, Clone)]
pub struct Datagram {
    pub src: SocketAddr,
    pub data: Vec<u8>,
}

/// Blocking supplier of datagrams.
///
/// `Ok(None)` means the source is exhausted. A live UDP socket never
/// returns it; scripted sources in tests use it to end the bridge loop.
pub trait DatagramSource {
    fn next_datagram(&mut self) -> Result<Option<Datagram>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// UDP socket bound on all interfaces, receiving into a reusable buffer.
///
/// Payload beyond the buffer size is truncated by the transport layer.
/// The receive call blocks without a timeout.
pub struct UdpDatagramSource {
    socket: UdpSocket,
    buf: Vec<u8>,
}

impl UdpDatagramSource {
    pub fn bind(port: u16, buffer_size: usize) -> Result<Self, SourceError> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, port))?;
        Ok(Self {
            socket,
            buf: vec![0u8; buffer_size],
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, SourceError> {
        Ok(self.socket.local_addr()?)
    }
}

impl DatagramSource for UdpDatagramSource {
    fn next_datagram(&mut self) -> Result<Option<Datagram>, SourceError> {
        let (len, src) = self.socket.recv_from(&mut self.buf)?;
        Ok(Some(Datagram {
            src,
            data: self.buf[..len].to_vec(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::{DatagramSource, UdpDatagramSource};
    use std::net::UdpSocket;

    #[test]
    fn bind_and_receive_one_datagram() {
        let mut source = UdpDatagramSource::bind(0, 16).expect("bind");
        let addr = source.local_addr().expect("local addr");

        let sender = UdpSocket::bind("127.0.0.1:0").expect("sender bind");
        sender
            .send_to(&[0x90, 0x3C, 0x7F], ("127.0.0.1", addr.port()))
            .expect("send");

        let datagram = source
            .next_datagram()
            .expect("receive")
            .expect("datagram present");
        assert_eq!(datagram.data, vec![0x90, 0x3C, 0x7F]);
    }

    #[test]
    fn oversized_payload_is_truncated() {
        let mut source = UdpDatagramSource::bind(0, 4).expect("bind");
        let addr = source.local_addr().expect("local addr");

        let sender = UdpSocket::bind("127.0.0.1:0").expect("sender bind");
        sender
            .send_to(&[1, 2, 3, 4, 5, 6, 7, 8], ("127.0.0.1", addr.port()))
            .expect("send");

        let datagram = source
            .next_datagram()
            .expect("receive")
            .expect("datagram present");
        assert_eq!(datagram.data, vec![1, 2, 3, 4]);
    }
}
