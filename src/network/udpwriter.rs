use crate::common::udpendpoint::UDPEndpoint;
use crate::tools::error::{FecSimError, Result};
use std::net::{IpAddr, SocketAddr, ToSocketAddrs, UdpSocket};

#[derive(Debug)]
/// UDP/IP writer connected to one destination
pub struct UdpWriter {
    sock: UdpSocket,
    addr: SocketAddr,
    joined: bool,
}

impl UdpWriter {
    /// Return a new UDP/IP writer sending to `endpoint`
    pub fn new(endpoint: &UDPEndpoint) -> Result<UdpWriter> {
        let destination = endpoint.destination();
        let addr = destination
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| FecSimError::invalid_input(format!("Can't resolve {}", destination)))?;

        let sock = UdpSocket::bind(endpoint.bind_address())?;
        sock.connect(addr)?;
        let mut writer = UdpWriter {
            sock,
            addr,
            joined: false,
        };

        // Sending does not require the membership, a failure is not fatal
        match writer.join_multicast() {
            Ok(joined) => writer.joined = joined,
            Err(e) => log::warn!("Fail to join multicast group {} {:?}", addr, e),
        }

        log::debug!(
            "UDP writer {:?} -> {}",
            writer.sock.local_addr().ok(),
            writer.addr
        );
        Ok(writer)
    }

    /// Destination of the writer
    pub fn destination(&self) -> SocketAddr {
        self.addr
    }

    /// Write a datagram to this socket
    pub fn write(&self, pkt: &[u8]) -> Result<usize> {
        let ret = self.sock.send(pkt)?;
        Ok(ret)
    }

    fn join_multicast(&self) -> Result<bool> {
        let ip_addr = self.addr.ip();
        if !ip_addr.is_multicast() {
            return Ok(false);
        }

        match &ip_addr {
            IpAddr::V4(addr) => {
                self.sock
                    .join_multicast_v4(addr, &std::net::Ipv4Addr::UNSPECIFIED)?;
            }
            IpAddr::V6(addr) => {
                self.sock.join_multicast_v6(addr, 0)?;
            }
        }
        Ok(true)
    }

    fn leave_multicast(&self) -> Result<()> {
        match &self.addr.ip() {
            IpAddr::V4(addr) => {
                self.sock
                    .leave_multicast_v4(addr, &std::net::Ipv4Addr::UNSPECIFIED)?;
            }
            IpAddr::V6(addr) => {
                self.sock.leave_multicast_v6(addr, 0)?;
            }
        }
        Ok(())
    }
}

impl Drop for UdpWriter {
    fn drop(&mut self) {
        if self.joined {
            log::info!("Leave multicast {}", self.addr);
            self.leave_multicast().ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::common::udpendpoint::UDPEndpoint;

    #[test]
    pub fn test_udp_writer() {
        crate::tests::init();
        let receiver = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
        let port = receiver.local_addr().unwrap().port();
        receiver
            .set_read_timeout(Some(std::time::Duration::from_secs(2)))
            .unwrap();

        let endpoint = UDPEndpoint::new(None, "127.0.0.1".to_owned(), port);
        let writer = super::UdpWriter::new(&endpoint).unwrap();
        assert_eq!(writer.write(&[0, 1, 2]).unwrap(), 3);

        let mut buf = [0u8; 16];
        let n = receiver.recv(&mut buf).unwrap();
        assert_eq!(&buf[..n], &[0, 1, 2]);
    }
}
