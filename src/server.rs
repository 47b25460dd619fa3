use std::io;
use std::net::{IpAddr, SocketAddr};

use tokio::net::TcpListener;
use tracing::warn;

/// Ports tried after the configured one before giving up.
pub const PORT_ATTEMPTS: u16 = 20;

/// Binds `host:port`, moving up one port at a time while the address is
/// taken. Returns the last bind error once every attempt has failed.
pub async fn bind_with_fallback(host: IpAddr, port: u16) -> io::Result<(TcpListener, SocketAddr)> {
    let mut last_err = None;

    for candidate in (0..=PORT_ATTEMPTS).map_while(|offset| port.checked_add(offset)) {
        let addr = SocketAddr::from((host, candidate));
        match TcpListener::bind(addr).await {
            Ok(listener) => {
                let bound = listener_addr(&listener, addr);
                return Ok((listener, bound));
            }
            Err(e) => {
                warn!(%addr, error = %e, "Port unavailable, trying next");
                last_err = Some(e);
            }
        }
    }

    Err(last_err.unwrap_or_else(|| io::Error::new(io::ErrorKind::AddrNotAvailable, "no port left to try")))
}

// Port 0 asks the OS to pick; report what it picked.
fn listener_addr(listener: &TcpListener, requested: SocketAddr) -> SocketAddr {
    listener.local_addr().unwrap_or(requested)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    #[tokio::test]
    async fn moves_past_a_taken_port() {
        let taken = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
        let port = taken.local_addr().unwrap().port();

        match bind_with_fallback(LOCALHOST, port).await {
            Ok((_listener, addr)) => {
                let offset = u32::from(addr.port()) - u32::from(port);
                assert!((1..=u32::from(PORT_ATTEMPTS)).contains(&offset), "{addr}");
            }
            // every following port happened to be busy too
            Err(e) => assert_eq!(e.kind(), io::ErrorKind::AddrInUse),
        }
    }

    #[tokio::test]
    async fn stops_at_the_top_of_the_port_range() {
        let taken = TcpListener::bind((LOCALHOST, u16::MAX)).await;
        if taken.is_err() {
            return;
        }
        let err = bind_with_fallback(LOCALHOST, u16::MAX).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AddrInUse);
    }
}
