//! Listener implementation for the HTTP endpoint.

use std::future::Future;
use std::net::{SocketAddr, TcpListener, ToSocketAddrs};

use tracing::info;

use super::{LISTENER_TARGET, ListenerError};

/// Listener bound to a TCP address.
#[derive(Debug)]
pub(crate) struct SocketListener {
    addr: SocketAddr,
    listener: TcpListener,
}

impl SocketListener {
    pub(crate) fn bind(host: &str, port: u16) -> Result<Self, ListenerError> {
        let listener = bind_tcp(host, port)?;
        let addr = listener
            .local_addr()
            .map_err(|source| ListenerError::Resolve {
                host: host.to_owned(),
                port,
                source,
            })?;
        Ok(Self { addr, listener })
    }

    #[cfg(test)]
    pub(crate) fn local_addr(&self) -> Option<SocketAddr> {
        Some(self.addr)
    }

    /// Serves `app` on a new multi-threaded runtime until `shutdown`
    /// resolves, then waits for in-flight requests to finish.
    ///
    /// The runtime is created here rather than earlier because its worker
    /// threads would not survive the fork that detaches the daemon.
    pub(crate) fn serve<F>(self, app: axum::Router, shutdown: F) -> Result<(), ListenerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Self { addr, listener } = self;
        listener
            .set_nonblocking(true)
            .map_err(|source| ListenerError::NonBlocking { source })?;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|source| ListenerError::Runtime { source })?;
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener)
                .map_err(|source| ListenerError::Register { source })?;
            info!(
                target: LISTENER_TARGET,
                %addr,
                "socket listener active"
            );
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown)
                .await
                .map_err(|source| ListenerError::Serve { source })
        })
    }
}

fn bind_tcp(host: &str, port: u16) -> Result<TcpListener, ListenerError> {
    let mut addrs = (host, port)
        .to_socket_addrs()
        .map_err(|source| ListenerError::Resolve {
            host: host.to_owned(),
            port,
            source,
        })?;
    let addr = addrs
        .find(|addr| matches!(addr, SocketAddr::V4(_) | SocketAddr::V6(_)))
        .ok_or_else(|| ListenerError::ResolveEmpty {
            host: host.to_owned(),
            port,
        })?;
    TcpListener::bind(addr).map_err(|source| ListenerError::BindTcp { addr, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;
    use std::io::{Read, Write};
    use std::net::TcpStream;
    use std::thread;
    use std::time::Duration;
    use tokio::sync::oneshot;

    #[test]
    fn serves_until_shutdown_resolves() {
        let listener = SocketListener::bind("127.0.0.1", 0).expect("bind tcp listener");
        let addr = listener.local_addr().expect("local address");
        let app = axum::Router::new().route("/", get(|| async { "pong" }));
        let (stop, stopped) = oneshot::channel::<()>();
        let server = thread::spawn(move || {
            listener.serve(app, async move {
                let _ = stopped.await;
            })
        });

        let mut stream = TcpStream::connect(addr).expect("connect");
        stream
            .set_read_timeout(Some(Duration::from_secs(2)))
            .expect("set read timeout");
        stream
            .write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .expect("send request");
        let mut response = String::new();
        stream.read_to_string(&mut response).expect("read response");
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"), "got {response:?}");
        assert!(response.ends_with("pong"));

        stop.send(()).expect("server still running");
        server
            .join()
            .expect("server thread panicked")
            .expect("server should stop cleanly");
    }

    #[test]
    fn binding_an_occupied_port_fails() {
        let first = SocketListener::bind("127.0.0.1", 0).expect("bind first listener");
        let port = first.local_addr().expect("local address").port();

        let error = SocketListener::bind("127.0.0.1", port).expect_err("second bind must fail");
        assert!(matches!(error, ListenerError::BindTcp { .. }));
    }
}
