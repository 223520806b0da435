//! Connection setup: DNS -> TCP -> TLS.

use crate::base::context::IoResultExt;
use crate::base::neterror::NetError;
use crate::socket::stream::BoxedSocket;
use boring::ssl::{SslConnector, SslMethod};
use tokio::net::TcpStream;
use url::Url;

/// ALPN list on the wire: only HTTP/1.1 is spoken.
const ALPN_HTTP11: &[u8] = b"\x08http/1.1";

/// Opens one connection for one request.
pub struct ConnectJob;

impl ConnectJob {
    pub async fn connect(url: &Url) -> Result<BoxedSocket, NetError> {
        let secure = match url.scheme() {
            "http" => false,
            "https" => true,
            _ => return Err(NetError::UnknownUrlScheme),
        };
        let host = url.host_str().ok_or(NetError::InvalidUrl)?;
        let port = url.port_or_known_default().ok_or(NetError::InvalidUrl)?;

        // 1. DNS Resolution
        let addrs: Vec<_> = tokio::net::lookup_host((host, port))
            .await
            .dns_context(host)?
            .collect();
        if addrs.is_empty() {
            return Err(NetError::NameNotResolved);
        }

        // 2. TCP Connect, first address that answers
        let mut last_err = NetError::ConnectionFailed;
        let mut stream = None;
        for addr in addrs {
            match TcpStream::connect(addr).await.connection_context(host, port) {
                Ok(s) => {
                    stream = Some(s);
                    break;
                }
                Err(e) => last_err = e,
            }
        }
        let stream = stream.ok_or(last_err)?;

        if !secure {
            return Ok(BoxedSocket::tcp(stream));
        }

        // 3. SSL Handshake
        let mut builder =
            SslConnector::builder(SslMethod::tls()).map_err(|_| NetError::SslProtocolError)?;
        builder
            .set_alpn_protos(ALPN_HTTP11)
            .map_err(|_| NetError::SslProtocolError)?;
        let config = builder
            .build()
            .configure()
            .map_err(|_| NetError::SslProtocolError)?;

        let tls_stream = tokio_boring::connect(config, host, stream).await.map_err(|e| {
            tracing::debug!(host = %host, error = ?e, "TLS handshake failed");
            NetError::SslProtocolError
        })?;

        Ok(BoxedSocket::tls(tls_stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejects_unknown_scheme() {
        let url = Url::parse("ftp://example.com/file").unwrap();
        let err = ConnectJob::connect(&url).await.err();
        assert_eq!(err, Some(NetError::UnknownUrlScheme));
    }

    #[tokio::test]
    async fn test_plain_tcp_to_local_listener() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let accept = tokio::spawn(async move { listener.accept().await.map(|_| ()) });

        let url = Url::parse(&format!("http://127.0.0.1:{}/", port)).unwrap();
        let socket = ConnectJob::connect(&url).await.unwrap();
        assert!(!socket.is_secure());
        accept.await.unwrap().unwrap();
    }
}
