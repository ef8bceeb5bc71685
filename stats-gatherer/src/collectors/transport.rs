use std::{
    future::Future,
    pin::Pin,
    time::Duration,
};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Issues one GET per call
pub trait Transport: Send + Sync {
    fn get<'a>(
        &'a self,
        url: &'a Url,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + Send + 'a>>;
}

impl Transport for reqwest::Client {
    fn get<'a>(
        &'a self,
        url: &'a Url,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + Send + 'a>> {
        Box::pin(async move {
            let response = reqwest::Client::get(self, url.clone())
                .timeout(timeout)
                .send()
                .await
                .map_err(|e| classify(e, timeout))?;

            let status = response.status().as_u16();
            let body = response.bytes().await.map_err(|e| match classify(e, timeout) {
                TransportError::Connection(cause) => TransportError::Body(cause),
                other => other,
            })?;

            Ok(HttpResponse {
                status,
                body: body.to_vec(),
            })
        })
    }
}

fn classify(err: reqwest::Error, timeout: Duration) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(timeout)
    } else if err.is_body() || err.is_decode() {
        TransportError::Body(err.to_string())
    } else {
        TransportError::Connection(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::{
        io::{
            Read,
            Write,
        },
        net::TcpListener,
        thread,
        time::Instant,
    };

    fn local_url(listener: &TcpListener) -> Url {
        let addr = listener.local_addr().unwrap();
        Url::parse(&format!("http://{addr}/xml/v3")).unwrap()
    }

    fn direct_client() -> reqwest::Client {
        reqwest::Client::builder().no_proxy().build().unwrap()
    }

    #[test]
    fn success_range() {
        let ok = |status| HttpResponse { status, body: vec![] }.is_success();
        assert!(ok(200));
        assert!(ok(204));
        assert!(!ok(199));
        assert!(!ok(301));
        assert!(!ok(404));
        assert!(!ok(503));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_connection_error() {
        let client = direct_client();
        // Nothing listens on the loopback discard port.
        let url = Url::parse("http://127.0.0.1:9/xml/v3").unwrap();

        let err = Transport::get(&client, &url, Duration::from_secs(2)).await.unwrap_err();
        assert!(matches!(err, TransportError::Connection(_) | TransportError::Timeout(_)));
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        // Accepted by the backlog, never answered.
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = local_url(&listener);
        let timeout = Duration::from_millis(300);

        let started = Instant::now();
        let err = Transport::get(&direct_client(), &url, timeout).await.unwrap_err();

        assert_eq!(err, TransportError::Timeout(timeout));
        assert!(started.elapsed() < Duration::from_secs(5));
        drop(listener);
    }

    #[tokio::test]
    async fn error_status_is_returned_as_a_response() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = local_url(&listener);
        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = [0u8; 1024];
            let _ = stream.read(&mut request).unwrap();
            stream
                .write_all(b"HTTP/1.1 404 Not Found\r\nContent-Length: 9\r\nConnection: close\r\n\r\nnot found")
                .unwrap();
        });

        let response = Transport::get(&direct_client(), &url, Duration::from_secs(5))
            .await
            .unwrap();
        server.join().unwrap();

        assert_eq!(response.status, 404);
        assert!(!response.is_success());
        assert_eq!(response.body, b"not found".to_vec());
    }
}
