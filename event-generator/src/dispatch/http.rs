use super::{event_headers, DispatchError, Dispatcher};
use async_trait::async_trait;
use common::EventDescriptor;
use std::time::Duration;
use tracing::debug;

/// Posts each event as an empty-bodied request with `X-Event-*` headers.
#[derive(Clone)]
pub struct HttpDispatcher {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpDispatcher {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, DispatchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Dispatcher for HttpDispatcher {
    async fn send(&self, event: &EventDescriptor) -> Result<(), DispatchError> {
        let mut request = self.client.post(&self.endpoint);
        for (name, value) in event_headers(event) {
            request = request.header(name, value);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DispatchError::Rejected {
                status: status.as_u16(),
            });
        }
        debug!("Event {} accepted with {}", event.id, status);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::EventCategory;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Accepts one connection, captures the request head and answers with `status_line`.
    async fn one_shot_server(status_line: &'static str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "{}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
                status_line
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = tx.send(String::from_utf8_lossy(&head).into_owned());
        });

        (format!("http://{}/event", addr), rx)
    }

    fn header_value<'a>(head: &'a str, name: &str) -> Option<&'a str> {
        head.lines().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim().eq_ignore_ascii_case(name).then(|| value.trim())
        })
    }

    #[tokio::test]
    async fn test_posts_event_headers() {
        let (endpoint, head_rx) = one_shot_server("HTTP/1.1 200 OK").await;
        let dispatcher = HttpDispatcher::new(endpoint, Duration::from_secs(10)).unwrap();
        let event = EventDescriptor::build(EventCategory::Transaction, 5, Utc::now()).unwrap();

        dispatcher.send(&event).await.unwrap();

        let head = head_rx.await.unwrap();
        assert!(head.starts_with("POST /event HTTP/1.1"), "{}", head);
        assert_eq!(header_value(&head, "x-event-type"), Some("transaction"));
        assert_eq!(header_value(&head, "x-event-urgency"), Some("5"));
        let id = event.id.to_string();
        assert_eq!(header_value(&head, "x-event-id"), Some(id.as_str()));
        let time = event.request_time();
        assert_eq!(header_value(&head, "x-event-request-time"), Some(time.as_str()));
        assert!(matches!(header_value(&head, "content-length"), None | Some("0")));
    }

    #[tokio::test]
    async fn test_non_success_status_is_reported() {
        let (endpoint, _head_rx) = one_shot_server("HTTP/1.1 503 Service Unavailable").await;
        let dispatcher = HttpDispatcher::new(endpoint, Duration::from_secs(10)).unwrap();
        let event = EventDescriptor::build(EventCategory::Query, 2, Utc::now()).unwrap();

        let err = dispatcher.send(&event).await.unwrap_err();
        assert!(matches!(err, DispatchError::Rejected { status: 503 }));
    }

    #[tokio::test]
    async fn test_refused_connection_is_an_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let dispatcher =
            HttpDispatcher::new(format!("http://{}/event", addr), Duration::from_secs(2)).unwrap();
        let event = EventDescriptor::build(EventCategory::Log, 1, Utc::now()).unwrap();

        let err = dispatcher.send(&event).await.unwrap_err();
        assert!(matches!(err, DispatchError::Transport(_)));
    }
}
