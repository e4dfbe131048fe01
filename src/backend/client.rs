use std::io;
use std::path::Path;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;

use super::protocol::{SyncRequest, SyncResponse};
use crate::form::Submission;

/// Client for the log store daemon's line-delimited JSON socket.
#[derive(Debug)]
pub struct BackendClient {
    reader: BufReader<UnixStream>,
}

impl BackendClient {
    /// Connect to the log store at the given socket path.
    pub async fn connect(socket_path: impl AsRef<Path>) -> io::Result<Self> {
        let stream = UnixStream::connect(socket_path).await?;
        Ok(Self {
            reader: BufReader::new(stream),
        })
    }

    /// Send a request envelope to the store.
    pub async fn send_request(&mut self, request: &SyncRequest) -> io::Result<()> {
        let mut json = serde_json::to_string(request)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        json.push('\n');

        self.reader.get_mut().write_all(json.as_bytes()).await?;
        self.reader.get_mut().flush().await?;

        Ok(())
    }

    /// Receive a response envelope from the store.
    pub async fn recv_response(&mut self) -> io::Result<SyncResponse> {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line).await?;

        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "log store closed the connection",
            ));
        }

        serde_json::from_str(&line).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Send a request and wait for its response (convenience method).
    pub async fn call(&mut self, request: &SyncRequest) -> io::Result<SyncResponse> {
        self.send_request(request).await?;
        self.recv_response().await
    }

    /// One-way full-page submission. No envelope comes back; the page
    /// (here: the invoking process) is replaced afterwards.
    pub async fn submit_page(&mut self, submission: &Submission) -> io::Result<()> {
        let mut json = serde_json::to_string(&submission.payload())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        json.push('\n');

        self.reader.get_mut().write_all(json.as_bytes()).await?;
        self.reader.get_mut().flush().await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::protocol::OpKind;
    use serde_json::json;
    use tempfile::TempDir;
    use tokio::net::UnixListener;
    use tokio::task::JoinHandle;

    fn temp_socket_path() -> (TempDir, std::path::PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.sock");
        (dir, path)
    }

    /// A stub store: accept one connection, read one request line,
    /// answer with the canned response.
    fn stub_store(
        path: &std::path::Path,
        response: SyncResponse,
    ) -> JoinHandle<SyncRequest> {
        let listener = UnixListener::bind(path).unwrap();
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut reader = BufReader::new(stream);
            let mut line = String::new();
            reader.read_line(&mut line).await.unwrap();
            let request: SyncRequest = serde_json::from_str(&line).unwrap();

            let mut json = serde_json::to_string(&response).unwrap();
            json.push('\n');
            reader.get_mut().write_all(json.as_bytes()).await.unwrap();
            reader.get_mut().flush().await.unwrap();
            request
        })
    }

    #[tokio::test]
    async fn call_round_trips_an_envelope() {
        let (_dir, path) = temp_socket_path();
        let canned = SyncResponse::ok(OpKind::ListLogs, 1, json!({"entries": [], "total": 0}));
        let server = stub_store(&path, canned.clone());

        let mut client = BackendClient::connect(&path).await.unwrap();
        let request = SyncRequest::new(OpKind::ListLogs, 1, "tok", json!({"offset": 0}));
        let response = client.call(&request).await.unwrap();

        assert_eq!(response, canned);
        let seen = server.await.unwrap();
        assert_eq!(seen, request);
    }

    #[tokio::test]
    async fn connect_fails_when_no_store_listens() {
        let (_dir, path) = temp_socket_path();
        let result = BackendClient::connect(&path).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn closed_store_yields_eof() {
        let (_dir, path) = temp_socket_path();
        let listener = UnixListener::bind(&path).unwrap();

        let mut client = BackendClient::connect(&path).await.unwrap();
        let (stream, _) = listener.accept().await.unwrap();
        drop(stream);
        drop(listener);

        let result = client.recv_response().await;
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::UnexpectedEof);
    }

    #[tokio::test]
    async fn submit_page_writes_one_line() {
        let (_dir, path) = temp_socket_path();
        let listener = UnixListener::bind(&path).unwrap();

        let mut client = BackendClient::connect(&path).await.unwrap();
        let (stream, _) = listener.accept().await.unwrap();

        let submission = Submission::DeleteFilter {
            name: "old_filter".to_string(),
        };
        client.submit_page(&submission).await.unwrap();

        let mut reader = BufReader::new(stream);
        let mut line = String::new();
        reader.read_line(&mut line).await.unwrap();
        let payload: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(payload["mode"], "delete_filter");
        assert_eq!(payload["name"], "old_filter");
    }
}
