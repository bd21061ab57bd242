//! Mock hosted-table server for testing
//!
//! Speaks just enough of the PostgREST dialect used by `RestRemote`:
//! - POST /rest/v1/{table} upserts the JSON body by `id`
//! - GET /rest/v1/{table}?select=*&userId=eq.{id} returns matching rows
//! - DELETE /rest/v1/{table}?id=eq.{id} removes a row
//!
//! Rows live in memory; requests without the expected `apikey` are refused.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use serde_json::Value as JsonValue;

type Tables = Arc<Mutex<HashMap<String, Vec<JsonValue>>>>;

/// Mock server configuration
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Key clients must send in the `apikey` header
    pub api_key: String,
    /// Answer every request with 503
    pub fail_all: bool,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            api_key: "test-anon-key".to_string(),
            fail_all: false,
        }
    }
}

pub struct MockRestServer {
    port: u16,
    running: Arc<AtomicBool>,
    tables: Tables,
    thread_handle: Option<thread::JoinHandle<()>>,
}

impl MockRestServer {
    /// Start on a random available port
    pub fn start(config: MockConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let tables: Tables = Arc::new(Mutex::new(HashMap::new()));

        // Non-blocking so the accept loop can notice shutdown
        listener.set_nonblocking(true)?;

        let running_clone = running.clone();
        let tables_clone = tables.clone();
        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        let cfg = config.clone();
                        let tables = tables_clone.clone();
                        thread::spawn(move || handle_connection(stream, &cfg, &tables));
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(std::time::Duration::from_millis(10));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port,
            running,
            tables,
            thread_handle: Some(thread_handle),
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Snapshot of one table's rows
    pub fn rows(&self, table: &str) -> Vec<JsonValue> {
        self.tables
            .lock()
            .map(|t| t.get(table).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockRestServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Read headers plus a Content-Length body
fn read_request(stream: &mut TcpStream) -> Option<(String, String)> {
    stream.set_nonblocking(false).ok()?;
    let mut data = Vec::new();
    let mut buffer = [0; 4096];

    loop {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buffer[..n]);

        let text = String::from_utf8_lossy(&data).to_string();
        if let Some(split) = text.find("\r\n\r\n") {
            let head = text[..split].to_string();
            let content_length = head
                .lines()
                .find_map(|l| {
                    let lower = l.to_lowercase();
                    lower
                        .strip_prefix("content-length:")
                        .and_then(|v| v.trim().parse::<usize>().ok())
                })
                .unwrap_or(0);
            let body_start = split + 4;
            if data.len() >= body_start + content_length {
                let body =
                    String::from_utf8_lossy(&data[body_start..body_start + content_length])
                        .to_string();
                return Some((head, body));
            }
        }
    }
    None
}

fn query_param<'a>(query: &'a str, key: &str) -> Option<&'a str> {
    query.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k == key).then_some(v)
    })
}

fn handle_connection(mut stream: TcpStream, config: &MockConfig, tables: &Tables) {
    let Some((head, body)) = read_request(&mut stream) else {
        return;
    };

    let first_line = head.lines().next().unwrap_or("");
    let parts: Vec<&str> = first_line.split_whitespace().collect();
    if parts.len() < 2 {
        send_response(&mut stream, 400, "Bad Request", r#"{"message":"Invalid request"}"#);
        return;
    }

    if config.fail_all {
        send_response(&mut stream, 503, "Service Unavailable", r#"{"message":"down"}"#);
        return;
    }

    let expected = format!("apikey: {}", config.api_key.to_lowercase());
    if !head.to_lowercase().lines().any(|l| l.trim() == expected) {
        send_response(&mut stream, 401, "Unauthorized", r#"{"message":"Invalid API key"}"#);
        return;
    }

    let method = parts[0];
    let (path, query) = parts[1].split_once('?').unwrap_or((parts[1], ""));
    let Some(table) = path.strip_prefix("/rest/v1/") else {
        send_response(&mut stream, 404, "Not Found", r#"{"message":"Unknown path"}"#);
        return;
    };

    let Ok(mut tables) = tables.lock() else {
        send_response(&mut stream, 500, "Internal Server Error", "{}");
        return;
    };
    let rows = tables.entry(table.to_string()).or_default();

    match method {
        "POST" => match serde_json::from_str::<JsonValue>(&body) {
            Ok(doc) => {
                rows.retain(|r| r["id"] != doc["id"]);
                rows.push(doc);
                send_response(&mut stream, 201, "Created", "");
            }
            Err(_) => send_response(&mut stream, 400, "Bad Request", r#"{"message":"bad json"}"#),
        },
        "GET" => {
            let user = query_param(query, "userId")
                .and_then(|v| v.strip_prefix("eq."))
                .unwrap_or("");
            let matching: Vec<&JsonValue> = rows.iter().filter(|r| r["userId"] == user).collect();
            let json = serde_json::to_string(&matching).unwrap_or_else(|_| "[]".to_string());
            send_response(&mut stream, 200, "OK", &json);
        }
        "DELETE" => {
            let id = query_param(query, "id")
                .and_then(|v| v.strip_prefix("eq."))
                .unwrap_or("");
            rows.retain(|r| r["id"] != id);
            send_response(&mut stream, 204, "No Content", "");
        }
        _ => send_response(&mut stream, 405, "Method Not Allowed", "{}"),
    }
}

fn send_response(stream: &mut TcpStream, status: u16, status_text: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        status_text,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::RestRemote;
    use crate::domain::result::Error;
    use crate::domain::Table;
    use crate::ports::RemoteTable;
    use serde_json::json;
    use std::time::Duration;

    fn client(server: &MockRestServer, key: &str) -> RestRemote {
        RestRemote::new(&server.base_url(), key, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_upsert_select_delete() {
        let server = MockRestServer::start(MockConfig::default()).unwrap();
        let remote = client(&server, "test-anon-key");

        let doc = json!({ "id": "exp_1", "userId": "tg_7", "amount": "450", "date": "2024-03-01" });
        remote.upsert(Table::Expenses, &doc).await.unwrap();
        remote
            .upsert(Table::Expenses, &json!({ "id": "exp_1", "userId": "tg_7", "amount": "500" }))
            .await
            .unwrap();
        remote
            .upsert(Table::Expenses, &json!({ "id": "exp_2", "userId": "tg_8", "amount": "1" }))
            .await
            .unwrap();

        let rows = remote.select_by_user(Table::Expenses, "tg_7").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["amount"], "500");
        assert_eq!(server.rows("expenses").len(), 2);

        remote.delete(Table::Expenses, "exp_1").await.unwrap();
        assert!(remote.select_by_user(Table::Expenses, "tg_7").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_wrong_key_is_remote_error() {
        let server = MockRestServer::start(MockConfig::default()).unwrap();
        let remote = client(&server, "wrong-key");

        let result = remote.select_by_user(Table::Sales, "u").await;
        assert!(matches!(result, Err(Error::Remote(_))));
    }

    #[tokio::test]
    async fn test_server_failure_is_remote_error() {
        let server = MockRestServer::start(MockConfig {
            fail_all: true,
            ..MockConfig::default()
        })
        .unwrap();
        let remote = client(&server, "test-anon-key");

        let result = remote.upsert(Table::Income, &json!({ "id": "i", "userId": "u" })).await;
        assert!(matches!(result, Err(Error::Remote(_))));
        assert!(server.rows("income").is_empty());
    }
}
