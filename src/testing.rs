//! In-memory Sheets and Drive services, plus a canned-response HTTP stub,
//! for unit tests.

use std::collections::{HashMap, HashSet};
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::google_api::drive::{DriveService, Permission};
use crate::google_api::sheets::{SheetGrid, SheetsService};
use crate::google_api::GoogleApiError;

#[derive(Default)]
pub struct FakeSheets {
    pub grid: SheetGrid,
    pub fail_batch: bool,
    batches: Mutex<Vec<(String, Vec<Value>)>>,
}

impl FakeSheets {
    pub fn with_grid(grid: SheetGrid) -> Self {
        Self {
            grid,
            ..Default::default()
        }
    }

    pub fn batches(&self) -> Vec<(String, Vec<Value>)> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl SheetsService for FakeSheets {
    async fn get_grid(&self, _spreadsheet_id: &str) -> Result<SheetGrid, GoogleApiError> {
        Ok(self.grid.clone())
    }

    async fn batch_update(
        &self,
        spreadsheet_id: &str,
        requests: Vec<Value>,
    ) -> Result<(), GoogleApiError> {
        if self.fail_batch {
            return Err(GoogleApiError::ApiError {
                status: 400,
                message: "Invalid requests[0]".to_string(),
            });
        }
        self.batches
            .lock()
            .unwrap()
            .push((spreadsheet_id.to_string(), requests));
        Ok(())
    }
}

/// Drive fake keyed by file id. Files listed in `broken` fail every call.
#[derive(Default)]
pub struct FakeDrive {
    permissions: Mutex<HashMap<String, Vec<Permission>>>,
    broken: HashSet<String>,
    deletes: Mutex<Vec<(String, String)>>,
    lists: Mutex<Vec<String>>,
}

impl FakeDrive {
    pub fn share(self, file_id: &str, permission_id: &str, email: &str) -> Self {
        self.permissions
            .lock()
            .unwrap()
            .entry(file_id.to_string())
            .or_default()
            .push(Permission {
                id: permission_id.to_string(),
                email_address: Some(email.to_string()),
            });
        self
    }

    pub fn broken(mut self, file_id: &str) -> Self {
        self.broken.insert(file_id.to_string());
        self
    }

    pub fn deletes(&self) -> Vec<(String, String)> {
        self.deletes.lock().unwrap().clone()
    }

    pub fn lists(&self) -> Vec<String> {
        self.lists.lock().unwrap().clone()
    }

    pub fn is_shared(&self, file_id: &str, email: &str) -> bool {
        self.permissions
            .lock()
            .unwrap()
            .get(file_id)
            .is_some_and(|perms| {
                perms
                    .iter()
                    .any(|p| p.email_address.as_deref() == Some(email))
            })
    }
}

#[async_trait]
impl DriveService for FakeDrive {
    async fn list_permissions(&self, file_id: &str) -> Result<Vec<Permission>, GoogleApiError> {
        self.lists.lock().unwrap().push(file_id.to_string());
        if self.broken.contains(file_id) {
            return Err(GoogleApiError::ApiError {
                status: 404,
                message: format!("File not found: {}", file_id),
            });
        }
        Ok(self
            .permissions
            .lock()
            .unwrap()
            .get(file_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn delete_permission(
        &self,
        file_id: &str,
        permission_id: &str,
    ) -> Result<(), GoogleApiError> {
        self.deletes
            .lock()
            .unwrap()
            .push((file_id.to_string(), permission_id.to_string()));
        if let Some(perms) = self.permissions.lock().unwrap().get_mut(file_id) {
            perms.retain(|p| p.id != permission_id);
        }
        Ok(())
    }
}

/// One-shot HTTP server on 127.0.0.1 that answers each connection with the
/// next canned `(status, body)` and records the request line it received.
///
/// Only suitable for body-less requests (GET/DELETE): the request body is
/// never read.
pub struct StubServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    pub fn start(responses: Vec<(u16, &str)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}/", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));

        let responses: Vec<(u16, String)> = responses
            .into_iter()
            .map(|(status, body)| (status, body.to_string()))
            .collect();
        let seen = requests.clone();
        std::thread::spawn(move || {
            for (status, body) in responses {
                let Ok((mut stream, _)) = listener.accept() else {
                    return;
                };

                let mut buf: Vec<u8> = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut chunk) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }
                let request_line = String::from_utf8_lossy(&buf)
                    .lines()
                    .next()
                    .unwrap_or_default()
                    .to_string();
                seen.lock().unwrap().push(request_line);

                let response = format!(
                    "HTTP/1.1 {} STUB\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes());
                let _ = stream.flush();
            }
        });

        Self { base_url, requests }
    }

    /// Request lines (`GET /path?query HTTP/1.1`) in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}
