#![allow(dead_code)]

use gapi::errors::ToolError;
use gapi::services::logger::Logger;
use gapi::services::token::{StaticTokenProvider, TokenProvider};
use gapi::services::transport::{HttpResponse, ResolvedRequest, Transport};
use gapi::ApiManager;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub static ENV_LOCK: Lazy<tokio::sync::Mutex<()>> = Lazy::new(|| tokio::sync::Mutex::new(()));

pub const INDEX_URL: &str = "https://discovery.test/discovery/v1/apis";
pub const DRIVE_DOC_URL: &str = "https://discovery.test/drive/v3/rest";
pub const DRIVE_BASE_URL: &str = "https://www.googleapis.com/drive/v3/";

/// Replays queued responses by URL prefix and records every request it sees.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<Vec<(String, VecDeque<HttpResponse>)>>,
    requests: Mutex<Vec<ResolvedRequest>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queues `response` for the next request whose URL starts with `prefix`.
    pub fn push(&self, prefix: &str, response: HttpResponse) {
        let mut routes = self.routes.lock().unwrap();
        match routes.iter_mut().find(|(p, _)| p == prefix) {
            Some((_, queue)) => queue.push_back(response),
            None => routes.push((prefix.to_string(), VecDeque::from([response]))),
        }
    }

    pub fn push_json(&self, prefix: &str, status: u16, body: &Value) {
        self.push(prefix, HttpResponse::new(status, body.to_string()));
    }

    pub fn requests(&self) -> Vec<ResolvedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests sent to the API itself, excluding discovery traffic.
    pub fn api_requests(&self) -> Vec<ResolvedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.url.starts_with(DRIVE_BASE_URL))
            .collect()
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    async fn fetch(&self, request: &ResolvedRequest) -> Result<HttpResponse, ToolError> {
        self.requests.lock().unwrap().push(request.clone());
        let mut routes = self.routes.lock().unwrap();
        let next = routes
            .iter_mut()
            .filter(|(prefix, _)| request.url.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .and_then(|(_, queue)| queue.pop_front());
        next.ok_or_else(|| ToolError::transport(format!("no response queued for {}", request.url)))
    }
}

/// Counts calls and always fails.
#[derive(Default)]
pub struct FailingTokenProvider {
    pub calls: AtomicUsize,
}

impl FailingTokenProvider {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl TokenProvider for FailingTokenProvider {
    async fn access_token(&self) -> Result<String, ToolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ToolError::transport("no token available"))
    }
}

pub fn drive_index() -> Value {
    serde_json::json!({
        "kind": "discovery#directoryList",
        "items": [
            {
                "name": "drive",
                "version": "v2",
                "title": "Google Drive API",
                "discoveryRestUrl": "https://discovery.test/drive/v2/rest",
                "documentationLink": "https://developers.google.com/drive/",
                "preferred": false
            },
            {
                "name": "drive",
                "version": "v3",
                "title": "Google Drive API",
                "discoveryRestUrl": DRIVE_DOC_URL,
                "documentationLink": "https://developers.google.com/drive/",
                "preferred": true
            }
        ]
    })
}

pub fn drive_document() -> Value {
    serde_json::json!({
        "kind": "discovery#restDescription",
        "baseUrl": DRIVE_BASE_URL,
        "resources": {
            "files": {
                "methods": {
                    "list": {
                        "id": "drive.files.list",
                        "httpMethod": "GET",
                        "path": "files",
                        "scopes": [
                            "https://www.googleapis.com/auth/drive",
                            "https://www.googleapis.com/auth/drive.readonly"
                        ],
                        "description": "Lists the user's files.",
                        "parameters": {
                            "pageSize": {"type": "integer", "location": "query", "maximum": "1000"},
                            "pageToken": {"type": "string", "location": "query"},
                            "q": {"type": "string", "location": "query"}
                        }
                    },
                    "get": {
                        "id": "drive.files.get",
                        "httpMethod": "GET",
                        "path": "files/{fileId}",
                        "scopes": ["https://www.googleapis.com/auth/drive"],
                        "description": "Gets a file's metadata or content by ID.",
                        "parameters": {
                            "fileId": {"type": "string", "location": "path", "required": true}
                        }
                    },
                    "create": {
                        "id": "drive.files.create",
                        "httpMethod": "POST",
                        "path": "files",
                        "scopes": ["https://www.googleapis.com/auth/drive.file"],
                        "description": "Creates a file."
                    }
                }
            },
            "changes": {
                "methods": {
                    "list": {
                        "id": "drive.changes.list",
                        "httpMethod": "GET",
                        "path": "changes",
                        "scopes": ["https://www.googleapis.com/auth/drive"],
                        "description": "Lists the changes for a user.",
                        "parameters": {
                            "pageSize": {"type": "integer", "location": "query"},
                            "pageToken": {"type": "string", "location": "query"}
                        }
                    }
                }
            },
            "permissions": {
                "resources": {
                    "nested": {}
                }
            }
        }
    })
}

/// Transport primed with the drive discovery index and document.
pub fn drive_transport() -> Arc<MockTransport> {
    let transport = MockTransport::new();
    transport.push_json(INDEX_URL, 200, &drive_index());
    transport.push_json(DRIVE_DOC_URL, 200, &drive_document());
    transport
}

pub fn manager(
    logger: Logger,
    transport: Arc<MockTransport>,
    token_provider: Arc<dyn TokenProvider>,
) -> ApiManager {
    ApiManager::new(logger, transport, token_provider).with_discovery_url(INDEX_URL)
}

pub fn static_token(token: &str) -> Arc<dyn TokenProvider> {
    Arc::new(StaticTokenProvider::new(token))
}

pub fn query(value: Value) -> serde_json::Map<String, Value> {
    value.as_object().cloned().unwrap()
}
