//! Blocking HTTP transport and a scripted stand-in.

use std::collections::VecDeque;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use crate::error::TransportError;

/// Status and body of an HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The two calls a grid makes. Paths are relative to the server root.
pub trait Transport {
    fn get(&mut self, path: &str) -> Result<Response, TransportError>;

    fn post_json(&mut self, path: &str, body: &str) -> Result<Response, TransportError>;
}

/// Path of the fragment for a new dynamic row.
pub fn row_fragment_path(endpoint: &str, code: &str, index: grid_model::RowIndex) -> String {
    let base = endpoint.trim_end_matches('/');
    format!("{base}/{code}/{index}")
}

pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(concat!("grid-runtime/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| TransportError::Request(err.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn finish(response: reqwest::blocking::Response) -> Result<Response, TransportError> {
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|err| TransportError::Network(err.to_string()))?;
        debug!(status, bytes = body.len(), "response received");
        Ok(Response { status, body })
    }
}

impl Transport for HttpTransport {
    fn get(&mut self, path: &str) -> Result<Response, TransportError> {
        let url = self.url(path);
        debug!(%url, "GET");
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|err| TransportError::Network(err.to_string()))?;
        Self::finish(response)
    }

    fn post_json(&mut self, path: &str, body: &str) -> Result<Response, TransportError> {
        let url = self.url(path);
        debug!(%url, bytes = body.len(), "POST");
        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_string())
            .send()
            .map_err(|err| TransportError::Network(err.to_string()))?;
        Self::finish(response)
    }
}

/// A request seen by [`ScriptedTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: &'static str,
    pub path: String,
    pub body: Option<String>,
}

/// Replays queued replies in order and records every request.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    replies: VecDeque<Result<Response, TransportError>>,
    pub requests: Vec<Request>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, status: u16, body: impl Into<String>) -> Self {
        self.push_reply(status, body);
        self
    }

    pub fn push_reply(&mut self, status: u16, body: impl Into<String>) {
        self.replies.push_back(Ok(Response::new(status, body)));
    }

    pub fn push_failure(&mut self, message: impl Into<String>) {
        self.replies
            .push_back(Err(TransportError::Network(message.into())));
    }

    pub fn posts(&self) -> impl Iterator<Item = &Request> {
        self.requests.iter().filter(|request| request.method == "POST")
    }

    fn next(&mut self, request: Request) -> Result<Response, TransportError> {
        self.requests.push(request);
        self.replies
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Network("no scripted reply".to_string())))
    }
}

impl Transport for ScriptedTransport {
    fn get(&mut self, path: &str) -> Result<Response, TransportError> {
        self.next(Request {
            method: "GET",
            path: path.to_string(),
            body: None,
        })
    }

    fn post_json(&mut self, path: &str, body: &str) -> Result<Response, TransportError> {
        self.next(Request {
            method: "POST",
            path: path.to_string(),
            body: Some(body.to_string()),
        })
    }
}
