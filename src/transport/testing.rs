//! Scripted [`HttpClient`] for unit tests

use crate::transport::client::{HttpClient, HttpRequest, HttpResponse};
use crate::ScrapeError;
use async_trait::async_trait;
use std::sync::Mutex;

type Script = dyn Fn(&HttpRequest) -> Result<(u16, String), ScrapeError> + Send + Sync;

/// Answers every request from a closure and records what was sent
pub struct ScriptedClient {
    script: Box<Script>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedClient {
    pub fn new<F>(script: F) -> Self
    where
        F: Fn(&HttpRequest) -> Result<(u16, String), ScrapeError> + Send + Sync + 'static,
    {
        Self {
            script: Box::new(script),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpClient for ScriptedClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ScrapeError> {
        let outcome = (self.script)(&request);
        self.requests.lock().unwrap().push(request);
        outcome.map(|(status, body)| HttpResponse { status, body })
    }
}
