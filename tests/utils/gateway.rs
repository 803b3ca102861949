/// Scripted in-memory provider gateway
///
/// Routes are keyed by the locator string `locate` produces, so tests can
/// script each step of each provider independently and count calls.
use animaid_lib::{
    AppError, AppResult, ContentKind, ContentProviderGateway, ProviderName, ProviderRequest,
    UnitLocator,
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    Fail(AppError),
    Delayed(Duration, Box<Reply>),
}

impl Reply {
    pub fn delayed(self, delay: Duration) -> Self {
        Reply::Delayed(delay, Box::new(self))
    }
}

#[derive(Default)]
pub struct ScriptedGateway {
    routes: Mutex<HashMap<String, Reply>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search_key(provider: &str, query: &str) -> String {
        format!("{}/search/{}", provider, query)
    }

    pub fn info_key(provider: &str, locator: &str) -> String {
        format!("{}/info/{}", provider, locator)
    }

    pub fn extract_key(provider: &str, unit: &str) -> String {
        format!("{}/extract/{}", provider, unit)
    }

    pub fn route(&self, key: impl Into<String>, reply: Reply) -> &Self {
        self.routes.lock().unwrap().insert(key.into(), reply);
        self
    }

    /// Number of fetches whose locator starts with `prefix`
    pub fn calls_to(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ContentProviderGateway for ScriptedGateway {
    fn locate(&self, provider: &ProviderName, _kind: ContentKind, request: &ProviderRequest) -> String {
        match request {
            ProviderRequest::Search { query } => Self::search_key(provider.as_str(), query),
            ProviderRequest::Info { locator } => Self::info_key(provider.as_str(), locator),
            ProviderRequest::Extract { unit } => match unit {
                UnitLocator::Path(path) => Self::extract_key(provider.as_str(), path),
                UnitLocator::Id(id) => Self::extract_key(provider.as_str(), id),
            },
        }
    }

    async fn fetch(
        &self,
        provider: &ProviderName,
        kind: ContentKind,
        request: &ProviderRequest,
    ) -> AppResult<Value> {
        let key = self.locate(provider, kind, request);
        self.calls.lock().unwrap().push(key.clone());

        let reply = self.routes.lock().unwrap().get(&key).cloned();
        let mut reply = match reply {
            Some(reply) => reply,
            None => return Err(AppError::NotFound(format!("no route for {}", key))),
        };

        loop {
            match reply {
                Reply::Json(value) => return Ok(value),
                Reply::Fail(error) => return Err(error),
                Reply::Delayed(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    reply = *inner;
                }
            }
        }
    }
}
