//! The gateway: single point of contact with the GraphQL backend.
//!
//! Queries are served cache-first and deduplicated while in flight;
//! mutations always go to the network and never touch the cache. Cache
//! invalidation is the calling controller's job, via `refetch`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::future::{BoxFuture, Shared};
use futures_util::FutureExt;
use once_cell::sync::OnceCell;
use serde_json::Value;

use bookshelf_kernel::session::SessionStore;
use bookshelf_kernel::settings::Settings;

use crate::cache::DocumentCache;
use crate::error::OperationError;
use crate::operations::{Operation, OperationKind};
use crate::transport::{GraphqlRequest, GraphqlResponse, HttpTransport, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPolicy {
    #[default]
    CacheFirst,
    NetworkOnly,
}

type InflightFuture = Shared<BoxFuture<'static, Result<Value, OperationError>>>;

static GLOBAL: OnceCell<Arc<Gateway>> = OnceCell::new();

pub struct Gateway {
    transport: Arc<dyn Transport>,
    session: Arc<SessionStore>,
    cache: DocumentCache,
    inflight: Mutex<HashMap<String, InflightFuture>>,
}

impl Gateway {
    pub fn new(transport: Arc<dyn Transport>, session: Arc<SessionStore>) -> Self {
        Self {
            transport,
            session,
            cache: DocumentCache::new(),
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Configured HTTP gateway for the given settings.
    pub fn from_settings(
        settings: &Settings,
        session: Arc<SessionStore>,
    ) -> Result<Self, OperationError> {
        let transport = HttpTransport::new(
            &settings.client.endpoint,
            Duration::from_millis(settings.client.request_timeout_ms),
        )?;
        Ok(Self::new(Arc::new(transport), session))
    }

    /// Install the process-wide instance. The first install wins; later
    /// calls return the already-installed gateway.
    pub fn install(gateway: Gateway) -> Arc<Gateway> {
        GLOBAL.get_or_init(|| Arc::new(gateway)).clone()
    }

    pub fn global() -> Option<Arc<Gateway>> {
        GLOBAL.get().cloned()
    }

    pub fn cache(&self) -> &DocumentCache {
        &self.cache
    }

    /// Execute an operation. Queries read through the cache; mutations
    /// bypass cache and dedup entirely.
    pub async fn execute<O: Operation>(
        &self,
        variables: O::Variables,
    ) -> Result<O::Data, OperationError> {
        match O::KIND {
            OperationKind::Query => self.run_query::<O>(variables, FetchPolicy::CacheFirst).await,
            OperationKind::Mutation => self.run_mutation::<O>(variables).await,
        }
    }

    /// Re-issue a query against the network, refreshing the cache. Used
    /// after mutations and whenever list variables change.
    pub async fn refetch<O: Operation>(
        &self,
        variables: O::Variables,
    ) -> Result<O::Data, OperationError> {
        debug_assert!(O::KIND == OperationKind::Query, "refetch is for queries");
        self.run_query::<O>(variables, FetchPolicy::NetworkOnly).await
    }

    async fn run_query<O: Operation>(
        &self,
        variables: O::Variables,
        policy: FetchPolicy,
    ) -> Result<O::Data, OperationError> {
        let variables = encode_variables::<O>(&variables)?;
        let key = request_key(O::NAME, &variables);

        if policy == FetchPolicy::CacheFirst {
            if let Some(hit) = self.cache.read(&key) {
                tracing::debug!(operation = O::NAME, "serving query from cache");
                return decode::<O>(hit);
            }
        }

        // Identical in-flight queries share one request; the entry is
        // dropped once the request settles.
        let pending = {
            let mut inflight = self.inflight.lock().expect("inflight lock");
            match inflight.get(&key) {
                Some(pending) => pending.clone(),
                None => {
                    let request = GraphqlRequest {
                        operation_name: O::NAME,
                        query: O::DOCUMENT,
                        variables: variables.clone(),
                        token: self.session.token(),
                    };
                    let transport = Arc::clone(&self.transport);
                    let pending = async move { perform(transport, request).await }
                        .boxed()
                        .shared();
                    inflight.insert(key.clone(), pending.clone());
                    pending
                }
            }
        };

        let result = pending.await;
        self.inflight.lock().expect("inflight lock").remove(&key);

        let data = result?;
        self.cache.write(&key, &data);
        decode::<O>(data)
    }

    async fn run_mutation<O: Operation>(
        &self,
        variables: O::Variables,
    ) -> Result<O::Data, OperationError> {
        let variables = encode_variables::<O>(&variables)?;
        let request = GraphqlRequest {
            operation_name: O::NAME,
            query: O::DOCUMENT,
            variables,
            token: self.session.token(),
        };
        let data = perform(Arc::clone(&self.transport), request).await?;
        decode::<O>(data)
    }
}

async fn perform(
    transport: Arc<dyn Transport>,
    request: GraphqlRequest,
) -> Result<Value, OperationError> {
    let operation = request.operation_name;
    let response = transport.send(request).await?;
    resolve(operation, response)
}

fn resolve(operation: &str, response: GraphqlResponse) -> Result<Value, OperationError> {
    if let Some(error) = response.errors.into_iter().next() {
        let err = OperationError::from_server_message(error.message);
        tracing::warn!(operation, error = %err, "operation failed");
        return Err(err);
    }
    response
        .data
        .ok_or_else(|| OperationError::schema(operation, "response carried neither data nor errors"))
}

fn encode_variables<O: Operation>(variables: &O::Variables) -> Result<Value, OperationError> {
    serde_json::to_value(variables).map_err(|err| OperationError::schema(O::NAME, err.to_string()))
}

fn decode<O: Operation>(data: Value) -> Result<O::Data, OperationError> {
    serde_json::from_value(data).map_err(|err| OperationError::schema(O::NAME, err.to_string()))
}

fn request_key(name: &str, variables: &Value) -> String {
    format!("{name}:{variables}")
}
