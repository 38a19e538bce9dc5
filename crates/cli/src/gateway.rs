//! Façade over the worker bridges, the result cache and the login flow

use crate::service_error::ServiceError;
use crawlgate_bridge::{
    BridgeFailure, BridgeOutcome, BridgeRequest, DecodeMode, ProcessBridge, SystemWorkerExecutor, WorkerExecutor,
};
use crawlgate_cache::{PageView, ResultCache, ResultToken};
use crawlgate_config::{GatewayConfig, Workload};
use crawlgate_login::{
    poll_until_terminal, read_persisted_credentials, Credentials, FailureReason, LoginChallenge, LoginError,
    LoginFlow, LoginSession, LoginStatus,
};
use crawlgate_utils::{DiagnosticRecord, ErrorLog};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// First page of a freshly cached result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkQuery {
    pub token: ResultToken,
    pub page: PageView,
}

/// Everything a front end needs to serve workers' results.
///
/// Cloning is cheap; clones share the cache, the error log and the
/// executor.
#[derive(Clone)]
pub struct Gateway {
    config: Arc<GatewayConfig>,
    query: ProcessBridge,
    search: ProcessBridge,
    login_bridge: ProcessBridge,
    login: LoginFlow,
    cache: ResultCache,
    error_log: ErrorLog,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("config", &self.config)
            .field("cached_results", &self.cache.len())
            .finish_non_exhaustive()
    }
}

impl Gateway {
    /// Gateway that spawns real worker processes
    pub fn new(config: GatewayConfig) -> Self {
        Self::with_executor(config, Arc::new(SystemWorkerExecutor::new()))
    }

    pub fn with_executor(config: GatewayConfig, executor: Arc<dyn WorkerExecutor>) -> Self {
        let bridge = |workload| ProcessBridge::with_executor(config.profile(workload), Arc::clone(&executor));
        let login_bridge = bridge(Workload::Login);
        Self {
            query: bridge(Workload::Query),
            search: bridge(Workload::Search),
            login: LoginFlow::new(login_bridge.clone()),
            login_bridge,
            cache: ResultCache::new(config.cache),
            error_log: ErrorLog::new(&config.log_dir, config.log_retention),
            config: Arc::new(config),
        }
    }

    /// Start the cache sweeper and the diagnostic record pruner.
    pub fn start_background_tasks(&self) {
        self.cache.start_sweeper();
        self.error_log.start_default_pruning();
    }

    pub fn stop_background_tasks(&self) {
        self.cache.stop_sweeper();
        self.error_log.stop_pruning();
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn bridge(&self, workload: Workload) -> &ProcessBridge {
        match workload {
            Workload::Query => &self.query,
            Workload::Search => &self.search,
            Workload::Login => &self.login_bridge,
        }
    }

    /// One raw worker call, without caching or error mapping
    pub async fn invoke(&self, workload: Workload, request: &BridgeRequest, decode_mode: DecodeMode) -> BridgeOutcome {
        let bridge = self.bridge(workload);
        let options = bridge.profile().options.clone().with_decode_mode(decode_mode);
        bridge.invoke_with(request, &options).await
    }

    /// Run a query worker, cache every row it returns and serve page 1.
    ///
    /// The worker must answer with an array of rows, `null`, or an object
    /// whose `data` field is an array of rows. An empty result set is a
    /// valid result.
    pub async fn run_bulk_query(
        &self,
        workload: Workload,
        action: &str,
        params: Value,
        page_size: usize,
    ) -> Result<BulkQuery, ServiceError> {
        if workload == Workload::Login {
            return Err(ServiceError::invalid_request("the login worker does not run queries"));
        }
        if page_size == 0 {
            return Err(ServiceError::invalid_request("page size must be at least 1"));
        }
        let request =
            BridgeRequest::new(action, params).map_err(|e| ServiceError::invalid_request(e.to_string()))?;

        let payload = match self.bridge(workload).invoke_checked(&request).await {
            BridgeOutcome::Success(payload) => payload,
            BridgeOutcome::Failure(failure) => return Err(self.worker_failure(workload, action, &failure).await),
        };

        let Some(records) = into_records(payload) else {
            let detail = format!("{workload} worker returned something other than a list of rows");
            let record = DiagnosticRecord::new(context(workload, action)).with_message(detail.clone());
            let locator = self.error_log.record(&record).await;
            return Err(ServiceError::unexpected_response(
                workload,
                detail,
                locator,
                self.config.production,
            ));
        };

        let token = self.cache.store(records);
        let page = self.cache.page(&token, 1, page_size)?;
        Ok(BulkQuery { token, page })
    }

    pub fn get_page(&self, token: &ResultToken, page: usize, page_size: usize) -> Result<PageView, ServiceError> {
        Ok(self.cache.page(token, page, page_size)?)
    }

    /// Drop a cached result set before it expires
    pub fn release(&self, token: &ResultToken) -> bool {
        self.cache.remove(token)
    }

    pub async fn begin_login(&self) -> Result<(LoginChallenge, LoginSession), ServiceError> {
        match self.login.start().await {
            Ok(started) => Ok(started),
            Err(LoginError::Bridge(failure)) => {
                Err(self.worker_failure(Workload::Login, BEGIN_LOGIN, &failure).await)
            }
            Err(LoginError::InvalidRequest(e)) => Err(ServiceError::invalid_request(e.to_string())),
            Err(other) => {
                let record = DiagnosticRecord::new(context(Workload::Login, BEGIN_LOGIN)).with_message(other.report());
                let locator = self.error_log.record(&record).await;
                Err(ServiceError::unexpected_response(
                    Workload::Login,
                    other.to_string(),
                    locator,
                    self.config.production,
                ))
            }
        }
    }

    /// Poll a login once. Failures end the session rather than the call.
    pub async fn check_login(&self, session: LoginSession) -> LoginSession {
        if session.is_terminal() {
            return session;
        }
        let session = self.login.poll(session).await;
        self.record_login_failure(&session).await;
        self.prefer_persisted_credentials(session).await
    }

    pub fn cancel_login(&self, session: LoginSession) -> LoginSession {
        self.login.cancel(session)
    }

    /// Poll every `interval` until the login is terminal, cancelling it
    /// after `give_up_after`.
    pub async fn await_login(&self, session: LoginSession, interval: Duration, give_up_after: Duration) -> LoginSession {
        if session.is_terminal() {
            return session;
        }
        let session = poll_until_terminal(&self.login, session, interval, give_up_after).await;
        self.record_login_failure(&session).await;
        self.prefer_persisted_credentials(session).await
    }

    /// Cookies of the last successful login, as persisted by the login
    /// worker; `None` when nothing has been saved yet.
    pub async fn last_credentials(&self) -> Result<Option<Credentials>, ServiceError> {
        match read_persisted_credentials(&self.config.credentials_file).await {
            Ok(found) => Ok(found),
            Err(e) => {
                let record = DiagnosticRecord::new(context(Workload::Login, LAST_CREDENTIALS)).with_message(e.to_string());
                let locator = self.error_log.record(&record).await;
                Err(ServiceError::credential_file(e.to_string(), locator, self.config.production))
            }
        }
    }

    /// After a success, the worker's persisted copy wins over the cookies
    /// in its reply; an unreadable copy leaves the reply in place.
    async fn prefer_persisted_credentials(&self, session: LoginSession) -> LoginSession {
        if session.status() != LoginStatus::Succeeded {
            return session;
        }
        match read_persisted_credentials(&self.config.credentials_file).await {
            Ok(Some(persisted)) => session.with_persisted_credentials(persisted),
            Ok(None) => session,
            Err(e) => {
                tracing::warn!(error = %e, "keeping worker-reported cookies");
                session
            }
        }
    }

    async fn record_login_failure(&self, session: &LoginSession) {
        if session.status() != LoginStatus::Failed {
            return;
        }
        let Some(failure) = session.failure() else {
            return;
        };
        let mut record = DiagnosticRecord::new(context(Workload::Login, CHECK_LOGIN)).with_message(&failure.message);
        if let FailureReason::Bridge(kind) = failure.reason {
            record = record.with_failure_kind(kind.as_str());
        }
        self.error_log.record(&record).await;
    }

    async fn worker_failure(&self, workload: Workload, action: &str, failure: &BridgeFailure) -> ServiceError {
        let record = DiagnosticRecord::new(context(workload, action))
            .with_failure_kind(failure.kind.as_str())
            .with_exit_code(failure.exit_code)
            .with_message(&failure.diagnostic)
            .with_streams(&failure.stdout, &failure.stderr);
        let locator = self.error_log.record(&record).await;
        ServiceError::worker(workload, failure, locator, self.config.production)
    }
}

const BEGIN_LOGIN: &str = crawlgate_core::BEGIN_LOGIN_ACTION;
const CHECK_LOGIN: &str = crawlgate_core::CHECK_LOGIN_ACTION;
const LAST_CREDENTIALS: &str = "last_credentials";

fn context(workload: Workload, action: &str) -> String {
    format!("{workload}/{action}")
}

fn into_records(payload: Value) -> Option<Vec<Value>> {
    match payload {
        Value::Array(rows) => Some(rows),
        Value::Null => Some(Vec::new()),
        Value::Object(mut object) => match object.remove("data") {
            Some(Value::Array(rows)) => Some(rows),
            _ => None,
        },
        _ => None,
    }
}
