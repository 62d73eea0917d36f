//! # Connection Gate
//!
//! Holds the single cluster session the tools run against. The gate starts
//! disconnected and only [`ConnectionGate::connect`] mutates it: a session is
//! published after authentication and a liveness probe both succeed, so readers
//! never observe handles that were not verified.
//!
//! A reconnect replaces the session wholesale. Concurrent connect attempts are not
//! queued; a second attempt while one is in flight fails with
//! [`SessionError::InProgress`].

pub mod authenticator;
pub mod eks;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;
use tracing::{info, warn};

pub use authenticator::{ApiHandles, Authenticator, ConnectRequest};
pub use eks::EksAuthenticator;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("connection attempt already in progress")]
    InProgress,

    #[error("Failed to connect to EKS cluster {cluster}: {message}")]
    Authentication { cluster: String, message: String },

    #[error("Failed to connect to EKS cluster {cluster}: connection test failed")]
    ProbeFailed { cluster: String },
}

/// Snapshot reported in envelope metadata as `clusterInfo`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionState {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl ConnectionState {
    pub fn disconnected() -> Self {
        Self::default()
    }
}

/// An authenticated, verified cluster binding
#[derive(Debug)]
pub struct Session {
    pub cluster_name: String,
    pub region: String,
    pub role_arn: Option<String>,
    pub handles: ApiHandles,
    pub connected_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct ConnectionGate {
    session: RwLock<Option<Arc<Session>>>,
    connecting: AtomicBool,
}

/// Clears the in-flight flag when a connect attempt ends, including on cancellation
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).ok().map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ConnectionGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.session.read().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    pub fn session(&self) -> Option<Arc<Session>> {
        self.session.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn handles(&self) -> Option<ApiHandles> {
        self.session().map(|s| s.handles.clone())
    }

    pub fn state(&self) -> ConnectionState {
        match self.session() {
            Some(session) => ConnectionState {
                connected: true,
                cluster_name: Some(session.cluster_name.clone()),
                region: Some(session.region.clone()),
            },
            None => ConnectionState::disconnected(),
        }
    }

    pub fn is_connecting(&self) -> bool {
        self.connecting.load(Ordering::Acquire)
    }

    /// Authenticate, probe, then publish the new session.
    ///
    /// On any failure the previously published state is left untouched.
    pub async fn connect(
        &self,
        authenticator: &dyn Authenticator,
        request: ConnectRequest,
    ) -> Result<Arc<Session>, SessionError> {
        let _in_flight = InFlight::acquire(&self.connecting).ok_or(SessionError::InProgress)?;

        let handles = authenticator.authenticate(&request).await.map_err(|e| {
            warn!(cluster = %request.cluster_name, region = %request.region, error = %e, "Authentication failed");
            SessionError::Authentication { cluster: request.cluster_name.clone(), message: e.to_string() }
        })?;

        if !authenticator.test_connection(&handles).await {
            return Err(SessionError::ProbeFailed { cluster: request.cluster_name });
        }

        let session = Arc::new(Session {
            cluster_name: request.cluster_name,
            region: request.region,
            role_arn: request.role_arn,
            handles,
            connected_at: Utc::now(),
        });

        let previous = self
            .session
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(Arc::clone(&session));

        info!(
            cluster = %session.cluster_name,
            region = %session.region,
            replaced = previous.is_some(),
            "Connected to EKS cluster"
        );
        Ok(session)
    }
}
