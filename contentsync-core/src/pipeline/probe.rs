// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Connectivity probe.

use std::sync::Arc;

use tracing::{info, warn};

use crate::context::SyncContext;
use crate::events::SyncEvent;
use crate::state::ConnectionStatus;
use crate::store::ProbeTransport;

/// Single reachability check against the remote store's endpoint.
///
/// The result is never cached; every incremental run probes again.
pub struct ConnectivityProbe {
    transport: Arc<dyn ProbeTransport>,
    endpoint: String,
}

impl ConnectivityProbe {
    /// Creates a probe for `endpoint`.
    pub fn new(transport: Arc<dyn ProbeTransport>, endpoint: impl Into<String>) -> Self {
        ConnectivityProbe {
            transport,
            endpoint: endpoint.into(),
        }
    }

    /// Endpoint being probed.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Issues the request and waits for it, or for cancellation.
    ///
    /// Anything but a success response sets the cancellation signal.
    pub async fn check(&self, ctx: &SyncContext) -> ConnectionStatus {
        let status = tokio::select! {
            biased;
            _ = ctx.cancel().cancelled() => {
                warn!(endpoint = %self.endpoint, "probe aborted by cancellation");
                ConnectionStatus::Unreachable
            }
            result = self.transport.head(&self.endpoint) => match result {
                Ok(response) if response.is_success() => ConnectionStatus::Reachable,
                Ok(response) => {
                    warn!(endpoint = %self.endpoint, status = response.status, "probe got non-success status");
                    ConnectionStatus::Unreachable
                }
                Err(e) => {
                    warn!(endpoint = %self.endpoint, error = %e, "probe request failed");
                    ConnectionStatus::Unreachable
                }
            }
        };

        match status {
            ConnectionStatus::Reachable => info!(endpoint = %self.endpoint, "remote store reachable"),
            _ => ctx.fail(format!("endpoint {} unreachable", self.endpoint)),
        }
        ctx.emit(SyncEvent::ConnectivityResolved { status });
        status
    }
}
