//! Batch orchestration: log in, then resolve and publish every configured target in order.
//!
//! # Sequencing
//! 1. Log in with the config's domain and credentials. A refused login aborts the run.
//! 2. Publish the config-level target, if `target`, `source` and `type` are all set.
//! 3. Publish each entry of a `targets` list, in order.
//! 4. Publish a legacy single-object `targets` entry. Its outcome is kept apart from the counts.
//!
//! Items run one after another; each finishes its backend read, merge and write before the
//! next begins. Parallelising this would need per-document serialisation, because style
//! publishes to the same document are read-modify-write.
//!
//! # Error Handling
//! A failing item (bad configuration, missing record, backend error) is logged and counted
//! as not succeeded. Only authentication failures end the run early.

use std::fmt;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::{PublishConfig, TargetDefaults, TargetSpec, TargetsConfig};
use crate::contract::{Authenticator, ContentLoader};
use crate::dispatch::Dispatcher;
use crate::error::{PublishError, Result};
use crate::item::ItemResolver;

/// Outcome of a publish run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishSummary {
    pub attempted: usize,
    pub succeeded: usize,
    /// Outcome of a legacy single-object `targets` entry, which is not counted above.
    pub legacy_single: Option<bool>,
}

impl PublishSummary {
    pub fn nothing_published(&self) -> bool {
        self.succeeded == 0
    }
}

impl fmt::Display for PublishSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nothing_published() {
            write!(f, "Nothing published successfully.")
        } else {
            write!(
                f,
                "Publish completed. {} of {} items published successfully.",
                self.succeeded, self.attempted
            )
        }
    }
}

pub struct PublishSession {
    authenticator: Arc<dyn Authenticator>,
    loader: Arc<dyn ContentLoader>,
    dispatcher: Dispatcher,
}

impl PublishSession {
    pub fn new(
        authenticator: Arc<dyn Authenticator>,
        loader: Arc<dyn ContentLoader>,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            authenticator,
            loader,
            dispatcher,
        }
    }

    pub async fn run(&self, config: &PublishConfig) -> Result<PublishSummary> {
        self.login(config).await?;

        let resolver = ItemResolver::new(self.loader.as_ref());
        let defaults = config.defaults();
        let mut summary = PublishSummary::default();

        if let Some(primary) = config.primary_target() {
            summary.attempted += 1;
            if self
                .publish_one(&resolver, &TargetSpec::Explicit(primary), &defaults)
                .await
            {
                summary.succeeded += 1;
            }
        }

        match &config.targets {
            Some(TargetsConfig::List(targets)) => {
                info!(count = targets.len(), "[PUBLISH] Publishing target list");
                for spec in targets {
                    summary.attempted += 1;
                    if self.publish_one(&resolver, spec, &defaults).await {
                        summary.succeeded += 1;
                    }
                }
            }
            Some(TargetsConfig::Single(overlay)) => {
                warn!("[PUBLISH] Single-object targets entry is published but not counted");
                let spec = TargetSpec::Explicit(overlay.clone());
                summary.legacy_single = Some(self.publish_one(&resolver, &spec, &defaults).await);
            }
            None => {}
        }

        if summary.nothing_published() {
            error!(attempted = summary.attempted, "[PUBLISH] {}", summary);
        } else {
            info!(
                attempted = summary.attempted,
                succeeded = summary.succeeded,
                "[PUBLISH] {}",
                summary
            );
        }
        Ok(summary)
    }

    async fn login(&self, config: &PublishConfig) -> Result<()> {
        let domain = config.login_domain().unwrap_or_default();
        let user = config.user.as_deref().unwrap_or_default();
        let password = config.password.as_deref().unwrap_or_default();

        match self.authenticator.login(domain, user, password).await {
            Ok(true) => {
                info!(domain = domain, user = user, "[PUBLISH] Logged in");
                Ok(())
            }
            Ok(false) => {
                error!(domain = domain, user = user, "[PUBLISH][ERROR] Login refused");
                Err(PublishError::Authentication {
                    domain: domain.to_string(),
                })
            }
            Err(e) => {
                error!(domain = domain, error = ?e, "[PUBLISH][ERROR] Login failed");
                Err(PublishError::Authentication {
                    domain: domain.to_string(),
                })
            }
        }
    }

    /// Resolves and dispatches one target. Resolution errors count as a failed item.
    async fn publish_one(
        &self,
        resolver: &ItemResolver<'_>,
        spec: &TargetSpec,
        defaults: &TargetDefaults,
    ) -> bool {
        match resolver.resolve(spec, defaults) {
            Ok(item) => self.dispatcher.dispatch(&item).await,
            Err(e) => {
                error!(error = %e, "[PUBLISH][ERROR] Could not resolve target");
                false
            }
        }
    }
}
