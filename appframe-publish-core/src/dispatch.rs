//! Routes resolved items to the handler registered for their type.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{error, info};

use crate::contract::{DataBackend, PublishHandler};
use crate::handlers::default_handler;
use crate::item::{PublishItem, PublishType};

/// Handler registry keyed by publish type.
#[derive(Default, Clone)]
pub struct Dispatcher {
    handlers: HashMap<PublishType, Arc<dyn PublishHandler>>,
}

impl Dispatcher {
    /// An empty dispatcher. Every type is unsupported until registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// A dispatcher with the default handler for every type, all sharing one backend.
    pub fn with_backend(backend: Arc<dyn DataBackend>) -> Self {
        let mut dispatcher = Self::new();
        for kind in PublishType::ALL {
            dispatcher.register(kind, default_handler(backend.clone(), kind));
        }
        dispatcher
    }

    /// Registers or replaces the handler for a type.
    pub fn register(&mut self, kind: PublishType, handler: Arc<dyn PublishHandler>) -> &mut Self {
        self.handlers.insert(kind, handler);
        self
    }

    pub fn supports(&self, kind: PublishType) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// Publishes one item. Returns `false` for unsupported types instead of failing.
    pub async fn dispatch(&self, item: &PublishItem) -> bool {
        let handler = item
            .publish_type()
            .ok()
            .and_then(|kind| self.handlers.get(&kind));

        let Some(handler) = handler else {
            error!(kind = %item.kind, "Type '{}' is not supported.", item.kind);
            return false;
        };

        info!(
            source = %item.source,
            kind = %item.kind,
            record = %item.target,
            hostname = %item.hostname,
            "Publishing '{}' to {} '{}' in {}...",
            item.source,
            item.kind,
            item.target,
            item.hostname
        );
        handler.publish(item).await
    }
}
