use std::sync::Arc;

use tracing::{debug, warn};

use me_db::Database;
use me_types::events::{InteractionEvent, InteractionKind};
use me_types::models::Message;

use crate::client::ChatClient;
use crate::config::BotConfig;
use crate::error::{Result, ViewError};
use crate::navigation;
use crate::registry::ViewRegistry;

/// Shared services handed to every view and view group.
#[derive(Clone)]
pub struct HostContext {
    inner: Arc<HostInner>,
}

struct HostInner {
    client: Arc<dyn ChatClient>,
    db: Arc<Database>,
    views: ViewRegistry,
    config: BotConfig,
}

impl HostContext {
    pub fn new(client: Arc<dyn ChatClient>, db: Arc<Database>, config: BotConfig) -> Self {
        Self {
            inner: Arc::new(HostInner {
                client,
                db,
                views: ViewRegistry::new(),
                config,
            }),
        }
    }

    /// Open the store at `config.db_path` and build a host around it.
    pub fn open(client: Arc<dyn ChatClient>, config: BotConfig) -> Result<Self> {
        let db = Database::open(&config.db_path)?;
        Ok(Self::new(client, Arc::new(db), config))
    }

    pub fn client(&self) -> &dyn ChatClient {
        self.inner.client.as_ref()
    }

    pub fn db(&self) -> &Database {
        &self.inner.db
    }

    pub fn views(&self) -> &ViewRegistry {
        &self.inner.views
    }

    pub fn config(&self) -> &BotConfig {
        &self.inner.config
    }

    /// Route an interaction to the view it belongs to.
    ///
    /// Returns the message that was shown, or `None` when nothing was (modal
    /// opened, stale or unknown component, slash command).
    pub async fn dispatch(&self, event: &InteractionEvent) -> Result<Option<Message>> {
        let custom_id = match event.kind {
            InteractionKind::Command => {
                debug!("Ignoring command interaction {}", event.id);
                return Ok(None);
            }
            InteractionKind::Component | InteractionKind::ModalSubmit => {
                event.custom_id.as_deref().ok_or_else(|| {
                    ViewError::Precondition(format!("interaction {} has no custom id", event.id))
                })?
            }
        };

        if event.kind == InteractionKind::ModalSubmit {
            return match self.views().modal_route(event.user_id, custom_id).await {
                Some(route) => {
                    navigation::submit_modal(self, &route.view, &route.component_id, event).await
                }
                None => {
                    warn!("No open form {} for user {}", custom_id, event.user_id);
                    Ok(None)
                }
            };
        }

        match self.views().component_route(event.message_id, custom_id).await {
            Some(route) => {
                navigation::callback(self, &route.view, &route.component_id, event).await
            }
            None => {
                warn!("No live view for component {}", custom_id);
                Ok(None)
            }
        }
    }
}
