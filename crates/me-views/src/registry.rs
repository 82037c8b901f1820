use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

use me_types::ids::{MessageId, UserId};

use crate::view::View;

/// Identity of a live view. Back-links and reused links hold this id, never
/// the view itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId(Uuid);

impl ViewId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ViewId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub type ViewHandle = Arc<Mutex<View>>;

/// Where an interaction should be delivered.
#[derive(Clone)]
pub struct Route {
    pub view: ViewHandle,
    pub component_id: String,
}

/// Arena of live views plus the routes that lead interactions back to them.
///
/// Views are kept until their timeout elapses; registered top-level views
/// (no timeout) live as long as the registry.
#[derive(Clone, Default)]
pub struct ViewRegistry {
    inner: Arc<RwLock<RegistryInner>>,
}

#[derive(Default)]
struct RegistryInner {
    views: HashMap<ViewId, Entry>,

    /// Message id -> view rendered on that message
    by_message: HashMap<MessageId, ViewId>,

    /// Component id -> registered top-level view
    persistent: HashMap<String, ViewId>,

    /// (user, modal id) -> (view, modal button id)
    modals: HashMap<(UserId, String), (ViewId, String)>,
}

struct Entry {
    handle: ViewHandle,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a view until `timeout` elapses. Also prunes expired entries.
    pub async fn insert(&self, id: ViewId, handle: ViewHandle, timeout: Option<Duration>) {
        let now = Instant::now();
        let mut inner = self.inner.write().await;
        inner.prune(now);
        inner.views.insert(
            id,
            Entry {
                handle,
                expires_at: timeout.map(|t| now + t),
            },
        );
    }

    pub async fn get(&self, id: ViewId) -> Option<ViewHandle> {
        let inner = self.inner.read().await;
        inner
            .views
            .get(&id)
            .filter(|entry| !entry.is_expired(Instant::now()))
            .map(|entry| entry.handle.clone())
    }

    /// Restart the expiry clock, used when a view is shown again.
    pub async fn touch(&self, id: ViewId, timeout: Option<Duration>) {
        let mut inner = self.inner.write().await;
        if let Some(entry) = inner.views.get_mut(&id) {
            entry.expires_at = timeout.map(|t| Instant::now() + t);
        }
    }

    pub async fn bind_message(&self, message_id: MessageId, id: ViewId) {
        self.inner.write().await.by_message.insert(message_id, id);
    }

    /// Forget deleted messages so clicks on them no longer route.
    pub async fn unbind_messages(&self, message_ids: &[MessageId]) {
        let mut inner = self.inner.write().await;
        for message_id in message_ids {
            inner.by_message.remove(message_id);
        }
    }

    pub async fn bind_persistent(&self, id: ViewId, component_ids: &[String]) {
        let mut inner = self.inner.write().await;
        for component_id in component_ids {
            inner.persistent.insert(component_id.clone(), id);
        }
    }

    pub async fn bind_modal(
        &self,
        user_id: UserId,
        modal_id: String,
        id: ViewId,
        button_id: String,
    ) {
        self.inner
            .write()
            .await
            .modals
            .insert((user_id, modal_id), (id, button_id));
    }

    /// Find the view a component click belongs to: first by the message it
    /// was clicked on, then among registered top-level views.
    pub async fn component_route(
        &self,
        message_id: Option<MessageId>,
        component_id: &str,
    ) -> Option<Route> {
        let inner = self.inner.read().await;
        let now = Instant::now();
        let by_message = message_id.and_then(|m| inner.by_message.get(&m));
        let candidates = by_message.into_iter().chain(inner.persistent.get(component_id));

        for id in candidates {
            if let Some(entry) = inner.views.get(id).filter(|e| !e.is_expired(now)) {
                return Some(Route {
                    view: entry.handle.clone(),
                    component_id: component_id.to_string(),
                });
            }
        }
        None
    }

    pub async fn modal_route(&self, user_id: UserId, modal_id: &str) -> Option<Route> {
        let inner = self.inner.read().await;
        let (id, button_id) = inner.modals.get(&(user_id, modal_id.to_string()))?;
        let entry = inner.views.get(id).filter(|e| !e.is_expired(Instant::now()))?;
        Some(Route {
            view: entry.handle.clone(),
            component_id: button_id.clone(),
        })
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.views.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn prune(&self) {
        self.inner.write().await.prune(Instant::now());
    }
}

impl RegistryInner {
    fn prune(&mut self, now: Instant) {
        let before = self.views.len();
        self.views.retain(|_, entry| !entry.is_expired(now));
        let views = &self.views;
        self.by_message.retain(|_, id| views.contains_key(id));
        self.persistent.retain(|_, id| views.contains_key(id));
        self.modals.retain(|_, (id, _)| views.contains_key(id));

        let removed = before - self.views.len();
        if removed > 0 {
            debug!("Pruned {} expired view(s)", removed);
        }
    }
}
