use tracing::{debug, info, warn};

use me_db::models::into_groups;
use me_types::events::{InteractionEvent, OutboundMessage};
use me_types::ids::{ChannelId, MessageId, UserId};
use me_types::models::{Message, MessageType};

use crate::client::ClientError;
use crate::error::{Result, ViewError};
use crate::host::HostContext;
use crate::registry::ViewHandle;
use crate::retention::{Retention, RetentionPolicy};
use crate::view::View;

pub const DISPLAYED_NOTICE: &str = "Successfully Displayed UI";

/// Where and for whom a group is shown. Unset fields fall back to the
/// interaction.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayRequest<'a> {
    pub user_id: Option<UserId>,
    pub channel_id: Option<ChannelId>,
    pub event: Option<&'a InteractionEvent>,
    pub ephemeral: Option<bool>,
}

impl<'a> DisplayRequest<'a> {
    pub fn interaction(event: &'a InteractionEvent) -> Self {
        Self {
            event: Some(event),
            ..Self::default()
        }
    }

    pub fn channel(channel_id: ChannelId, user_id: UserId) -> Self {
        Self {
            channel_id: Some(channel_id),
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    pub fn in_channel(mut self, channel_id: ChannelId) -> Self {
        self.channel_id = Some(channel_id);
        self
    }

    pub fn ephemeral(mut self, ephemeral: bool) -> Self {
        self.ephemeral = Some(ephemeral);
        self
    }
}

/// Views shown together as one tracked display.
pub struct ViewGroup {
    message_type: MessageType,
    views: Vec<ViewHandle>,
    policy: RetentionPolicy,
    delete_on_startup: bool,
    ephemeral: bool,
}

impl ViewGroup {
    pub fn new(message_type: MessageType, views: Vec<ViewHandle>, policy: RetentionPolicy) -> Self {
        Self {
            message_type,
            views,
            policy,
            delete_on_startup: false,
            ephemeral: false,
        }
    }

    /// Delete every tracked message of this type on [`ViewGroup::register`]
    /// instead of re-rendering them.
    pub fn delete_on_startup(mut self, delete_on_startup: bool) -> Self {
        self.delete_on_startup = delete_on_startup;
        self
    }

    pub fn ephemeral(mut self, ephemeral: bool) -> Self {
        self.ephemeral = ephemeral;
        self
    }

    pub fn views(&self) -> &[ViewHandle] {
        &self.views
    }

    pub fn policy(&self) -> RetentionPolicy {
        self.policy
    }

    pub fn retention<'a>(&self, host: &'a HostContext) -> Retention<'a> {
        Retention::new(host, self.message_type)
    }

    /// Make the group's views answer clicks on messages sent before a
    /// restart, then either delete or refresh those messages.
    pub async fn register(&self, host: &HostContext) -> Result<()> {
        for handle in &self.views {
            View::register(host, handle).await?;
        }

        if self.delete_on_startup {
            let deleted = self.retention(host).purge_all().await?;
            info!("Deleted {} stale {:?} group(s) on startup", deleted, self.message_type);
        } else {
            let refreshed = self.refresh(host).await?;
            info!("Refreshed {} {:?} message(s)", refreshed, self.message_type);
        }
        Ok(())
    }

    /// Re-render every tracked message: view `i` onto the `i`-th message of
    /// each group. Messages that no longer exist are skipped.
    pub async fn refresh(&self, host: &HostContext) -> Result<usize> {
        let groups = into_groups(host.db().get_messages_of_type(self.message_type)?);

        let mut refreshed = 0;
        for group in groups {
            for (handle, message_id) in self.views.iter().zip(&group.message_ids) {
                let view = handle.lock().await;
                match view.update(host, &[*message_id], group.channel_id).await {
                    Ok(updated) => refreshed += updated.len(),
                    Err(ViewError::Client(ClientError::NotFound)) => {
                        debug!("Tracked message {} is gone", message_id)
                    }
                    Err(e) => return Err(e),
                }
            }
        }
        Ok(refreshed)
    }

    /// Show every view, track the public messages, then enforce the
    /// retention caps.
    ///
    /// Only the first view may be ephemeral; the rest are always public.
    /// When the interaction was not used to respond, it is acknowledged
    /// with a short notice.
    pub async fn display(
        &self,
        host: &HostContext,
        request: DisplayRequest<'_>,
    ) -> Result<Vec<Message>> {
        let event = request.event;
        let channel_id = request.channel_id.or(event.and_then(|e| e.channel_id));
        let user_id = request
            .user_id
            .or(event.map(|e| e.user_id))
            .ok_or_else(|| {
                ViewError::Precondition("display needs a user or an interaction".into())
            })?;

        if let Some(server_id) = event.and_then(|e| e.server_id) {
            host.db().add_server(server_id)?;
        }
        host.db().add_user(user_id)?;

        let mut ephemeral = request.ephemeral.unwrap_or(self.ephemeral);
        let mut responded = false;
        let mut messages = Vec::with_capacity(self.views.len());
        for handle in &self.views {
            let view = handle.lock().await;
            let message = view.display(host, channel_id, event, ephemeral, false).await?;
            responded |= channel_id.is_none() || ephemeral;
            ephemeral = false;
            messages.push(message);
        }

        self.track(host, user_id, &messages).await?;

        if let Some(event) = event {
            if !responded {
                let notice = OutboundMessage::text(DISPLAYED_NOTICE).ephemeral(Some(0));
                if let Err(e) = host.client().respond(event, notice).await {
                    debug!("Could not acknowledge interaction {}: {}", event.id, e);
                }
            }
        }
        Ok(messages)
    }

    async fn track(&self, host: &HostContext, user_id: UserId, messages: &[Message]) -> Result<()> {
        let public: Vec<&Message> = messages.iter().filter(|m| !m.ephemeral).collect();
        let Some(first) = public.first() else {
            return Ok(());
        };
        let Some(server_id) = first.server_id else {
            warn!("Not tracking {:?} messages outside a server", self.message_type);
            return Ok(());
        };
        let channel_id = first.channel_id;

        let ids: Vec<MessageId> = public.iter().map(|m| m.id).collect();
        host.db()
            .add_messages(&ids, self.message_type, channel_id, user_id, server_id)?;

        let retention = self.retention(host);
        retention
            .purge_user_messages(user_id, server_id, self.policy.max_per_user)
            .await?;
        retention
            .purge_server_messages(server_id, self.policy.max_per_server)
            .await?;
        retention
            .purge_channel_messages(channel_id, self.policy.max_per_channel)
            .await?;
        Ok(())
    }
}
