use std::collections::VecDeque;

use tracing::{debug, info};

use me_db::models::{MessageRow, into_groups};
use me_types::ids::{ChannelId, ServerId, UserId};
use me_types::models::{MessageGroupRecord, MessageType};

use crate::client::ClientError;
use crate::error::Result;
use crate::host::HostContext;

/// How many tracked display groups may exist per scope before the oldest
/// ones are deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub max_per_user: usize,
    pub max_per_server: usize,
    pub max_per_channel: usize,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            max_per_user: 10,
            max_per_server: 100,
            max_per_channel: 100,
        }
    }
}

impl RetentionPolicy {
    pub fn with_max_per_user(mut self, max: usize) -> Self {
        self.max_per_user = max;
        self
    }

    pub fn with_max_per_server(mut self, max: usize) -> Self {
        self.max_per_server = max;
        self
    }

    pub fn with_max_per_channel(mut self, max: usize) -> Self {
        self.max_per_channel = max;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// One user's groups within one server.
    User { user_id: UserId, server_id: ServerId },
    Server(ServerId),
    Channel(ChannelId),
}

/// Eviction of tracked message groups of one type.
pub struct Retention<'a> {
    host: &'a HostContext,
    message_type: MessageType,
}

impl<'a> Retention<'a> {
    pub fn new(host: &'a HostContext, message_type: MessageType) -> Self {
        Self { host, message_type }
    }

    fn rows(&self, scope: Scope) -> Result<Vec<MessageRow>> {
        let db = self.host.db();
        let rows = match scope {
            Scope::User { user_id, server_id } => {
                db.get_messages_of_type_and_user(self.message_type, user_id, server_id)?
            }
            Scope::Server(server_id) => {
                db.get_messages_of_type_and_server(self.message_type, server_id)?
            }
            Scope::Channel(channel_id) => {
                db.get_messages_of_type_and_channel(self.message_type, channel_id)?
            }
        };
        Ok(rows)
    }

    /// Delete the oldest groups in `scope` until at most `cap` remain.
    /// Returns how many groups were evicted.
    pub async fn purge(&self, scope: Scope, cap: usize) -> Result<usize> {
        let mut groups: VecDeque<MessageGroupRecord> = into_groups(self.rows(scope)?).into();

        let mut evicted = 0;
        while groups.len() > cap {
            let Some(oldest) = groups.pop_front() else {
                break;
            };
            self.delete_group(&oldest).await?;
            evicted += 1;
        }

        if evicted > 0 {
            info!("Evicted {} {:?} group(s) from {:?}", evicted, self.message_type, scope);
        }
        Ok(evicted)
    }

    pub async fn purge_user_messages(
        &self,
        user_id: UserId,
        server_id: ServerId,
        cap: usize,
    ) -> Result<usize> {
        self.purge(Scope::User { user_id, server_id }, cap).await
    }

    pub async fn purge_server_messages(&self, server_id: ServerId, cap: usize) -> Result<usize> {
        self.purge(Scope::Server(server_id), cap).await
    }

    pub async fn purge_channel_messages(&self, channel_id: ChannelId, cap: usize) -> Result<usize> {
        self.purge(Scope::Channel(channel_id), cap).await
    }

    /// Delete every tracked group of this type.
    pub async fn purge_all(&self) -> Result<usize> {
        let groups = into_groups(self.host.db().get_messages_of_type(self.message_type)?);
        for group in &groups {
            self.delete_group(group).await?;
        }
        Ok(groups.len())
    }

    /// Delete a group's messages from the platform, then its record.
    /// Messages that are already gone are skipped.
    pub async fn delete_group(&self, group: &MessageGroupRecord) -> Result<()> {
        let client = self.host.client();

        let mut present = Vec::with_capacity(group.message_ids.len());
        for message_id in &group.message_ids {
            match client.fetch_message(group.channel_id, *message_id).await {
                Ok(message) => present.push(message.id),
                Err(ClientError::NotFound) => {
                    debug!("Message {} was already deleted", message_id)
                }
                Err(e) => return Err(e.into()),
            }
        }

        if !present.is_empty() {
            match client.delete_messages(group.channel_id, &present).await {
                Ok(()) | Err(ClientError::NotFound) => {}
                Err(e) => return Err(e.into()),
            }
        }

        self.host.db().delete_messages(group.first_message_id)?;
        self.host.views().unbind_messages(&group.message_ids).await;
        Ok(())
    }
}
