use serde::{Deserialize, Serialize};

use crate::ids::{ChannelId, MessageId, ServerId, UserId};

/// Kinds of tracked dialog messages. Retention caps are evaluated per type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageType {
    RoleMessage,
}

impl MessageType {
    pub fn type_id(self) -> i64 {
        match self {
            Self::RoleMessage => 1,
        }
    }

    pub fn from_type_id(id: i64) -> Option<Self> {
        match id {
            1 => Some(Self::RoleMessage),
            _ => None,
        }
    }
}

/// A message as confirmed by the platform after a send or edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub channel_id: ChannelId,
    /// `None` for direct messages.
    pub server_id: Option<ServerId>,
    pub content: String,
    #[serde(default)]
    pub ephemeral: bool,
}

/// One logical display event tracked for retention.
///
/// `first_message_id` is the smallest member id and keys the group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageGroupRecord {
    pub first_message_id: MessageId,
    pub channel_id: ChannelId,
    pub server_id: ServerId,
    pub user_id: UserId,
    pub message_type: MessageType,
    pub message_ids: Vec<MessageId>,
}
