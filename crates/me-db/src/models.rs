//! Database row types. Each maps directly to a SQLite row.
//! Grouped into me-types records where the engine needs them.
use std::collections::BTreeMap;

use me_types::ids::{ChannelId, MessageId, RoleId, ServerId, UserId};
use me_types::models::{MessageGroupRecord, MessageType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRow {
    pub message_id: MessageId,
    pub first_message_id: MessageId,
    pub type_id: i64,
    pub channel_id: ChannelId,
    pub user_id: UserId,
    pub server_id: ServerId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleCategoryRow {
    pub id: i64,
    pub server_id: ServerId,
    pub name: String,
    pub emoji: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedRoleRow {
    pub server_id: ServerId,
    pub role_id: RoleId,
    pub short_description: String,
    pub long_description: Option<String>,
    pub emoji: String,
}

/// Collapses message rows into groups keyed by `(first_message_id, channel_id)`,
/// oldest group first. Rows of unknown message types are dropped.
pub fn into_groups(rows: Vec<MessageRow>) -> Vec<MessageGroupRecord> {
    let mut groups: BTreeMap<(MessageId, ChannelId), MessageGroupRecord> = BTreeMap::new();
    for row in rows {
        let Some(message_type) = MessageType::from_type_id(row.type_id) else {
            continue;
        };
        groups
            .entry((row.first_message_id, row.channel_id))
            .or_insert_with(|| MessageGroupRecord {
                first_message_id: row.first_message_id,
                channel_id: row.channel_id,
                server_id: row.server_id,
                user_id: row.user_id,
                message_type,
                message_ids: Vec::new(),
            })
            .message_ids
            .push(row.message_id);
    }

    groups
        .into_values()
        .map(|mut group| {
            group.message_ids.sort();
            group
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(message_id: u64, first: u64, channel: u64) -> MessageRow {
        MessageRow {
            message_id: MessageId(message_id),
            first_message_id: MessageId(first),
            type_id: MessageType::RoleMessage.type_id(),
            channel_id: ChannelId(channel),
            user_id: UserId(1),
            server_id: ServerId(1),
        }
    }

    #[test]
    fn groups_are_sorted_oldest_first() {
        let groups = into_groups(vec![
            row(21, 20, 5),
            row(11, 10, 5),
            row(20, 20, 5),
            row(10, 10, 5),
        ]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].first_message_id, MessageId(10));
        assert_eq!(groups[0].message_ids, vec![MessageId(10), MessageId(11)]);
        assert_eq!(groups[1].message_ids, vec![MessageId(20), MessageId(21)]);
    }

    #[test]
    fn same_first_id_in_other_channel_is_distinct() {
        let groups = into_groups(vec![row(10, 10, 5), row(10, 10, 6)]);
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn unknown_types_are_skipped() {
        let mut stray = row(30, 30, 5);
        stray.type_id = 99;
        assert!(into_groups(vec![stray]).is_empty());
    }
}
