use crate::Database;
use crate::models::{LinkedRoleRow, MessageRow, RoleCategoryRow};
use anyhow::{Result, anyhow};
use me_types::ids::{ChannelId, MessageId, RoleId, ServerId, UserId};
use me_types::models::MessageType;
use rusqlite::{Connection, Row};
use tracing::debug;

const MESSAGE_COLUMNS: &str =
    "message_id, first_message_id, type_id, channel_id, user_id, server_id";

impl Database {
    // -- Servers / users --

    pub fn add_server(&self, server_id: ServerId) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR IGNORE INTO servers (server_id) VALUES (?1)",
                [server_id.get() as i64],
            )?;
            Ok(())
        })
    }

    pub fn add_user(&self, user_id: UserId) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR IGNORE INTO users (user_id) VALUES (?1)",
                [user_id.get() as i64],
            )?;
            Ok(())
        })
    }

    // -- Tracked view messages --

    /// Records one display event. Returns the group key, the smallest id.
    pub fn add_messages(
        &self,
        message_ids: &[MessageId],
        message_type: MessageType,
        channel_id: ChannelId,
        user_id: UserId,
        server_id: ServerId,
    ) -> Result<MessageId> {
        let first = *message_ids
            .iter()
            .min()
            .ok_or_else(|| anyhow!("Cannot track an empty message group"))?;

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            for id in message_ids {
                tx.execute(
                    "INSERT OR REPLACE INTO view_messages
                        (message_id, first_message_id, type_id, channel_id, user_id, server_id)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    rusqlite::params![
                        id.get() as i64,
                        first.get() as i64,
                        message_type.type_id(),
                        channel_id.get() as i64,
                        user_id.get() as i64,
                        server_id.get() as i64,
                    ],
                )?;
            }
            tx.commit()?;
            Ok(())
        })?;

        debug!("Tracked {} message(s) under group {}", message_ids.len(), first);
        Ok(first)
    }

    /// Removes every row of a group. Returns the number of rows removed;
    /// zero when the group was already gone.
    pub fn delete_messages(&self, first_message_id: MessageId) -> Result<usize> {
        self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM view_messages WHERE first_message_id = ?1",
                [first_message_id.get() as i64],
            )?;
            Ok(removed)
        })
    }

    pub fn get_messages_of_type(&self, message_type: MessageType) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            query_messages(
                conn,
                "type_id = ?1",
                rusqlite::params![message_type.type_id()],
            )
        })
    }

    pub fn get_messages_of_type_and_user(
        &self,
        message_type: MessageType,
        user_id: UserId,
        server_id: ServerId,
    ) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            query_messages(
                conn,
                "type_id = ?1 AND user_id = ?2 AND server_id = ?3",
                rusqlite::params![
                    message_type.type_id(),
                    user_id.get() as i64,
                    server_id.get() as i64
                ],
            )
        })
    }

    pub fn get_messages_of_type_and_server(
        &self,
        message_type: MessageType,
        server_id: ServerId,
    ) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            query_messages(
                conn,
                "type_id = ?1 AND server_id = ?2",
                rusqlite::params![message_type.type_id(), server_id.get() as i64],
            )
        })
    }

    pub fn get_messages_of_type_and_channel(
        &self,
        message_type: MessageType,
        channel_id: ChannelId,
    ) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            query_messages(
                conn,
                "type_id = ?1 AND channel_id = ?2",
                rusqlite::params![message_type.type_id(), channel_id.get() as i64],
            )
        })
    }

    // -- Role categories --

    /// Returns false when the server already has a category with that name.
    pub fn add_role_category(
        &self,
        server_id: ServerId,
        name: &str,
        emoji: Option<&str>,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO role_categories (server_id, name, emoji)
                 VALUES (?1, ?2, ?3)",
                rusqlite::params![server_id.get() as i64, name, emoji],
            )?;
            Ok(inserted == 1)
        })
    }

    pub fn get_role_categories(&self, server_id: ServerId) -> Result<Vec<RoleCategoryRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, server_id, name, emoji FROM role_categories
                 WHERE server_id = ?1
                 ORDER BY id",
            )?;

            let rows = stmt
                .query_map([server_id.get() as i64], |row| {
                    Ok(RoleCategoryRow {
                        id: row.get(0)?,
                        server_id: ServerId(row.get::<_, i64>(1)? as u64),
                        name: row.get(2)?,
                        emoji: row.get(3)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    // -- Linked roles --

    /// Returns false when the role already has a button on this server.
    pub fn link_role(&self, role: &LinkedRoleRow) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO linked_roles
                    (server_id, role_id, short_description, long_description, emoji)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    role.server_id.get() as i64,
                    role.role_id.get() as i64,
                    role.short_description,
                    role.long_description,
                    role.emoji,
                ],
            )?;
            Ok(inserted == 1)
        })
    }

    pub fn get_linked_role_ids(&self, server_id: ServerId) -> Result<Vec<RoleId>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare(
                    "SELECT role_id FROM linked_roles WHERE server_id = ?1 ORDER BY role_id",
                )?;
            let ids = stmt
                .query_map([server_id.get() as i64], |row| {
                    Ok(RoleId(row.get::<_, i64>(0)? as u64))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(ids)
        })
    }
}

fn query_messages(
    conn: &Connection,
    condition: &str,
    params: &[&dyn rusqlite::types::ToSql],
) -> Result<Vec<MessageRow>> {
    let sql = format!(
        "SELECT {} FROM view_messages WHERE {} ORDER BY first_message_id, message_id",
        MESSAGE_COLUMNS, condition
    );
    let mut stmt = conn.prepare(&sql)?;

    let rows = stmt
        .query_map(params, message_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn message_row(row: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        message_id: MessageId(row.get::<_, i64>(0)? as u64),
        first_message_id: MessageId(row.get::<_, i64>(1)? as u64),
        type_id: row.get(2)?,
        channel_id: ChannelId(row.get::<_, i64>(3)? as u64),
        user_id: UserId(row.get::<_, i64>(4)? as u64),
        server_id: ServerId(row.get::<_, i64>(5)? as u64),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::into_groups;

    const ROLE: MessageType = MessageType::RoleMessage;

    fn track(db: &Database, ids: &[u64], channel: u64, user: u64, server: u64) -> MessageId {
        let ids: Vec<MessageId> = ids.iter().copied().map(MessageId).collect();
        db.add_messages(&ids, ROLE, ChannelId(channel), UserId(user), ServerId(server))
            .unwrap()
    }

    #[test]
    fn first_message_id_is_the_minimum() {
        let db = Database::open_in_memory().unwrap();
        let first = track(&db, &[21, 20, 22], 5, 1, 1);
        assert_eq!(first, MessageId(20));

        let rows = db.get_messages_of_type(ROLE).unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.first_message_id == MessageId(20)));
    }

    #[test]
    fn empty_group_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        let result = db.add_messages(&[], ROLE, ChannelId(1), UserId(1), ServerId(1));
        assert!(result.is_err());
    }

    #[test]
    fn scoped_queries_filter_by_dimension() {
        let db = Database::open_in_memory().unwrap();
        track(&db, &[10, 11], 5, 1, 100);
        track(&db, &[20], 6, 2, 100);
        track(&db, &[30], 5, 1, 200);

        let user_rows = db.get_messages_of_type_and_user(ROLE, UserId(1), ServerId(100)).unwrap();
        assert_eq!(into_groups(user_rows).len(), 1);

        let server_rows = db.get_messages_of_type_and_server(ROLE, ServerId(100)).unwrap();
        assert_eq!(into_groups(server_rows).len(), 2);

        let channel_rows = db.get_messages_of_type_and_channel(ROLE, ChannelId(5)).unwrap();
        let groups = into_groups(channel_rows);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].first_message_id, MessageId(10));
    }

    #[test]
    fn delete_messages_removes_whole_group_and_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        let first = track(&db, &[10, 11], 5, 1, 1);
        track(&db, &[20], 5, 1, 1);

        assert_eq!(db.delete_messages(first).unwrap(), 2);
        assert_eq!(db.delete_messages(first).unwrap(), 0);

        let rows = db.get_messages_of_type(ROLE).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].message_id, MessageId(20));
    }

    #[test]
    fn duplicate_role_category_is_reported() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.add_role_category(ServerId(1), "Games", Some("video_game")).unwrap());
        assert!(!db.add_role_category(ServerId(1), "Games", None).unwrap());
        assert!(db.add_role_category(ServerId(2), "Games", None).unwrap());

        let categories = db.get_role_categories(ServerId(1)).unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].emoji.as_deref(), Some("video_game"));
    }

    #[test]
    fn linked_roles_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let role = LinkedRoleRow {
            server_id: ServerId(1),
            role_id: RoleId(5),
            short_description: "Admin".into(),
            long_description: None,
            emoji: ":star:".into(),
        };
        assert!(db.link_role(&role).unwrap());
        assert!(!db.link_role(&role).unwrap());
        assert_eq!(db.get_linked_role_ids(ServerId(1)).unwrap(), vec![RoleId(5)]);
        assert!(db.get_linked_role_ids(ServerId(2)).unwrap().is_empty());
    }

    #[test]
    fn servers_and_users_are_idempotent() {
        let db = Database::open_in_memory().unwrap();
        db.add_server(ServerId(1)).unwrap();
        db.add_server(ServerId(1)).unwrap();
        db.add_user(UserId(7)).unwrap();
        db.add_user(UserId(7)).unwrap();

        let count: i64 = db
            .with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM servers", [], |r| r.get(0))?))
            .unwrap();
        assert_eq!(count, 1);
    }
}
