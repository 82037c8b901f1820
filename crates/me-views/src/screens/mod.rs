//! The role-management dialogs.

mod admin;
mod create_role;
mod missing_roles;
mod role_category;
mod role_panel;

pub use admin::Admin;
pub use create_role::{CreateRole, EMOJI_DEFAULT};
pub use missing_roles::MissingRoles;
pub use role_category::{RoleCategoryAdd, RoleCategoryManage};
pub use role_panel::RolePanel;

use std::sync::Arc;

use me_types::ids::{ServerId, UserId};
use me_types::listing::Listing;
use me_types::models::MessageType;

use crate::error::{Result, ViewError};
use crate::group::ViewGroup;
use crate::host::HostContext;
use crate::view::{View, ViewArgs};

pub const CHECK: &str = ":white_check_mark:";
pub const CRITICAL: &str = ":x:";

/// Context key for a one-off status line shown under a dialog's message.
pub(crate) const BANNER: &str = "banner";

/// The public role panel, one per channel.
pub async fn role_message_group(host: &HostContext) -> Result<ViewGroup> {
    let panel = View::build(host, Arc::new(RolePanel), ViewArgs::default()).await?;
    let policy = host.config().retention.with_max_per_channel(1);
    Ok(ViewGroup::new(MessageType::RoleMessage, vec![panel], policy))
}

pub fn is_emoji_format(emoji: &str) -> bool {
    emoji.len() > 2 && emoji.starts_with(':') && emoji.ends_with(':')
}

/// Trimmed `:name:` shortcode, or empty when nothing was entered.
pub fn validate_emoji(raw: &str) -> Result<String> {
    let emoji = raw.trim();
    if emoji.is_empty() || is_emoji_format(emoji) {
        Ok(emoji.to_string())
    } else {
        Err(ViewError::UserInput(format!(
            "Emoji should be in the format :emoji: not {}",
            emoji
        )))
    }
}

/// Server and user of the interaction that opened `view`.
pub(crate) fn interaction_scope(view: &View) -> Result<(ServerId, UserId)> {
    view.previous_interaction()
        .and_then(|event| event.server_id.map(|server| (server, event.user_id)))
        .ok_or_else(|| {
            ViewError::Precondition(format!("{} must be opened from a server", view.screen_name()))
        })
}

/// The server's roles as seen by the user, with roles that already have a
/// button marked as linked.
pub(crate) async fn server_roles(host: &HostContext, view: &View) -> Result<Listing> {
    let (server_id, user_id) = interaction_scope(view)?;
    let roles = host.client().fetch_roles(server_id, user_id).await?;
    let linked: Vec<u64> = host
        .db()
        .get_linked_role_ids(server_id)?
        .into_iter()
        .map(|id| id.get())
        .collect();
    Ok(roles.mark_linked(&linked))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emoji_validation() {
        assert_eq!(validate_emoji("  :tada: ").unwrap(), ":tada:");
        assert_eq!(validate_emoji("").unwrap(), "");
        assert!(matches!(validate_emoji("tada"), Err(ViewError::UserInput(_))));
        assert!(validate_emoji("::").is_err());
    }
}
