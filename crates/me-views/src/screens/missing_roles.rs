use async_trait::async_trait;

use me_types::events::InteractionEvent;

use crate::error::Result;
use crate::host::HostContext;
use crate::screens::server_roles;
use crate::view::{Screen, View};

/// Explains why a role is not offered in the role select.
pub struct MissingRoles;

#[async_trait]
impl Screen for MissingRoles {
    fn name(&self) -> &'static str {
        "MissingRoles"
    }

    async fn build(&self, _host: &HostContext, view: &mut View) -> Result<()> {
        view.add_back_button(false)
    }

    async fn message(
        &self,
        host: &HostContext,
        view: &View,
        _event: Option<&InteractionEvent>,
    ) -> Result<String> {
        let roles = server_roles(host, view).await?;

        let mut msg = String::new();
        let linked = roles.clone().retain(|row| row.linked);
        if !linked.is_empty() {
            msg.push_str(&format!("Already Linked Roles:\n{}\n\n", linked.names().join(" - ")));
        }
        let too_low = roles.retain(|row| !row.can_manage);
        if !too_low.is_empty() {
            msg.push_str(&format!("Role Too Low to Manage:\n{}\n\n", too_low.names().join(" - ")));
        }
        if msg.is_empty() {
            msg.push_str("Every role you can manage is already listed.");
        }
        Ok(msg)
    }
}
