use std::time::Duration;

use async_trait::async_trait;

use me_types::events::InteractionEvent;

use crate::component::{Button, LinkedView};
use crate::config::BotConfig;
use crate::error::Result;
use crate::host::HostContext;
use crate::screens::Admin;
use crate::view::{Screen, View};

/// Public entry point posted in a channel. Never expires.
pub struct RolePanel;

#[async_trait]
impl Screen for RolePanel {
    fn name(&self) -> &'static str {
        "RolePanel"
    }

    fn timeout(&self, _config: &BotConfig) -> Option<Duration> {
        None
    }

    async fn build(&self, _host: &HostContext, view: &mut View) -> Result<()> {
        view.add(
            Button::new("Admin")
                .links_to(LinkedView::screen(Admin))
                .replace_message(false),
        );
        Ok(())
    }

    async fn message(
        &self,
        _host: &HostContext,
        _view: &View,
        _event: Option<&InteractionEvent>,
    ) -> Result<String> {
        Ok(format!(
            ":ballot_box_with_check:  **ME Bot Role Menu**\nBot restarted at {}",
            chrono::Local::now().format("%H:%M:%S")
        ))
    }
}
