use async_trait::async_trait;

use me_types::events::{ButtonStyle, InteractionEvent};

use crate::component::{Button, LinkedView};
use crate::error::Result;
use crate::host::HostContext;
use crate::screens::{CreateRole, RoleCategoryManage};
use crate::view::{Screen, View};

pub struct Admin;

#[async_trait]
impl Screen for Admin {
    fn name(&self) -> &'static str {
        "Admin"
    }

    async fn build(&self, _host: &HostContext, view: &mut View) -> Result<()> {
        view.add(
            Button::new("Add Role")
                .style(ButtonStyle::Primary)
                .links_to(LinkedView::screen(CreateRole)),
        );
        view.add(Button::new("Manage Categories").links_to(LinkedView::screen(RoleCategoryManage)));
        Ok(())
    }

    async fn message(
        &self,
        _host: &HostContext,
        _view: &View,
        _event: Option<&InteractionEvent>,
    ) -> Result<String> {
        Ok(":desktop:  **Admin Menu**".to_string())
    }
}
