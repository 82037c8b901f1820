use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use me_types::context::ContextMap;
use me_types::events::{InteractionEvent, ModalForm, OutboundMessage};
use me_types::ids::{ChannelId, MessageId};
use me_types::models::Message;

use crate::component::{Button, Component, LinkedView, NavOptions};
use crate::config::BotConfig;
use crate::error::{Result, ViewError};
use crate::host::HostContext;
use crate::registry::{ViewHandle, ViewId};

/// The behavior of one kind of dialog.
///
/// A screen is stateless; per-dialog state lives in the [`View`] it builds.
#[async_trait]
pub trait Screen: Send + Sync {
    fn name(&self) -> &'static str;

    /// `None` keeps the view alive for as long as the process runs.
    fn timeout(&self, config: &BotConfig) -> Option<Duration> {
        Some(config.view_timeout)
    }

    /// Keys copied from the previous context into this view's outgoing one.
    fn persistent_context(&self) -> &[&str] {
        &[]
    }

    /// Populate `view` with its components.
    async fn build(&self, host: &HostContext, view: &mut View) -> Result<()>;

    /// Message text shown above the components.
    async fn message(
        &self,
        host: &HostContext,
        view: &View,
        event: Option<&InteractionEvent>,
    ) -> Result<String>;

    /// Adjust the outgoing context after components have contributed.
    fn extend_context(&self, _view: &View, _context: &mut ContextMap) {}
}

/// Inputs a view is built from.
#[derive(Debug, Clone, Default)]
pub struct ViewArgs {
    pub previous_context: ContextMap,
    pub previous_interaction: Option<InteractionEvent>,
    pub previous_view: Option<ViewId>,
}

/// What a click asks the engine to do next.
#[derive(Debug)]
pub enum Activation {
    Navigate(NavOptions),
    OpenModal(ModalForm),
}

pub struct View {
    id: ViewId,
    screen: Arc<dyn Screen>,
    components: Vec<Component>,
    previous_context: ContextMap,
    persistent_context: Vec<String>,
    previous_view: Option<ViewId>,
    previous_interaction: Option<InteractionEvent>,
    timeout: Option<Duration>,
}

impl View {
    pub fn new(screen: Arc<dyn Screen>, config: &BotConfig, args: ViewArgs) -> Self {
        let persistent_context = screen
            .persistent_context()
            .iter()
            .map(|key| key.to_string())
            .collect();
        let timeout = screen.timeout(config);
        Self {
            id: ViewId::new(),
            screen,
            components: Vec::new(),
            previous_context: args.previous_context,
            persistent_context,
            previous_view: args.previous_view,
            previous_interaction: args.previous_interaction,
            timeout,
        }
    }

    /// Build a view from `screen` and track it in the host's registry.
    pub async fn build(
        host: &HostContext,
        screen: Arc<dyn Screen>,
        args: ViewArgs,
    ) -> Result<ViewHandle> {
        let mut view = View::new(screen.clone(), host.config(), args);
        screen.build(host, &mut view).await?;
        debug!("Built {} view {}", screen.name(), view.id);

        let id = view.id;
        let timeout = view.timeout;
        let handle = Arc::new(Mutex::new(view));
        host.views().insert(id, handle.clone(), timeout).await;
        Ok(handle)
    }

    /// Make a top-level view answer clicks on its components after a
    /// restart. Registered views never expire.
    pub async fn register(host: &HostContext, handle: &ViewHandle) -> Result<()> {
        let (id, custom_ids) = {
            let view = handle.lock().await;
            let ids: Vec<String> = view
                .components
                .iter()
                .filter(|c| c.render().is_some())
                .map(|c| c.custom_id().to_string())
                .collect();
            (view.id, ids)
        };

        host.views().insert(id, handle.clone(), None).await;
        host.views().bind_persistent(id, &custom_ids).await;
        host.client().register_components(&custom_ids).await?;
        Ok(())
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn screen_name(&self) -> &'static str {
        self.screen.name()
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn component(&self, custom_id: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.custom_id() == custom_id)
    }

    pub fn add(&mut self, component: impl Into<Component>) {
        self.components.push(component.into());
    }

    pub fn previous_context(&self) -> &ContextMap {
        &self.previous_context
    }

    /// Screens may seed defaults here while building.
    pub fn previous_context_mut(&mut self) -> &mut ContextMap {
        &mut self.previous_context
    }

    pub fn persistent_context(&self) -> &[String] {
        &self.persistent_context
    }

    pub fn previous_view(&self) -> Option<ViewId> {
        self.previous_view
    }

    pub fn set_previous_view(&mut self, previous_view: Option<ViewId>) {
        self.previous_view = previous_view;
    }

    pub fn previous_interaction(&self) -> Option<&InteractionEvent> {
        self.previous_interaction.as_ref()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    /// A "Back" button to the view that led here. Without one, an error unless
    /// `ignore_missing`, in which case nothing is added.
    pub fn add_back_button(&mut self, ignore_missing: bool) -> Result<()> {
        match self.previous_view {
            Some(previous) => {
                self.add(Button::new("Back").links_to(LinkedView::Instance(previous)));
                Ok(())
            }
            None if ignore_missing => Ok(()),
            None => Err(ViewError::Precondition(format!(
                "{} view has no previous view to go back to",
                self.screen.name()
            ))),
        }
    }

    /// The outgoing context for a click on `clicked_id`.
    pub fn context(&self, clicked_id: Option<&str>) -> ContextMap {
        let mut context = aggregate_context(
            &self.previous_context,
            &self.persistent_context,
            &self.components,
            clicked_id,
        );
        self.screen.extend_context(self, &mut context);
        context
    }

    /// Apply a click to the view's own state.
    pub fn activate(&mut self, custom_id: &str, event: &InteractionEvent) -> Result<Activation> {
        let idx = self
            .components
            .iter()
            .position(|c| c.custom_id() == custom_id)
            .ok_or_else(|| missing_component(self.screen.name(), custom_id))?;

        match &mut self.components[idx] {
            Component::Button(button) => {
                self.previous_context.merge(button.overrides().clone());
                Ok(Activation::Navigate(button.nav()))
            }
            Component::Select(select) => {
                select.choose(event.values.clone());
                Ok(Activation::Navigate(select.nav()))
            }
            Component::ModalButton(button) => {
                Ok(Activation::OpenModal(button.open(&self.previous_context)))
            }
            Component::TextField(_) => Err(ViewError::Configuration(format!(
                "{} is a text field and cannot be clicked",
                custom_id
            ))),
        }
    }

    /// Store a submitted form on the modal button that opened it.
    pub fn submit_modal(
        &mut self,
        button_id: &str,
        fields: &[(String, String)],
    ) -> Result<NavOptions> {
        let screen = self.screen.name();
        match self.components.iter_mut().find(|c| c.custom_id() == button_id) {
            Some(Component::ModalButton(button)) => {
                button.submit(fields);
                Ok(button.nav())
            }
            Some(_) => Err(ViewError::Configuration(format!(
                "{} is not a modal button",
                button_id
            ))),
            None => Err(missing_component(screen, button_id)),
        }
    }

    pub async fn render(
        &self,
        host: &HostContext,
        event: Option<&InteractionEvent>,
    ) -> Result<OutboundMessage> {
        let content = self.screen.message(host, self, event).await?;
        Ok(OutboundMessage {
            content,
            components: self.components.iter().filter_map(Component::render).collect(),
            ephemeral: false,
            delete_after_secs: None,
        })
    }

    /// Show the view.
    ///
    /// A channel with `ephemeral` false gets a new public message. Otherwise
    /// the interaction is answered: by editing its message when `replace`, or
    /// with a new response that expires with the view when ephemeral.
    pub async fn display(
        &self,
        host: &HostContext,
        channel_id: Option<ChannelId>,
        event: Option<&InteractionEvent>,
        ephemeral: bool,
        replace: bool,
    ) -> Result<Message> {
        let mut outbound = self.render(host, event.or(self.previous_interaction.as_ref())).await?;
        let client = host.client();

        let message = match (channel_id, event) {
            (Some(channel_id), _) if !ephemeral => {
                let sent = client.send_message(channel_id, outbound).await?;
                Message { ephemeral: false, ..sent }
            }
            (_, Some(event)) => {
                if ephemeral {
                    outbound = outbound.ephemeral(self.timeout.map(|t| t.as_secs()));
                }
                let sent = if replace {
                    client.edit_response(event, outbound).await?
                } else {
                    client.respond(event, outbound).await?
                };
                Message { ephemeral, ..sent }
            }
            _ => {
                return Err(ViewError::Precondition(format!(
                    "{} view needs a channel or an interaction to display in",
                    self.screen.name()
                )));
            }
        };

        host.views().bind_message(message.id, self.id).await;
        host.views().touch(self.id, self.timeout).await;
        Ok(message)
    }

    /// Re-render onto messages sent before, e.g. after a restart.
    pub async fn update(
        &self,
        host: &HostContext,
        message_ids: &[MessageId],
        channel_id: ChannelId,
    ) -> Result<Vec<Message>> {
        let outbound = self.render(host, None).await?;
        let client = host.client();

        let mut updated = Vec::with_capacity(message_ids.len());
        for message_id in message_ids {
            let message = client.fetch_message(channel_id, *message_id).await?;
            let message = client.edit_message(&message, outbound.clone()).await?;
            host.views().bind_message(message.id, self.id).await;
            updated.push(message);
        }
        Ok(updated)
    }
}

/// The persistent subset of `previous`, then every component's contribution
/// in declaration order. A later contribution overwrites an earlier one with
/// the same key.
pub fn aggregate_context(
    previous: &ContextMap,
    persistent: &[String],
    components: &[Component],
    clicked_id: Option<&str>,
) -> ContextMap {
    let mut context = previous.retain_keys(persistent);
    for component in components {
        context.merge(component.contribute(previous, clicked_id));
    }
    context
}

fn missing_component(screen: &str, custom_id: &str) -> ViewError {
    ViewError::Configuration(format!("{} view has no component {}", screen, custom_id))
}
