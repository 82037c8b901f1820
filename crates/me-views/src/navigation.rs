//! Click and submit handling: apply the interaction to the owning view,
//! resolve the linked view, then show it.
//!
//! The owning view's lock is always released before the target is built or
//! locked, so a button linking back to its own view cannot deadlock.

use tracing::{error, info, warn};

use me_types::events::{InteractionEvent, OutboundMessage};
use me_types::models::Message;

use crate::component::{LinkedView, NavOptions};
use crate::error::{Result, ViewError};
use crate::host::HostContext;
use crate::registry::ViewHandle;
use crate::view::{Activation, View, ViewArgs};

pub const FAILURE_NOTICE: &str = "Oops! Something went wrong.";

/// Handle a click on `component_id` of `owner`.
///
/// Modal buttons open their form and return `None`; the navigation happens
/// when the form comes back through [`submit_modal`].
pub async fn callback(
    host: &HostContext,
    owner: &ViewHandle,
    component_id: &str,
    event: &InteractionEvent,
) -> Result<Option<Message>> {
    let (owner_id, activation) = {
        let mut view = owner.lock().await;
        let activation = view.activate(component_id, event)?;
        (view.id(), activation)
    };

    match activation {
        Activation::OpenModal(form) => {
            let modal_id = form.custom_id.clone();
            host.client().send_modal(event, form).await?;
            host.views()
                .bind_modal(event.user_id, modal_id, owner_id, component_id.to_string())
                .await;
            Ok(None)
        }
        Activation::Navigate(nav) => navigate(host, owner, component_id, event, nav)
            .await
            .map(Some),
    }
}

/// Handle a submitted form for the modal button `button_id` of `owner`.
///
/// A failure after the form was accepted is reported to the user with a
/// short ephemeral notice, then returned.
pub async fn submit_modal(
    host: &HostContext,
    owner: &ViewHandle,
    button_id: &str,
    event: &InteractionEvent,
) -> Result<Option<Message>> {
    let nav = owner.lock().await.submit_modal(button_id, &event.fields)?;

    match navigate(host, owner, button_id, event, nav).await {
        Ok(message) => Ok(Some(message)),
        Err(e) => {
            error!("Modal {} failed after submit: {}", button_id, e);
            let notice = OutboundMessage::text(FAILURE_NOTICE).ephemeral(None);
            if let Err(report) = host.client().respond(event, notice).await {
                warn!("Could not tell user {} about the failure: {}", event.user_id, report);
            }
            Err(e)
        }
    }
}

async fn navigate(
    host: &HostContext,
    owner: &ViewHandle,
    component_id: &str,
    event: &InteractionEvent,
    nav: NavOptions,
) -> Result<Message> {
    let target = resolve_linked_view(host, owner, component_id, event).await?;
    let view = target.lock().await;
    info!(
        "User {} -> {} view {} via {}",
        event.user_id,
        view.screen_name(),
        view.id(),
        component_id
    );
    view.display(host, None, Some(event), nav.ephemeral, nav.replace).await
}

/// The view a click on `component_id` leads to.
///
/// A live instance is reused and its back-link moved to `owner`. A screen is
/// built fresh from `owner`'s outgoing context.
pub async fn resolve_linked_view(
    host: &HostContext,
    owner: &ViewHandle,
    component_id: &str,
    event: &InteractionEvent,
) -> Result<ViewHandle> {
    let (owner_id, link, context) = {
        let view = owner.lock().await;
        let component = view.component(component_id).ok_or_else(|| {
            ViewError::Configuration(format!(
                "{} view has no component {}",
                view.screen_name(),
                component_id
            ))
        })?;
        let link = component.link().cloned().ok_or_else(|| {
            ViewError::Configuration(format!("{} has no linked view", component_id))
        })?;
        let context = match link {
            LinkedView::Screen(_) => view.context(Some(component_id)),
            LinkedView::Instance(_) => Default::default(),
        };
        (view.id(), link, context)
    };

    match link {
        LinkedView::Instance(target_id) => {
            let target = host.views().get(target_id).await.ok_or_else(|| {
                ViewError::Precondition(format!("view {} has expired", target_id))
            })?;
            if target_id != owner_id {
                target.lock().await.set_previous_view(Some(owner_id));
            }
            Ok(target)
        }
        LinkedView::Screen(screen) => {
            let args = ViewArgs {
                previous_context: context,
                previous_interaction: Some(event.clone()),
                previous_view: Some(owner_id),
            };
            View::build(host, screen, args).await
        }
    }
}
