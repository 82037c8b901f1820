use std::time::Duration;

use async_trait::async_trait;

use me_db::models::LinkedRoleRow;
use me_types::context::{ContextMap, ContextValue};
use me_types::events::{ButtonStyle, InteractionEvent};
use me_types::filter::{FilterChain, RowField, RowFilter};
use me_types::ids::RoleId;
use me_types::listing::Listing;

use crate::component::{Button, Component, LinkedView, Select, TextField};
use crate::error::{Result, ViewError};
use crate::host::HostContext;
use crate::modal::ModalButton;
use crate::screens::{
    BANNER, CHECK, CRITICAL, MissingRoles, interaction_scope, is_emoji_format, server_roles,
};
use crate::view::{Screen, View};

pub const EMOJI_DEFAULT: &str = ":star:";

const EXISTING_ROLE: &str = "Existing Discord Role";
const SHORT_DESCRIPTION: &str = "Short Description";
const LONG_DESCRIPTION: &str = "Long Description";
const ROLE_NAME: &str = "Discord Role Name";
const EMOJI: &str = "Emoji";
const SELECT_ROLE: &str = "Select Role";
const SELECT_ROLE_DESC: &str = "Select Role_desc";
const SELECT_CHANNEL: &str = "Select Channel";
const SELECT_CHANNEL_DESC: &str = "Select Channel_desc";
const NEW_CHANNEL: &str = "New Channel Name";
const CHANNEL_FILTER: &str = "channel_filter";
const CREATE: &str = "Create";

const PERSISTENT_KEYS: [&str; 11] = [
    EXISTING_ROLE,
    SHORT_DESCRIPTION,
    LONG_DESCRIPTION,
    ROLE_NAME,
    EMOJI,
    SELECT_ROLE,
    SELECT_ROLE_DESC,
    SELECT_CHANNEL,
    SELECT_CHANNEL_DESC,
    NEW_CHANNEL,
    CHANNEL_FILTER,
];

/// Dialog that puts a button for a server role on the role panel.
///
/// The dialog rebuilds itself on every click and carries the draft in its
/// persistent context. It starts by asking for a new or an existing role,
/// then lets the user pick a channel and edit the button's emoji and
/// descriptions. "Create" stays disabled until an existing role is chosen
/// and the emoji is a valid shortcode.
pub struct CreateRole;

#[async_trait]
impl Screen for CreateRole {
    fn name(&self) -> &'static str {
        "CreateRole"
    }

    fn persistent_context(&self) -> &[&str] {
        &PERSISTENT_KEYS
    }

    async fn build(&self, host: &HostContext, view: &mut View) -> Result<()> {
        if view.previous_context().filter(CHANNEL_FILTER).is_none() {
            let unlinked = FilterChain::new().with(RowFilter::is(RowField::Linked, false));
            view.previous_context_mut().insert(CHANNEL_FILTER, unlinked);
        }

        if view.previous_context().flag(CREATE) == Some(true) {
            match link_selected_role(host, view) {
                Ok(banner) => {
                    view.previous_context_mut().insert(BANNER, banner);
                    view.set_timeout(Some(Duration::from_secs(10)));
                    return view.add_back_button(true);
                }
                Err(ViewError::UserInput(reason)) => {
                    view.previous_context_mut()
                        .insert(BANNER, format!("{}  {}", CRITICAL, reason));
                }
                Err(e) => return Err(e),
            }
        }

        let mode = Draft::new(view.previous_context()).mode();
        if mode == Mode::ExistingRole {
            view.previous_context_mut().insert(ROLE_NAME, "");
        }

        let previous = view.previous_context().clone();
        let draft = Draft::new(&previous);

        match mode {
            Mode::PickChannel => {
                let channels = manageable_channels(host, view, &draft).await?;
                view.add(
                    Select::from_listing(SELECT_CHANNEL, &channels)
                        .links_to(LinkedView::screen(CreateRole)),
                );
            }
            Mode::ExistingRole => {
                let roles = assignable_roles(host, view).await?;
                if !roles.is_empty() {
                    view.add(
                        Select::from_listing(SELECT_ROLE, &roles)
                            .defaults_from(&previous)
                            .links_to(LinkedView::screen(CreateRole)),
                    );
                }
                view.add(
                    Button::new("Missing Roles?")
                        .row(4)
                        .links_to(LinkedView::screen(MissingRoles)),
                );
                view.add(
                    description_button(Some("New Discord Role"), true)
                        .style(ButtonStyle::Secondary)
                        .row(4),
                );
                view.add(description_button(None, false).style(draft.edit_style()));
                add_all(view, draft.channel_buttons());
            }
            Mode::NewRole => {
                view.add(
                    Button::new(EXISTING_ROLE)
                        .row(4)
                        .links_to(LinkedView::screen(CreateRole)),
                );
                view.add(description_button(None, true).style(draft.edit_style()));
                add_all(view, draft.channel_buttons());
            }
            Mode::Start => {
                view.add(description_button(Some("New Discord Role"), true));
                view.add(
                    Button::new(EXISTING_ROLE)
                        .style(ButtonStyle::Primary)
                        .links_to(LinkedView::screen(CreateRole)),
                );
            }
        }

        view.add(
            Button::new(CREATE)
                .style(ButtonStyle::Success)
                .row(4)
                .disabled(!draft.ready())
                .links_to(LinkedView::screen(CreateRole)),
        );
        Ok(())
    }

    async fn message(
        &self,
        host: &HostContext,
        view: &View,
        _event: Option<&InteractionEvent>,
    ) -> Result<String> {
        let draft = Draft::new(view.previous_context());

        let mut msg = if let Some(role) = draft.current_role_name() {
            let warning = if !draft.emoji_ok() {
                format!(
                    "    (WARNING: Emoji should be in the format :emoji:  not {})",
                    draft.raw_emoji()
                )
            } else if draft.emoji() == EMOJI_DEFAULT {
                "    (WARNING: Default Emoji)".to_string()
            } else {
                String::new()
            };
            let mut msg = format!(
                "Role:\t\t{}\nButton:\t{} {}{}\n",
                role,
                draft.emoji(),
                draft.short_description().unwrap_or(role),
                warning
            );
            if let Some(long) = draft.text(LONG_DESCRIPTION) {
                msg.push_str(&format!("Long Description: {}\n", long));
            }
            if let Some(channel) = draft.new_channel_name() {
                msg.push_str(&format!("New Channel: {}\n", channel));
            } else if let Some(channel) = draft.text(SELECT_CHANNEL_DESC) {
                msg.push_str(&format!("Channel: {}\n", channel));
            }
            msg
        } else if draft.mode() == Mode::ExistingRole {
            if assignable_roles(host, view).await?.is_empty() {
                "No roles to select from".to_string()
            } else {
                "Select a Discord Role to create a button for".to_string()
            }
        } else {
            "Create a new Discord Role?".to_string()
        };

        if let Some(banner) = draft.text(BANNER) {
            msg.push_str("\n\n");
            msg.push_str(banner);
        }
        Ok(msg)
    }

    fn extend_context(&self, view: &View, context: &mut ContextMap) {
        // Stay in existing-role mode unless a submitted name switched it off.
        if view.previous_context().flag(EXISTING_ROLE) == Some(true)
            && context.flag(EXISTING_ROLE) != Some(false)
        {
            context.insert(EXISTING_ROLE, true);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// "Select Channel" was clicked; only the channel select is shown.
    PickChannel,
    ExistingRole,
    /// A new role name has been entered.
    NewRole,
    Start,
}

/// Read access to the draft carried in a dialog's previous context.
struct Draft<'a> {
    context: &'a ContextMap,
}

impl<'a> Draft<'a> {
    fn new(context: &'a ContextMap) -> Self {
        Self { context }
    }

    /// Trimmed text; empty and "None" read as absent.
    fn text(&self, key: &str) -> Option<&'a str> {
        self.context
            .text(key)
            .map(str::trim)
            .filter(|value| !value.is_empty() && *value != "None")
    }

    fn mode(&self) -> Mode {
        if self.context.flag(SELECT_CHANNEL) == Some(true) {
            Mode::PickChannel
        } else if self.context.flag(EXISTING_ROLE) == Some(true) {
            Mode::ExistingRole
        } else if self.new_role_name().is_some() {
            Mode::NewRole
        } else {
            Mode::Start
        }
    }

    fn new_role_name(&self) -> Option<&'a str> {
        self.text(ROLE_NAME)
    }

    fn selected_role(&self) -> Option<RoleId> {
        self.text(SELECT_ROLE)?.parse().ok().map(RoleId)
    }

    fn current_role_name(&self) -> Option<&'a str> {
        self.new_role_name()
            .or_else(|| self.text(SELECT_ROLE_DESC))
            .or_else(|| self.text(SELECT_ROLE))
    }

    fn short_description(&self) -> Option<&'a str> {
        self.text(SHORT_DESCRIPTION).or_else(|| self.current_role_name())
    }

    /// Lowercase, spaces as dashes, only `[a-z0-9_-]`.
    fn new_channel_name(&self) -> Option<String> {
        let name: String = self
            .text(NEW_CHANNEL)?
            .replace(' ', "-")
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'))
            .collect();
        (!name.is_empty()).then_some(name)
    }

    fn existing_channel(&self) -> Option<u64> {
        self.text(SELECT_CHANNEL)?.parse().ok()
    }

    fn raw_emoji(&self) -> &'a str {
        self.text(EMOJI).unwrap_or(EMOJI_DEFAULT)
    }

    fn emoji_ok(&self) -> bool {
        is_emoji_format(self.raw_emoji())
    }

    fn emoji(&self) -> &'a str {
        if self.emoji_ok() { self.raw_emoji() } else { EMOJI_DEFAULT }
    }

    /// Highlight the edit button while the emoji still needs attention.
    fn edit_style(&self) -> ButtonStyle {
        if !self.emoji_ok() || self.emoji() == EMOJI_DEFAULT {
            ButtonStyle::Primary
        } else {
            ButtonStyle::Secondary
        }
    }

    fn ready(&self) -> bool {
        self.selected_role().is_some() && self.new_role_name().is_none() && self.emoji_ok()
    }

    /// Channel choice buttons, once a role has been named or chosen.
    fn channel_buttons(&self) -> Vec<Component> {
        if self.current_role_name().is_none() {
            return Vec::new();
        }
        if self.new_channel_name().is_none() && self.existing_channel().is_none() {
            vec![
                ModalButton::new("New Channel", "New Channel")
                    .field(
                        TextField::new(NEW_CHANNEL)
                            .placeholder("new-channel-name")
                            .max_length(100)
                            .required(true),
                    )
                    .links_to(LinkedView::screen(CreateRole))
                    .into(),
                Button::new(SELECT_CHANNEL)
                    .style(ButtonStyle::Primary)
                    .with_override(NEW_CHANNEL, "")
                    .links_to(LinkedView::screen(CreateRole))
                    .into(),
            ]
        } else {
            vec![
                Button::new("Cancel Channel")
                    .with_override(NEW_CHANNEL, ContextValue::Unset)
                    .with_override(SELECT_CHANNEL, ContextValue::Unset)
                    .with_override(SELECT_CHANNEL_DESC, ContextValue::Unset)
                    .links_to(LinkedView::screen(CreateRole))
                    .into(),
            ]
        }
    }
}

fn add_all(view: &mut View, components: Vec<Component>) {
    for component in components {
        view.add(component);
    }
}

/// Form for the role name, button emoji and descriptions. Entering a name
/// switches the dialog from an existing role to a new one.
fn description_button(label: Option<&str>, allow_name: bool) -> ModalButton {
    let mut parts = Vec::new();
    let mut allowed = Vec::new();
    if allow_name {
        parts.push("Role");
        allowed.push(ROLE_NAME);
    }
    parts.extend(["Emoji", "Descriptions"]);
    allowed.extend([EMOJI, SHORT_DESCRIPTION, LONG_DESCRIPTION]);

    let label = label.map(str::to_string).unwrap_or_else(|| format!("Edit {}", parts.join("/")));
    ModalButton::new(label, "Optional Descriptions")
        .field(
            TextField::new(ROLE_NAME)
                .placeholder("New role name here")
                .max_length(100)
                .required(true),
        )
        .field(
            TextField::new(SHORT_DESCRIPTION)
                .placeholder("(Default: role name) Name on button")
                .max_length(100),
        )
        .field(TextField::new(LONG_DESCRIPTION).paragraph().max_length(400))
        .field(TextField::new(EMOJI).placeholder("Paste emoji here, can edit later (:star:)"))
        .allow(&allowed)
        .on_filled(
            ROLE_NAME,
            ContextMap::new()
                .with(SELECT_ROLE, ContextValue::Unset)
                .with(SELECT_ROLE_DESC, ContextValue::Unset)
                .with(EXISTING_ROLE, false),
        )
        .links_to(LinkedView::screen(CreateRole))
}

/// Roles the user may manage that have no button yet.
async fn assignable_roles(host: &HostContext, view: &View) -> Result<Listing> {
    Ok(server_roles(host, view)
        .await?
        .retain(|row| row.can_manage && !row.linked))
}

async fn manageable_channels(
    host: &HostContext,
    view: &View,
    draft: &Draft<'_>,
) -> Result<Listing> {
    let (server_id, user_id) = interaction_scope(view)?;
    let channels = host.client().fetch_channels(server_id, user_id).await?;
    let channels = match draft.context.filter(CHANNEL_FILTER) {
        Some(filter) => filter.apply(channels),
        None => channels,
    };
    Ok(channels.retain(|row| row.can_manage))
}

fn link_selected_role(host: &HostContext, view: &View) -> Result<String> {
    let draft = Draft::new(view.previous_context());
    if !draft.ready() {
        return Err(ViewError::UserInput("Pick an existing role and a valid emoji first".into()));
    }
    let (server_id, _) = interaction_scope(view)?;
    let role_id = draft
        .selected_role()
        .ok_or_else(|| ViewError::UserInput("Pick an existing role first".into()))?;
    let role_name = draft.current_role_name().unwrap_or("role");
    let short_description = draft.short_description().unwrap_or(role_name);

    let row = LinkedRoleRow {
        server_id,
        role_id,
        short_description: short_description.to_string(),
        long_description: draft.text(LONG_DESCRIPTION).map(str::to_string),
        emoji: draft.emoji().to_string(),
    };
    if !host.db().link_role(&row)? {
        return Err(ViewError::UserInput(format!("{} already has a button", role_name)));
    }
    Ok(format!(
        "{}  Created button {} {} for {}",
        CHECK,
        draft.emoji(),
        short_description,
        role_name
    ))
}
