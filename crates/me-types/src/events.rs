use serde::{Deserialize, Serialize};

use crate::ids::{ChannelId, MessageId, ServerId, UserId};

// -- Inbound --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    /// Slash command. Handled outside the view engine.
    Command,
    /// Button click or select change on a message component.
    Component,
    /// A modal form was submitted.
    ModalSubmit,
}

/// An interaction delivered by the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionEvent {
    pub id: u64,
    pub kind: InteractionKind,
    pub user_id: UserId,
    #[serde(default)]
    pub server_id: Option<ServerId>,
    #[serde(default)]
    pub channel_id: Option<ChannelId>,
    /// The message the clicked component is attached to.
    #[serde(default)]
    pub message_id: Option<MessageId>,
    /// Component id for clicks, modal id for submits.
    #[serde(default)]
    pub custom_id: Option<String>,
    /// Values chosen in a select menu.
    #[serde(default)]
    pub values: Vec<String>,
    /// Submitted modal fields as `(label, value)`.
    #[serde(default)]
    pub fields: Vec<(String, String)>,
}

impl InteractionEvent {
    pub fn component(id: u64, user_id: UserId, custom_id: impl Into<String>) -> Self {
        Self {
            id,
            kind: InteractionKind::Component,
            user_id,
            server_id: None,
            channel_id: None,
            message_id: None,
            custom_id: Some(custom_id.into()),
            values: Vec::new(),
            fields: Vec::new(),
        }
    }

    pub fn command(id: u64, user_id: UserId) -> Self {
        Self {
            kind: InteractionKind::Command,
            custom_id: None,
            ..Self::component(id, user_id, "")
        }
    }

    pub fn modal_submit(
        id: u64,
        user_id: UserId,
        modal_id: impl Into<String>,
        fields: Vec<(String, String)>,
    ) -> Self {
        Self {
            kind: InteractionKind::ModalSubmit,
            fields,
            ..Self::component(id, user_id, modal_id)
        }
    }

    pub fn in_server(mut self, server_id: ServerId, channel_id: ChannelId) -> Self {
        self.server_id = Some(server_id);
        self.channel_id = Some(channel_id);
        self
    }

    pub fn on_message(mut self, message_id: MessageId) -> Self {
        self.message_id = Some(message_id);
        self
    }

    pub fn with_values(mut self, values: Vec<String>) -> Self {
        self.values = values;
        self
    }
}

// -- Outbound --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonStyle {
    /// Blurple.
    Primary,
    /// Grey.
    Secondary,
    Success,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
    pub default: bool,
}

/// A component as sent to the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RenderedComponent {
    Button {
        custom_id: String,
        label: String,
        style: ButtonStyle,
        disabled: bool,
        row: Option<u8>,
        emoji: Option<String>,
    },
    Select {
        custom_id: String,
        placeholder: String,
        options: Vec<SelectOption>,
        min_values: u8,
        max_values: u8,
        disabled: bool,
        row: Option<u8>,
    },
}

impl RenderedComponent {
    pub fn custom_id(&self) -> &str {
        match self {
            Self::Button { custom_id, .. } | Self::Select { custom_id, .. } => custom_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub content: String,
    pub components: Vec<RenderedComponent>,
    pub ephemeral: bool,
    /// Seconds until the platform deletes the message on its own.
    pub delete_after_secs: Option<u64>,
}

impl OutboundMessage {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            components: Vec::new(),
            ephemeral: false,
            delete_after_secs: None,
        }
    }

    pub fn ephemeral(mut self, delete_after_secs: Option<u64>) -> Self {
        self.ephemeral = true;
        self.delete_after_secs = delete_after_secs;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextInputStyle {
    Short,
    Paragraph,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextInputSpec {
    pub label: String,
    pub placeholder: Option<String>,
    pub default: String,
    pub required: bool,
    pub max_length: Option<u16>,
    pub style: TextInputStyle,
}

/// A modal form as sent to the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModalForm {
    pub custom_id: String,
    pub title: String,
    pub fields: Vec<TextInputSpec>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_event_parses_with_defaults() {
        let raw = r#"{
            "id": 77,
            "kind": "component",
            "user_id": 9,
            "server_id": 1,
            "custom_id": "me:NavSelect:default:Select Role",
            "values": ["5"]
        }"#;
        let event: InteractionEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(event.kind, InteractionKind::Component);
        assert_eq!(event.server_id, Some(ServerId(1)));
        assert_eq!(event.channel_id, None);
        assert_eq!(event.values, vec!["5"]);
        assert!(event.fields.is_empty());
    }

    #[test]
    fn rendered_component_is_tagged() {
        let button = RenderedComponent::Button {
            custom_id: "me:NavButton:default:Admin".into(),
            label: "Admin".into(),
            style: ButtonStyle::Secondary,
            disabled: false,
            row: None,
            emoji: None,
        };
        let json = serde_json::to_value(&button).unwrap();
        assert_eq!(json["type"], "button");
        assert_eq!(json["style"], "secondary");
        assert_eq!(button.custom_id(), "me:NavButton:default:Admin");
    }
}
