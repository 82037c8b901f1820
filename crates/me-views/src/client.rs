use async_trait::async_trait;
use thiserror::Error;

use me_types::events::{InteractionEvent, ModalForm, OutboundMessage};
use me_types::ids::{ChannelId, MessageId, ServerId, UserId};
use me_types::listing::Listing;
use me_types::models::Message;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The message, channel or interaction no longer exists.
    #[error("Not found")]
    NotFound,

    /// Any other platform failure, as reported by the client.
    #[error("Request failed: {0}")]
    Request(String),
}

/// Operations the engine needs from the chat platform client.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Post a new message in a channel.
    async fn send_message(
        &self,
        channel_id: ChannelId,
        message: OutboundMessage,
    ) -> Result<Message, ClientError>;

    /// Respond to an interaction. Once it has a response, further calls
    /// send follow-up messages.
    async fn respond(
        &self,
        event: &InteractionEvent,
        message: OutboundMessage,
    ) -> Result<Message, ClientError>;

    /// Respond to a component interaction by editing the message it came from.
    async fn edit_response(
        &self,
        event: &InteractionEvent,
        message: OutboundMessage,
    ) -> Result<Message, ClientError>;

    async fn send_modal(&self, event: &InteractionEvent, form: ModalForm)
    -> Result<(), ClientError>;

    async fn fetch_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> Result<Message, ClientError>;

    async fn edit_message(
        &self,
        message: &Message,
        update: OutboundMessage,
    ) -> Result<Message, ClientError>;

    async fn delete_messages(
        &self,
        channel_id: ChannelId,
        message_ids: &[MessageId],
    ) -> Result<(), ClientError>;

    /// Roles of a server, annotated with whether `user_id` may manage each one.
    async fn fetch_roles(&self, server_id: ServerId, user_id: UserId)
    -> Result<Listing, ClientError>;

    /// Channels of a server, annotated with whether `user_id` may manage
    /// each channel's permissions.
    async fn fetch_channels(
        &self,
        server_id: ServerId,
        user_id: UserId,
    ) -> Result<Listing, ClientError>;

    /// Make clicks on these component ids reach the bot after a restart.
    async fn register_components(&self, custom_ids: &[String]) -> Result<(), ClientError>;
}
