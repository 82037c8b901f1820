//! Shared fixtures: a recording chat client and a host over an in-memory
//! store.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use me_db::Database;
use me_types::events::{InteractionEvent, ModalForm, OutboundMessage, RenderedComponent};
use me_types::ids::{ChannelId, MessageId, ServerId, UserId};
use me_types::listing::Listing;
use me_types::models::Message;
use me_views::{BotConfig, ChatClient, ClientError, HostContext};

pub const SERVER: ServerId = ServerId(1);
pub const CHANNEL: ChannelId = ChannelId(5);
pub const USER: UserId = UserId(7);

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Send(ChannelId, OutboundMessage),
    Respond(u64, OutboundMessage),
    EditResponse(u64, OutboundMessage),
    Modal(u64, ModalForm),
    Edit(MessageId, OutboundMessage),
    Delete(ChannelId, Vec<MessageId>),
    Register(Vec<String>),
}

/// Chat client that keeps messages in memory and records every call.
pub struct MockClient {
    next_id: AtomicU64,
    messages: Mutex<HashMap<MessageId, Message>>,
    calls: Mutex<Vec<Call>>,
    roles: Mutex<Listing>,
    channels: Mutex<Listing>,
    offline: AtomicBool,
}

impl MockClient {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1000),
            messages: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            roles: Mutex::new(Listing::default()),
            channels: Mutex::new(Listing::default()),
            offline: AtomicBool::new(false),
        }
    }

    pub fn with_roles(self, roles: Listing) -> Self {
        *self.roles.lock().unwrap() = roles;
        self
    }

    pub fn with_channels(self, channels: Listing) -> Self {
        *self.channels.lock().unwrap() = channels;
        self
    }

    /// Make every later channel send fail.
    pub fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    /// Pretend these messages were posted before the test started.
    pub fn seed(&self, channel_id: ChannelId, ids: &[u64]) {
        let mut messages = self.messages.lock().unwrap();
        for id in ids {
            messages.insert(
                MessageId(*id),
                Message {
                    id: MessageId(*id),
                    channel_id,
                    server_id: Some(SERVER),
                    content: String::new(),
                    ephemeral: false,
                },
            );
        }
    }

    pub fn exists(&self, id: MessageId) -> bool {
        self.messages.lock().unwrap().contains_key(&id)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn deletions(&self) -> Vec<(ChannelId, Vec<MessageId>)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Delete(channel, ids) => Some((channel, ids)),
                _ => None,
            })
            .collect()
    }

    pub fn responses(&self) -> Vec<OutboundMessage> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Respond(_, message) => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn modals(&self) -> Vec<ModalForm> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Modal(_, form) => Some(form),
                _ => None,
            })
            .collect()
    }

    /// The most recent message body shown to anyone.
    pub fn last_outbound(&self) -> OutboundMessage {
        self.calls()
            .into_iter()
            .rev()
            .find_map(|call| match call {
                Call::Send(_, m)
                | Call::Respond(_, m)
                | Call::EditResponse(_, m)
                | Call::Edit(_, m) => Some(m),
                _ => None,
            })
            .expect("nothing was shown")
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn store(
        &self,
        id: MessageId,
        channel_id: ChannelId,
        server_id: Option<ServerId>,
        outbound: &OutboundMessage,
    ) -> Message {
        let message = Message {
            id,
            channel_id,
            server_id,
            content: outbound.content.clone(),
            ephemeral: outbound.ephemeral,
        };
        self.messages.lock().unwrap().insert(id, message.clone());
        message
    }

    fn new_id(&self) -> MessageId {
        MessageId(self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

#[async_trait]
impl ChatClient for MockClient {
    async fn send_message(
        &self,
        channel_id: ChannelId,
        message: OutboundMessage,
    ) -> Result<Message, ClientError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ClientError::Request("gateway unavailable".into()));
        }
        self.record(Call::Send(channel_id, message.clone()));
        Ok(self.store(self.new_id(), channel_id, Some(SERVER), &message))
    }

    async fn respond(
        &self,
        event: &InteractionEvent,
        message: OutboundMessage,
    ) -> Result<Message, ClientError> {
        self.record(Call::Respond(event.id, message.clone()));
        let channel_id = event.channel_id.unwrap_or(CHANNEL);
        Ok(self.store(self.new_id(), channel_id, event.server_id, &message))
    }

    async fn edit_response(
        &self,
        event: &InteractionEvent,
        message: OutboundMessage,
    ) -> Result<Message, ClientError> {
        self.record(Call::EditResponse(event.id, message.clone()));
        let channel_id = event.channel_id.unwrap_or(CHANNEL);
        let id = match event.message_id {
            Some(id) if self.exists(id) => id,
            _ => self.new_id(),
        };
        Ok(self.store(id, channel_id, event.server_id, &message))
    }

    async fn send_modal(
        &self,
        event: &InteractionEvent,
        form: ModalForm,
    ) -> Result<(), ClientError> {
        self.record(Call::Modal(event.id, form));
        Ok(())
    }

    async fn fetch_message(
        &self,
        _channel_id: ChannelId,
        message_id: MessageId,
    ) -> Result<Message, ClientError> {
        self.messages
            .lock()
            .unwrap()
            .get(&message_id)
            .cloned()
            .ok_or(ClientError::NotFound)
    }

    async fn edit_message(
        &self,
        message: &Message,
        update: OutboundMessage,
    ) -> Result<Message, ClientError> {
        self.record(Call::Edit(message.id, update.clone()));
        if !self.exists(message.id) {
            return Err(ClientError::NotFound);
        }
        Ok(self.store(message.id, message.channel_id, message.server_id, &update))
    }

    async fn delete_messages(
        &self,
        channel_id: ChannelId,
        message_ids: &[MessageId],
    ) -> Result<(), ClientError> {
        self.record(Call::Delete(channel_id, message_ids.to_vec()));
        let mut messages = self.messages.lock().unwrap();
        for id in message_ids {
            messages.remove(id);
        }
        Ok(())
    }

    async fn fetch_roles(
        &self,
        _server_id: ServerId,
        _user_id: UserId,
    ) -> Result<Listing, ClientError> {
        Ok(self.roles.lock().unwrap().clone())
    }

    async fn fetch_channels(
        &self,
        _server_id: ServerId,
        _user_id: UserId,
    ) -> Result<Listing, ClientError> {
        Ok(self.channels.lock().unwrap().clone())
    }

    async fn register_components(&self, custom_ids: &[String]) -> Result<(), ClientError> {
        self.record(Call::Register(custom_ids.to_vec()));
        Ok(())
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn host_with(client: MockClient) -> (HostContext, Arc<MockClient>) {
    init_tracing();
    let client = Arc::new(client);
    let db = Arc::new(Database::open_in_memory().expect("in-memory database"));
    let host = HostContext::new(client.clone(), db, BotConfig::default());
    (host, client)
}

pub fn host() -> (HostContext, Arc<MockClient>) {
    host_with(MockClient::new())
}

static NEXT_EVENT: AtomicU64 = AtomicU64::new(1);

fn event_id() -> u64 {
    NEXT_EVENT.fetch_add(1, Ordering::SeqCst)
}

/// A click on `custom_id` of `message`, made in the test server.
pub fn click(message: &Message, custom_id: &str) -> InteractionEvent {
    InteractionEvent::component(event_id(), USER, custom_id)
        .in_server(SERVER, CHANNEL)
        .on_message(message.id)
}

pub fn choose(message: &Message, custom_id: &str, values: &[&str]) -> InteractionEvent {
    click(message, custom_id).with_values(values.iter().map(|v| v.to_string()).collect())
}

pub fn submit(modal_id: &str, fields: &[(&str, &str)]) -> InteractionEvent {
    let fields = fields.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    InteractionEvent::modal_submit(event_id(), USER, modal_id, fields).in_server(SERVER, CHANNEL)
}

pub fn slash_command() -> InteractionEvent {
    InteractionEvent::command(event_id(), USER).in_server(SERVER, CHANNEL)
}

/// The rendered component with this custom id.
pub fn component<'a>(
    outbound: &'a OutboundMessage,
    custom_id: &str,
) -> Option<&'a RenderedComponent> {
    outbound.components.iter().find(|c| c.custom_id() == custom_id)
}

pub fn is_disabled(outbound: &OutboundMessage, custom_id: &str) -> bool {
    match component(outbound, custom_id) {
        Some(RenderedComponent::Button { disabled, .. })
        | Some(RenderedComponent::Select { disabled, .. }) => *disabled,
        None => panic!("no component {}", custom_id),
    }
}
