//! Multi-step dialogs on top of a chat platform's message components.
//!
//! A [`view::Screen`] describes one kind of dialog; a [`view::View`] is a live
//! instance with its components and the context it was opened with. Clicks
//! are routed through [`host::HostContext::dispatch`], which builds or reuses
//! the linked view and shows it. [`group::ViewGroup`] shows a set of views as
//! one tracked display and keeps the number of tracked displays bounded.

pub mod client;
pub mod component;
pub mod config;
pub mod error;
pub mod group;
pub mod host;
pub mod modal;
pub mod navigation;
pub mod registry;
pub mod retention;
pub mod screens;
pub mod view;

pub use client::{ChatClient, ClientError};
pub use config::BotConfig;
pub use error::{Result, ViewError};
pub use group::{DisplayRequest, ViewGroup};
pub use host::HostContext;
pub use view::{Screen, View, ViewArgs};
