pub mod context;
pub mod events;
pub mod filter;
pub mod ids;
pub mod listing;
pub mod models;
