//! Trello adapter: implements `NotificationSource` over the Trello REST API.

pub mod client;
pub mod model;

pub use client::TrelloClient;
