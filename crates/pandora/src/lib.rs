//! Pandorabots adapter: implements `Responder` over the `talk-xml` endpoint.

pub mod client;
pub mod talk;

pub use client::PandoraClient;
