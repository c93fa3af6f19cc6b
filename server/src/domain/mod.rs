//! Domain logic: dashboard model, filter expression engine, widget payloads

pub mod filter;
pub mod model;
pub mod widgets;
