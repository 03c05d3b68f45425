//! A chat bot gateway: keyword counting, tarot draws with model-written
//! readings, and matching users who drew the same card.

pub mod bot;
pub mod commands;
pub mod completion;
pub mod config;
pub mod consts;
pub mod context;
pub mod deck;
pub mod executor;
pub mod store;
pub mod transport;
