//! HTTP request handlers.

pub mod admin;
pub mod events;
pub mod health;
pub mod menu;
pub mod webhook;
