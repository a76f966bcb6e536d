//! Command handlers for CLI operations

pub mod migrate;
pub mod send_menu;
pub mod serve;

pub use migrate::MigrateCommandHandler;
pub use send_menu::SendMenuCommandHandler;
pub use serve::ServeCommandHandler;
