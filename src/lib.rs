// Library entry so integration tests and external tools can reference
// internal modules. The binary (`main.rs`) uses the same set.
pub mod catalog;
pub mod constants;
pub mod database;
pub mod draft;
pub mod error;
pub mod handler;
pub mod i18n;
pub mod interactions;
pub mod media;
pub mod model;
pub mod replicate;
pub mod storage;
pub mod telegram;
pub mod ui;

pub use error::{BotError, BotResult};
pub use model::AppState;
