//! sevens-cli library - client for the album picker
//!
//! Keeps history, preferences and the spin counter on local disk and asks
//! sevens-picker for random albums.

pub mod commands;
pub mod picker_client;
pub mod session;

pub use commands::{HistoryFilter, PickOptions, PickOutcome, DEFAULT_MIN_RATING};
pub use picker_client::{PickerClient, PickerError};
pub use session::ClientSession;
