// catbox-cli
//
// The client lives in `api` and can be used on its own; `main.rs` puts the
// interactive menu from `ui` in front of it. `config` decides which account
// and endpoint the client starts with, `error` holds what the client can
// fail with.
pub mod api;
pub mod config;
pub mod error;
pub mod ui;

pub use api::{CatboxClient, UploadOutcome, DEFAULT_API_URL};
pub use config::Settings;
pub use error::{CatboxError, Result};
