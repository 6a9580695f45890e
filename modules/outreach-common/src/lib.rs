pub mod config;
pub mod contacts;
pub mod error;
pub mod file_config;
pub mod poll;
pub mod types;

pub use config::AppConfig;
pub use contacts::Contact;
pub use error::{OutreachError, Result};
pub use file_config::FileConfig;
pub use types::*;
