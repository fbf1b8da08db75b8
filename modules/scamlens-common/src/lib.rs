pub mod config;
pub mod error;
pub mod phone;

pub use config::Config;
pub use error::{Result, ScamLensError};
pub use phone::find_phone_numbers;
