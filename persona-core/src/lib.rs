pub mod config;
pub mod error;
pub mod error_utils;
pub mod notice;
pub mod profile_url;
pub mod types;

pub use config::*;
pub use error::*;
pub use error_utils::*;
pub use notice::*;
pub use profile_url::*;
pub use types::*;
