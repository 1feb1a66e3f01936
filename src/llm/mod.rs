pub mod assistant;
pub mod client;
pub mod prompts;
pub mod proxy_client;
pub mod types;

pub use assistant::*;
pub use client::*;
pub use prompts::*;
pub use proxy_client::*;
pub use types::*;
