pub mod config;
pub mod error;
pub mod factory;
pub mod pipeline;
pub mod providers;
pub mod traits;
pub mod types;

pub use config::*;
pub use error::{RerankError, ScorerError};
pub use factory::*;
pub use pipeline::*;
pub use traits::*;
pub use types::*;
