pub mod error;
pub mod logging;

pub use error::{CriticError, CriticResult};
pub use logging::{setup_logging, LoggingConfig};
