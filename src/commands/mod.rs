pub mod inspect;
pub mod serve;

// Re-export command functions for convenience
pub use inspect::{check_config, nav, render};
pub use serve::serve;
