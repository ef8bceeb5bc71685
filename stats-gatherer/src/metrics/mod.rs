pub mod observation;
pub mod shared;
pub mod tree;

// Re-export the main types for easy access
pub use observation::*;
pub use shared::*;
pub use tree::*;
