//! # Collectors Module
//!
//! Fetching and emission for one statistics endpoint.
//!
//! ## Architecture
//!
//! - **`Transport` trait**: issues the GET, implemented for `reqwest::Client`
//! - **`Target`**: a statistics URL, its `url` tag and its document layout
//! - **`Orchestrator`**: fetch, status check and decode for one cycle, with one
//!   terminal [`FetchError`] per failed cycle
//! - **`emit`**: maps a decoded tree to tagged observations
//! - **`extract`**: the single counter-walking rule shared by every section

pub mod emitter;
pub mod extractor;
pub mod orchestrator;
pub mod target;
pub mod transport;

// Re-export the main types for easy access
pub use emitter::{
    emit,
    COUNTER_MEASUREMENT,
    MEMORY_CONTEXT_MEASUREMENT,
    MEMORY_MEASUREMENT,
};
pub use extractor::extract;
pub use orchestrator::{
    Collection,
    FetchError,
    Orchestrator,
};
pub use target::{
    Document,
    Layout,
    Target,
};
pub use transport::{
    HttpResponse,
    Transport,
    TransportError,
};
