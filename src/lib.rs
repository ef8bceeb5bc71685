#[macro_use]
extern crate tracing;

mod app;
mod logging;
pub mod sink;

pub use app::App;
pub use bind_stats_config::{
    Args,
    Config,
};
pub use logging::{
    init_errors,
    init_logging,
};
