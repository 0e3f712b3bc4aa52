pub mod api;
pub mod metrics;
pub mod state;

pub use api::create_router;
