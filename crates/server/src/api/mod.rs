pub mod handlers;
pub mod middleware;
pub mod missions;
pub mod routes;
pub mod scores;
pub mod ws;

pub use handlers::ErrorResponse;
pub use routes::create_router;
pub use ws::{spawn_event_forwarder, spawn_heartbeat, WsBroadcaster, WsMessage};
