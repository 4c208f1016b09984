pub mod drawings;
pub mod error;
pub mod events;
pub mod handlers;
pub mod middleware;
pub mod playback;
pub mod routes;
pub mod settings;
pub mod warns;

pub use routes::create_router;
