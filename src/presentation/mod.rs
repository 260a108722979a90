pub mod config;
pub mod handlers;
mod router;
pub mod state;

pub use router::create_router;
