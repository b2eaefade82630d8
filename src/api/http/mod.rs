// src/api/http/mod.rs

mod handlers;
mod router;

pub use handlers::{RoomRequest, StateResponse};
pub use router::{control_router, create_router};
