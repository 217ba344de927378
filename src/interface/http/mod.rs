mod handlers;
mod routes;

pub use handlers::{AppError, AppState};
pub use routes::create_router;
