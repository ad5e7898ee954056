pub mod request;
pub mod response;
pub mod routes;

pub use request::ExpenseRequest;
pub use response::{ErrorResponse, HealthResponse, ReadyResponse};
pub use routes::{create_router, AppState};
