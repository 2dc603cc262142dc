pub mod envelope;
pub mod providers;

pub use envelope::{extract_completion_text, extract_error_message, ErrorDetail, DEFAULT_ERROR_MESSAGE};
pub use providers::mock::MockProvider;
pub use providers::router::RouterProvider;
