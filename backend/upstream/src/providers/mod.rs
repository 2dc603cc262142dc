pub mod mock;
pub mod router;
