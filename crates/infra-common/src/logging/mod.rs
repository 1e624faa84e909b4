pub mod context;
pub mod setup;
