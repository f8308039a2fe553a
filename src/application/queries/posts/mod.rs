mod get;
mod list;
mod service;

pub use get::PublicPostResolution;
pub use service::PostQueryService;
