// src/application/commands/posts/mod.rs
mod delete;
mod save;
mod service;

pub use save::SavePostCommand;
pub use service::PostCommandService;
