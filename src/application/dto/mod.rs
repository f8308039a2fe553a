pub mod posts;

pub use posts::{AutosaveReceipt, PostSummaryDto};
