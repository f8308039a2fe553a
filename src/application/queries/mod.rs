pub mod posts;
pub mod sitemap;
