//! Fetch LeetCode problem metadata and reshape it into flat JSON and CSV
//! datasets.

pub mod api;
pub mod config;
pub mod export;
pub mod fetch;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod select;
pub mod store;
