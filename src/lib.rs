pub mod actions;
pub mod calendar;
pub mod config;
pub mod error;
pub mod filter;
pub mod labels;
pub mod models;
pub mod report;
pub mod stats;
pub mod store;
pub mod views;
