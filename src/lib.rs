pub mod db;
pub mod deadlines;
pub mod models;
pub mod presentation;
pub mod report;
pub mod snapshot;
