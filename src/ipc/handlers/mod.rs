pub mod core;
pub mod export;
pub mod report;
pub mod table;
