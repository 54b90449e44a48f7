pub mod catalog;
pub mod docket;
pub mod job;
