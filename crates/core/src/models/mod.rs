pub mod address;
pub mod dashboard;
pub mod portfolio;
pub mod requests;
pub mod transaction;
