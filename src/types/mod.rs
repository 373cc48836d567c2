pub mod catalog;
pub mod coords;
pub mod dataset;
pub mod into_date_trait;
