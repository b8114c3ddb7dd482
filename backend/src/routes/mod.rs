pub mod dashboard;
pub mod insights;
pub mod overview;
pub mod series;
