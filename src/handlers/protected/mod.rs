pub mod dashboard;
pub mod records;

pub use dashboard::dashboard;
