pub mod analyte;
pub mod patient;
pub mod report;

pub use analyte::*;
pub use patient::*;
pub use report::*;
