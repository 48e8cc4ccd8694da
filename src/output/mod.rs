mod report;

pub use report::generate_report;
