pub mod report;
pub mod requirements;

pub use report::ReportService;
pub use requirements::RequirementsStore;
