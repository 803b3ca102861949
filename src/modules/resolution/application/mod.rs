pub mod diagnostics;
pub mod service;

pub use diagnostics::DiagnosticsReport;
pub use service::ContentResolutionService;
