pub mod render;
pub mod session;
pub mod source;
pub mod view;

pub use render::*;
pub use session::ReportSession;
pub use source::{full_document_name, summary_document_name, DirSource, HttpSource, TreeSource};
pub use view::{ArchitectureView, FetchStage, LoadFailure, LoadState};
