pub mod summarizer;
pub mod batch;
pub mod filters;
pub mod ncdu;

pub use summarizer::{metadata_path_for, summarize, summarize_file, ProvenanceOptions, SummaryOutcome, TreeDocument};
pub use batch::{discover_documents, summarize_dir, summarize_paths, BatchReport, DocumentReport};
pub use filters::*;
pub use ncdu::{import_ncdu, import_ncdu_file, NcduImport};
pub use disk_report_domain::{DiskNode, Provenance, SnapshotMetadata, TopEntry};
