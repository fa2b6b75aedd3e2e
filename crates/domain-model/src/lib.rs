pub mod document;
pub mod file_tree;
pub mod snapshot;
pub mod top_entry;

pub use document::*;
pub use file_tree::*;
pub use snapshot::*;
pub use top_entry::*;
