/// Iterative directory traversal producing the list of files to hash.
pub mod walker;

pub use walker::{FILES_TO_STORE, WalkOptions, walk};
