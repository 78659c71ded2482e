// Filesystem Adapters
//
// Path resolution for the catalog: logical "{category}/{rel}" strings to
// real filesystem paths, with NFC/NFD normalization fallback.

pub mod path_resolver;

pub use path_resolver::{is_excluded_path, PathResolver};
