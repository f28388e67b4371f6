pub mod read;
pub mod write;

pub use read::{normalize_path, read_working_file};
pub use write::{fsync_dir, write_atomic};
