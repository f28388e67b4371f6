pub mod blob;
pub mod commit;
pub mod store;

pub use blob::{blob_exists, blob_path, read_blob, write_blob};
pub use commit::{commit_exists, commit_path, read_commit, write_commit};
pub use store::{get_object, object_exists, object_path, put_object, ObjectKind};
