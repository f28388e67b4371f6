mod change;
mod commit;

pub use change::{ChangeKind, DiffEntry};
pub use commit::{Commit, ROOT_MESSAGE, ROOT_TIMESTAMP};
