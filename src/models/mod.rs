pub mod bookmark;
pub mod tag;
pub mod user;

pub use bookmark::{Bookmark, BookmarkResponse};
pub use tag::Tag;
pub use user::{Role, User, UserResponse};
