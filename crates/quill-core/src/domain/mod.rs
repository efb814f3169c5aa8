//! Domain entities - the core business objects.

mod actor;
mod comment;
mod like;
mod post;
pub mod slug;
mod user;

pub use actor::Actor;
pub use comment::{ANONYMOUS, Comment, display_name};
pub use like::Like;
pub use post::{Post, PostStatus};
pub use user::User;
