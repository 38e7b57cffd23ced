//! Domain entities - the core business objects.

mod post;
mod user;

pub use post::{Author, NewPost, Post, PostFields};
pub use user::User;
