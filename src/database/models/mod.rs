pub mod comment;
pub mod follow;
pub mod group;
pub mod post;
pub mod user;

pub use comment::{Comment, NewComment};
pub use follow::Follow;
pub use group::{Group, NewGroup};
pub use post::{NewPost, Post, PostChanges};
pub use user::User;
