//! Database repositories.

mod comment;
mod follow;
mod image;
mod poll;
mod post;
mod user;

pub use comment::CommentRepository;
pub use follow::FollowRepository;
pub use image::ImageRepository;
pub use poll::{ChoiceRepository, QuestionRepository};
pub use post::PostRepository;
pub use user::UserRepository;
