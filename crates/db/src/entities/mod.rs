//! Database entities.

pub mod choice;
pub mod comment;
pub mod follow;
pub mod image;
pub mod image_like;
pub mod post;
pub mod question;
pub mod user;

pub use choice::Entity as Choice;
pub use comment::Entity as Comment;
pub use follow::Entity as Follow;
pub use image::Entity as Image;
pub use image_like::Entity as ImageLike;
pub use post::Entity as Post;
pub use question::Entity as Question;
pub use user::Entity as User;
