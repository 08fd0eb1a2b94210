//! Business logic services.

pub mod comment;
pub mod follow;
pub mod image;
pub mod mailer;
pub mod poll;
pub mod post;

pub use comment::{CommentService, CreateCommentInput};
pub use follow::FollowService;
pub use image::{CreateImageInput, ImageService};
pub use mailer::{MailerService, SharePostInput};
pub use poll::{PollResults, PollService, QuestionWithChoices};
pub use post::{CreatePostInput, PostService, UpdatePostInput};
