//! Content module - shaping records into posts for the views

mod post;
pub mod reading_time;
pub mod rich_text;
mod shaper;

pub use post::{ContentBlock, PostDetail, PostPage, PostSummary};
pub use reading_time::reading_time;
pub use shaper::PageShaper;
