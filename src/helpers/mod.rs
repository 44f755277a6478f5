//! Helper functions shared by the shaper and the views

mod date;
mod html;
mod url;

pub use date::*;
pub use html::*;
pub use url::*;
