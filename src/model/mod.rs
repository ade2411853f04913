//! Value types shared by the script filter runner and the snippet packager.

mod item;
mod snippet;

pub use item::{Feedback, Icon, IconKind, Item};
pub use snippet::Snippet;
