mod directive;
mod notification;

pub use directive::*;
pub use notification::*;
