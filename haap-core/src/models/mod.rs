mod apk;
mod child;
mod enrollment;
mod location;
mod message;
mod report;
mod usage;
mod user;

pub use apk::*;
pub use child::*;
pub use enrollment::*;
pub use location::*;
pub use message::*;
pub use report::*;
pub use usage::*;
pub use user::*;
