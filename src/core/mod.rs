pub mod command;
pub mod message;
pub mod page;

pub use command::{Command, CommandEnv, CopyToClipboardCmd};
pub use message::AppMessage;
pub use page::{Page, UpdateResult};
