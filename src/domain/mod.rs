mod contact_message;
mod contact_submission;

pub use contact_message::*;
pub use contact_submission::*;
