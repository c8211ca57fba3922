mod health;
mod send_email;

pub use health::*;
pub use send_email::*;
