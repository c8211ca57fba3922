//! Headless model of the portfolio page script: tab navigation, the contact
//! form submission flow and the skill bar animation.

mod contact_form;
mod skills;
mod tabs;

pub use contact_form::*;
pub use skills::*;
pub use tabs::*;
