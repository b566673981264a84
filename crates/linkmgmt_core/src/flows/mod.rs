//! Step machines hosted by the viewport.
mod add_link;
mod manage_links;
mod menu;

pub use add_link::{AddLinkFlow, AddLinkStep, ReviewField};
pub use manage_links::{ManageLinksFlow, ManageStep, Notice, NoticeKind};
pub use menu::MainMenu;
