pub mod notification;
pub mod organization;
pub mod project;
pub mod team;
pub mod version;

pub use notification::Notification;
pub use organization::Organization;
pub use project::{ExternalLinks, GalleryItem, License, Project};
pub use team::TeamMember;
pub use version::{Dependency, Version};
