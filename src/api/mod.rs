pub mod format;
pub mod notification;

pub use format::{OrganizationListItem, OrganizationView, ProjectListItem, ProjectView, VersionListItem};
pub use notification::{NotificationType, NotificationView, RelatedEntities};
