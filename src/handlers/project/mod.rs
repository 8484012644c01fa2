pub mod detail;
pub mod gallery;
pub mod members;
pub mod settings;
pub mod version;

// Re-export handler functions for use in routing
pub use detail::create as project_create;
pub use detail::dependencies as project_dependencies;
pub use detail::get as project_get;

pub use settings::description as project_description_patch;
pub use settings::external_links as project_external_links_patch;
pub use settings::general as project_patch;
pub use settings::license as project_license_patch;
pub use settings::tags as project_tags_patch;

pub use gallery::add as gallery_post;
pub use gallery::remove as gallery_delete;
pub use gallery::update as gallery_patch;

pub use version::create as version_post;
pub use version::delete as version_delete;
pub use version::get as version_get;
pub use version::list as version_list;

pub use members::invite as members_invite;
