use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::models::{Notification, Organization, Project};
use super::{Store, StoreError};

/// Process-local store, used when no database is configured and in tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    projects: RwLock<HashMap<String, Project>>,
    organizations: RwLock<HashMap<String, Organization>>,
    notifications: RwLock<HashMap<String, Notification>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn slug_taken<'a, T: 'a>(
    mut items: impl Iterator<Item = (&'a String, &'a T)>,
    slug: &str,
    own_id: &str,
    slug_of: impl Fn(&T) -> &str,
) -> bool {
    items.any(|(id, item)| id != own_id && slug_of(item) == slug)
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn find_project(&self, slug_or_id: &str) -> Result<Option<Project>, StoreError> {
        let projects = self.projects.read().await;
        Ok(projects
            .get(slug_or_id)
            .or_else(|| projects.values().find(|p| p.slug == slug_or_id))
            .cloned())
    }

    async fn find_projects(&self, ids: &[String]) -> Result<Vec<Project>, StoreError> {
        let projects = self.projects.read().await;
        Ok(ids.iter().filter_map(|id| projects.get(id).cloned()).collect())
    }

    async fn insert_project(&self, project: &Project) -> Result<(), StoreError> {
        let mut projects = self.projects.write().await;
        if projects.contains_key(&project.id) || slug_taken(projects.iter(), &project.slug, &project.id, |p| &p.slug) {
            return Err(StoreError::Conflict(format!("project slug '{}'", project.slug)));
        }
        projects.insert(project.id.clone(), project.clone());
        Ok(())
    }

    async fn update_project(&self, project: &Project) -> Result<(), StoreError> {
        let mut projects = self.projects.write().await;
        match projects.get(&project.id) {
            None => return Err(StoreError::NotFound(format!("project '{}'", project.id))),
            Some(stored) if stored.revision != project.revision => {
                return Err(StoreError::Stale(format!("project '{}'", project.id)));
            }
            Some(_) => {}
        }
        if slug_taken(projects.iter(), &project.slug, &project.id, |p| &p.slug) {
            return Err(StoreError::Conflict(format!("project slug '{}'", project.slug)));
        }
        let mut next = project.clone();
        next.revision += 1;
        projects.insert(next.id.clone(), next);
        Ok(())
    }

    async fn find_organization(&self, slug_or_id: &str) -> Result<Option<Organization>, StoreError> {
        let organizations = self.organizations.read().await;
        Ok(organizations
            .get(slug_or_id)
            .or_else(|| organizations.values().find(|o| o.slug == slug_or_id))
            .cloned())
    }

    async fn find_organizations(&self, ids: &[String]) -> Result<Vec<Organization>, StoreError> {
        let organizations = self.organizations.read().await;
        Ok(ids.iter().filter_map(|id| organizations.get(id).cloned()).collect())
    }

    async fn insert_organization(&self, organization: &Organization) -> Result<(), StoreError> {
        let mut organizations = self.organizations.write().await;
        if organizations.contains_key(&organization.id)
            || slug_taken(organizations.iter(), &organization.slug, &organization.id, |o| &o.slug)
        {
            return Err(StoreError::Conflict(format!("organization slug '{}'", organization.slug)));
        }
        organizations.insert(organization.id.clone(), organization.clone());
        Ok(())
    }

    async fn update_organization(&self, organization: &Organization) -> Result<(), StoreError> {
        let mut organizations = self.organizations.write().await;
        match organizations.get(&organization.id) {
            None => return Err(StoreError::NotFound(format!("organization '{}'", organization.id))),
            Some(stored) if stored.revision != organization.revision => {
                return Err(StoreError::Stale(format!("organization '{}'", organization.id)));
            }
            Some(_) => {}
        }
        if slug_taken(organizations.iter(), &organization.slug, &organization.id, |o| &o.slug) {
            return Err(StoreError::Conflict(format!("organization slug '{}'", organization.slug)));
        }
        let mut next = organization.clone();
        next.revision += 1;
        organizations.insert(next.id.clone(), next);
        Ok(())
    }

    async fn notifications_for_user(&self, user_id: &str) -> Result<Vec<Notification>, StoreError> {
        let notifications = self.notifications.read().await;
        let mut list: Vec<Notification> = notifications
            .values()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| b.date_created.cmp(&a.date_created).then_with(|| a.id.cmp(&b.id)));
        Ok(list)
    }

    async fn insert_notification(&self, notification: &Notification) -> Result<(), StoreError> {
        let mut notifications = self.notifications.write().await;
        if notifications.contains_key(&notification.id) {
            return Err(StoreError::Conflict(format!("notification '{}'", notification.id)));
        }
        notifications.insert(notification.id.clone(), notification.clone());
        Ok(())
    }

    async fn update_notification(&self, notification: &Notification) -> Result<(), StoreError> {
        let mut notifications = self.notifications.write().await;
        match notifications.get_mut(&notification.id) {
            Some(existing) => {
                *existing = notification.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(format!("notification '{}'", notification.id))),
        }
    }

    async fn delete_notification(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.notifications.write().await.remove(id).is_some())
    }
}
