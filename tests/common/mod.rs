#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use crmm_api::auth::{generate_jwt, Claims, GlobalUserRole};
use crmm_api::config::AppConfig;
use crmm_api::context::RequestContext;
use crmm_api::controllers::{
    Controllers, NotificationController, OrganizationController, ProjectController, VersionController,
};
use crmm_api::database::MemoryStore;
use crmm_api::middleware::{ApiResponse, Session};
use crmm_api::schema::*;
use crmm_api::{app, AppState};

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.api.enable_rate_limiting = false;
    config
}

pub fn token(user_id: &str, role: GlobalUserRole) -> String {
    let config = test_config();
    generate_jwt(&Claims::new(user_id, user_id, role, 1), &config.security.jwt_secret)
        .expect("failed to sign test token")
}

/// Router over a fresh in-memory store
pub fn memory_app() -> Router {
    let state = AppState::new(Arc::new(test_config()), Arc::new(MemoryStore::new()));
    app(state)
}

/// Router whose controllers are all the given spy
pub fn spy_app(spy: Arc<SpyController>) -> Router {
    app(spied_state(spy))
}

pub fn spied_state(spy: Arc<SpyController>) -> AppState {
    let controllers = Controllers {
        projects: spy.clone(),
        versions: spy.clone(),
        organizations: spy.clone(),
        notifications: spy,
    };
    AppState::new(Arc::new(test_config()), Arc::new(MemoryStore::new())).with_controllers(controllers)
}

pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body)?))?,
        None => builder.body(Body::empty())?,
    };

    let response = router.clone().oneshot(request).await?;
    read_response(response).await
}

pub async fn read_response(response: Response) -> Result<(StatusCode, Value)> {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, value))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpyMode {
    Succeed,
    Fail,
    Panic,
}

/// Controller double that counts invocations and records what it was called with
pub struct SpyController {
    mode: SpyMode,
    calls: AtomicUsize,
    last_call: Mutex<Option<String>>,
}

impl SpyController {
    pub fn new(mode: SpyMode) -> Arc<Self> {
        Arc::new(Self {
            mode,
            calls: AtomicUsize::new(0),
            last_call: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_call(&self) -> Option<String> {
        self.last_call.lock().unwrap().clone()
    }

    fn respond(&self, operation: &str) -> Result<Response> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_call.lock().unwrap() = Some(operation.to_string());

        match self.mode {
            SpyMode::Succeed => Ok(ApiResponse::message(operation.to_string()).into_response()),
            SpyMode::Fail => Err(anyhow::anyhow!("connection refused: postgres://admin:secret@db/{operation}")),
            SpyMode::Panic => panic!("spy controller panicked in {operation}"),
        }
    }
}

#[async_trait]
impl ProjectController for SpyController {
    async fn create_project(&self, _: &RequestContext, _: &Session, _: NewProjectForm) -> Result<Response> {
        self.respond("create_project")
    }

    async fn get_project(&self, _: &RequestContext, slug: &str, _: Option<&Session>) -> Result<Response> {
        self.respond(&format!("get_project:{slug}"))
    }

    async fn update_general_settings(
        &self,
        _: &RequestContext,
        _: &str,
        _: &Session,
        _: GeneralProjectSettingsForm,
    ) -> Result<Response> {
        self.respond("update_general_settings")
    }

    async fn update_description(&self, _: &RequestContext, _: &str, _: &Session, _: UpdateDescriptionForm) -> Result<Response> {
        self.respond("update_description")
    }

    async fn update_tags(&self, _: &RequestContext, _: &str, _: &Session, _: UpdateProjectTagsForm) -> Result<Response> {
        self.respond("update_tags")
    }

    async fn update_external_links(
        &self,
        _: &RequestContext,
        _: &str,
        _: &Session,
        _: UpdateExternalLinksForm,
    ) -> Result<Response> {
        self.respond("update_external_links")
    }

    async fn update_license(&self, _: &RequestContext, _: &str, _: &Session, _: UpdateProjectLicenseForm) -> Result<Response> {
        self.respond("update_license")
    }

    async fn add_gallery_image(&self, _: &RequestContext, _: &str, _: &Session, _: AddNewGalleryImageForm) -> Result<Response> {
        self.respond("add_gallery_image")
    }

    async fn update_gallery_image(
        &self,
        _: &RequestContext,
        _: &str,
        image_id: &str,
        _: &Session,
        _: UpdateGalleryImageForm,
    ) -> Result<Response> {
        self.respond(&format!("update_gallery_image:{image_id}"))
    }

    async fn remove_gallery_image(&self, _: &RequestContext, _: &str, _: &Session, _: DeleteGalleryImageForm) -> Result<Response> {
        self.respond("remove_gallery_image")
    }

    async fn get_dependencies(&self, _: &RequestContext, _: &str, _: Option<&Session>) -> Result<Response> {
        self.respond("get_dependencies")
    }

    async fn invite_member(&self, _: &RequestContext, _: &str, _: &Session, _: InviteMemberForm) -> Result<Response> {
        self.respond("invite_project_member")
    }
}

#[async_trait]
impl VersionController for SpyController {
    async fn list_versions(&self, _: &RequestContext, _: &str, _: Option<&Session>) -> Result<Response> {
        self.respond("list_versions")
    }

    async fn create_version(&self, _: &RequestContext, _: &str, _: &Session, _: NewVersionForm) -> Result<Response> {
        self.respond("create_version")
    }

    async fn get_version(&self, _: &RequestContext, _: &str, _: &str, _: Option<&Session>) -> Result<Response> {
        self.respond("get_version")
    }

    async fn delete_version(&self, _: &RequestContext, _: &str, _: &str, _: &Session) -> Result<Response> {
        self.respond("delete_version")
    }
}

#[async_trait]
impl OrganizationController for SpyController {
    async fn create_organization(&self, _: &RequestContext, _: &Session, _: CreateOrganizationForm) -> Result<Response> {
        self.respond("create_organization")
    }

    async fn get_organization(&self, _: &RequestContext, _: &str, _: Option<&Session>) -> Result<Response> {
        self.respond("get_organization")
    }

    async fn invite_member(&self, _: &RequestContext, _: &str, _: &Session, _: InviteMemberForm) -> Result<Response> {
        self.respond("invite_organization_member")
    }
}

#[async_trait]
impl NotificationController for SpyController {
    async fn list_notifications(&self, _: &RequestContext, _: &Session) -> Result<Response> {
        self.respond("list_notifications")
    }

    async fn mark_read(&self, _: &RequestContext, ids: Vec<String>, _: &Session) -> Result<Response> {
        self.respond(&format!("mark_read:{}", ids.join(",")))
    }

    async fn delete_notification(&self, _: &RequestContext, _: &str, _: &Session) -> Result<Response> {
        self.respond("delete_notification")
    }
}
