//! In-memory [`ProjectRepository`] - test double for the external
//! project-owning collaborator.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use kernel_shared::errors::KernelResult;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::context::OperationContext;
use crate::repository::project_repository::{ProjectInfo, ProjectRepository};

#[derive(Debug, Default, Clone)]
pub struct InMemoryProjectRepository {
    projects_by_user: Arc<Mutex<HashMap<Uuid, Vec<ProjectInfo>>>>,
}

impl InMemoryProjectRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test/seeding helper: grants `user_id` access to `project` for the
    /// purposes of user-info aggregation.
    pub async fn grant(&self, user_id: Uuid, project: ProjectInfo) {
        let mut projects = self.projects_by_user.lock().await;
        projects.entry(user_id).or_default().push(project);
    }
}

#[async_trait]
impl ProjectRepository for InMemoryProjectRepository {
    async fn list_for_user(&self, ctx: &OperationContext, user_id: Uuid) -> KernelResult<Vec<ProjectInfo>> {
        ctx.check_cancelled()?;
        let projects = self.projects_by_user.lock().await;
        Ok(projects.get(&user_id).cloned().unwrap_or_default())
    }
}
