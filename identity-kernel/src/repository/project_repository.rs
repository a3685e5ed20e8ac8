//! # Project Repository Contract (external collaborator)
//!
//! The kernel does not own project data (spec §1: "everything else in the
//! source repository... [is] treated as external collaborators whose
//! contracts appear only in §6"). `ProjectRepository` is the minimal
//! read-only contract [`crate::service::authorization_service`] needs to
//! fill the `projects` field of its user-info claim aggregation (spec
//! §4.4) - nothing about project CRUD belongs in this kernel.

use async_trait::async_trait;
use kernel_shared::errors::KernelResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::context::OperationContext;

/// Just enough project data to populate a user-info claim - not a kernel
/// domain entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub id: Uuid,
    pub name: String,
}

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn list_for_user(&self, ctx: &OperationContext, user_id: Uuid) -> KernelResult<Vec<ProjectInfo>>;
}
