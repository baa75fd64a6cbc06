//! Academic metadata endpoints.
//!
//! Reads come from `/meta/*`, which wraps each collection in an envelope.
//! The admin maintenance endpoints under `/admin/*` answer with bare arrays.
//! Both are normalized into a [`MetadataSnapshot`] the same way.

use reqwest::Method;
use serde::Serialize;

use kithab_core::wire::{
    records, BranchesEnvelope, RawBranch, RawRegulation, RawSubject, RegulationsEnvelope,
    SubjectsEnvelope,
};
use kithab_core::{BranchId, MetadataSnapshot, RegulationId, Semester, SubjectId};

use crate::client::KithabClient;
use crate::error::ApiError;

/// `POST /admin/regulations` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRegulation {
    /// Display name.
    pub name: String,
    /// Semester count.
    pub number_of_semesters: u8,
}

/// `POST /admin/branches` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewBranch {
    /// Display name.
    pub name: String,
    /// Owning regulation.
    pub regulation: RegulationId,
}

/// `POST /admin/subjects` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewSubject {
    /// Display name.
    pub name: String,
    /// Course code.
    pub code: String,
    /// Owning branch.
    pub branch: BranchId,
    /// Semester.
    pub semester: Semester,
}

/// `/meta/*` and admin metadata endpoints.
#[derive(Debug)]
pub struct MetaClient<'a> {
    client: &'a KithabClient,
}

impl<'a> MetaClient<'a> {
    pub(crate) fn new(client: &'a KithabClient) -> Self {
        Self { client }
    }

    /// `GET /meta/regulations`.
    pub async fn regulations(&self) -> Result<Vec<RawRegulation>, ApiError> {
        let path = "meta/regulations";
        let env: RegulationsEnvelope = self
            .client
            .send_json(self.client.request(Method::GET, path)?, path)
            .await?;
        Ok(env.regulations)
    }

    /// `GET /meta/branches`.
    pub async fn branches(&self) -> Result<Vec<RawBranch>, ApiError> {
        let path = "meta/branches";
        let env: BranchesEnvelope = self
            .client
            .send_json(self.client.request(Method::GET, path)?, path)
            .await?;
        Ok(env.branches)
    }

    /// `GET /meta/subjects?populateBranch=true`.
    pub async fn subjects(&self) -> Result<Vec<RawSubject>, ApiError> {
        let path = "meta/subjects";
        let request = self
            .client
            .request(Method::GET, path)?
            .query(&[("populateBranch", "true")]);
        let env: SubjectsEnvelope = self.client.send_json(request, path).await?;
        Ok(env.subjects)
    }

    /// Fetch all three collections concurrently. Ready only when all three
    /// succeed; the first failure fails the whole snapshot.
    pub async fn snapshot(&self) -> Result<MetadataSnapshot, ApiError> {
        let (regulations, branches, subjects) =
            tokio::try_join!(self.regulations(), self.branches(), self.subjects())?;
        let snapshot = MetadataSnapshot::from_raw(regulations, branches, subjects);
        tracing::debug!(
            regulations = snapshot.regulations().len(),
            branches = snapshot.branches().len(),
            subjects = snapshot.subjects().len(),
            "metadata snapshot loaded"
        );
        Ok(snapshot)
    }

    // ─── Admin ───────────────────────────────────────────────────────

    async fn admin_list<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ApiError> {
        let value: serde_json::Value = self
            .client
            .send_json(self.client.authed(Method::GET, path)?, path)
            .await?;
        Ok(records(value))
    }

    /// Snapshot from the admin endpoints, fetched concurrently.
    pub async fn admin_snapshot(&self) -> Result<MetadataSnapshot, ApiError> {
        let (regulations, branches, subjects) = tokio::try_join!(
            self.admin_list::<RawRegulation>("admin/regulations"),
            self.admin_list::<RawBranch>("admin/branches"),
            self.admin_list::<RawSubject>("admin/subjects"),
        )?;
        Ok(MetadataSnapshot::from_raw(regulations, branches, subjects))
    }

    async fn create<B: Serialize>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        let request = self.client.authed(Method::POST, path)?.json(body);
        self.client.send(request, path).await?;
        tracing::info!(endpoint = path, "created");
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), ApiError> {
        let path = format!("admin/{collection}/{id}");
        self.client
            .send(self.client.authed(Method::DELETE, &path)?, &path)
            .await?;
        tracing::info!(endpoint = %path, "deleted");
        Ok(())
    }

    /// Create a regulation.
    pub async fn create_regulation(&self, body: &NewRegulation) -> Result<(), ApiError> {
        self.create("admin/regulations", body).await
    }

    /// Create a branch.
    pub async fn create_branch(&self, body: &NewBranch) -> Result<(), ApiError> {
        self.create("admin/branches", body).await
    }

    /// Create a subject.
    pub async fn create_subject(&self, body: &NewSubject) -> Result<(), ApiError> {
        self.create("admin/subjects", body).await
    }

    /// Delete a regulation.
    pub async fn delete_regulation(&self, id: &RegulationId) -> Result<(), ApiError> {
        self.delete("regulations", id.as_str()).await
    }

    /// Delete a branch.
    pub async fn delete_branch(&self, id: &BranchId) -> Result<(), ApiError> {
        self.delete("branches", id.as_str()).await
    }

    /// Delete a subject.
    pub async fn delete_subject(&self, id: &SubjectId) -> Result<(), ApiError> {
        self.delete("subjects", id.as_str()).await
    }
}
