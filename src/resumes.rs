use crate::{
    error::{AppError, AppResult},
    models::{DEFAULT_COLOR, DEFAULT_TEMPLATE, NewResume, Resume, ResumeData, ResumeId, UserId},
    repository::RepositoryState,
    scoring,
};

/// ResumeService
///
/// Owner-scoped resume operations plus the public share lookup. Every write goes
/// through the scoring engine; every owner-scoped read or write is keyed on the
/// caller's `UserId`, never on anything taken from the request body.
#[derive(Clone)]
pub struct ResumeService {
    repo: RepositoryState,
}

impl ResumeService {
    pub fn new(repo: RepositoryState) -> Self {
        Self { repo }
    }

    /// create_resume
    ///
    /// Scores and stores a new resume owned by `owner_id`. Blank or missing template
    /// and color fall back to `classic` / `#007bff`.
    pub async fn create_resume(
        &self,
        owner_id: UserId,
        payload: Option<ResumeData>,
        selected_template: Option<String>,
        color: Option<String>,
    ) -> AppResult<Resume> {
        let data = payload
            .filter(|data| !data.is_empty())
            .ok_or_else(|| AppError::BadRequest("Resume data is required".to_string()))?;

        let score = scoring::score(&data);

        let new_resume = NewResume {
            owner_id,
            name: data.name.unwrap_or_default(),
            email: data.email.unwrap_or_default(),
            phone: data.phone.unwrap_or_default(),
            address: data.address.unwrap_or_default(),
            profession: data.profession.unwrap_or_default(),
            education: data.education.unwrap_or_default(),
            experience: data.experience.unwrap_or_default(),
            skills: data.skills.unwrap_or_default(),
            score,
            selected_template: or_default(selected_template, DEFAULT_TEMPLATE),
            color: or_default(color, DEFAULT_COLOR),
        };

        let resume = self.repo.create_resume(new_resume).await?;
        tracing::info!(
            resume_id = %resume.id,
            owner_id = %owner_id,
            score = resume.score,
            template = %resume.selected_template,
            "resume saved"
        );
        Ok(resume)
    }

    /// All resumes owned by `owner_id`, newest first.
    pub async fn list_resumes(&self, owner_id: UserId) -> AppResult<Vec<Resume>> {
        let resumes = self.repo.list_resumes(owner_id).await?;
        tracing::debug!(owner_id = %owner_id, count = resumes.len(), "resumes listed");
        Ok(resumes)
    }

    /// rename_resume
    ///
    /// Changes the `name` of a resume the caller owns. Validation happens before the
    /// lookup, and the lookup before the ownership check, so the caller sees
    /// `BadRequest`, then `NotFound`, then `Forbidden`.
    pub async fn rename_resume(
        &self,
        owner_id: UserId,
        resume_id: ResumeId,
        new_name: Option<String>,
    ) -> AppResult<Resume> {
        let new_name = require_new_name(new_name)?;

        let existing = self
            .repo
            .get_resume(resume_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Resume not found".to_string()))?;

        if existing.owner_id != owner_id {
            tracing::warn!(
                resume_id = %resume_id,
                owner_id = %existing.owner_id,
                caller = %owner_id,
                "rename by non-owner rejected"
            );
            return Err(AppError::Forbidden("User not authorized".to_string()));
        }

        // The row can disappear between the two calls; report that as NotFound too.
        self.repo
            .rename_resume(resume_id, &new_name)
            .await?
            .ok_or_else(|| AppError::NotFound("Resume not found".to_string()))
    }

    /// get_shared_resume
    ///
    /// The share-link lookup. Unauthenticated by contract: anyone holding the id gets
    /// the full document.
    pub async fn get_shared_resume(&self, resume_id: ResumeId) -> AppResult<Resume> {
        self.repo
            .get_resume(resume_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Resume not found".to_string()))
    }
}

/// Rejects an absent or empty rename target. Callers that still have to resolve the
/// resume id run this first so that a bad body is reported before a bad id.
pub fn require_new_name(new_name: Option<String>) -> AppResult<String> {
    new_name
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AppError::BadRequest("New name is required".to_string()))
}

fn or_default(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}
