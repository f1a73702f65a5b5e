use crate::error::RepoError;
use crate::models::{NewResume, NewUser, Resume, ResumeId, User, UserId};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, types::Json};
use std::sync::{Arc, Mutex};

/// Repository Trait
///
/// The abstract contract for all persistence operations: the credential store (users)
/// and the resume store. Handlers and services only ever see `Arc<dyn Repository>`, so
/// the Postgres implementation can be swapped for the in-memory one in tests.
///
/// **Send + Sync + async_trait** are required to make the trait object shareable across
/// Axum's asynchronous task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Credential Store ---
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepoError>;
    /// Fails with `RepoError::Conflict` when the email is already taken.
    async fn create_user(&self, user: NewUser) -> Result<User, RepoError>;

    // --- Resume Store ---
    async fn create_resume(&self, resume: NewResume) -> Result<Resume, RepoError>;
    /// All resumes of `owner_id`, most recent first.
    async fn list_resumes(&self, owner_id: UserId) -> Result<Vec<Resume>, RepoError>;
    async fn get_resume(&self, id: ResumeId) -> Result<Option<Resume>, RepoError>;
    /// Overwrites the `name` field only. Returns `None` when the id does not resolve.
    async fn rename_resume(&self, id: ResumeId, name: &str) -> Result<Option<Resume>, RepoError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by PostgreSQL.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let user = sqlx::query_as::<_, User>(
            r#"SELECT id, name, email, password_hash, created_at
               FROM users
               WHERE email = $1"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .inspect_err(|e| tracing::error!("find_user_by_email error: {:?}", e))?;
        Ok(user)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepoError> {
        let user = sqlx::query_as::<_, User>(
            r#"SELECT id, name, email, password_hash, created_at
               FROM users
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .inspect_err(|e| tracing::error!("get_user error: {:?}", e))?;
        Ok(user)
    }

    /// create_user
    ///
    /// Relies on the unique index on `users.email`; a violation is reported as
    /// `RepoError::Conflict` so that two racing registrations cannot both succeed.
    async fn create_user(&self, user: NewUser) -> Result<User, RepoError> {
        sqlx::query_as::<_, User>(
            r#"INSERT INTO users (name, email, password_hash)
               VALUES ($1, $2, $3)
               RETURNING id, name, email, password_hash, created_at"#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepoError::Conflict("User already exists".to_string())
            }
            other => {
                tracing::error!("create_user error: {:?}", other);
                RepoError::Database(other)
            }
        })
    }

    async fn create_resume(&self, resume: NewResume) -> Result<Resume, RepoError> {
        let created = sqlx::query_as::<_, Resume>(
            r#"INSERT INTO resumes (
                   owner_id, name, email, phone, address, profession,
                   education, experience, skills, score, selected_template, color
               )
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
               RETURNING id, owner_id, name, email, phone, address, profession,
                         education, experience, skills, score, selected_template, color,
                         created_at"#,
        )
        .bind(resume.owner_id)
        .bind(&resume.name)
        .bind(&resume.email)
        .bind(&resume.phone)
        .bind(&resume.address)
        .bind(&resume.profession)
        .bind(Json(&resume.education))
        .bind(Json(&resume.experience))
        .bind(Json(&resume.skills))
        .bind(resume.score)
        .bind(&resume.selected_template)
        .bind(&resume.color)
        .fetch_one(&self.pool)
        .await
        .inspect_err(|e| tracing::error!("create_resume error: {:?}", e))?;
        Ok(created)
    }

    async fn list_resumes(&self, owner_id: UserId) -> Result<Vec<Resume>, RepoError> {
        let resumes = sqlx::query_as::<_, Resume>(
            r#"SELECT id, owner_id, name, email, phone, address, profession,
                      education, experience, skills, score, selected_template, color,
                      created_at
               FROM resumes
               WHERE owner_id = $1
               ORDER BY created_at DESC"#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .inspect_err(|e| tracing::error!("list_resumes error: {:?}", e))?;
        Ok(resumes)
    }

    async fn get_resume(&self, id: ResumeId) -> Result<Option<Resume>, RepoError> {
        let resume = sqlx::query_as::<_, Resume>(
            r#"SELECT id, owner_id, name, email, phone, address, profession,
                      education, experience, skills, score, selected_template, color,
                      created_at
               FROM resumes
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .inspect_err(|e| tracing::error!("get_resume error: {:?}", e))?;
        Ok(resume)
    }

    async fn rename_resume(&self, id: ResumeId, name: &str) -> Result<Option<Resume>, RepoError> {
        let resume = sqlx::query_as::<_, Resume>(
            r#"UPDATE resumes
               SET name = $2
               WHERE id = $1
               RETURNING id, owner_id, name, email, phone, address, profession,
                         education, experience, skills, score, selected_template, color,
                         created_at"#,
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .inspect_err(|e| tracing::error!("rename_resume error: {:?}", e))?;
        Ok(resume)
    }
}

// --- In-Memory Implementation ---

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    // Resumes tagged with their insertion sequence, which breaks created_at ties.
    resumes: Vec<(u64, Resume)>,
    next_seq: u64,
}

/// InMemoryRepository
///
/// A process-local `Repository` used by the test suite and for running the API without a
/// database. Enforces the same invariants as the Postgres schema: unique emails and
/// newest-first listing.
#[derive(Default)]
pub struct InMemoryRepository {
    tables: Mutex<Tables>,
    /// When true, every operation fails with `RepoError::Unavailable`.
    should_fail: bool,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    fn with_tables<R>(&self, f: impl FnOnce(&mut Tables) -> R) -> Result<R, RepoError> {
        if self.should_fail {
            return Err(RepoError::Unavailable(
                "in-memory store configured to fail".to_string(),
            ));
        }
        let mut tables = self
            .tables
            .lock()
            .map_err(|_| RepoError::Unavailable("in-memory store lock poisoned".to_string()))?;
        Ok(f(&mut tables))
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        self.with_tables(|t| t.users.iter().find(|u| u.email == email).cloned())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepoError> {
        self.with_tables(|t| t.users.iter().find(|u| u.id == id).cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, RepoError> {
        self.with_tables(|t| {
            if t.users.iter().any(|u| u.email == user.email) {
                return Err(RepoError::Conflict("User already exists".to_string()));
            }
            let created = User {
                id: UserId::new(),
                name: user.name,
                email: user.email,
                password_hash: user.password_hash,
                created_at: Utc::now(),
            };
            t.users.push(created.clone());
            Ok(created)
        })?
    }

    async fn create_resume(&self, resume: NewResume) -> Result<Resume, RepoError> {
        self.with_tables(|t| {
            let created = Resume {
                id: ResumeId::new(),
                owner_id: resume.owner_id,
                name: resume.name,
                email: resume.email,
                phone: resume.phone,
                address: resume.address,
                profession: resume.profession,
                education: resume.education,
                experience: resume.experience,
                skills: resume.skills,
                score: resume.score,
                selected_template: resume.selected_template,
                color: resume.color,
                created_at: Utc::now(),
            };
            let seq = t.next_seq;
            t.next_seq += 1;
            t.resumes.push((seq, created.clone()));
            created
        })
    }

    async fn list_resumes(&self, owner_id: UserId) -> Result<Vec<Resume>, RepoError> {
        self.with_tables(|t| {
            let mut owned: Vec<&(u64, Resume)> = t
                .resumes
                .iter()
                .filter(|(_, r)| r.owner_id == owner_id)
                .collect();
            owned.sort_by(|(seq_a, a), (seq_b, b)| {
                b.created_at.cmp(&a.created_at).then(seq_b.cmp(seq_a))
            });
            owned.into_iter().map(|(_, r)| r.clone()).collect()
        })
    }

    async fn get_resume(&self, id: ResumeId) -> Result<Option<Resume>, RepoError> {
        self.with_tables(|t| {
            t.resumes
                .iter()
                .find(|(_, r)| r.id == id)
                .map(|(_, r)| r.clone())
        })
    }

    async fn rename_resume(&self, id: ResumeId, name: &str) -> Result<Option<Resume>, RepoError> {
        self.with_tables(|t| {
            t.resumes
                .iter_mut()
                .find(|(_, r)| r.id == id)
                .map(|(_, r)| {
                    r.name = name.to_string();
                    r.clone()
                })
        })
    }
}
