//! Grant Course Use Case
//!
//! Direct administrative grant. Idempotent like every other grant path.

use std::sync::Arc;

use auth::domain::value_object::user_id::UserId;
use kernel::id::CourseId;

use crate::domain::entity::course_access::GrantSource;
use crate::domain::repository::{CourseAccessRepository, CourseRepository};
use crate::error::{CommerceError, CommerceResult};

/// Grant course use case
pub struct GrantCourseUseCase<R>
where
    R: CourseRepository + CourseAccessRepository + Clone + Send + Sync + 'static,
{
    repo: Arc<R>,
}

impl<R> GrantCourseUseCase<R>
where
    R: CourseRepository + CourseAccessRepository + Clone + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, target_user: &UserId, course_id: &CourseId) -> CommerceResult<()> {
        if self.repo.find_course(course_id).await?.is_none() {
            return Err(CommerceError::CourseNotFound);
        }

        let granted = self
            .repo
            .grant_courses(target_user, &[*course_id], GrantSource::Admin)
            .await?;

        tracing::info!(
            user = %target_user,
            course = %course_id,
            newly_granted = granted,
            "Administrative course grant"
        );

        Ok(())
    }
}
