//! Cart Use Cases
//!
//! Adding a paid course appends it to the user's cart; adding an
//! effectively-free course grants access immediately and never touches
//! the cart. Removal is idempotent.

use std::sync::Arc;

use auth::domain::value_object::user_id::UserId;
use kernel::id::CourseId;

use crate::domain::entity::course_access::GrantSource;
use crate::domain::repository::{CartRepository, CourseAccessRepository, CourseRepository};
use crate::error::{CommerceError, CommerceResult};

/// What adding a course to the cart actually did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddCartItemOutcome {
    /// Appended to the cart; checkout will price it
    Added,
    /// Free course: access granted directly, cart untouched
    GrantedFree,
}

/// Add-to-cart use case
pub struct AddCartItemUseCase<R>
where
    R: CourseRepository + CartRepository + CourseAccessRepository + Clone + Send + Sync + 'static,
{
    repo: Arc<R>,
}

impl<R> AddCartItemUseCase<R>
where
    R: CourseRepository + CartRepository + CourseAccessRepository + Clone + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> CommerceResult<AddCartItemOutcome> {
        let course = self
            .repo
            .find_course(course_id)
            .await?
            .ok_or(CommerceError::CourseNotFound)?;

        if course.is_free() {
            self.repo
                .grant_courses(user_id, &[*course_id], GrantSource::Free)
                .await?;

            tracing::info!(user = %user_id, course = %course_id, "Free course claimed");
            return Ok(AddCartItemOutcome::GrantedFree);
        }

        let mut cart = self
            .repo
            .find_cart(user_id)
            .await?
            .ok_or(CommerceError::CartNotFound)?;

        if !cart.add(*course_id) {
            return Err(CommerceError::DuplicateCartItem);
        }

        self.repo.update_cart_items(&cart.cart_id, &cart.items).await?;

        tracing::info!(user = %user_id, course = %course_id, "Course added to cart");
        Ok(AddCartItemOutcome::Added)
    }
}

/// Remove-from-cart use case
pub struct RemoveCartItemUseCase<R>
where
    R: CartRepository + Clone + Send + Sync + 'static,
{
    repo: Arc<R>,
}

impl<R> RemoveCartItemUseCase<R>
where
    R: CartRepository + Clone + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Pull the course from the cart; removing an absent item succeeds
    pub async fn execute(&self, user_id: &UserId, course_id: &CourseId) -> CommerceResult<()> {
        let mut cart = self
            .repo
            .find_cart(user_id)
            .await?
            .ok_or(CommerceError::CartNotFound)?;

        cart.remove(course_id);
        self.repo.update_cart_items(&cart.cart_id, &cart.items).await?;

        Ok(())
    }
}
