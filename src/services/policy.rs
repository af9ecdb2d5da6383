use crate::error::{Error, Result};
use crate::models::user::{User, UserRole};

/// Decides whether a user may receive quiz assignments. Keeping the role
/// rule behind this seam lets the assignment service stay a pure
/// persistence coordinator.
#[cfg_attr(test, mockall::automock)]
pub trait AssignmentPolicy: Send + Sync {
    fn ensure_assignable(&self, user: &User) -> Result<()>;
}

/// Default rule: only users whose role is exactly `admin` can be granted
/// quizzes. Superadmins manage assignments, they do not hold them.
pub struct AdminOnlyPolicy;

impl AssignmentPolicy for AdminOnlyPolicy {
    fn ensure_assignable(&self, user: &User) -> Result<()> {
        if user.role != UserRole::Admin {
            return Err(Error::BadRequest(
                "Only admin users can be assigned to quizzes".to_string(),
            ));
        }
        Ok(())
    }
}
