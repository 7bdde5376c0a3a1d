use prehospital_core::models::user::CurrentUser;

use crate::error::AuthError;

/// Forms may be changed by the user who created them or by an admin.
pub fn require_owner_or_admin(user: &CurrentUser, owner_id: i64) -> Result<(), AuthError> {
    if user.can_modify(owner_id) {
        Ok(())
    } else {
        Err(AuthError::Forbidden(format!(
            "user {} may not modify a record owned by user {owner_id}",
            user.id
        )))
    }
}
