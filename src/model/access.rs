use uuid::Uuid;

use crate::{
    model::{
        ModelManager,
        error::{DatabaseError, DatabaseResult},
    },
    web::{AuthenticatedUser, UserRole},
};

#[async_trait::async_trait]
pub trait HasOwner {
    type OwnerId: PartialEq + Send + Sync;
    async fn get_owner_id(
        &self,
        mm: &ModelManager,
        ctx: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId>;
}

pub async fn check_access<T: HasOwner<OwnerId = O>, O: PartialEq + Send + Sync>(
    mm: &ModelManager,
    ctx: &AuthenticatedUser,
    resource: &T,
    expected: O,
) -> DatabaseResult<()> {
    let actual_owner = resource.get_owner_id(mm, ctx).await?;

    // admin can get all resources
    if ctx.user_role() == UserRole::Admin {
        return Ok(());
    }

    if actual_owner == expected {
        Ok(())
    } else {
        Err(DatabaseError::Forbidden)
    }
}

/// Read visibility of course content.
///
/// Published courses are open to everybody, anonymous readers included.
/// Unpublished ones are only seen by their owner and by admins.
pub fn is_visible(published: bool, owner_id: Option<Uuid>, reader: Option<&AuthenticatedUser>) -> bool {
    if published {
        return true;
    }

    match reader {
        Some(user) if user.user_role() == UserRole::Admin => true,
        Some(user) => owner_id == Some(user.user_id()),
        None => false,
    }
}
