use voltran_auth::Role;
use voltran_core::OwnerId;

/// Authenticated caller of a request.
///
/// Inserted by the auth middleware; every domain route reads its owner id
/// from here and never from the request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerContext {
    owner_id: OwnerId,
    username: String,
    role: Role,
}

impl OwnerContext {
    pub fn new(owner_id: OwnerId, username: String, role: Role) -> Self {
        Self {
            owner_id,
            username,
            role,
        }
    }

    pub fn owner_id(&self) -> OwnerId {
        self.owner_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn role(&self) -> &Role {
        &self.role
    }
}
