//! Authorization policy
//!
//! Every role check goes through [`authorize`]. Handlers call [`require`],
//! which logs denials and turns them into 403.

use shared::AppError;
use shared::models::Role;

use crate::auth::CurrentUser;
use crate::security_log;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Write,
}

/// What a request touches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// Categories, products, variants
    Catalog,
    /// Stock levels and movements
    Inventory,
    /// A cart owned by `owner_id`
    Cart { owner_id: i64 },
    /// An order owned by `owner_id`
    Order { owner_id: i64 },
    /// Orders of any user
    AllOrders,
    /// Sales reports
    Statistics,
}

/// Whether `principal` may perform `action` on `resource`
pub fn authorize(principal: &CurrentUser, action: Action, resource: Resource) -> bool {
    let staff = principal.role.is_staff();
    match (resource, action) {
        (Resource::Catalog, Action::Read) => true,
        (Resource::Catalog, Action::Write) => staff,
        (Resource::Inventory, _) => staff,
        (Resource::Cart { owner_id }, _) => owner_id == principal.id,
        (Resource::Order { owner_id }, _) => owner_id == principal.id || staff,
        (Resource::AllOrders, _) => staff,
        (Resource::Statistics, _) => principal.role == Role::Admin,
    }
}

/// [`authorize`] or a 403 `AppError`
pub fn require(
    principal: &CurrentUser,
    action: Action,
    resource: Resource,
    denied_message: &str,
) -> Result<(), AppError> {
    if authorize(principal, action, resource) {
        return Ok(());
    }
    security_log!(
        "WARN",
        "access_denied",
        user_id = principal.id,
        role = principal.role.as_str(),
        action = format!("{:?}", action),
        resource = format!("{:?}", resource)
    );
    Err(AppError::forbidden(denied_message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ErrorCode;

    fn principal(id: i64, role: Role) -> CurrentUser {
        CurrentUser {
            id,
            email: format!("user{id}@example.com"),
            role,
        }
    }

    #[test]
    fn test_catalog() {
        let user = principal(1, Role::User);
        let manager = principal(2, Role::Manager);
        assert!(authorize(&user, Action::Read, Resource::Catalog));
        assert!(!authorize(&user, Action::Write, Resource::Catalog));
        assert!(authorize(&manager, Action::Write, Resource::Catalog));
    }

    #[test]
    fn test_ownership() {
        let user = principal(1, Role::User);
        let admin = principal(9, Role::Admin);

        assert!(authorize(&user, Action::Write, Resource::Cart { owner_id: 1 }));
        assert!(!authorize(&user, Action::Read, Resource::Cart { owner_id: 2 }));
        // Staff read orders, never carts, of other users
        assert!(!authorize(&admin, Action::Read, Resource::Cart { owner_id: 1 }));
        assert!(authorize(&admin, Action::Read, Resource::Order { owner_id: 1 }));
        assert!(authorize(&user, Action::Read, Resource::Order { owner_id: 1 }));
        assert!(!authorize(&user, Action::Read, Resource::Order { owner_id: 2 }));
        assert!(!authorize(&user, Action::Read, Resource::AllOrders));
    }

    #[test]
    fn test_staff_only_resources() {
        let user = principal(1, Role::User);
        let manager = principal(2, Role::Manager);
        let admin = principal(3, Role::Admin);

        assert!(!authorize(&user, Action::Read, Resource::Inventory));
        assert!(authorize(&manager, Action::Write, Resource::Inventory));
        assert!(!authorize(&manager, Action::Read, Resource::Statistics));
        assert!(authorize(&admin, Action::Read, Resource::Statistics));
    }

    #[test]
    fn test_require_maps_to_forbidden() {
        let user = principal(1, Role::User);
        let err = require(&user, Action::Write, Resource::Inventory, "Staff only").unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
        assert_eq!(err.message, "Staff only");
        assert!(require(&user, Action::Read, Resource::Catalog, "unused").is_ok());
    }
}
