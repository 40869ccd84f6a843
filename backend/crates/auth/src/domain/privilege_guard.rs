//! Privilege Guard
//!
//! Rules that keep administrative endpoints from escalating or removing
//! privileges. Superadmin accounts can only be created out of band, can
//! only have their password changed (and only by a superadmin), and never
//! show up in ordinary listings.

use crate::domain::entity::account::{Account, AccountPatch};
use crate::domain::value_object::{account_id::AccountId, role::Role};
use crate::error::{AuthError, AuthResult};

/// Who is performing an administrative action
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub account_id: AccountId,
    pub role: Role,
}

fn violation(message: &str) -> AuthError {
    AuthError::PrivilegeViolation(message.to_string())
}

/// Check an update against the target's current state
pub fn check_update(actor: &Actor, target: &Account, patch: &AccountPatch) -> AuthResult<()> {
    if patch.is_empty() {
        return Err(AuthError::Validation("Nothing to update".into()));
    }

    if target.role.is_super_admin() {
        if patch.role.is_some() {
            return Err(violation("The role of a superadmin account cannot be changed"));
        }
        if !patch.is_password_only() {
            return Err(violation(
                "Only the password of a superadmin account can be changed",
            ));
        }
        if !actor.role.is_super_admin() {
            return Err(violation(
                "Only a superadmin can change the password of a superadmin account",
            ));
        }
        return Ok(());
    }

    if patch.role == Some(Role::SuperAdmin) {
        return Err(violation("The superadmin role cannot be granted"));
    }

    if target.account_id == actor.account_id {
        if patch.role.is_some_and(|role| role != target.role) {
            return Err(violation("You cannot change your own role"));
        }
        if patch.deactivates() {
            return Err(violation("You cannot deactivate your own account"));
        }
    }

    Ok(())
}

pub fn check_delete(actor: &Actor, target: &Account) -> AuthResult<()> {
    if target.role.is_super_admin() {
        return Err(violation("A superadmin account cannot be deleted"));
    }
    if target.account_id == actor.account_id {
        return Err(violation("You cannot delete your own account"));
    }
    Ok(())
}

pub fn check_revoke_sessions(target: &Account) -> AuthResult<()> {
    if target.role.is_super_admin() {
        return Err(violation(
            "Sessions of a superadmin account cannot be revoked by an administrator",
        ));
    }
    Ok(())
}

/// Superadmins are hidden from non-superadmin viewers
pub fn is_visible_to(actor: &Actor, target: &Account) -> bool {
    !target.role.is_super_admin() || actor.role.is_super_admin()
}

/// Restrict a requested role filter to roles that may be listed
pub fn listable_roles(requested: Option<Role>) -> Vec<Role> {
    match requested {
        Some(role) if Role::LISTABLE.contains(&role) => vec![role],
        Some(_) => Vec::new(),
        None => Role::LISTABLE.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::{
        account_password::{AccountPassword, RawPassword},
        display_name::DisplayName,
        email::Email,
    };

    fn account(role: Role) -> Account {
        let raw = RawPassword::for_sign_in("correct-pw".into());
        Account::new(
            Email::new(format!("{}@example.com", role.code())).unwrap(),
            DisplayName::new(role.code()).unwrap(),
            AccountPassword::from_raw(&raw, None).unwrap(),
            role,
        )
    }

    fn actor_for(account: &Account) -> Actor {
        Actor {
            account_id: account.account_id,
            role: account.role,
        }
    }

    fn new_hash() -> AccountPassword {
        AccountPassword::from_raw(&RawPassword::for_sign_in("another-pw".into()), None).unwrap()
    }

    #[test]
    fn test_superadmin_role_change_rejected() {
        let admin = account(Role::Admin);
        let root = account(Role::SuperAdmin);
        let patch = AccountPatch {
            role: Some(Role::Admin),
            ..Default::default()
        };
        assert!(matches!(
            check_update(&actor_for(&admin), &root, &patch),
            Err(AuthError::PrivilegeViolation(_))
        ));
    }

    #[test]
    fn test_superadmin_password_change_needs_superadmin_actor() {
        let admin = account(Role::Admin);
        let root = account(Role::SuperAdmin);
        let other_root = account(Role::SuperAdmin);
        let patch = AccountPatch {
            password_hash: Some(new_hash()),
            ..Default::default()
        };

        assert!(matches!(
            check_update(&actor_for(&admin), &root, &patch),
            Err(AuthError::PrivilegeViolation(_))
        ));
        assert!(check_update(&actor_for(&root), &root, &patch).is_ok());
        assert!(check_update(&actor_for(&other_root), &root, &patch).is_ok());
    }

    #[test]
    fn test_superadmin_mixed_update_rejected() {
        let admin = account(Role::Admin);
        let root = account(Role::SuperAdmin);
        let patch = AccountPatch {
            password_hash: Some(new_hash()),
            active: Some(false),
            ..Default::default()
        };
        assert!(matches!(
            check_update(&actor_for(&admin), &root, &patch),
            Err(AuthError::PrivilegeViolation(_))
        ));
    }

    #[test]
    fn test_granting_superadmin_rejected() {
        let admin = account(Role::Admin);
        let user = account(Role::User);
        let patch = AccountPatch {
            role: Some(Role::SuperAdmin),
            ..Default::default()
        };
        assert!(check_update(&actor_for(&admin), &user, &patch).is_err());
    }

    #[test]
    fn test_regular_update_allowed() {
        let admin = account(Role::Admin);
        let user = account(Role::User);
        let patch = AccountPatch {
            role: Some(Role::Admin),
            active: Some(false),
            ..Default::default()
        };
        assert!(check_update(&actor_for(&admin), &user, &patch).is_ok());
    }

    #[test]
    fn test_empty_update_rejected() {
        let admin = account(Role::Admin);
        let user = account(Role::User);
        assert!(matches!(
            check_update(&actor_for(&admin), &user, &AccountPatch::default()),
            Err(AuthError::Validation(_))
        ));
    }

    #[test]
    fn test_self_demotion_and_deactivation_rejected() {
        let admin = account(Role::Admin);
        let actor = actor_for(&admin);
        let demote = AccountPatch {
            role: Some(Role::User),
            ..Default::default()
        };
        let deactivate = AccountPatch {
            active: Some(false),
            ..Default::default()
        };
        assert!(check_update(&actor, &admin, &demote).is_err());
        assert!(check_update(&actor, &admin, &deactivate).is_err());
    }

    #[test]
    fn test_delete_rules() {
        let admin = account(Role::Admin);
        let actor = actor_for(&admin);
        assert!(check_delete(&actor, &account(Role::SuperAdmin)).is_err());
        assert!(check_delete(&actor, &admin).is_err());
        assert!(check_delete(&actor, &account(Role::User)).is_ok());
    }

    #[test]
    fn test_revoke_sessions_rules() {
        assert!(check_revoke_sessions(&account(Role::SuperAdmin)).is_err());
        assert!(check_revoke_sessions(&account(Role::Admin)).is_ok());
    }

    #[test]
    fn test_visibility_and_listing() {
        let admin = actor_for(&account(Role::Admin));
        let root_actor = actor_for(&account(Role::SuperAdmin));
        let root = account(Role::SuperAdmin);

        assert!(!is_visible_to(&admin, &root));
        assert!(is_visible_to(&root_actor, &root));
        assert_eq!(listable_roles(None), vec![Role::User, Role::Admin]);
        assert_eq!(listable_roles(Some(Role::Admin)), vec![Role::Admin]);
        assert!(listable_roles(Some(Role::SuperAdmin)).is_empty());
    }
}
