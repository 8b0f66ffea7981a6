//! User directory and session contract.
//!
//! The directory supplies the authenticated `(user_id, role)` for each
//! request. Ledger operations trust this identity and never re-validate it.

use chrono::Duration;
use serde::Deserialize;
use uuid::Uuid;

use crate::BoxFuture;
use crate::error::{LedgerError, Result};
use crate::password::Password;
use crate::types::{Identity, Role, Session, User, UserId};

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(LedgerError::Validation("Missing required fields".to_string()));
    }
    Ok(())
}

fn validate_mobile(mobile: &str) -> Result<()> {
    if mobile.len() != 10 || !mobile.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LedgerError::Validation("Invalid mobile number".to_string()));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<()> {
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        return Err(LedgerError::Validation("Invalid email".to_string()));
    }
    Ok(())
}

/// Registration request.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct NewUser {
    /// Display name
    pub name: String,
    /// 10-digit mobile number
    pub mobile: String,
    /// Requested role
    pub role: Role,
    /// Optional email
    pub email: Option<String>,
    /// Login password, stored only as a hash
    pub password: Password,
}

impl NewUser {
    /// # Errors
    ///
    /// Returns [`LedgerError::Validation`] for a blank name, a mobile number
    /// that is not exactly 10 digits, a malformed email or a short password.
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        validate_mobile(&self.mobile)?;
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        self.password.validate()
    }
}

/// What a user logs in with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoginId {
    /// Registered email address
    Email(String),
    /// Registered mobile number
    Mobile(String),
}

/// Login identifier plus password.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    /// Email or mobile number
    pub login: LoginId,
    /// Plaintext password to check
    pub password: Password,
}

/// Partial profile update. `None` leaves a field unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ProfileUpdate {
    /// New display name
    pub name: Option<String>,
    /// New email
    pub email: Option<String>,
    /// New 10-digit mobile number
    pub mobile: Option<String>,
    /// New password
    pub password: Option<Password>,
}

impl ProfileUpdate {
    /// # Errors
    ///
    /// Returns [`LedgerError::Validation`] if no field is set or a set field
    /// fails the signup rules.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_none()
            && self.email.is_none()
            && self.mobile.is_none()
            && self.password.is_none()
        {
            return Err(LedgerError::Validation("No fields to update".to_string()));
        }
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(mobile) = &self.mobile {
            validate_mobile(mobile)?;
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        if let Some(password) = &self.password {
            password.validate()?;
        }
        Ok(())
    }

    /// Applies the non-credential fields to `user`.
    pub fn apply_to(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name.clone_from(name);
        }
        if let Some(mobile) = &self.mobile {
            user.mobile.clone_from(mobile);
        }
        if let Some(email) = &self.email {
            user.email = Some(email.clone());
        }
    }
}

/// Users, sessions and profile lookups.
pub trait UserDirectory: Send + Sync {
    /// Registers a user, storing a hash of their password.
    ///
    /// # Errors
    ///
    /// `AlreadyExists` if the mobile number or email is taken.
    fn register(&self, user: NewUser) -> BoxFuture<'_, Result<User>>;

    /// Checks credentials and returns the matching user.
    ///
    /// # Errors
    ///
    /// `InvalidCredentials` for an unknown login or a wrong password.
    fn authenticate(&self, credentials: Credentials) -> BoxFuture<'_, Result<User>>;

    /// Issues a bearer session for `user_id` valid for `ttl`. Expired
    /// sessions of any user may be purged on the way.
    ///
    /// # Errors
    ///
    /// `NotFound` if the user does not exist.
    fn create_session(&self, user_id: UserId, ttl: Duration) -> BoxFuture<'_, Result<Session>>;

    /// Resolves an unexpired session token to its identity.
    ///
    /// # Errors
    ///
    /// `Database` on storage failure. Unknown or expired tokens are `Ok(None)`.
    fn resolve_session(&self, token: Uuid) -> BoxFuture<'_, Result<Option<Identity>>>;

    /// Looks up a user profile.
    ///
    /// # Errors
    ///
    /// `NotFound` if the user does not exist.
    fn get_user(&self, user_id: UserId) -> BoxFuture<'_, Result<User>>;

    /// Updates name, email, mobile and password; unset fields keep their values.
    ///
    /// # Errors
    ///
    /// `Validation` for an empty or malformed update, `NotFound` if the user
    /// does not exist, `AlreadyExists` if the new mobile or email is taken.
    fn update_profile(
        &self,
        user_id: UserId,
        update: ProfileUpdate,
    ) -> BoxFuture<'_, Result<User>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(mobile: &str, email: Option<&str>) -> NewUser {
        NewUser {
            name: "Asha".to_string(),
            mobile: mobile.to_string(),
            role: Role::Explorer,
            email: email.map(str::to_string),
            password: Password::new("s3cret-pass"),
        }
    }

    #[test]
    fn test_mobile_must_be_ten_digits() {
        assert!(user("9876543210", None).validate().is_ok());
        assert!(user("98765", None).validate().is_err());
        assert!(user("98765abcde", None).validate().is_err());
    }

    #[test]
    fn test_email_shape() {
        assert!(user("9876543210", Some("asha@example.com")).validate().is_ok());
        assert!(user("9876543210", Some("asha")).validate().is_err());
    }

    #[test]
    fn test_short_password_rejected() {
        let weak = NewUser {
            password: Password::new("1234"),
            ..user("9876543210", None)
        };
        assert!(matches!(weak.validate(), Err(LedgerError::Validation(_))));
    }

    #[test]
    fn test_profile_update_rules() {
        assert_eq!(
            ProfileUpdate::default().validate(),
            Err(LedgerError::Validation("No fields to update".to_string()))
        );
        let bad_mobile = ProfileUpdate {
            mobile: Some("123".to_string()),
            ..ProfileUpdate::default()
        };
        assert!(bad_mobile.validate().is_err());
        let rename = ProfileUpdate {
            name: Some("Asha K".to_string()),
            ..ProfileUpdate::default()
        };
        assert!(rename.validate().is_ok());
    }

    #[test]
    fn test_profile_update_keeps_unset_fields() {
        let mut stored = User {
            id: UserId::new(),
            name: "Asha".to_string(),
            mobile: "9876543210".to_string(),
            email: Some("asha@example.com".to_string()),
            role: Role::Explorer,
            created_at: chrono::Utc::now(),
        };
        ProfileUpdate {
            mobile: Some("9123456780".to_string()),
            ..ProfileUpdate::default()
        }
        .apply_to(&mut stored);

        assert_eq!(stored.name, "Asha");
        assert_eq!(stored.mobile, "9123456780");
        assert_eq!(stored.email.as_deref(), Some("asha@example.com"));
    }
}
