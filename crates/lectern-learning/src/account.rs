//! Account registration, credential checks and profile maintenance.
//!
//! `authenticate` resolves a [`Principal`]; issuing tokens for it is the
//! caller's business.

use lectern_core::error::{LecternError, LecternResult};
use lectern_core::models::principal::Principal;
use lectern_core::models::user::{CreateUser, UpdateUser, User, UserRole, UserStatus};
use lectern_core::repository::UserRepository;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::LearningError;
use crate::password;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    /// Defaults to [`UserRole::Student`].
    pub role: Option<UserRole>,
}

/// Fields a user may change on their own profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<Option<String>>,
}

/// Account service.
pub struct AccountService<U: UserRepository> {
    users: U,
}

impl<U: UserRepository> AccountService<U> {
    pub fn new(users: U) -> Self {
        Self { users }
    }

    pub async fn register(&self, input: NewAccount) -> LecternResult<User> {
        if input.password.is_empty() {
            return Err(LearningError::Invalid("password must not be empty".into()).into());
        }

        let user = self
            .users
            .create(CreateUser {
                email: input.email.trim().to_lowercase(),
                password: input.password,
                first_name: input.first_name,
                last_name: input.last_name,
                bio: None,
                role: input.role.unwrap_or(UserRole::Student),
            })
            .await
            .map_err(|e| match e {
                LecternError::Conflict { .. } => LecternError::Conflict {
                    reason: "email already registered".into(),
                },
                other => other,
            })?;

        info!(user_id = %user.id, role = %user.role, "Account registered");
        Ok(user)
    }

    /// Check an email/password pair and resolve the account's principal.
    ///
    /// An unknown email and a wrong password fail identically.
    pub async fn authenticate(&self, email: &str, password: &str) -> LecternResult<Principal> {
        let user = match self.users.get_by_email(&email.trim().to_lowercase()).await {
            Ok(user) => user,
            Err(LecternError::NotFound { .. }) => {
                return Err(LearningError::InvalidCredentials.into());
            }
            Err(e) => return Err(e),
        };

        let valid = password::verify_password(password, &user.password_hash)?;
        if !valid {
            warn!(user_id = %user.id, "Password mismatch");
            return Err(LearningError::InvalidCredentials.into());
        }

        if user.status != UserStatus::Active {
            warn!(user_id = %user.id, status = %user.status.as_str(), "Login on inactive account");
            return Err(LearningError::AccountNotActive.into());
        }

        Ok(Principal::from(&user))
    }

    pub async fn profile(&self, principal: &Principal) -> LecternResult<User> {
        self.users.get_by_id(principal.user_id).await
    }

    pub async fn update_profile(
        &self,
        principal: &Principal,
        changes: ProfileChanges,
    ) -> LecternResult<User> {
        self.users.get_by_id(principal.user_id).await?;
        self.users
            .update(
                principal.user_id,
                UpdateUser {
                    first_name: changes.first_name,
                    last_name: changes.last_name,
                    bio: changes.bio,
                    status: None,
                },
            )
            .await
    }
}
