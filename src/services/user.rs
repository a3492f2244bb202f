//! User service implementation
//!
//! Administrative account operations: create, delete and list users.

use tracing::{debug, info};

use crate::database::DatabaseService;
use crate::models::user::{NewUserRequest, User};
use crate::services::page_params;
use crate::utils::errors::{AfishaError, Result};

/// Service for administrative user management
#[derive(Clone)]
pub struct UserService {
    db: DatabaseService,
}

impl UserService {
    /// Create a new UserService instance
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    pub async fn create_user(&self, request: NewUserRequest) -> Result<User> {
        validate_new_user(&request)?;
        if self.db.users.find_by_email(&request.email).await?.is_some() {
            return Err(AfishaError::Conflict(format!(
                "Email '{}' is already registered",
                request.email
            )));
        }

        let user = self.db.users.create(&request.name, &request.email).await?;
        info!(user_id = user.id, "User created");
        Ok(user)
    }

    pub async fn delete_user(&self, user_id: i64) -> Result<()> {
        let deleted = self.db.users.delete(user_id).await?;
        if deleted == 0 {
            return Err(AfishaError::UserNotFound { user_id });
        }
        info!(user_id = user_id, "User deleted");
        Ok(())
    }

    /// List users, optionally restricted to an id set
    pub async fn list_users(
        &self,
        ids: Option<Vec<i64>>,
        from: i64,
        size: i64,
    ) -> Result<Vec<User>> {
        let (limit, offset) = page_params(from, size)?;
        debug!(from = from, size = size, "Listing users");

        self.db.users.list(ids.as_deref(), limit, offset).await
    }
}

fn validate_new_user(request: &NewUserRequest) -> Result<()> {
    let name_length = request.name.trim().chars().count();
    if name_length < 2 || name_length > 250 {
        return Err(AfishaError::InvalidInput(
            "User name must be between 2 and 250 characters".to_string(),
        ));
    }
    let email_length = request.email.chars().count();
    if email_length < 6 || email_length > 254 || !request.email.contains('@') {
        return Err(AfishaError::InvalidInput(
            "Email must be a valid address between 6 and 254 characters".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_validate_new_user() {
        let valid = NewUserRequest {
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
        };
        assert!(validate_new_user(&valid).is_ok());

        let short_name = NewUserRequest {
            name: "A".to_string(),
            email: "alice@example.com".to_string(),
        };
        assert_matches!(
            validate_new_user(&short_name),
            Err(AfishaError::InvalidInput(_))
        );

        let bad_email = NewUserRequest {
            name: "Alice".to_string(),
            email: "alice.example.com".to_string(),
        };
        assert_matches!(
            validate_new_user(&bad_email),
            Err(AfishaError::InvalidInput(_))
        );
    }
}
