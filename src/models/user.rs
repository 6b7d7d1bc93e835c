use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

pub type UserId = i64;

/// A catalog user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub login: String,
    /// Display name, equal to the login when none was given
    pub name: String,
    pub birthday: NaiveDate,
}

/// Fields accepted when creating or replacing a user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserDraft {
    pub email: String,
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    pub birthday: NaiveDate,
}

impl UserDraft {
    /// Checks the draft and resolves the display name
    pub fn validate(mut self) -> AppResult<Self> {
        if !self.email.contains('@') {
            return Err(AppError::InvalidInput(format!(
                "Invalid email address: {}",
                self.email
            )));
        }
        if self.login.trim().is_empty() || self.login.chars().any(char::is_whitespace) {
            return Err(AppError::InvalidInput(
                "Login must be non-empty and contain no whitespace".to_string(),
            ));
        }
        if self.birthday > Utc::now().date_naive() {
            return Err(AppError::InvalidInput(
                "Birthday cannot be in the future".to_string(),
            ));
        }
        self.name = Some(self.display_name());
        Ok(self)
    }

    /// Display name falls back to the login when blank
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => self.login.clone(),
        }
    }

    pub fn into_user(self, id: UserId) -> User {
        let name = self.display_name();
        User {
            id,
            email: self.email,
            login: self.login,
            name,
            birthday: self.birthday,
        }
    }
}
