use rusqlite::{params, OptionalExtension, Row};

use learnforge_core::model::{Role, UserProfile};
use learnforge_core::traits::ExternalIdentity;

use crate::error::map_unique;
use crate::schema::now_iso8601;
use crate::{Result, Store, StoreError};

/// Fields for a new account. Emails are stored lowercased.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    /// `None` for accounts that only sign in through OAuth.
    pub password_hash: Option<String>,
    pub role: Role,
}

/// A user together with the stored password hash.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub profile: UserProfile,
    pub password_hash: Option<String>,
}

const USER_COLUMNS: &str = "id, username, email, role, created_at, password_hash";

fn row_to_credentials(row: &Row<'_>) -> rusqlite::Result<UserCredentials> {
    let role: String = row.get(3)?;
    Ok(UserCredentials {
        profile: UserProfile {
            id: row.get(0)?,
            username: row.get(1)?,
            email: row.get(2)?,
            role: role.parse().unwrap_or_default(),
            created_at: row.get(4)?,
        },
        password_hash: row.get(5)?,
    })
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl Store {
    pub fn create_user(&self, user: &NewUser) -> Result<UserProfile> {
        let email = normalize_email(&user.email);
        let username = user.username.trim();

        if self.email_exists(&email)? {
            return Err(StoreError::Conflict("Email already registered".into()));
        }
        if self.username_exists(username)? {
            return Err(StoreError::Conflict("Username already taken".into()));
        }

        let conn = self.lock()?;
        let now = now_iso8601();
        conn.execute(
            "INSERT INTO users (username, email, password_hash, role, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![username, email, user.password_hash, user.role.to_string(), now],
        )
        .map_err(|e| map_unique(e, "Email or username already in use"))?;

        let id = conn.last_insert_rowid();
        tracing::info!(user_id = id, %username, role = %user.role, "user created");

        Ok(UserProfile {
            id,
            username: username.to_string(),
            email,
            role: user.role,
            created_at: now,
        })
    }

    pub fn find_user_by_email(&self, email: &str) -> Result<Option<UserCredentials>> {
        let conn = self.lock()?;
        let user = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
                params![normalize_email(email)],
                row_to_credentials,
            )
            .optional()?;
        Ok(user)
    }

    pub fn find_user_by_id(&self, id: i64) -> Result<Option<UserProfile>> {
        let conn = self.lock()?;
        let user = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id],
                row_to_credentials,
            )
            .optional()?;
        Ok(user.map(|u| u.profile))
    }

    pub fn email_exists(&self, email: &str) -> Result<bool> {
        let conn = self.lock()?;
        let found: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1)",
            params![normalize_email(email)],
            |row| row.get(0),
        )?;
        Ok(found)
    }

    pub fn username_exists(&self, username: &str) -> Result<bool> {
        let conn = self.lock()?;
        let found: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1)",
            params![username.trim()],
            |row| row.get(0),
        )?;
        Ok(found)
    }

    /// Find the account for an external identity, creating it on first
    /// sign-in with a unique username derived from the profile.
    pub fn find_or_create_oauth_user(&self, identity: &ExternalIdentity) -> Result<UserProfile> {
        let email = identity.login_email();
        if let Some(existing) = self.find_user_by_email(&email)? {
            return Ok(existing.profile);
        }

        let username = self.unique_username(&username_base(identity))?;
        tracing::info!(provider = %identity.provider, %username, "creating account for OAuth sign-in");
        self.create_user(&NewUser {
            username,
            email,
            password_hash: None,
            role: Role::Student,
        })
    }

    fn unique_username(&self, base: &str) -> Result<String> {
        if !self.username_exists(base)? {
            return Ok(base.to_string());
        }
        for n in 2..1000 {
            let candidate = format!("{base}{n}");
            if !self.username_exists(&candidate)? {
                return Ok(candidate);
            }
        }
        Err(StoreError::Conflict(format!(
            "could not derive a free username from '{base}'"
        )))
    }
}

/// Display name, else email local part, else `{provider}_{subject}`, reduced
/// to `[A-Za-z0-9_.-]`.
fn username_base(identity: &ExternalIdentity) -> String {
    let source = identity
        .display_name
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .map(str::to_string)
        .or_else(|| {
            identity
                .email
                .as_deref()
                .and_then(|e| e.split('@').next())
                .filter(|local| !local.trim().is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("{}_{}", identity.provider, identity.subject));

    let cleaned: String = source
        .trim()
        .chars()
        .filter_map(|c| match c {
            c if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') => Some(c),
            c if c.is_whitespace() => Some('_'),
            _ => None,
        })
        .collect();

    if cleaned.is_empty() {
        format!("{}_user", identity.provider)
    } else {
        cleaned
    }
}
