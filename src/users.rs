//! User directory
//!
//! Users are kept in memory only; the directory is seeded with the sample
//! accounts the desk ships with.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserRole {
    Administrator,
    Agent,
    User,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Administrator => write!(f, "Administrator"),
            Self::Agent => write!(f, "Agent"),
            Self::User => write!(f, "User"),
        }
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "administrator" | "admin" => Ok(Self::Administrator),
            "agent" => Ok(Self::Agent),
            "user" => Ok(Self::User),
            _ => Err(format!("Unknown user role: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
    Suspended,
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::Inactive => write!(f, "Inactive"),
            Self::Suspended => write!(f, "Suspended"),
        }
    }
}

impl FromStr for UserStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "suspended" => Ok(Self::Suspended),
            _ => Err(format!("Unknown user status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub joined_date: NaiveDate,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UserError {
    #[error("User already exists: {0}")]
    AlreadyExists(String),

    #[error("User not found: {0}")]
    NotFound(String),
}

/// Role / status / free-text criteria. `None` means "All".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
    /// Case-insensitive match on id, username or email
    pub search: Option<String>,
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        if self.role.is_some_and(|r| r != user.role) {
            return false;
        }
        if self.status.is_some_and(|s| s != user.status) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => {
                let needle = needle.to_lowercase();
                [&user.user_id, &user.username, &user.email]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            }
            _ => true,
        }
    }
}

type SampleUser = (&'static str, &'static str, &'static str, UserRole, UserStatus, NaiveDate);

const SAMPLE_USERS: [SampleUser; 6] = [
    ("U001", "admin", "admin@ticketpro.com", UserRole::Administrator, UserStatus::Active, date(2024, 1, 15)),
    ("U002", "john.doe", "john@ticketpro.com", UserRole::Agent, UserStatus::Active, date(2024, 2, 20)),
    ("U003", "jane.smith", "jane@ticketpro.com", UserRole::Agent, UserStatus::Active, date(2024, 3, 10)),
    ("U004", "mike.johnson", "mike@ticketpro.com", UserRole::User, UserStatus::Active, date(2024, 4, 5)),
    ("U005", "sarah.wilson", "sarah@ticketpro.com", UserRole::Agent, UserStatus::Active, date(2024, 5, 12)),
    ("U006", "bob.miller", "bob@ticketpro.com", UserRole::User, UserStatus::Inactive, date(2024, 6, 18)),
];

/// Evaluated in const context, so a bad date fails the build
const fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => date,
        None => panic!("invalid sample user date"),
    }
}

/// Ordered list of users with unique ids
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: Vec<User>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// The six accounts every fresh install starts with
    pub fn with_sample_users() -> Self {
        let users = SAMPLE_USERS
            .iter()
            .map(|&(id, name, email, role, status, joined_date)| User {
                user_id: id.into(),
                username: name.into(),
                email: email.into(),
                role,
                status,
                joined_date,
            })
            .collect();
        Self { users }
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn get(&self, user_id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.user_id == user_id)
    }

    pub fn filtered<'a>(&'a self, filter: &'a UserFilter) -> impl Iterator<Item = &'a User> {
        self.users.iter().filter(move |u| filter.matches(u))
    }

    pub fn add(&mut self, user: User) -> Result<(), UserError> {
        if self.get(&user.user_id).is_some() {
            return Err(UserError::AlreadyExists(user.user_id));
        }
        self.users.push(user);
        Ok(())
    }

    /// Replace the user with the same `user_id`
    pub fn update(&mut self, user: User) -> Result<(), UserError> {
        match self.users.iter_mut().find(|u| u.user_id == user.user_id) {
            Some(slot) => {
                *slot = user;
                Ok(())
            }
            None => Err(UserError::NotFound(user.user_id)),
        }
    }

    pub fn remove(&mut self, user_id: &str) -> Result<User, UserError> {
        let pos = self
            .users
            .iter()
            .position(|u| u.user_id == user_id)
            .ok_or_else(|| UserError::NotFound(user_id.to_string()))?;
        Ok(self.users.remove(pos))
    }
}
