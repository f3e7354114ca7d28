use crate::domains::{BloodGroup, UserEmail, UserName};
use crate::utils::contains_ignore_case;
use chrono::{DateTime, Utc};
use secrecy::Secret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Donor,
    Volunteer,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Donor => "donor",
            Role::Volunteer => "volunteer",
            Role::Admin => "admin",
        }
    }
}

impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "donor" => Ok(Self::Donor),
            "volunteer" => Ok(Self::Volunteer),
            "admin" => Ok(Self::Admin),
            other => Err(format!("{} is not a known role", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Blocked,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Blocked => "blocked",
        }
    }
}

impl TryFrom<String> for UserStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "active" => Ok(Self::Active),
            "blocked" => Ok(Self::Blocked),
            other => Err(format!("{} is not a known user status", other)),
        }
    }
}

/// A stored account. Never serialized directly; see [`UserProfile`].
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: UserEmail,
    pub password_hash: Option<Secret<String>>,
    pub external_id: Option<String>,
    pub name: String,
    pub avatar: Option<String>,
    pub blood_group: Option<BloodGroup>,
    pub district: Option<String>,
    pub sub_district: Option<String>,
    pub role: Role,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// A fresh active donor account.
    pub fn new(email: UserEmail, name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash: None,
            external_id: None,
            name,
            avatar: None,
            blood_group: None,
            district: None,
            sub_district: None,
            role: Role::Donor,
            status: UserStatus::Active,
            created_at: Utc::now(),
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.status == UserStatus::Blocked
    }
}

/// The only shape in which a user leaves the service.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub avatar: Option<String>,
    pub blood_group: Option<BloodGroup>,
    pub district: Option<String>,
    pub sub_district: Option<String>,
    pub role: Role,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.as_ref().to_owned(),
            name: user.name.clone(),
            avatar: user.avatar.clone(),
            blood_group: user.blood_group,
            district: user.district.clone(),
            sub_district: user.sub_district.clone(),
            role: user.role,
            status: user.status,
            created_at: user.created_at,
        }
    }
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}

/// Fields a user (or an admin on their behalf) may change.
#[derive(Debug, Default)]
pub struct ProfileUpdate {
    pub name: Option<UserName>,
    pub avatar: Option<String>,
    pub blood_group: Option<BloodGroup>,
    pub district: Option<String>,
    pub sub_district: Option<String>,
}

impl ProfileUpdate {
    pub fn apply(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = name.as_ref().to_owned();
        }
        if let Some(avatar) = self.avatar {
            user.avatar = Some(avatar);
        }
        if let Some(blood_group) = self.blood_group {
            user.blood_group = Some(blood_group);
        }
        if let Some(district) = self.district {
            user.district = Some(district);
        }
        if let Some(sub_district) = self.sub_district {
            user.sub_district = Some(sub_district);
        }
    }
}

/// Equality filters on status and blood group, substring filters on location.
#[derive(Debug, Default, Clone)]
pub struct UserFilter {
    pub status: Option<UserStatus>,
    pub blood_group: Option<BloodGroup>,
    pub district: Option<String>,
    pub sub_district: Option<String>,
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        if self.status.is_some_and(|status| status != user.status) {
            return false;
        }
        if self
            .blood_group
            .is_some_and(|group| user.blood_group != Some(group))
        {
            return false;
        }
        let location_matches = |wanted: &Option<String>, actual: &Option<String>| match wanted {
            None => true,
            Some(wanted) => actual
                .as_deref()
                .is_some_and(|actual| contains_ignore_case(actual, wanted)),
        };
        location_matches(&self.district, &user.district)
            && location_matches(&self.sub_district, &user.sub_district)
    }
}
