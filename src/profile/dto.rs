use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::User;

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(flatten)]
    pub profile: UserProfile,
}

/// Optional personal attributes used to tailor recommendations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub current_location: Option<String>,
    #[serde(default)]
    pub marital_status: Option<String>,
    #[serde(default)]
    pub occupation: Option<String>,
}

impl UserProfile {
    /// Blank strings become `None`; surrounding whitespace is dropped.
    pub fn normalized(self) -> Self {
        fn clean(v: Option<String>) -> Option<String> {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        }
        Self {
            gender: clean(self.gender),
            age: self.age,
            nationality: clean(self.nationality),
            current_location: clean(self.current_location),
            marital_status: clean(self.marital_status),
            occupation: clean(self.occupation),
        }
    }

    /// `Label: value` lines for each attribute that is present.
    pub fn context_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        let mut push = |label: &str, value: Option<String>| {
            if let Some(v) = value {
                lines.push(format!("{label}: {v}"));
            }
        };
        push("Gender", self.gender.clone());
        push("Age", self.age.map(|a| a.to_string()));
        push("Nationality", self.nationality.clone());
        push("Location", self.current_location.clone());
        push("Marital Status", self.marital_status.clone());
        push("Occupation", self.occupation.clone());
        lines
    }
}

impl From<&User> for UserProfile {
    fn from(u: &User) -> Self {
        Self {
            gender: u.gender.clone(),
            age: u.age,
            nationality: u.nationality.clone(),
            current_location: u.current_location.clone(),
            marital_status: u.marital_status.clone(),
            occupation: u.occupation.clone(),
        }
    }
}

impl From<User> for ProfileResponse {
    fn from(u: User) -> Self {
        let profile = UserProfile::from(&u);
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            profile,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileUpdated {
    pub success: bool,
    pub message: &'static str,
    pub changes: u64,
}
