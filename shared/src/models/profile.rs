//! Profile models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A member profile, keyed by the auth user id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub id: Uuid,
    pub full_name: String,
    pub role: UserRole,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    /// Crops grown or traded, in the order the owner entered them
    pub crop_types: Vec<String>,
    pub business_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Role chosen at sign-up
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Farmer,
    User,
    Wholesaler,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Farmer => "farmer",
            UserRole::User => "user",
            UserRole::Wholesaler => "wholesaler",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "farmer" => Ok(UserRole::Farmer),
            "user" => Ok(UserRole::User),
            "wholesaler" => Ok(UserRole::Wholesaler),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// Compact author/participant view embedded in feeds and conversation lists
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileSummary {
    pub id: Uuid,
    pub full_name: String,
    pub role: UserRole,
    pub location: Option<String>,
}

impl From<&Profile> for ProfileSummary {
    fn from(p: &Profile) -> Self {
        ProfileSummary {
            id: p.id,
            full_name: p.full_name.clone(),
            role: p.role,
            location: p.location.clone(),
        }
    }
}

/// Directory filters; all optional and combined with AND
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectoryFilter {
    /// Matches full name, business type or any crop type
    pub search: Option<String>,
    pub role: Option<UserRole>,
    pub location: Option<String>,
}

impl DirectoryFilter {
    /// Case-insensitive match of a profile against this filter
    pub fn matches(&self, profile: &Profile) -> bool {
        if let Some(term) = non_blank(&self.search) {
            let term = term.to_lowercase();
            let in_name = profile.full_name.to_lowercase().contains(&term);
            let in_business = profile
                .business_type
                .as_deref()
                .map(|b| b.to_lowercase().contains(&term))
                .unwrap_or(false);
            let in_crops = profile
                .crop_types
                .iter()
                .any(|c| c.to_lowercase().contains(&term));
            if !(in_name || in_business || in_crops) {
                return false;
            }
        }

        if let Some(role) = self.role {
            if profile.role != role {
                return false;
            }
        }

        if let Some(location) = non_blank(&self.location) {
            let location = location.to_lowercase();
            match &profile.location {
                Some(l) if l.to_lowercase().contains(&location) => {}
                _ => return false,
            }
        }

        true
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str, role: UserRole, location: Option<&str>, crops: &[&str]) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            full_name: name.to_string(),
            role,
            location: location.map(str::to_string),
            phone: None,
            bio: None,
            crop_types: crops.iter().map(|c| c.to_string()).collect(),
            business_type: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("farmer".parse::<UserRole>(), Ok(UserRole::Farmer));
        assert_eq!("Wholesaler".parse::<UserRole>(), Ok(UserRole::Wholesaler));
        assert!("admin".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_directory_search_matches_crops() {
        let p = profile("Ravi Kumar", UserRole::Farmer, Some("Nashik"), &["Onion", "Grapes"]);
        let filter = DirectoryFilter {
            search: Some("grape".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&p));
    }

    #[test]
    fn test_directory_role_and_location() {
        let p = profile("Asha", UserRole::Wholesaler, Some("Pune"), &[]);
        let by_role = DirectoryFilter {
            role: Some(UserRole::Farmer),
            ..Default::default()
        };
        assert!(!by_role.matches(&p));

        let by_location = DirectoryFilter {
            location: Some("pun".to_string()),
            ..Default::default()
        };
        assert!(by_location.matches(&p));

        let missing_location = profile("Dev", UserRole::User, None, &[]);
        assert!(!by_location.matches(&missing_location));
    }

    #[test]
    fn test_blank_filter_matches_everything() {
        let p = profile("Meena", UserRole::User, None, &[]);
        let filter = DirectoryFilter {
            search: Some("   ".to_string()),
            role: None,
            location: Some(String::new()),
        };
        assert!(filter.matches(&p));
    }
}
