//! Profile service: sign-up profile, self edits and the user directory

use std::sync::Arc;

use serde::Deserialize;
use shared::{validate_full_name, DirectoryFilter, Profile, UserRole};
use uuid::Uuid;

use super::check;
use crate::error::{AppError, AppResult};
use crate::realtime::{ChangeEvent, ChangeFeed, ChangeKind, Table};
use crate::store::{NewProfile, ProfileChanges, Store};

/// Profile service
#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn Store>,
    changes: ChangeFeed,
}

/// Input for creating the caller's profile
#[derive(Debug, Deserialize)]
pub struct CreateProfileInput {
    pub full_name: String,
    pub role: String,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    #[serde(default)]
    pub crop_types: Vec<String>,
    pub business_type: Option<String>,
}

/// Input for editing the caller's profile; role cannot change
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileInput {
    pub full_name: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub crop_types: Option<Vec<String>>,
    pub business_type: Option<String>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn Store>, changes: ChangeFeed) -> Self {
        Self { store, changes }
    }

    /// Create the profile for a freshly signed-up user
    pub async fn create_profile(&self, user_id: Uuid, input: CreateProfileInput) -> AppResult<Profile> {
        check("full_name", validate_full_name(&input.full_name))?;
        let role: UserRole = input
            .role
            .parse()
            .map_err(|e: String| AppError::validation("role", e))?;

        let profile = self
            .store
            .insert_profile(NewProfile {
                id: user_id,
                full_name: input.full_name.trim().to_string(),
                role,
                location: clean(input.location),
                phone: clean(input.phone),
                bio: clean(input.bio),
                crop_types: clean_crops(input.crop_types),
                business_type: clean(input.business_type),
            })
            .await?;

        tracing::info!(user_id = %user_id, role = %role, "profile created");
        self.changes
            .publish(ChangeEvent::new(Table::Profiles, ChangeKind::Insert, profile.id));

        Ok(profile)
    }

    pub async fn get_profile(&self, id: Uuid) -> AppResult<Profile> {
        self.store
            .get_profile(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Profile".to_string()))
    }

    /// Apply the owner's edits
    pub async fn update_profile(&self, user_id: Uuid, input: UpdateProfileInput) -> AppResult<Profile> {
        if let Some(name) = &input.full_name {
            check("full_name", validate_full_name(name))?;
        }

        let changes = ProfileChanges {
            full_name: input.full_name.map(|n| n.trim().to_string()),
            location: edit(input.location),
            phone: edit(input.phone),
            bio: edit(input.bio),
            crop_types: input.crop_types.map(clean_crops),
            business_type: edit(input.business_type),
        };

        let profile = self
            .store
            .update_profile(user_id, changes)
            .await?
            .ok_or_else(|| AppError::NotFound("Profile".to_string()))?;

        self.changes
            .publish(ChangeEvent::new(Table::Profiles, ChangeKind::Update, profile.id));

        Ok(profile)
    }

    /// Everyone except the viewer, by name, narrowed by the filter
    pub async fn directory(&self, viewer_id: Uuid, filter: &DirectoryFilter) -> AppResult<Vec<Profile>> {
        let profiles = self.store.list_profiles().await?;
        Ok(profiles
            .into_iter()
            .filter(|p| p.id != viewer_id && filter.matches(p))
            .collect())
    }
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// A submitted field; blank clears it
fn edit(value: Option<String>) -> Option<Option<String>> {
    value.map(|v| clean(Some(v)))
}

fn clean_crops(crops: Vec<String>) -> Vec<String> {
    crops
        .into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect()
}
