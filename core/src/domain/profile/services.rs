use std::future::Future;

use serde_json::Value;
use tracing::instrument;
use uuid::Uuid;

use crate::domain::{
    authentication::ports::IdentityProvider,
    common::{entities::app_errors::CoreError, services::Service},
    profile::{
        entities::{USER_PROFILES_TABLE, UserProfile},
        value_objects::ProfileUpdate,
    },
    storage::{
        ports::RowStore,
        value_objects::{RowQuery, decode_row},
    },
};

#[cfg_attr(test, mockall::automock)]
pub trait ProfileService: Send + Sync {
    fn create_profile(
        &self,
        user_id: Uuid,
        profile: ProfileUpdate,
    ) -> impl Future<Output = Result<UserProfile, CoreError>> + Send;

    fn get_profile(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = Result<Option<UserProfile>, CoreError>> + Send;

    fn update_profile(
        &self,
        user_id: Uuid,
        updates: ProfileUpdate,
    ) -> impl Future<Output = Result<UserProfile, CoreError>> + Send;

    fn delete_profile(&self, user_id: Uuid) -> impl Future<Output = Result<(), CoreError>> + Send;
}

fn profile_row(user_id: Option<Uuid>, profile: &ProfileUpdate) -> Result<Value, CoreError> {
    let mut row = serde_json::to_value(profile).map_err(|e| CoreError::Invalid(e.to_string()))?;
    if let (Some(id), Some(fields)) = (user_id, row.as_object_mut()) {
        fields.insert("id".to_string(), Value::String(id.to_string()));
    }
    Ok(row)
}

impl<IP, RS> ProfileService for Service<IP, RS>
where
    IP: IdentityProvider,
    RS: RowStore,
{
    #[instrument(skip(self, profile))]
    async fn create_profile(
        &self,
        user_id: Uuid,
        profile: ProfileUpdate,
    ) -> Result<UserProfile, CoreError> {
        let row = profile_row(Some(user_id), &profile)?;
        let stored = self
            .row_store
            .insert_row(USER_PROFILES_TABLE.to_string(), row)
            .await?;

        tracing::info!(%user_id, "Profile created");
        decode_row(stored)
    }

    #[instrument(skip(self))]
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, CoreError> {
        self.row_store
            .get_row(RowQuery::table(USER_PROFILES_TABLE).eq("id", user_id))
            .await?
            .map(decode_row)
            .transpose()
    }

    #[instrument(skip(self, updates))]
    async fn update_profile(
        &self,
        user_id: Uuid,
        updates: ProfileUpdate,
    ) -> Result<UserProfile, CoreError> {
        if updates.is_empty() {
            return Err(CoreError::Invalid("no profile fields to update".to_string()));
        }

        let rows = self
            .row_store
            .update_rows(
                RowQuery::table(USER_PROFILES_TABLE).eq("id", user_id),
                profile_row(None, &updates)?,
            )
            .await?;

        rows.into_iter()
            .next()
            .ok_or(CoreError::NotFound)
            .and_then(decode_row)
    }

    #[instrument(skip(self))]
    async fn delete_profile(&self, user_id: Uuid) -> Result<(), CoreError> {
        self.row_store
            .delete_rows(RowQuery::table(USER_PROFILES_TABLE).eq("id", user_id))
            .await?;

        tracing::info!(%user_id, "Profile deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        authentication::ports::MockIdentityProvider, storage::ports::MockRowStore,
    };
    use serde_json::json;

    const USER: &str = "0199a8c0-0000-7000-8000-0000000000aa";

    fn profile_json(full_name: &str) -> Value {
        json!({
            "id": USER,
            "email": "sam@example.com",
            "full_name": full_name,
            "avatar_url": null,
            "phone": null,
            "date_of_birth": null,
            "emergency_contact_name": null,
            "emergency_contact_phone": null,
            "created_at": "2025-03-01T12:00:00Z",
            "updated_at": "2025-03-02T08:30:00Z"
        })
    }

    #[tokio::test]
    async fn test_create_profile_inserts_user_id() {
        let mut store = MockRowStore::new();
        store
            .expect_insert_row()
            .withf(|table, row| {
                table == USER_PROFILES_TABLE && row["id"] == USER && row["email"] == "sam@example.com"
            })
            .returning(|_, _| Box::pin(async { Ok(profile_json("Sam")) }));

        let service = Service::new(MockIdentityProvider::new(), store);
        let profile = service
            .create_profile(
                USER.parse().unwrap(),
                ProfileUpdate {
                    email: Some("sam@example.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(profile.full_name.as_deref(), Some("Sam"));
    }

    #[tokio::test]
    async fn test_get_profile_missing_row_is_none() {
        let mut store = MockRowStore::new();
        store
            .expect_get_row()
            .returning(|_| Box::pin(async { Ok(None) }));

        let service = Service::new(MockIdentityProvider::new(), store);
        assert_eq!(service.get_profile(USER.parse().unwrap()).await, Ok(None));
    }

    #[tokio::test]
    async fn test_update_profile_returns_updated_row() {
        let mut store = MockRowStore::new();
        store
            .expect_update_rows()
            .withf(|query, changes| {
                query.table == USER_PROFILES_TABLE
                    && changes == &json!({"full_name": "Sam Rivera"})
            })
            .returning(|_, _| Box::pin(async { Ok(vec![profile_json("Sam Rivera")]) }));

        let service = Service::new(MockIdentityProvider::new(), store);
        let profile = service
            .update_profile(
                USER.parse().unwrap(),
                ProfileUpdate {
                    full_name: Some("Sam Rivera".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(profile.full_name.as_deref(), Some("Sam Rivera"));
    }

    #[tokio::test]
    async fn test_empty_update_is_rejected_locally() {
        let mut store = MockRowStore::new();
        store.expect_update_rows().never();

        let service = Service::new(MockIdentityProvider::new(), store);
        let result = service
            .update_profile(USER.parse().unwrap(), ProfileUpdate::default())
            .await;
        assert!(matches!(result, Err(CoreError::Invalid(_))));
    }
}
