use std::future::Future;

use serde_json::Value;
use tracing::instrument;
use uuid::Uuid;

use crate::domain::{
    allergy::{
        entities::{
            ALLERGY_CATEGORIES_TABLE, AllergyCategory, CUSTOM_ALLERGIES_TABLE, CustomAllergy,
            Severity, USER_ALLERGIES_TABLE, UserAllergy,
        },
        value_objects::{CustomAllergyUpdate, NewCustomAllergy, NewUserAllergy, UserAllergyUpdate},
    },
    authentication::ports::IdentityProvider,
    common::{entities::app_errors::CoreError, services::Service},
    storage::{
        ports::RowStore,
        value_objects::{RowQuery, SortDirection, decode_row, decode_rows},
    },
};

const USER_ALLERGY_COLUMNS: &str = "*,allergy_categories(id,name,description,icon)";

/// Saved allergy records: canonical categories, the user's picks among
/// them, and free-form custom allergies.
#[cfg_attr(test, mockall::automock)]
pub trait AllergyRecordService: Send + Sync {
    fn get_categories(
        &self,
    ) -> impl Future<Output = Result<Vec<AllergyCategory>, CoreError>> + Send;

    fn get_user_allergies(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = Result<Vec<UserAllergy>, CoreError>> + Send;

    fn add_user_allergy(
        &self,
        user_id: Uuid,
        allergy_category_id: Uuid,
        severity: Option<Severity>,
        notes: Option<String>,
    ) -> impl Future<Output = Result<UserAllergy, CoreError>> + Send;

    fn update_user_allergy(
        &self,
        allergy_id: Uuid,
        updates: UserAllergyUpdate,
    ) -> impl Future<Output = Result<UserAllergy, CoreError>> + Send;

    fn remove_user_allergy(
        &self,
        allergy_id: Uuid,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn add_custom_allergy(
        &self,
        user_id: Uuid,
        name: String,
        description: Option<String>,
        severity: Option<Severity>,
    ) -> impl Future<Output = Result<CustomAllergy, CoreError>> + Send;

    fn get_custom_allergies(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = Result<Vec<CustomAllergy>, CoreError>> + Send;

    fn update_custom_allergy(
        &self,
        allergy_id: Uuid,
        updates: CustomAllergyUpdate,
    ) -> impl Future<Output = Result<CustomAllergy, CoreError>> + Send;

    fn remove_custom_allergy(
        &self,
        allergy_id: Uuid,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;
}

fn to_row<T: serde::Serialize>(value: &T) -> Result<Value, CoreError> {
    serde_json::to_value(value).map_err(|e| CoreError::Invalid(e.to_string()))
}

/// `.single()` semantics: exactly one updated row or not found.
fn single<T: serde::de::DeserializeOwned>(rows: Vec<Value>) -> Result<T, CoreError> {
    rows.into_iter()
        .next()
        .ok_or(CoreError::NotFound)
        .and_then(decode_row)
}

impl<IP, RS> AllergyRecordService for Service<IP, RS>
where
    IP: IdentityProvider,
    RS: RowStore,
{
    #[instrument(skip(self))]
    async fn get_categories(&self) -> Result<Vec<AllergyCategory>, CoreError> {
        let rows = self
            .row_store
            .select_rows(RowQuery::table(ALLERGY_CATEGORIES_TABLE).order("name", SortDirection::Asc))
            .await?;

        decode_rows(rows)
    }

    #[instrument(skip(self))]
    async fn get_user_allergies(&self, user_id: Uuid) -> Result<Vec<UserAllergy>, CoreError> {
        let query = RowQuery::table(USER_ALLERGIES_TABLE)
            .select(USER_ALLERGY_COLUMNS)
            .eq("user_id", user_id)
            .eq("is_active", true);

        decode_rows(self.row_store.select_rows(query).await?)
    }

    #[instrument(skip(self, notes))]
    async fn add_user_allergy(
        &self,
        user_id: Uuid,
        allergy_category_id: Uuid,
        severity: Option<Severity>,
        notes: Option<String>,
    ) -> Result<UserAllergy, CoreError> {
        let row = to_row(&NewUserAllergy {
            user_id,
            allergy_category_id,
            severity: severity.unwrap_or_default(),
            notes,
        })?;

        let stored = self
            .row_store
            .insert_row(USER_ALLERGIES_TABLE.to_string(), row)
            .await?;

        tracing::info!(%user_id, %allergy_category_id, "User allergy added");
        decode_row(stored)
    }

    #[instrument(skip(self, updates))]
    async fn update_user_allergy(
        &self,
        allergy_id: Uuid,
        updates: UserAllergyUpdate,
    ) -> Result<UserAllergy, CoreError> {
        let rows = self
            .row_store
            .update_rows(
                RowQuery::table(USER_ALLERGIES_TABLE).eq("id", allergy_id),
                to_row(&updates)?,
            )
            .await?;

        single(rows)
    }

    #[instrument(skip(self))]
    async fn remove_user_allergy(&self, allergy_id: Uuid) -> Result<(), CoreError> {
        self.row_store
            .delete_rows(RowQuery::table(USER_ALLERGIES_TABLE).eq("id", allergy_id))
            .await
    }

    #[instrument(skip(self, description))]
    async fn add_custom_allergy(
        &self,
        user_id: Uuid,
        name: String,
        description: Option<String>,
        severity: Option<Severity>,
    ) -> Result<CustomAllergy, CoreError> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(CoreError::Invalid("allergy name cannot be empty".to_string()));
        }

        let row = to_row(&NewCustomAllergy {
            user_id,
            name,
            description,
            severity: severity.unwrap_or_default(),
        })?;

        let stored = self
            .row_store
            .insert_row(CUSTOM_ALLERGIES_TABLE.to_string(), row)
            .await?;

        decode_row(stored)
    }

    #[instrument(skip(self))]
    async fn get_custom_allergies(&self, user_id: Uuid) -> Result<Vec<CustomAllergy>, CoreError> {
        let query = RowQuery::table(CUSTOM_ALLERGIES_TABLE)
            .eq("user_id", user_id)
            .eq("is_active", true);

        decode_rows(self.row_store.select_rows(query).await?)
    }

    #[instrument(skip(self, updates))]
    async fn update_custom_allergy(
        &self,
        allergy_id: Uuid,
        updates: CustomAllergyUpdate,
    ) -> Result<CustomAllergy, CoreError> {
        let rows = self
            .row_store
            .update_rows(
                RowQuery::table(CUSTOM_ALLERGIES_TABLE).eq("id", allergy_id),
                to_row(&updates)?,
            )
            .await?;

        single(rows)
    }

    #[instrument(skip(self))]
    async fn remove_custom_allergy(&self, allergy_id: Uuid) -> Result<(), CoreError> {
        self.row_store
            .delete_rows(RowQuery::table(CUSTOM_ALLERGIES_TABLE).eq("id", allergy_id))
            .await
    }
}
