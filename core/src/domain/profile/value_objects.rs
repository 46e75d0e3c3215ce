use serde::{Deserialize, Serialize};

/// Partial profile: only the fields that are set are written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact_phone: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Sets one field by its column name.
    pub fn set(&mut self, field: &str, value: impl Into<String>) -> Result<(), String> {
        let value = Some(value.into());
        match field {
            "email" => self.email = value,
            "full_name" => self.full_name = value,
            "avatar_url" => self.avatar_url = value,
            "phone" => self.phone = value,
            "date_of_birth" => self.date_of_birth = value,
            "emergency_contact_name" => self.emergency_contact_name = value,
            "emergency_contact_phone" => self.emergency_contact_phone = value,
            other => return Err(format!("unknown profile field: {}", other)),
        }
        Ok(())
    }
}
