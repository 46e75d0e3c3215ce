use serde::{Deserialize, Serialize};

use crate::domain::menu::entities::MenuId;

/// Sodium ceiling, in milligrams, sent with every question.
pub const SODIUM_LIMIT_MG: u32 = 600;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseMenuRequest {
    pub allergies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DietProfile {
    pub allergens: Vec<String>,
    pub diets: Vec<String>,
    pub sodium_limit: u32,
}

impl DietProfile {
    pub fn for_allergens(allergens: Vec<String>) -> Self {
        Self {
            allergens,
            diets: Vec::new(),
            sodium_limit: SODIUM_LIMIT_MG,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaRequest {
    pub menu_id: MenuId,
    pub question: String,
    pub profile: DietProfile,
}
