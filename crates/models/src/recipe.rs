use serde::{Deserialize, Serialize};

use crate::ingredient::Ingredient;
use crate::record::Schema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servings: Option<u32>,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub steps: Vec<String>,
}

impl Schema for Recipe {
    const COLLECTION: &'static str = "recipes";
    const LABEL: &'static str = "Recipe";
    const OPTIONAL_FIELDS: &'static [&'static str] = &["description", "servings"];

    fn name(&self) -> &str {
        &self.name
    }
}
