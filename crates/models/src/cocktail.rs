use serde::{Deserialize, Serialize};

use crate::ingredient::Ingredient;
use crate::record::Schema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cocktail {
    pub name: String,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub instructions: Vec<String>,
}

impl Schema for Cocktail {
    const COLLECTION: &'static str = "cocktails";
    const LABEL: &'static str = "Cocktail";

    fn name(&self) -> &str {
        &self.name
    }
}
