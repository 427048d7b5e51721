use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Quantity>,
}

impl Ingredient {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), quantity: None }
    }

    pub fn with_quantity(mut self, quantity: impl Into<String>, unit: Option<&str>) -> Self {
        self.quantity = Some(Quantity { quantity: Some(quantity.into()), unit: unit.map(str::to_string) });
        self
    }
}
