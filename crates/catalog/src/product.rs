use core::str::FromStr;

use serde::{Deserialize, Serialize};

use gasdepot_core::{DomainError, DomainResult, ProductId};

/// Product category tag.
///
/// Only cylinders follow the deposit/exchange model: selling a full one
/// returns an empty one to stock accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    Cylinder,
    Accessory,
    Stove,
}

impl ProductKind {
    /// Whether a sale of this kind swaps a full unit for an empty one.
    pub fn exchanges_empties(self) -> bool {
        matches!(self, ProductKind::Cylinder)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProductKind::Cylinder => "cylinder",
            ProductKind::Accessory => "accessory",
            ProductKind::Stove => "stove",
        }
    }
}

impl FromStr for ProductKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cylinder" => Ok(ProductKind::Cylinder),
            "accessory" => Ok(ProductKind::Accessory),
            "stove" => Ok(ProductKind::Stove),
            other => Err(DomainError::validation(format!(
                "kind must be one of: cylinder, accessory, stove (got '{other}')"
            ))),
        }
    }
}

/// Catalog record: a sellable product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub kind: ProductKind,
}

/// Input for creating or replacing a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub kind: ProductKind,
}

impl NewProduct {
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }
        Ok(())
    }
}
