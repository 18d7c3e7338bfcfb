use serde::{Deserialize, Serialize};

use gasdepot_core::{DomainError, DomainResult, WarehouseId};

/// Catalog record: a storage location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warehouse {
    pub id: WarehouseId,
    pub name: String,
    pub address: String,
}

/// Input for creating or replacing a warehouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewWarehouse {
    pub name: String,
    pub address: String,
}

impl NewWarehouse {
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("warehouse name cannot be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_name_is_rejected() {
        let new = NewWarehouse {
            name: String::new(),
            address: "12 Tank St".to_string(),
        };
        assert!(new.validate().is_err());
    }

    #[test]
    fn address_may_be_empty() {
        let new = NewWarehouse {
            name: "North depot".to_string(),
            address: String::new(),
        };
        assert!(new.validate().is_ok());
    }
}
