use serde::{Deserialize, Serialize};

use gasdepot_core::{CustomerId, DomainError, DomainResult};

/// A customer orders are placed for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub phone: String,
    pub address: String,
}

/// Input for registering a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub phone: String,
    pub address: String,
}

impl NewCustomer {
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("customer name cannot be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_name_is_rejected() {
        let new = NewCustomer {
            name: " ".to_string(),
            phone: "555-0101".to_string(),
            address: String::new(),
        };
        assert!(new.validate().is_err());
    }
}
