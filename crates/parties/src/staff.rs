use serde::{Deserialize, Serialize};

use gasdepot_core::{DomainError, DomainResult, StaffId};

/// A staff member who records orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staff {
    pub id: StaffId,
    pub name: String,
    pub phone: String,
}

/// Input for registering a staff member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStaff {
    pub name: String,
    pub phone: String,
}

impl NewStaff {
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("staff name cannot be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_name_is_rejected() {
        let new = NewStaff {
            name: String::new(),
            phone: "555-0102".to_string(),
        };
        assert!(new.validate().is_err());
    }
}
