use serde::{Deserialize, Serialize};

/// The fixed set of roles offered on the login form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    PropertyManager,
    FinanceTeam,
    DataEngineer,
}

impl Role {
    /// All roles in the order the login form lists them.
    pub fn all() -> [Role; 4] {
        [
            Role::Admin,
            Role::PropertyManager,
            Role::FinanceTeam,
            Role::DataEngineer,
        ]
    }

    pub fn key(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::PropertyManager => "property_manager",
            Role::FinanceTeam => "finance_team",
            Role::DataEngineer => "data_engineer",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::PropertyManager => "Property Manager",
            Role::FinanceTeam => "Finance Team",
            Role::DataEngineer => "Data Engineer",
        }
    }

    /// Accepts either the form key (`finance_team`) or the display label (`Finance Team`).
    pub fn parse(s: &str) -> Option<Role> {
        let s = s.trim();
        Role::all()
            .into_iter()
            .find(|r| r.key() == s || r.label() == s)
    }
}
