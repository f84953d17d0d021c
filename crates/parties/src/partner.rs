use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use armetix_core::{DomainError, DomainResult, Entity, PartnerId};

/// Partner kind: client (sales) or supplier (purchases).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PartnerKind {
    Client,
    Supplier,
}

/// Contact information for a partner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl ContactInfo {
    fn normalized(self) -> Self {
        fn clean(v: Option<String>) -> Option<String> {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        }
        Self {
            address: clean(self.address),
            phone: clean(self.phone),
            email: clean(self.email),
        }
    }
}

/// Business partner. Immutable once registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Partner {
    id: PartnerId,
    name: String,
    kind: PartnerKind,
    /// Identifiant Commun de l'Entreprise.
    ice: String,
    /// Identifiant Fiscal.
    if_number: Option<String>,
    contact: ContactInfo,
    created_at: DateTime<Utc>,
}

impl Partner {
    pub fn register(cmd: RegisterPartner) -> DomainResult<Self> {
        let name = cmd.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        let ice = cmd.ice.trim().to_string();
        if ice.is_empty() {
            return Err(DomainError::validation("ice cannot be empty"));
        }

        Ok(Self {
            id: cmd.partner_id,
            name,
            kind: cmd.kind,
            ice,
            if_number: cmd
                .if_number
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            contact: cmd.contact.unwrap_or_default().normalized(),
            created_at: cmd.occurred_at,
        })
    }

    pub fn id_typed(&self) -> PartnerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> PartnerKind {
        self.kind
    }

    pub fn ice(&self) -> &str {
        &self.ice
    }

    pub fn if_number(&self) -> Option<&str> {
        self.if_number.as_deref()
    }

    pub fn contact(&self) -> &ContactInfo {
        &self.contact
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Entity for Partner {
    type Id = PartnerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Command: RegisterPartner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterPartner {
    pub partner_id: PartnerId,
    pub name: String,
    pub kind: PartnerKind,
    pub ice: String,
    pub if_number: Option<String>,
    pub contact: Option<ContactInfo>,
    pub occurred_at: DateTime<Utc>,
}
