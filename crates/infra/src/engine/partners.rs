use tracing::{debug, info};

use armetix_accounting::{PartnerStatement, PartnerStats, build_statement, partner_stats};
use armetix_core::{DomainError, PartnerId};
use armetix_parties::{Partner, RegisterPartner};

use crate::db::{StoreResult, Tables};
use crate::engine::Engine;

fn find(tables: &Tables, partner_id: PartnerId) -> StoreResult<&Partner> {
    tables
        .partners
        .get(&partner_id)
        .ok_or_else(|| DomainError::not_found(format!("partner {partner_id}")).into())
}

impl Engine {
    pub fn create_partner(&self, cmd: RegisterPartner) -> StoreResult<Partner> {
        let partner = Partner::register(cmd)?;

        let mut tx = self.db.begin()?;
        tx.insert(partner.clone());
        tx.commit()?;

        info!(
            partner_id = %partner.id_typed(),
            name = %partner.name(),
            kind = ?partner.kind(),
            "partner registered"
        );
        Ok(partner)
    }

    /// Oldest first.
    pub fn list_partners(&self) -> StoreResult<Vec<Partner>> {
        let tables = self.db.read()?;
        let mut partners: Vec<Partner> = tables.partners.values().cloned().collect();
        partners.sort_by_key(|p| (p.created_at(), p.id_typed()));
        Ok(partners)
    }

    pub fn get_partner(&self, partner_id: PartnerId) -> StoreResult<Partner> {
        let tables = self.db.read()?;
        find(&tables, partner_id).cloned()
    }

    /// Running-balance ledger of one partner.
    pub fn partner_statement(&self, partner_id: PartnerId) -> StoreResult<PartnerStatement> {
        let tables = self.db.read()?;
        let partner = find(&tables, partner_id)?;
        let statement = build_statement(partner, tables.invoices.values())?;
        debug!(
            partner_id = %partner_id,
            transactions = statement.transactions.len(),
            total_solde = %statement.total_solde,
            "statement built"
        );
        Ok(statement)
    }

    pub fn partner_stats(&self, partner_id: PartnerId) -> StoreResult<PartnerStats> {
        let tables = self.db.read()?;
        find(&tables, partner_id)?;
        Ok(partner_stats(partner_id, tables.invoices.values())?)
    }
}
