//! Partner ledger ("relevé") built by replaying a partner's invoices.
//!
//! The running balance is the invoiced obligation: sales add their TTC,
//! purchases subtract it. Payments are reported per line but do not move the
//! balance.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use armetix_core::money::{add, sub};
use armetix_core::{DomainResult, InvoiceId, PartnerId};
use armetix_invoicing::{Invoice, InvoiceStatus, InvoiceType};
use armetix_parties::Partner;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementLine {
    pub invoice_id: InvoiceId,
    pub date: DateTime<Utc>,
    pub invoice_type: InvoiceType,
    pub invoice_number: String,
    /// Unsigned invoice TTC.
    pub amount: Decimal,
    pub amount_paid: Decimal,
    pub amount_remaining: Decimal,
    pub status: InvoiceStatus,
    pub current_solde: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartnerStatement {
    pub partner: Partner,
    pub transactions: Vec<StatementLine>,
    pub total_solde: Decimal,
}

/// Replay the partner's invoices oldest first (ties broken by invoice number).
///
/// Invoices of other partners in `invoices` are ignored.
pub fn build_statement<'a>(
    partner: &Partner,
    invoices: impl IntoIterator<Item = &'a Invoice>,
) -> DomainResult<PartnerStatement> {
    let partner_id = partner.id_typed();
    let mut own: Vec<&Invoice> = invoices
        .into_iter()
        .filter(|inv| inv.partner_id() == partner_id)
        .collect();
    own.sort_by(|a, b| {
        a.date()
            .cmp(&b.date())
            .then_with(|| a.invoice_number().cmp(b.invoice_number()))
    });

    let mut solde = Decimal::ZERO;
    let transactions = own
        .into_iter()
        .map(|inv| -> DomainResult<StatementLine> {
            solde = add(solde, inv.signed_total())?;
            Ok(StatementLine {
                invoice_id: inv.id_typed(),
                date: inv.date(),
                invoice_type: inv.invoice_type(),
                invoice_number: inv.invoice_number().to_string(),
                amount: inv.total_ttc(),
                amount_paid: inv.amount_paid(),
                amount_remaining: inv.amount_remaining(),
                status: inv.status(),
                current_solde: solde,
            })
        })
        .collect::<DomainResult<Vec<_>>>()?;

    Ok(PartnerStatement {
        partner: partner.clone(),
        transactions,
        total_solde: solde,
    })
}

/// Headline figures for one partner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerStats {
    pub partner_id: PartnerId,
    pub invoice_count: usize,
    pub total_invoiced: Decimal,
    pub total_paid: Decimal,
    pub balance: Decimal,
}

pub fn partner_stats<'a>(
    partner_id: PartnerId,
    invoices: impl IntoIterator<Item = &'a Invoice>,
) -> DomainResult<PartnerStats> {
    let (invoice_count, total_invoiced, total_paid) = invoices
        .into_iter()
        .filter(|inv| inv.partner_id() == partner_id)
        .try_fold((0, Decimal::ZERO, Decimal::ZERO), |(n, ttc, paid), inv| {
            DomainResult::Ok((n + 1, add(ttc, inv.total_ttc())?, add(paid, inv.amount_paid())?))
        })?;

    Ok(PartnerStats {
        partner_id,
        invoice_count,
        total_invoiced,
        total_paid,
        balance: sub(total_invoiced, total_paid)?,
    })
}
