use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use armetix_core::money::{self, extend, is_settled, percent_of};
use armetix_core::{DomainError, DomainResult, Entity, InvoiceId, PartnerId, ProductId};
use armetix_products::TvaRate;

/// Invoice direction. Drives stock movement and ledger sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InvoiceType {
    Sale,
    Purchase,
}

impl InvoiceType {
    /// Stock delta applied per unit when an invoice of this type is created.
    pub fn stock_sign(self) -> i64 {
        match self {
            InvoiceType::Sale => -1,
            InvoiceType::Purchase => 1,
        }
    }

    /// Sign of the invoice amount in a partner ledger (positive = partner owes us).
    pub fn ledger_sign(self) -> Decimal {
        match self {
            InvoiceType::Sale => Decimal::ONE,
            InvoiceType::Purchase => Decimal::NEGATIVE_ONE,
        }
    }
}

/// Settlement status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvoiceStatus {
    #[serde(rename = "Non Payée")]
    Unpaid,
    #[serde(rename = "Partielle")]
    Partial,
    #[serde(rename = "Payée")]
    Paid,
}

impl InvoiceStatus {
    pub fn label(self) -> &'static str {
        match self {
            InvoiceStatus::Unpaid => "Non Payée",
            InvoiceStatus::Partial => "Partielle",
            InvoiceStatus::Paid => "Payée",
        }
    }
}

/// Validated invoice line. The product reference is a strict foreign key.
///
/// Line amounts are priced once, when the line is validated, so reading them
/// back can never overflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceItem {
    pub product_id: ProductId,
    pub quantity: i64,
    pub price_ht: Decimal,
    pub tva_rate: TvaRate,
    line_ht: Decimal,
    line_tva: Decimal,
    line_ttc: Decimal,
}

impl InvoiceItem {
    fn priced(
        product_id: ProductId,
        quantity: i64,
        price_ht: Decimal,
        tva_rate: TvaRate,
    ) -> DomainResult<Self> {
        let line_ht = extend(price_ht, quantity)?;
        let line_tva = percent_of(line_ht, tva_rate.percent())?;
        let line_ttc = money::add(line_ht, line_tva)?;
        Ok(Self {
            product_id,
            quantity,
            price_ht,
            tva_rate,
            line_ht,
            line_tva,
            line_ttc,
        })
    }

    /// The same line priced from scratch.
    fn repriced(&self) -> DomainResult<Self> {
        Self::priced(self.product_id, self.quantity, self.price_ht, self.tva_rate)
    }

    pub fn line_ht(&self) -> Decimal {
        self.line_ht
    }

    pub fn line_tva(&self) -> Decimal {
        self.line_tva
    }

    pub fn line_ttc(&self) -> Decimal {
        self.line_ttc
    }
}

/// Raw invoice line as submitted by a caller, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLineInput {
    pub product_id: Option<ProductId>,
    pub quantity: i64,
    pub price_ht: Decimal,
    pub tva_rate: u32,
}

impl InvoiceLineInput {
    fn validate(&self, line_no: usize) -> DomainResult<InvoiceItem> {
        let at_line = |err: DomainError| match err {
            DomainError::Validation(msg) => DomainError::validation(format!("line {line_no}: {msg}")),
            other => other,
        };
        let product_id = self.product_id.ok_or_else(|| {
            DomainError::validation(format!("line {line_no}: product is required"))
        })?;
        if self.quantity <= 0 {
            return Err(DomainError::validation(format!(
                "line {line_no}: quantity must be positive"
            )));
        }
        if self.price_ht.is_sign_negative() {
            return Err(DomainError::validation(format!(
                "line {line_no}: price_ht cannot be negative"
            )));
        }
        let tva_rate = TvaRate::try_from(self.tva_rate).map_err(at_line)?;

        InvoiceItem::priced(product_id, self.quantity, self.price_ht, tva_rate).map_err(at_line)
    }
}

/// HT / TVA / TTC totals of a set of lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub total_ht: Decimal,
    pub total_tva: Decimal,
    pub total_ttc: Decimal,
}

impl InvoiceTotals {
    /// Fails with a Validation error when a total leaves the `Decimal` range.
    pub fn compute(items: &[InvoiceItem]) -> DomainResult<Self> {
        let total_ht = money::sum(items.iter().map(InvoiceItem::line_ht))?;
        let total_tva = money::sum(items.iter().map(InvoiceItem::line_tva))?;
        Ok(Self {
            total_ht,
            total_tva,
            total_ttc: money::add(total_ht, total_tva)?,
        })
    }
}

/// Command: IssueInvoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueInvoice {
    pub invoice_id: InvoiceId,
    pub invoice_number: String,
    pub invoice_type: InvoiceType,
    pub partner_id: PartnerId,
    pub lines: Vec<InvoiceLineInput>,
    pub date: DateTime<Utc>,
}

/// Sale or purchase invoice with its settlement state.
///
/// `amount_paid`, `amount_remaining` and `status` only move through
/// [`Invoice::register_payment`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invoice {
    id: InvoiceId,
    invoice_number: String,
    date: DateTime<Utc>,
    invoice_type: InvoiceType,
    partner_id: PartnerId,
    items: Vec<InvoiceItem>,
    totals: InvoiceTotals,
    status: InvoiceStatus,
    amount_paid: Decimal,
    amount_remaining: Decimal,
}

impl Invoice {
    /// Validate lines, compute totals and open the invoice unpaid.
    pub fn issue(cmd: IssueInvoice) -> DomainResult<Self> {
        let invoice_number = cmd.invoice_number.trim().to_string();
        if invoice_number.is_empty() {
            return Err(DomainError::validation("invoice_number cannot be empty"));
        }
        if cmd.lines.is_empty() {
            return Err(DomainError::validation("cannot issue invoice without lines"));
        }

        let items = cmd
            .lines
            .iter()
            .enumerate()
            .map(|(idx, line)| line.validate(idx + 1))
            .collect::<DomainResult<Vec<_>>>()?;
        let totals = InvoiceTotals::compute(&items).map_err(|_| {
            DomainError::validation(format!(
                "invoice {invoice_number}: totals exceed the supported range"
            ))
        })?;

        Ok(Self {
            id: cmd.invoice_id,
            invoice_number,
            date: cmd.date,
            invoice_type: cmd.invoice_type,
            partner_id: cmd.partner_id,
            items,
            totals,
            status: InvoiceStatus::Unpaid,
            amount_paid: Decimal::ZERO,
            amount_remaining: totals.total_ttc,
        })
    }

    pub fn id_typed(&self) -> InvoiceId {
        self.id
    }

    pub fn invoice_number(&self) -> &str {
        &self.invoice_number
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn invoice_type(&self) -> InvoiceType {
        self.invoice_type
    }

    pub fn partner_id(&self) -> PartnerId {
        self.partner_id
    }

    pub fn items(&self) -> &[InvoiceItem] {
        &self.items
    }

    pub fn totals(&self) -> InvoiceTotals {
        self.totals
    }

    pub fn total_ht(&self) -> Decimal {
        self.totals.total_ht
    }

    pub fn total_tva(&self) -> Decimal {
        self.totals.total_tva
    }

    pub fn total_ttc(&self) -> Decimal {
        self.totals.total_ttc
    }

    pub fn status(&self) -> InvoiceStatus {
        self.status
    }

    pub fn amount_paid(&self) -> Decimal {
        self.amount_paid
    }

    pub fn amount_remaining(&self) -> Decimal {
        self.amount_remaining
    }

    /// Invoice TTC with its ledger sign (SALE +, PURCHASE −).
    pub fn signed_total(&self) -> Decimal {
        self.invoice_type.ledger_sign() * self.totals.total_ttc
    }

    /// Stock deltas applied when this invoice is created, one per line.
    pub fn stock_deltas(&self) -> Vec<(ProductId, i64)> {
        let sign = self.invoice_type.stock_sign();
        self.items
            .iter()
            .map(|item| (item.product_id, sign * item.quantity))
            .collect()
    }

    /// Exact inverse of [`Invoice::stock_deltas`], applied on deletion.
    pub fn reversal_deltas(&self) -> Vec<(ProductId, i64)> {
        self.stock_deltas()
            .into_iter()
            .map(|(product_id, delta)| (product_id, -delta))
            .collect()
    }

    /// Whether `amount` could be applied without changing anything.
    pub fn check_payment(&self, amount: Decimal) -> DomainResult<()> {
        if amount <= Decimal::ZERO {
            return Err(DomainError::validation("payment amount must be positive"));
        }
        if amount > self.amount_remaining {
            return Err(DomainError::overpayment(amount, self.amount_remaining));
        }
        Ok(())
    }

    /// Apply a settlement and recompute balance and status.
    ///
    /// All-or-nothing: on error the invoice is untouched.
    pub fn register_payment(&mut self, amount: Decimal) -> DomainResult<()> {
        self.check_payment(amount)?;

        self.amount_paid += amount;
        self.amount_remaining = self.totals.total_ttc - self.amount_paid;

        if is_settled(self.amount_remaining) {
            self.status = InvoiceStatus::Paid;
            self.amount_remaining = Decimal::ZERO;
        } else if self.amount_paid > Decimal::ZERO {
            self.status = InvoiceStatus::Partial;
        }
        Ok(())
    }

    /// Re-derive every stored figure and fail if any does not reconcile.
    pub fn check_consistency(&self) -> DomainResult<()> {
        let mismatch = || {
            DomainError::consistency(format!(
                "invoice {}: totals do not match lines",
                self.invoice_number
            ))
        };
        for item in &self.items {
            if item.repriced().map_err(|_| mismatch())? != *item {
                return Err(mismatch());
            }
        }
        let recomputed = InvoiceTotals::compute(&self.items).map_err(|_| mismatch())?;
        if recomputed != self.totals {
            return Err(mismatch());
        }
        if self.totals.total_ht.checked_add(self.totals.total_tva) != Some(self.totals.total_ttc) {
            return Err(DomainError::consistency(format!(
                "invoice {}: TTC != HT + TVA",
                self.invoice_number
            )));
        }
        if self.amount_paid.is_sign_negative() || self.amount_paid > self.totals.total_ttc {
            return Err(DomainError::consistency(format!(
                "invoice {}: amount paid out of range",
                self.invoice_number
            )));
        }

        let expected = (self.totals.total_ttc - self.amount_paid).max(Decimal::ZERO);
        let clamped = self.status == InvoiceStatus::Paid
            && self.amount_remaining.is_zero()
            && is_settled(expected);
        if self.amount_remaining != expected && !clamped {
            return Err(DomainError::consistency(format!(
                "invoice {}: remaining {} != TTC - paid {}",
                self.invoice_number, self.amount_remaining, expected
            )));
        }

        let status_ok = match self.status {
            InvoiceStatus::Paid => self.amount_remaining.is_zero(),
            InvoiceStatus::Partial => self.amount_paid > Decimal::ZERO,
            InvoiceStatus::Unpaid => self.amount_paid.is_zero(),
        };
        if !status_ok {
            return Err(DomainError::consistency(format!(
                "invoice {}: status {} does not match balance",
                self.invoice_number,
                self.status.label()
            )));
        }
        Ok(())
    }
}

#[cfg(any(test, feature = "testing"))]
impl Invoice {
    /// Overwrite the outstanding balance without reconciling it, so callers
    /// can exercise the consistency guards downstream.
    pub fn with_unchecked_remaining(mut self, amount_remaining: Decimal) -> Self {
        self.amount_remaining = amount_remaining;
        self
    }
}

impl Entity for Invoice {
    type Id = InvoiceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
