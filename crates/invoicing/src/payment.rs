use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use armetix_core::{DomainError, DomainResult, Entity, InvoiceId, PaymentId};

use crate::invoice::Invoice;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[default]
    #[serde(rename = "Espèces")]
    Cash,
    #[serde(rename = "Virement")]
    Transfer,
    #[serde(rename = "Chèque")]
    Cheque,
    #[serde(rename = "Carte")]
    Card,
    #[serde(rename = "Effet")]
    BillOfExchange,
}

/// Receipt number: `REG-{year}-{seq:04}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PaymentNumber {
    pub year: i32,
    pub seq: u32,
}

impl fmt::Display for PaymentNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "REG-{}-{:04}", self.year, self.seq)
    }
}

impl Serialize for PaymentNumber {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PaymentNumber {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl std::str::FromStr for PaymentNumber {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || DomainError::validation(format!("malformed payment number {s:?}"));
        let rest = s.strip_prefix("REG-").ok_or_else(bad)?;
        let (year, seq) = rest.split_once('-').ok_or_else(bad)?;
        Ok(Self {
            year: year.parse().map_err(|_| bad())?,
            seq: seq.parse().map_err(|_| bad())?,
        })
    }
}

/// Per-year receipt counter. Each calendar year restarts at 0001.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSequence {
    last: BTreeMap<i32, u32>,
}

impl PaymentSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number the next payment of `year` would get, without consuming it.
    pub fn peek_next(&self, year: i32) -> PaymentNumber {
        PaymentNumber {
            year,
            seq: self.last.get(&year).copied().unwrap_or(0) + 1,
        }
    }

    /// Consume and return the next number for `year`.
    pub fn advance(&mut self, year: i32) -> PaymentNumber {
        let next = self.peek_next(year);
        self.last.insert(year, next.seq);
        next
    }

    pub fn last_issued(&self, year: i32) -> Option<u32> {
        self.last.get(&year).copied()
    }
}

/// Command: RecordPayment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPayment {
    pub payment_id: PaymentId,
    pub invoice_id: InvoiceId,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub note: Option<String>,
    pub date: DateTime<Utc>,
}

/// Settlement recorded against one invoice. Never modified or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Payment {
    id: PaymentId,
    payment_number: PaymentNumber,
    invoice_id: InvoiceId,
    amount: Decimal,
    date: DateTime<Utc>,
    method: PaymentMethod,
    note: Option<String>,
}

impl Payment {
    /// Apply `cmd` to `invoice` and number the receipt.
    ///
    /// The sequence is only advanced once the invoice accepted the amount, so
    /// rejected payments never burn a number.
    pub fn settle(
        cmd: RecordPayment,
        invoice: &mut Invoice,
        sequence: &mut PaymentSequence,
    ) -> DomainResult<Self> {
        if invoice.id_typed() != cmd.invoice_id {
            return Err(DomainError::consistency(format!(
                "payment targets invoice {} but {} was loaded",
                cmd.invoice_id,
                invoice.id_typed()
            )));
        }

        invoice.register_payment(cmd.amount)?;
        let payment_number = sequence.advance(cmd.date.year());

        Ok(Self {
            id: cmd.payment_id,
            payment_number,
            invoice_id: cmd.invoice_id,
            amount: cmd.amount,
            date: cmd.date,
            method: cmd.method,
            note: cmd
                .note
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
        })
    }

    pub fn id_typed(&self) -> PaymentId {
        self.id
    }

    pub fn payment_number(&self) -> PaymentNumber {
        self.payment_number
    }

    pub fn invoice_id(&self) -> InvoiceId {
        self.invoice_id
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn method(&self) -> PaymentMethod {
        self.method
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }
}

impl Entity for Payment {
    type Id = PaymentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    use armetix_core::{PartnerId, ProductId};

    use crate::invoice::{InvoiceLineInput, InvoiceStatus, InvoiceType, IssueInvoice};

    fn invoice_of(price_ht: Decimal) -> Invoice {
        Invoice::issue(IssueInvoice {
            invoice_id: InvoiceId::new(),
            invoice_number: "FA-001".to_string(),
            invoice_type: InvoiceType::Sale,
            partner_id: PartnerId::new(),
            lines: vec![InvoiceLineInput {
                product_id: Some(ProductId::new()),
                quantity: 2,
                price_ht,
                tva_rate: 20,
            }],
            date: Utc::now(),
        })
        .unwrap()
    }

    fn pay(invoice: &Invoice, amount: Decimal, year: i32) -> RecordPayment {
        RecordPayment {
            payment_id: PaymentId::new(),
            invoice_id: invoice.id_typed(),
            amount,
            method: PaymentMethod::Transfer,
            note: Some("  ".to_string()),
            date: Utc.with_ymd_and_hms(year, 3, 15, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn payment_number_is_zero_padded() {
        let number = PaymentNumber { year: 2024, seq: 7 };
        assert_eq!(number.to_string(), "REG-2024-0007");
        assert_eq!("REG-2024-0007".parse::<PaymentNumber>().unwrap(), number);
        assert!("FA-2024-0007".parse::<PaymentNumber>().is_err());
    }

    #[test]
    fn sequence_restarts_each_year() {
        let mut seq = PaymentSequence::new();
        assert_eq!(seq.advance(2024).to_string(), "REG-2024-0001");
        assert_eq!(seq.advance(2024).to_string(), "REG-2024-0002");
        assert_eq!(seq.advance(2025).to_string(), "REG-2025-0001");
        assert_eq!(seq.peek_next(2024).to_string(), "REG-2024-0003");
    }

    #[test]
    fn settle_updates_invoice_and_numbers_receipt() {
        let mut invoice = invoice_of(dec!(100));
        let mut seq = PaymentSequence::new();

        let payment = Payment::settle(pay(&invoice, dec!(100), 2024), &mut invoice, &mut seq).unwrap();
        assert_eq!(payment.payment_number().to_string(), "REG-2024-0001");
        assert_eq!(payment.note(), None);
        assert_eq!(invoice.status(), InvoiceStatus::Partial);
        assert_eq!(invoice.amount_remaining(), dec!(140));
    }

    #[test]
    fn rejected_payment_does_not_burn_a_number() {
        let mut invoice = invoice_of(dec!(100));
        let mut seq = PaymentSequence::new();

        let err = Payment::settle(pay(&invoice, dec!(500), 2024), &mut invoice, &mut seq).unwrap_err();
        assert!(matches!(err, DomainError::Overpayment { .. }));
        assert_eq!(seq.last_issued(2024), None);
        assert_eq!(invoice.amount_paid(), Decimal::ZERO);
    }

    #[test]
    fn method_uses_french_labels() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Cheque).unwrap(),
            "\"Chèque\""
        );
        let parsed: PaymentMethod = serde_json::from_str("\"Effet\"").unwrap();
        assert_eq!(parsed, PaymentMethod::BillOfExchange);
        assert_eq!(PaymentMethod::default(), PaymentMethod::Cash);
    }
}
