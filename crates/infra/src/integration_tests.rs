//! Integration tests for the settlement engine.
//!
//! Drives `Engine` end to end (store, units of work, read models) and checks:
//! - stock moves with invoice lifecycle and is restored on delete
//! - failed units of work leave no trace
//! - payments settle invoices without double crediting, even concurrently

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use chrono::{DateTime, TimeZone, Utc};
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use armetix_accounting::{CreateExpense, ExpenseCategory, ExpensePaymentMethod, UpdateExpense};
    use armetix_core::{DomainError, ExpenseId, InvoiceId, PartnerId, PaymentId, ProductId};
    use armetix_invoicing::{
        InvoiceLineInput, InvoiceStatus, InvoiceType, IssueInvoice, PaymentMethod, RecordPayment,
    };
    use armetix_parties::{PartnerKind, RegisterPartner};
    use armetix_products::CreateProduct;

    use crate::db::StoreError;
    use crate::engine::Engine;

    fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 10, 0, 0).unwrap()
    }

    fn add_product(engine: &Engine, reference: &str, price_ht: Decimal, stock: i64) -> ProductId {
        engine
            .create_product(CreateProduct {
                product_id: ProductId::new(),
                reference: reference.to_string(),
                designation: format!("Article {reference}"),
                price_ht,
                tva_rate: 20,
                stock_quantity: stock,
                category: None,
                occurred_at: Utc::now(),
            })
            .unwrap()
            .id_typed()
    }

    fn add_partner(engine: &Engine, name: &str, kind: PartnerKind) -> PartnerId {
        engine
            .create_partner(RegisterPartner {
                partner_id: PartnerId::new(),
                name: name.to_string(),
                kind,
                ice: "001122334000055".to_string(),
                if_number: None,
                contact: None,
                occurred_at: Utc::now(),
            })
            .unwrap()
            .id_typed()
    }

    fn line(product_id: ProductId, quantity: i64, price_ht: Decimal) -> InvoiceLineInput {
        InvoiceLineInput {
            product_id: Some(product_id),
            quantity,
            price_ht,
            tva_rate: 20,
        }
    }

    fn issue(
        number: &str,
        invoice_type: InvoiceType,
        partner_id: PartnerId,
        lines: Vec<InvoiceLineInput>,
        when: DateTime<Utc>,
    ) -> IssueInvoice {
        IssueInvoice {
            invoice_id: InvoiceId::new(),
            invoice_number: number.to_string(),
            invoice_type,
            partner_id,
            lines,
            date: when,
        }
    }

    fn payment(invoice_id: InvoiceId, amount: Decimal, when: DateTime<Utc>) -> RecordPayment {
        RecordPayment {
            payment_id: PaymentId::new(),
            invoice_id,
            amount,
            method: PaymentMethod::Cash,
            note: None,
            date: when,
        }
    }

    fn stock(engine: &Engine, product_id: ProductId) -> i64 {
        engine.get_product(product_id).unwrap().stock_quantity()
    }

    fn domain(err: StoreError) -> DomainError {
        match err {
            StoreError::Domain(e) => e,
            other => panic!("Expected domain error, got {other:?}"),
        }
    }

    #[test]
    fn sale_lifecycle_settles_invoice_and_moves_stock() {
        let engine = Engine::new();
        let product = add_product(&engine, "HDMI-2M", dec!(100), 10);
        let client = add_partner(&engine, "Atlas Distribution", PartnerKind::Client);

        let invoice = engine
            .create_invoice(issue(
                "FA-2024-001",
                InvoiceType::Sale,
                client,
                vec![line(product, 2, dec!(100))],
                date(2024, 5, 2),
            ))
            .unwrap();
        assert_eq!(invoice.total_ht, dec!(200));
        assert_eq!(invoice.total_tva, dec!(40));
        assert_eq!(invoice.total_ttc, dec!(240));
        assert_eq!(invoice.partner.as_ref().map(|p| p.name.as_str()), Some("Atlas Distribution"));
        assert_eq!(invoice.lines[0].product.as_ref().map(|p| p.reference.as_str()), Some("HDMI-2M"));
        assert_eq!(stock(&engine, product), 8);

        let first = engine
            .record_payment(payment(invoice.invoice_id, dec!(100), date(2024, 5, 10)))
            .unwrap();
        assert_eq!(first.payment_number.to_string(), "REG-2024-0001");
        let after_first = engine.get_invoice(invoice.invoice_id).unwrap();
        assert_eq!(after_first.amount_paid, dec!(100));
        assert_eq!(after_first.amount_remaining, dec!(140));
        assert_eq!(after_first.status, InvoiceStatus::Partial);

        engine
            .record_payment(payment(invoice.invoice_id, dec!(140), date(2024, 5, 20)))
            .unwrap();
        let settled = engine.get_invoice(invoice.invoice_id).unwrap();
        assert_eq!(settled.amount_remaining, Decimal::ZERO);
        assert_eq!(settled.status, InvoiceStatus::Paid);

        let err = engine
            .record_payment(payment(invoice.invoice_id, dec!(50), date(2024, 5, 21)))
            .unwrap_err();
        assert_eq!(domain(err), DomainError::overpayment(dec!(50), Decimal::ZERO));
        assert_eq!(engine.get_invoice(invoice.invoice_id).unwrap(), settled);
        assert_eq!(engine.list_payments().unwrap().len(), 2);
        assert_eq!(
            engine.database().read().unwrap().payment_sequence.last_issued(2024),
            Some(2)
        );
    }

    #[test]
    fn deleting_purchase_takes_units_back_out() {
        let engine = Engine::new();
        let product = add_product(&engine, "RAM-16", dec!(400), 2);
        let supplier = add_partner(&engine, "Tanger Composants", PartnerKind::Supplier);

        let purchase = engine
            .create_invoice(issue(
                "AC-001",
                InvoiceType::Purchase,
                supplier,
                vec![line(product, 5, dec!(350))],
                date(2024, 6, 1),
            ))
            .unwrap();
        assert_eq!(stock(&engine, product), 7);

        engine.delete_invoice(purchase.invoice_id).unwrap();
        assert_eq!(stock(&engine, product), 2);
        assert!(matches!(
            domain(engine.get_invoice(purchase.invoice_id).unwrap_err()),
            DomainError::NotFound(_)
        ));
        assert!(matches!(
            domain(engine.delete_invoice(purchase.invoice_id).unwrap_err()),
            DomainError::NotFound(_)
        ));
    }

    #[test]
    fn missing_product_rolls_back_every_line() {
        let engine = Engine::new();
        let product = add_product(&engine, "SSD-1T", dec!(800), 10);
        let client = add_partner(&engine, "Rabat Bureautique", PartnerKind::Client);

        let err = engine
            .create_invoice(issue(
                "FA-404",
                InvoiceType::Sale,
                client,
                vec![line(product, 3, dec!(800)), line(ProductId::new(), 1, dec!(5))],
                date(2024, 6, 1),
            ))
            .unwrap_err();

        assert!(matches!(domain(err), DomainError::NotFound(ref m) if m.starts_with("product")));
        assert_eq!(stock(&engine, product), 10);
        assert!(engine.list_invoices().unwrap().is_empty());
    }

    #[test]
    fn unknown_partner_and_duplicate_number_are_rejected() {
        let engine = Engine::new();
        let product = add_product(&engine, "USB-C", dec!(20), 10);
        let client = add_partner(&engine, "Fès Retail", PartnerKind::Client);

        let err = engine
            .create_invoice(issue(
                "FA-1",
                InvoiceType::Sale,
                PartnerId::new(),
                vec![line(product, 1, dec!(20))],
                date(2024, 1, 5),
            ))
            .unwrap_err();
        assert!(matches!(domain(err), DomainError::NotFound(ref m) if m.starts_with("partner")));

        engine
            .create_invoice(issue(
                "FA-1",
                InvoiceType::Sale,
                client,
                vec![line(product, 1, dec!(20))],
                date(2024, 1, 5),
            ))
            .unwrap();
        let err = engine
            .create_invoice(issue(
                "FA-1",
                InvoiceType::Sale,
                client,
                vec![line(product, 4, dec!(20))],
                date(2024, 1, 6),
            ))
            .unwrap_err();
        assert!(matches!(domain(err), DomainError::Conflict(_)));
        assert_eq!(stock(&engine, product), 9);
    }

    #[test]
    fn payments_outlive_deleted_invoices() {
        let engine = Engine::new();
        let product = add_product(&engine, "TONER", dec!(50), 10);
        let client = add_partner(&engine, "Agadir Print", PartnerKind::Client);
        let invoice = engine
            .create_invoice(issue(
                "FA-9",
                InvoiceType::Sale,
                client,
                vec![line(product, 1, dec!(50))],
                date(2024, 2, 1),
            ))
            .unwrap();
        engine
            .record_payment(payment(invoice.invoice_id, dec!(30), date(2024, 2, 2)))
            .unwrap();

        engine.delete_invoice(invoice.invoice_id).unwrap();

        let payments = engine.list_payments().unwrap();
        assert_eq!(payments.len(), 1);
        assert!(payments[0].invoice.is_none());
        assert!(payments[0].partner.is_none());

        let treasury = engine.treasury_summary().unwrap();
        assert_eq!(treasury.payment_count, 1);
        assert_eq!(treasury.cash_in, Decimal::ZERO);
    }

    #[test]
    fn receipt_numbers_restart_each_year() {
        let engine = Engine::new();
        let product = add_product(&engine, "CHAISE", dec!(1000), 10);
        let client = add_partner(&engine, "Oujda Mobilier", PartnerKind::Client);
        let invoice = engine
            .create_invoice(issue(
                "FA-77",
                InvoiceType::Sale,
                client,
                vec![line(product, 1, dec!(1000))],
                date(2024, 12, 1),
            ))
            .unwrap();

        let numbers: Vec<String> = [date(2024, 12, 20), date(2024, 12, 28), date(2025, 1, 3)]
            .into_iter()
            .map(|when| {
                engine
                    .record_payment(payment(invoice.invoice_id, dec!(100), when))
                    .unwrap()
                    .payment_number
                    .to_string()
            })
            .collect();

        assert_eq!(numbers, vec!["REG-2024-0001", "REG-2024-0002", "REG-2025-0001"]);
    }

    #[test]
    fn concurrent_payments_never_double_credit() {
        let engine = Arc::new(Engine::new());
        let product = add_product(&engine, "ECRAN-27", dec!(200), 10);
        let client = add_partner(&engine, "Meknès Tech", PartnerKind::Client);
        // 240 TTC, settled by exactly eight payments of 30
        let invoice = engine
            .create_invoice(issue(
                "FA-500",
                InvoiceType::Sale,
                client,
                vec![line(product, 1, dec!(200))],
                date(2024, 3, 1),
            ))
            .unwrap();
        let invoice_id = invoice.invoice_id;

        let handles: Vec<_> = (0..12)
            .map(|_| {
                let engine = Arc::clone(&engine);
                std::thread::spawn(move || {
                    engine.record_payment(payment(invoice_id, dec!(30), date(2024, 3, 2)))
                })
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let accepted = results.iter().filter(|r| r.is_ok()).count();
        let overpaid = results
            .iter()
            .filter(|r| matches!(r, Err(StoreError::Domain(DomainError::Overpayment { .. }))))
            .count();
        assert_eq!(accepted, 8);
        assert_eq!(overpaid, 4);

        let settled = engine.get_invoice(invoice_id).unwrap();
        assert_eq!(settled.amount_paid, dec!(240));
        assert_eq!(settled.status, InvoiceStatus::Paid);

        let numbers: HashSet<String> = engine
            .list_payments()
            .unwrap()
            .into_iter()
            .map(|p| p.payment_number.to_string())
            .collect();
        assert_eq!(numbers.len(), 8);
        assert!(numbers.contains("REG-2024-0008"));
    }

    #[test]
    fn statement_stats_and_movements_read_committed_state() {
        let engine = Engine::new();
        let product = add_product(&engine, "BUREAU", dec!(500), 1);
        let client = add_partner(&engine, "Kénitra Bureaux", PartnerKind::Client);

        let sale = engine
            .create_invoice(issue(
                "FA-10",
                InvoiceType::Sale,
                client,
                vec![line(product, 1, dec!(500))],
                date(2024, 4, 3),
            ))
            .unwrap();
        engine
            .create_invoice(issue(
                "AV-11",
                InvoiceType::Purchase,
                client,
                vec![line(product, 2, dec!(100))],
                date(2024, 4, 8),
            ))
            .unwrap();
        engine
            .record_payment(payment(sale.invoice_id, dec!(100), date(2024, 4, 9)))
            .unwrap();

        let statement = engine.partner_statement(client).unwrap();
        assert_eq!(statement.transactions.len(), 2);
        assert_eq!(statement.transactions[0].current_solde, dec!(600));
        assert_eq!(statement.total_solde, dec!(360));
        assert_eq!(statement, engine.partner_statement(client).unwrap());

        let stats = engine.partner_stats(client).unwrap();
        assert_eq!(stats.total_invoiced, dec!(840));
        assert_eq!(stats.total_paid, dec!(100));
        assert_eq!(stats.balance, dec!(740));

        let movements = engine.stock_movements(product).unwrap();
        let deltas: Vec<i64> = movements.iter().map(|m| m.delta).collect();
        assert_eq!(deltas, vec![2, -1]);
        assert_eq!(movements[0].partner_name.as_deref(), Some("Kénitra Bureaux"));
        assert_eq!(stock(&engine, product), 2);

        let unknown = PartnerId::new();
        assert!(matches!(
            domain(engine.partner_statement(unknown).unwrap_err()),
            DomainError::NotFound(_)
        ));
        assert!(matches!(
            domain(engine.stock_movements(ProductId::new()).unwrap_err()),
            DomainError::NotFound(_)
        ));
    }

    #[test]
    fn partner_without_invoices_has_zero_balance() {
        let engine = Engine::new();
        let client = add_partner(&engine, "Nouveau Client", PartnerKind::Client);
        let statement = engine.partner_statement(client).unwrap();
        assert!(statement.transactions.is_empty());
        assert_eq!(statement.total_solde, Decimal::ZERO);
    }

    #[test]
    fn monthly_report_and_expenses() {
        let engine = Engine::new();
        let product = add_product(&engine, "CARTON", dec!(10), 100);
        let client = add_partner(&engine, "Safi Emballage", PartnerKind::Client);
        engine
            .create_invoice(issue(
                "FA-1",
                InvoiceType::Sale,
                client,
                vec![line(product, 10, dec!(10))],
                date(2024, 9, 15),
            ))
            .unwrap();

        let expense = engine
            .create_expense(CreateExpense {
                expense_id: ExpenseId::new(),
                description: "Transport marchandises".to_string(),
                category: ExpenseCategory::Transport,
                amount: dec!(30),
                date: date(2024, 9, 16),
                payment_method: ExpensePaymentMethod::Cash,
            })
            .unwrap();

        let report = engine.monthly_report(9, 2024).unwrap();
        assert_eq!(report.sales_total, dec!(120));
        assert_eq!(report.expense_total, dec!(30));
        assert_eq!(report.net_profit, dec!(90));
        assert_eq!(report.stock_value, dec!(900));

        let updated = engine
            .update_expense(
                expense.id_typed(),
                UpdateExpense {
                    description: "Transport marchandises".to_string(),
                    category: ExpenseCategory::Transport,
                    amount: dec!(45),
                    date: expense.date(),
                    payment_method: ExpensePaymentMethod::Transfer,
                },
            )
            .unwrap();
        assert_eq!(updated.amount(), dec!(45));
        assert_eq!(engine.monthly_report(9, 2024).unwrap().net_profit, dec!(75));

        engine.delete_expense(expense.id_typed()).unwrap();
        assert!(engine.list_expenses().unwrap().is_empty());
        assert!(matches!(
            domain(engine.delete_expense(expense.id_typed()).unwrap_err()),
            DomainError::NotFound(_)
        ));
        assert!(matches!(
            domain(engine.monthly_report(13, 2024).unwrap_err()),
            DomainError::Validation(_)
        ));
    }

    #[test]
    fn inventory_summary_uses_configured_threshold() {
        let engine = Engine::with_low_stock_threshold(3);
        add_product(&engine, "A", dec!(10), 2);
        add_product(&engine, "B", dec!(10), 3);
        let err = engine
            .create_product(CreateProduct {
                product_id: ProductId::new(),
                reference: "A".to_string(),
                designation: "Doublon".to_string(),
                price_ht: dec!(1),
                tva_rate: 20,
                stock_quantity: 0,
                category: None,
                occurred_at: Utc::now(),
            })
            .unwrap_err();
        assert!(matches!(domain(err), DomainError::Conflict(_)));

        let summary = engine.inventory_summary().unwrap();
        assert_eq!(summary.product_count, 2);
        assert_eq!(summary.low_stock_count, 1);
        assert_eq!(summary.stock_value, dec!(50));
        assert_eq!(engine.adjust_stock(summary.low_stock[0].product_id, 5).unwrap(), 7);
    }

    #[test]
    fn amounts_past_decimal_range_are_rejected_without_side_effects() {
        let engine = Engine::new();
        let err = engine
            .create_product(CreateProduct {
                product_id: ProductId::new(),
                reference: "HUGE".to_string(),
                designation: "Valeur hors limite".to_string(),
                price_ht: Decimal::MAX,
                tva_rate: 20,
                stock_quantity: 10,
                category: None,
                occurred_at: Utc::now(),
            })
            .unwrap_err();
        assert!(matches!(domain(err), DomainError::Validation(_)));
        assert!(engine.list_products().unwrap().is_empty());

        let top = add_product(&engine, "TOP", Decimal::MAX, 1);
        let cheap = add_product(&engine, "CHEAP", dec!(1), 0);
        let supplier = add_partner(&engine, "Fournisseur Atlas", PartnerKind::Supplier);
        let client = add_partner(&engine, "Client Atlas", PartnerKind::Client);

        // One more unit of TOP would be worth more than a Decimal can hold.
        let err = engine
            .create_invoice(issue(
                "AC-1",
                InvoiceType::Purchase,
                supplier,
                vec![line(cheap, 3, dec!(1)), line(top, 1, dec!(1))],
                date(2024, 5, 2),
            ))
            .unwrap_err();
        assert!(matches!(domain(err), DomainError::Validation(_)));
        assert_eq!(stock(&engine, top), 1);
        assert_eq!(stock(&engine, cheap), 0);

        let err = engine
            .create_invoice(issue(
                "FA-1",
                InvoiceType::Sale,
                client,
                vec![line(cheap, i64::MAX, dec!(100000000000000000000))],
                date(2024, 5, 3),
            ))
            .unwrap_err();
        match domain(err) {
            DomainError::Validation(msg) => assert!(msg.starts_with("line 1"), "{msg}"),
            other => panic!("Expected Validation, got {other:?}"),
        }
        assert!(engine.list_invoices().unwrap().is_empty());

        let summary = engine.inventory_summary().unwrap();
        assert_eq!(summary.stock_value, Decimal::MAX);
        let report = engine.monthly_report(5, 2024).unwrap();
        assert_eq!(report.stock_value, Decimal::MAX);
        assert_eq!(report.invoice_count, 0);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 64,
            ..ProptestConfig::default()
        })]

        /// Property: creating then deleting any set of invoices restores every
        /// product's quantity on hand.
        #[test]
        fn stock_is_conserved_across_create_and_delete(
            invoices in prop::collection::vec(
                (any::<bool>(), prop::collection::vec((0usize..3, 1i64..50), 1..4)),
                1..10
            )
        ) {
            let engine = Engine::new();
            let products: Vec<ProductId> = (0..3)
                .map(|i| add_product(&engine, &format!("P{i}"), dec!(10), 5))
                .collect();
            let partner = add_partner(&engine, "Prop Partner", PartnerKind::Client);

            let mut created = Vec::new();
            for (n, (is_sale, lines)) in invoices.iter().enumerate() {
                let invoice_type = if *is_sale { InvoiceType::Sale } else { InvoiceType::Purchase };
                let lines = lines
                    .iter()
                    .map(|(idx, qty)| line(products[*idx], *qty, dec!(10)))
                    .collect();
                let view = engine
                    .create_invoice(issue(&format!("INV-{n}"), invoice_type, partner, lines, Utc::now()))
                    .unwrap();
                created.push(view.invoice_id);
            }

            for invoice_id in created.into_iter().rev() {
                engine.delete_invoice(invoice_id).unwrap();
            }

            for product_id in products {
                prop_assert_eq!(stock(&engine, product_id), 5);
            }
        }
    }
}
