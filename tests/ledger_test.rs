// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Ledger public API integration tests: accounts, wallets and orders.

use arewa_ledger::{
    AccountId, Ledger, LedgerError, MANUAL, OrderId, OrderStatus, Role, TransactionKind,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

struct Parties {
    customer: AccountId,
    vendor: AccountId,
    rider: AccountId,
}

fn parties(ledger: &Ledger) -> Parties {
    Parties {
        customer: ledger.open_account(Role::Customer).unwrap(),
        vendor: ledger.open_account(Role::Vendor).unwrap(),
        rider: ledger.open_account(Role::Rider).unwrap(),
    }
}

// === Accounts ===

#[test]
fn open_account_assigns_sequential_ids() {
    let ledger = Ledger::new();
    let p = parties(&ledger);
    assert_eq!(p.customer, AccountId(1));
    assert_eq!(p.vendor, AccountId(2));
    assert_eq!(p.rider, AccountId(3));
    assert_eq!(ledger.accounts().len(), 4);
}

#[test]
fn platform_role_is_reserved() {
    let ledger = Ledger::new();
    assert_eq!(
        ledger.open_account(Role::Platform),
        Err(LedgerError::InvalidRole)
    );
    assert_eq!(
        ledger.register_account(AccountId::PLATFORM, Role::Vendor),
        Err(LedgerError::InvalidRole)
    );
    assert_eq!(
        ledger.register_account(AccountId(5), Role::Platform),
        Err(LedgerError::InvalidRole)
    );
}

#[test]
fn register_account_rejects_duplicates() {
    let ledger = Ledger::new();
    ledger.register_account(AccountId(10), Role::Rider).unwrap();
    assert_eq!(
        ledger.register_account(AccountId(10), Role::Vendor),
        Err(LedgerError::DuplicateAccount(AccountId(10)))
    );
    assert_eq!(ledger.get_account(AccountId(10)).unwrap().role(), Role::Rider);
}

#[test]
fn accounts_are_ordered_by_id() {
    let ledger = Ledger::new();
    ledger.register_account(AccountId(9), Role::Vendor).unwrap();
    ledger.register_account(AccountId(4), Role::Rider).unwrap();
    let ids: Vec<u64> = ledger.accounts().iter().map(|a| a.id().0).collect();
    assert_eq!(ids, vec![0, 4, 9]);
}

#[test]
fn unknown_account_is_not_found() {
    let ledger = Ledger::new();
    assert_eq!(
        ledger.get_balance(AccountId(77)),
        Err(LedgerError::AccountNotFound(AccountId(77)))
    );
    assert_eq!(
        ledger.get_wallet(AccountId(77)),
        Err(LedgerError::AccountNotFound(AccountId(77)))
    );
    assert_eq!(
        ledger.apply_delta(AccountId(77), dec!(5)),
        Err(LedgerError::AccountNotFound(AccountId(77)))
    );
}

// === Wallets ===

#[test]
fn wallet_credit_and_debit() {
    let ledger = Ledger::new();
    let p = parties(&ledger);

    let wallet = ledger
        .apply_wallet_transaction(p.customer, dec!(100.00), TransactionKind::Credit)
        .unwrap();
    assert_eq!(wallet.balance, dec!(100.00));
    assert_eq!(wallet.transactions.len(), 1);

    let wallet = ledger
        .apply_wallet_transaction(p.customer, dec!(40.00), TransactionKind::Debit)
        .unwrap();
    assert_eq!(wallet.balance, dec!(60.00));
    assert_eq!(wallet.role, Role::Customer);

    // Newest first.
    assert_eq!(wallet.transactions[0].kind, TransactionKind::Debit);
    assert_eq!(wallet.transactions[0].amount, dec!(40.00));
    assert_eq!(wallet.transactions[0].category, MANUAL);
    assert_eq!(wallet.transactions[1].kind, TransactionKind::Credit);
}

#[test]
fn wallet_overdraw_is_rejected_without_writes() {
    let ledger = Ledger::new();
    let p = parties(&ledger);
    ledger
        .apply_wallet_transaction(p.customer, dec!(10), TransactionKind::Credit)
        .unwrap();

    let result = ledger.apply_wallet_transaction(p.customer, dec!(10.01), TransactionKind::Debit);
    assert_eq!(result, Err(LedgerError::InsufficientFunds(p.customer)));

    let wallet = ledger.get_wallet(p.customer).unwrap();
    assert_eq!(wallet.balance, dec!(10));
    assert_eq!(wallet.transactions.len(), 1);
}

#[test]
fn wallet_credit_out_of_range_is_rejected_without_writes() {
    let ledger = Ledger::new();
    let p = parties(&ledger);
    ledger
        .apply_wallet_transaction(p.customer, Decimal::MAX, TransactionKind::Credit)
        .unwrap();

    let result = ledger.apply_wallet_transaction(p.customer, Decimal::MAX, TransactionKind::Credit);
    assert_eq!(result, Err(LedgerError::AmountOverflow));
    assert_eq!(
        ledger.apply_delta(p.customer, dec!(1)),
        Err(LedgerError::AmountOverflow)
    );

    let wallet = ledger.get_wallet(p.customer).unwrap();
    assert_eq!(wallet.balance, Decimal::MAX);
    assert_eq!(wallet.transactions.len(), 1);
}

#[test]
fn wallet_rejects_non_positive_amounts() {
    let ledger = Ledger::new();
    let p = parties(&ledger);
    assert_eq!(
        ledger.apply_wallet_transaction(p.vendor, Decimal::ZERO, TransactionKind::Credit),
        Err(LedgerError::InvalidAmount)
    );
    assert_eq!(
        ledger.apply_wallet_transaction(p.vendor, dec!(-5), TransactionKind::Debit),
        Err(LedgerError::InvalidAmount)
    );
    assert!(ledger.transactions().is_empty());
}

#[test]
fn apply_delta_records_signed_movement() {
    let ledger = Ledger::new();
    let p = parties(&ledger);

    assert_eq!(ledger.apply_delta(p.rider, dec!(30)), Ok(dec!(30)));
    assert_eq!(ledger.apply_delta(p.rider, dec!(-12.5)), Ok(dec!(17.5)));
    assert_eq!(
        ledger.apply_delta(p.rider, dec!(-100)),
        Err(LedgerError::InsufficientFunds(p.rider))
    );

    let history = ledger.get_wallet(p.rider).unwrap().transactions;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].kind, TransactionKind::Debit);
    assert_eq!(history[0].amount, dec!(12.5));
}

#[test]
fn wallet_transactions_queue_notifications() {
    let ledger = Ledger::new();
    let p = parties(&ledger);
    ledger
        .apply_wallet_transaction(p.customer, dec!(25), TransactionKind::Credit)
        .unwrap();

    let notifications = ledger.drain_notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].account_id, p.customer);
    assert!(notifications[0].message.contains("credit"));
    assert!(ledger.drain_notifications().is_empty());
}

// === Orders ===

#[test]
fn create_order_is_pending() {
    let ledger = Ledger::new();
    let p = parties(&ledger);

    let id = ledger
        .create_order(p.customer, p.vendor, p.rider, dec!(1000), dec!(200))
        .unwrap();
    assert_eq!(id, OrderId(1));

    let order = ledger.get_order(id).unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.customer_id, p.customer);
    assert_eq!(order.vendor_id, p.vendor);
    assert_eq!(order.rider_id, p.rider);
    assert_eq!(order.total(), Ok(dec!(1200)));
}

#[test]
fn create_order_rejects_amounts_too_large_to_split() {
    let ledger = Ledger::new();
    let p = parties(&ledger);

    assert_eq!(
        ledger.create_order(p.customer, p.vendor, p.rider, Decimal::MAX, Decimal::MAX),
        Err(LedgerError::AmountOverflow)
    );
    assert_eq!(ledger.get_order(OrderId(1)), Err(LedgerError::OrderNotFound(OrderId(1))));

    // The rejected order does not use up an id.
    let id = ledger
        .create_order(p.customer, p.vendor, p.rider, dec!(10), dec!(2))
        .unwrap();
    assert_eq!(id, OrderId(1));
}

#[test]
fn create_order_checks_parties() {
    let ledger = Ledger::new();
    let p = parties(&ledger);

    assert_eq!(
        ledger.create_order(AccountId(99), p.vendor, p.rider, dec!(10), dec!(1)),
        Err(LedgerError::AccountNotFound(AccountId(99)))
    );
    assert_eq!(
        ledger.create_order(p.customer, p.rider, p.rider, dec!(10), dec!(1)),
        Err(LedgerError::RoleMismatch {
            account: p.rider,
            expected: Role::Vendor,
        })
    );
    assert_eq!(
        ledger.create_order(p.customer, p.vendor, AccountId::PLATFORM, dec!(10), dec!(1)),
        Err(LedgerError::RoleMismatch {
            account: AccountId::PLATFORM,
            expected: Role::Rider,
        })
    );
}

#[test]
fn create_order_rejects_negative_amounts() {
    let ledger = Ledger::new();
    let p = parties(&ledger);
    assert_eq!(
        ledger.create_order(p.customer, p.vendor, p.rider, dec!(-1), dec!(0)),
        Err(LedgerError::InvalidAmount)
    );
    assert_eq!(
        ledger.create_order(p.customer, p.vendor, p.rider, dec!(1), dec!(-0.5)),
        Err(LedgerError::InvalidAmount)
    );
    assert_eq!(
        ledger.get_order(OrderId(1)),
        Err(LedgerError::OrderNotFound(OrderId(1)))
    );
}

#[test]
fn delivery_requires_payment() {
    let ledger = Ledger::new();
    let p = parties(&ledger);
    ledger.apply_delta(p.rider, dec!(100)).unwrap();
    let id = ledger
        .create_order(p.customer, p.vendor, p.rider, dec!(1000), dec!(200))
        .unwrap();

    assert_eq!(
        ledger.confirm_delivery(id),
        Err(LedgerError::InvalidStatusTransition {
            from: OrderStatus::Pending,
            to: OrderStatus::Delivered,
        })
    );

    ledger.settle_order(id).unwrap();
    ledger.confirm_delivery(id).unwrap();
    assert_eq!(ledger.get_order(id).unwrap().status, OrderStatus::Delivered);

    assert_eq!(
        ledger.settle_order(id),
        Err(LedgerError::OrderNotSettleable(id, OrderStatus::Delivered))
    );
    assert!(ledger.confirm_delivery(id).is_err());
}

#[test]
fn confirm_delivery_unknown_order() {
    let ledger = Ledger::new();
    assert_eq!(
        ledger.confirm_delivery(OrderId(3)),
        Err(LedgerError::OrderNotFound(OrderId(3)))
    );
}
