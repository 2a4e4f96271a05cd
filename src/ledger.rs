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

//! Wallet ledger and order settlement.
//!
//! The [`Ledger`] is the application context: it owns the accounts, the
//! orders, the transaction log and the notification queue, and exposes the
//! operations front ends call.
//!
//! # Operations
//!
//! - **Accounts**: register customers, vendors and riders. The platform account
//!   (id `0`) exists from construction onwards.
//! - **Wallet transactions**: manual credits and debits, never overdrawing.
//! - **Orders**: placed as pending, settled once, then confirmed delivered.
//! - **Settlement**: splits an order between vendor, rider and platform in a
//!   single all-or-nothing step.
//!
//! # Thread Safety
//!
//! Accounts and orders live in [`DashMap`]s behind `Arc`s. Handles are cloned
//! out before any mutex is taken, so no map shard is ever held while waiting.
//! A settlement locks its order first, then the involved accounts in ascending
//! id order, which keeps concurrent settlements free of deadlocks and keeps the
//! shared platform balance exact.

use crate::account::{Account, AccountData};
use crate::base::{AccountId, OrderId, Role};
use crate::notification::{Notification, NotificationQueue};
use crate::order::{Order, OrderStatus};
use crate::settlement::SettlementSplit;
use crate::transaction::{
    MANUAL, PLATFORM_COMMISSION, RIDER_PAYMENT, Transaction, TransactionKind, VENDOR_PAYMENT,
};
use crate::transaction_log::TransactionLog;
use crate::LedgerError;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::{Mutex, MutexGuard};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

/// Balance and history of one account.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Wallet {
    pub account_id: AccountId,
    pub role: Role,
    pub balance: Decimal,
    /// Newest first.
    pub transactions: Vec<Transaction>,
}

/// Wallet ledger and settlement engine.
///
/// # Invariants
///
/// - No balance is ever negative.
/// - Every balance equals the signed sum of its account's transactions.
/// - An order is settled at most once; its status only moves forward.
/// - The platform account exists for the lifetime of the ledger.
pub struct Ledger {
    /// Accounts indexed by id.
    accounts: DashMap<AccountId, Arc<Account>>,
    /// Orders indexed by id, each behind its own lock.
    orders: DashMap<OrderId, Arc<Mutex<Order>>>,
    transactions: TransactionLog,
    notifications: NotificationQueue,
    last_account_id: AtomicU64,
    last_order_id: AtomicU64,
}

impl Ledger {
    /// Creates a ledger holding only the platform account.
    pub fn new() -> Self {
        let accounts = DashMap::new();
        accounts.insert(
            AccountId::PLATFORM,
            Arc::new(Account::new(AccountId::PLATFORM, Role::Platform)),
        );

        Ledger {
            accounts,
            orders: DashMap::new(),
            transactions: TransactionLog::new(),
            notifications: NotificationQueue::new(),
            last_account_id: AtomicU64::new(0),
            last_order_id: AtomicU64::new(0),
        }
    }

    // === Accounts ===

    /// Opens an account under the next free id.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidRole`] for [`Role::Platform`].
    pub fn open_account(&self, role: Role) -> Result<AccountId, LedgerError> {
        if role == Role::Platform {
            return Err(LedgerError::InvalidRole);
        }

        loop {
            let id = AccountId(self.last_account_id.fetch_add(1, Ordering::SeqCst) + 1);
            // Ids handed out by `register_account` may already be taken.
            if let Entry::Vacant(entry) = self.accounts.entry(id) {
                entry.insert(Arc::new(Account::new(id, role)));
                debug!(account = %id, %role, "opened account");
                return Ok(id);
            }
        }
    }

    /// Registers an account under an explicit id.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidRole`] for id `0` or [`Role::Platform`].
    /// - [`LedgerError::DuplicateAccount`] if the id is taken.
    pub fn register_account(&self, id: AccountId, role: Role) -> Result<(), LedgerError> {
        if id.is_platform() || role == Role::Platform {
            return Err(LedgerError::InvalidRole);
        }

        match self.accounts.entry(id) {
            Entry::Occupied(_) => Err(LedgerError::DuplicateAccount(id)),
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(Account::new(id, role)));
                debug!(account = %id, %role, "registered account");
                Ok(())
            }
        }
    }

    /// Retrieves an account by id.
    pub fn get_account(&self, id: AccountId) -> Option<Arc<Account>> {
        self.accounts.get(&id).map(|account| Arc::clone(account.value()))
    }

    /// Returns every account, ordered by id.
    pub fn accounts(&self) -> Vec<Arc<Account>> {
        let mut accounts: Vec<Arc<Account>> = self
            .accounts
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        accounts.sort_by_key(|account| account.id());
        accounts
    }

    /// # Errors
    ///
    /// [`LedgerError::AccountNotFound`] for an unknown id.
    pub fn get_balance(&self, id: AccountId) -> Result<Decimal, LedgerError> {
        Ok(self.account(id)?.balance())
    }

    /// Moves an account's balance by a signed delta and records it.
    ///
    /// A zero delta changes nothing and records nothing.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::AccountNotFound`] for an unknown id.
    /// - [`LedgerError::InsufficientFunds`] if the balance would go negative.
    /// - [`LedgerError::AmountOverflow`] if the balance would go out of range.
    pub fn apply_delta(&self, id: AccountId, delta: Decimal) -> Result<Decimal, LedgerError> {
        let account = self.account(id)?;
        let mut data = account.lock();
        self.post(id, &mut data, delta, MANUAL)
    }

    // === Wallets ===

    /// Returns an account's balance and transaction history.
    ///
    /// # Errors
    ///
    /// [`LedgerError::AccountNotFound`] for an unknown id.
    pub fn get_wallet(&self, id: AccountId) -> Result<Wallet, LedgerError> {
        let account = self.account(id)?;
        let data = account.lock();
        Ok(self.snapshot(&account, &data))
    }

    /// Credits or debits a wallet by hand.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidAmount`] if `amount` is not positive.
    /// - [`LedgerError::AccountNotFound`] for an unknown id.
    /// - [`LedgerError::InsufficientFunds`] if a debit exceeds the balance.
    /// - [`LedgerError::AmountOverflow`] if a credit would go out of range.
    pub fn apply_wallet_transaction(
        &self,
        id: AccountId,
        amount: Decimal,
        kind: TransactionKind,
    ) -> Result<Wallet, LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount);
        }

        let account = self.account(id)?;
        let mut data = account.lock();
        let balance = self.post(id, &mut data, kind.signed(amount), MANUAL)?;
        let wallet = self.snapshot(&account, &data);
        drop(data);

        self.notifications
            .push(id, format!("Wallet {kind} of {amount}. New balance: {balance}"));
        Ok(wallet)
    }

    /// Returns every recorded transaction, oldest first.
    pub fn transactions(&self) -> Vec<Transaction> {
        self.transactions.journal()
    }

    /// Read-only view of the transaction log.
    pub fn transaction_log(&self) -> &TransactionLog {
        &self.transactions
    }

    /// Takes every queued notification.
    pub fn drain_notifications(&self) -> Vec<Notification> {
        self.notifications.drain()
    }

    // === Orders ===

    /// Places a pending order and returns its id.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidAmount`] if either amount is negative.
    /// - [`LedgerError::AmountOverflow`] if the amounts are too large to split.
    /// - [`LedgerError::AccountNotFound`] if a party does not exist.
    /// - [`LedgerError::RoleMismatch`] if a party has the wrong role.
    pub fn create_order(
        &self,
        customer_id: AccountId,
        vendor_id: AccountId,
        rider_id: AccountId,
        product_amount: Decimal,
        delivery_fee: Decimal,
    ) -> Result<OrderId, LedgerError> {
        if product_amount < Decimal::ZERO || delivery_fee < Decimal::ZERO {
            return Err(LedgerError::InvalidAmount);
        }
        SettlementSplit::compute(product_amount, delivery_fee)?;
        self.expect_role(customer_id, Role::Customer)?;
        self.expect_role(vendor_id, Role::Vendor)?;
        self.expect_role(rider_id, Role::Rider)?;

        let id = OrderId(self.last_order_id.fetch_add(1, Ordering::SeqCst) + 1);
        let order = Order::new(
            id,
            customer_id,
            vendor_id,
            rider_id,
            product_amount,
            delivery_fee,
        )?;
        self.orders.insert(id, Arc::new(Mutex::new(order)));

        debug!(order = %id, %product_amount, %delivery_fee, "placed order");
        Ok(id)
    }

    /// # Errors
    ///
    /// [`LedgerError::OrderNotFound`] for an unknown id.
    pub fn get_order(&self, id: OrderId) -> Result<Order, LedgerError> {
        Ok(self.order(id)?.lock().clone())
    }

    /// Settles a pending order between vendor, rider and platform.
    ///
    /// Either every balance, every transaction and the order status are
    /// updated, or nothing is.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::OrderNotFound`] for an unknown id.
    /// - [`LedgerError::OrderNotSettleable`] unless the order is pending.
    /// - [`LedgerError::InsufficientFunds`] naming the vendor or rider whose
    ///   negative net would overdraw them.
    /// - [`LedgerError::AmountOverflow`] if a payout would push a balance out
    ///   of range.
    pub fn settle_order(&self, id: OrderId) -> Result<SettlementSplit, LedgerError> {
        let order = self.order(id)?;
        let mut order = order.lock();
        if order.status != OrderStatus::Pending {
            return Err(LedgerError::OrderNotSettleable(id, order.status));
        }

        let split = SettlementSplit::compute(order.product_amount, order.delivery_fee)?;
        let postings = [
            (order.vendor_id, split.vendor_net, VENDOR_PAYMENT),
            (order.rider_id, split.rider_net, RIDER_PAYMENT),
            (AccountId::PLATFORM, split.platform_net, PLATFORM_COMMISSION),
        ];

        let mut deltas: BTreeMap<AccountId, Decimal> = BTreeMap::new();
        for (account_id, net, _) in &postings {
            let delta = deltas.entry(*account_id).or_default();
            *delta = delta.checked_add(*net).ok_or(LedgerError::AmountOverflow)?;
        }

        let handles = deltas
            .keys()
            .map(|account_id| Ok((*account_id, self.account(*account_id)?)))
            .collect::<Result<BTreeMap<_, _>, LedgerError>>()?;

        // BTreeMap iteration is ascending, which fixes the lock order.
        let mut guards: BTreeMap<AccountId, MutexGuard<'_, AccountData>> = handles
            .iter()
            .map(|(account_id, account)| (*account_id, account.lock()))
            .collect();

        for (account_id, delta) in &deltas {
            if let Some(data) = guards.get(account_id) {
                data.preview(*delta)?;
            }
        }

        for (account_id, delta) in &deltas {
            if let Some(data) = guards.get_mut(account_id) {
                data.apply_delta(*delta)?;
            }
        }
        for (account_id, net, category) in postings {
            if let Some((kind, amount)) = TransactionKind::from_delta(net) {
                self.transactions.append(account_id, amount, kind, category)?;
            }
        }
        order.advance(OrderStatus::Paid)?;
        drop(guards);

        self.notifications.push(
            order.vendor_id,
            format!("Order {id} paid. Vendor payout: {}", split.vendor_net),
        );
        self.notifications.push(
            order.rider_id,
            format!("Order {id} paid. Rider payout: {}", split.rider_net),
        );

        info!(
            order = %id,
            vendor_net = %split.vendor_net,
            rider_net = %split.rider_net,
            platform_net = %split.platform_net,
            "settled order"
        );
        Ok(split)
    }

    /// Marks a paid order as delivered.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::OrderNotFound`] for an unknown id.
    /// - [`LedgerError::InvalidStatusTransition`] unless the order is paid.
    pub fn confirm_delivery(&self, id: OrderId) -> Result<(), LedgerError> {
        let order = self.order(id)?;
        let mut order = order.lock();
        order.advance(OrderStatus::Delivered)?;

        self.notifications
            .push(order.customer_id, format!("Order {id} delivered"));
        debug!(order = %id, "confirmed delivery");
        Ok(())
    }

    // === Internals ===

    fn account(&self, id: AccountId) -> Result<Arc<Account>, LedgerError> {
        self.get_account(id).ok_or(LedgerError::AccountNotFound(id))
    }

    fn order(&self, id: OrderId) -> Result<Arc<Mutex<Order>>, LedgerError> {
        self.orders
            .get(&id)
            .map(|order| Arc::clone(order.value()))
            .ok_or(LedgerError::OrderNotFound(id))
    }

    fn expect_role(&self, id: AccountId, expected: Role) -> Result<(), LedgerError> {
        if self.account(id)?.role() != expected {
            return Err(LedgerError::RoleMismatch {
                account: id,
                expected,
            });
        }
        Ok(())
    }

    /// Applies a delta to locked account data and records it in the log.
    fn post(
        &self,
        id: AccountId,
        data: &mut AccountData,
        delta: Decimal,
        category: &str,
    ) -> Result<Decimal, LedgerError> {
        let Some((kind, amount)) = TransactionKind::from_delta(delta) else {
            return Ok(data.balance());
        };
        let balance = data.apply_delta(delta)?;
        self.transactions.append(id, amount, kind, category)?;
        debug!(account = %id, %kind, %amount, %balance, category, "posted transaction");
        Ok(balance)
    }

    fn snapshot(&self, account: &Account, data: &AccountData) -> Wallet {
        Wallet {
            account_id: account.id(),
            role: account.role(),
            balance: data.balance(),
            transactions: self.transactions.list_for(account.id()),
        }
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn new_ledger_has_platform_account() {
        let ledger = Ledger::new();
        let platform = ledger.get_account(AccountId::PLATFORM).unwrap();
        assert_eq!(platform.role(), Role::Platform);
        assert_eq!(platform.balance(), Decimal::ZERO);
        assert_eq!(ledger.accounts().len(), 1);
    }

    #[test]
    fn open_account_skips_registered_ids() {
        let ledger = Ledger::new();
        ledger.register_account(AccountId(1), Role::Vendor).unwrap();
        let id = ledger.open_account(Role::Rider).unwrap();
        assert_eq!(id, AccountId(2));
    }

    #[test]
    fn post_with_zero_delta_records_nothing() {
        let ledger = Ledger::new();
        let id = ledger.open_account(Role::Customer).unwrap();
        assert_eq!(ledger.apply_delta(id, Decimal::ZERO), Ok(Decimal::ZERO));
        assert!(ledger.transaction_log().is_empty());
    }

    #[test]
    fn settlement_locks_each_account_once() {
        let ledger = Ledger::new();
        let customer = ledger.open_account(Role::Customer).unwrap();
        let vendor = ledger.open_account(Role::Vendor).unwrap();
        let rider = ledger.open_account(Role::Rider).unwrap();
        ledger.apply_delta(rider, dec!(100)).unwrap();

        let order = ledger
            .create_order(customer, vendor, rider, dec!(1000), dec!(200))
            .unwrap();
        let split = ledger.settle_order(order).unwrap();

        assert_eq!(ledger.get_balance(vendor), Ok(split.vendor_net));
        assert_eq!(ledger.get_balance(rider), Ok(dec!(90)));
        assert_eq!(ledger.get_balance(AccountId::PLATFORM), Ok(dec!(310)));
    }
}
