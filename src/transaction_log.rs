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

//! Append-only transaction log.
//!
//! Records every balance movement per account. Entries can be appended and
//! read, never updated or removed.

use crate::LedgerError;
use crate::base::{AccountId, TransactionId};
use crate::transaction::{Transaction, TransactionKind};
use chrono::Utc;
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};

/// A thread-safe, append-only log of ledger transactions.
///
/// Transactions are grouped per account in a [`DashMap`] so that readers of
/// one wallet never contend with writers of another. Ids come from a single
/// atomic counter and are strictly increasing across the whole log.
#[derive(Debug)]
pub struct TransactionLog {
    /// Last issued transaction id.
    last_id: AtomicU64,

    /// Transactions indexed by owning account, in append order.
    by_account: DashMap<AccountId, Vec<Transaction>>,
}

impl TransactionLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self {
            last_id: AtomicU64::new(0),
            by_account: DashMap::new(),
        }
    }

    /// Appends a transaction for `account_id`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidAmount`] if `amount` is not positive.
    /// The sign of a movement is carried by `kind`, never by the amount.
    pub(crate) fn append(
        &self,
        account_id: AccountId,
        amount: Decimal,
        kind: TransactionKind,
        category: &str,
    ) -> Result<Transaction, LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount);
        }

        let id = TransactionId(self.last_id.fetch_add(1, Ordering::SeqCst) + 1);
        let transaction = Transaction {
            id,
            account_id,
            amount,
            kind,
            category: category.to_string(),
            timestamp: Utc::now(),
        };

        self.by_account
            .entry(account_id)
            .or_default()
            .push(transaction.clone());

        Ok(transaction)
    }

    /// Returns the transactions of `account_id`, newest first.
    pub fn list_for(&self, account_id: AccountId) -> Vec<Transaction> {
        let mut transactions: Vec<Transaction> = self
            .by_account
            .get(&account_id)
            .map(|entries| entries.to_vec())
            .unwrap_or_default();
        transactions.sort_by(|a, b| b.id.cmp(&a.id));
        transactions
    }

    /// Sum of the signed amounts recorded for `account_id`.
    pub fn net_for(&self, account_id: AccountId) -> Decimal {
        self.by_account
            .get(&account_id)
            .map(|entries| entries.iter().map(|tx| tx.signed_amount()).sum())
            .unwrap_or(Decimal::ZERO)
    }

    /// Returns every transaction in the log, oldest first.
    pub fn journal(&self) -> Vec<Transaction> {
        let mut transactions: Vec<Transaction> = self
            .by_account
            .iter()
            .flat_map(|entries| entries.value().clone())
            .collect();
        transactions.sort_by_key(|tx| tx.id);
        transactions
    }

    /// Number of transactions appended so far.
    pub fn len(&self) -> usize {
        self.last_id.load(Ordering::SeqCst) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TransactionLog {
    fn default() -> Self {
        Self::new()
    }
}
