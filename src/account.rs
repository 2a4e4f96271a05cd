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

//! Wallet accounts.
//!
//! Every account keeps its balance behind its own mutex, so updates to one
//! account never wait on another, and the shared platform account cannot lose
//! updates under concurrent settlements.
//!
//! Balances only move through the [`Ledger`](crate::Ledger), which records a
//! transaction for every change. Outside the crate an account is read-only.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use arewa_ledger::{Ledger, Role};
//!
//! let ledger = Ledger::new();
//! let id = ledger.open_account(Role::Vendor).unwrap();
//! ledger.apply_delta(id, dec!(25.00)).unwrap();
//!
//! let account = ledger.get_account(id).unwrap();
//! assert_eq!(account.balance(), dec!(25.00));
//! ```
//!
//! ```compile_fail
//! use rust_decimal_macros::dec;
//! use arewa_ledger::{Ledger, Role};
//!
//! let ledger = Ledger::new();
//! let id = ledger.open_account(Role::Vendor).unwrap();
//! // Unlogged balance changes are not part of the public API.
//! ledger.get_account(id).unwrap().lock().apply_delta(dec!(5)).unwrap();
//! ```

use crate::LedgerError;
use crate::base::{AccountId, Role};
use parking_lot::{Mutex, MutexGuard};
use rust_decimal::Decimal;
use serde::ser::{Serialize, SerializeStruct, Serializer};

#[derive(Debug)]
pub(crate) struct AccountData {
    id: AccountId,
    role: Role,
    balance: Decimal,
}

impl AccountData {
    fn new(id: AccountId, role: Role) -> Self {
        Self {
            id,
            role,
            balance: Decimal::ZERO,
        }
    }

    fn assert_invariants(&self) {
        debug_assert!(
            self.balance >= Decimal::ZERO,
            "Invariant violated: balance of account {} went negative: {}",
            self.id,
            self.balance
        );
    }

    pub(crate) fn balance(&self) -> Decimal {
        self.balance
    }

    /// Balance the account would have after `delta`, without applying it.
    pub(crate) fn preview(&self, delta: Decimal) -> Result<Decimal, LedgerError> {
        let next = self
            .balance
            .checked_add(delta)
            .ok_or(LedgerError::AmountOverflow)?;
        if next < Decimal::ZERO {
            return Err(LedgerError::InsufficientFunds(self.id));
        }
        Ok(next)
    }

    /// Adds a signed delta to the balance.
    pub(crate) fn apply_delta(&mut self, delta: Decimal) -> Result<Decimal, LedgerError> {
        self.balance = self.preview(delta)?;
        self.assert_invariants();
        Ok(self.balance)
    }
}

/// Wallet account for a customer, vendor, rider, or the platform.
#[derive(Debug)]
pub struct Account {
    id: AccountId,
    role: Role,
    inner: Mutex<AccountData>,
}

impl Account {
    const DECIMAL_PRECISION: u32 = 4;

    pub(crate) fn new(id: AccountId, role: Role) -> Self {
        Self {
            id,
            role,
            inner: Mutex::new(AccountData::new(id, role)),
        }
    }

    pub fn id(&self) -> AccountId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn balance(&self) -> Decimal {
        self.inner.lock().balance
    }

    /// Locks the account for a multi-step update.
    pub(crate) fn lock(&self) -> MutexGuard<'_, AccountData> {
        self.inner.lock()
    }
}

impl Serialize for Account {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let data = self.inner.lock();
        let mut state = serializer.serialize_struct("Account", 3)?;
        state.serialize_field("account", &data.id)?;
        state.serialize_field("role", &data.role)?;
        state.serialize_field(
            "balance",
            &data.balance.round_dp(Account::DECIMAL_PRECISION),
        )?;
        state.end()
    }
}
