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

//! Error types for wallet and settlement operations.

use crate::base::{AccountId, OrderId, Role};
use crate::order::OrderStatus;
use thiserror::Error;

/// Ledger operation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Referenced account does not exist
    #[error("account {0} not found")]
    AccountNotFound(AccountId),

    /// Referenced order does not exist
    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    /// Amount is zero, negative, or otherwise unusable
    #[error("invalid amount (must be positive)")]
    InvalidAmount,

    /// Operation would drive a balance below zero
    #[error("insufficient funds in account {0}")]
    InsufficientFunds(AccountId),

    /// Amount arithmetic exceeded the representable decimal range
    #[error("amount out of range")]
    AmountOverflow,

    /// Only pending orders can be settled
    #[error("order {0} cannot be settled while {1}")]
    OrderNotSettleable(OrderId, OrderStatus),

    /// Order status can only move forward one step at a time
    #[error("order cannot move from {from} to {to}")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },

    /// Account id is already registered
    #[error("account {0} already exists")]
    DuplicateAccount(AccountId),

    /// The platform role and id are reserved
    #[error("platform account is reserved")]
    InvalidRole,

    /// Account plays a different part than the order requires
    #[error("account {account} is not a {expected}")]
    RoleMismatch { account: AccountId, expected: Role },
}

impl LedgerError {
    /// True for the "not found" family of errors.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::AccountNotFound(_) | Self::OrderNotFound(_))
    }
}
