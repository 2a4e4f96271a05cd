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

//! # Arewa Ledger
//!
//! Wallet ledger and order settlement for a delivery platform where customers
//! buy from vendors and riders deliver.
//!
//! ## Core Components
//!
//! - [`Ledger`]: Application context owning accounts, orders and the transaction log
//! - [`Account`]: Wallet with a non-negative balance and its own lock
//! - [`TransactionLog`]: Append-only history of every balance movement
//! - [`Order`]: Purchase moving from pending to paid to delivered
//! - [`SettlementSplit`]: Vendor/rider/platform distribution of an order
//! - [`LedgerError`]: Error types for ledger operations
//!
//! ## Example
//!
//! ```
//! use arewa_ledger::{AccountId, Ledger, Role, TransactionKind};
//! use rust_decimal_macros::dec;
//!
//! let ledger = Ledger::new();
//! let customer = ledger.open_account(Role::Customer).unwrap();
//! let vendor = ledger.open_account(Role::Vendor).unwrap();
//! let rider = ledger.open_account(Role::Rider).unwrap();
//!
//! // The rider's notification fee exceeds a 5% cut of a 200 delivery fee.
//! ledger
//!     .apply_wallet_transaction(rider, dec!(50.00), TransactionKind::Credit)
//!     .unwrap();
//!
//! let order = ledger
//!     .create_order(customer, vendor, rider, dec!(1000), dec!(200))
//!     .unwrap();
//! let split = ledger.settle_order(order).unwrap();
//!
//! assert_eq!(split.vendor_net, dec!(900));
//! assert_eq!(ledger.get_balance(rider).unwrap(), dec!(40.00));
//! assert_eq!(ledger.get_balance(AccountId::PLATFORM).unwrap(), dec!(310));
//! ```
//!
//! ## Thread Safety
//!
//! The ledger handles concurrent access. Settlements of different orders run in
//! parallel and serialize only on the accounts they share; settling the same
//! order twice, concurrently or not, succeeds once.

pub mod account;
mod base;
pub mod error;
mod ledger;
mod notification;
mod order;
pub mod settlement;
mod transaction;
mod transaction_log;

pub use account::Account;
pub use base::{AccountId, OrderId, Role, TransactionId};
pub use error::LedgerError;
pub use ledger::{Ledger, Wallet};
pub use notification::{Notification, NotificationQueue};
pub use order::{Order, OrderStatus};
pub use settlement::SettlementSplit;
pub use transaction::{
    MANUAL, PLATFORM_COMMISSION, RIDER_PAYMENT, Transaction, TransactionKind, VENDOR_PAYMENT,
};
pub use transaction_log::TransactionLog;
