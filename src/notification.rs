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

//! Wallet notifications.
//!
//! Each [`Ledger`](crate::Ledger) owns its own queue; there is no process-wide
//! notification state.

use crate::base::AccountId;
use chrono::{DateTime, Utc};
use crossbeam::queue::SegQueue;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub account_id: AccountId,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// A lock-free FIFO of pending notifications.
///
/// Any number of threads may push; consumers take everything queued so far
/// with [`NotificationQueue::drain`].
#[derive(Debug)]
pub struct NotificationQueue {
    last_id: AtomicU64,
    queue: SegQueue<Notification>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self {
            last_id: AtomicU64::new(0),
            queue: SegQueue::new(),
        }
    }

    /// Queues a message for `account_id` and returns its id.
    pub fn push(&self, account_id: AccountId, message: impl Into<String>) -> u64 {
        let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.queue.push(Notification {
            id,
            account_id,
            message: message.into(),
            created_at: Utc::now(),
        });
        id
    }

    /// Removes and returns every queued notification in push order.
    pub fn drain(&self) -> Vec<Notification> {
        let mut drained = Vec::with_capacity(self.queue.len());
        while let Some(notification) = self.queue.pop() {
            drained.push(notification);
        }
        drained
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new()
    }
}
