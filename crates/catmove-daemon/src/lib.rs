// SPDX-FileCopyrightText: 2026 Catmove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reconciliation cycle and scheduler for the category update producer.
//!
//! [`CycleRunner`] runs one pass over the ready queue, [`Scheduler`] repeats
//! it on a fixed interval and [`shutdown`] turns process signals into a
//! cancellation token for the driver.

pub mod cycle;
pub mod resolver;
pub mod scheduler;
pub mod shutdown;

pub use cycle::{CycleReport, CycleRunner, CycleSettings, EntryOutcome, SkipReason};
pub use resolver::resolve_category;
pub use scheduler::{Scheduler, SchedulerState};
pub use shutdown::install_signal_handler;
