//! Reversible, observable workbook mutations with linear undo/redo.
//!
//! ```text
//! Command ──invoke──▶ CommandManager ──create──▶ Action ──apply──▶ Workbook
//!                          │                        │
//!                     undo / redo              ActionObservers
//! ```

pub mod action;
pub mod action_data;
pub mod actions;
pub mod command;
pub mod document;
pub mod error;
pub mod manager;
pub mod observers;
pub mod sheet_ops;

pub use action::{Action, ActionId};
pub use action_data::{ActionData, ActionKind, ActionPayload};
pub use command::{Command, CommandHandle};
pub use document::{CommandQueue, Document};
pub use error::{CommandError, ValidationError};
pub use manager::{CommandManager, HistoryEntry, HistoryStep, Subscription, DEFAULT_MAX_DEPTH};
pub use observers::{ActionEvent, ActionEventKind, ActionObservers, EventCollector, RecordedEvent, SubscriptionId};
pub use sheet_ops::{BorderType, Freeze, MergeMode, RangeOps};
