//! Undo/redo history.
//!
//! The manager is the only place actions are constructed. It owns two stacks
//! of entries (one entry per invoked `Command`) and moves entries between them
//! on undo and redo. History is linear: a successful invoke discards the redo
//! stack.

use std::collections::VecDeque;
use std::rc::Rc;

use tabula_engine::{SheetNotFound, Workbook};
use tracing::{debug, error, warn};

use crate::action::{Action, ActionId};
use crate::command::{Command, CommandHandle};
use crate::error::{CommandError, ValidationError};
use crate::observers::{ActionEvent, ActionObservers, SubscriptionId};

/// Entries kept on the undo stack unless configured otherwise.
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Outcome of an undo or redo request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryStep {
    Applied(CommandHandle),
    /// Nothing to undo (or redo). Not an error.
    EmptyHistory,
}

impl HistoryStep {
    pub fn is_applied(&self) -> bool {
        matches!(self, HistoryStep::Applied(_))
    }
}

#[derive(Debug)]
pub struct HistoryEntry {
    handle: CommandHandle,
    label: Option<String>,
    actions: Vec<Action>,
}

impl HistoryEntry {
    pub fn handle(&self) -> CommandHandle {
        self.handle
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Every sheet the entry touches must still exist before any constituent runs.
    fn check_targets(&self, workbook: &Workbook) -> Result<(), SheetNotFound> {
        match self.actions.iter().find(|a| !workbook.contains_sheet(a.sheet_id())) {
            Some(action) => Err(SheetNotFound(action.sheet_id())),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Channel {
    Action(ActionId),
    All,
}

/// Handle returned by `subscribe`/`subscribe_all`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    channel: Channel,
    id: SubscriptionId,
}

#[derive(Debug)]
pub struct CommandManager {
    undo_stack: VecDeque<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
    max_depth: Option<usize>,
    next_entry: u64,
    next_action: u64,
    observers: Rc<ActionObservers>,
}

impl Default for CommandManager {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandManager {
    pub fn new() -> Self {
        Self::with_max_depth(Some(DEFAULT_MAX_DEPTH))
    }

    /// `None` keeps every entry.
    pub fn with_max_depth(max_depth: Option<usize>) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_depth,
            next_entry: 1,
            next_action: 1,
            observers: Rc::new(ActionObservers::new()),
        }
    }

    /// Perform every action of `command` and record it as one entry.
    ///
    /// If a constituent fails validation, the ones already performed are
    /// undone in reverse order and nothing is recorded. Redo events are held
    /// until every constituent has been applied, so a rejected command is
    /// never observed.
    pub fn invoke(&mut self, workbook: &mut Workbook, command: Command) -> Result<CommandHandle, CommandError> {
        let (label, data) = command.into_parts();
        if data.is_empty() {
            warn!("rejected empty command");
            return Err(ValidationError::EmptyCommand.into());
        }

        let mut actions: Vec<Action> = Vec::with_capacity(data.len());
        for (index, data) in data.into_iter().enumerate() {
            let id = ActionId::new(self.next_action);
            self.next_action += 1;
            let kind = data.kind();

            match Action::create_silent(id, data, workbook, Some(Rc::clone(&self.observers))) {
                Ok(action) => actions.push(action),
                Err(err) => {
                    warn!(index, %kind, error = %err, rolled_back = actions.len(), "action rejected");
                    for action in actions.iter_mut().rev() {
                        if let Err(missing) = action.revert(workbook) {
                            error!(action = %action.id(), error = %missing, "rollback could not reach sheet");
                        }
                    }
                    return Err(err.into());
                }
            }
        }

        for action in &actions {
            action.announce();
        }

        let handle = CommandHandle::new(self.next_entry);
        self.next_entry += 1;
        debug!(
            entry = %handle,
            label = label.as_deref().unwrap_or(""),
            actions = actions.len(),
            first = %actions[0].kind(),
            "invoked"
        );

        self.undo_stack.push_back(HistoryEntry { handle, label, actions });
        self.redo_stack.clear();
        self.enforce_depth();
        Ok(handle)
    }

    /// Undo the most recent entry.
    pub fn undo(&mut self, workbook: &mut Workbook) -> Result<HistoryStep, CommandError> {
        let Some(mut entry) = self.undo_stack.pop_back() else {
            return Ok(HistoryStep::EmptyHistory);
        };

        let result = entry
            .check_targets(workbook)
            .and_then(|()| entry.actions.iter_mut().rev().try_for_each(|a| a.undo(workbook)));
        if let Err(source) = result {
            return Err(Self::dropped(entry.handle, source));
        }

        debug!(entry = %entry.handle, actions = entry.actions.len(), "undone");
        let handle = entry.handle;
        self.redo_stack.push(entry);
        Ok(HistoryStep::Applied(handle))
    }

    /// Redo the most recently undone entry.
    pub fn redo(&mut self, workbook: &mut Workbook) -> Result<HistoryStep, CommandError> {
        let Some(mut entry) = self.redo_stack.pop() else {
            return Ok(HistoryStep::EmptyHistory);
        };

        let result = entry
            .check_targets(workbook)
            .and_then(|()| entry.actions.iter_mut().try_for_each(|a| a.redo(workbook)));
        if let Err(source) = result {
            return Err(Self::dropped(entry.handle, source));
        }

        debug!(entry = %entry.handle, actions = entry.actions.len(), "redone");
        let handle = entry.handle;
        self.undo_stack.push_back(entry);
        self.enforce_depth();
        Ok(HistoryStep::Applied(handle))
    }

    fn dropped(entry: CommandHandle, source: SheetNotFound) -> CommandError {
        error!(%entry, error = %source, "history entry targets a missing sheet; dropped");
        CommandError::TargetNotFound { entry, source }
    }

    fn enforce_depth(&mut self) {
        let Some(max) = self.max_depth else { return };
        while self.undo_stack.len() > max {
            if let Some(evicted) = self.undo_stack.pop_front() {
                debug!(entry = %evicted.handle, max, "evicted oldest history entry");
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Change the cap, evicting the oldest entries if already over it.
    pub fn set_max_depth(&mut self, max_depth: Option<usize>) {
        self.max_depth = max_depth;
        self.enforce_depth();
    }

    /// Drop all history. The workbook is left as it is.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// The entry `undo` would act on next.
    pub fn peek_undo(&self) -> Option<&HistoryEntry> {
        self.undo_stack.back()
    }

    /// The entry `redo` would act on next.
    pub fn peek_redo(&self) -> Option<&HistoryEntry> {
        self.redo_stack.last()
    }

    pub fn entry(&self, handle: CommandHandle) -> Option<&HistoryEntry> {
        self.entries().find(|e| e.handle == handle)
    }

    /// Look up a live action (one still on either stack).
    pub fn action(&self, id: ActionId) -> Option<&Action> {
        self.entries().flat_map(|e| e.actions.iter()).find(|a| a.id() == id)
    }

    fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.undo_stack.iter().chain(self.redo_stack.iter())
    }

    /// Subscribe to one live action's events. `None` if the action is gone.
    pub fn subscribe(&self, id: ActionId, handler: impl FnMut(&ActionEvent<'_>) + 'static) -> Option<Subscription> {
        let action = self.action(id)?;
        Some(Subscription {
            channel: Channel::Action(id),
            id: action.observers().subscribe(handler),
        })
    }

    /// Subscribe to the events of every action this manager creates.
    pub fn subscribe_all(&self, handler: impl FnMut(&ActionEvent<'_>) + 'static) -> Subscription {
        Subscription {
            channel: Channel::All,
            id: self.observers.subscribe(handler),
        }
    }

    pub fn unsubscribe(&self, subscription: &Subscription) -> bool {
        match subscription.channel {
            Channel::All => self.observers.unsubscribe(subscription.id),
            Channel::Action(id) => self
                .action(id)
                .is_some_and(|action| action.observers().unsubscribe(subscription.id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action_data::ActionData;
    use tabula_engine::SheetId;

    fn rows(n: i64) -> Command {
        Command::new(ActionData::set_frozen_rows(SheetId(1), n))
    }

    #[test]
    fn test_empty_stacks() {
        let mut wb = Workbook::new();
        let mut manager = CommandManager::new();
        assert!(!manager.can_undo());
        assert!(!manager.can_redo());
        assert_eq!(manager.undo(&mut wb).unwrap(), HistoryStep::EmptyHistory);
        assert_eq!(manager.redo(&mut wb).unwrap(), HistoryStep::EmptyHistory);
    }

    #[test]
    fn test_empty_command_rejected() {
        let mut wb = Workbook::new();
        let mut manager = CommandManager::new();
        let err = manager.invoke(&mut wb, Command::default()).unwrap_err();
        assert_eq!(err, CommandError::Validation(ValidationError::EmptyCommand));
        assert!(!manager.can_undo());
    }

    #[test]
    fn test_depth_cap_evicts_oldest() {
        let mut wb = Workbook::new();
        let mut manager = CommandManager::with_max_depth(Some(2));
        let first = manager.invoke(&mut wb, rows(1)).unwrap();
        let second = manager.invoke(&mut wb, rows(2)).unwrap();
        let third = manager.invoke(&mut wb, rows(3)).unwrap();

        assert_eq!(manager.undo_depth(), 2);
        assert!(manager.entry(first).is_none());
        assert!(manager.entry(second).is_some());

        assert_eq!(manager.undo(&mut wb).unwrap(), HistoryStep::Applied(third));
        assert_eq!(manager.undo(&mut wb).unwrap(), HistoryStep::Applied(second));
        assert_eq!(manager.undo(&mut wb).unwrap(), HistoryStep::EmptyHistory);
        // The evicted entry's change stays applied.
        assert_eq!(wb.sheet_by_id(SheetId(1)).unwrap().frozen_rows(), 1);
    }

    #[test]
    fn test_shrinking_depth_trims_immediately() {
        let mut wb = Workbook::new();
        let mut manager = CommandManager::with_max_depth(None);
        for n in 1..=5 {
            manager.invoke(&mut wb, rows(n)).unwrap();
        }
        manager.set_max_depth(Some(1));
        assert_eq!(manager.undo_depth(), 1);
        assert_eq!(manager.max_depth(), Some(1));
    }

    #[test]
    fn test_subscribe_to_live_action_only() {
        let mut wb = Workbook::new();
        let mut manager = CommandManager::new();
        let handle = manager.invoke(&mut wb, rows(2)).unwrap();
        let id = manager.entry(handle).unwrap().actions()[0].id();

        let sub = manager.subscribe(id, |_| {}).unwrap();
        assert!(manager.unsubscribe(&sub));
        assert!(!manager.unsubscribe(&sub));

        manager.clear();
        assert!(manager.subscribe(id, |_| {}).is_none());
    }

    #[test]
    fn test_peek_follows_stacks() {
        let mut wb = Workbook::new();
        let mut manager = CommandManager::new();
        let handle = manager.invoke(&mut wb, rows(2).with_label("Freeze rows")).unwrap();
        assert_eq!(manager.peek_undo().map(|e| e.handle()), Some(handle));
        assert_eq!(manager.peek_undo().and_then(|e| e.label()), Some("Freeze rows"));

        manager.undo(&mut wb).unwrap();
        assert!(manager.peek_undo().is_none());
        assert_eq!(manager.peek_redo().map(|e| e.handle()), Some(handle));
    }
}
