//! A workbook paired with its command history.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use tabula_core::Selection;
use tabula_engine::{SheetId, Workbook};
use tracing::debug;

use crate::action_data::ActionData;
use crate::command::{Command, CommandHandle};
use crate::error::CommandError;
use crate::manager::{CommandManager, HistoryStep};
use crate::sheet_ops::{Freeze, RangeOps};

/// Follow-up commands deferred until the current operation has returned.
///
/// Observer callbacks cannot call back into the manager (it is busy delivering
/// to them), so they push here instead; `Document::run_queued` drains it.
#[derive(Debug, Clone, Default)]
pub struct CommandQueue(Rc<RefCell<VecDeque<Command>>>);

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, command: impl Into<Command>) {
        self.0.borrow_mut().push_back(command.into());
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    fn pop(&self) -> Option<Command> {
        self.0.borrow_mut().pop_front()
    }
}

#[derive(Debug, Default)]
pub struct Document {
    workbook: Workbook,
    commands: CommandManager,
    queue: CommandQueue,
}

impl Document {
    pub fn new(workbook: Workbook) -> Self {
        Self { workbook, commands: CommandManager::new(), queue: CommandQueue::new() }
    }

    pub fn with_max_depth(workbook: Workbook, max_depth: Option<usize>) -> Self {
        Self {
            workbook,
            commands: CommandManager::with_max_depth(max_depth),
            queue: CommandQueue::new(),
        }
    }

    pub fn workbook(&self) -> &Workbook {
        &self.workbook
    }

    /// Direct access, outside history. Used for sheet management.
    pub fn workbook_mut(&mut self) -> &mut Workbook {
        &mut self.workbook
    }

    pub fn commands(&self) -> &CommandManager {
        &self.commands
    }

    pub fn commands_mut(&mut self) -> &mut CommandManager {
        &mut self.commands
    }

    pub fn into_workbook(self) -> Workbook {
        self.workbook
    }

    /// Invoke a single action as its own history entry.
    pub fn submit(&mut self, action: ActionData) -> Result<CommandHandle, CommandError> {
        self.invoke(Command::new(action))
    }

    pub fn invoke(&mut self, command: Command) -> Result<CommandHandle, CommandError> {
        self.commands.invoke(&mut self.workbook, command)
    }

    pub fn undo(&mut self) -> Result<HistoryStep, CommandError> {
        self.commands.undo(&mut self.workbook)
    }

    pub fn redo(&mut self) -> Result<HistoryStep, CommandError> {
        self.commands.redo(&mut self.workbook)
    }

    pub fn can_undo(&self) -> bool {
        self.commands.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.commands.can_redo()
    }

    pub fn freeze(&mut self, sheet_id: SheetId) -> Freeze<'_> {
        Freeze::new(self, sheet_id)
    }

    pub fn range(&mut self, sheet_id: SheetId, selection: impl Into<Selection>) -> RangeOps<'_> {
        RangeOps::new(self, sheet_id, selection.into())
    }

    /// A handle observers can push follow-up commands into.
    pub fn queue(&self) -> CommandQueue {
        self.queue.clone()
    }

    /// Invoke queued commands in FIFO order, including any queued while
    /// draining. Each result is returned in order.
    pub fn run_queued(&mut self) -> Vec<Result<CommandHandle, CommandError>> {
        let mut results = Vec::new();
        while let Some(command) = self.queue.pop() {
            results.push(self.invoke(command));
        }
        if !results.is_empty() {
            debug!(count = results.len(), "ran queued commands");
        }
        results
    }
}
