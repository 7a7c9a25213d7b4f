//! A single reversible mutation.
//!
//! `do_data` is what the action writes; `old_data` is what it overwrote the
//! last time it ran forward. Both sides are produced by the same primitive
//! (`SheetMutation::apply`), so perform, redo and undo differ only in which
//! side they apply and which event they fire.

use std::fmt;
use std::rc::Rc;

use tabula_engine::{SheetId, SheetNotFound, Workbook};

use crate::action_data::{ActionData, ActionKind};
use crate::error::ValidationError;
use crate::observers::{ActionEvent, ActionEventKind, ActionObservers};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionId(u64);

impl ActionId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a{}", self.0)
    }
}

pub struct Action {
    id: ActionId,
    do_data: ActionData,
    old_data: ActionData,
    observers: ActionObservers,
}

impl Action {
    /// Validate `data` against the workbook, then perform it once.
    ///
    /// Nothing is written when validation fails.
    pub fn create(
        id: ActionId,
        data: ActionData,
        workbook: &mut Workbook,
        forward: Option<Rc<ActionObservers>>,
    ) -> Result<Action, ValidationError> {
        let action = Action::create_silent(id, data, workbook, forward)?;
        action.announce();
        Ok(action)
    }

    /// Like `create`, but the Redo event is held back until `announce`.
    pub(crate) fn create_silent(
        id: ActionId,
        data: ActionData,
        workbook: &mut Workbook,
        forward: Option<Rc<ActionObservers>>,
    ) -> Result<Action, ValidationError> {
        Action::validate(&data, workbook)?;

        let observers = match forward {
            Some(parent) => ActionObservers::forwarding_to(parent),
            None => ActionObservers::new(),
        };
        let mut action = Action {
            id,
            old_data: data.clone(),
            do_data: data,
            observers,
        };
        action
            .apply_forward(workbook)
            .map_err(|SheetNotFound(sheet)| ValidationError::UnknownSheet(sheet))?;
        Ok(action)
    }

    /// Precondition gate. Runs strictly before any mutation.
    pub fn validate(data: &ActionData, workbook: &Workbook) -> Result<(), ValidationError> {
        let sheet = workbook
            .sheet_by_id(data.sheet_id)
            .ok_or(ValidationError::UnknownSheet(data.sheet_id))?;
        data.payload.mutation().validate(sheet)
    }

    /// Apply `do_data`, capturing the overwritten state into `old_data`.
    /// Returns the captured state.
    pub fn perform(&mut self, workbook: &mut Workbook) -> Result<ActionData, SheetNotFound> {
        self.apply_forward(workbook)?;
        self.announce();
        Ok(self.old_data.clone())
    }

    pub fn redo(&mut self, workbook: &mut Workbook) -> Result<(), SheetNotFound> {
        self.perform(workbook).map(|_| ())
    }

    /// Restore `old_data`, refreshing `do_data` from what it replaces.
    pub fn undo(&mut self, workbook: &mut Workbook) -> Result<(), SheetNotFound> {
        self.apply_backward(workbook)?;
        self.notify(ActionEventKind::Undo);
        Ok(())
    }

    /// Undo without firing an event. Used to roll back an action whose Redo
    /// was never announced.
    pub(crate) fn revert(&mut self, workbook: &mut Workbook) -> Result<(), SheetNotFound> {
        self.apply_backward(workbook)
    }

    /// Fire the Redo event for the current `do_data`.
    pub(crate) fn announce(&self) {
        self.notify(ActionEventKind::Redo);
    }

    fn apply_forward(&mut self, workbook: &mut Workbook) -> Result<(), SheetNotFound> {
        let sheet = workbook.resolve_sheet(self.do_data.sheet_id)?;
        let inverse = self.do_data.payload.mutation().apply(sheet);
        self.old_data = ActionData::new(self.do_data.sheet_id, inverse);
        Ok(())
    }

    fn apply_backward(&mut self, workbook: &mut Workbook) -> Result<(), SheetNotFound> {
        let sheet = workbook.resolve_sheet(self.old_data.sheet_id)?;
        let inverse = self.old_data.payload.mutation().apply(sheet);
        self.do_data = ActionData::new(self.old_data.sheet_id, inverse);
        Ok(())
    }

    fn notify(&self, kind: ActionEventKind) {
        let data = match kind {
            ActionEventKind::Redo => &self.do_data,
            ActionEventKind::Undo => &self.old_data,
        };
        self.observers.notify(&ActionEvent { kind, data, action: self.id });
    }

    pub fn id(&self) -> ActionId {
        self.id
    }

    pub fn kind(&self) -> ActionKind {
        self.do_data.kind()
    }

    pub fn sheet_id(&self) -> SheetId {
        self.do_data.sheet_id
    }

    pub fn do_data(&self) -> &ActionData {
        &self.do_data
    }

    pub fn old_data(&self) -> &ActionData {
        &self.old_data
    }

    pub fn observers(&self) -> &ActionObservers {
        &self.observers
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("id", &self.id)
            .field("do_data", &self.do_data)
            .field("old_data", &self.old_data)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observers::EventCollector;

    #[test]
    fn test_create_performs_once_and_captures_old_value() {
        let mut wb = Workbook::new();
        let action = Action::create(ActionId::new(1), ActionData::set_sheet_name(SheetId(1), "Budget"), &mut wb, None).unwrap();

        assert_eq!(wb.sheet_by_id(SheetId(1)).unwrap().name(), "Budget");
        assert_eq!(action.old_data(), &ActionData::set_sheet_name(SheetId(1), "Sheet1"));
        assert_eq!(action.kind(), ActionKind::SetSheetName);
    }

    #[test]
    fn test_validation_failure_leaves_workbook_untouched() {
        let mut wb = Workbook::new();
        let before = wb.clone();

        let err = Action::create(ActionId::new(1), ActionData::set_frozen_rows(SheetId(1), -1), &mut wb, None).unwrap_err();
        assert!(matches!(err, ValidationError::FreezeOutOfRange { .. }));

        let err = Action::create(ActionId::new(2), ActionData::set_frozen_rows(SheetId(9), 1), &mut wb, None).unwrap_err();
        assert_eq!(err, ValidationError::UnknownSheet(SheetId(9)));
        assert_eq!(wb, before);
    }

    #[test]
    fn test_undo_redo_cycle_refreshes_both_sides() {
        let mut wb = Workbook::new();
        let mut action = Action::create(ActionId::new(1), ActionData::set_frozen_rows(SheetId(1), 3), &mut wb, None).unwrap();

        // Changed behind the action's back; undo must capture the live value.
        wb.sheet_by_id_mut(SheetId(1)).unwrap().set_frozen_rows(5);

        action.undo(&mut wb).unwrap();
        assert_eq!(wb.sheet_by_id(SheetId(1)).unwrap().frozen_rows(), 0);
        assert_eq!(action.do_data(), &ActionData::set_frozen_rows(SheetId(1), 5));

        action.redo(&mut wb).unwrap();
        assert_eq!(wb.sheet_by_id(SheetId(1)).unwrap().frozen_rows(), 5);
        assert_eq!(action.old_data(), &ActionData::set_frozen_rows(SheetId(1), 0));
    }

    #[test]
    fn test_events_carry_applied_side() {
        let mut wb = Workbook::new();
        let mut action = Action::create(ActionId::new(4), ActionData::set_frozen_columns(SheetId(1), 2), &mut wb, None).unwrap();
        let collector = EventCollector::new();
        action.observers().subscribe(collector.handler());

        action.undo(&mut wb).unwrap();
        action.redo(&mut wb).unwrap();

        let events = collector.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, ActionEventKind::Undo);
        assert_eq!(events[0].data, ActionData::set_frozen_columns(SheetId(1), 0));
        assert_eq!(events[1].kind, ActionEventKind::Redo);
        assert_eq!(events[1].data, ActionData::set_frozen_columns(SheetId(1), 2));
        assert!(events.iter().all(|e| e.action == ActionId::new(4)));
    }

    #[test]
    fn test_missing_sheet_on_undo() {
        let mut wb = Workbook::new();
        let second = wb.add_sheet_named("Data").unwrap();
        let mut action = Action::create(ActionId::new(1), ActionData::set_frozen_rows(second, 1), &mut wb, None).unwrap();
        wb.delete_sheet(second).unwrap();

        assert_eq!(action.undo(&mut wb), Err(SheetNotFound(second)));
    }

    #[test]
    fn test_silent_create_and_revert_fire_nothing() {
        let mut wb = Workbook::new();
        let parent = Rc::new(ActionObservers::new());
        let collector = EventCollector::new();
        parent.subscribe(collector.handler());

        let mut action =
            Action::create_silent(ActionId::new(1), ActionData::set_frozen_rows(SheetId(1), 2), &mut wb, Some(Rc::clone(&parent)))
                .unwrap();
        assert_eq!(wb.sheet_by_id(SheetId(1)).unwrap().frozen_rows(), 2);
        assert!(collector.is_empty());

        action.revert(&mut wb).unwrap();
        assert_eq!(wb.sheet_by_id(SheetId(1)).unwrap().frozen_rows(), 0);
        assert!(collector.is_empty());

        action.redo(&mut wb).unwrap();
        assert_eq!(collector.redos().len(), 1);
    }
}
