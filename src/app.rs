use ratatui::widgets::ListState;

use crate::coordinator::ViewSnapshot;
use crate::dispatch::{Intent, ViewMsg};
use crate::source::{Employee, Transaction};

pub struct App {
    /// Latest coordinator snapshot, refreshed every tick.
    pub view: ViewSnapshot,
    /// Highlighted transaction.
    pub list_state: ListState,
    /// Employee picker, when open.
    pub picker: Option<ListState>,
    /// The entry last chosen in the picker.
    pub filter: Employee,
    /// Whether the user has requested to quit.
    pub quit: bool,
    /// Last intent outcome.
    pub status: String,
}

impl App {
    pub fn new() -> Self {
        Self {
            view: ViewSnapshot::default(),
            list_state: ListState::default(),
            picker: None,
            filter: Employee::all(),
            quit: false,
            status: "Starting…".into(),
        }
    }

    pub fn transactions(&self) -> &[Transaction] {
        self.view.transactions.as_deref().unwrap_or_default()
    }

    /// Replace the view and keep the highlight inside the new list.
    pub fn apply_snapshot(&mut self, view: ViewSnapshot) {
        self.view = view;
        let len = self.transactions().len();
        match self.list_state.selected() {
            Some(_) if len == 0 => self.list_state.select(None),
            Some(i) if i >= len => self.list_state.select(Some(len - 1)),
            _ => {}
        }
    }

    pub fn handle_msg(&mut self, msg: ViewMsg) {
        self.status = match msg {
            ViewMsg::Done(label) => label,
            ViewMsg::Error(e) => format!("Error: {e}"),
        };
    }

    pub fn selected_transaction(&self) -> Option<&Transaction> {
        self.list_state
            .selected()
            .and_then(|i| self.transactions().get(i))
    }

    // -- navigation ----------------------------------------------------------

    pub fn select_next(&mut self) {
        let len = self.transactions().len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(len - 1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        if self.transactions().is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_first(&mut self) {
        if !self.transactions().is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        let len = self.transactions().len();
        if len > 0 {
            self.list_state.select(Some(len - 1));
        }
    }

    // -- employee picker -----------------------------------------------------

    /// The sentinel followed by the directory.  Empty until the directory loads.
    pub fn picker_items(&self) -> Vec<Employee> {
        match &self.view.employees {
            Some(employees) => std::iter::once(Employee::all())
                .chain(employees.iter().cloned())
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn open_picker(&mut self) {
        let items = self.picker_items();
        if items.is_empty() {
            self.status = "Loading employees…".into();
            return;
        }
        let current = items.iter().position(|e| e.id == self.filter.id).unwrap_or(0);
        self.picker = Some(ListState::default().with_selected(Some(current)));
    }

    pub fn picker_move(&mut self, down: bool) {
        let len = self.picker_items().len();
        if let Some(state) = self.picker.as_mut() {
            let i = state.selected().unwrap_or(0);
            let i = if down {
                (i + 1).min(len.saturating_sub(1))
            } else {
                i.saturating_sub(1)
            };
            state.select(Some(i));
        }
    }

    /// Close the picker without choosing.
    pub fn cancel_picker(&mut self) -> Intent {
        self.picker = None;
        Intent::Select(None)
    }

    pub fn confirm_picker(&mut self) -> Option<Intent> {
        let index = self.picker.take()?.selected()?;
        let chosen = self.picker_items().into_iter().nth(index)?;
        self.filter = chosen.clone();
        self.list_state.select(None);
        Some(Intent::Select(Some(chosen)))
    }

    // -- actions -------------------------------------------------------------

    /// "View more" is only actionable while visible and enabled.
    pub fn view_more(&self) -> Option<Intent> {
        (self.view.view_more_visible && self.view.view_more_enabled).then_some(Intent::LoadMore)
    }

    pub fn toggle_approval(&self) -> Option<Intent> {
        self.selected_transaction().map(|txn| Intent::SetApproval {
            transaction_id: txn.id.clone(),
            approved: !txn.approved,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::ViewPhase;
    use crate::source::Dataset;

    fn snapshot(count: usize) -> ViewSnapshot {
        let dataset = Dataset::demo().unwrap();
        ViewSnapshot {
            phase: ViewPhase::ShowingAll,
            transactions: Some(dataset.transactions.into_iter().take(count).collect()),
            has_more: true,
            view_more_visible: true,
            view_more_enabled: true,
            employees: Some(dataset.employees),
            ..ViewSnapshot::default()
        }
    }

    fn app_with(count: usize) -> App {
        let mut app = App::new();
        app.apply_snapshot(snapshot(count));
        app
    }

    // -- construction --------------------------------------------------------

    #[test]
    fn new_app_starts_empty() {
        let app = App::new();
        assert!(app.transactions().is_empty());
        assert!(!app.quit);
        assert!(app.list_state.selected().is_none());
        assert!(app.filter.is_all());
    }

    // -- apply_snapshot ------------------------------------------------------

    #[test]
    fn shrinking_list_clamps_selection() {
        let mut app = app_with(5);
        app.select_last();
        app.apply_snapshot(snapshot(2));
        assert_eq!(app.list_state.selected(), Some(1));
    }

    #[test]
    fn emptied_list_clears_selection() {
        let mut app = app_with(5);
        app.select_first();
        app.apply_snapshot(ViewSnapshot::default());
        assert!(app.list_state.selected().is_none());
    }

    // -- navigation ----------------------------------------------------------

    #[test]
    fn select_next_on_empty_is_noop() {
        let mut app = App::new();
        app.select_next();
        assert!(app.list_state.selected().is_none());
    }

    #[test]
    fn select_previous_on_empty_is_noop() {
        let mut app = App::new();
        app.select_previous();
        assert!(app.list_state.selected().is_none());
    }

    #[test]
    fn select_next_starts_at_zero_then_advances() {
        let mut app = app_with(3);
        app.select_next();
        assert_eq!(app.list_state.selected(), Some(0));
        app.select_next();
        assert_eq!(app.list_state.selected(), Some(1));
    }

    #[test]
    fn select_next_clamps_at_last_item() {
        let mut app = app_with(3);
        app.select_last();
        app.select_next();
        assert_eq!(app.list_state.selected(), Some(2));
    }

    #[test]
    fn select_previous_clamps_at_zero() {
        let mut app = app_with(3);
        app.select_first();
        app.select_previous();
        assert_eq!(app.list_state.selected(), Some(0));
    }

    // -- picker --------------------------------------------------------------

    #[test]
    fn picker_lists_sentinel_first() {
        let app = app_with(3);
        let items = app.picker_items();
        assert!(items[0].is_all());
        assert_eq!(items.len(), 5);
    }

    #[test]
    fn picker_does_not_open_before_directory_loads() {
        let mut app = App::new();
        app.open_picker();
        assert!(app.picker.is_none());
        assert_eq!(app.status, "Loading employees…");
    }

    #[test]
    fn confirming_picker_selects_employee() {
        let mut app = app_with(3);
        app.open_picker();
        app.picker_move(true);

        let intent = app.confirm_picker().unwrap();

        let Intent::Select(Some(employee)) = intent else {
            panic!("expected a selection");
        };
        assert_eq!(employee.id, "e1");
        assert_eq!(app.filter.id, "e1");
        assert!(app.picker.is_none());
    }

    #[test]
    fn cancelling_picker_yields_no_choice() {
        let mut app = app_with(3);
        app.open_picker();
        assert_eq!(app.cancel_picker(), Intent::Select(None));
        assert!(app.picker.is_none());
    }

    // -- actions -------------------------------------------------------------

    #[test]
    fn view_more_requires_visible_and_enabled() {
        let mut app = app_with(3);
        assert_eq!(app.view_more(), Some(Intent::LoadMore));

        app.view.view_more_enabled = false;
        assert_eq!(app.view_more(), None);

        app.view.view_more_enabled = true;
        app.view.view_more_visible = false;
        assert_eq!(app.view_more(), None);
    }

    #[test]
    fn toggle_approval_flips_selected_transaction() {
        let mut app = app_with(3);
        assert_eq!(app.toggle_approval(), None);

        app.select_first();
        let txn = app.transactions()[0].clone();
        assert_eq!(
            app.toggle_approval(),
            Some(Intent::SetApproval {
                transaction_id: txn.id,
                approved: !txn.approved,
            })
        );
    }

    #[test]
    fn errors_are_prefixed_in_status() {
        let mut app = App::new();
        app.handle_msg(ViewMsg::Error("boom".into()));
        assert_eq!(app.status, "Error: boom");
    }
}
