use crate::drag::{apply_drop, DragLocation, DragOutcome, DropResult, Grab};
use crate::error::StoreError;
use crate::form::{Submission, TaskForm};
use crate::notify::Toasts;
use crate::quote::{QuoteSlot, QuoteSource, Resolution};
use crate::storage::Storage;
use crate::store::TaskStore;
use crate::task::{Bucket, Filter, Task};
use chrono::Utc;
use crossterm::event::{KeyCode, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

/// Terminal rows taken by one task card.
pub const CARD_HEIGHT: u16 = 2;

#[derive(Debug, Clone)]
pub enum Mode {
    Normal,
    Form(TaskForm),
    /// Keyboard drag in progress; the cursor marks the drop target.
    Dragging(Grab),
}

/// Where the board columns were last drawn, for mouse hit-testing.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub bucket: Option<Bucket>,
    pub area: Rect,
    pub offset: usize,
}

pub struct App<S: Storage> {
    pub store: TaskStore<S>,
    pub quotes: QuoteSlot,
    pub toasts: Toasts,
    pub mode: Mode,
    /// Selected column (board view only) and row.
    pub bucket: Bucket,
    pub index: usize,
    pub columns: Vec<Column>,
    pub should_quit: bool,
    quote_source: Box<dyn QuoteSource>,
    mouse_drag: Option<Grab>,
    /// Column under the pointer during a mouse drag.
    hover: Option<Bucket>,
}

impl<S: Storage> App<S> {
    pub fn new(store: TaskStore<S>, quote_source: Box<dyn QuoteSource>) -> Self {
        Self {
            store,
            quotes: QuoteSlot::new(),
            toasts: Toasts::new(),
            mode: Mode::Normal,
            bucket: Bucket::Pending,
            index: 0,
            columns: Vec::new(),
            should_quit: false,
            quote_source,
            mouse_drag: None,
            hover: None,
        }
    }

    pub fn is_board(&self) -> bool {
        self.store.filter() == Filter::All
    }

    /// Tasks in the list the cursor is on.
    pub fn current_list(&self) -> Vec<&Task> {
        if self.is_board() {
            self.store.bucket(self.bucket)
        } else {
            self.store.visible()
        }
    }

    pub fn selected(&self) -> Option<&Task> {
        self.current_list().get(self.index).copied()
    }

    pub fn dragging(&self) -> Option<DragLocation> {
        match &self.mode {
            Mode::Dragging(grab) => Some(grab.source),
            _ => self.mouse_drag.as_ref().map(|grab| grab.source),
        }
    }

    /// The column a drop would land in right now.
    pub fn drop_target(&self) -> Option<Bucket> {
        match self.mode {
            Mode::Dragging(_) => Some(self.bucket),
            _ if self.mouse_drag.is_some() => self.hover,
            _ => None,
        }
    }

    pub fn refresh_quote(&mut self) {
        if self.quotes.refresh(self.quote_source.as_mut()) == Resolution::Failed {
            self.toasts.error("Failed to fetch quote");
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        // The board stays frozen while the mouse holds a task; Esc drops it.
        if let Some(grab) = self.mouse_drag.take() {
            if code == KeyCode::Esc {
                self.hover = None;
                self.drop_task(grab.drop_at(None));
            } else {
                self.mouse_drag = Some(grab);
            }
            return;
        }
        match std::mem::replace(&mut self.mode, Mode::Normal) {
            Mode::Normal => self.handle_normal_key(code),
            Mode::Form(form) => self.handle_form_key(form, code),
            Mode::Dragging(grab) => self.handle_drag_key(grab, code),
        }
    }

    fn handle_normal_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('a') => self.mode = Mode::Form(TaskForm::new()),
            KeyCode::Char('e') => {
                if let Some(form) = self.selected().map(TaskForm::from_task) {
                    self.mode = Mode::Form(form);
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => self.delete_selected(),
            KeyCode::Char(' ') | KeyCode::Char('x') => self.toggle_selected(),
            KeyCode::Char('f') => self.set_filter(self.store.filter().next()),
            KeyCode::Char('1') => self.set_filter(Filter::All),
            KeyCode::Char('2') => self.set_filter(Filter::Pending),
            KeyCode::Char('3') => self.set_filter(Filter::Completed),
            KeyCode::Char('g') if self.is_board() => {
                if let Some(id) = self.selected().map(|t| t.id.clone()) {
                    let source = DragLocation::new(self.bucket, self.index);
                    self.mode = Mode::Dragging(Grab::new(source, id));
                }
            }
            KeyCode::Char('r') => self.refresh_quote(),
            code => self.move_cursor(code, false),
        }
    }

    fn handle_form_key(&mut self, mut form: TaskForm, code: KeyCode) {
        match code {
            KeyCode::Esc => return,
            KeyCode::Enter => match form.submit(&self.store, Utc::now()) {
                Ok(submission) => {
                    self.apply_submission(submission);
                    return;
                }
                Err(err) => self.toasts.error(err.to_string()),
            },
            KeyCode::Tab | KeyCode::Down => form.focus = form.focus.next(),
            KeyCode::BackTab | KeyCode::Up => form.focus = form.focus.prev(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(c) => form.push_char(c),
            _ => {}
        }
        self.mode = Mode::Form(form);
    }

    fn handle_drag_key(&mut self, grab: Grab, code: KeyCode) {
        match code {
            KeyCode::Char('g') | KeyCode::Enter => {
                let target = DragLocation::new(self.bucket, self.index);
                self.drop_task(grab.drop_at(Some(target)));
            }
            KeyCode::Esc => self.drop_task(grab.drop_at(None)),
            code => {
                self.move_cursor(code, true);
                self.mode = Mode::Dragging(grab);
            }
        }
    }

    /// Arrow / hjkl navigation. While dragging, the row may sit one past the
    /// end of a column so a drop can land below the last card.
    fn move_cursor(&mut self, code: KeyCode, dragging: bool) {
        match code {
            KeyCode::Left | KeyCode::Char('h') if self.is_board() => {
                self.bucket = Bucket::Pending;
            }
            KeyCode::Right | KeyCode::Char('l') if self.is_board() => {
                self.bucket = Bucket::Completed;
            }
            KeyCode::Up | KeyCode::Char('k') => self.index = self.index.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => self.index += 1,
            _ => return,
        }
        self.clamp_cursor(dragging);
    }

    fn clamp_cursor(&mut self, dragging: bool) {
        let len = self.current_list().len();
        let max = if dragging { len } else { len.saturating_sub(1) };
        self.index = self.index.min(max);
    }

    fn set_filter(&mut self, filter: Filter) {
        self.store.set_filter(filter);
        self.index = 0;
        self.toasts.info(format!("Filtered tasks: {filter}"));
    }

    fn apply_submission(&mut self, submission: Submission) {
        let result = match submission {
            Submission::Add(task) => self
                .store
                .add(task)
                .map(|()| Some("Task added successfully".to_string())),
            // A stale id (deleted meanwhile) is dropped without comment.
            Submission::Edit(task) => self
                .store
                .edit(task)
                .map(|found| found.then(|| "Task updated successfully".to_string())),
        };
        self.report(result);
        self.clamp_cursor(false);
    }

    fn delete_selected(&mut self) {
        let Some(task) = self.selected() else {
            return;
        };
        let (id, title) = (task.id.clone(), task.title.clone());
        match self.store.delete(&id) {
            Ok(true) => self.toasts.info(format!("Task \"{title}\" deleted")),
            Ok(false) => {}
            Err(err) => self.toasts.error(err.to_string()),
        }
        self.clamp_cursor(false);
    }

    fn toggle_selected(&mut self) {
        let Some(task) = self.selected() else {
            return;
        };
        let (id, title) = (task.id.clone(), task.title.clone());
        match self.store.toggle_complete(&id) {
            Ok(Some(completed)) => {
                let status = if completed { Bucket::Completed } else { Bucket::Pending };
                self.toasts
                    .success(format!("Task \"{title}\" marked as {status}"));
            }
            Ok(None) => {}
            Err(err) => self.toasts.error(err.to_string()),
        }
        self.clamp_cursor(false);
    }

    pub fn drop_task(&mut self, result: DropResult) {
        match apply_drop(&mut self.store, &result) {
            Ok(DragOutcome::Toggle { title, to, .. }) => {
                self.toasts.success(format!("Task \"{title}\" marked as {to}"));
                self.bucket = to;
                self.index = 0;
            }
            Ok(DragOutcome::Ignored(_)) => {
                self.bucket = result.source.bucket;
                self.index = result.source.index;
            }
            Err(err) => self.toasts.error(err.to_string()),
        }
        self.clamp_cursor(false);
    }

    /// Mouse drag: press on a card picks it up, release drops it on whatever
    /// column is under the pointer.
    pub fn handle_mouse(&mut self, event: MouseEvent) {
        // Forms and keyboard drags own the input until they finish.
        if !matches!(self.mode, Mode::Normal) {
            return;
        }
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let Some(location) = self.location_at(event.column, event.row) else {
                    return;
                };
                if let Some(bucket) = location.bucket {
                    self.bucket = bucket;
                }
                self.index = location.index;
                self.clamp_cursor(false);
                // Clicks below the last card select it but do not pick it up.
                let Some(bucket) = location.bucket.filter(|_| self.index == location.index) else {
                    return;
                };
                if let Some(id) = self.selected().map(|t| t.id.clone()) {
                    let source = DragLocation::new(bucket, location.index);
                    self.mouse_drag = Some(Grab::new(source, id));
                    self.hover = Some(bucket);
                }
            }
            MouseEventKind::Drag(MouseButton::Left) if self.mouse_drag.is_some() => {
                self.hover = self
                    .location_at(event.column, event.row)
                    .and_then(|hit| hit.bucket);
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let Some(grab) = self.mouse_drag.take() else {
                    return;
                };
                self.hover = None;
                let destination = self
                    .location_at(event.column, event.row)
                    .and_then(|hit| hit.bucket.map(|b| DragLocation::new(b, hit.index)));
                self.drop_task(grab.drop_at(destination));
            }
            MouseEventKind::ScrollUp => self.move_cursor(KeyCode::Up, false),
            MouseEventKind::ScrollDown => self.move_cursor(KeyCode::Down, false),
            _ => {}
        }
    }

    fn location_at(&self, column: u16, row: u16) -> Option<Hit> {
        self.columns.iter().find_map(|c| {
            let inside = column >= c.area.x
                && column < c.area.right()
                && row >= c.area.y
                && row < c.area.bottom();
            inside.then(|| Hit {
                bucket: c.bucket,
                index: c.offset + usize::from((row - c.area.y) / CARD_HEIGHT),
            })
        })
    }

    fn report(&mut self, result: Result<Option<String>, StoreError>) {
        match result {
            Ok(Some(message)) => self.toasts.success(message),
            Ok(None) => {}
            Err(err) => self.toasts.error(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Hit {
    bucket: Option<Bucket>,
    index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Level;
    use crate::quote::{Quote, StaticQuotes};
    use crate::storage::MemoryStorage;
    use crossterm::event::KeyModifiers;

    fn app() -> App<MemoryStorage> {
        let store = TaskStore::open(MemoryStorage::new()).unwrap();
        App::new(store, Box::new(StaticQuotes::default()))
    }

    fn type_text(app: &mut App<MemoryStorage>, text: &str) {
        for c in text.chars() {
            app.handle_key(KeyCode::Char(c));
        }
    }

    fn add(app: &mut App<MemoryStorage>, title: &str) {
        app.handle_key(KeyCode::Char('a'));
        type_text(app, title);
        app.handle_key(KeyCode::Tab);
        app.handle_key(KeyCode::Tab);
        type_text(app, "2030-01-01");
        app.handle_key(KeyCode::Enter);
    }

    fn latest_toast(app: &App<MemoryStorage>) -> String {
        app.toasts.latest().map(|t| t.message.clone()).unwrap_or_default()
    }

    /// Pending cards start at (1, 1), completed cards at (23, 1).
    fn board_columns() -> Vec<Column> {
        vec![
            Column {
                bucket: Some(Bucket::Pending),
                area: Rect::new(1, 1, 20, 10),
                offset: 0,
            },
            Column {
                bucket: Some(Bucket::Completed),
                area: Rect::new(23, 1, 20, 10),
                offset: 0,
            },
        ]
    }

    fn states(app: &App<MemoryStorage>) -> Vec<(String, bool)> {
        app.store
            .tasks()
            .iter()
            .map(|t| (t.title.clone(), t.completed))
            .collect()
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn form_adds_task_and_rejects_duplicate() {
        let mut app = app();
        add(&mut app, "Buy milk");
        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(app.store.len(), 1);
        assert_eq!(latest_toast(&app), "Task added successfully");

        add(&mut app, "buy MILK");
        assert!(matches!(app.mode, Mode::Form(_)));
        assert_eq!(app.store.len(), 1);
        assert_eq!(latest_toast(&app), "A task with this title already exists");

        app.handle_key(KeyCode::Esc);
        assert!(matches!(app.mode, Mode::Normal));
    }

    #[test]
    fn toggle_and_delete_selected() {
        let mut app = app();
        add(&mut app, "Write report");
        app.handle_key(KeyCode::Char(' '));
        assert!(app.store.tasks()[0].completed);
        assert_eq!(latest_toast(&app), "Task \"Write report\" marked as completed");

        app.handle_key(KeyCode::Right);
        app.handle_key(KeyCode::Char('d'));
        assert!(app.store.is_empty());
        assert_eq!(latest_toast(&app), "Task \"Write report\" deleted");
    }

    #[test]
    fn edit_updates_title_in_place() {
        let mut app = app();
        add(&mut app, "first");
        add(&mut app, "second");
        app.handle_key(KeyCode::Char('e'));
        for _ in 0.."first".len() {
            app.handle_key(KeyCode::Backspace);
        }
        type_text(&mut app, "renamed");
        app.handle_key(KeyCode::Enter);
        let titles: Vec<_> = app.store.tasks().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["renamed", "second"]);
    }

    #[test]
    fn keyboard_drag_moves_task_across_buckets() {
        let mut app = app();
        add(&mut app, "one");
        add(&mut app, "two");
        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Char('g'));
        app.handle_key(KeyCode::Right);
        app.handle_key(KeyCode::Char('g'));
        assert!(!app.store.tasks()[0].completed);
        assert!(app.store.tasks()[1].completed);
        assert_eq!(app.bucket, Bucket::Completed);

        // Reorder inside one bucket is accepted but changes nothing.
        app.handle_key(KeyCode::Left);
        app.handle_key(KeyCode::Char('g'));
        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Char('g'));
        assert!(!app.store.tasks()[0].completed);
    }

    #[test]
    fn mouse_drag_uses_recorded_columns() {
        let mut app = app();
        add(&mut app, "one");
        app.columns = board_columns();

        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 5, 1));
        assert!(app.dragging().is_some());
        app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 30, 4));
        assert!(app.store.tasks()[0].completed);

        // Released outside every column: cancelled.
        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 25, 2));
        app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 60, 30));
        assert!(app.store.tasks()[0].completed);
        assert!(app.dragging().is_none());
    }

    #[test]
    fn filter_keys_switch_views() {
        let mut app = app();
        add(&mut app, "one");
        app.handle_key(KeyCode::Char('3'));
        assert!(!app.is_board());
        assert!(app.selected().is_none());
        assert_eq!(latest_toast(&app), "Filtered tasks: completed");
        app.handle_key(KeyCode::Char('f'));
        assert!(app.is_board());
        // Drag is unavailable outside the board view.
        app.handle_key(KeyCode::Char('2'));
        app.handle_key(KeyCode::Char('g'));
        assert!(matches!(app.mode, Mode::Normal));
    }

    #[test]
    fn quote_refresh_fills_slot() {
        let mut app = app();
        app.handle_key(KeyCode::Char('r'));
        assert!(app.quotes.current().is_some());
    }

    #[test]
    fn quote_failure_shows_fallback_and_toast() {
        let store = TaskStore::open(MemoryStorage::new()).unwrap();
        let mut app = App::new(store, Box::new(StaticQuotes::new(Vec::new())));
        app.refresh_quote();
        assert_eq!(app.quotes.current(), Some(&Quote::fallback()));
        assert_eq!(latest_toast(&app), "Failed to fetch quote");
    }

    #[test]
    fn mouse_press_ignored_during_keyboard_drag() {
        let mut app = app();
        for title in ["a", "b", "c"] {
            add(&mut app, title);
        }
        app.columns = board_columns();

        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Char('g'));
        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 5, 1));
        app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 30, 2));
        assert!(matches!(app.mode, Mode::Dragging(_)));

        app.handle_key(KeyCode::Right);
        app.handle_key(KeyCode::Char('g'));
        assert_eq!(
            states(&app),
            [
                ("a".to_string(), false),
                ("b".to_string(), true),
                ("c".to_string(), false)
            ]
        );
    }

    #[test]
    fn keys_frozen_while_mouse_holds_a_task() {
        let mut app = app();
        for title in ["a", "b"] {
            add(&mut app, title);
        }
        app.columns = board_columns();

        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 5, 1));
        app.handle_key(KeyCode::Char('d'));
        app.handle_key(KeyCode::Char(' '));
        assert_eq!(app.store.len(), 2);

        app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 30, 2));
        assert_eq!(
            states(&app),
            [("a".to_string(), true), ("b".to_string(), false)]
        );
    }

    #[test]
    fn escape_cancels_mouse_drag() {
        let mut app = app();
        add(&mut app, "a");
        app.columns = board_columns();

        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 5, 1));
        app.handle_key(KeyCode::Esc);
        assert!(app.dragging().is_none());
        app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 30, 2));
        assert!(!app.store.tasks()[0].completed);
    }

    #[test]
    fn drop_target_follows_pointer() {
        let mut app = app();
        add(&mut app, "a");
        app.columns = board_columns();
        assert_eq!(app.drop_target(), None);

        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 5, 1));
        assert_eq!(app.drop_target(), Some(Bucket::Pending));
        app.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 30, 3));
        assert_eq!(app.drop_target(), Some(Bucket::Completed));
        assert_eq!(app.bucket, Bucket::Pending);
        app.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 60, 30));
        assert_eq!(app.drop_target(), None);
    }

    #[test]
    fn save_failure_becomes_error_toast() {
        let store = TaskStore::open(MemoryStorage::new().failing()).unwrap();
        let mut app = App::new(store, Box::new(StaticQuotes::default()));
        add(&mut app, "Buy milk");
        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(app.store.len(), 1);
        let toast = app.toasts.latest().unwrap();
        assert_eq!(toast.level, Level::Error);
        assert_eq!(
            toast.message,
            "failed to save tasks: IO error: storage quota exceeded"
        );

        app.handle_key(KeyCode::Char(' '));
        assert!(app.store.tasks()[0].completed);
        assert_eq!(app.toasts.latest().unwrap().level, Level::Error);
    }
}
