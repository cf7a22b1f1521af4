use crate::app::{App, Column, Mode, CARD_HEIGHT};
use crate::form::{Field, TaskForm};
use crate::notify::Level;
use crate::storage::Storage;
use crate::task::{Bucket, Status, Task};
use chrono::{DateTime, Utc};
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};

const TICK: Duration = Duration::from_millis(250);

pub fn run_app<B: Backend, S: Storage>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
) -> io::Result<()> {
    app.refresh_quote();
    loop {
        app.toasts.prune(Instant::now());
        terminal.draw(|f| draw(f, app))?;

        if !event::poll(TICK)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key.code),
            Event::Mouse(mouse) => app.handle_mouse(mouse),
            _ => {}
        }
        if app.should_quit {
            return Ok(());
        }
    }
}

pub fn draw<S: Storage>(f: &mut Frame, app: &mut App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(4),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);
    draw_quote(f, app, chunks[1]);
    draw_board(f, app, chunks[2]);
    draw_footer(f, app, chunks[3]);

    if let Mode::Form(form) = &app.mode {
        draw_form(f, form);
    }
}

fn draw_header<S: Storage>(f: &mut Frame, app: &App<S>, area: Rect) {
    let current = app.store.filter();
    let mut spans = vec![Span::styled(
        "Task Management  ",
        Style::default().add_modifier(Modifier::BOLD),
    )];
    for (i, filter) in crate::task::Filter::ALL.iter().enumerate() {
        let label = format!(" {}:{} ", i + 1, filter);
        let style = if *filter == current {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default()
        };
        spans.push(Span::styled(label, style));
    }
    let header = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

fn draw_quote<S: Storage>(f: &mut Frame, app: &App<S>, area: Rect) {
    let block = Block::default().title("Quote").borders(Borders::ALL);
    let lines = match app.quotes.current() {
        _ if app.quotes.is_loading() => vec![Line::from("Loading...")],
        Some(quote) => vec![
            Line::from(Span::styled(
                format!("\"{}\"", quote.quote),
                Style::default().add_modifier(Modifier::ITALIC),
            )),
            Line::from(Span::styled(
                format!("- {}", quote.author),
                Style::default().fg(Color::DarkGray),
            )),
        ],
        None => Vec::new(),
    };
    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn draw_board<S: Storage>(f: &mut Frame, app: &mut App<S>, area: Rect) {
    let now = Utc::now();
    let drop_target = app.drop_target();
    let mut columns = Vec::new();

    if app.is_board() {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);

        for (bucket, chunk) in [Bucket::Pending, Bucket::Completed].into_iter().zip(chunks.iter()) {
            let tasks = app.store.bucket(bucket);
            let title = match bucket {
                Bucket::Pending => format!("Pending Tasks ({})", tasks.len()),
                Bucket::Completed => format!("Completed Tasks ({})", tasks.len()),
            };
            let border = if drop_target == Some(bucket) {
                Style::default().fg(Color::Yellow)
            } else if app.bucket == bucket {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default()
            };
            let selected = (app.bucket == bucket).then_some(app.index);
            let (inner, offset) = draw_list(f, &tasks, title, border, selected, *chunk, now);
            columns.push(Column {
                bucket: Some(bucket),
                area: inner,
                offset,
            });
        }
    } else {
        let tasks = app.store.visible();
        let title = format!("{} tasks ({})", app.store.filter(), tasks.len());
        let border = Style::default().fg(Color::Cyan);
        let (inner, offset) = draw_list(f, &tasks, title, border, Some(app.index), area, now);
        columns.push(Column {
            bucket: None,
            area: inner,
            offset,
        });
    }

    app.columns = columns;
}

/// Renders one column and returns its inner area plus scroll offset.
fn draw_list(
    f: &mut Frame,
    tasks: &[&Task],
    title: String,
    border: Style,
    selected: Option<usize>,
    area: Rect,
    now: DateTime<Utc>,
) -> (Rect, usize) {
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border);
    let inner = block.inner(area);

    let visible = usize::from((inner.height / CARD_HEIGHT).max(1));
    let offset = selected
        .map(|i| (i + 1).saturating_sub(visible))
        .unwrap_or(0);

    let items: Vec<ListItem> = tasks.iter().map(|t| card(t, now)).collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut state = ListState::default()
        .with_offset(offset)
        .with_selected(selected.filter(|i| *i < tasks.len()));
    f.render_stateful_widget(list, area, &mut state);

    (inner, offset)
}

fn card(task: &Task, now: DateTime<Utc>) -> ListItem<'static> {
    let status = task.status(now);
    let (badge_color, text_color) = match status {
        Status::Completed => (Color::Green, Color::DarkGray),
        Status::Overdue => (Color::Red, Color::Red),
        Status::Pending => (Color::Blue, Color::White),
    };
    let mut title_style = Style::default().fg(text_color).add_modifier(Modifier::BOLD);
    if task.completed {
        title_style = title_style.add_modifier(Modifier::CROSSED_OUT);
    }
    let checkbox = if task.completed { "[x] " } else { "[ ] " };

    let mut detail = format!("    Due: {}", crate::form::format_due_date(task.due_date));
    if !task.description.is_empty() {
        detail.push_str("  ");
        detail.push_str(&task.description);
    }

    ListItem::new(vec![
        Line::from(vec![
            Span::raw(checkbox),
            Span::styled(task.title.clone(), title_style),
            Span::raw(" "),
            Span::styled(format!("[{}]", status.label()), Style::default().fg(badge_color)),
        ]),
        Line::from(Span::styled(
            detail,
            Style::default().fg(if status == Status::Overdue {
                Color::Red
            } else {
                Color::DarkGray
            }),
        )),
    ])
}

fn draw_footer<S: Storage>(f: &mut Frame, app: &App<S>, area: Rect) {
    let line = if let Some(toast) = app.toasts.latest() {
        let color = match toast.level {
            Level::Success => Color::Green,
            Level::Info => Color::Cyan,
            Level::Error => Color::Red,
        };
        Line::from(Span::styled(toast.message.clone(), Style::default().fg(color)))
    } else {
        let help = match app.mode {
            Mode::Dragging(_) => "moving: arrows pick target, g/Enter drop, Esc cancel",
            Mode::Form(_) => "Tab next field, Enter save, Esc cancel",
            Mode::Normal => {
                "a add  e edit  d delete  space toggle  g move  f filter  r quote  q quit"
            }
        };
        Line::from(Span::styled(help, Style::default().fg(Color::DarkGray)))
    };
    f.render_widget(Paragraph::new(line), area);
}

fn draw_form(f: &mut Frame, form: &TaskForm) {
    let area = centered(f.area(), 60, 9);
    let title = if form.is_edit() { "Edit Task" } else { "Add New Task" };
    let block = Block::default().title(title).borders(Borders::ALL);

    let field = |label: &str, value: &str, which: Field| {
        let style = if form.focus == which {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        let cursor = if form.focus == which { "_" } else { "" };
        Line::from(vec![
            Span::styled(format!("{label:<13}"), style),
            Span::raw(format!("{value}{cursor}")),
        ])
    };
    let lines = vec![
        field("Title", &form.title, Field::Title),
        field("Description", &form.description, Field::Description),
        field("Due date", &form.due_date, Field::DueDate),
        Line::from(""),
        Line::from(Span::styled(
            "YYYY-MM-DD  |  Enter save  |  Esc cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    f.render_widget(Clear, area);
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
