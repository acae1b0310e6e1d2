use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use hotel_reservations::{summarize_by_owner, AdminSummary, OwnerSummary, Reservation, RoomCategory};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

const PAGE_JUMP: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    AllReservations,
    ByGuest,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::AllReservations => Page::ByGuest,
            Page::ByGuest => Page::AllReservations,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::AllReservations => "All Reservations",
            Page::ByGuest => "By Guest",
        }
    }
}

/// Read-only admin view over every reservation
pub struct App {
    pub reservations: Vec<Reservation>,
    pub guests: Vec<OwnerSummary>,
    pub summary: AdminSummary,
    pub current_page: Page,
    pub state: TableState,
    pub guest_state: TableState,
}

impl App {
    pub fn new(reservations: Vec<Reservation>) -> Self {
        let mut state = TableState::default();
        if !reservations.is_empty() {
            state.select(Some(0));
        }

        let guests = summarize_by_owner(&reservations);
        let mut guest_state = TableState::default();
        if !guests.is_empty() {
            guest_state.select(Some(0));
        }

        let summary = AdminSummary::of(&reservations);

        Self {
            reservations,
            guests,
            summary,
            current_page: Page::AllReservations,
            state,
            guest_state,
        }
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    fn active(&mut self) -> (&mut TableState, usize) {
        match self.current_page {
            Page::AllReservations => (&mut self.state, self.reservations.len()),
            Page::ByGuest => (&mut self.guest_state, self.guests.len()),
        }
    }

    pub fn next(&mut self) {
        let (state, len) = self.active();
        if len == 0 {
            return;
        }
        let i = match state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let (state, len) = self.active();
        if len == 0 {
            return;
        }
        let i = match state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        state.select(Some(i));
    }

    pub fn page_down(&mut self) {
        let (state, len) = self.active();
        if len == 0 {
            return;
        }
        let i = state.selected().map_or(0, |i| (i + PAGE_JUMP).min(len - 1));
        state.select(Some(i));
    }

    pub fn page_up(&mut self) {
        let (state, len) = self.active();
        if len == 0 {
            return;
        }
        let i = state.selected().map_or(0, |i| i.saturating_sub(PAGE_JUMP));
        state.select(Some(i));
    }

    pub fn peak_count(&self) -> usize {
        self.reservations.iter().filter(|r| r.is_peak_season()).count()
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok(())
                }
                KeyCode::Tab | KeyCode::BackTab => app.next_page(),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::PageDown => app.page_down(),
                KeyCode::PageUp => app.page_up(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with page tabs and totals
            Constraint::Min(0),    // Table
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.current_page {
        Page::AllReservations => render_reservations(f, chunks[1], app),
        Page::ByGuest => render_guests(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![];
    for (i, page) in [Page::AllReservations, Page::ByGuest].iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        spans.push(Span::styled(page.title().to_string(), style));
    }

    spans.push(Span::raw("  |  "));
    spans.push(Span::styled(
        format!("Reservations: {}", app.summary.count),
        Style::default().fg(Color::White),
    ));
    spans.push(Span::raw("  |  "));
    spans.push(Span::styled(
        format!("Revenue: {:.2}", app.summary.total_revenue),
        Style::default().fg(Color::Green),
    ));
    spans.push(Span::raw("  |  "));
    spans.push(Span::styled(
        format!("Peak: {}", app.peak_count()),
        Style::default().fg(Color::Magenta),
    ));

    let header = Paragraph::new(vec![Line::from(spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(header, area);
}

fn header_row(titles: &[&'static str]) -> Row<'static> {
    let cells = titles.iter().map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });

    Row::new(cells).style(Style::default().bg(Color::DarkGray)).height(1)
}

fn category_color(category: RoomCategory) -> Color {
    match category {
        RoomCategory::Standard => Color::White,
        RoomCategory::Deluxe => Color::Cyan,
        RoomCategory::Suite => Color::Yellow,
    }
}

fn render_reservations(f: &mut Frame, area: Rect, app: &mut App) {
    let rows = app.reservations.iter().enumerate().map(|(i, r)| {
        let month_style = if r.is_peak_season() {
            Style::default().fg(Color::Magenta)
        } else {
            Style::default()
        };

        Row::new(vec![
            Cell::from((i + 1).to_string()),
            Cell::from(truncate(&r.owner, 20)),
            Cell::from(r.category.as_str()).style(Style::default().fg(category_color(r.category))),
            Cell::from(r.nights.to_string()),
            Cell::from(r.month.clone()).style(month_style),
            Cell::from(format!("{:.2}", r.total_price)).style(Style::default().fg(Color::Green)),
        ])
        .height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(5),
            Constraint::Length(22),
            Constraint::Length(10),
            Constraint::Length(8),
            Constraint::Length(11),
            Constraint::Length(12),
        ],
    )
    .header(header_row(&["#", "Guest", "Room", "Nights", "Month", "Price"]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Reservations "),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_guests(f: &mut Frame, area: Rect, app: &mut App) {
    let rows = app.guests.iter().map(|g| {
        Row::new(vec![
            Cell::from(truncate(&g.owner, 20)),
            Cell::from(g.count.to_string()),
            Cell::from(format!("{:.2}", g.revenue)).style(Style::default().fg(Color::Green)),
        ])
        .height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(22),
            Constraint::Length(14),
            Constraint::Length(14),
        ],
    )
    .header(header_row(&["Guest", "Reservations", "Revenue"]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Revenue by Guest "),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.guest_state);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let (state, total) = match app.current_page {
        Page::AllReservations => (&app.state, app.reservations.len()),
        Page::ByGuest => (&app.guest_state, app.guests.len()),
    };
    let selected = state.selected().map(|i| i + 1).unwrap_or(0);

    let status_spans = vec![
        Span::styled(
            format!(" Row: {}/{} ", selected, total),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw(" | "),
        Span::styled("Tab", Style::default().fg(Color::Yellow)),
        Span::raw(" Page | "),
        Span::styled("↑/↓", Style::default().fg(Color::Yellow)),
        Span::raw(" Nav | "),
        Span::styled("PgUp/PgDn", Style::default().fg(Color::Yellow)),
        Span::raw(" Fast | "),
        Span::styled("q", Style::default().fg(Color::Red)),
        Span::raw(" Back"),
    ];

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}
