use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use fiscal_correction::{CategoryTag, CorrectedEntry, CorrectionRun, CorrectionSummary};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Ledger,
    Audit,
    Summary,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Ledger => Page::Audit,
            Page::Audit => Page::Summary,
            Page::Summary => Page::Ledger,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Ledger => Page::Summary,
            Page::Audit => Page::Ledger,
            Page::Summary => Page::Audit,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Ledger => "Corrected Ledger",
            Page::Audit => "Audit Trail",
            Page::Summary => "Summary",
        }
    }
}

pub struct App {
    pub entries: Vec<CorrectedEntry>,
    pub audit: Vec<String>,
    pub summary: CorrectionSummary,
    /// Indices into `entries` shown on the ledger page
    pub visible: Vec<usize>,
    pub filter: Option<CategoryTag>,
    pub state: TableState,
    pub current_page: Page,
    pub show_detail: bool,
    pub audit_scroll: u16,
}

impl App {
    pub fn new(run: CorrectionRun) -> Self {
        let summary = run.summary();
        let audit = run.audit.lines().to_vec();
        let visible: Vec<usize> = (0..run.entries.len()).collect();

        let mut state = TableState::default();
        if !visible.is_empty() {
            state.select(Some(0));
        }

        Self {
            entries: run.entries,
            audit,
            summary,
            visible,
            filter: None,
            state,
            current_page: Page::Ledger,
            show_detail: false,
            audit_scroll: 0,
        }
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    /// (row number, entry) of the highlighted row
    pub fn selected_entry(&self) -> Option<(usize, &CorrectedEntry)> {
        let index = *self.state.selected().and_then(|i| self.visible.get(i))?;
        Some((index + 1, &self.entries[index]))
    }

    pub fn apply_filter(&mut self, filter: Option<CategoryTag>) {
        self.filter = filter;

        self.visible = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| filter.map_or(true, |c| e.category == c))
            .map(|(i, _)| i)
            .collect();

        // Reset selection to first item
        if !self.visible.is_empty() {
            self.state.select(Some(0));
        } else {
            self.state.select(None);
        }
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    pub fn next(&mut self) {
        let len = self.visible.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.visible.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn page_down(&mut self) {
        let len = self.visible.len();
        if len == 0 {
            return;
        }
        let i = self.state.selected().map_or(0, |i| (i + 20).min(len - 1));
        self.state.select(Some(i));
    }

    pub fn first(&mut self) {
        if !self.visible.is_empty() {
            self.state.select(Some(0));
        }
    }

    pub fn last(&mut self) {
        if !self.visible.is_empty() {
            self.state.select(Some(self.visible.len() - 1));
        }
    }

    pub fn page_up(&mut self) {
        if self.visible.is_empty() {
            return;
        }
        let i = self.state.selected().map_or(0, |i| i.saturating_sub(20));
        self.state.select(Some(i));
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
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Enter => app.toggle_detail(),
                KeyCode::Tab => {
                    if key.modifiers.contains(KeyModifiers::SHIFT) {
                        app.previous_page();
                    } else {
                        app.next_page();
                    }
                }
                KeyCode::BackTab => app.previous_page(),
                KeyCode::Char('c') => app.apply_filter(None),
                KeyCode::Char(d @ '1'..='4') => {
                    let index = d as usize - '1' as usize;
                    app.apply_filter(Some(CategoryTag::ALL[index]));
                    app.current_page = Page::Ledger;
                }
                KeyCode::Down | KeyCode::Char('j') => match app.current_page {
                    Page::Audit => app.audit_scroll = app.audit_scroll.saturating_add(1),
                    _ => app.next(),
                },
                KeyCode::Up | KeyCode::Char('k') => match app.current_page {
                    Page::Audit => app.audit_scroll = app.audit_scroll.saturating_sub(1),
                    _ => app.previous(),
                },
                KeyCode::PageDown => app.page_down(),
                KeyCode::PageUp => app.page_up(),
                KeyCode::Home => app.first(),
                KeyCode::End => app.last(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    if app.show_detail && app.current_page == Page::Ledger {
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[1]);

        render_table(f, content_chunks[0], app);
        render_detail_panel(f, content_chunks[1], app);
    } else {
        match app.current_page {
            Page::Ledger => render_table(f, chunks[1], app),
            Page::Audit => render_audit(f, chunks[1], app),
            Page::Summary => render_summary(f, chunks[1], app),
        }
    }

    render_status_bar(f, chunks[2], app);
}

fn category_color(category: CategoryTag) -> Color {
    match category {
        CategoryTag::RepresentationCosts => Color::Magenta,
        CategoryTag::VehicleCosts => Color::Yellow,
        CategoryTag::HousingCosts => Color::Cyan,
        CategoryTag::OtherCosts => Color::White,
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let pages = [Page::Ledger, Page::Audit, Page::Summary];

    let mut tab_spans = vec![];
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title().to_string(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Rows: {}", app.summary.rows),
        Style::default().fg(Color::White),
    ));
    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Correction: {:.2}", app.summary.total_correction),
        Style::default().fg(Color::Red),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans)])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );

    f.render_widget(header, area);
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["#", "Ledger account", "Amount", "Category", "Deductible", "Correction"]
        .iter()
        .map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.visible.iter().map(|&i| {
        let entry = &app.entries[i];
        let color = category_color(entry.category);
        let correction_style = if entry.has_correction() {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        Row::new(vec![
            Cell::from((i + 1).to_string()),
            Cell::from(truncate(&entry.account_label, 32)),
            Cell::from(format!("{:.2}", entry.amount)),
            Cell::from(entry.category.as_str()).style(Style::default().fg(color)),
            Cell::from(format!("{:.2}", entry.deductible_amount)),
            Cell::from(format!("{:.2}", entry.correction_amount)).style(correction_style),
        ])
        .height(1)
    });

    let title = match app.filter {
        Some(category) => format!(" Entries - {} ", category),
        None => " Entries ".to_string(),
    };

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Length(34),
            Constraint::Length(14),
            Constraint::Length(21),
            Constraint::Length(14),
            Constraint::Length(14),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(title),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_audit(f: &mut Frame, area: Rect, app: &App) {
    let lines: Vec<Line> = app.audit.iter().map(|l| Line::from(l.as_str())).collect();

    let panel = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((app.audit_scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Green))
                .title(" Audit Trail "),
        );

    f.render_widget(panel, area);
}

fn render_summary(f: &mut Frame, area: Rect, app: &App) {
    let header = Row::new(["Category", "Rows", "Amount", "Deductible", "Correction"].map(|h| {
        Cell::from(h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    }))
    .style(Style::default().bg(Color::DarkGray));

    let mut rows: Vec<Row> = app
        .summary
        .per_category
        .iter()
        .map(|t| {
            Row::new(vec![
                Cell::from(t.category.as_str())
                    .style(Style::default().fg(category_color(t.category))),
                Cell::from(t.rows.to_string()),
                Cell::from(format!("{:.2}", t.amount)),
                Cell::from(format!("{:.2}", t.deductible)),
                Cell::from(format!("{:.2}", t.correction)),
            ])
        })
        .collect();

    rows.push(
        Row::new(vec![
            Cell::from("Total"),
            Cell::from(app.summary.rows.to_string()),
            Cell::from(format!("{:.2}", app.summary.total_amount)),
            Cell::from(format!("{:.2}", app.summary.total_deductible)),
            Cell::from(format!("{:.2}", app.summary.total_correction)),
        ])
        .style(Style::default().add_modifier(Modifier::BOLD)),
    );

    let table = Table::new(
        rows,
        [
            Constraint::Length(22),
            Constraint::Length(8),
            Constraint::Length(16),
            Constraint::Length(16),
            Constraint::Length(16),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Totals per Category  (1-4 filter ledger, c clear) "),
    );

    f.render_widget(table, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);

    let mut status_spans = vec![Span::styled(
        format!(" Row: {}/{} ", selected, app.visible.len()),
        Style::default().fg(Color::Cyan),
    )];

    if let Some(category) = app.filter {
        status_spans.push(Span::raw(" | "));
        status_spans.push(Span::styled(
            format!("Filter: {}", category),
            Style::default().fg(Color::Green),
        ));
        status_spans.push(Span::raw(" ("));
        status_spans.push(Span::styled("c", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" clear)"));
    }

    for (key, label, color) in [
        ("Enter", " Details", Color::Yellow),
        ("Tab", " Page", Color::Yellow),
        ("↑/↓", " Nav", Color::Yellow),
        ("q", " Quit", Color::Red),
    ] {
        status_spans.push(Span::raw(" | "));
        status_spans.push(Span::styled(key, Style::default().fg(color)));
        status_spans.push(Span::raw(label));
    }

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Entry Details ");

    let Some((row, entry)) = app.selected_entry() else {
        f.render_widget(Paragraph::new("No entry selected").block(block), area);
        return;
    };

    let label = |text: &'static str| {
        Span::styled(text, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
    };

    let content = vec![
        Line::from(""),
        Line::from(vec![label("  Row: "), Span::raw(row.to_string())]),
        Line::from(""),
        Line::from(vec![label("  Account: "), Span::raw(entry.account_label.clone())]),
        Line::from(""),
        Line::from(vec![label("  Amount: "), Span::raw(format!("{}", entry.amount))]),
        Line::from(""),
        Line::from(vec![
            label("  Category: "),
            Span::styled(
                entry.category.as_str(),
                Style::default().fg(category_color(entry.category)),
            ),
        ]),
        Line::from(""),
        Line::from(vec![
            label("  Deductible: "),
            Span::raw(format!("{}", entry.deductible_amount)),
        ]),
        Line::from(""),
        Line::from(vec![
            label("  Correction: "),
            Span::raw(format!("{}", entry.correction_amount)),
        ]),
        Line::from(""),
        Line::from("  ─────────────────────────────────────"),
        Line::from(""),
        Line::from(vec![
            Span::raw("  "),
            Span::styled(
                entry.explanation,
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "  Press Enter to close",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
    ];

    let detail_panel = Paragraph::new(content).wrap(Wrap { trim: false }).block(block);

    f.render_widget(detail_panel, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fiscal_correction::Pipeline;

    fn app() -> App {
        let input =
            "Grootboekrekening,Bedrag (EUR)\nHuur,100\nLeaseauto,200\nRepresentatie,50\nPapier,5\n";
        App::new(Pipeline::default().run_bytes(input.as_bytes(), b',').unwrap())
    }

    #[test]
    fn test_filter_keeps_row_numbers() {
        let mut app = app();
        app.apply_filter(Some(CategoryTag::VehicleCosts));

        assert_eq!(app.visible, vec![1]);
        let (row, entry) = app.selected_entry().unwrap();
        assert_eq!(row, 2);
        assert_eq!(entry.account_label, "Leaseauto");
    }

    #[test]
    fn test_empty_filter_clears_selection() {
        let input = "Grootboekrekening,Bedrag (EUR)\nHuur,100\n";
        let mut app = App::new(Pipeline::default().run_bytes(input.as_bytes(), b',').unwrap());
        app.apply_filter(Some(CategoryTag::VehicleCosts));

        assert!(app.visible.is_empty());
        assert!(app.selected_entry().is_none());
    }

    #[test]
    fn test_home_and_end_on_empty_view() {
        let mut app = app();
        app.last();
        assert_eq!(app.state.selected(), Some(3));
        app.first();
        assert_eq!(app.state.selected(), Some(0));

        let input = "Grootboekrekening,Bedrag (EUR)\nHuur,100\n";
        let mut empty = App::new(Pipeline::default().run_bytes(input.as_bytes(), b',').unwrap());
        empty.apply_filter(Some(CategoryTag::VehicleCosts));
        empty.first();
        assert_eq!(empty.state.selected(), None);
        empty.last();
        assert_eq!(empty.state.selected(), None);
    }

    #[test]
    fn test_navigation_wraps() {
        let mut app = app();
        app.previous();
        assert_eq!(app.state.selected(), Some(3));
        app.next();
        assert_eq!(app.state.selected(), Some(0));
    }

    #[test]
    fn test_page_cycle() {
        assert_eq!(Page::Ledger.next(), Page::Audit);
        assert_eq!(Page::Ledger.previous(), Page::Summary);
        assert_eq!(Page::Summary.next().title(), "Corrected Ledger");
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("Représentatie kosten", 8), "Repré...");
        assert_eq!(truncate("Huur", 8), "Huur");
    }
}
