use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use color_eyre::Result;
use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
};

use super::{
    event::{AppEvent, EventHandler},
    widgets::TextInput,
};
use crate::application::Board;
use crate::domain::{Filter, TaskId};

const PAGE_SIZES: [usize; 2] = [5, 10];
const DEADLINE_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FocusedPane {
    Contents,
    Deadline,
    Assignee,
    TaskList,
}

impl FocusedPane {
    fn next(self) -> Self {
        match self {
            FocusedPane::Contents => FocusedPane::Deadline,
            FocusedPane::Deadline => FocusedPane::Assignee,
            FocusedPane::Assignee => FocusedPane::TaskList,
            FocusedPane::TaskList => FocusedPane::Contents,
        }
    }

    fn prev(self) -> Self {
        match self {
            FocusedPane::Contents => FocusedPane::TaskList,
            FocusedPane::Deadline => FocusedPane::Contents,
            FocusedPane::Assignee => FocusedPane::Deadline,
            FocusedPane::TaskList => FocusedPane::Assignee,
        }
    }
}

pub struct App {
    board: Board,

    // UI state
    focused_pane: FocusedPane,
    contents_input: TextInput,
    deadline_input: TextInput,
    assignee_index: Option<usize>,
    table_state: TableState,
    page: usize,
    page_size: usize,
}

impl App {
    pub fn new(board: Board, page_size: usize) -> Self {
        let page_size = if PAGE_SIZES.contains(&page_size) {
            page_size
        } else {
            PAGE_SIZES[0]
        };

        Self {
            board,
            focused_pane: FocusedPane::TaskList,
            contents_input: TextInput::new("New todo", "What needs doing?"),
            deadline_input: TextInput::new("Deadline", "YYYY-MM-DD HH:MM"),
            assignee_index: None,
            table_state: TableState::default(),
            page: 0,
            page_size,
        }
    }

    pub async fn initialize(&mut self) {
        self.board.initialize().await;
        self.clamp_selection();
    }

    /// Handle one event. Returns true when the app should exit.
    pub async fn handle_event(&mut self, event: AppEvent) -> Result<bool> {
        // A pending notice blocks everything except dismissal (and quitting).
        if self.board.notice().is_some() {
            match event {
                AppEvent::Quit => return Ok(true),
                AppEvent::Esc | AppEvent::Enter => self.board.dismiss_notice(),
                _ => {}
            }
            return Ok(false);
        }

        match event {
            AppEvent::Quit => return Ok(true),
            AppEvent::Tick => {}

            AppEvent::Refresh => {
                let filter = self.board.filter();
                self.board.load_tasks(filter).await;
                self.clamp_selection();
            }

            AppEvent::Tab => self.move_focus(FocusedPane::next),
            AppEvent::BackTab => self.move_focus(FocusedPane::prev),
            AppEvent::Esc => self.move_focus(|_| FocusedPane::TaskList),

            AppEvent::Enter => {
                if self.focused_pane != FocusedPane::TaskList {
                    self.submit_draft().await;
                }
            }

            AppEvent::Backspace => match self.focused_pane {
                FocusedPane::Contents => {
                    self.contents_input.delete_char();
                    self.board.set_draft_contents(self.contents_input.value());
                }
                FocusedPane::Deadline => self.deadline_input.delete_char(),
                _ => {}
            },

            AppEvent::Up => match self.focused_pane {
                FocusedPane::TaskList => self.select_previous(),
                FocusedPane::Assignee => self.cycle_assignee(-1),
                _ => {}
            },
            AppEvent::Down => match self.focused_pane {
                FocusedPane::TaskList => self.select_next(),
                FocusedPane::Assignee => self.cycle_assignee(1),
                _ => {}
            },
            AppEvent::Left => match self.focused_pane {
                FocusedPane::TaskList => self.previous_page(),
                FocusedPane::Assignee => self.cycle_assignee(-1),
                _ => {}
            },
            AppEvent::Right => match self.focused_pane {
                FocusedPane::TaskList => self.next_page(),
                FocusedPane::Assignee => self.cycle_assignee(1),
                _ => {}
            },
            AppEvent::PageUp => self.previous_page(),
            AppEvent::PageDown => self.next_page(),

            AppEvent::Character(c) => match self.focused_pane {
                FocusedPane::Contents => {
                    self.contents_input.insert_char(c);
                    self.board.set_draft_contents(self.contents_input.value());
                }
                FocusedPane::Deadline => self.deadline_input.insert_char(c),
                FocusedPane::Assignee => {}
                FocusedPane::TaskList => return self.handle_action_key(c).await,
            },
        }

        Ok(false)
    }

    async fn handle_action_key(&mut self, c: char) -> Result<bool> {
        match c {
            'q' => return Ok(true),
            'r' => {
                let filter = self.board.filter();
                self.board.load_tasks(filter).await;
                self.clamp_selection();
            }
            'f' => {
                let next = self.board.filter().next();
                self.board.select_filter(next).await;
                self.page = 0;
                self.clamp_selection();
            }
            'F' => {
                let prev = self.board.filter().prev();
                self.board.select_filter(prev).await;
                self.page = 0;
                self.clamp_selection();
            }
            '1' | '2' | '3' | '4' => {
                let index = c as usize - '1' as usize;
                self.board.select_filter(Filter::ALL[index]).await;
                self.page = 0;
                self.clamp_selection();
            }
            ' ' => {
                // The completed checkbox is not available for trashed rows.
                if let Some(id) = self.selected_task_id() {
                    let trashed = self
                        .board
                        .tasks()
                        .iter()
                        .find(|t| t.id == id)
                        .map(|t| t.trashed)
                        .unwrap_or(true);
                    if !trashed {
                        self.board.toggle_completed(&id).await;
                        self.clamp_selection();
                    }
                }
            }
            'd' => {
                // Trash or restore; the selection itself is left alone.
                if let Some(id) = self.selected_task_id() {
                    self.board.toggle_trashed(&id).await;
                    self.clamp_selection();
                }
            }
            'x' => {
                if self.board.filter() == Filter::Trashed {
                    self.board.empty_trash().await;
                    self.clamp_selection();
                }
            }
            'p' => {
                self.page_size = if self.page_size == PAGE_SIZES[0] {
                    PAGE_SIZES[1]
                } else {
                    PAGE_SIZES[0]
                };
                self.page = 0;
                self.clamp_selection();
            }
            'j' => self.select_next(),
            'k' => self.select_previous(),
            'g' => self.select_first(),
            'G' => self.select_last(),
            _ => {}
        }
        Ok(false)
    }

    fn move_focus(&mut self, update: impl Fn(FocusedPane) -> FocusedPane) {
        if self.focused_pane == FocusedPane::Deadline {
            self.apply_deadline_input();
        }
        self.focused_pane = update(self.focused_pane);
        self.contents_input
            .set_focused(self.focused_pane == FocusedPane::Contents);
        self.deadline_input
            .set_focused(self.focused_pane == FocusedPane::Deadline);
    }

    /// Parse the deadline field and push it into the draft. An empty or
    /// unparsable value yields `None`, which the draft ignores, so a
    /// previously picked deadline survives a botched edit.
    fn apply_deadline_input(&mut self) {
        self.board.set_draft_deadline(parse_deadline(self.deadline_input.value()));
    }

    fn cycle_assignee(&mut self, step: isize) {
        let user_count = self.board.users().len();
        // Positions: None, then one per user.
        let positions = user_count as isize + 1;
        let current = match self.assignee_index {
            None => 0,
            Some(i) => i as isize + 1,
        };
        let next = (current + step).rem_euclid(positions);
        self.assignee_index = if next == 0 { None } else { Some(next as usize - 1) };

        let assignee = self
            .assignee_index
            .and_then(|i| self.board.users().get(i))
            .map(|u| u.id.clone());
        self.board.set_draft_assignee(assignee);
    }

    async fn submit_draft(&mut self) {
        self.apply_deadline_input();
        self.board.submit_draft().await;
        // The controller clears only the contents; mirror that here. The
        // deadline and assignee fields keep their values.
        self.contents_input.clear();
        self.clamp_selection();
    }

    fn page_count(&self) -> usize {
        self.board.tasks().len().div_ceil(self.page_size).max(1)
    }

    fn visible_range(&self) -> std::ops::Range<usize> {
        let start = self.page * self.page_size;
        let end = (start + self.page_size).min(self.board.tasks().len());
        start..end
    }

    fn selected_task_id(&self) -> Option<TaskId> {
        let index = self.visible_range().start + self.table_state.selected()?;
        self.board.tasks().get(index).map(|t| t.id.clone())
    }

    fn clamp_selection(&mut self) {
        self.page = self.page.min(self.page_count() - 1);
        let visible = self.visible_range().len();
        if visible == 0 {
            self.table_state.select(None);
        } else {
            let selected = self.table_state.selected().unwrap_or(0);
            self.table_state.select(Some(selected.min(visible - 1)));
        }
    }

    fn select_next(&mut self) {
        let visible = self.visible_range().len();
        if visible == 0 {
            return;
        }
        let next = match self.table_state.selected() {
            Some(i) if i + 1 < visible => i + 1,
            Some(i) => i,
            None => 0,
        };
        self.table_state.select(Some(next));
    }

    fn select_previous(&mut self) {
        if self.visible_range().is_empty() {
            return;
        }
        let prev = self.table_state.selected().unwrap_or(0).saturating_sub(1);
        self.table_state.select(Some(prev));
    }

    fn select_first(&mut self) {
        if !self.visible_range().is_empty() {
            self.table_state.select(Some(0));
        }
    }

    fn select_last(&mut self) {
        let visible = self.visible_range().len();
        if visible > 0 {
            self.table_state.select(Some(visible - 1));
        }
    }

    fn next_page(&mut self) {
        if self.page + 1 < self.page_count() {
            self.page += 1;
            self.clamp_selection();
        }
    }

    fn previous_page(&mut self) {
        if self.page > 0 {
            self.page -= 1;
            self.clamp_selection();
        }
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // compose card
                Constraint::Length(1), // filter bar
                Constraint::Min(4),    // task table
                Constraint::Length(1), // footer
            ])
            .split(frame.area());

        self.render_compose(frame, chunks[0]);
        self.render_filter_bar(frame, chunks[1]);
        self.render_table(frame, chunks[2]);
        self.render_footer(frame, chunks[3]);
        self.render_notice(frame);
    }

    fn render_compose(&self, frame: &mut Frame, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(55),
                Constraint::Percentage(22),
                Constraint::Percentage(23),
            ])
            .split(area);

        self.contents_input.render(frame, columns[0]);
        self.deadline_input.render(frame, columns[1]);
        self.render_assignee(frame, columns[2]);
    }

    fn render_assignee(&self, frame: &mut Frame, area: Rect) {
        let border_style = if self.focused_pane == FocusedPane::Assignee {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Gray)
        };

        let name = self
            .assignee_index
            .and_then(|i| self.board.users().get(i))
            .map(|u| u.full_name.as_str())
            .unwrap_or("None");

        let block = Block::default()
            .title("Assignee")
            .borders(Borders::ALL)
            .border_style(border_style);

        frame.render_widget(Paragraph::new(name).block(block), area);
    }

    fn render_filter_bar(&self, frame: &mut Frame, area: Rect) {
        let mut spans: Vec<Span> = Vec::new();
        for (i, filter) in Filter::ALL.iter().enumerate() {
            let style = if *filter == self.board.filter() {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else {
                Style::default().fg(Color::Gray)
            };
            spans.push(Span::styled(format!(" {} {} ", i + 1, filter.name()), style));
            spans.push(Span::raw(" "));
        }

        if self.board.filter() == Filter::Trashed {
            spans.push(Span::styled(
                " [x] empty trash ",
                Style::default().fg(Color::Red),
            ));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_table(&mut self, frame: &mut Frame, area: Rect) {
        let range = self.visible_range();
        let rows: Vec<Row> = self.board.tasks()[range]
            .iter()
            .map(|task| {
                let done = if task.completed { "[x]" } else { "[ ]" };
                let action = if task.trashed { "restore" } else { "trash" };
                let style = if task.trashed {
                    Style::default().fg(Color::DarkGray)
                } else {
                    Style::default()
                };
                Row::new(vec![
                    Cell::from(done),
                    Cell::from(task.assignee_name.clone()),
                    Cell::from(task.contents.clone()),
                    Cell::from(task.deadline.clone()),
                    Cell::from(action),
                ])
                .style(style)
            })
            .collect();

        let border_style = if self.focused_pane == FocusedPane::TaskList {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Gray)
        };

        let table = Table::new(
            rows,
            [
                Constraint::Length(5),
                Constraint::Length(20),
                Constraint::Min(20),
                Constraint::Length(18),
                Constraint::Length(9),
            ],
        )
        .header(
            Row::new(vec!["Done", "Assignee", "Contents", "Deadline", ""])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(
            Block::default()
                .title(format!(
                    "Tasks - {} (page {}/{})",
                    self.board.filter().name(),
                    self.page + 1,
                    self.page_count()
                ))
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(border_style),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        frame.render_stateful_widget(table, area, &mut self.table_state);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let mut help = String::from(
            "Tab focus | space done | d trash/restore | f/1-4 filter | p page size | r refresh | q quit",
        );
        if self.board.filter() == Filter::Trashed {
            help.push_str(" | x empty trash");
        }
        frame.render_widget(
            Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
            area,
        );
    }

    fn render_notice(&self, frame: &mut Frame) {
        let Some(notice) = self.board.notice() else {
            return;
        };

        let area = centered_rect(60, 20, frame.area());
        frame.render_widget(Clear, area);
        let paragraph = Paragraph::new(notice.to_string())
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .title("Request failed (Esc to dismiss)")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Red)),
            );
        frame.render_widget(paragraph, area);
    }
}

fn parse_deadline(value: &str) -> Option<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(value.trim(), DEADLINE_FORMAT).ok()?;
    Local
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

pub async fn run_tui(mut app: App) -> Result<()> {
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    app.initialize().await;

    let mut event_handler = EventHandler::new();

    loop {
        terminal.draw(|frame| app.render(frame))?;

        let event = event_handler.next_event().await?;
        let should_quit = app.handle_event(event).await?;
        if should_quit || event_handler.should_quit() {
            break;
        }
    }

    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        crossterm::terminal::LeaveAlternateScreen
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Task;
    use crate::ports::MockBoardRepository;
    use mockall::predicate::eq;
    use std::sync::Arc;

    fn task(id: &str, trashed: bool) -> Task {
        Task {
            id: id.into(),
            assignee_name: String::new(),
            contents: format!("task {id}"),
            deadline: String::new(),
            completed: false,
            trashed,
        }
    }

    fn app_with(repo: MockBoardRepository) -> App {
        App::new(Board::new(Arc::new(repo)), 5)
    }

    #[test]
    fn deadline_parses_only_full_timestamps() {
        assert!(parse_deadline("2024-05-01 12:00").is_some());
        assert!(parse_deadline(" 2024-05-01 12:00 ").is_some());
        assert!(parse_deadline("tomorrow").is_none());
        assert!(parse_deadline("").is_none());
    }

    #[tokio::test]
    async fn notice_blocks_input_until_dismissed() {
        let mut repo = MockBoardRepository::new();
        repo.expect_list_tasks()
            .with(eq(Filter::All))
            .times(1)
            .returning(|_| {
                Err(crate::ports::RepositoryError::Network(
                    "connection refused".into(),
                ))
            });

        let mut app = app_with(repo);
        app.board.load_tasks(Filter::All).await;
        assert!(app.board.notice().is_some());

        // Action keys are swallowed while the modal is up; 'f' would
        // otherwise trigger a filter change and a fetch the mock would
        // reject.
        app.handle_event(AppEvent::Character('f')).await.unwrap();
        assert!(app.board.notice().is_some());

        app.handle_event(AppEvent::Esc).await.unwrap();
        assert!(app.board.notice().is_none());
    }

    #[tokio::test]
    async fn space_on_trashed_row_issues_no_request() {
        let mut repo = MockBoardRepository::new();
        repo.expect_list_tasks()
            .with(eq(Filter::Trashed))
            .times(1)
            .returning(|_| Ok(vec![task("1", true)]));

        let mut app = app_with(repo);
        app.board.select_filter(Filter::Trashed).await;
        app.clamp_selection();

        // No update_task expectation: a request would panic the mock.
        app.handle_event(AppEvent::Character(' ')).await.unwrap();
    }

    #[tokio::test]
    async fn empty_trash_key_ignored_outside_trash_view() {
        let mut repo = MockBoardRepository::new();
        repo.expect_list_tasks()
            .with(eq(Filter::All))
            .times(1)
            .returning(|_| Ok(vec![task("1", false)]));

        let mut app = app_with(repo);
        app.board.load_tasks(Filter::All).await;
        app.clamp_selection();

        app.handle_event(AppEvent::Character('x')).await.unwrap();
    }

    #[tokio::test]
    async fn page_size_toggle_repaginates() {
        let mut repo = MockBoardRepository::new();
        repo.expect_list_tasks()
            .with(eq(Filter::All))
            .times(1)
            .returning(|_| Ok((0..12).map(|i| task(&i.to_string(), false)).collect()));

        let mut app = app_with(repo);
        app.board.load_tasks(Filter::All).await;
        app.clamp_selection();
        assert_eq!(app.page_count(), 3);

        app.handle_event(AppEvent::Character('p')).await.unwrap();
        assert_eq!(app.page_size, 10);
        assert_eq!(app.page_count(), 2);
    }

    #[tokio::test]
    async fn typing_in_contents_updates_the_draft() {
        let repo = MockBoardRepository::new();
        let mut app = app_with(repo);

        app.handle_event(AppEvent::Tab).await.unwrap(); // TaskList -> Contents
        assert_eq!(app.focused_pane, FocusedPane::Contents);
        for c in "milk".chars() {
            app.handle_event(AppEvent::Character(c)).await.unwrap();
        }
        assert_eq!(app.board.draft().contents(), "milk");

        app.handle_event(AppEvent::Backspace).await.unwrap();
        assert_eq!(app.board.draft().contents(), "mil");
    }
}
