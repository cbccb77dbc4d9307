use std::collections::BTreeSet;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout},
    style::Style,
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, TableState},
    DefaultTerminal, Frame,
};

use crate::error::Result;
use crate::filter::{filter_records, FilterSpec};
use crate::fmt::{money, pct};
use crate::loader::{LoadState, ProjectLoader, SharedStore};
use crate::models::Project;
use crate::pager::Pager;
use crate::tui::{self, ERROR_STYLE, FOOTER_STYLE, HEADER_STYLE, SELECTED_STYLE};

const PAGE_SIZE_STEPS: &[usize] = &[5, 10, 20, 50];
const POLL_INTERVAL: Duration = Duration::from_millis(100);

enum BrowseMode {
    Normal,
    Search(String),
}

pub enum BrowseAction {
    Continue,
    Close,
}

#[derive(Debug, Clone, Copy)]
enum CycleField {
    Status,
    Organisation,
    Country,
    Year,
}

/// Distinct values offered when cycling a filter.
#[derive(Debug, Default)]
struct FilterOptions {
    statuses: Vec<String>,
    organisations: Vec<String>,
    countries: Vec<String>,
    years: Vec<String>,
}

impl FilterOptions {
    fn from_projects(projects: &[Project]) -> Self {
        fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
            values
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect()
        }
        Self {
            statuses: distinct(projects.iter().map(|p| p.status.as_str())),
            organisations: distinct(projects.iter().map(|p| p.organisation.as_str())),
            countries: distinct(projects.iter().map(|p| p.country())),
            years: distinct(projects.iter().map(|p| p.year())),
        }
    }
}

/// Next value after `current`; past the last option wraps back to "all" (`None`).
fn cycle_value(current: Option<&str>, options: &[String]) -> Option<String> {
    let next = match current {
        None => 0,
        Some(v) => match options.iter().position(|o| o == v) {
            Some(i) => i + 1,
            None => 0,
        },
    };
    options.get(next).cloned()
}

fn step_page_size(current: usize, up: bool) -> usize {
    if up {
        PAGE_SIZE_STEPS
            .iter()
            .copied()
            .find(|&s| s > current)
            .unwrap_or(current)
    } else {
        PAGE_SIZE_STEPS
            .iter()
            .rev()
            .copied()
            .find(|&s| s < current)
            .unwrap_or(current)
    }
}

/// Text of the project detail panel for a loader state.
fn detail_lines(state: &LoadState, base: &str) -> Vec<String> {
    match state {
        LoadState::Idle => vec![],
        LoadState::Loading { project_id } => vec![format!("Loading {project_id}...")],
        LoadState::Failed { project_id, message } => {
            vec![format!("Could not load {project_id}: {message}  (r: retry)")]
        }
        LoadState::Ready(snap) => {
            let budget = snap.budget(None);
            let k = snap.kpis(None, base);
            let p = &snap.project;
            let budget_text = if budget.is_placeholder() {
                format!("{} (placeholder)", money(k.total_budget, base))
            } else {
                money(k.total_budget, base)
            };
            vec![
                format!("{} {} | {} | {}", p.id, p.name, p.organisation, p.location),
                format!(
                    "Budget {budget_text}  Spent {}  Remaining {}  Execution {}",
                    money(k.spent, base),
                    money(k.remaining(), base),
                    pct(k.execution_pct)
                ),
                format!(
                    "Admin {} ({})  Reports {} validated, {} pending  Beneficiaries {}  ({base})",
                    money(k.admin_spent, base),
                    pct(k.admin_share_pct),
                    k.reports_valid,
                    k.reports_pending,
                    k.beneficiaries_total
                ),
            ]
        }
    }
}

pub struct ProjectsBrowser {
    projects: Vec<Project>,
    filtered: Vec<Project>,
    spec: FilterSpec,
    options: FilterOptions,
    pager: Pager,
    selected: usize,
    mode: BrowseMode,
    detail_id: Option<String>,
    loader: ProjectLoader,
    base_currency: String,
    status_message: Option<String>,
    table_state: TableState,
}

impl ProjectsBrowser {
    pub fn new(projects: Vec<Project>, store: SharedStore, base_currency: &str, page_size: usize) -> Self {
        let options = FilterOptions::from_projects(&projects);
        Self {
            filtered: projects.clone(),
            projects,
            spec: FilterSpec::default(),
            options,
            pager: Pager::new(page_size),
            selected: 0,
            mode: BrowseMode::Normal,
            detail_id: None,
            loader: ProjectLoader::new(store),
            base_currency: base_currency.to_string(),
            status_message: None,
            table_state: TableState::default(),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        if self.projects.is_empty() {
            println!("No projects found.");
            return Ok(());
        }
        tui::with_terminal(|terminal| self.event_loop(terminal))
    }

    /// Re-apply the filter after any change to it. Always returns to page 1.
    fn refilter(&mut self) {
        self.filtered = filter_records(&self.projects, &self.spec);
        self.pager.reset();
        self.selected = 0;
    }

    fn page_len(&mut self) -> usize {
        self.pager.view(&self.filtered).items.len()
    }

    fn selected_id(&mut self) -> Option<String> {
        let selected = self.selected;
        self.pager
            .view(&self.filtered)
            .items
            .get(selected)
            .map(|p| p.id.clone())
    }

    fn cycle(&mut self, field: CycleField) {
        let (slot, options) = match field {
            CycleField::Status => (&mut self.spec.status, &self.options.statuses),
            CycleField::Organisation => (&mut self.spec.organisation, &self.options.organisations),
            CycleField::Country => (&mut self.spec.country, &self.options.countries),
            CycleField::Year => (&mut self.spec.year, &self.options.years),
        };
        *slot = cycle_value(slot.as_deref(), options);
        self.refilter();
    }

    fn open(&mut self, project_id: String) {
        self.loader.request(&project_id);
        self.detail_id = Some(project_id);
    }

    /// Open the previous/next project of the filtered list, following it across pages.
    fn step_detail(&mut self, forward: bool) {
        let Some(current) = self.detail_id.clone().or_else(|| self.selected_id()) else {
            return;
        };
        let Some(idx) = self.filtered.iter().position(|p| p.id == current) else {
            return;
        };
        let target = if forward {
            (idx + 1).min(self.filtered.len() - 1)
        } else {
            idx.saturating_sub(1)
        };
        let size = self.pager.page_size();
        self.pager.go_to(target / size + 1, self.filtered.len());
        self.selected = target % size;
        let id = self.filtered[target].id.clone();
        self.open(id);
    }

    /// Handle a key event. Returns a BrowseAction indicating what the caller should do.
    pub fn handle_key_event(&mut self, code: KeyCode) -> BrowseAction {
        self.status_message = None;

        if let BrowseMode::Search(ref mut query) = self.mode {
            match code {
                KeyCode::Esc => {
                    self.mode = BrowseMode::Normal;
                    self.spec.search = None;
                    self.refilter();
                }
                KeyCode::Enter => self.mode = BrowseMode::Normal,
                KeyCode::Backspace => {
                    query.pop();
                    self.spec.search = Some(query.clone());
                    self.refilter();
                }
                KeyCode::Char(c) => {
                    query.push(c);
                    self.spec.search = Some(query.clone());
                    self.refilter();
                }
                _ => {}
            }
            return BrowseAction::Continue;
        }

        match code {
            KeyCode::Char('q') => return BrowseAction::Close,
            KeyCode::Esc => {
                if self.detail_id.take().is_none() {
                    return BrowseAction::Close;
                }
            }
            KeyCode::Down => {
                if self.selected + 1 < self.page_len() {
                    self.selected += 1;
                }
            }
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Char('n') | KeyCode::Right | KeyCode::PageDown => {
                self.pager.next(self.filtered.len());
                self.selected = 0;
            }
            KeyCode::Char('p') | KeyCode::Left | KeyCode::PageUp => {
                self.pager.prev(self.filtered.len());
                self.selected = 0;
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.pager.set_page_size(step_page_size(self.pager.page_size(), true));
                self.selected = 0;
            }
            KeyCode::Char('-') => {
                self.pager.set_page_size(step_page_size(self.pager.page_size(), false));
                self.selected = 0;
            }
            KeyCode::Home => {
                self.pager.reset();
                self.selected = 0;
            }
            KeyCode::End => {
                self.pager.last(self.filtered.len());
                self.selected = 0;
            }
            KeyCode::Char('/') => {
                let current = self.spec.search.clone().unwrap_or_default();
                self.mode = BrowseMode::Search(current);
            }
            KeyCode::Char('s') => self.cycle(CycleField::Status),
            KeyCode::Char('o') => self.cycle(CycleField::Organisation),
            KeyCode::Char('c') => self.cycle(CycleField::Country),
            KeyCode::Char('y') => self.cycle(CycleField::Year),
            KeyCode::Enter => {
                if let Some(id) = self.selected_id() {
                    self.open(id);
                }
            }
            KeyCode::Char('[') => self.step_detail(false),
            KeyCode::Char(']') => self.step_detail(true),
            KeyCode::Char('r') => {
                if matches!(self.loader.state(), LoadState::Failed { .. }) {
                    self.loader.retry();
                } else {
                    self.status_message = Some("Nothing to retry".to_string());
                }
            }
            KeyCode::Char('x') => {
                self.spec = FilterSpec::default();
                self.refilter();
            }
            _ => {}
        }
        BrowseAction::Continue
    }

    /// Draw the browser into the given frame.
    pub fn draw_frame(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let detail = if self.detail_id.is_some() {
            detail_lines(self.loader.state(), &self.base_currency)
        } else {
            vec![]
        };
        let detail_height = if detail.is_empty() { 0 } else { detail.len() as u16 + 1 };

        let areas = Layout::vertical([
            Constraint::Length(1),             // title
            Constraint::Length(1),             // filters
            Constraint::Fill(1),               // table
            Constraint::Length(detail_height), // detail panel
            Constraint::Length(1),             // status
            Constraint::Length(1),             // keys
        ])
        .split(area);

        frame.render_widget(Paragraph::new("Projects").style(HEADER_STYLE), areas[0]);

        let filters = if self.spec.is_empty() {
            "all projects".to_string()
        } else {
            self.spec.describe()
        };
        frame.render_widget(Paragraph::new(filters).style(FOOTER_STYLE), areas[1]);

        let page = self.pager.view(&self.filtered);
        let (first, last, total, page_no, pages) = (
            page.first_row(),
            page.last_row(),
            page.total_items,
            page.page,
            page.total_pages,
        );
        let rows: Vec<Row> = page
            .items
            .iter()
            .map(|p| {
                Row::new(vec![
                    Cell::from(p.id.clone()),
                    Cell::from(p.name.clone()),
                    Cell::from(p.organisation.clone()),
                    Cell::from(p.country().to_string()),
                    Cell::from(p.start_date.clone()),
                    Cell::from(p.status.as_str()),
                ])
            })
            .collect();
        let empty = rows.is_empty();

        let widths = [
            Constraint::Length(10),
            Constraint::Fill(1),
            Constraint::Length(16),
            Constraint::Length(12),
            Constraint::Length(10),
            Constraint::Length(10),
        ];
        self.table_state.select(if empty { None } else { Some(self.selected) });
        let table = Table::new(rows, widths)
            .header(
                Row::new(["ID", "Name", "Organisation", "Country", "Start", "Status"])
                    .style(HEADER_STYLE)
                    .bottom_margin(1),
            )
            .column_spacing(1)
            .row_highlight_style(SELECTED_STYLE);
        if empty {
            frame.render_widget(Paragraph::new("No results.").style(FOOTER_STYLE), areas[2]);
        } else {
            frame.render_stateful_widget(table, areas[2], &mut self.table_state);
        }

        if detail_height > 0 {
            let style = if matches!(self.loader.state(), LoadState::Failed { .. }) {
                ERROR_STYLE
            } else {
                Style::default()
            };
            let mut lines = vec![Line::from("")];
            lines.extend(detail.into_iter().map(|l| Line::from(Span::styled(l, style))));
            frame.render_widget(Paragraph::new(lines), areas[3]);
        }

        let mut status = format!(
            "Rows {first}-{last} of {total} | Page {page_no}/{pages} | {} per page",
            self.pager.page_size()
        );
        if let Some(ref msg) = self.status_message {
            status.push_str(&format!(" | {msg}"));
        }
        frame.render_widget(Paragraph::new(status).style(FOOTER_STYLE), areas[4]);

        let keys = match &self.mode {
            BrowseMode::Normal => Paragraph::new(
                "\u{2191}/\u{2193}:select  Enter:open  [/]:prev/next  n/p:page  +/-:size  /:search  s/o/c/y:filter  x:clear  r:retry  q:quit",
            )
            .style(FOOTER_STYLE),
            BrowseMode::Search(query) => Paragraph::new(format!("Search: {query}\u{2588}")),
        };
        frame.render_widget(keys, areas[5]);
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            self.loader.poll();
            terminal.draw(|frame| self.draw_frame(frame))?;

            if !event::poll(POLL_INTERVAL)? {
                continue;
            }
            if let Event::Key(KeyEvent {
                code,
                modifiers,
                kind,
                ..
            }) = event::read()?
            {
                if kind != KeyEventKind::Press {
                    continue;
                }
                if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
                    break;
                }
                if let BrowseAction::Close = self.handle_key_event(code) {
                    break;
                }
            }
        }
        Ok(())
    }
}
