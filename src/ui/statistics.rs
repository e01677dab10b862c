use chrono::{DateTime, Local};
use chrono_humanize::HumanTime;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Tabs},
    Frame,
};

use super::screen::{AppContext, Screen, Transition};
use super::{
    accent, bad, bold, dim, frame_layout, good, is_down, is_up, pad, render_hints, render_title,
    selected, step_index,
};
use crate::operation::Difficulty;
use crate::stats::{
    AnswerRow, ModeStats, OperationStats, Overview, SessionFilter, SessionRow, StatsDb,
    TrendPoint,
};

const RECENT_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Overview,
    Modes,
    Operations,
    Trends,
    Recent,
}

const TABS: [Tab; 5] = [
    Tab::Overview,
    Tab::Modes,
    Tab::Operations,
    Tab::Trends,
    Tab::Recent,
];

impl Tab {
    fn title(self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Modes => "Modes",
            Tab::Operations => "Operations",
            Tab::Trends => "Trends",
            Tab::Recent => "Recent",
        }
    }

    fn filtered(self) -> bool {
        matches!(self, Tab::Trends | Tab::Recent)
    }
}

#[derive(Debug, Default)]
struct Loaded {
    overview: Overview,
    modes: Vec<ModeStats>,
    operations: Vec<OperationStats>,
    trends: Vec<TrendPoint>,
    recent: Vec<SessionRow>,
}

impl Loaded {
    fn query(db: &StatsDb, filter: &SessionFilter) -> crate::stats::Result<Self> {
        let mut loaded = Self {
            overview: db.overview()?,
            modes: db.mode_stats()?,
            operations: db.operation_stats()?,
            ..Self::default()
        };
        loaded.query_filtered(db, filter)?;
        Ok(loaded)
    }

    fn query_filtered(&mut self, db: &StatsDb, filter: &SessionFilter) -> crate::stats::Result<()> {
        let now = Local::now();
        self.trends = db.trends(filter, now)?;
        self.recent = db.sessions(filter, now, Some(RECENT_LIMIT))?;
        Ok(())
    }
}

/// One past session opened from the Recent tab
#[derive(Debug)]
struct Detail {
    session: SessionRow,
    answers: Vec<AnswerRow>,
}

/// History browser over the statistics database
#[derive(Debug, Default)]
pub struct StatisticsScreen {
    tab: usize,
    filter: SessionFilter,
    cursor: usize,
    data: Option<Loaded>,
    detail: Option<Detail>,
    error: Option<String>,
}

/// "5 minutes ago" style age of a session
pub fn age_text(played_at: DateTime<Local>, now: DateTime<Local>) -> String {
    HumanTime::from(played_at - now).to_string()
}

fn accuracy_style(accuracy: f64) -> Style {
    let color = if accuracy >= 90.0 {
        Color::Green
    } else if accuracy >= 70.0 {
        Color::Yellow
    } else {
        Color::Red
    };
    Style::default().fg(color)
}

fn ms(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}s", v / 1000.0))
        .unwrap_or_else(|| "-".to_string())
}

/// Any difficulty, then each tier in order
fn next_difficulty(current: Option<Difficulty>) -> Option<Difficulty> {
    match current {
        None => Some(Difficulty::Beginner),
        Some(Difficulty::Expert) => None,
        Some(d) => Some(d.next()),
    }
}

fn next_mode(current: Option<&str>, ctx: &AppContext) -> Option<String> {
    let ids = ctx.modes.ids();
    let next = match current {
        None => ids.first(),
        Some(id) => ids
            .iter()
            .position(|m| *m == id)
            .and_then(|i| ids.get(i + 1)),
    };
    next.map(|id| id.to_string())
}

impl StatisticsScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reload everything from the database. A missing database leaves the
    /// screen in its "unavailable" state.
    pub fn refresh(&mut self, db: Option<&StatsDb>) {
        self.tab = 0;
        self.filter = SessionFilter::default();
        self.cursor = 0;
        self.data = None;
        self.detail = None;
        self.error = None;
        let Some(db) = db else {
            return;
        };
        match Loaded::query(db, &self.filter) {
            Ok(loaded) => self.data = Some(loaded),
            Err(err) => {
                tracing::warn!("failed to load statistics: {err}");
                self.error = Some(err.to_string());
            }
        }
    }

    fn current_tab(&self) -> Tab {
        TABS[self.tab]
    }

    fn set_filter(&mut self, filter: SessionFilter, db: Option<&StatsDb>) {
        self.filter = filter;
        self.cursor = 0;
        let (Some(db), Some(data)) = (db, self.data.as_mut()) else {
            return;
        };
        tracing::debug!(filter = ?self.filter, "reloading filtered statistics");
        if let Err(err) = data.query_filtered(db, &self.filter) {
            tracing::warn!("failed to load statistics: {err}");
            self.error = Some(err.to_string());
        }
    }

    fn open_detail(&mut self, db: Option<&StatsDb>) {
        let (Some(db), Some(data)) = (db, self.data.as_ref()) else {
            return;
        };
        let Some(session) = data.recent.get(self.cursor) else {
            return;
        };
        match db.session_answers(session.id) {
            Ok(answers) => {
                self.detail = Some(Detail {
                    session: session.clone(),
                    answers,
                })
            }
            Err(err) => tracing::warn!(session = session.id, "failed to load answers: {err}"),
        }
    }

    fn filter_text(&self, ctx: &AppContext) -> String {
        let mode = match &self.filter.mode_id {
            Some(id) => ctx
                .modes
                .get(id)
                .map(|m| m.name.clone())
                .unwrap_or_else(|| id.clone()),
            None => "All modes".to_string(),
        };
        let difficulty = self
            .filter
            .difficulty
            .map(|d| d.to_string())
            .unwrap_or_else(|| "Any difficulty".to_string());
        format!("{} · {} · {}", self.filter.period.label(), mode, difficulty)
    }

    fn render_overview(f: &mut Frame, area: Rect, overview: &Overview) {
        let row = |label: &str, value: String| {
            Line::from(vec![
                Span::styled(pad(label, 18), dim()),
                Span::styled(value, bold()),
            ])
        };
        let minutes = overview.seconds_played / 60;
        let lines = vec![
            row("Sessions", overview.sessions.to_string()),
            row("Time played", format!("{minutes} min")),
            row(
                "Answers",
                format!(
                    "{} correct · {} wrong · {} skipped",
                    overview.correct, overview.incorrect, overview.skipped
                ),
            ),
            Line::from(vec![
                Span::styled(pad("Accuracy", 18), dim()),
                Span::styled(
                    format!("{:.0}%", overview.accuracy()),
                    accuracy_style(overview.accuracy()),
                ),
            ]),
            row("Avg response", ms(overview.avg_response_ms)),
            row("Best streak", overview.best_streak.to_string()),
            row(
                "Best score",
                overview
                    .best_points
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ];
        f.render_widget(Paragraph::new(lines), area);
    }

    fn table<'a>(header: &'a [&'a str], rows: Vec<Row<'a>>, widths: &'a [Constraint]) -> Table<'a> {
        Table::new(rows, widths.iter().copied())
            .header(Row::new(header.iter().copied()).style(bold()).bottom_margin(1))
            .block(Block::default().borders(Borders::TOP))
    }

    fn render_modes(f: &mut Frame, area: Rect, modes: &[ModeStats], ctx: &AppContext) {
        let rows = modes
            .iter()
            .map(|m| {
                let name = ctx
                    .modes
                    .get(&m.mode_id)
                    .map(|mode| mode.name.clone())
                    .unwrap_or_else(|| m.mode_id.clone());
                Row::new(vec![
                    Cell::from(name).style(bold()),
                    Cell::from(m.sessions.to_string()),
                    Cell::from(m.best_points.to_string()),
                    Cell::from(format!("{:.0}%", m.accuracy)).style(accuracy_style(m.accuracy)),
                    Cell::from(ms(m.avg_response_ms)),
                ])
            })
            .collect();
        let widths = [
            Constraint::Percentage(32),
            Constraint::Percentage(14),
            Constraint::Percentage(18),
            Constraint::Percentage(16),
            Constraint::Percentage(20),
        ];
        f.render_widget(
            Self::table(&["Mode", "Games", "Best", "Accuracy", "Avg"], rows, &widths),
            area,
        );
    }

    fn render_operations(f: &mut Frame, area: Rect, operations: &[OperationStats]) {
        let rows = operations
            .iter()
            .map(|op| {
                Row::new(vec![
                    Cell::from(op.operation.clone()).style(bold()),
                    Cell::from(op.attempts.to_string()),
                    Cell::from(format!("{:.0}%", op.accuracy())).style(accuracy_style(op.accuracy())),
                    Cell::from(ms(op.avg_response_ms)),
                ])
            })
            .collect();
        let widths = [
            Constraint::Percentage(34),
            Constraint::Percentage(20),
            Constraint::Percentage(22),
            Constraint::Percentage(24),
        ];
        f.render_widget(
            Self::table(&["Operation", "Attempts", "Accuracy", "Avg"], rows, &widths),
            area,
        );
    }

    fn render_trends(f: &mut Frame, area: Rect, trends: &[TrendPoint]) {
        if trends.is_empty() {
            f.render_widget(
                Paragraph::new(Span::styled("No games match this filter", dim()))
                    .alignment(Alignment::Center),
                area,
            );
            return;
        }
        let rows = trends
            .iter()
            .rev()
            .map(|t| {
                Row::new(vec![
                    Cell::from(t.day.format("%a %d %b").to_string()).style(bold()),
                    Cell::from(t.sessions.to_string()),
                    Cell::from(format!("{:.0}%", t.accuracy())).style(accuracy_style(t.accuracy())),
                    Cell::from(ms(t.avg_response_ms)),
                    Cell::from(t.total_points.to_string()),
                ])
            })
            .collect();
        let widths = [
            Constraint::Percentage(28),
            Constraint::Percentage(14),
            Constraint::Percentage(18),
            Constraint::Percentage(20),
            Constraint::Percentage(20),
        ];
        f.render_widget(
            Self::table(&["Day", "Games", "Accuracy", "Avg", "Points"], rows, &widths),
            area,
        );
    }

    fn render_recent(
        f: &mut Frame,
        area: Rect,
        recent: &[SessionRow],
        cursor: usize,
        now: DateTime<Local>,
    ) {
        if recent.is_empty() {
            f.render_widget(
                Paragraph::new(Span::styled("No games match this filter", dim()))
                    .alignment(Alignment::Center),
                area,
            );
            return;
        }
        let rows = recent
            .iter()
            .map(|s| {
                Row::new(vec![
                    Cell::from(age_text(s.played_at, now)).style(dim()),
                    Cell::from(s.mode_id.clone()).style(bold()),
                    Cell::from(format!("{} · {}s", s.difficulty, s.duration_secs)),
                    Cell::from(format!("{}/{}", s.correct, s.correct + s.incorrect)),
                    Cell::from(s.points.to_string()),
                ])
            })
            .collect();
        let widths = [
            Constraint::Percentage(24),
            Constraint::Percentage(24),
            Constraint::Percentage(22),
            Constraint::Percentage(14),
            Constraint::Percentage(16),
        ];
        let table = Self::table(&["When", "Mode", "Setup", "Correct", "Points"], rows, &widths)
            .row_highlight_style(selected());
        let mut state = TableState::default().with_selected(Some(cursor));
        f.render_stateful_widget(table, area, &mut state);
    }

    fn render_detail(f: &mut Frame, area: Rect, detail: &Detail, ctx: &AppContext) {
        let s = &detail.session;
        let name = ctx
            .modes
            .get(&s.mode_id)
            .map(|m| m.name.clone())
            .unwrap_or_else(|| s.mode_id.clone());
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let summary = vec![
            Line::from(vec![
                Span::styled(name, bold()),
                Span::styled(format!("  {} · {}s", s.difficulty, s.duration_secs), dim()),
                Span::styled(
                    format!("  {}", s.played_at.format("%Y-%m-%d %H:%M")),
                    dim(),
                ),
            ]),
            Line::from(vec![
                Span::styled(format!("{} points", s.points), accent()),
                Span::raw(format!(
                    "  {} correct · {} wrong · {} skipped · best streak {}  ",
                    s.correct, s.incorrect, s.skipped, s.best_streak
                )),
                Span::styled(format!("{:.0}%", s.accuracy()), accuracy_style(s.accuracy())),
            ]),
        ];
        f.render_widget(Paragraph::new(summary), chunks[0]);

        let rows = detail
            .answers
            .iter()
            .enumerate()
            .map(|(i, a)| {
                let (mark, style) = if a.skipped {
                    ("skipped", dim())
                } else if a.correct {
                    ("✓", good())
                } else {
                    ("✗", bad())
                };
                Row::new(vec![
                    Cell::from((i + 1).to_string()).style(dim()),
                    Cell::from(a.problem.clone()).style(bold()),
                    Cell::from(a.answer.to_string()),
                    Cell::from(
                        a.user_answer
                            .map(|v| v.to_string())
                            .unwrap_or_else(|| "-".to_string()),
                    ),
                    Cell::from(format!("{:.1}s", a.response_ms as f64 / 1000.0)),
                    Cell::from(mark).style(style),
                ])
            })
            .collect();
        let widths = [
            Constraint::Percentage(8),
            Constraint::Percentage(30),
            Constraint::Percentage(16),
            Constraint::Percentage(16),
            Constraint::Percentage(14),
            Constraint::Percentage(16),
        ];
        f.render_widget(
            Self::table(&["#", "Problem", "Answer", "Yours", "Time", ""], rows, &widths),
            chunks[1],
        );
    }
}

impl Screen for StatisticsScreen {
    fn handle_key(&mut self, key: KeyEvent, ctx: &AppContext) -> Option<Transition> {
        if self.detail.is_some() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Backspace) {
                self.detail = None;
            }
            return None;
        }

        let db = ctx.stats.as_ref();
        match key.code {
            KeyCode::Right | KeyCode::Tab | KeyCode::Char('l') => {
                self.tab = step_index(self.tab, TABS.len(), true);
                None
            }
            KeyCode::Left | KeyCode::BackTab | KeyCode::Char('h') => {
                self.tab = step_index(self.tab, TABS.len(), false);
                None
            }
            KeyCode::Char('f') => {
                let filter = SessionFilter {
                    period: self.filter.period.next(),
                    ..self.filter.clone()
                };
                self.set_filter(filter, db);
                None
            }
            KeyCode::Char('d') => {
                let filter = SessionFilter {
                    difficulty: next_difficulty(self.filter.difficulty),
                    ..self.filter.clone()
                };
                self.set_filter(filter, db);
                None
            }
            KeyCode::Char('m') => {
                let filter = SessionFilter {
                    mode_id: next_mode(self.filter.mode_id.as_deref(), ctx),
                    ..self.filter.clone()
                };
                self.set_filter(filter, db);
                None
            }
            _ if self.current_tab() == Tab::Recent && (is_up(&key) || is_down(&key)) => {
                let len = self.data.as_ref().map_or(0, |d| d.recent.len());
                self.cursor = step_index(self.cursor, len, is_down(&key));
                None
            }
            KeyCode::Enter if self.current_tab() == Tab::Recent => {
                self.open_detail(db);
                None
            }
            KeyCode::Esc | KeyCode::Char('q') => Some(Transition::BackToMenu),
            _ => None,
        }
    }

    fn render(&mut self, f: &mut Frame, ctx: &AppContext) {
        let (header, body, footer) = frame_layout(f.area());

        if let Some(detail) = self.detail.as_ref() {
            render_title(f, header, "Session");
            render_hints(f, footer, &[("esc", "back")]);
            Self::render_detail(f, body, detail, ctx);
            return;
        }

        render_title(f, header, "Statistics");
        let tab = self.current_tab();
        let hints: &[(&str, &str)] = match tab {
            Tab::Recent => &[
                ("←→", "tab"),
                ("↑↓", "select"),
                ("enter", "details"),
                ("f/m/d", "filter"),
                ("esc", "menu"),
            ],
            Tab::Trends => &[("←→", "tab"), ("f/m/d", "filter"), ("esc", "menu")],
            _ => &[("←→", "tab"), ("esc", "menu")],
        };
        render_hints(f, footer, hints);

        let Some(data) = self.data.as_ref() else {
            let message = match &self.error {
                Some(err) => format!("Statistics could not be loaded: {err}"),
                None => "Statistics unavailable".to_string(),
            };
            f.render_widget(
                Paragraph::new(Span::styled(message, dim())).alignment(Alignment::Center),
                body,
            );
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(if tab.filtered() { 2 } else { 0 }),
                Constraint::Min(0),
            ])
            .split(body);
        let titles: Vec<&str> = TABS.iter().map(|t| t.title()).collect();
        f.render_widget(
            Tabs::new(titles)
                .select(self.tab)
                .style(dim())
                .highlight_style(selected()),
            chunks[0],
        );

        if data.overview.sessions == 0 {
            f.render_widget(
                Paragraph::new(Span::styled("No games played yet", accent()))
                    .alignment(Alignment::Center),
                chunks[2],
            );
            return;
        }

        if tab.filtered() {
            f.render_widget(
                Paragraph::new(Span::styled(self.filter_text(ctx), dim())),
                chunks[1],
            );
        }

        match tab {
            Tab::Overview => Self::render_overview(f, chunks[2], &data.overview),
            Tab::Modes => Self::render_modes(f, chunks[2], &data.modes, ctx),
            Tab::Operations => Self::render_operations(f, chunks[2], &data.operations),
            Tab::Trends => Self::render_trends(f, chunks[2], &data.trends),
            Tab::Recent => {
                Self::render_recent(f, chunks[2], &data.recent, self.cursor, Local::now())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_context;
    use crate::operation::Builtin;
    use crate::stats::TimePeriod;
    use crate::session::Session;
    use crate::ui::test_support::render_to_string;
    use crossterm::event::KeyModifiers;
    use rand::{rngs::StdRng, SeedableRng};
    use std::sync::Arc;
    use std::time::Duration;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn db_with_one_game() -> StatsDb {
        let mut db = StatsDb::open_in_memory().unwrap();
        let mut session = Session::with_rng(
            vec![Arc::new(Builtin::Addition)],
            Difficulty::Easy,
            Duration::from_secs(30),
            StdRng::seed_from_u64(3),
        );
        session.tick(Duration::from_secs(2));
        session.submit(session.current_problem().answer);
        let snapshot = session.tick(Duration::from_secs(30)).unwrap();
        db.record_session("addition", &snapshot, Local::now()).unwrap();
        db
    }

    #[test]
    fn age_is_humanized() {
        let now = Local::now();
        assert_eq!(age_text(now - chrono::Duration::minutes(5), now), "5 minutes ago");
        assert_eq!(age_text(now, now), "now");
    }

    #[test]
    fn without_database_shows_unavailable() {
        let ctx = test_context();
        let mut stats = StatisticsScreen::new();
        stats.refresh(None);
        let text = render_to_string(80, 20, |f| stats.render(f, &ctx));
        assert!(text.contains("Statistics unavailable"));
        assert_eq!(stats.handle_key(key(KeyCode::Esc), &ctx), Some(Transition::BackToMenu));
    }

    #[test]
    fn tabs_cycle_and_render() {
        let ctx = test_context();
        let db = db_with_one_game();
        let mut stats = StatisticsScreen::new();
        stats.refresh(Some(&db));

        let text = render_to_string(90, 24, |f| stats.render(f, &ctx));
        assert!(text.contains("Sessions"));
        assert!(text.contains("100%"));

        stats.handle_key(key(KeyCode::Right), &ctx);
        assert_eq!(stats.current_tab(), Tab::Modes);
        let text = render_to_string(90, 24, |f| stats.render(f, &ctx));
        assert!(text.contains("Addition"));

        stats.handle_key(key(KeyCode::Left), &ctx);
        stats.handle_key(key(KeyCode::Left), &ctx);
        assert_eq!(stats.current_tab(), Tab::Recent);
        stats.handle_key(key(KeyCode::Left), &ctx);
        assert_eq!(stats.current_tab(), Tab::Trends);
        let text = render_to_string(90, 24, |f| stats.render(f, &ctx));
        assert!(text.contains("All time · All modes · Any difficulty"));
        assert!(text.contains(&Local::now().format("%a %d %b").to_string()));

        stats.handle_key(key(KeyCode::Right), &ctx);
        assert_eq!(stats.current_tab(), Tab::Recent);
        let text = render_to_string(90, 24, |f| stats.render(f, &ctx));
        assert!(text.contains("addition"));
        assert!(text.contains("Easy · 30s"));
    }

    #[test]
    fn empty_database_says_so() {
        let ctx = test_context();
        let db = StatsDb::open_in_memory().unwrap();
        let mut stats = StatisticsScreen::new();
        stats.refresh(Some(&db));
        let text = render_to_string(80, 20, |f| stats.render(f, &ctx));
        assert!(text.contains("No games played yet"));
    }

    fn context_with(db: StatsDb) -> AppContext {
        let mut ctx = test_context();
        ctx.stats = Some(db);
        ctx
    }

    #[test]
    fn filter_keys_narrow_recent_and_trends() {
        let ctx = context_with(db_with_one_game());
        let mut stats = StatisticsScreen::new();
        stats.refresh(ctx.stats.as_ref());
        stats.tab = TABS.iter().position(|t| *t == Tab::Recent).unwrap();

        stats.handle_key(key(KeyCode::Char('d')), &ctx);
        assert_eq!(stats.filter.difficulty, Some(Difficulty::Beginner));
        let data = stats.data.as_ref().unwrap();
        assert!(data.recent.is_empty());
        assert!(data.trends.is_empty());
        let text = render_to_string(90, 24, |f| stats.render(f, &ctx));
        assert!(text.contains("No games match this filter"));

        stats.handle_key(key(KeyCode::Char('d')), &ctx);
        assert_eq!(stats.filter.difficulty, Some(Difficulty::Easy));
        assert_eq!(stats.data.as_ref().unwrap().recent.len(), 1);

        stats.handle_key(key(KeyCode::Char('f')), &ctx);
        assert_eq!(stats.filter.period, TimePeriod::Last7Days);
        assert_eq!(stats.data.as_ref().unwrap().trends.len(), 1);
        let text = render_to_string(90, 24, |f| stats.render(f, &ctx));
        assert!(text.contains("Last 7 days"));

        stats.handle_key(key(KeyCode::Char('m')), &ctx);
        assert_eq!(stats.filter.mode_id.as_deref(), Some("addition"));
        assert_eq!(stats.data.as_ref().unwrap().recent.len(), 1);
        stats.handle_key(key(KeyCode::Char('m')), &ctx);
        assert!(stats.data.as_ref().unwrap().recent.is_empty());

        // overview totals ignore the filter
        assert_eq!(stats.data.as_ref().unwrap().overview.sessions, 1);
    }

    #[test]
    fn enter_on_recent_opens_the_session_answers() {
        let ctx = context_with(db_with_one_game());
        let mut stats = StatisticsScreen::new();
        stats.refresh(ctx.stats.as_ref());

        // enter does nothing outside the Recent tab
        stats.handle_key(key(KeyCode::Enter), &ctx);
        assert!(stats.detail.is_none());

        stats.handle_key(key(KeyCode::Left), &ctx);
        assert_eq!(stats.current_tab(), Tab::Recent);
        stats.handle_key(key(KeyCode::Down), &ctx);
        assert_eq!(stats.cursor, 0);
        stats.handle_key(key(KeyCode::Enter), &ctx);

        let detail = stats.detail.as_ref().unwrap();
        assert_eq!(detail.session.mode_id, "addition");
        assert_eq!(detail.answers.len(), 1);
        assert!(detail.answers[0].correct);
        let problem = detail.answers[0].problem.clone();

        let text = render_to_string(90, 24, |f| stats.render(f, &ctx));
        assert!(text.contains("Session"));
        assert!(text.contains(&problem));
        assert!(text.contains("Yours"));
        assert!(text.contains("2.0s"));

        assert_eq!(stats.handle_key(key(KeyCode::Esc), &ctx), None);
        assert!(stats.detail.is_none());
        assert_eq!(stats.handle_key(key(KeyCode::Esc), &ctx), Some(Transition::BackToMenu));
    }
}
