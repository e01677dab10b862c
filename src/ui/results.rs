use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use super::charting::{compute_chart_bounds, format_label, response_points};
use super::screen::{AppContext, Screen, Transition};
use super::{accent, bold, dim, frame_layout, pad, render_hints, render_title};
use crate::session::SessionSnapshot;
use crate::util::format_secs;

/// End-of-game summary
#[derive(Debug, Default)]
pub struct ResultsScreen {
    mode_name: String,
    snapshot: Option<SessionSnapshot>,
}

impl ResultsScreen {
    pub fn show(&mut self, mode_name: &str, snapshot: SessionSnapshot) {
        self.mode_name = mode_name.to_string();
        self.snapshot = Some(snapshot);
    }

    pub fn snapshot(&self) -> Option<&SessionSnapshot> {
        self.snapshot.as_ref()
    }
}

fn stat_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(pad(label, 16), dim()),
        Span::styled(value, bold()),
    ])
}

impl Screen for ResultsScreen {
    fn handle_key(&mut self, key: KeyEvent, _ctx: &AppContext) -> Option<Transition> {
        match key.code {
            KeyCode::Enter | KeyCode::Char('r') => Some(Transition::PlayAgain),
            KeyCode::Char('m') | KeyCode::Char('q') | KeyCode::Esc => Some(Transition::BackToMenu),
            _ => None,
        }
    }

    fn render(&mut self, f: &mut Frame, _ctx: &AppContext) {
        let (header, body, footer) = frame_layout(f.area());
        render_title(f, header, &format!("{} · results", self.mode_name));
        let Some(snapshot) = self.snapshot.as_ref() else {
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(9), Constraint::Min(0)])
            .split(body);

        let score = &snapshot.score;
        let or_dash = |d: Option<std::time::Duration>| d.map(format_secs).unwrap_or("-".into());
        let lines = vec![
            Line::from(Span::styled(format!("{} points", score.points), accent())),
            Line::from(""),
            stat_line(
                "Answered",
                format!(
                    "{} correct · {} wrong · {} skipped",
                    score.correct, score.incorrect, score.skipped
                ),
            ),
            stat_line("Accuracy", format!("{:.0}%", snapshot.accuracy())),
            stat_line("Best streak", score.best_streak.to_string()),
            stat_line("Avg response", or_dash(snapshot.avg_response_time())),
            stat_line("Fastest", or_dash(snapshot.fastest_response_time())),
            stat_line("Consistency", or_dash(snapshot.response_std_dev())),
            stat_line(
                "Difficulty",
                format!(
                    "{} · {}s",
                    snapshot.difficulty,
                    snapshot.total_duration.as_secs()
                ),
            ),
        ];
        f.render_widget(Paragraph::new(lines).alignment(Alignment::Left), chunks[0]);

        let (correct, wrong) = response_points(&snapshot.history);
        if chunks[1].height >= 6 && !(correct.is_empty() && wrong.is_empty()) {
            let all: Vec<(f64, f64)> = correct.iter().chain(&wrong).copied().collect();
            let (questions, slowest) = compute_chart_bounds(snapshot.history.len(), &all);
            let datasets = vec![
                Dataset::default()
                    .marker(symbols::Marker::Dot)
                    .graph_type(GraphType::Scatter)
                    .style(Style::default().fg(Color::Green))
                    .data(&correct),
                Dataset::default()
                    .marker(symbols::Marker::Dot)
                    .graph_type(GraphType::Scatter)
                    .style(Style::default().fg(Color::Red))
                    .data(&wrong),
            ];
            let chart = Chart::new(datasets)
                .x_axis(
                    Axis::default()
                        .title("question")
                        .bounds([0.0, questions + 1.0])
                        .labels(vec![
                            Span::styled("1", bold()),
                            Span::styled(format_label(questions), bold()),
                        ]),
                )
                .y_axis(
                    Axis::default()
                        .title("seconds")
                        .bounds([0.0, slowest])
                        .labels(vec![
                            Span::styled("0", bold()),
                            Span::styled(format_label(slowest), bold()),
                        ]),
                );
            f.render_widget(chart, chunks[1]);
        }

        render_hints(f, footer, &[("enter", "play again"), ("m", "menu")]);
    }
}
