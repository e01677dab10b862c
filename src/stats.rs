use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Duration as ChronoDuration, Local, NaiveDate};
use rusqlite::{params, Connection, OptionalExtension, Row};
use thiserror::Error;

use crate::operation::Difficulty;
use crate::session::SessionSnapshot;

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("statistics database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("cannot prepare statistics directory: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StatsError>;

/// Totals across every recorded session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overview {
    pub sessions: i64,
    pub correct: i64,
    pub incorrect: i64,
    pub skipped: i64,
    pub best_streak: i64,
    pub best_points: Option<i64>,
    pub seconds_played: i64,
    pub avg_response_ms: Option<f64>,
}

impl Overview {
    pub fn accuracy(&self) -> f64 {
        match self.correct + self.incorrect {
            0 => 0.0,
            n => self.correct as f64 / n as f64 * 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModeStats {
    pub mode_id: String,
    pub sessions: i64,
    pub best_points: i64,
    pub accuracy: f64,
    pub avg_response_ms: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OperationStats {
    pub operation: String,
    pub attempts: i64,
    pub correct: i64,
    pub avg_response_ms: Option<f64>,
}

impl OperationStats {
    pub fn accuracy(&self) -> f64 {
        match self.attempts {
            0 => 0.0,
            n => self.correct as f64 / n as f64 * 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionRow {
    pub id: i64,
    pub mode_id: String,
    pub difficulty: String,
    pub duration_secs: i64,
    pub correct: i64,
    pub incorrect: i64,
    pub skipped: i64,
    pub best_streak: i64,
    pub points: i64,
    pub avg_response_ms: Option<f64>,
    pub played_at: DateTime<Local>,
}

impl SessionRow {
    pub fn accuracy(&self) -> f64 {
        match self.correct + self.incorrect {
            0 => 0.0,
            n => self.correct as f64 / n as f64 * 100.0,
        }
    }
}

/// One stored answer of a past session
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerRow {
    pub operation: String,
    pub problem: String,
    pub answer: i64,
    pub user_answer: Option<i64>,
    pub correct: bool,
    pub skipped: bool,
    pub response_ms: i64,
}

/// Per-day totals for the trends view
#[derive(Debug, Clone, PartialEq)]
pub struct TrendPoint {
    pub day: NaiveDate,
    pub sessions: i64,
    pub correct: i64,
    pub answered: i64,
    pub total_points: i64,
    pub avg_response_ms: Option<f64>,
}

impl TrendPoint {
    pub fn accuracy(&self) -> f64 {
        match self.answered {
            0 => 0.0,
            n => self.correct as f64 / n as f64 * 100.0,
        }
    }
}

/// How far back history queries look
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimePeriod {
    #[default]
    AllTime,
    Last7Days,
    Last14Days,
    Last30Days,
    Last90Days,
}

impl TimePeriod {
    pub const ALL: [TimePeriod; 5] = [
        TimePeriod::AllTime,
        TimePeriod::Last7Days,
        TimePeriod::Last14Days,
        TimePeriod::Last30Days,
        TimePeriod::Last90Days,
    ];

    pub fn days(self) -> Option<i64> {
        match self {
            TimePeriod::AllTime => None,
            TimePeriod::Last7Days => Some(7),
            TimePeriod::Last14Days => Some(14),
            TimePeriod::Last30Days => Some(30),
            TimePeriod::Last90Days => Some(90),
        }
    }

    pub fn cutoff(self, now: DateTime<Local>) -> Option<DateTime<Local>> {
        self.days().map(|d| now - ChronoDuration::days(d))
    }

    pub fn label(self) -> &'static str {
        match self {
            TimePeriod::AllTime => "All time",
            TimePeriod::Last7Days => "Last 7 days",
            TimePeriod::Last14Days => "Last 14 days",
            TimePeriod::Last30Days => "Last 30 days",
            TimePeriod::Last90Days => "Last 90 days",
        }
    }

    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }
}

/// Narrows session history by mode, difficulty and age
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionFilter {
    pub mode_id: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub period: TimePeriod,
}

impl SessionFilter {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

const SESSION_COLUMNS: &str = "id, mode_id, difficulty, duration_secs, correct, incorrect, \
    skipped, best_streak, points, avg_response_ms, played_at";

fn session_row(row: &Row) -> rusqlite::Result<SessionRow> {
    let played_at: String = row.get(10)?;
    let played_at = DateTime::parse_from_rfc3339(&played_at)
        .map_err(|_| {
            rusqlite::Error::InvalidColumnType(
                10,
                "played_at".to_string(),
                rusqlite::types::Type::Text,
            )
        })?
        .with_timezone(&Local);

    Ok(SessionRow {
        id: row.get(0)?,
        mode_id: row.get(1)?,
        difficulty: row.get(2)?,
        duration_secs: row.get(3)?,
        correct: row.get(4)?,
        incorrect: row.get(5)?,
        skipped: row.get(6)?,
        best_streak: row.get(7)?,
        points: row.get(8)?,
        avg_response_ms: row.get(9)?,
        played_at,
    })
}

/// SQLite-backed history of finished sessions
#[derive(Debug)]
pub struct StatsDb {
    conn: Connection,
}

impl StatsDb {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                mode_id TEXT NOT NULL,
                difficulty TEXT NOT NULL,
                duration_secs INTEGER NOT NULL,
                correct INTEGER NOT NULL,
                incorrect INTEGER NOT NULL,
                skipped INTEGER NOT NULL,
                best_streak INTEGER NOT NULL,
                points INTEGER NOT NULL,
                avg_response_ms REAL,
                played_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS answers (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id INTEGER NOT NULL REFERENCES sessions(id),
                operation TEXT NOT NULL,
                problem TEXT NOT NULL,
                answer INTEGER NOT NULL,
                user_answer INTEGER,
                correct BOOLEAN NOT NULL,
                skipped BOOLEAN NOT NULL,
                response_ms INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_sessions_played_at ON sessions(played_at);
            CREATE INDEX IF NOT EXISTS idx_answers_operation ON answers(operation);
            "#,
        )?;
        Ok(Self { conn })
    }

    /// Store a finished session and its answers in one transaction
    pub fn record_session(
        &mut self,
        mode_id: &str,
        snapshot: &SessionSnapshot,
        played_at: DateTime<Local>,
    ) -> Result<i64> {
        let tx = self.conn.transaction()?;
        tx.execute(
            r#"
            INSERT INTO sessions
            (mode_id, difficulty, duration_secs, correct, incorrect, skipped,
             best_streak, points, avg_response_ms, played_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                mode_id,
                snapshot.difficulty.to_string(),
                snapshot.total_duration.as_secs() as i64,
                snapshot.score.correct,
                snapshot.score.incorrect,
                snapshot.score.skipped,
                snapshot.score.best_streak,
                snapshot.score.points,
                snapshot
                    .avg_response_time()
                    .map(|d| d.as_secs_f64() * 1000.0),
                played_at.to_rfc3339(),
            ],
        )?;
        let session_id = tx.last_insert_rowid();

        for record in &snapshot.history {
            tx.execute(
                r#"
                INSERT INTO answers
                (session_id, operation, problem, answer, user_answer, correct, skipped, response_ms)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
                params![
                    session_id,
                    record.problem.operation,
                    record.problem.display,
                    record.problem.answer,
                    record.user_answer,
                    record.correct,
                    record.skipped,
                    record.response_time.as_millis() as i64,
                ],
            )?;
        }

        tx.commit()?;
        tracing::info!(session_id, mode_id, "recorded session");
        Ok(session_id)
    }

    pub fn overview(&self) -> Result<Overview> {
        let mut overview = self.conn.query_row(
            r#"
            SELECT COUNT(*),
                   COALESCE(SUM(correct), 0),
                   COALESCE(SUM(incorrect), 0),
                   COALESCE(SUM(skipped), 0),
                   COALESCE(MAX(best_streak), 0),
                   MAX(points),
                   COALESCE(SUM(duration_secs), 0)
            FROM sessions
            "#,
            [],
            |row| {
                Ok(Overview {
                    sessions: row.get(0)?,
                    correct: row.get(1)?,
                    incorrect: row.get(2)?,
                    skipped: row.get(3)?,
                    best_streak: row.get(4)?,
                    best_points: row.get(5)?,
                    seconds_played: row.get(6)?,
                    avg_response_ms: None,
                })
            },
        )?;
        overview.avg_response_ms = self.conn.query_row(
            "SELECT AVG(response_ms) FROM answers WHERE skipped = 0",
            [],
            |row| row.get(0),
        )?;
        Ok(overview)
    }

    /// Per-mode aggregates, most played first
    pub fn mode_stats(&self) -> Result<Vec<ModeStats>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT mode_id,
                   COUNT(*),
                   MAX(points),
                   SUM(correct),
                   SUM(correct) + SUM(incorrect),
                   AVG(avg_response_ms)
            FROM sessions
            GROUP BY mode_id
            ORDER BY COUNT(*) DESC, mode_id
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            let correct: i64 = row.get(3)?;
            let answered: i64 = row.get(4)?;
            Ok(ModeStats {
                mode_id: row.get(0)?,
                sessions: row.get(1)?,
                best_points: row.get(2)?,
                accuracy: if answered == 0 {
                    0.0
                } else {
                    correct as f64 / answered as f64 * 100.0
                },
                avg_response_ms: row.get(5)?,
            })
        })?;

        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn operation_stats(&self) -> Result<Vec<OperationStats>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT operation,
                   SUM(CASE WHEN skipped = 0 THEN 1 ELSE 0 END),
                   SUM(CASE WHEN correct = 1 THEN 1 ELSE 0 END),
                   AVG(CASE WHEN skipped = 0 THEN response_ms END)
            FROM answers
            GROUP BY operation
            ORDER BY operation
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(OperationStats {
                operation: row.get(0)?,
                attempts: row.get(1)?,
                correct: row.get(2)?,
                avg_response_ms: row.get(3)?,
            })
        })?;

        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Most recent sessions, newest first
    pub fn recent(&self, limit: usize) -> Result<Vec<SessionRow>> {
        self.sessions(&SessionFilter::default(), Local::now(), Some(limit))
    }

    /// Sessions matching `filter`, newest first
    pub fn sessions(
        &self,
        filter: &SessionFilter,
        now: DateTime<Local>,
        limit: Option<usize>,
    ) -> Result<Vec<SessionRow>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {SESSION_COLUMNS}
            FROM sessions
            WHERE (?1 IS NULL OR mode_id = ?1)
              AND (?2 IS NULL OR difficulty = ?2)
            ORDER BY played_at DESC, id DESC
            "#
        ))?;
        let rows = stmt.query_map(
            params![
                filter.mode_id.as_deref(),
                filter.difficulty.map(|d| d.to_string()),
            ],
            session_row,
        )?;

        // offsets may differ between rows, so the cutoff is applied on parsed times
        let cutoff = filter.period.cutoff(now);
        let mut sessions = Vec::new();
        for row in rows {
            let row = row?;
            if cutoff.is_some_and(|c| row.played_at < c) {
                continue;
            }
            sessions.push(row);
            if limit.is_some_and(|l| sessions.len() >= l) {
                break;
            }
        }
        Ok(sessions)
    }

    pub fn session(&self, id: i64) -> Result<Option<SessionRow>> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1"),
                [id],
                session_row,
            )
            .optional()?)
    }

    /// Answers of one session in the order they were given
    pub fn session_answers(&self, session_id: i64) -> Result<Vec<AnswerRow>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT operation, problem, answer, user_answer, correct, skipped, response_ms
            FROM answers
            WHERE session_id = ?1
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map([session_id], |row| {
            Ok(AnswerRow {
                operation: row.get(0)?,
                problem: row.get(1)?,
                answer: row.get(2)?,
                user_answer: row.get(3)?,
                correct: row.get(4)?,
                skipped: row.get(5)?,
                response_ms: row.get(6)?,
            })
        })?;

        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Daily accuracy, score and speed for sessions matching `filter`,
    /// oldest day first. Days are local calendar days.
    pub fn trends(&self, filter: &SessionFilter, now: DateTime<Local>) -> Result<Vec<TrendPoint>> {
        let mut days: BTreeMap<NaiveDate, (TrendPoint, f64, i64)> = BTreeMap::new();
        for s in self.sessions(filter, now, None)? {
            let day = s.played_at.date_naive();
            let (point, response_sum, timed) = days.entry(day).or_insert_with(|| {
                (
                    TrendPoint {
                        day,
                        sessions: 0,
                        correct: 0,
                        answered: 0,
                        total_points: 0,
                        avg_response_ms: None,
                    },
                    0.0,
                    0,
                )
            });
            point.sessions += 1;
            point.correct += s.correct;
            point.answered += s.correct + s.incorrect;
            point.total_points += s.points;
            if let Some(ms) = s.avg_response_ms {
                *response_sum += ms;
                *timed += 1;
            }
        }

        Ok(days
            .into_values()
            .map(|(mut point, response_sum, timed)| {
                if timed > 0 {
                    point.avg_response_ms = Some(response_sum / timed as f64);
                }
                point
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{Builtin, Difficulty};
    use crate::session::Session;
    use rand::{rngs::StdRng, SeedableRng};
    use std::sync::Arc;
    use std::time::Duration;

    fn finished_session(correct: usize, wrong: usize) -> SessionSnapshot {
        let mut session = Session::with_rng(
            vec![Arc::new(Builtin::Multiplication)],
            Difficulty::Easy,
            Duration::from_secs(30),
            StdRng::seed_from_u64(3),
        );
        for _ in 0..correct {
            session.tick(Duration::from_secs(1));
            session.submit(session.current_problem().answer);
        }
        for _ in 0..wrong {
            session.tick(Duration::from_secs(2));
            session.submit(session.current_problem().answer - 1);
        }
        session.skip();
        session.tick(Duration::from_secs(30)).unwrap()
    }

    #[test]
    fn empty_database_overview() {
        let db = StatsDb::open_in_memory().unwrap();
        let overview = db.overview().unwrap();
        assert_eq!(overview.sessions, 0);
        assert_eq!(overview.best_points, None);
        assert_eq!(overview.avg_response_ms, None);
        assert_eq!(overview.accuracy(), 0.0);
        assert!(db.recent(5).unwrap().is_empty());
    }

    #[test]
    fn records_sessions_and_aggregates() {
        let mut db = StatsDb::open_in_memory().unwrap();
        let now = Local::now();
        db.record_session("multiplication", &finished_session(3, 1), now)
            .unwrap();
        db.record_session("multiplication", &finished_session(1, 1), now)
            .unwrap();
        db.record_session("division", &finished_session(2, 0), now)
            .unwrap();

        let overview = db.overview().unwrap();
        assert_eq!(overview.sessions, 3);
        assert_eq!(overview.correct, 6);
        assert_eq!(overview.incorrect, 2);
        assert_eq!(overview.skipped, 3);
        assert_eq!(overview.best_streak, 3);
        assert_eq!(overview.seconds_played, 90);
        assert_eq!(overview.accuracy(), 75.0);

        let modes = db.mode_stats().unwrap();
        assert_eq!(modes.len(), 2);
        assert_eq!(modes[0].mode_id, "multiplication");
        assert_eq!(modes[0].sessions, 2);
        assert_eq!(modes[1].accuracy, 100.0);

        let ops = db.operation_stats().unwrap();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].operation, "Multiplication");
        assert_eq!(ops[0].attempts, 8);
        assert_eq!(ops[0].correct, 6);
        assert_eq!(ops[0].accuracy(), 75.0);
    }

    #[test]
    fn recent_is_newest_first_and_limited() {
        let mut db = StatsDb::open_in_memory().unwrap();
        let now = Local::now();
        for (i, mode) in ["addition", "cubes", "factorials"].iter().enumerate() {
            let at = now - ChronoDuration::minutes(10 - i as i64);
            db.record_session(mode, &finished_session(1, 0), at).unwrap();
        }

        let recent = db.recent(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].mode_id, "factorials");
        assert_eq!(recent[1].mode_id, "cubes");
        assert_eq!(recent[0].difficulty, "Easy");
        assert_eq!(recent[0].played_at.timestamp(), (now - ChronoDuration::minutes(8)).timestamp());
    }

    #[test]
    fn open_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("stats.db");
        let mut db = StatsDb::open(&path).unwrap();
        db.record_session("addition", &finished_session(1, 0), Local::now())
            .unwrap();
        drop(db);

        let reopened = StatsDb::open(&path).unwrap();
        assert_eq!(reopened.overview().unwrap().sessions, 1);
    }

    fn with_difficulty(mut snapshot: SessionSnapshot, difficulty: Difficulty) -> SessionSnapshot {
        snapshot.difficulty = difficulty;
        snapshot
    }

    #[test]
    fn filters_by_mode_difficulty_and_period() {
        let mut db = StatsDb::open_in_memory().unwrap();
        let now = Local::now();
        db.record_session("addition", &finished_session(1, 0), now - ChronoDuration::days(20))
            .unwrap();
        db.record_session(
            "addition",
            &with_difficulty(finished_session(2, 0), Difficulty::Hard),
            now - ChronoDuration::days(2),
        )
        .unwrap();
        db.record_session("cubes", &finished_session(1, 1), now).unwrap();

        let all = db.sessions(&SessionFilter::default(), now, None).unwrap();
        assert_eq!(all.len(), 3);

        let addition = SessionFilter {
            mode_id: Some("addition".into()),
            ..SessionFilter::default()
        };
        assert_eq!(db.sessions(&addition, now, None).unwrap().len(), 2);

        let hard = SessionFilter {
            difficulty: Some(Difficulty::Hard),
            ..SessionFilter::default()
        };
        let rows = db.sessions(&hard, now, None).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].difficulty, "Hard");

        let week = SessionFilter {
            period: TimePeriod::Last7Days,
            ..SessionFilter::default()
        };
        let modes: Vec<_> = db
            .sessions(&week, now, None)
            .unwrap()
            .into_iter()
            .map(|s| s.mode_id)
            .collect();
        assert_eq!(modes, ["cubes", "addition"]);
        assert!(!week.is_empty());
        assert!(SessionFilter::default().is_empty());
    }

    #[test]
    fn trends_group_sessions_by_day() {
        let mut db = StatsDb::open_in_memory().unwrap();
        let now = Local::now();
        let earlier = now - ChronoDuration::days(3);
        db.record_session("addition", &finished_session(3, 1), earlier)
            .unwrap();
        db.record_session("addition", &finished_session(1, 1), earlier)
            .unwrap();
        db.record_session("addition", &finished_session(2, 0), now)
            .unwrap();

        let trends = db.trends(&SessionFilter::default(), now).unwrap();
        assert_eq!(trends.len(), 2);
        assert_eq!(trends[0].day, earlier.date_naive());
        assert_eq!(trends[0].sessions, 2);
        assert_eq!(trends[0].correct, 4);
        assert_eq!(trends[0].answered, 6);
        assert!(trends[0].avg_response_ms.is_some());
        assert_eq!(trends[1].day, now.date_naive());
        assert_eq!(trends[1].accuracy(), 100.0);

        let recent_only = SessionFilter {
            period: TimePeriod::Last7Days,
            ..SessionFilter::default()
        };
        assert_eq!(db.trends(&recent_only, now + ChronoDuration::days(6)).unwrap().len(), 1);
    }

    #[test]
    fn session_answers_come_back_in_order() {
        let mut db = StatsDb::open_in_memory().unwrap();
        let snapshot = finished_session(2, 1);
        let id = db
            .record_session("multiplication", &snapshot, Local::now())
            .unwrap();

        let row = db.session(id).unwrap().unwrap();
        assert_eq!(row.mode_id, "multiplication");
        assert_eq!(row.correct, 2);
        assert!(db.session(id + 1).unwrap().is_none());

        let answers = db.session_answers(id).unwrap();
        assert_eq!(answers.len(), snapshot.history.len());
        for (stored, record) in answers.iter().zip(&snapshot.history) {
            assert_eq!(stored.problem, record.problem.display);
            assert_eq!(stored.answer, record.problem.answer);
            assert_eq!(stored.user_answer, record.user_answer);
            assert_eq!(stored.correct, record.correct);
            assert_eq!(stored.skipped, record.skipped);
        }
        assert!(answers.last().unwrap().skipped);
        assert!(db.session_answers(id + 1).unwrap().is_empty());
    }
}
