use crate::session::AnswerRecord;

/// (question number, response seconds) points for answered questions
pub fn response_points(history: &[AnswerRecord]) -> (Vec<(f64, f64)>, Vec<(f64, f64)>) {
    let mut correct = Vec::new();
    let mut wrong = Vec::new();
    for (i, record) in history.iter().enumerate().filter(|(_, r)| !r.skipped) {
        let point = ((i + 1) as f64, record.response_time.as_secs_f64());
        if record.correct {
            correct.push(point);
        } else {
            wrong.push(point);
        }
    }
    (correct, wrong)
}

/// X (questions) and Y (seconds) upper bounds for the results chart
pub fn compute_chart_bounds(history_len: usize, points: &[(f64, f64)]) -> (f64, f64) {
    let slowest = points.iter().map(|&(_, secs)| secs).fold(0.0, f64::max);
    let questions = (history_len as f64).max(1.0);
    (questions, slowest.ceil().max(1.0))
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.1}")
    }
}
