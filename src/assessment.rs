use crate::analysis::AnalysisResult;
use std::fmt;

/// Qualitative rating for one metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rating {
    Excellent,
    Good,
    NeedsImprovement,
}

impl Rating {
    pub fn label(self) -> &'static str {
        match self {
            Rating::Excellent => "EXCELLENT",
            Rating::Good => "GOOD",
            Rating::NeedsImprovement => "NEEDS IMPROVEMENT",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What a judgment is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    ErrorRate,
    ResponseTime,
}

/// Upper bound (exclusive) for each rating tier, strictest first. Values at
/// or above the last bound need improvement.
const ERROR_RATE_BANDS: [(f64, Rating); 2] = [(0.01, Rating::Excellent), (0.05, Rating::Good)];
const P95_MS_BANDS: [(f64, Rating); 2] = [(1000.0, Rating::Excellent), (2000.0, Rating::Good)];

/// One assessment line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Judgment {
    pub subject: Subject,
    pub rating: Rating,
}

impl Judgment {
    fn marker(&self) -> &'static str {
        match (self.subject, self.rating) {
            (_, Rating::Excellent | Rating::Good) => "✅",
            (Subject::ErrorRate, Rating::NeedsImprovement) => "❌",
            (Subject::ResponseTime, Rating::NeedsImprovement) => "⚠️ ",
        }
    }

    fn hint(&self) -> &'static str {
        match (self.subject, self.rating) {
            (Subject::ErrorRate, Rating::Excellent) => "< 1%",
            (Subject::ErrorRate, Rating::Good) => "< 5%",
            (Subject::ErrorRate, Rating::NeedsImprovement) => "≥ 5%",
            (Subject::ResponseTime, Rating::Excellent) => "P95 < 1s",
            (Subject::ResponseTime, Rating::Good) => "P95 < 2s",
            (Subject::ResponseTime, Rating::NeedsImprovement) => "P95 ≥ 2s",
        }
    }
}

impl fmt::Display for Judgment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subject = match self.subject {
            Subject::ErrorRate => "Error Rate",
            Subject::ResponseTime => "Response Time",
        };
        write!(
            f,
            "{} {}: {} ({})",
            self.marker(),
            subject,
            self.rating,
            self.hint()
        )
    }
}

fn rate(value: f64, bands: &[(f64, Rating)]) -> Rating {
    bands
        .iter()
        .find(|(limit, _)| value < *limit)
        .map(|(_, rating)| *rating)
        .unwrap_or(Rating::NeedsImprovement)
}

/// Rate error rate and p95 response time. Absent metrics count as 0, so
/// they rate as excellent.
pub fn assess(analysis: &AnalysisResult) -> Vec<Judgment> {
    vec![
        Judgment {
            subject: Subject::ErrorRate,
            rating: rate(analysis.error_rate_or_zero(), &ERROR_RATE_BANDS),
        },
        Judgment {
            subject: Subject::ResponseTime,
            rating: rate(analysis.p95_or_zero(), &P95_MS_BANDS),
        },
    ]
}
