/// Plain-text report rendering.
///
/// The report is a fixed sequence of sections. Metric sections only appear
/// when their metrics were present in the input; the header and the
/// assessment are always rendered.
use crate::analysis::AnalysisResult;
use crate::assessment;
use chrono::{DateTime, TimeZone};
use std::fmt::Display;

const RULE_WIDTH: usize = 60;

/// Render the text report for an analysis.
pub fn render_text<Tz>(analysis: &AnalysisResult, generated_at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let rule = "=".repeat(RULE_WIDTH);
    let mut lines: Vec<String> = vec![
        rule.clone(),
        "k6 LOAD TEST ANALYSIS REPORT".to_string(),
        rule.clone(),
        format!("Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S")),
        String::new(),
    ];

    if let Some(total) = analysis.total_requests {
        section(&mut lines, "📊 BASIC METRICS", 20);
        lines.push(format!("Total Requests: {}", with_thousands(total)));
        lines.push(format!(
            "Request Rate: {:.2} req/s",
            analysis.request_rate.unwrap_or(0.0)
        ));
        lines.push(format!(
            "Error Rate: {:.2}%",
            analysis.error_rate_or_zero() * 100.0
        ));
        lines.push(String::new());
    }

    if let Some(rt) = &analysis.response_times {
        section(&mut lines, "⏱️  RESPONSE TIMES (ms)", 25);
        lines.push(format!("Average: {:.2}", rt.avg));
        lines.push(format!("Minimum: {:.2}", rt.min));
        lines.push(format!("Maximum: {:.2}", rt.max));
        lines.push(format!("50th percentile: {:.2}", rt.p50));
        lines.push(format!("90th percentile: {:.2}", rt.p90));
        lines.push(format!("95th percentile: {:.2}", rt.p95));
        lines.push(format!("99th percentile: {:.2}", rt.p99));
        lines.push(String::new());
    }

    if let Some(cold_starts) = analysis.cold_starts {
        section(&mut lines, "🔄 SCALE-TO-ZERO METRICS", 26);
        lines.push(format!("Cold Starts Detected: {cold_starts}"));
        if let Some(st) = &analysis.scale_up_times {
            lines.push(format!("Average Scale-up Time: {:.2} ms", st.avg));
            lines.push(format!("Maximum Scale-up Time: {:.2} ms", st.max));
            lines.push(format!("90th percentile Scale-up: {:.2} ms", st.p90));
        }
        lines.push(String::new());
    }

    section(&mut lines, "🎯 PERFORMANCE ASSESSMENT", 28);
    for judgment in assessment::assess(analysis) {
        lines.push(judgment.to_string());
    }
    lines.push(String::new());
    lines.push(rule);

    lines.join("\n")
}

fn section(lines: &mut Vec<String>, title: &str, underline: usize) {
    lines.push(title.to_string());
    lines.push("-".repeat(underline));
}

/// Format an integer with `,` between thousands groups.
fn with_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
