//! Special logging functions for specific use cases

use super::tags::LogTag;
use crate::logger;
use colored::*;

/// Enhanced logging for a 1-minute candle close: symbol, price delta,
/// source venue, and the technical score delta if a score was just
/// recomputed off the back of it.
pub fn log_candle_update(
    mint: &str,
    symbol: &str,
    old_close: f64,
    new_close: f64,
    source: &str,
    score_delta: Option<f64>,
) {
    let change = new_close - old_close;
    let change_percent = if old_close != 0.0 {
        (change / old_close) * 100.0
    } else {
        0.0
    };

    let (arrow, color) = if change > 0.0 {
        ("^", "green")
    } else if change < 0.0 {
        ("v", "red")
    } else {
        ("=", "yellow")
    };

    let price_part = format!(
        "{} {} {:.10} ( {} , {} % )",
        arrow,
        symbol.bold(),
        match color {
            "green" => format!("{:.10}", new_close).green().bold(),
            "red" => format!("{:.10}", new_close).red().bold(),
            _ => format!("{:.10}", new_close).white().bold(),
        },
        match color {
            "green" => format!("+{:.10}", change).green().bold(),
            "red" => format!("{:.10}", change).red().bold(),
            _ => format!("{:.10}", change).white().bold(),
        },
        match color {
            "green" => format!("+{:.2}", change_percent).green().bold(),
            "red" => format!("{:.2}", change_percent).red().bold(),
            _ => format!("{:.2}", change_percent).white().bold(),
        }
    );

    let mut line2_parts = vec![format!("[ {} ]", source).bright_yellow().to_string()];
    if let Some(delta) = score_delta {
        let score_text = if delta > 0.0 {
            format!("score +{:.1}", delta).green().to_string()
        } else if delta < 0.0 {
            format!("score {:.1}", delta).red().to_string()
        } else {
            "score unchanged".white().to_string()
        };
        line2_parts.push(score_text);
    }
    line2_parts.push(format!("mint={}", short_mint(mint)).dimmed().to_string());

    let combined_message = format!("{}\n{}", price_part, line2_parts.join(" "));
    logger::info(LogTag::Score, &combined_message);
}

fn short_mint(mint: &str) -> String {
    if mint.len() <= 10 {
        mint.to_string()
    } else {
        format!("{}..{}", &mint[..4], &mint[mint.len() - 4..])
    }
}
