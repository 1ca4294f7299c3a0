//! Display formatting and plain-text rendering of dashboards.
//!
//! Numbers are formatted the way the dashboard shows them: scores with
//! thousands separators, accuracy and placements to two decimals, average
//! scores rounded to the nearest integer.

use crate::models::{Dashboard, EngineFeatures, MapLeaderboard};

/// Marker shown for empty tables and empty label lists.
pub const NO_DATA: &str = "—";

/// Format an integer with `,` thousands separators.
pub fn format_score(score: u64) -> String {
    let digits = score.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Round a full-precision average to the nearest integer and group it.
pub fn format_average_score(avg: f64) -> String {
    format_score(avg.max(0.0).round() as u64)
}

/// Two decimals, with exact halves rounded away from zero.
fn two_decimals(value: f64) -> String {
    format!("{:.2}", (value * 100.0).round() / 100.0)
}

/// Accuracy with two decimals and a percent sign.
pub fn format_accuracy(accuracy: f64) -> String {
    format!("{}%", two_decimals(accuracy))
}

/// Placement with two decimals, or [`NO_DATA`].
pub fn format_placement(placement: Option<f64>) -> String {
    placement
        .map(two_decimals)
        .unwrap_or_else(|| NO_DATA.to_string())
}

/// Comma-joined slot labels, or [`NO_DATA`] when empty.
pub fn format_labels(labels: &[String]) -> String {
    if labels.is_empty() {
        NO_DATA.to_string()
    } else {
        labels.join(", ")
    }
}

/// Minimal fixed-width text table.
#[derive(Debug, Default)]
struct TextTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn render(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(w) = widths.get_mut(i) {
                    *w = (*w).max(cell.chars().count());
                }
            }
        }

        let line = |cells: &[String]| -> String {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, &w)| format!("{:<w$}", cell, w = w))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let mut out = line(&self.headers);
        out.push('\n');
        let total: usize = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
        out.push_str(&"-".repeat(total));
        out.push('\n');

        if self.rows.is_empty() {
            out.push_str(NO_DATA);
            out.push('\n');
        }
        for row in &self.rows {
            out.push_str(&line(row));
            out.push('\n');
        }
        out
    }
}

fn render_map_table(board: &MapLeaderboard, features: &EngineFeatures) -> String {
    let mut headers = vec!["#", "Player", "Score"];
    if features.include_accuracy_column {
        headers.push("Acc");
    }

    let mut table = TextTable::new(&headers);
    for (i, entry) in board.entries.iter().enumerate() {
        let mut row = vec![
            (i + 1).to_string(),
            entry.username.clone(),
            format_score(entry.score),
        ];
        if let Some(acc) = entry.accuracy {
            row.push(format_accuracy(acc));
        }
        table.push(row);
    }

    format!("[{}]\n{}", board.slot, table.render())
}

/// Render every section of a dashboard as plain text.
pub fn render_dashboard(dashboard: &Dashboard, features: &EngineFeatures) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== Maps (drop {}) ===\n", dashboard.drop_count));
    for board in &dashboard.active {
        out.push_str(&render_map_table(board, features));
        out.push('\n');
    }

    if let Some(dropped) = &dashboard.dropped {
        out.push_str("=== Dropped Scores ===\n");
        for board in dropped {
            out.push_str(&render_map_table(board, features));
            out.push('\n');
        }
    }

    out.push_str("=== Average Results ===\n");
    let mut headers = vec!["#", "Player", "Average Score"];
    if features.include_accuracy_column {
        headers.push("Average Acc");
    }
    if features.enable_placement_ranking {
        headers.push("Avg Placement");
    }
    headers.extend(["Skipped Maps", "Kept Maps"]);

    let mut table = TextTable::new(&headers);
    for (i, row) in dashboard.averages.iter().enumerate() {
        let mut cells = vec![
            (i + 1).to_string(),
            row.username.clone(),
            format_average_score(row.avg_score),
        ];
        if let Some(acc) = row.avg_acc {
            cells.push(format_accuracy(acc));
        }
        if features.enable_placement_ranking {
            cells.push(format_placement(row.avg_placement));
        }
        cells.push(format_labels(&row.skipped_labels));
        cells.push(format_labels(&row.kept_labels));
        table.push(cells);
    }
    out.push_str(&table.render());

    if let Some(custom) = &dashboard.custom {
        out.push('\n');
        out.push_str(&format!(
            "=== Custom Leaderboard ({}) ===\n",
            format_labels(&custom.slots)
        ));
        let mut headers = vec!["#", "Player", "Average Score"];
        if features.include_accuracy_column {
            headers.push("Average Acc");
        }
        headers.push("Maps Played");

        let mut table = TextTable::new(&headers);
        for (i, row) in custom.rows.iter().enumerate() {
            let mut cells = vec![
                (i + 1).to_string(),
                row.username.clone(),
                format_average_score(row.avg_score),
            ];
            if let Some(acc) = row.avg_acc {
                cells.push(format_accuracy(acc));
            }
            cells.push(row.maps_played.to_string());
            table.push(cells);
        }
        out.push_str(&table.render());
    }

    out
}
