//! Terminal rendering for a loaded ledger.

use std::fmt::Write as _;

use chrono::{Local, LocalResult, TimeZone};

use crate::service::Ledger;

/// Renders a loaded ledger. Implementations show the verification
/// outcome already recorded on each record and never re-derive it.
pub trait LedgerPresenter {
    fn present(&self, ledger: &Ledger);
}

/// Aligned plain-text table on stdout.
#[derive(Debug, Default)]
pub struct TablePresenter;

impl LedgerPresenter for TablePresenter {
    fn present(&self, ledger: &Ledger) {
        print!("{}", render_table(ledger));
    }
}

/// Render the ledger as an aligned text table, one record per row, with
/// a trailing tamper summary when chain verification flagged anything.
pub fn render_table(ledger: &Ledger) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "ledger: {} ({} records)",
        ledger.source.display(),
        ledger.records.len()
    );
    let _ = writeln!(
        out,
        "{:<10}  {:>8}  {:<19}  {:<24}  {}",
        "article", "quantity", "shipped", "hash", "integrity"
    );
    for record in &ledger.records {
        let status = if record.valid { "ok" } else { "TAMPERED" };
        let _ = writeln!(
            out,
            "{:<10}  {:>8}  {:<19}  {:<24}  {}",
            record.article,
            record.quantity,
            format_timestamp(record.timestamp),
            record.hash,
            status
        );
    }

    let broken = ledger.broken_count();
    if broken > 0 {
        let _ = writeln!(
            out,
            "{} of {} records failed chain verification",
            broken,
            ledger.records.len()
        );
    }
    out
}

/// Local wall-clock rendering of a record timestamp. Seconds that do
/// not map to a local time (DST gaps, out-of-range values) fall back to
/// the raw number.
fn format_timestamp(timestamp: i64) -> String {
    match Local.timestamp_opt(timestamp, 0) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => {
            dt.format("%d.%m.%Y %H:%M:%S").to_string()
        }
        LocalResult::None => timestamp.to_string(),
    }
}
