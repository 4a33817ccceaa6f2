use std::fs;
use std::path::Path;

use crate::shared_types::ArbitrageOpportunity;

const HEADER: &str = "team1,team2,sport,competition,profit_pct,bookmaker_home,bookmaker_draw,\
bookmaker_away,stake_home,stake_draw,stake_away\n";

fn escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Renders opportunities as CSV text. Profit and stakes are rounded to
/// two decimals; the draw columns stay empty for two-way markets.
pub fn to_csv(opportunities: &[ArbitrageOpportunity]) -> String {
    let mut csv = String::from(HEADER);
    for opp in opportunities {
        let draw_source = opp
            .draw
            .as_ref()
            .map(|d| escape(&d.source))
            .unwrap_or_default();
        let draw_stake = opp
            .draw
            .as_ref()
            .map(|d| format!("{:.2}", d.stake))
            .unwrap_or_default();
        csv.push_str(&format!(
            "{},{},{},{},{:.2},{},{},{},{:.2},{},{:.2}\n",
            escape(&opp.team1),
            escape(&opp.team2),
            escape(&opp.sport),
            escape(&opp.competition),
            opp.profit_pct,
            escape(&opp.home.source),
            draw_source,
            escape(&opp.away.source),
            opp.home.stake,
            draw_stake,
            opp.away.stake,
        ));
    }
    csv
}

pub fn write_csv(path: &Path, opportunities: &[ArbitrageOpportunity]) -> std::io::Result<()> {
    fs::write(path, to_csv(opportunities))
}
