//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the estimation/simulation code stays clean and testable
//! - output changes are localized

use crate::report::{RespondentAnalysis, StudyReport};
use crate::domain::{AttributeFamily, AttributeKey, StudyConfig};

/// Format the full run summary: settings, aggregate metrics, per-respondent
/// table and the list of skipped respondents.
pub fn format_study_report(report: &StudyReport, config: &StudyConfig) -> String {
    let mut out = String::new();
    let s = &report.summary;

    out.push_str("=== cj - Conjoint Pricing Study ===\n");
    out.push_str(&format!(
        "Respondents: analyzed={} | skipped={}\n",
        s.respondents_analyzed, s.respondents_skipped
    ));
    out.push_str(&format!(
        "Focal: {} | unit cost={:.2} | market size={:.0}\n",
        config.focal.name,
        config.focal_unit_cost(),
        config.market_size
    ));
    let competitors: Vec<String> = config
        .competitors
        .iter()
        .map(|c| format!("{} @ {:.2}", c.name, c.price))
        .collect();
    out.push_str(&format!("Competitors: {}\n", competitors.join(", ")));
    out.push_str(&format!(
        "Price grid: [{:.2}, {:.2}] step {:.2} | WTP differential={:.2}\n",
        config.price_grid.low,
        config.price_grid.high,
        config.price_grid.step,
        config.reference_price_differential
    ));
    for note in &report.notes {
        out.push_str(&format!("Note: {note}\n"));
    }

    if s.respondents_analyzed > 0 {
        out.push_str("\nMean attribute importance:\n");
        for family in AttributeFamily::ALL {
            let v = s.mean_importance.get(&family).copied().unwrap_or(0.0);
            out.push_str(&format!("  {:<14} {:>6.1}%\n", family.display_name(), v * 100.0));
        }

        out.push_str("\nMean willingness to pay:\n");
        for key in AttributeKey::NON_PRICE {
            let v = s.mean_wtp.get(&key).copied().unwrap_or(0.0);
            out.push_str(&format!("  {:<14} {:>10.2}\n", key.display_name(), v));
        }

        if let Some(stats) = &s.optimal_price {
            out.push_str(&format!(
                "\nOptimal price per respondent: mean={:.2} min={:.2} max={:.2}\n",
                stats.mean, stats.min, stats.max
            ));
        }
        if let Some(best) = &s.market_optimum {
            out.push_str(&format!(
                "Aggregate optimum: price={:.2} mean share={:.3} sales={:.2} profit={:.2}\n",
                best.price, best.mean_share, best.total_sales, best.total_profit
            ));
        }

        out.push_str("\nRespondents:\n");
        out.push_str(&format_respondent_table(report.respondents.values()));
    }

    out.push_str("\nSkipped respondents:\n");
    if report.skipped.is_empty() {
        out.push_str("  (none)\n");
    }
    for skip in &report.skipped {
        out.push_str(&format!(
            "  {} [{} / {}] {}\n",
            skip.respondent,
            skip.stage.label(),
            skip.kind.label(),
            skip.reason
        ));
        for w in &skip.warnings {
            out.push_str(&format!("      warning: {w}\n"));
        }
    }

    out
}

fn format_respondent_table<'a>(rows: impl Iterator<Item = &'a RespondentAnalysis>) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<20} {:>6} {:>9} {:>7} {:>7} {:>7} {:>7} {:>9} {:>7} {:>11}\n",
            "respondent", "r2", "b_price", "screen", "res", "brand", "price", "opt_price", "share", "profit"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<20} {:-<6} {:-<9} {:-<7} {:-<7} {:-<7} {:-<7} {:-<9} {:-<7} {:-<11}\n",
            "", "", "", "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for r in rows {
        let d = &r.model.diagnostics;
        let imp = |f: AttributeFamily| format!("{:.1}%", r.importance.share(f) * 100.0);
        let b_price = r
            .model
            .part_worth(AttributeKey::PriceHigh)
            .map(|v| format!("{v:.3}"))
            .unwrap_or_else(|_| "-".to_string());
        out.push_str(
            format!(
                "{:<20} {:>6} {:>9} {:>7} {:>7} {:>7} {:>7} {:>9.2} {:>7.3} {:>11.2}\n",
                truncate(&r.model.respondent, 20),
                d.r_squared.map(|v| format!("{v:.3}")).unwrap_or_else(|| "-".to_string()),
                b_price,
                imp(AttributeFamily::ScreenSize),
                imp(AttributeFamily::Resolution),
                imp(AttributeFamily::Brand),
                imp(AttributeFamily::Price),
                r.pricing.optimal.price,
                r.pricing.optimal.share,
                r.pricing.optimal.profit,
            )
            .trim_end(),
        );
        out.push('\n');
        for w in &d.warnings {
            out.push_str(&format!("    warning: {w}\n"));
        }
    }

    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
