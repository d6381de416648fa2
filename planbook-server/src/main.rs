use std::env;
use std::path::Path;
use std::process;
use std::time::Instant;

use chrono::Utc;
use serde::Serialize;

use planbook_bridge::LedgerBook;
use planbook_engine::calendar::FiscalYear;
use planbook_engine::cogs::{Cadence, CadenceTable};
use planbook_engine::ledger_loader::{
    load_capex_file, load_cogs_file, load_headcount_file, load_opex_file, load_revenue_file,
};
use planbook_engine::pipeline::{PipelineResult, ReviewPipeline};
use planbook_engine::pipelines::review_digest::ReviewDigestPipeline;
use planbook_engine::types::{
    BudgetFinding, BudgetSummary, FindingKind, LedgerSnapshot, ReviewQuery, ReviewScope,
};

// ---------------------------------------------------------------------------
// JSON output contract
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct DigestJson {
    generated_at: String,
    fiscal_year: i32,
    pipeline_ms: u128,
    summary: BudgetSummary,
    ledgers: LedgerCountsJson,
    findings: Vec<FindingJson>,
    review: ReviewSummaryJson,
}

#[derive(Serialize)]
struct LedgerCountsJson {
    revenue_lines: usize,
    cogs_lines: usize,
    opex_lines: usize,
    employees: usize,
    capex_items: usize,
}

#[derive(Serialize)]
struct FindingJson {
    id: String,
    kind: String,
    department: String,
    line_ids: Vec<String>,
    dollar_impact: f64,
    confidence: f64,
    severity: String,
    priority_score: f64,
    urgency_score: f64,
    context: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    active_signals: Vec<String>,
}

#[derive(Serialize)]
struct ReviewSummaryJson {
    findings_detected: usize,
    findings_dropped: usize,
    findings_selected: usize,
    total_dollar_impact: f64,
    departments_affected: usize,
}

/// One-line explanation of what a finding means for the reader.
fn finding_context(finding: &BudgetFinding) -> String {
    let lines = finding.line_ids.join(", ");
    match finding.kind {
        FindingKind::AtRiskPipeline => format!(
            "Plan carries weighted revenue from a long-shot deal ({lines}). \
             Consider a downside case without it."
        ),
        FindingKind::ChurnExposure => format!(
            "Existing recurring revenue on {lines} is churning heavily. \
             Retention spend may beat new-logo spend here."
        ),
        FindingKind::OpexAboveBaseline => format!(
            "{} spend on {lines} runs well past its market baseline. \
             Renegotiate or justify the gap.",
            finding.department
        ),
        FindingKind::CompensationCreep => format!(
            "Raise and bonus on {lines} lift total comp far past base. \
             Confirm the package against the band."
        ),
        FindingKind::InvertedDates => format!(
            "Record {lines} terminates before it starts; it currently \
             costs $0. Fix the dates."
        ),
        FindingKind::LargeCapexOutlay => format!(
            "Single purchase {lines} is large enough to warrant its own \
             approval line."
        ),
    }
}

fn build_json(
    result: &PipelineResult<ReviewQuery, BudgetFinding>,
    snapshot: &LedgerSnapshot,
    summary: &BudgetSummary,
    pipeline_ms: u128,
) -> DigestJson {
    let mut departments: Vec<&str> = result
        .selected
        .iter()
        .map(|f| f.department.as_str())
        .collect();
    departments.sort();
    departments.dedup();

    let total_impact: f64 = result.selected.iter().map(|f| f.dollar_impact).sum();

    DigestJson {
        generated_at: Utc::now().to_rfc3339(),
        fiscal_year: result.query.fiscal_year,
        pipeline_ms,
        summary: *summary,
        ledgers: LedgerCountsJson {
            revenue_lines: snapshot.revenue.len(),
            cogs_lines: snapshot.cogs.len(),
            opex_lines: snapshot.opex.len(),
            employees: snapshot.employees.len(),
            capex_items: snapshot.capex.len(),
        },
        findings: result
            .selected
            .iter()
            .map(|f| FindingJson {
                id: f.id.clone(),
                kind: f.kind.to_string(),
                department: f.department.clone(),
                line_ids: f.line_ids.clone(),
                dollar_impact: f.dollar_impact,
                confidence: f.confidence,
                severity: f.severity.to_string(),
                priority_score: f.priority_score.unwrap_or(0.0),
                urgency_score: f.urgency_score.unwrap_or(0.0),
                context: finding_context(f),
                active_signals: f.active_signals.clone(),
            })
            .collect(),
        review: ReviewSummaryJson {
            findings_detected: result.retrieved.len(),
            findings_dropped: result.dropped.len(),
            findings_selected: result.selected.len(),
            total_dollar_impact: total_impact,
            departments_affected: departments.len(),
        },
    }
}

// ---------------------------------------------------------------------------
// Human-readable output
// ---------------------------------------------------------------------------

/// Format a whole-dollar amount with thousands separators.
fn format_dollars(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", amount.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    let lead = digits.len() % 3;
    for (i, ch) in digits.chars().enumerate() {
        if i != 0 && (i + 3 - lead) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped}")
}

fn print_statement_row(label: &str, amount: f64) {
    println!("  {label:<24}${:>14}", format_dollars(amount));
}

fn print_human(
    result: &PipelineResult<ReviewQuery, BudgetFinding>,
    summary: &BudgetSummary,
    load_ms: u128,
    pipeline_ms: u128,
) {
    println!();
    println!("  \u{2554}{}\u{2557}", "\u{2550}".repeat(62));
    println!(
        "  \u{2551}{:^62}\u{2551}",
        format!("PLANBOOK \u{2014} {} Budget Review", result.query.fiscal_year)
    );
    println!("  \u{255a}{}\u{255d}", "\u{2550}".repeat(62));
    println!();

    print_statement_row("Revenue", summary.total_revenue);
    print_statement_row("COGS", summary.total_cogs);
    print_statement_row("Gross profit", summary.gross_profit);
    println!("  {:<24}{:>14.1}%", "Gross margin", summary.gross_margin_pct);
    print_statement_row("Opex (incl. headcount)", summary.total_opex);
    print_statement_row("Net income", summary.net_income);
    print_statement_row("Capex (reported)", summary.total_capex);
    println!();

    let total_impact: f64 = result.selected.iter().map(|f| f.dollar_impact).sum();
    println!(
        "  {} findings detected  \u{00b7}  {} below the floor  \u{00b7}  top {} shown  \u{00b7}  ${} flagged",
        result.retrieved.len(),
        result.dropped.len(),
        result.selected.len(),
        format_dollars(total_impact)
    );
    println!();

    if result.selected.is_empty() {
        println!("  Nothing to review. The plan is quiet.");
    } else {
        println!("  {:\u{2500}<64}", "");
        for (i, f) in result.selected.iter().enumerate() {
            let priority = f.priority_score.unwrap_or(0.0);
            let marker = match priority {
                p if p >= 12.0 => "!!",
                p if p >= 8.0 => "! ",
                _ => "  ",
            };
            println!(
                "  {} {}. {:<14} {:<22} {:>12}  score {:.1} [{}]",
                marker,
                i + 1,
                f.department,
                f.kind.to_string(),
                format!("${}", format_dollars(f.dollar_impact)),
                priority,
                f.severity,
            );
            println!("       {}", finding_context(f));
            println!();
        }
        println!("  {:\u{2500}<64}", "");
    }

    println!();
    println!(
        "  Ledgers loaded in {load_ms}ms \u{00b7} Review ran in {pipeline_ms}ms \u{00b7} Total {}ms",
        load_ms + pipeline_ms
    );
    println!();
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn usage() -> ! {
    eprintln!(
        "Usage: planbook-server <ledger-dir> [--year Y] [--department D] [--top N] [--json]"
    );
    eprintln!();
    eprintln!("Expects revenue.csv, cogs.csv, opex.csv, headcount.csv, capex.csv");
    eprintln!("inside <ledger-dir>.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --year        Fiscal year to prorate against (default: 2025)");
    eprintln!("  --department  Limit the review to one department");
    eprintln!("  --top         Number of findings to surface (default: 5)");
    eprintln!("  --json        Output as JSON instead of formatted text");
    eprintln!();
    eprintln!("Example:");
    eprintln!("  planbook-server fixtures");
    eprintln!("  planbook-server fixtures --year 2026 --top 3 --json");
    process::exit(1);
}

fn flag_value<'a>(args: &'a [String], i: usize, flag: &str) -> &'a str {
    match args.get(i + 1) {
        Some(v) => v,
        None => {
            eprintln!("Error: {flag} requires a value");
            process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        usage();
    }

    let ledger_dir = &args[1];
    let mut fiscal_year: i32 = 0; // 0 = let the pipeline default it
    let mut department: Option<String> = None;
    let mut top_k: usize = 5;
    let mut json_output = false;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--year" => {
                fiscal_year = flag_value(&args, i, "--year").parse().unwrap_or_else(|_| {
                    eprintln!("Error: --year requires an integer year");
                    process::exit(1);
                });
                i += 2;
            }
            "--department" => {
                department = Some(flag_value(&args, i, "--department").to_string());
                i += 2;
            }
            "--top" => {
                top_k = flag_value(&args, i, "--top").parse().unwrap_or_else(|_| {
                    eprintln!("Error: --top requires a positive integer");
                    process::exit(1);
                });
                i += 2;
            }
            "--json" => {
                json_output = true;
                i += 1;
            }
            other => {
                eprintln!("Unknown argument: {other}");
                process::exit(1);
            }
        }
    }

    // Load the five ledgers.
    let load_start = Instant::now();
    let dir = Path::new(ledger_dir);
    let path = |name: &str| dir.join(name).to_string_lossy().into_owned();

    let snapshot = (|| -> Result<LedgerSnapshot, String> {
        let mut cadence = CadenceTable::new(Cadence::Annual);
        cadence.classify("Cloud Platform", Cadence::Monthly);

        Ok(LedgerSnapshot {
            year: FiscalYear(if fiscal_year == 0 { 2025 } else { fiscal_year }),
            revenue: load_revenue_file(&path("revenue.csv"))?,
            cogs: load_cogs_file(&path("cogs.csv"))?,
            cadence,
            opex: load_opex_file(&path("opex.csv"))?,
            employees: load_headcount_file(&path("headcount.csv"))?,
            capex: load_capex_file(&path("capex.csv"))?,
        })
    })()
    .unwrap_or_else(|e| {
        eprintln!("Error loading ledgers: {e}");
        process::exit(1);
    });
    let load_ms = load_start.elapsed().as_millis();
    log::info!(
        "loaded {} revenue / {} cogs / {} opex / {} headcount / {} capex lines in {}ms",
        snapshot.revenue.len(),
        snapshot.cogs.len(),
        snapshot.opex.len(),
        snapshot.employees.len(),
        snapshot.capex.len(),
        load_ms
    );

    // The book recomputes the summary from current state.
    let book = LedgerBook::new(snapshot.clone());
    let summary = book.summary();

    // Run the review pipeline.
    let pipeline_start = Instant::now();
    let pipeline = ReviewDigestPipeline::with_snapshot_and_size(snapshot.clone(), top_k);

    let scope = match department {
        Some(name) => ReviewScope::Department { name },
        None => ReviewScope::Company,
    };
    let query = ReviewQuery {
        request_id: "digest-001".into(),
        requested_by: "planbook-server".into(),
        scope,
        fiscal_year,
        min_impact: None,
    };

    let result = pipeline.execute(query).await;
    let pipeline_ms = pipeline_start.elapsed().as_millis();

    if json_output {
        let digest = build_json(&result, &snapshot, &summary, pipeline_ms);
        match serde_json::to_string_pretty(&digest) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("Error encoding digest: {e}");
                process::exit(1);
            }
        }
    } else {
        print_human(&result, &summary, load_ms, pipeline_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dollars_format_with_separators() {
        assert_eq!(format_dollars(0.0), "0");
        assert_eq!(format_dollars(950.0), "950");
        assert_eq!(format_dollars(1_250.0), "1,250");
        assert_eq!(format_dollars(648_000.0), "648,000");
        assert_eq!(format_dollars(1_134_780.0), "1,134,780");
        assert_eq!(format_dollars(-78_500.0), "-78,500");
    }

    #[test]
    fn context_lines_name_the_records() {
        let finding = BudgetFinding {
            kind: FindingKind::InvertedDates,
            line_ids: vec!["emp-3".into()],
            ..BudgetFinding::default()
        };
        assert!(finding_context(&finding).contains("emp-3"));
    }
}
