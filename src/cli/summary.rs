use crate::cli::run::RunSummary;
use crate::options::Operation;

/// Banner printed before a run starts
pub fn banner(operation: Operation) -> String {
    let title = match operation {
        Operation::Encrypt => "Data will be hashed and encrypted",
        Operation::Decrypt => "Data will be decrypted",
    };
    format!("\n{}\n{}\n", title, "=".repeat(title.len()))
}

/// Human-readable account of a finished run
pub fn format_summary(summary: &RunSummary) -> String {
    let report = &summary.report;
    let mut output = String::new();

    output.push_str(&format!("Output: {}\n", summary.output.display()));
    output.push_str(&format!("Rows: {}\n", summary.rows));
    output.push_str(&format!("Columns: {}\n", summary.width));
    output.push('\n');

    for (i, column) in report.columns.iter().enumerate() {
        let target = match report.operation {
            Operation::Encrypt => format!(
                "hashed, encrypted into {}",
                report.added.get(i).map(|id| id.to_string()).unwrap_or_default()
            ),
            Operation::Decrypt => "decrypted".to_string(),
        };
        output.push_str(&format!(
            "  Column {}: {} ({} ok, {} failed)\n",
            column.column,
            target,
            column.succeeded(),
            column.failures.len()
        ));
    }

    let failed = report.failed_cells();
    if failed > 0 {
        output.push('\n');
        output.push_str(&format!(
            "{} cell(s) could not be processed and were left empty\n",
            failed
        ));
    }

    output
}
