use std::sync::Arc;

use weekly_report::workflows::report::{ReportExporter, ReportFields};
use weekly_report::workflows::table::TaskTable;

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/weekly_tasks.csv");

#[tokio::test]
async fn csv_export_renders_grouped_report() {
    let table = ReportFields::default()
        .csv_loader()
        .from_path(FIXTURE)
        .expect("fixture loads");
    assert_eq!(table.name().await.expect("table name"), "weekly_tasks");

    let mut exporter = ReportExporter::new(Arc::new(table));
    exporter.init().await.expect("exporter initialises");
    exporter.set_filter_range(14, 16);

    let text = exporter.get_report_text().await.expect("report renders");
    let expected = [
        "1. Other",
        "  * Triage inbox",
        "2. Docs",
        "  * Publish onboarding guide",
        "  * Draft API changelog (unfinished)",
        "3. Infra",
        "  * Rotate staging certificates",
        "  * Migrate CI runners (unfinished)",
    ]
    .join("\n");
    assert_eq!(text, expected);
}

#[tokio::test]
async fn csv_export_without_group_column_uses_sentinel_only() {
    let csv = "task_description,state,finish_week\n\
Ship release,processing-complete,20\n\
Write retro,processing,20\n";
    let table = ReportFields::default()
        .csv_loader()
        .from_reader("Sprint", csv.as_bytes())
        .expect("csv loads");

    let mut exporter = ReportExporter::new(Arc::new(table));
    exporter.init().await.expect("exporter initialises");
    exporter.set_filter_range(20, 20);

    assert_eq!(
        exporter.get_report_text().await.expect("report renders"),
        "1. Other\n  * Ship release\n  * Write retro (unfinished)"
    );
}
