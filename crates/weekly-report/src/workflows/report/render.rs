use super::GroupedReport;

/// Renders groups as `"{n}. {name}"` headings followed by `"  * {item}"` lines.
/// Empty groups keep their heading and number.
pub fn render(report: &GroupedReport) -> String {
    let mut lines = Vec::with_capacity(report.groups().len() + report.item_count());

    for (position, group) in report.groups().iter().enumerate() {
        lines.push(format!("{}. {}", position + 1, group.name));
        lines.extend(group.items.iter().map(|item| format!("  * {item}")));
    }

    lines.join("\n")
}
