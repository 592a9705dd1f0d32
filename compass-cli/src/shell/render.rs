//! Plain-text rendering of the manager views.

use std::fmt::Write;

use compass_lib::model::{ControlItem, Framework};
use compass_ui::form::Form;
use compass_ui::stepper::Stepper;
use compass_ui::table::{PageControl, SortDirection, TableView};

use crate::framework_manager::{ContentState, FrameworkManager, PageHeader};

/// Widest a column may grow before cells are cut.
const MAX_COLUMN_WIDTH: usize = 60;

pub fn render_frameworks(frameworks: &[Framework], active: Option<&str>) -> String {
    if frameworks.is_empty() {
        return "No frameworks found".to_string();
    }
    let width = frameworks.iter().map(|f| f.id.chars().count()).max().unwrap_or(0);
    let mut out = String::new();
    for framework in frameworks {
        let marker = if active == Some(framework.id.as_str()) { '*' } else { ' ' };
        let _ = write!(out, "{} {:<width$}  {}", marker, framework.id, framework.name);
        if !framework.status.is_empty() {
            let _ = write!(out, "  [{}]", framework.status);
        }
        if framework.is_enterprise {
            out.push_str("  (enterprise)");
        }
        out.push('\n');
    }
    out
}

pub fn render_header(header: &PageHeader) -> String {
    format!("{}\n{}", header.breadcrumb.join(" > "), header.title)
}

/// The content area of the framework page.
pub fn render_content(manager: &FrameworkManager) -> String {
    match manager.content() {
        ContentState::Empty => "Select a framework with 'open <id>'".to_string(),
        ContentState::Loading(id) => format!("Loading controls for {}...", id),
        ContentState::NoData => "No control items for this framework".to_string(),
        ContentState::Error(message) => format!("Failed to load control items: {}", message),
        ContentState::Table => match manager.view() {
            Some(view) => render_table(&view, &manager.info(), &manager.page_controls()),
            None => String::new(),
        },
    }
}

/// Draw a table view with its summary and page controls.
///
/// `info` and `controls` are used when the view has no internal footer.
pub fn render_table(view: &TableView, info: &str, controls: &[PageControl]) -> String {
    let headers: Vec<String> = view
        .header
        .iter()
        .map(|h| match h.sorted {
            Some(SortDirection::Asc) => format!("{} ^", h.label),
            Some(SortDirection::Desc) => format!("{} v", h.label),
            None => h.label.clone(),
        })
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &view.rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.as_str().chars().count().min(MAX_COLUMN_WIDTH));
        }
    }

    let mut out = String::new();
    push_line(&mut out, &headers, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, &rule, &widths);
    for row in &view.rows {
        let cells: Vec<String> = row.iter().map(|c| clip(c.as_str())).collect();
        push_line(&mut out, &cells, &widths);
    }

    out.push('\n');
    out.push_str(view.info.as_deref().unwrap_or(info));
    let controls = view.pagination.as_deref().unwrap_or(controls);
    if !controls.is_empty() {
        out.push('\n');
        out.push_str(&render_page_controls(controls));
    }
    out
}

pub fn render_page_controls(controls: &[PageControl]) -> String {
    controls
        .iter()
        .map(|control| match control {
            PageControl::Page { number, current: true } => format!("[{}]", number),
            PageControl::Previous { disabled: true, .. } | PageControl::Next { disabled: true, .. } => {
                format!("({})", control.label())
            }
            _ => control.label(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// The wizard: indicators, the current step's content and the counter.
pub fn render_stepper(stepper: &Stepper, controls: &[ControlItem]) -> String {
    let container = stepper.container();
    let mut out = String::new();

    let indicators: Vec<String> = container
        .indicators
        .iter()
        .enumerate()
        .map(|(index, indicator)| {
            let state = if indicator.classes.contains("error") {
                "!"
            } else if indicator.classes.contains("active") {
                ">"
            } else if indicator.classes.contains("completed") {
                "+"
            } else {
                " "
            };
            format!("[{}{} {}]", state, index + 1, indicator.label)
        })
        .collect();
    let _ = writeln!(out, "{}", indicators.join(" "));

    if let Some(step) = container.step_node(stepper.current()) {
        let _ = writeln!(out, "{}", step.title);
        match &step.form {
            Some(form) => render_form(&mut out, form),
            None => render_controls(&mut out, controls),
        }
    }

    if let Some(counter) = &container.counter {
        let _ = write!(out, "Step {}", counter);
    }
    out
}

fn render_form(out: &mut String, form: &Form) {
    for field in form.fields() {
        let required = if field.is_required() { "*" } else { "" };
        let _ = writeln!(out, "  {}{}: {}", field.name(), required, field.value());
        if field.error_visible()
            && let Some(text) = field.error_text_value()
        {
            let _ = writeln!(out, "    ! {}", text);
        }
    }
}

fn render_controls(out: &mut String, controls: &[ControlItem]) {
    if controls.is_empty() {
        let _ = writeln!(out, "  No control items (use 'template <path>')");
        return;
    }
    for item in controls {
        let _ = writeln!(
            out,
            "  {}  {}  {}",
            item.control_id,
            item.control_category,
            clip(&item.control_description)
        );
    }
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

fn clip(text: &str) -> String {
    if text.chars().count() <= MAX_COLUMN_WIDTH {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(MAX_COLUMN_WIDTH - 3).collect();
    clipped.push_str("...");
    clipped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modal_manager::ModalManager;

    #[test]
    fn test_render_page_controls() {
        let controls = compass_ui::table::page_controls(1, 3);
        assert_eq!(render_page_controls(&controls), "(Previous) [1] 2 3 Next");
    }

    #[test]
    fn test_render_table_marks_sort() {
        let mut manager = FrameworkManager::new(10);
        let ticket = manager.begin_open("iso");
        manager.complete_open(
            &ticket,
            Ok(vec![
                ControlItem::new("B.1", "Backup", "Daily"),
                ControlItem::new("A.1", "Access", "Joiners"),
            ]),
        );
        manager.sort("id");

        let text = render_content(&manager);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("Control ID ^"));
        assert!(lines[2].starts_with("A.1"));
        assert!(lines[3].starts_with("B.1"));
        assert!(text.contains("Showing 1 to 2 of 2 entries"));
    }

    #[test]
    fn test_render_frameworks_marks_active() {
        let framework = |id: &str, name: &str| Framework {
            id: id.into(),
            name: name.into(),
            short_name: String::new(),
            description: String::new(),
            status: "Ready to Map".into(),
            status_class: None,
            icon: None,
            is_enterprise: false,
        };
        let text = render_frameworks(&[framework("iso", "ISO 27001"), framework("pci", "PCI DSS")], Some("pci"));
        assert_eq!(
            text,
            "  iso  ISO 27001  [Ready to Map]\n* pci  PCI DSS  [Ready to Map]\n"
        );
    }

    #[test]
    fn test_render_stepper_shows_errors() {
        let mut modal = ModalManager::new();
        modal.open_new_framework_modal().unwrap();
        modal.step("next");

        let text = modal
            .with_stepper(|s| render_stepper(s, &modal.controls()))
            .unwrap();
        assert!(text.starts_with("[>1 Details] [ 2 Controls]"));
        assert!(text.contains("! Framework name is required"));
        assert!(text.ends_with("Step 1/2"));
    }
}
