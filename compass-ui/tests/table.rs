//! Behavioural tests for the data table.

use compass_ui::table::{
    Column, DataTable, PageControl, Row, SharedControls, SharedText, SharedView, Sort,
    SortDirection, TableConfig,
};

fn columns() -> Vec<Column> {
    vec![
        Column::new("controlId", "Control ID").sortable(),
        Column::new("controlDescription", "Description"),
    ]
}

fn numbered_rows(n: usize) -> Vec<Row> {
    (0..n)
        .map(|i| {
            Row::new()
                .with("controlId", format!("C-{i:03}"))
                .with("controlDescription", if i % 3 == 0 { "Access review" } else { "Backup" })
        })
        .collect()
}

#[test]
fn test_control_items_scenario() {
    let host = SharedView::new();
    let mut table = DataTable::new(host.clone(), columns(), TableConfig::default().page_size(2));
    table.load(vec![
        Row::new().with("controlId", "B").with("controlDescription", "y"),
        Row::new().with("controlId", "A").with("controlDescription", "x"),
    ]);

    let view = host.get().unwrap();
    assert_eq!(view.column_text(0), ["B", "A"]);
    assert_eq!(view.info.as_deref(), Some("Showing 1 to 2 of 2 entries"));
    assert_eq!(view.pagination.as_deref(), Some(&[][..]));

    table.sort_by("controlId");
    assert_eq!(host.get().unwrap().column_text(0), ["A", "B"]);

    table.sort_by("controlId");
    assert_eq!(host.get().unwrap().column_text(0), ["B", "A"]);
}

#[test]
fn test_pages_partition_the_filtered_set() {
    for page_size in [1, 3, 4, 7, 25] {
        let host = SharedView::new();
        let mut table = DataTable::new(host.clone(), columns(), TableConfig::default());
        table.load(numbered_rows(23));
        table.filter("backup");
        table.set_page_size(page_size);

        let mut seen = 0;
        for page in 1..=table.page_count() {
            table.go_to_page(page);
            let rendered = host.get().unwrap().rows.len();
            assert!(rendered <= page_size);
            seen += rendered;
        }
        assert_eq!(seen, table.filtered_len());
    }
}

#[test]
fn test_filter_is_case_insensitive_substring() {
    let mut table = DataTable::new(SharedView::new(), columns(), TableConfig::default());
    let rows = numbered_rows(9);
    table.load(rows.clone());

    table.filter("ACCESS");
    assert_eq!(table.filtered_len(), 3);
    assert!(table.filtered_rows().iter().all(|r| r.text("controlDescription") == "Access review"));

    table.filter("");
    assert_eq!(table.filtered_len(), rows.len());
}

#[test]
fn test_double_sort_reverses_single_sort() {
    let mut table = DataTable::new(SharedView::new(), columns(), TableConfig::default().page_size(50));
    let mut rows = numbered_rows(12);
    rows.reverse();
    table.load(rows);

    table.sort_by("controlId");
    let asc: Vec<String> = table.filtered_rows().iter().map(|r| r.text("controlId")).collect();
    table.sort_by("controlId");
    let desc: Vec<String> = table.filtered_rows().iter().map(|r| r.text("controlId")).collect();

    let mut reversed = asc.clone();
    reversed.reverse();
    assert_eq!(desc, reversed);
}

#[test]
fn test_ties_keep_load_order() {
    let mut table = DataTable::new(SharedView::new(), columns(), TableConfig::default());
    table.load(vec![
        Row::new().with("controlId", "1").with("controlDescription", "Same"),
        Row::new().with("controlId", "2").with("controlDescription", "same"),
        Row::new().with("controlId", "3").with("controlDescription", "SAME"),
    ]);
    table.sort_by("controlDescription");
    let ids: Vec<String> = table.filtered_rows().iter().map(|r| r.text("controlId")).collect();
    assert_eq!(ids, ["1", "2", "3"]);
}

#[test]
fn test_load_resets_page_and_sort() {
    let mut table = DataTable::new(SharedView::new(), columns(), TableConfig::default());
    table.load(numbered_rows(30));
    table.sort_by("controlId");
    table.set_page_size(3);
    table.go_to_page(4);
    table.filter("Access");
    table.load(numbered_rows(5));

    assert_eq!(table.current_page(), 1);
    assert!(table.sort().is_none());
    assert_eq!(table.query(), "");
    assert_eq!(table.filtered_len(), 5);
    assert_eq!(table.page_size(), 3);
}

#[test]
fn test_filter_reapplies_active_sort() {
    let host = SharedView::new();
    let mut table = DataTable::new(host.clone(), columns(), TableConfig::default());
    table.load(vec![
        Row::new().with("controlId", "C").with("controlDescription", "x"),
        Row::new().with("controlId", "A").with("controlDescription", "x"),
        Row::new().with("controlId", "B").with("controlDescription", "y"),
    ]);
    table.sort_by("controlId");
    table.sort_by("controlId");
    assert_eq!(host.get().unwrap().column_text(0), ["C", "B", "A"]);

    table.filter("x");
    assert_eq!(host.get().unwrap().column_text(0), ["C", "A"]);
    assert_eq!(
        table.sort(),
        Some(&Sort {
            key: "controlId".to_string(),
            direction: SortDirection::Desc,
        })
    );

    table.filter("");
    assert_eq!(host.get().unwrap().column_text(0), ["C", "B", "A"]);
}

#[test]
fn test_external_targets_receive_footer() {
    let host = SharedView::new();
    let info = SharedText::new();
    let pager = SharedControls::new();
    let mut table = DataTable::new(
        host.clone(),
        columns(),
        TableConfig::default()
            .page_size(5)
            .external_info(info.clone())
            .external_pagination(pager.clone()),
    );
    table.load(numbered_rows(12));

    let view = host.get().unwrap();
    assert!(view.info.is_none());
    assert!(view.pagination.is_none());
    assert_eq!(info.get(), "Showing 1 to 5 of 12 entries");
    assert_eq!(
        pager.get().last(),
        Some(&PageControl::Next {
            target: 2,
            disabled: false
        })
    );

    table.load(Vec::new());
    assert_eq!(info.get(), "No data");
    assert!(pager.get().is_empty());
}

#[test]
fn test_malformed_json_loads_empty() {
    let host = SharedView::new();
    let mut table = DataTable::new(host.clone(), columns(), TableConfig::default());
    table.load_json(&serde_json::json!("not rows"));
    assert_eq!(table.filtered_len(), 0);
    assert_eq!(host.get().unwrap().info.as_deref(), Some("No data"));
}
