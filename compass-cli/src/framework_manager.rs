//! Framework list and the control-item table of the open framework.
//!
//! Opening a framework is split in two so the fetch can run elsewhere:
//! [`FrameworkManager::begin_open`] hands out an [`OpenTicket`] and
//! [`FrameworkManager::complete_open`] applies the result only if that
//! ticket is still the latest one. Results of superseded or aborted
//! fetches never reach the table.

use std::cell::RefCell;
use std::rc::Rc;

use compass_lib::ApiClient;
use compass_lib::error::Error;
use compass_lib::model::{ControlField, ControlItem, Framework};
use compass_lib::services::FrameworkService;
use compass_ui::table::{
    Column, DataTable, PageControl, Row, SharedControls, SharedText, SharedView, TableConfig,
    TableView,
};

/// Route prefix of a framework page.
pub const FRAMEWORK_ROUTE: &str = "/framework/";

/// Title shown while no framework is open.
pub const HOME_TITLE: &str = "Frameworks";

/// What the content area shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentState {
    /// No framework selected yet.
    Empty,
    /// Rows of the named framework are being fetched.
    Loading(String),
    Table,
    NoData,
    Error(String),
}

/// Title and breadcrumb trail above the content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageHeader {
    pub title: String,
    pub breadcrumb: Vec<String>,
}

impl Default for PageHeader {
    fn default() -> Self {
        Self {
            title: HOME_TITLE.to_string(),
            breadcrumb: vec![HOME_TITLE.to_string()],
        }
    }
}

/// Identifies one open request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenTicket {
    seq: u64,
    framework_id: String,
}

impl OpenTicket {
    pub fn framework_id(&self) -> &str {
        &self.framework_id
    }
}

pub struct FrameworkManager {
    frameworks: Vec<Framework>,
    active: Option<String>,
    pending: Option<OpenTicket>,
    next_seq: u64,
    content: ContentState,
    header: PageHeader,
    history: Vec<String>,

    table: DataTable,
    view: SharedView,
    info: SharedText,
    pager: SharedControls,
    search_input: Rc<RefCell<String>>,
}

impl FrameworkManager {
    pub fn new(page_size: usize) -> Self {
        let view = SharedView::new();
        let info = SharedText::new();
        let pager = SharedControls::new();
        let search_input = Rc::new(RefCell::new(String::new()));

        let on_reset = {
            let search_input = search_input.clone();
            move || search_input.borrow_mut().clear()
        };
        let table = DataTable::new(
            view.clone(),
            control_columns(),
            TableConfig::default()
                .page_size(page_size)
                .external_info(info.clone())
                .external_pagination(pager.clone())
                .on_reset(on_reset),
        );

        Self {
            frameworks: Vec::new(),
            active: None,
            pending: None,
            next_seq: 0,
            content: ContentState::Empty,
            header: PageHeader::default(),
            history: Vec::new(),
            table,
            view,
            info,
            pager,
            search_input,
        }
    }

    // -------------------------------------------------------------------------
    // Framework list
    // -------------------------------------------------------------------------

    /// Fetch the framework list. Returns how many frameworks were loaded.
    pub async fn load_frameworks(&mut self, service: &FrameworkService) -> Result<usize, Error> {
        let frameworks = service.get_frameworks().await?;
        self.set_frameworks(frameworks);
        Ok(self.frameworks.len())
    }

    pub fn set_frameworks(&mut self, frameworks: Vec<Framework>) {
        self.frameworks = frameworks;
        self.update_page_header();
    }

    pub fn frameworks(&self) -> &[Framework] {
        &self.frameworks
    }

    /// Mark `id` as the selected list item.
    ///
    /// Returns false if `id` is not in the loaded list; it is still
    /// selected so a list loaded later shows it active.
    pub fn activate_item(&mut self, id: &str) -> bool {
        self.active = Some(id.to_string());
        self.frameworks.iter().any(|f| f.id == id)
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn active_framework(&self) -> Option<&Framework> {
        let id = self.active.as_deref()?;
        self.frameworks.iter().find(|f| f.id == id)
    }

    /// Recompute the title and breadcrumb from the active framework.
    pub fn update_page_header(&mut self) {
        self.header = match (self.active_framework(), self.active.as_deref()) {
            (Some(framework), _) => {
                let crumb = if framework.short_name.is_empty() {
                    framework.name.clone()
                } else {
                    framework.short_name.clone()
                };
                PageHeader {
                    title: framework.name.clone(),
                    breadcrumb: vec![HOME_TITLE.to_string(), crumb],
                }
            }
            (None, Some(id)) => PageHeader {
                title: id.to_string(),
                breadcrumb: vec![HOME_TITLE.to_string(), id.to_string()],
            },
            (None, None) => PageHeader::default(),
        };
    }

    pub fn header(&self) -> &PageHeader {
        &self.header
    }

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------

    /// Record a route for `id` and start opening it.
    ///
    /// `replace` overwrites the latest history entry instead of pushing.
    /// Returns `None` when `id` is already open; a framework whose last
    /// load failed can be navigated to again.
    pub fn navigate_to_framework(&mut self, id: &str, replace: bool) -> Option<OpenTicket> {
        if self.active.as_deref() == Some(id) && !matches!(self.content, ContentState::Error(_)) {
            log::debug!("Framework {} already open", id);
            return None;
        }

        let route = framework_route(id);
        if replace && let Some(last) = self.history.last_mut() {
            *last = route;
        } else {
            self.history.push(route);
        }
        Some(self.begin_open(id))
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Select `id`, show the loading state and issue a ticket for its rows.
    ///
    /// Any earlier ticket becomes stale.
    pub fn begin_open(&mut self, id: &str) -> OpenTicket {
        self.next_seq += 1;
        let ticket = OpenTicket {
            seq: self.next_seq,
            framework_id: id.to_string(),
        };
        self.activate_item(id);
        self.update_page_header();
        self.content = ContentState::Loading(id.to_string());
        self.pending = Some(ticket.clone());
        ticket
    }

    /// Apply the outcome of the fetch started for `ticket`.
    ///
    /// Returns false when the result was ignored: the ticket is stale or
    /// the request was aborted.
    pub fn complete_open(
        &mut self,
        ticket: &OpenTicket,
        result: Result<Vec<ControlItem>, Error>,
    ) -> bool {
        if self.pending.as_ref() != Some(ticket) {
            log::debug!("Ignoring stale rows for {}", ticket.framework_id);
            return false;
        }

        match result {
            Err(e) if e.is_aborted() => {
                log::debug!("Rows request for {} aborted", ticket.framework_id);
                false
            }
            Err(e) => {
                log::warn!("Failed to load rows for {}: {}", ticket.framework_id, e);
                self.pending = None;
                self.content = ContentState::Error(e.to_string());
                true
            }
            Ok(items) => {
                self.pending = None;
                let rows: Vec<Row> = items.iter().filter_map(Row::from_serialize).collect();
                self.content = if rows.is_empty() {
                    ContentState::NoData
                } else {
                    ContentState::Table
                };
                self.table.load(rows);
                true
            }
        }
    }

    /// Open `id` and wait for its rows.
    pub async fn open_framework(&mut self, api: &ApiClient, id: &str) -> bool {
        let ticket = self.begin_open(id);
        let result = api.get_framework_rows(id, None).await;
        self.complete_open(&ticket, result)
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn content(&self) -> &ContentState {
        &self.content
    }

    // -------------------------------------------------------------------------
    // Table pass-through
    // -------------------------------------------------------------------------

    pub fn search(&mut self, text: &str) {
        *self.search_input.borrow_mut() = text.to_string();
        self.table.filter(text);
    }

    pub fn clear_search(&mut self) {
        self.search_input.borrow_mut().clear();
        self.table.filter("");
    }

    /// Sort by a column key or one of the aliases `id`, `category`,
    /// `description`.
    pub fn sort(&mut self, key: &str) {
        let key = match key.to_ascii_lowercase().as_str() {
            "id" => ControlField::Id.key(),
            "category" => ControlField::Category.key(),
            "description" => ControlField::Description.key(),
            _ => key,
        };
        self.table.sort_by(key);
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.table.go_to_page(page);
    }

    pub fn next_page(&mut self) {
        self.table.next_page();
    }

    pub fn prev_page(&mut self) {
        self.table.prev_page();
    }

    pub fn set_page_size(&mut self, size: usize) {
        self.table.set_page_size(size);
    }

    pub fn table(&self) -> &DataTable {
        &self.table
    }

    /// The last view the table rendered.
    pub fn view(&self) -> Option<TableView> {
        self.view.get()
    }

    /// Summary text, e.g. `Showing 1 to 10 of 42 entries`.
    pub fn info(&self) -> String {
        self.info.get()
    }

    pub fn page_controls(&self) -> Vec<PageControl> {
        self.pager.get()
    }

    /// Current text of the search input.
    pub fn search_text(&self) -> String {
        self.search_input.borrow().clone()
    }
}

fn control_columns() -> Vec<Column> {
    vec![
        Column::new(ControlField::Id.key(), "Control ID")
            .sortable()
            .width("15%"),
        Column::new(ControlField::Category.key(), "Category")
            .sortable()
            .width("20%"),
        Column::new(ControlField::Description.key(), "Description").sortable(),
    ]
}

/// Route of the page showing framework `id`.
pub fn framework_route(id: &str) -> String {
    format!("{}{}", FRAMEWORK_ROUTE, urlencoding::encode(id))
}

/// Framework id named by a `/framework/<id>` route, percent-decoded.
///
/// A leading `#` is ignored, as are query strings and trailing segments.
pub fn route_framework_id(path: &str) -> Option<String> {
    let path = path.trim().trim_start_matches('#');
    let rest = path.strip_prefix(FRAMEWORK_ROUTE)?;
    let raw = rest.split(['/', '?']).next().unwrap_or_default();
    if raw.is_empty() {
        return None;
    }
    urlencoding::decode(raw).ok().map(|id| id.into_owned())
}

#[cfg(test)]
mod tests {
    use compass_lib::error::ApiError;

    use super::*;

    fn items() -> Vec<ControlItem> {
        vec![
            ControlItem::new("A.2", "Access", "Leavers"),
            ControlItem::new("A.1", "Access", "Joiners"),
            ControlItem::new("B.1", "Backup", "Daily backups"),
        ]
    }

    #[test]
    fn test_route_framework_id() {
        assert_eq!(route_framework_id("/framework/iso").as_deref(), Some("iso"));
        assert_eq!(route_framework_id("#/framework/soc%202").as_deref(), Some("soc 2"));
        assert_eq!(route_framework_id("/framework/pci?tab=1").as_deref(), Some("pci"));
        assert_eq!(route_framework_id("/framework/"), None);
        assert_eq!(route_framework_id("/settings"), None);
    }

    #[test]
    fn test_route_is_encoded() {
        assert_eq!(framework_route("soc 2"), "/framework/soc%202");
        assert_eq!(
            route_framework_id(&framework_route("a/b")).as_deref(),
            Some("a/b")
        );
    }

    #[test]
    fn test_complete_open_loads_table() {
        let mut manager = FrameworkManager::new(2);
        let ticket = manager.begin_open("iso");
        assert_eq!(manager.content(), &ContentState::Loading("iso".into()));
        assert!(manager.is_loading());

        assert!(manager.complete_open(&ticket, Ok(items())));
        assert_eq!(manager.content(), &ContentState::Table);
        assert_eq!(manager.info(), "Showing 1 to 2 of 3 entries");
        assert_eq!(manager.view().unwrap().column_text(0), ["A.2", "A.1"]);
    }

    #[test]
    fn test_stale_and_aborted_results_are_ignored() {
        let mut manager = FrameworkManager::new(10);
        let first = manager.begin_open("iso");
        let second = manager.begin_open("pci");

        assert!(!manager.complete_open(&first, Ok(items())));
        assert_eq!(manager.table().data().len(), 0);

        assert!(!manager.complete_open(&second, Err(ApiError::Aborted.into())));
        assert_eq!(manager.content(), &ContentState::Loading("pci".into()));

        assert!(manager.complete_open(&second, Ok(Vec::new())));
        assert_eq!(manager.content(), &ContentState::NoData);
        assert_eq!(manager.info(), "No data");
    }

    #[test]
    fn test_failure_shows_error_and_allows_retry() {
        let mut manager = FrameworkManager::new(10);
        let ticket = manager.navigate_to_framework("iso", false).unwrap();
        assert!(manager.complete_open(&ticket, Err(ApiError::http(500, "boom").into())));
        assert!(matches!(manager.content(), ContentState::Error(_)));

        assert!(manager.navigate_to_framework("iso", false).is_some());
    }

    #[test]
    fn test_navigation_history() {
        let mut manager = FrameworkManager::new(10);
        let ticket = manager.navigate_to_framework("iso", false).unwrap();
        manager.complete_open(&ticket, Ok(items()));

        assert!(manager.navigate_to_framework("iso", false).is_none());
        manager.navigate_to_framework("pci", true);
        manager.navigate_to_framework("soc 2", false);
        assert_eq!(manager.history(), ["/framework/pci", "/framework/soc%202"]);
    }

    #[test]
    fn test_header_follows_active_framework() {
        let mut manager = FrameworkManager::new(10);
        assert_eq!(manager.header(), &PageHeader::default());

        manager.begin_open("iso");
        assert_eq!(manager.header().title, "iso");

        manager.set_frameworks(vec![Framework {
            id: "iso".into(),
            name: "ISO 27001".into(),
            short_name: "ISO".into(),
            description: String::new(),
            status: String::new(),
            status_class: None,
            icon: None,
            is_enterprise: false,
        }]);
        assert_eq!(manager.header().title, "ISO 27001");
        assert_eq!(manager.header().breadcrumb, [HOME_TITLE, "ISO"]);
        assert!(manager.activate_item("iso"));
        assert!(!manager.activate_item("pci"));
    }

    #[test]
    fn test_search_input_cleared_on_load() {
        let mut manager = FrameworkManager::new(10);
        let ticket = manager.begin_open("iso");
        manager.complete_open(&ticket, Ok(items()));

        manager.search("backup");
        assert_eq!(manager.table().filtered_len(), 1);
        assert_eq!(manager.search_text(), "backup");

        let ticket = manager.begin_open("pci");
        manager.complete_open(&ticket, Ok(items()));
        assert_eq!(manager.search_text(), "");
        assert_eq!(manager.table().filtered_len(), 3);
    }

    #[test]
    fn test_sort_aliases() {
        let mut manager = FrameworkManager::new(10);
        let ticket = manager.begin_open("iso");
        manager.complete_open(&ticket, Ok(items()));

        manager.sort("id");
        assert_eq!(manager.view().unwrap().column_text(0), ["A.1", "A.2", "B.1"]);
        manager.sort("controlId");
        assert_eq!(manager.view().unwrap().column_text(0), ["B.1", "A.2", "A.1"]);
    }
}
