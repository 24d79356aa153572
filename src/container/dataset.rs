use serde_json::Value;
use std::io;
use std::sync::Arc;
use tracing::{debug, warn};

use super::{Bindable, Container, Node, PageLink, Pagination, PaginationWindow, Repeater};
use crate::element::Element;
use crate::errors::LoadError;
use crate::field::{FieldRegistry, FormField};
use crate::format::{grouped, FormatMode};
use crate::layout::Recordset;
use crate::session::BindSession;
use crate::source::{LinkBuilder, QueryLinks, RowSource};
use crate::value::{escape, to_text};

const SORT_DIALOG: &str = r#"
<table id="sort-row-clone" class="hidden">
	<tr class="event" data-click-handler="selectSortRow">
		<td class="center"><input name="dialog-sort-sel" type="radio"></td>
		<td class="center">Sort By</td>
		<td><select class="dialog-sort-col" name="sort[]"></select></td>
		<td>
			<select class="dialog-sort-order" name="order[]">
				<option value="asc">Ascending</option>
				<option value="desc">Descending</option>
			</select>
		</td>
	</tr>
</table>
<div id="sort" title="Sorting Options" class="dialog" data-dialog-ok="sortApply" data-modal="1" data-min-width="460" data-min-height="460" data-buttons="[btnOK, btnCancel]">
	<div class="menu center">
		<button class="event" data-click-handler="sortAddRow" data-icons='{"primary": "ui-icon-plus"}'>Add Level</button>
		<button class="event" data-click-handler="sortRemoveRow" data-icons='{"primary": "ui-icon-minus"}'>Delete Level</button>
		<button class="event" data-click-handler="sortMoveUp" data-icons='{"primary": "ui-icon-triangle-1-n"}'>Move Up</button>
		<button class="event" data-click-handler="sortMoveDown" data-icons='{"primary": "ui-icon-triangle-1-s"}'>Move Down</button>
	</div>
	<table class="table">
		<thead>
			<tr>
				<th></th>
				<th></th>
				<th>Column</th>
				<th>Sort Direction</th>
			</tr>
		</thead>
		<tbody>
		</tbody>
	</table>
</div>
"#;

/// A repeater rendered as a table, one column per field
///
/// Containers and repeaters added to a data set are flattened, only their fields become columns. Rows are
/// rendered in html mode unless the data set is cascaded into another mode by its parent.
#[derive(Clone, Debug)]
pub struct DataSet {
    pub(crate) repeater: Repeater,
    caption: Option<String>,
    multisort: bool,
    pagination: Option<Pagination>,
    paginated: bool,
    window: PaginationWindow,
    export_filename: Option<String>,
    links: Arc<dyn LinkBuilder>,
}

impl Default for DataSet {
    fn default() -> Self {
        DataSet::new()
    }
}

impl DataSet {
    pub fn new() -> Self {
        let mut repeater = Repeater::new(Container::hgroup().with_layout(Recordset::default()));
        repeater.set_default_number(0);
        repeater.element.child_indent = 2;
        repeater.element.format_mode = FormatMode::Html;
        repeater.element.add_class("table dataset");

        DataSet {
            repeater,
            caption: None,
            multisort: false,
            pagination: None,
            paginated: false,
            window: PaginationWindow::default(),
            export_filename: None,
            links: Arc::new(QueryLinks),
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.repeater.set_namespace(Some(namespace.into()));
        self
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.add_child(child);
        self
    }

    pub fn element(&self) -> &Element {
        &self.repeater.element
    }

    pub fn element_mut(&mut self) -> &mut Element {
        &mut self.repeater.element
    }

    pub fn repeater(&self) -> &Repeater {
        &self.repeater
    }

    pub fn repeater_mut(&mut self) -> &mut Repeater {
        &mut self.repeater
    }

    /// Add a column, or every field of a container as columns
    pub fn add_child(&mut self, child: impl Into<Node>) -> &mut Self {
        match child.into() {
            Node::Field(field) => {
                self.repeater.proxy_mut().add_child(field);
            }
            Node::Container(container) => {
                for node in container.into_children() {
                    self.add_child(node);
                }
            }
            Node::Repeater(repeater) => {
                for node in repeater.into_proxy().into_children() {
                    self.add_child(node);
                }
            }
            Node::DataSet(_) | Node::Html(_) => {
                warn!("only fields map to data set columns, skipping node");
            }
        }
        self
    }

    /// The column fields in order
    pub fn columns(&self) -> impl Iterator<Item = &FormField> {
        self.repeater.proxy().children().iter().filter_map(Node::as_field)
    }

    pub fn set_caption(&mut self, caption: Option<String>) {
        self.caption = caption;
    }

    pub fn enable_multisort(&mut self, enabled: bool) {
        self.multisort = enabled;
    }

    pub fn set_pagination(&mut self, pagination: Option<Pagination>) {
        self.pagination = pagination;
    }

    pub fn pagination(&self) -> Option<&Pagination> {
        self.pagination.as_ref()
    }

    pub fn set_paginated(&mut self, paginated: bool) {
        self.paginated = paginated;
    }

    pub fn is_paginated(&self) -> bool {
        self.paginated
    }

    pub fn pagination_window(&self) -> &PaginationWindow {
        &self.window
    }

    pub fn set_pagination_window(&mut self, window: PaginationWindow) {
        self.window = window;
    }

    pub fn set_link_builder(&mut self, links: Arc<dyn LinkBuilder>) {
        self.links = links;
    }

    pub fn format_mode(&self) -> FormatMode {
        self.repeater.format_mode()
    }

    pub fn set_format_mode(&mut self, mode: FormatMode) {
        self.repeater.set_format_mode(mode);
    }

    pub fn enable_export(&mut self, filename: impl Into<String>) {
        self.export_filename = Some(filename.into());
    }

    pub fn export_filename(&self) -> Option<&str> {
        self.export_filename.as_deref()
    }

    /// Number of bound rows
    pub fn len(&self) -> usize {
        self.repeater.rows().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The page links for the current pagination, empty when not paginated
    pub fn page_links(&self) -> Vec<PageLink> {
        self.pagination
            .as_ref()
            .map(|page| page.page_links(&self.window))
            .unwrap_or_default()
    }

    /// The record count shown in the table footer
    ///
    /// In form mode with dynamic additions the bound rows are counted, rows may have been added
    /// on the client. Otherwise the pagination supplied by the query layer is used as is.
    pub fn record_summary(&self) -> Option<String> {
        let page = if self.format_mode() == FormatMode::Form && self.repeater.is_dynamic() {
            let total = self.len() as u64;
            Pagination {
                total_records: total,
                total_pages: 1,
                current_page: 1,
                first_record: total.min(1),
                last_record: total,
            }
        } else {
            self.pagination.clone()?
        };

        let count = |n: u64| grouped(n as f64, 0);
        let s = if page.total_records != 1 { "s" } else { "" };
        if self.paginated && page.total_pages > 1 {
            Some(format!(
                "Record{s} {} - {} of {}",
                count(page.first_record),
                count(page.last_record),
                count(page.total_records)
            ))
        } else {
            Some(format!("{} Record{s}", count(page.total_records)))
        }
    }

    /// Build the export table: a header row of column labels followed by one row per record
    ///
    /// Every column is exported in order, hidden ones included.
    pub fn export_records(&self, session: &mut BindSession) -> Vec<Vec<String>> {
        let mut export = self.repeater.clone();
        export.set_format_mode(FormatMode::Export);

        let mut records = vec![self.columns().map(column_title).collect::<Vec<_>>()];
        for row in export.instances(session) {
            records.push(
                row.children()
                    .iter()
                    .filter_map(Node::as_field)
                    .map(|field| to_text(&field.value(Some(FormatMode::Export))))
                    .collect(),
            );
        }
        records
    }

    /// Export the records as comma separated values
    pub fn export_csv(&self, session: &mut BindSession) -> String {
        let mut out = String::new();
        for record in self.export_records(session) {
            let line: Vec<String> = record.iter().map(|cell| csv_cell(cell)).collect();
            out.push_str(&line.join(","));
            out.push('\n');
        }
        out
    }

    /// Write the records as comma separated values
    pub fn write_csv<W: io::Write>(&self, mut writer: W, session: &mut BindSession) -> io::Result<()> {
        writer.write_all(self.export_csv(session).as_bytes())?;
        writer.flush()
    }

    /// Load columns, rows and pagination from a row source
    ///
    /// Columns are built through the registry. Invisible columns are kept for export and left
    /// out when rendering.
    pub async fn load(
        &mut self,
        source: &dyn RowSource,
        registry: &FieldRegistry,
    ) -> Result<(), LoadError> {
        let columns = source.columns().await?;
        for descriptor in columns.iter() {
            let field = registry.build(descriptor)?;
            self.add_child(field);
        }

        let rows = source.rows().await?;
        debug!(columns = columns.len(), rows = rows.len(), "loaded data set");
        self.repeater.set_value(
            &Value::Array(rows.into_iter().map(Value::Object).collect()),
            &mut BindSession::new(),
        );

        if let Some(pagination) = source.pagination().await? {
            self.pagination = Some(pagination);
            self.paginated = true;
        }
        Ok(())
    }

    fn render_sort_button(&mut self) -> String {
        if !self.multisort || !self.columns().any(FormField::is_sortable) {
            return String::new();
        }
        let id = self.repeater.element.ensure_id();
        format!(
            "\n<button style=\"margin-bottom: 0.5em\" class=\"event\" data-click-handler=\"sortDataSet\" data-click-args='{{\"which\": \"{id}\"}}' data-icons='{{\"primary\": \"ui-icon-carat-2-n-s\"}}'>Sorting Options</button>{SORT_DIALOG}"
        )
    }

    fn render_header(&self, field: &FormField) -> String {
        let title = escape(&column_title(field));
        if self.format_mode() != FormatMode::Html {
            return title;
        }
        match field.ordinal_position() {
            Some(position) if field.is_sortable() => format!(
                "<a href=\"{}\">{title}</a>",
                escape(&self.links.sort(position))
            ),
            _ => title,
        }
    }

    fn render_pages(&self) -> String {
        let Some(page) = self.pagination.as_ref() else {
            return String::new();
        };
        if page.total_pages < 2 {
            return String::new();
        }

        let link = |n: u64, text: &str| {
            format!(
                "<li><a href=\"{}\">{text}</a></li>",
                escape(&self.links.page(n))
            )
        };

        let mut out = String::from("\n<ul class=\"pagination\">");
        if page.current_page <= 1 {
            out.push_str("<li><span class=\"disabled\">&laquo; Previous</span></li>");
        } else {
            out.push_str(&link(page.current_page - 1, "&laquo; Previous"));
        }

        for entry in page.page_links(&self.window) {
            match entry {
                PageLink::Gap => out.push_str("<li><span class=\"separator\">&hellip;</span></li>"),
                PageLink::Page(n) if n == page.current_page => {
                    out.push_str(&format!("<li><span class=\"selected\">{n}</span></li>"))
                }
                PageLink::Page(n) => out.push_str(&link(n, &n.to_string())),
            }
        }

        if page.current_page >= page.total_pages {
            out.push_str("<li><span class=\"disabled\">Next &raquo;</span></li>");
        } else {
            out.push_str(&link(page.current_page + 1, "Next &raquo;"));
        }
        out.push_str("\n</ul>\n");
        out
    }

    /// Render the table with its caption, headers, footer and page links
    pub fn render(&mut self, session: &mut BindSession) -> String {
        let t = self.repeater.element.indentation();
        let mut out = self.render_sort_button();

        out.push_str(&format!(
            "{t}<table{}>",
            self.repeater.element.output_attributes(None)
        ));
        if let Some(caption) = self.caption.as_ref().filter(|c| !c.is_empty()) {
            out.push_str(&format!("{t}\t<caption>{}</caption>", escape(caption)));
        }

        let mut num_cols = 0;
        out.push_str(&format!("{t}\t<thead>{t}\t\t<tr>"));
        for field in self.columns() {
            num_cols += 1;
            if field.is_hidden() || !field.is_visible() {
                continue;
            }
            let tag = match field.ordinal_position() {
                Some(position) if position > 0 && field.is_sortable() => {
                    format!("<th data-column-position='{position}'>")
                }
                _ => "<th>".to_string(),
            };
            out.push_str(&format!("{t}\t\t\t{tag}{}</th>", self.render_header(field)));
        }
        out.push_str(&format!("{t}\t\t</tr>{t}\t</thead>"));

        out.push_str(&format!("{t}\t<tfoot>"));
        if let Some(summary) = self.record_summary() {
            out.push_str(&format!(
                "{t}\t\t<tr><td colspan='{num_cols}'>{summary}</td></tr>"
            ));
        }
        out.push_str(&format!("{t}\t</tfoot>"));

        out.push_str(&format!("{t}\t<tbody>"));
        out.push_str(&self.repeater.render(session));
        out.push_str(&format!("{t}\t</tbody>"));
        out.push_str(&format!("{t}</table>"));
        out.push_str(&self.render_pages());
        out
    }
}

fn column_title(field: &FormField) -> String {
    let label = field.label(false);
    if label.is_empty() {
        field.name().unwrap_or_default()
    } else {
        label
    }
}

fn csv_cell(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

impl Bindable for DataSet {
    fn render(&mut self, session: &mut BindSession) -> String {
        DataSet::render(self, session)
    }

    fn value(&self, mode: Option<FormatMode>) -> Value {
        self.repeater.value(mode)
    }

    fn set_value(&mut self, value: &Value, session: &mut BindSession) {
        self.repeater.set_value(value, session)
    }

    fn validate(&mut self, session: &mut BindSession) -> bool {
        self.repeater.validate(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn people() -> DataSet {
        let mut name = Container::hgroup();
        name.add_child(FormField::text("first").with_label("First"));
        name.add_child(FormField::text("last").with_label("Last"));

        let mut row = Container::vgroup();
        row.add_child(name);
        row.add_child(FormField::money("balance").with_label("Balance"));

        DataSet::new().with_child(row)
    }

    #[test]
    fn it_flattens_nested_containers() {
        let mut inner = Container::hgroup();
        inner.add_child(FormField::text("a"));
        inner.add_child(FormField::text("b"));
        let outer = Container::hgroup().with_child(inner);

        let dataset = DataSet::new().with_child(outer);
        let names: Vec<_> = dataset.columns().filter_map(FormField::name).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(dataset.repeater().proxy().children().len(), 2);
    }

    #[test]
    fn it_takes_columns_from_repeated_rows() {
        let mut item = Container::hgroup();
        item.add_child(FormField::text("sku"));
        item.add_child(FormField::number("qty"));

        let dataset = DataSet::new()
            .with_child(Repeater::new(item))
            .with_child(crate::container::HtmlElement::new("p", "note"));
        let names: Vec<_> = dataset.columns().filter_map(FormField::name).collect();
        assert_eq!(names, vec!["sku", "qty"]);
    }

    #[test]
    fn it_renders_rows_in_html_mode() {
        let mut session = BindSession::new();
        let mut dataset = people();
        dataset.set_value(
            &json!([
                {"first": "Ada", "last": "Lovelace", "balance": 10},
                {"first": "Alan", "last": "Turing", "balance": -2}
            ]),
            &mut session,
        );
        dataset.set_pagination(Some(Pagination {
            total_records: 2,
            total_pages: 1,
            current_page: 1,
            first_record: 1,
            last_record: 2,
        }));

        let html = dataset.render(&mut session);
        assert!(html.contains("class='table dataset'"));
        assert!(html.contains("<th>First</th>"));
        assert!(html.contains("<td>Ada</td>"));
        assert!(html.contains("<td class='right'><span class='money negative'>($2.00)</span></td>"));
        assert!(html.contains("<td colspan='3'>2 Records</td>"));
        assert!(!html.contains("pagination"));
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn it_renders_sortable_headers() {
        let mut session = BindSession::new();
        let mut first = FormField::text("first").with_label("First");
        first.set_sortable(true);
        first.set_ordinal_position(Some(2));

        let mut dataset = DataSet::new().with_child(first);
        dataset.enable_multisort(true);
        let html = dataset.render(&mut session);

        assert!(html.contains("<th data-column-position='2'><a href=\"?sort=2\">First</a></th>"));
        assert!(html.contains("data-click-handler=\"sortDataSet\""));
    }

    #[test]
    fn it_summarizes_paginated_records() {
        let mut dataset = people();
        dataset.set_pagination(Some(Pagination {
            total_records: 1234,
            total_pages: 50,
            current_page: 2,
            first_record: 26,
            last_record: 50,
        }));
        assert_eq!(dataset.record_summary().as_deref(), Some("1,234 Records"));

        dataset.set_paginated(true);
        assert_eq!(
            dataset.record_summary().as_deref(),
            Some("Records 26 - 50 of 1,234")
        );
    }

    #[test]
    fn it_recounts_dynamic_rows_in_form_mode() {
        let mut session = BindSession::new();
        let mut dataset = people();
        dataset.repeater = dataset.repeater.clone().allow_dynamic_additions(true);
        dataset.set_pagination(Some(Pagination {
            total_records: 10,
            ..Default::default()
        }));
        dataset.set_value(&json!([{"first": "Ada"}]), &mut session);
        assert_eq!(dataset.record_summary().as_deref(), Some("10 Records"));

        dataset.set_format_mode(FormatMode::Form);
        assert_eq!(dataset.record_summary().as_deref(), Some("1 Record"));
    }

    #[test]
    fn it_renders_page_links() {
        let mut session = BindSession::new();
        let mut dataset = people();
        dataset.set_pagination(Some(Pagination {
            total_records: 500,
            total_pages: 20,
            current_page: 1,
            first_record: 1,
            last_record: 25,
        }));
        let html = dataset.render(&mut session);
        assert!(html.contains("<li><span class=\"disabled\">&laquo; Previous</span></li>"));
        assert!(html.contains("<li><span class=\"selected\">1</span></li>"));
        assert!(html.contains("<li><a href=\"?page=2\">2</a></li>"));
        assert!(html.contains("<li><span class=\"separator\">&hellip;</span></li>"));
        assert!(html.contains("<li><a href=\"?page=2\">Next &raquo;</a></li>"));
    }

    #[test]
    fn it_exports_every_column_in_order() {
        let mut session = BindSession::new();
        let mut dataset = people().with_child(FormField::hidden("id"));
        dataset.enable_export("people.csv");
        dataset.set_value(
            &json!([{"first": "Ada", "last": "Lovelace, Countess", "balance": -2, "id": 1}]),
            &mut session,
        );

        assert_eq!(
            dataset.export_records(&mut session),
            vec![
                vec!["First", "Last", "Balance", "id"],
                vec!["Ada", "Lovelace, Countess", "-$2.00", "1"],
            ]
        );
        assert_eq!(
            dataset.export_csv(&mut session),
            "First,Last,Balance,id\nAda,\"Lovelace, Countess\",-$2.00,1\n"
        );
        let mut written = Vec::new();
        dataset.write_csv(&mut written, &mut session).unwrap();
        assert_eq!(written, dataset.export_csv(&mut session).into_bytes());
        assert_eq!(dataset.export_filename(), Some("people.csv"));
        // exporting leaves the data set in html mode
        assert_eq!(dataset.format_mode(), FormatMode::Html);
    }
}
