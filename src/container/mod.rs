//! Composite nodes of the form tree
//!
//! A [`Container`] exclusively owns its children by value, cloning a container is a deep copy
//! of its subtree. Values flow top-down through [`Bindable::set_value`], which narrows the
//! submitted payload by namespace and name path until every field receives its slice, and are
//! read back bottom-up through [`Bindable::value`].
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, trace};

mod dataset;
mod form;
mod html;
mod pagination;
mod repeater;

pub use dataset::*;
pub use form::*;
pub use html::*;
pub use pagination::*;
pub use repeater::*;

use crate::element::Element;
use crate::errors::ConfigurationError;
use crate::field::{full_label, FieldKind, FormField};
use crate::format::FormatMode;
use crate::layout::{Grid, Horizontal, LayoutManager, Table, TabSet, Vertical};
use crate::path::Dimensions;
use crate::session::BindSession;
use crate::validator::Matches;
use crate::value::{escape, insert_at, loose_eq, merge, to_map};

/// The capability shared by every node of the tree
pub trait Bindable {
    /// Render the node markup for its current format mode
    fn render(&mut self, session: &mut BindSession) -> String;

    /// Read the value of the node, formatted when a mode is given
    fn value(&self, mode: Option<FormatMode>) -> Value;

    /// Push a value down to the node
    fn set_value(&mut self, value: &Value, session: &mut BindSession);

    /// Validate the node, returning `false` if any field in it is invalid
    fn validate(&mut self, session: &mut BindSession) -> bool;
}

/// A node of the form tree
#[derive(Clone, Debug)]
pub enum Node {
    Field(FormField),
    Container(Container),
    Repeater(Repeater),
    DataSet(DataSet),
    Html(HtmlElement),
}

impl From<FormField> for Node {
    fn from(field: FormField) -> Self {
        Node::Field(field)
    }
}

impl From<Container> for Node {
    fn from(container: Container) -> Self {
        Node::Container(container)
    }
}

impl From<Repeater> for Node {
    fn from(repeater: Repeater) -> Self {
        Node::Repeater(repeater)
    }
}

impl From<DataSet> for Node {
    fn from(dataset: DataSet) -> Self {
        Node::DataSet(dataset)
    }
}

impl From<HtmlElement> for Node {
    fn from(html: HtmlElement) -> Self {
        Node::Html(html)
    }
}

impl Node {
    pub fn element(&self) -> &Element {
        match self {
            Node::Field(field) => &field.element,
            Node::Container(container) => &container.element,
            Node::Repeater(repeater) => &repeater.element,
            Node::DataSet(dataset) => &dataset.repeater.element,
            Node::Html(html) => &html.element,
        }
    }

    pub fn element_mut(&mut self) -> &mut Element {
        match self {
            Node::Field(field) => &mut field.element,
            Node::Container(container) => &mut container.element,
            Node::Repeater(repeater) => &mut repeater.element,
            Node::DataSet(dataset) => &mut dataset.repeater.element,
            Node::Html(html) => &mut html.element,
        }
    }

    pub fn as_field(&self) -> Option<&FormField> {
        match self {
            Node::Field(field) => Some(field),
            _ => None,
        }
    }

    pub fn as_field_mut(&mut self) -> Option<&mut FormField> {
        match self {
            Node::Field(field) => Some(field),
            _ => None,
        }
    }

    pub fn as_container(&self) -> Option<&Container> {
        match self {
            Node::Container(container) => Some(container),
            _ => None,
        }
    }

    /// The namespace the node reads its value from, if any
    pub fn namespace(&self) -> Option<&str> {
        match self {
            Node::Container(container) => container.namespace(),
            Node::Repeater(repeater) => repeater.namespace(),
            Node::DataSet(dataset) => dataset.repeater.namespace(),
            Node::Field(_) | Node::Html(_) => None,
        }
    }

    /// The direct children of the node
    ///
    /// The children of a repeater are those of its prototype row.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Container(container) => &container.children,
            Node::Repeater(repeater) => &repeater.proxy().children,
            Node::DataSet(dataset) => &dataset.repeater.proxy().children,
            Node::Field(_) | Node::Html(_) => &[],
        }
    }

    fn children_mut(&mut self) -> &mut [Node] {
        match self {
            Node::Container(container) => &mut container.children,
            Node::Repeater(repeater) => &mut repeater.proxy_mut().children,
            Node::DataSet(dataset) => &mut dataset.repeater.proxy_mut().children,
            Node::Field(_) | Node::Html(_) => &mut [],
        }
    }

    pub fn label(&self, full: bool) -> String {
        match self {
            Node::Field(field) => field.label(full),
            Node::Container(container) => container.label(full),
            Node::Repeater(repeater) => repeater.label(full),
            Node::DataSet(dataset) => dataset.repeater.label(full),
            Node::Html(_) => String::new(),
        }
    }

    pub(crate) fn cascade(&mut self, session: &mut BindSession) {
        match self {
            Node::Field(field) => field.cascade(session),
            Node::Container(container) => container.cascade(session),
            Node::Repeater(repeater) => repeater.cascade(session),
            Node::DataSet(dataset) => dataset.repeater.cascade(session),
            Node::Html(_) => {}
        }
    }

    fn assign_container_value(&mut self, value: Map<String, Value>) {
        match self {
            Node::Field(field) => field.container_value = value,
            Node::Container(container) => container.container_value = value,
            Node::Repeater(repeater) => repeater.container_value = value,
            Node::DataSet(dataset) => dataset.repeater.container_value = value,
            Node::Html(_) => {}
        }
    }

    fn set_required(&mut self, required: bool, cascade: bool) {
        match self {
            Node::Field(field) => field.set_required(required),
            Node::Container(container) => container.set_required(required, cascade),
            Node::Repeater(repeater) => repeater.proxy_mut().set_required(required, cascade),
            Node::DataSet(dataset) => dataset.repeater.proxy_mut().set_required(required, cascade),
            Node::Html(_) => {}
        }
    }

    fn show_tooltips(&mut self, show: bool) {
        match self {
            Node::Field(field) => field.show_tooltip(show),
            Node::Container(container) => container.show_tooltips(show),
            Node::Repeater(repeater) => repeater.proxy_mut().show_tooltips(show),
            Node::DataSet(dataset) => dataset.repeater.proxy_mut().show_tooltips(show),
            Node::Html(_) => {}
        }
    }

    fn validation_messages(&self) -> ValidationMessages {
        match self {
            Node::Field(field) => {
                let mut messages = ValidationMessages::new();
                messages.insert_field(field);
                messages
            }
            Node::Container(container) => container.validation_messages(),
            Node::Repeater(repeater) => repeater.validation_messages().clone(),
            Node::DataSet(dataset) => dataset.repeater.validation_messages().clone(),
            Node::Html(_) => ValidationMessages::new(),
        }
    }

    /// Visit the element of the node and of every node below it
    pub(crate) fn visit_elements_mut(&mut self, f: &mut dyn FnMut(&mut Element)) {
        f(self.element_mut());
        if let Node::Field(FormField {
            kind: FieldKind::YesNo(radios),
            ..
        }) = self
        {
            radios.visit_elements_mut(f);
        }
        for child in self.children_mut() {
            child.visit_elements_mut(f);
        }
    }
}

impl Bindable for Node {
    fn render(&mut self, session: &mut BindSession) -> String {
        match self {
            Node::Field(field) => field.render(session),
            Node::Container(container) => container.render(session),
            Node::Repeater(repeater) => repeater.render(session),
            Node::DataSet(dataset) => dataset.render(session),
            Node::Html(html) => html.render(session),
        }
    }

    fn value(&self, mode: Option<FormatMode>) -> Value {
        match self {
            Node::Field(field) => field.value(mode),
            Node::Container(container) => container.value(mode),
            Node::Repeater(repeater) => repeater.value(mode),
            Node::DataSet(dataset) => dataset.value(mode),
            Node::Html(html) => html.value(mode),
        }
    }

    fn set_value(&mut self, value: &Value, session: &mut BindSession) {
        match self {
            Node::Field(field) => field.bind(value, session),
            Node::Container(container) => container.set_value(value, session),
            Node::Repeater(repeater) => repeater.set_value(value, session),
            Node::DataSet(dataset) => dataset.set_value(value, session),
            Node::Html(html) => html.set_value(value, session),
        }
    }

    fn validate(&mut self, session: &mut BindSession) -> bool {
        match self {
            Node::Field(field) => field.validate(),
            Node::Container(container) => container.validate(session),
            Node::Repeater(repeater) => repeater.validate(session),
            Node::DataSet(dataset) => dataset.validate(session),
            Node::Html(html) => html.validate(session),
        }
    }
}

/// Markup surrounding the layout of a container
#[derive(Clone, Debug, Default)]
enum Frame {
    #[default]
    Plain,
    Fieldset(Fieldset),
    Table,
    Tabs,
}

#[derive(Clone, Debug, Default)]
struct Fieldset {
    legend: Option<String>,
    add_link: Option<String>,
    edit_link: Option<String>,
    remove_link: Option<String>,
}

impl Fieldset {
    fn has_links(&self) -> bool {
        self.add_link.is_some() || self.edit_link.is_some() || self.remove_link.is_some()
    }
}

/// A composite node owning an ordered list of children
///
/// The container remembers the last value bound to it (the container value) and hands it to
/// its children on the next cascade, fields use it to resolve `{macro}` placeholders and to
/// compare against sibling values.
#[derive(Clone, Debug)]
pub struct Container {
    pub(crate) element: Element,
    children: Vec<Node>,
    namespace: Option<String>,
    layout: Arc<dyn LayoutManager>,
    frame: Frame,
    label: Option<String>,
    required: bool,
    pub(crate) container_value: Map<String, Value>,
    dirty: bool,
}

impl Default for Container {
    fn default() -> Self {
        Container::hgroup()
    }
}

impl Container {
    fn with_frame(layout: impl LayoutManager + 'static, frame: Frame) -> Self {
        Container {
            element: Element::new(),
            children: Vec::new(),
            namespace: None,
            layout: Arc::new(layout),
            frame,
            label: None,
            required: false,
            container_value: Map::new(),
            dirty: false,
        }
    }

    /// A container laying its children out in a row
    pub fn hgroup() -> Self {
        Self::with_frame(Horizontal::default(), Frame::Plain)
    }

    /// A container laying its children out in a column
    pub fn vgroup() -> Self {
        Self::with_frame(Vertical::default(), Frame::Plain)
    }

    /// A `<fieldset>` with an optional legend
    pub fn fieldset(legend: Option<&str>) -> Self {
        Self::with_frame(
            Horizontal::default(),
            Frame::Fieldset(Fieldset {
                legend: legend.map(String::from),
                ..Default::default()
            }),
        )
    }

    /// A table with `cols` cells per row, one child per cell
    pub fn grid(cols: usize) -> Self {
        let mut container = Self::with_frame(Grid::new(cols), Frame::Table);
        container.element.add_class("pad");
        container
    }

    /// A table with `cols` label/control pairs per row
    pub fn table(cols: usize) -> Self {
        let mut container = Self::with_frame(Table::new(cols), Frame::Table);
        container.element.add_class("pad");
        container
    }

    /// A set of tabs, one panel per child
    pub fn tabset() -> Self {
        let mut container = Self::with_frame(TabSet::default(), Frame::Tabs);
        container.element.add_class("tabs");
        container
    }

    pub fn with_layout(mut self, layout: impl LayoutManager + 'static) -> Self {
        self.set_layout(Arc::new(layout));
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.set_namespace(Some(namespace.into()));
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.set_label(label);
        self
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.add_child(child);
        self
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn element_mut(&mut self) -> &mut Element {
        &mut self.element
    }

    pub fn add_child(&mut self, child: impl Into<Node>) -> &mut Self {
        self.children.push(child.into());
        // the new child has not seen the container value yet
        self.dirty = true;
        self
    }

    pub fn add_children<I, N>(&mut self, children: I) -> &mut Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        for child in children {
            self.add_child(child);
        }
        self
    }

    /// Remove the child at `index`, returning it
    pub fn remove_child(&mut self, index: usize) -> Option<Node> {
        if index < self.children.len() {
            Some(self.children.remove(index))
        } else {
            None
        }
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [Node] {
        &mut self.children
    }

    pub(crate) fn into_children(self) -> Vec<Node> {
        self.children
    }

    /// Iterate over the fields that are direct children of the container
    pub fn fields(&self) -> impl Iterator<Item = &FormField> {
        self.children.iter().filter_map(Node::as_field)
    }

    pub fn fields_mut(&mut self) -> impl Iterator<Item = &mut FormField> {
        self.children.iter_mut().filter_map(Node::as_field_mut)
    }

    /// Return every node of the subtree, each node before its descendants
    pub fn recursive_children(&self) -> Vec<&Node> {
        fn walk<'a>(nodes: &'a [Node], out: &mut Vec<&'a Node>) {
            for node in nodes {
                out.push(node);
                walk(node.children(), out);
            }
        }

        let mut out = Vec::new();
        walk(&self.children, &mut out);
        out
    }

    /// Find a field of the subtree by its local name
    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.recursive_children()
            .into_iter()
            .filter_map(Node::as_field)
            .find(|field| field.name().as_deref() == Some(name))
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut FormField> {
        fn walk<'a>(nodes: &'a mut [Node], name: &str) -> Option<&'a mut FormField> {
            for node in nodes.iter_mut() {
                match node {
                    Node::Field(field) => {
                        if field.name().as_deref() == Some(name) {
                            return Some(field);
                        }
                    }
                    Node::Html(_) => {}
                    other => {
                        if let Some(found) = walk(other.children_mut(), name) {
                            return Some(found);
                        }
                    }
                }
            }
            None
        }

        walk(&mut self.children, name)
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn set_namespace(&mut self, namespace: Option<String>) {
        self.namespace = namespace.filter(|ns| !ns.is_empty());
    }

    pub(crate) fn take_namespace(&mut self) -> Option<String> {
        self.namespace.take()
    }

    pub fn layout(&self) -> &Arc<dyn LayoutManager> {
        &self.layout
    }

    pub fn set_layout(&mut self, layout: Arc<dyn LayoutManager>) {
        self.layout = layout;
    }

    pub fn format_mode(&self) -> FormatMode {
        self.element.format_mode
    }

    /// Set the format mode, children receive it on the next cascade
    pub fn set_format_mode(&mut self, mode: FormatMode) {
        self.element.format_mode = mode;
    }

    /// Set the container value handed to children on the next cascade
    pub fn set_container_value(&mut self, value: Map<String, Value>) {
        self.container_value = value;
        self.dirty = true;
    }

    pub fn container_value(&self) -> &Map<String, Value> {
        &self.container_value
    }

    /// Mark the direct child fields as required, and every field of the subtree with `cascade`
    pub fn set_required(&mut self, required: bool, cascade: bool) {
        self.required = required;
        for child in self.children.iter_mut() {
            match child {
                Node::Field(field) => field.set_required(required),
                other if cascade => other.set_required(required, true),
                _ => {}
            }
        }
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Show or hide the tooltips of every field in the subtree
    pub fn show_tooltips(&mut self, show: bool) {
        for child in self.children.iter_mut() {
            child.show_tooltips(show);
        }
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = Some(label.into());
    }

    pub fn label(&self, full: bool) -> String {
        full_label(self.label.as_deref(), self.required, full)
    }

    pub fn set_legend(&mut self, legend: Option<String>) {
        if let Frame::Fieldset(fieldset) = &mut self.frame {
            fieldset.legend = legend;
        }
    }

    pub fn set_add_link(&mut self, link: Option<String>) {
        if let Frame::Fieldset(fieldset) = &mut self.frame {
            fieldset.add_link = link;
        }
    }

    pub fn set_edit_link(&mut self, link: Option<String>) {
        if let Frame::Fieldset(fieldset) = &mut self.frame {
            fieldset.edit_link = link;
        }
    }

    pub fn set_remove_link(&mut self, link: Option<String>) {
        if let Frame::Fieldset(fieldset) = &mut self.frame {
            fieldset.remove_link = link;
        }
    }

    /// Require the value of `field` to equal the value of the sibling `other`
    ///
    /// # Errors
    ///
    /// Fails if either field is not part of the subtree.
    pub fn add_matching_validator(
        &mut self,
        field: &str,
        other: &str,
    ) -> Result<&mut Self, ConfigurationError> {
        if self.field(other).is_none() {
            return Err(ConfigurationError::MissingField(other.to_string()));
        }
        let target = self
            .field_mut(field)
            .ok_or_else(|| ConfigurationError::MissingField(field.to_string()))?;
        target.add_validator(Arc::new(Matches::new(other)));
        Ok(self)
    }

    /// Push the name prefix, indentation, format mode and form of the container down to its
    /// children
    ///
    /// The container value is only handed down when it changed since the last cascade.
    pub fn cascade(&mut self, session: &mut BindSession) {
        let mut prefix = self.element.name_prefix.clone();
        if let Some(ns) = self.namespace.as_ref() {
            prefix.push(ns.clone());
        }
        let indent = self.element.indent + self.element.child_indent;

        for child in self.children.iter_mut() {
            let element = child.element_mut();
            element.name_prefix = prefix.clone();
            element.indent = indent;
            element.format_mode = self.element.format_mode;
            element.form = self.element.form.clone();
            if self.dirty {
                child.assign_container_value(self.container_value.clone());
            }
            child.cascade(session);
        }
        self.dirty = false;
    }

    /// Bind a value to the container
    ///
    /// The value is narrowed by the namespace, if any, and each field receives the slice found
    /// at its name path, or `null` when no such slice exists. Child containers receive the
    /// narrowed value and narrow it further themselves. Narrowing at every level resolves the
    /// same slices as resolving full names against the original payload.
    pub fn set_value(&mut self, value: &Value, session: &mut BindSession) {
        let mut map = to_map(value);
        if let Some(ns) = self.namespace.as_ref() {
            map = map.get(ns).map(to_map).unwrap_or_default();
        }

        if tracing::enabled!(tracing::Level::TRACE) {
            let changes = json_patch::diff(
                &Value::Object(self.container_value.clone()),
                &Value::Object(map.clone()),
            );
            for change in &changes.0 {
                trace!("- {}", change);
            }
        }
        debug!(namespace = ?self.namespace, keys = map.len(), "binding container value");

        self.set_container_value(map);
        self.cascade(session);

        let value = Value::Object(self.container_value.clone());
        for child in self.children.iter_mut() {
            match child {
                Node::Field(field) => {
                    if field.is_button() {
                        continue;
                    }
                    let Some(name) = field.name() else {
                        continue;
                    };
                    let resolved = Dimensions::parse(&name).resolve(&value);

                    // checkbox groups are checked by membership
                    if let (FieldKind::Checkbox(_), Value::Array(list)) = (&field.kind, &resolved) {
                        let checked = field
                            .checked_value()
                            .map(|checked| list.iter().any(|v| loose_eq(v, checked)))
                            .unwrap_or(false);
                        field.set_checked(checked);
                        continue;
                    }
                    field.bind(&resolved, session);
                }
                Node::Html(_) => {}
                other => other.set_value(&value, session),
            }
        }
    }

    /// Read the value of the subtree
    ///
    /// Fields contribute `name -> value` at their name path, namespaced children are merged
    /// under their namespace and the others are merged flat.
    pub fn value(&self, mode: Option<FormatMode>) -> Value {
        let mut data = Map::new();
        for child in self.children.iter() {
            match child {
                Node::Field(field) => {
                    if field.is_button() {
                        continue;
                    }
                    if let Some(name) = field.name() {
                        insert_at(&mut data, &Dimensions::parse(&name), field.value(mode));
                    }
                }
                Node::Html(_) => {}
                other => {
                    let value = other.value(mode);
                    match other.namespace() {
                        Some(ns) => {
                            let mergeable = data
                                .get(ns)
                                .is_some_and(|slot| slot.is_object() || slot.is_array());
                            match data.get_mut(ns) {
                                Some(slot) if mergeable => merge(slot, value),
                                _ => {
                                    data.insert(ns.to_string(), value);
                                }
                            }
                        }
                        None => {
                            let mut merged = Value::Object(std::mem::take(&mut data));
                            merge(&mut merged, value);
                            data = to_map(&merged);
                        }
                    }
                }
            }
        }
        Value::Object(data)
    }

    /// Validate every child, without stopping at the first failure
    pub fn validate(&mut self, session: &mut BindSession) -> bool {
        self.cascade(session);
        let mut ok = true;
        for child in self.children.iter_mut() {
            ok = child.validate(session) && ok;
        }
        ok
    }

    /// Collect the validation messages of the subtree
    pub fn validation_messages(&self) -> ValidationMessages {
        let mut messages = ValidationMessages::new();
        for child in self.children.iter() {
            messages.extend(child.validation_messages());
        }
        messages
    }

    /// Render the container through its layout
    pub fn render(&mut self, session: &mut BindSession) -> String {
        self.cascade(session);
        let layout = self.layout.clone();
        let frame = self.frame.clone();
        let t = self.element.indentation();

        match frame {
            Frame::Plain => layout.render(self, session),
            Frame::Table => {
                let mut out = format!(
                    "{t}<table{} cellpadding=\"0\" cellspacing=\"0\">",
                    self.element.output_attributes(None)
                );
                out.push_str(&layout.render(self, session));
                out.push_str(&format!("{t}</table>"));
                out
            }
            Frame::Tabs => {
                let mut out = format!("{t}<div{}>", self.element.output_attributes(None));
                out.push_str(&layout.render(self, session));
                out.push_str(&format!("{t}</div>"));
                out
            }
            Frame::Fieldset(fieldset) => self.render_fieldset(&fieldset, layout, session),
        }
    }

    fn render_fieldset(
        &mut self,
        fieldset: &Fieldset,
        layout: Arc<dyn LayoutManager>,
        session: &mut BindSession,
    ) -> String {
        let t = self.element.indentation();
        let mut out = String::new();

        if let Some(legend) = fieldset.legend.as_ref() {
            let hash = legend.to_lowercase().replace(' ', "-");
            out.push_str(&format!("{t}<a name='{}'></a>", escape(&hash)));
        }
        let wrapped = fieldset.has_links();
        if wrapped {
            out.push_str(&format!("{t}<div class='relative'>"));
        }
        out.push_str(&format!(
            "{t}<fieldset{}>",
            self.element.output_attributes(None)
        ));
        if let Some(legend) = fieldset.legend.as_ref() {
            out.push_str(&format!("{t}\t<legend>{}</legend>", escape(legend)));
        }
        if wrapped {
            out.push_str(&format!("{t}\t<span class='fieldset-links'>"));
            let links = [
                (&fieldset.add_link, "add", "Add"),
                (&fieldset.edit_link, "edit", "Edit"),
                (&fieldset.remove_link, "remove", "Remove"),
            ];
            for (link, class, title) in links {
                if let Some(href) = link {
                    out.push_str(&format!(
                        "<a class='icon {class}' title='{title}' href='{}'>{title}</a>",
                        escape(href)
                    ));
                }
            }
            out.push_str("</span>");
        }
        out.push_str(&layout.render(self, session));
        out.push_str(&format!("{t}</fieldset>"));
        if wrapped {
            out.push_str(&format!("{t}</div>"));
        }
        out
    }

    /// Visit the element of the container and of every node below it
    pub(crate) fn visit_elements_mut(&mut self, f: &mut dyn FnMut(&mut Element)) {
        f(&mut self.element);
        for child in self.children.iter_mut() {
            child.visit_elements_mut(f);
        }
    }
}

impl Bindable for Container {
    fn render(&mut self, session: &mut BindSession) -> String {
        Container::render(self, session)
    }

    fn value(&self, mode: Option<FormatMode>) -> Value {
        Container::value(self, mode)
    }

    fn set_value(&mut self, value: &Value, session: &mut BindSession) {
        Container::set_value(self, value, session)
    }

    fn validate(&mut self, session: &mut BindSession) -> bool {
        Container::validate(self, session)
    }
}

/// Validation messages of a subtree, keyed by field
///
/// Fields are identified by their full name, or by their element id when they have no name.
/// Keys keep the order in which fields were visited.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationMessages(Vec<(String, Vec<String>)>);

impl ValidationMessages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append messages for a key
    pub fn insert(&mut self, key: impl Into<String>, messages: Vec<String>) {
        if messages.is_empty() {
            return;
        }
        let key = key.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => existing.extend(messages),
            None => self.0.push((key, messages)),
        }
    }

    /// Add the messages of a field, prefixed by its label
    pub(crate) fn insert_field(&mut self, field: &FormField) {
        let label = field.label(false);
        let prefix = if label.is_empty() {
            String::new()
        } else {
            format!("<b>{label}:</b> ")
        };
        let messages = field
            .validation_messages()
            .iter()
            .map(|msg| format!("{prefix}{msg}"))
            .collect();
        let key = field.full_name().unwrap_or_else(|| field.id());
        self.insert(key, messages);
    }

    pub fn extend(&mut self, other: ValidationMessages) {
        for (key, messages) in other.0 {
            self.insert(key, messages);
        }
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, messages)| messages.as_slice())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear()
    }

    pub fn to_value(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), Value::from(v.clone())))
                .collect(),
        )
    }
}

impl Serialize for ValidationMessages {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, messages) in self.0.iter() {
            map.serialize_entry(key, messages)?;
        }
        map.end()
    }
}
