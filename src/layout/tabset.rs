use super::LayoutManager;
use crate::container::{Bindable, Container};
use crate::element::generate_element_id;
use crate::session::BindSession;
use crate::value::escape;

/// A panel per child, preceded by a list of links to the panels
///
/// The label of each child names its tab. A panel is identified after its child when the child
/// has an id, so repeated renders link to the same anchors.
#[derive(Clone, Copy, Debug, Default)]
pub struct TabSet {
    pub full_labels: bool,
}

impl TabSet {
    pub fn with_full_labels(mut self, full: bool) -> Self {
        self.full_labels = full;
        self
    }
}

impl LayoutManager for TabSet {
    fn render(&self, container: &mut Container, session: &mut BindSession) -> String {
        let t = format!("{}\t", container.element.indentation());
        let mut tabs = Vec::new();
        let mut panels = String::new();

        for child in container.children_mut() {
            child.element_mut().indent += 1;
            let id = match child.element().id() {
                Some(id) => format!("{id}-panel"),
                None => generate_element_id(),
            };
            let label = child.label(self.full_labels);
            panels.push_str(&format!("{t}<div id='{id}'>"));
            panels.push_str(&child.render(session));
            panels.push_str(&format!("{t}</div>"));
            tabs.push((id, label));
        }

        let mut out = format!("{t}<ul>");
        for (id, label) in tabs {
            out.push_str(&format!("{t}\t<li><a href='#{id}'>{}</a></li>", escape(&label)));
        }
        out.push_str(&format!("{t}</ul>"));
        out.push_str(&panels);
        out
    }
}
