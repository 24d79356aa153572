use super::LayoutManager;
use crate::container::{Bindable, Container, Node};
use crate::session::BindSession;

/// Width of a grid cell as a percentage, rounded to two decimals
fn cell_width(cols: usize) -> String {
    let width = (10000.0 / cols as f64).round() / 100.0;
    format!("{width}")
}

/// One child per cell, `cols` cells per row
///
/// Cells of the first row carry their width, the last row is padded with empty cells.
#[derive(Clone, Copy, Debug)]
pub struct Grid {
    cols: usize,
    pub full_labels: bool,
}

impl Grid {
    pub fn new(cols: usize) -> Self {
        Grid {
            cols: cols.max(1),
            full_labels: true,
        }
    }

    pub fn with_full_labels(mut self, full: bool) -> Self {
        self.full_labels = full;
        self
    }

    pub fn cols(&self) -> usize {
        self.cols
    }
}

impl LayoutManager for Grid {
    fn render(&self, container: &mut Container, session: &mut BindSession) -> String {
        let width = cell_width(self.cols);
        let mut t = container.element.indentation();
        let mut out = String::new();
        let mut count = 0;
        let mut first_row = true;

        for child in container.children_mut() {
            t = child.element().indentation();
            if count == 0 {
                out.push_str(&format!("{t}<tr>"));
            }
            if first_row {
                out.push_str(&format!("{t}\t<td width='{width}%'>"));
            } else {
                out.push_str(&format!("{t}\t<td>"));
            }

            child.element_mut().indent += 2;
            out.push_str(&child.render(session));
            match child {
                Node::Field(field) => {
                    out.push_str(&field.render_tooltip());
                    out.push_str("</td>");
                }
                _ => out.push_str(&format!("{t}\t</td>")),
            }

            count += 1;
            if count == self.cols {
                out.push_str(&format!("{t}</tr>"));
                count = 0;
                first_row = false;
            }
        }

        if count > 0 {
            for _ in count..self.cols {
                out.push_str(&format!("{t}\t<td></td>"));
            }
            out.push_str(&format!("{t}</tr>"));
        }
        out
    }
}

/// A label cell and a control cell per child, `cols` pairs per row
#[derive(Clone, Copy, Debug)]
pub struct Table {
    cols: usize,
    pub full_labels: bool,
}

impl Table {
    pub fn new(cols: usize) -> Self {
        Table {
            cols: cols.max(1),
            full_labels: true,
        }
    }

    pub fn with_full_labels(mut self, full: bool) -> Self {
        self.full_labels = full;
        self
    }

    pub fn cols(&self) -> usize {
        self.cols
    }
}

impl LayoutManager for Table {
    fn render(&self, container: &mut Container, session: &mut BindSession) -> String {
        let mut t = container.element.indentation();
        let mut out = String::new();
        let mut count = 0;

        for child in container.children_mut() {
            if let Node::Field(field) = &mut *child {
                if field.is_hidden() {
                    out.push_str(&field.element.indentation());
                    out.push_str(&field.render(session));
                    continue;
                }
            }

            t = child.element().indentation();
            if count == 0 {
                out.push_str(&format!("{t}<tr>"));
            }

            let label = match &*child {
                Node::Field(field) => {
                    format!("<label for=\"{}\">{}</label>", field.id(), field.label(self.full_labels))
                }
                Node::Html(_) => String::new(),
                other => format!("<label>{}</label>", other.label(self.full_labels)),
            };
            out.push_str(&format!("{t}\t<td class='label'>{label}</td>"));

            child.element_mut().indent += 2;
            out.push_str(&format!("{t}\t<td>"));
            out.push_str(&child.render(session));
            match child {
                Node::Field(field) => {
                    out.push_str(&field.render_tooltip());
                    out.push_str("</td>");
                }
                _ => out.push_str(&format!("{t}\t</td>")),
            }

            count += 1;
            if count == self.cols {
                out.push_str(&format!("{t}</tr>"));
                count = 0;
            }
        }

        if count > 0 {
            for _ in 0..(self.cols - count) * 2 {
                out.push_str(&format!("{t}\t<td></td>"));
            }
            out.push_str(&format!("{t}</tr>"));
        }
        out
    }
}

/// A table row per record, one cell per visible child
///
/// Cells of right aligned formats (numbers, money, percentages and dates) get the `right` class.
#[derive(Clone, Copy, Debug)]
pub struct Recordset {
    pub full_labels: bool,
}

impl Default for Recordset {
    fn default() -> Self {
        Recordset { full_labels: true }
    }
}

impl Recordset {
    pub fn with_full_labels(mut self, full: bool) -> Self {
        self.full_labels = full;
        self
    }
}

impl LayoutManager for Recordset {
    fn render(&self, container: &mut Container, session: &mut BindSession) -> String {
        let t = container.element.indentation();
        let mut out = format!("{t}<tr{}>", container.element.output_attributes(None));

        for child in container.children_mut() {
            child.element_mut().indent += 2;
            match child {
                Node::Field(field) if field.is_hidden() => out.push_str(&field.render(session)),
                Node::Field(field) if !field.is_visible() => {}
                Node::Field(field) => {
                    let class = if field.format_kind().is_right_aligned() {
                        " class='right'"
                    } else {
                        ""
                    };
                    out.push_str(&format!("{t}\t<td{class}>{}</td>", field.render(session)));
                }
                other => out.push_str(&format!("{t}\t<td>{}</td>", other.render(session))),
            }
        }

        out.push_str(&format!("{t}</tr>"));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FormField;
    use crate::format::FormatMode;
    use dedent::dedent;
    use pretty_assertions::{assert_eq, assert_str_eq};
    use serde_json::json;

    #[test]
    fn it_pads_the_last_grid_row() {
        let mut session = BindSession::new();
        let mut grid = Container::grid(3);
        grid.set_format_mode(FormatMode::Html);
        for name in ["a", "b", "c", "d"] {
            grid.add_child(FormField::text(name));
        }
        grid.set_value(&json!({"a": 1, "b": 2, "c": 3, "d": 4}), &mut session);

        let html = grid.render(&mut session);
        assert_eq!(html.matches("<tr>").count(), 2);
        assert_eq!(html.matches("<td width='33.33%'>").count(), 3);
        assert_eq!(html.matches("<td></td>").count(), 2);
        assert!(html.contains("\t<td>4</td>"));
    }

    #[test]
    fn it_renders_label_and_control_cells() {
        let mut session = BindSession::new();
        let name = FormField::text("name").with_label("Name").with_required(true);
        let id = name.id();
        let mut table = Container::table(2).with_child(name);
        table.add_child(FormField::hidden("id"));

        let html = table.render(&mut session);
        assert!(html.starts_with("\n<table class='pad' cellpadding=\"0\" cellspacing=\"0\">"));
        assert!(html.contains(&format!(
            "<td class='label'><label for=\"{id}\">Name:*</label></td>"
        )));
        assert!(html.contains("<input name='id' type='hidden'"));
        // one pair missing on the only row
        assert_eq!(html.matches("<td></td>").count(), 2);
    }

    #[test]
    fn it_aligns_numeric_cells_of_records() {
        let mut session = BindSession::new();
        let mut row = Container::hgroup().with_layout(Recordset::default());
        row.set_format_mode(FormatMode::Html);
        row.add_child(FormField::text("name"));
        row.add_child(FormField::money("total"));
        row.set_value(&json!({"name": "Ada", "total": 12}), &mut session);

        assert_str_eq!(
            row.render(&mut session).replace('\t', "    ").trim(),
            dedent!(
                r#"
                <tr>
                    <td>Ada</td>
                    <td class='right'><span class='money positive'>$12.00</span></td>
                </tr>
                "#
            )
            .trim()
        );
    }
}
