use chrono::{NaiveDate, NaiveDateTime};
use std::fmt::Write;

use crate::error::{Result, TplError};
use crate::tpl::ast::Element;
use crate::value::Value;

/// Type-dispatching print routine used by the renderer for every element reference.
pub trait ElementPrinter {
    /// Appends the rendering of `element` (or its `sub` tag) holding `value` to `out`.
    fn print_element(
        &self,
        out: &mut String,
        element: &Element,
        sub: Option<&str>,
        value: &Value,
    ) -> Result<()>;
}

/// Default printer for HTML output.
///
/// Handles these element attributes for every element type:
/// `noprint`, `noescape`, `default "text"`, `date "%d.%m.%Y"`, `lb "Label"`,
/// and the sub-tags `{ID.lb}` (label) and `{ID.html}` (folded `html_*` attributes).
#[derive(Debug, Clone)]
pub struct HtmlPrinter {
    escape: bool,
}

impl HtmlPrinter {
    pub fn new(escape: bool) -> Self {
        Self { escape }
    }

    fn format_value(&self, element: &Element, value: &Value) -> String {
        let text = match element.attr("date") {
            Some(fmt) => format_date(value, fmt).unwrap_or_else(|| value.to_string()),
            None => value.to_string(),
        };
        match element.attr("default") {
            Some(default) if text.is_empty() => default.to_string(),
            _ => text,
        }
    }

    fn push(&self, out: &mut String, element: &Element, text: &str) {
        if self.escape && !element.has("noescape") {
            escape_html(out, text);
        } else {
            out.push_str(text);
        }
    }
}

impl Default for HtmlPrinter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ElementPrinter for HtmlPrinter {
    fn print_element(
        &self,
        out: &mut String,
        element: &Element,
        sub: Option<&str>,
        value: &Value,
    ) -> Result<()> {
        if element.has("noprint") {
            return Ok(());
        }

        match sub {
            None => {
                let text = self.format_value(element, value);
                self.push(out, element, &text);
            }
            Some("lb") => {
                let label = element.attr("lb").unwrap_or(&element.id);
                self.push(out, element, label);
            }
            Some("html") => {
                for (name, v) in &element.html.attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    escape_html(out, v);
                    out.push('"');
                }
                for name in &element.html.flags {
                    out.push(' ');
                    out.push_str(name);
                }
            }
            Some(other) => {
                return Err(TplError::UnknownSubTag {
                    id: element.id.clone(),
                    sub: other.to_string(),
                });
            }
        }
        Ok(())
    }
}

fn format_date(value: &Value, fmt: &str) -> Option<String> {
    let mut out = String::new();
    let written = match value {
        Value::Date(d) => write!(out, "{}", d.format(fmt)),
        Value::DateTime(dt) => write!(out, "{}", dt.format(fmt)),
        // dates serialized through serde arrive as strings
        Value::Str(s) => {
            if let Some(dt) = parse_datetime(s) {
                write!(out, "{}", dt.format(fmt))
            } else if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                write!(out, "{}", d.format(fmt))
            } else {
                return None;
            }
        }
        _ => return None,
    };
    // an invalid format string surfaces as a fmt error
    written.ok().map(|_| out)
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

pub fn escape_html(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
}
