//! Separates a template source into its elements section and body, expanding `include` lines.

use log::trace;

use crate::error::{Result, TplError};
use crate::tpl::line::parse_line;
use crate::tpl::loader::SourceLoader;

pub const ELEMENTS_OPEN: &str = "<?elements";
pub const ELEMENTS_CLOSE: &str = "?>";

const INCLUDE_TYPE: &str = "include";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Split {
    /// Element definition lines, one element per line.
    pub elements: String,
    pub body: String,
}

/// Splits `source` without touching `include` lines.
pub fn split(source: &str) -> Result<Split> {
    let Some(open) = source.find(ELEMENTS_OPEN) else {
        return Ok(Split {
            elements: String::new(),
            body: source.to_string(),
        });
    };

    let section_start = open + ELEMENTS_OPEN.len();
    let Some(close) = source[section_start..].find(ELEMENTS_CLOSE) else {
        let line = source[..open].matches('\n').count() + 1;
        return Err(TplError::syntax(
            line,
            format!("'{}' section is never closed", ELEMENTS_OPEN),
        ));
    };
    let close = section_start + close;

    let body = &source[close + ELEMENTS_CLOSE.len()..];
    let body = body
        .strip_prefix("\r\n")
        .or_else(|| body.strip_prefix('\n'))
        .unwrap_or(body);
    let body = body
        .strip_suffix("\r\n")
        .or_else(|| body.strip_suffix('\n'))
        .unwrap_or(body);

    Ok(Split {
        elements: source[section_start..close].to_string(),
        body: body.to_string(),
    })
}

/// Splits `source` and recursively replaces every `include ID file "name"` line with the
/// elements of `name`, and every `{ID}` placeholder in the body with the body of `name`.
pub fn split_with_includes(
    source: &str,
    loader: &dyn SourceLoader,
    max_depth: usize,
) -> Result<Split> {
    expand(source, loader, max_depth, 0)
}

fn expand(source: &str, loader: &dyn SourceLoader, max_depth: usize, depth: usize) -> Result<Split> {
    let Split { elements, mut body } = split(source)?;

    if !elements.lines().any(is_include_line) {
        return Ok(Split { elements, body });
    }

    let mut expanded = String::with_capacity(elements.len());
    for (i, line) in elements.lines().enumerate() {
        if !is_include_line(line) {
            expanded.push_str(line);
            expanded.push('\n');
            continue;
        }

        let include = parse_line(line, i + 1)?;
        let file = include
            .attr("file")
            .ok_or_else(|| TplError::AttributeRequired {
                element: include.id.clone(),
                attribute: "file".to_string(),
            })?;

        if depth + 1 > max_depth {
            return Err(TplError::NestingTooDeep(max_depth));
        }

        trace!("include '{}' from '{}' at depth {}", include.id, file, depth + 1);
        let included = expand(&loader.load(file)?, loader, max_depth, depth + 1)?;

        expanded.push_str(&included.elements);
        if !included.elements.ends_with('\n') {
            expanded.push('\n');
        }
        body = body.replace(&format!("{{{}}}", include.id), &included.body);
    }

    Ok(Split {
        elements: expanded,
        body,
    })
}

fn is_include_line(line: &str) -> bool {
    line.split_whitespace().next() == Some(INCLUDE_TYPE)
}
