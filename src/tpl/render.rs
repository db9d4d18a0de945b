use std::ops::Range;

use crate::error::{Result, TplError};
use crate::tpl::ast::{DOCUMENT_BLOCK, Token};
use crate::tpl::printer::ElementPrinter;
use crate::tpl::render_context::Context;
use crate::tpl::template::Template;
use crate::value::Value;

const ROWNO_SUB: &str = "rowno";

pub struct RenderBuffer<'p> {
    pub out: String,
    pub printer: &'p dyn ElementPrinter,
}

/// Renders block `id` (and everything nested in it) into `buf`.
///
/// Conditional blocks pick their main or else range from the condition. Other blocks
/// look up their own id: a non-empty list repeats the main range once per row, an absent
/// value shows it once, and an empty or falsy value selects the else range.
pub(crate) fn render_block<'a>(
    tpl: &'a Template,
    id: &str,
    ctx: &mut Context<'a>,
    buf: &mut RenderBuffer,
) -> Result<()> {
    let block = tpl
        .element(id)
        .ok_or_else(|| TplError::UnknownElement(id.to_string()))?;
    if block.has("noprint") {
        return Ok(());
    }

    if let Some(cond) = &block.cond {
        let truthy = ctx.lookup(cond.target()).is_truthy();
        if cond.holds(truthy) {
            return replay(tpl, block.main_range(), ctx, buf);
        }
        return match block.else_range() {
            Some(range) => replay(tpl, range, ctx, buf),
            None => Ok(()),
        };
    }

    if block.id == DOCUMENT_BLOCK {
        return replay(tpl, block.main_range(), ctx, buf);
    }

    let block_id = block.id.as_str();
    let value = ctx.lookup(block_id);
    match value {
        Value::List(rows) if !rows.is_empty() => {
            for (i, row) in rows.iter().enumerate() {
                ctx.push(block_id, row, i + 1);
                let result = replay(tpl, block.main_range(), ctx, buf);
                ctx.pop();
                result?;
            }
            Ok(())
        }
        Value::Null => replay(tpl, block.main_range(), ctx, buf),
        Value::Map(_) if value.is_truthy() => {
            ctx.push(block_id, value, 1);
            let result = replay(tpl, block.main_range(), ctx, buf);
            ctx.pop();
            result
        }
        v if v.is_truthy() => replay(tpl, block.main_range(), ctx, buf),
        _ => match block.else_range() {
            Some(range) => replay(tpl, range, ctx, buf),
            None => Ok(()),
        },
    }
}

/// Prints the token cells in `range`, recursing into nested blocks.
fn replay<'a>(
    tpl: &'a Template,
    range: Range<usize>,
    ctx: &mut Context<'a>,
    buf: &mut RenderBuffer,
) -> Result<()> {
    let tokens = tpl.tokens();
    let mut i = range.start;
    while i < range.end {
        match &tokens[i] {
            Token::Text(t) => buf.out.push_str(t),
            Token::Element { id, sub } => print_ref(tpl, id, sub.as_deref(), ctx, buf)?,
            Token::Block(id) => {
                render_block(tpl, id, ctx, buf)?;
                // the sub-block printed its own range; continue after its close marker
                let end = tpl
                    .element(id)
                    .and_then(|b| b.end)
                    .unwrap_or(tokens.len());
                i = end + 1;
                continue;
            }
            Token::BlockOpen { .. } | Token::BlockClose { .. } | Token::Else | Token::Empty => {}
        }
        i += 1;
    }
    Ok(())
}

fn print_ref(
    tpl: &Template,
    id: &str,
    sub: Option<&str>,
    ctx: &Context,
    buf: &mut RenderBuffer,
) -> Result<()> {
    let element = tpl
        .element(id)
        .ok_or_else(|| TplError::UnknownElement(id.to_string()))?;

    if element.is_block() && sub == Some(ROWNO_SUB) {
        if let Some(n) = ctx.rowno(id) {
            buf.out.push_str(&n.to_string());
        }
        return Ok(());
    }

    buf.printer
        .print_element(&mut buf.out, element, sub, ctx.lookup(id))
}
