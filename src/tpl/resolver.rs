//! Builds the element map and binds block ranges over the token stream.

use log::warn;
use std::collections::{HashMap, HashSet};

use crate::error::{Result, TplError};
use crate::tpl::ast::{BLOCK_TYPE, BlockKind, Condition, DOCUMENT_BLOCK, Element, STRING_TYPE, Token};
use crate::tpl::line::parse_line;

/// Parses every non-blank line of an elements section into the element map.
pub fn declare_elements(section: &str) -> Result<HashMap<String, Element>> {
    let mut elements = HashMap::new();
    for (i, line) in section.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let parsed = parse_line(line, i + 1)?;
        if parsed.id == DOCUMENT_BLOCK || elements.contains_key(&parsed.id) {
            return Err(TplError::DuplicateElement(parsed.id));
        }
        elements.insert(parsed.id.clone(), parsed.into_element());
    }
    Ok(elements)
}

/// Single left-to-right pass over `tokens`.
///
/// Block openings are rewritten to [`Token::Block`] carrying the block id, `{ELSE}` cells
/// become [`Token::Empty`], and every block gets `begin`/`end`/`else_at` offsets. Elements
/// are bound to the block in which they are first referenced. When `strict` is off,
/// undeclared references register implicit `string` elements.
pub fn resolve(
    elements: &mut HashMap<String, Element>,
    tokens: &mut [Token],
    strict: bool,
) -> Result<()> {
    let len = tokens.len();

    let mut root = Element::new(DOCUMENT_BLOCK, BLOCK_TYPE);
    root.begin = Some(0);
    root.end = Some(len);
    elements.insert(DOCUMENT_BLOCK.to_string(), root);

    let mut stack: Vec<(String, BlockKind)> = Vec::new();
    let mut current = DOCUMENT_BLOCK.to_string();
    let mut current_kind = BlockKind::Block;
    let mut opened: HashSet<String> = HashSet::new();

    // anonymous IF ids must also avoid block names opened later in the body
    let body_blocks: HashSet<String> = tokens
        .iter()
        .filter_map(|t| match t {
            Token::BlockOpen {
                name,
                kind: BlockKind::Block,
            } => Some(name.clone()),
            _ => None,
        })
        .collect();

    for i in 0..len {
        let token = std::mem::replace(&mut tokens[i], Token::Empty);
        tokens[i] = match token {
            Token::Element { id, sub } => {
                match elements.get_mut(&id) {
                    Some(element) => {
                        if element.block.is_none() && element.id != DOCUMENT_BLOCK {
                            element.block = Some(current.clone());
                        }
                    }
                    None if !strict => {
                        let mut element = Element::new(id.clone(), STRING_TYPE);
                        element.implicit = true;
                        element.block = Some(current.clone());
                        elements.insert(id.clone(), element);
                    }
                    None => {}
                }
                Token::Element { id, sub }
            }

            Token::BlockClose { kind } => {
                let Some((parent, parent_kind)) = stack.pop() else {
                    return Err(TplError::UnopenedBlock { index: i });
                };
                if !kind.closes(current_kind) {
                    return Err(TplError::MismatchedBlock {
                        id: current,
                        opened: current_kind.to_string(),
                        closed: kind.to_string(),
                    });
                }
                if let Some(block) = elements.get_mut(&current) {
                    block.end = Some(i);
                }
                current = parent;
                current_kind = parent_kind;
                Token::BlockClose { kind }
            }

            Token::Else => {
                if stack.is_empty() {
                    return Err(TplError::UnopenedBlock { index: i });
                }
                if let Some(block) = elements.get_mut(&current) {
                    if block.else_at.is_some() {
                        return Err(TplError::DuplicateElse(current));
                    }
                    block.else_at = Some(i + 1);
                }
                Token::Empty
            }

            Token::BlockOpen { name, kind } => {
                let (id, cond) = match kind {
                    BlockKind::Block => {
                        // declared blocks may be opened; any other existing element may not
                        let taken = name == DOCUMENT_BLOCK
                            || elements.get(&name).is_some_and(|e| {
                                !e.implicit && (!e.is_block() || e.cond.is_some())
                            });
                        if taken || !opened.insert(name.clone()) {
                            return Err(TplError::DuplicateBlock(name));
                        }
                        (name, None)
                    }
                    BlockKind::If => (
                        anonymous_id(i, elements, &body_blocks),
                        Some(Condition::If(name)),
                    ),
                    BlockKind::IfNot => (
                        anonymous_id(i, elements, &body_blocks),
                        Some(Condition::IfNot(name)),
                    ),
                };

                // a block may be pre-declared in the elements section to carry attributes
                let block = elements
                    .entry(id.clone())
                    .or_insert_with(|| Element::new(id.clone(), BLOCK_TYPE));
                block.kind = BLOCK_TYPE.to_string();
                block.implicit = false;
                block.block = Some(current.clone());
                block.begin = Some(i + 1);
                block.end = Some(len);
                block.cond = cond;

                let parent = std::mem::replace(&mut current, id.clone());
                stack.push((parent, current_kind));
                current_kind = kind;
                Token::Block(id)
            }

            other => other,
        };
    }

    // still-open blocks keep their provisional end at the end of the stream
    for (parent, _) in stack.into_iter().rev() {
        warn!("block '{}' is never closed, closing at end of template", current);
        current = parent;
    }

    Ok(())
}

/// Id for an `{IF}` block, derived from its token index so repeated parses agree.
fn anonymous_id(
    index: usize,
    elements: &HashMap<String, Element>,
    reserved: &HashSet<String>,
) -> String {
    let mut id = format!("if_{}", index);
    while elements.contains_key(&id) || reserved.contains(&id) {
        id.push('_');
    }
    id
}
