use blocktpl::tpl::line::parse_line;
use blocktpl::{
    DOCUMENT_BLOCK, MemoryLoader, Options, Template, Token, TplError, Value,
};
use std::sync::Once;

static INIT: Once = Once::new();

fn init_logger() {
    INIT.call_once(|| {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    });
}

fn values(pairs: Vec<(&str, Value)>) -> Value {
    pairs.into_iter().collect()
}

#[test]
fn test_hello_element() {
    init_logger();
    let tpl = Template::parse("<?elements\nstring NAME lb \"Name\"\n?>\nHello {NAME}!").unwrap();

    let name = tpl.element("NAME").unwrap();
    assert_eq!(name.kind, "string");
    assert_eq!(name.attr("lb"), Some("Name"));
    assert!(!name.implicit);

    let out = tpl.render(&values(vec![("NAME", "World".into())])).unwrap();
    assert_eq!(out, "Hello World!");
}

#[test]
fn test_block_rows_in_order() {
    init_logger();
    let tpl = Template::parse("{BLOCK items}\n{NAME}\n{/BLOCK}").unwrap();
    let rows = Value::List(vec![
        values(vec![("NAME", "A".into())]),
        values(vec![("NAME", "B".into())]),
    ]);
    let out = tpl.render(&values(vec![("items", rows)])).unwrap();
    assert_eq!(out, "\nA\n\nB\n");
}

#[test]
fn test_if_else() {
    init_logger();
    let tpl = Template::parse("{IF flag}yes{ELSE}no{/IF}").unwrap();
    assert_eq!(tpl.render(&values(vec![("flag", Value::Bool(true))])).unwrap(), "yes");
    assert_eq!(tpl.render(&values(vec![("flag", Value::I64(0))])).unwrap(), "no");
    assert_eq!(tpl.render(&Value::Null).unwrap(), "no");
}

#[test]
fn test_if_id_never_collides_with_declared_block() {
    init_logger();
    let src = "<?elements\nblock if_0\n?>\n{IF flag}yes{/IF}{BLOCK if_0}b{/BLOCK}";
    let tpl = Template::parse(src).unwrap();
    let Token::Block(if_id) = &tpl.tokens()[0] else {
        panic!("expected a block token, got {:?}", tpl.tokens()[0]);
    };
    assert_ne!(if_id, "if_0");
    assert!(tpl.element(if_id).unwrap().cond.is_some());
    assert_eq!(tpl.render(&values(vec![("flag", Value::Bool(true))])).unwrap(), "yesb");
}

#[test]
fn test_if_id_never_collides_with_body_block() {
    init_logger();
    let tpl = Template::parse("{IF flag}yes{/IF}{BLOCK if_0}B{/BLOCK}").unwrap();
    let Token::Block(if_id) = &tpl.tokens()[0] else {
        panic!("expected a block token, got {:?}", tpl.tokens()[0]);
    };
    assert_ne!(if_id, "if_0");
    assert!(tpl.element(if_id).unwrap().cond.is_some());
    assert!(tpl.element("if_0").unwrap().cond.is_none());

    assert_eq!(tpl.render(&values(vec![("flag", Value::Bool(true))])).unwrap(), "yesB");
    assert_eq!(tpl.render(&values(vec![("flag", Value::Bool(false))])).unwrap(), "B");
}

#[test]
fn test_block_name_reusing_declared_element_fails() {
    let src = "<?elements\nstring X lb \"x\"\n?>\n{X}{BLOCK X}b{/BLOCK}";
    let err = Template::parse(src).unwrap_err();
    assert!(matches!(err, TplError::DuplicateBlock(ref id) if id == "X"));
    assert!(err.is_parse_error());
}

#[test]
fn test_duplicate_element_fails_before_render() {
    let src = "<?elements\nstring X lb \"a\"\nstring X lb \"b\"\n?>\n{X}";
    let err = Template::parse(src).unwrap_err();
    assert!(matches!(err, TplError::DuplicateElement(ref id) if id == "X"));
    assert!(err.is_parse_error());
}

#[test]
fn test_missing_include_fails_at_parse_time() {
    let src = "<?elements\ninclude PART file \"missing.tpl\"\n?>\n{PART}";
    let err = Template::parse_with(src, &Options::default(), &MemoryLoader::new()).unwrap_err();
    assert!(matches!(err, TplError::FileNotFound(ref f) if f == "missing.tpl"));
}

#[test]
fn test_every_reference_resolves_or_fails() {
    let src = "<?elements\nstring A\n?>\n{A}{B}{BLOCK r}{C.lb}{/BLOCK}";

    let lenient = Template::parse(src).unwrap();
    for token in lenient.tokens() {
        if let Token::Element { id, .. } = token {
            assert!(lenient.element(id).is_some(), "unresolved {}", id);
        }
    }

    let strict = Template::parse_with(src, &Options::new().strict_elements(true), &MemoryLoader::new())
        .unwrap();
    assert!(matches!(
        strict.render(&Value::Null),
        Err(TplError::UnknownElement(ref id)) if id == "B"
    ));
}

#[test]
fn test_block_parent_chain_ends_at_document() {
    let tpl = Template::parse("{BLOCK a}{BLOCK b}{BLOCK c}x{/BLOCK}{/BLOCK}{/BLOCK}").unwrap();
    for id in ["a", "b", "c"] {
        let block = tpl.element(id).unwrap();
        assert!(block.begin < block.end);

        let mut at = block.block.clone();
        let mut last = None;
        while let Some(parent) = at {
            at = tpl.element(&parent).unwrap().block.clone();
            last = Some(parent);
        }
        assert_eq!(last.as_deref(), Some(DOCUMENT_BLOCK));
    }
}

#[test]
fn test_parsing_twice_is_identical() {
    let src = "<?elements\nstring A html_class \"x\"\n?>\n{IF A}{A}{/IF}{IF NOT A}-{/IF}{BLOCK r}{IF A}{r.rowno}{/IF}{/BLOCK}";
    let first = Template::parse(src).unwrap();
    let second = Template::parse(src).unwrap();
    assert_eq!(first.elements(), second.elements());
    assert_eq!(first.tokens(), second.tokens());
}

#[test]
fn test_element_line_round_trip() {
    let lines = [
        "string NAME",
        r#"string NAME lb "Name" required"#,
        r#"input EMAIL  html_class "x y"   html_readonly size "30""#,
        r#"link L lb "say \"hi\"" popup"#,
    ];
    for line in lines {
        let parsed = parse_line(line, 1).unwrap();
        let reparsed = parse_line(&parsed.to_string(), 1).unwrap();
        assert_eq!(parsed, reparsed, "{}", line);
    }
}

#[test]
fn test_legacy_block_syntax() {
    let options = Options::new().legacy_blocks(true);
    let tpl = Template::parse_with(
        "<!-- BLOCK rows -->[{V}]<!-- /BLOCK -->",
        &options,
        &MemoryLoader::new(),
    )
    .unwrap();
    let rows = Value::List(vec![
        values(vec![("V", 1i64.into())]),
        values(vec![("V", 2i64.into())]),
    ]);
    assert_eq!(tpl.render(&values(vec![("rows", rows)])).unwrap(), "[1][2]");
}

#[test]
fn test_labels_and_escaping() {
    let tpl = Template::parse(
        "<?elements\nstring Q lb \"Question?\" html_class \"q\"\n?>\n<label{Q.html}>{Q.lb}</label>{Q}",
    )
    .unwrap();
    let out = tpl.render(&values(vec![("Q", "a < b".into())])).unwrap();
    assert_eq!(out, r#"<label class="q">Question?</label>a &lt; b"#);
}
