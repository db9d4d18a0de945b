use blocktpl::{Engine, FsLoader, MemoryLoader, Options, TplError};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::sync::Once;

static INIT: Once = Once::new();

fn init_logger() {
    INIT.call_once(|| {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    });
}

const TEMPLATES: &str = "tests/resources/templates";

#[derive(Serialize)]
struct Person {
    #[serde(rename = "NAME")]
    name: String,
    #[serde(rename = "BORN")]
    born: NaiveDate,
}

#[derive(Serialize)]
struct ListPage {
    people: Vec<Person>,
}

#[derive(Serialize)]
struct Link {
    #[serde(rename = "URL")]
    url: &'static str,
    #[serde(rename = "LABEL")]
    label: &'static str,
}

#[derive(Serialize)]
struct Layout {
    #[serde(rename = "TITLE")]
    title: &'static str,
    links: Vec<Link>,
}

#[test]
fn test_render_rows_from_serialized_structs() {
    init_logger();
    let engine = Engine::new(FsLoader::new(TEMPLATES));
    let page = ListPage {
        people: vec![
            Person {
                name: "Ann".to_string(),
                born: NaiveDate::from_ymd_opt(1990, 3, 9).unwrap(),
            },
            Person {
                name: "Bob & co".to_string(),
                born: NaiveDate::from_ymd_opt(2001, 12, 31).unwrap(),
            },
        ],
    };

    let out = engine.render("list.tpl", &page).unwrap();
    assert_eq!(
        out,
        "<table>\n\
         <tr><th>#</th><th>Name</th><th>Born</th></tr>\n\
         <tr><td>1</td><td>Ann</td><td>09.03.1990</td></tr>\n\
         <tr><td>2</td><td>Bob &amp; co</td><td>31.12.2001</td></tr>\n\
         </table>"
    );
}

#[test]
fn test_empty_rows_render_else_branch() {
    init_logger();
    let engine = Engine::new(FsLoader::new(TEMPLATES));
    let out = engine.render("list.tpl", &ListPage { people: vec![] }).unwrap();
    assert!(out.contains("<tr><td>nobody</td></tr>"));
    assert!(!out.contains("<td>1</td>"));
}

#[test]
fn test_include_from_disk() {
    init_logger();
    let engine = Engine::new(FsLoader::new(TEMPLATES));
    let layout = Layout {
        title: "Home",
        links: vec![
            Link {
                url: "/a",
                label: "A",
            },
            Link {
                url: "/b",
                label: "B",
            },
        ],
    };
    let out = engine.render("layout.tpl", &layout).unwrap();
    assert_eq!(
        out,
        "<h1>Home</h1>\n<ul><li><a href=\"/a\">A</a></li><li><a href=\"/b\">B</a></li></ul>"
    );
}

#[test]
fn test_load_glob_preparses_templates() {
    init_logger();
    let engine = Engine::new(FsLoader::new(TEMPLATES));
    let count = engine.load("*.tpl").unwrap();
    assert_eq!(count, 3);

    assert!(engine.is_cached("list.tpl"));
    let cached = engine.template("list.tpl").unwrap();
    assert!(cached.element("people").unwrap().is_block());
}

#[test]
fn test_render_uses_preloaded_template() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hello.tpl");
    fs::write(&path, "Hello {NAME}!").unwrap();

    let engine = Engine::new(FsLoader::new(dir.path()));
    assert_eq!(engine.load("*.tpl").unwrap(), 1);
    // served from the cache once the source is gone
    fs::remove_file(&path).unwrap();

    let mut params = HashMap::new();
    params.insert("NAME", "World");
    assert_eq!(engine.render("hello.tpl", &params).unwrap(), "Hello World!");
}

#[test]
fn test_load_reports_broken_template() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("ok.tpl"), "{X}").unwrap();
    fs::write(dir.path().join("broken.tpl"), "{BLOCK a}{/IF}").unwrap();

    let engine = Engine::new(FsLoader::new(dir.path()));
    let err = engine.load("*.tpl").unwrap_err();
    assert!(matches!(err, TplError::MismatchedBlock { .. }));
}

#[test]
fn test_include_depth_is_configurable() {
    init_logger();
    let loader = MemoryLoader::new()
        .with("a.tpl", "<?elements\ninclude B file \"b.tpl\"\n?>\n{B}")
        .with("b.tpl", "<?elements\ninclude C file \"c.tpl\"\n?>\n{C}")
        .with("c.tpl", "leaf");

    let engine = Engine::new(loader.clone());
    assert_eq!(engine.render("a.tpl", &()).unwrap(), "leaf");

    let shallow = Engine::new(loader).with_options(Options::new().max_include_depth(1));
    assert!(matches!(
        shallow.render("a.tpl", &()),
        Err(TplError::NestingTooDeep(1))
    ));
}

#[test]
fn test_invalid_glob_pattern() {
    let engine = Engine::default();
    assert!(matches!(engine.load("[unclosed"), Err(TplError::Glob(_))));
}
