//! End-to-end tests for dispatch, helpers, verbatim capture and inclusion.

use std::fs;

use codegen_xmlparser::{
    ErrorKind, HandlerError, HandlerRegistry, Location, MemoryResolver, ParseError, ParserConfig,
    ParserContext,
};
use pretty_assertions::assert_eq;

const XI: &str = r#"xmlns:xi="http://www.w3.org/2001/XInclude""#;

#[derive(Debug, Default, Clone, PartialEq)]
struct Book {
    id: String,
    title: String,
    authors: Vec<String>,
    sequels: Vec<Book>,
}

#[derive(Debug, Default, PartialEq)]
struct Catalog {
    name: String,
    books: Vec<Book>,
    notes: String,
    stray_titles: Vec<String>,
}

fn current_book<'a>(
    helpers: &'a mut codegen_xmlparser::HelperStack<Book>,
) -> Result<&'a mut Book, HandlerError> {
    helpers
        .current_mut()
        .ok_or_else(|| HandlerError::new("no <book> in progress"))
}

fn catalog_registry() -> HandlerRegistry<Catalog, Book> {
    let mut registry: HandlerRegistry<Catalog, Book> = HandlerRegistry::new();
    registry
        .on_start("catalog", |cx, attrs| {
            cx.target.name = attrs.get("name").unwrap_or_default().to_string();
            Ok(())
        })
        .on_start("book", |cx, attrs| {
            let id = attrs
                .get("id")
                .ok_or_else(|| HandlerError::new("<book> needs an 'id' attribute"))?;
            cx.helpers.push(Book {
                id: id.to_string(),
                ..Book::default()
            });
            Ok(())
        })
        .on_end("book/title", |cx, data| {
            current_book(cx.helpers)?.title = data.text.trim().to_string();
            Ok(())
        })
        .on_end("book/author", |cx, data| {
            current_book(cx.helpers)?.authors.push(data.text.trim().to_string());
            Ok(())
        })
        .on_end("book", |cx, _| {
            let book = cx
                .helpers
                .pop()
                .ok_or_else(|| HandlerError::new("no <book> in progress"))?;
            match cx.helpers.current_mut() {
                Some(parent) => parent.sequels.push(book),
                None => cx.target.books.push(book),
            }
            Ok(())
        })
        .on_start("notes", |cx, _| {
            cx.capture_verbatim();
            Ok(())
        })
        .on_end("notes", |cx, data| {
            cx.target.notes = data.text.to_string();
            Ok(())
        })
        .on_end("title", |cx, data| {
            cx.target.stray_titles.push(data.text.to_string());
            Ok(())
        });
    registry
}

fn parse_with(
    resolver: MemoryResolver,
    root: &str,
    config: ParserConfig,
) -> (Catalog, Result<(), ParseError>) {
    let registry = catalog_registry();
    let mut catalog = Catalog::default();
    let result = ParserContext::new(&registry, &mut catalog)
        .with_resolver(resolver)
        .with_config(config)
        .parse(root);
    (catalog, result)
}

fn parse_str(xml: &str) -> (Catalog, Result<(), ParseError>) {
    parse_with(
        MemoryResolver::new().with_document("main.xml", xml),
        "main.xml",
        ParserConfig::default(),
    )
}

#[test]
fn test_helpers_build_nested_children() {
    let (catalog, result) = parse_str(
        r#"<catalog name="library">
             <book id="1">
               <title>First</title>
               <author>Ann</author>
               <author>Bob</author>
               <book id="2"><title>Second</title></book>
             </book>
             <title>loose</title>
           </catalog>"#,
    );

    assert_eq!(result, Ok(()));
    assert_eq!(catalog.name, "library");
    assert_eq!(catalog.books.len(), 1);
    let first = &catalog.books[0];
    assert_eq!(first.title, "First");
    assert_eq!(first.authors, vec!["Ann", "Bob"]);
    assert_eq!(first.sequels.len(), 1);
    assert_eq!(first.sequels[0].id, "2");
    assert_eq!(first.sequels[0].title, "Second");
    assert_eq!(catalog.stray_titles, vec!["loose"]);
}

#[test]
fn test_verbatim_subtree_not_dispatched() {
    let (catalog, result) = parse_str(
        r#"<catalog><notes>Intro <title lang="en">X</title><p><b>bold</b> &amp; more</p></notes></catalog>"#,
    );

    assert_eq!(result, Ok(()));
    assert_eq!(
        catalog.notes,
        r#"Intro <title lang="en">X</title><p><b>bold</b> & more</p>"#
    );
    assert!(catalog.stray_titles.is_empty());
    assert!(catalog.books.is_empty());
}

#[test]
fn test_verbatim_includes_unregistered_tags() {
    // <book> without an id would fail if it were dispatched.
    let (catalog, result) = parse_str("<catalog><notes><book/><unknown a='1'/></notes></catalog>");

    assert_eq!(result, Ok(()));
    assert_eq!(catalog.notes, r#"<book></book><unknown a="1"></unknown>"#);
}

#[test]
fn test_inclusion_matches_inlined_document() {
    let included = MemoryResolver::new()
        .with_document(
            "main.xml",
            format!(r#"<catalog name="c" {XI}><xi:include href="books.xml"/><book id="3"/></catalog>"#),
        )
        .with_document(
            "books.xml",
            r#"<book id="2"><title>Two</title><author>Ann</author></book>"#,
        );
    let (with_include, result) = parse_with(included, "main.xml", ParserConfig::default());
    assert_eq!(result, Ok(()));

    let (inlined, result) = parse_str(
        r#"<catalog name="c"><book id="2"><title>Two</title><author>Ann</author></book><book id="3"/></catalog>"#,
    );
    assert_eq!(result, Ok(()));

    assert_eq!(with_include, inlined);
}

#[test]
fn test_text_inclusion_appends_character_data() {
    let resolver = MemoryResolver::new()
        .with_document(
            "main.xml",
            format!(
                r#"<catalog {XI}><book id="1"><title>Vol. <xi:include href="t.txt" parse="text"/></title></book></catalog>"#
            ),
        )
        .with_document("t.txt", "<one> & two");
    let (catalog, result) = parse_with(resolver, "main.xml", ParserConfig::default());

    assert_eq!(result, Ok(()));
    assert_eq!(catalog.books[0].title, "Vol. <one> & two");
}

#[test]
fn test_missing_inclusion_reports_outer_position() {
    let (catalog, result) = parse_str(&format!(
        "<catalog name=\"c\" {XI}>\n<xi:include href=\"gone.xml\"/><book id=\"9\"/></catalog>"
    ));

    assert_eq!(
        result,
        Err(ParseError::at(
            ErrorKind::Resource {
                href: "gone.xml".to_string(),
                reason: "no document named 'gone.xml'".to_string(),
            },
            Location::new("main.xml", 2, 1),
        ))
    );
    assert_eq!(catalog.name, "c");
    assert!(catalog.books.is_empty());
}

#[test]
fn test_error_inside_inclusion_carries_trace() {
    let resolver = MemoryResolver::new()
        .with_document(
            "main.xml",
            format!("<catalog {XI}>\n  <xi:include href=\"a.xml\"/>\n</catalog>"),
        )
        .with_document("a.xml", r#"<book id="x"><bogus/></book>"#);
    let (_, result) = parse_with(resolver, "main.xml", ParserConfig::default());

    let err = result.unwrap_err();
    assert_eq!(
        err.kind,
        ErrorKind::UnknownTag {
            path: "catalog:book:bogus".to_string()
        }
    );
    assert_eq!(
        err.trace,
        vec![Location::new("a.xml", 1, 14), Location::new("main.xml", 2, 3)]
    );
    assert_eq!(
        err.to_string(),
        "no matching tag handler for catalog:book:bogus in a.xml on line 1:14, \
         included from main.xml on line 2:3"
    );
}

#[test]
fn test_inclusion_cycle_is_detected() {
    let resolver = MemoryResolver::new()
        .with_document("a.xml", format!(r#"<catalog {XI}><xi:include href="b.xml"/></catalog>"#))
        .with_document("b.xml", format!(r#"<book id="1" {XI}><xi:include href="a.xml"/></book>"#));
    let (catalog, result) = parse_with(resolver, "a.xml", ParserConfig::default());

    let err = result.unwrap_err();
    assert!(
        matches!(&err.kind, ErrorKind::Resource { href, reason } if href == "a.xml" && reason.contains("cycle"))
    );
    let sources: Vec<&str> = err.trace.iter().map(|l| &*l.source).collect();
    assert_eq!(sources, vec!["b.xml", "a.xml"]);
    assert!(catalog.books.is_empty());
}

#[test]
fn test_inclusion_depth_limit() {
    let resolver = MemoryResolver::new()
        .with_document("a.xml", format!(r#"<catalog {XI}><xi:include href="b.xml"/></catalog>"#))
        .with_document("b.xml", format!(r#"<book id="1" {XI}><xi:include href="c.xml"/></book>"#))
        .with_document("c.xml", r#"<title>deep</title>"#);

    let (_, shallow) = parse_with(
        resolver.clone(),
        "a.xml",
        ParserConfig::new().with_max_include_depth(1),
    );
    assert!(matches!(
        shallow.map_err(|e| e.kind),
        Err(ErrorKind::Resource { ref href, .. }) if href == "c.xml"
    ));

    let (catalog, deep) = parse_with(resolver, "a.xml", ParserConfig::new().with_max_include_depth(2));
    assert_eq!(deep, Ok(()));
    assert_eq!(catalog.books[0].title, "deep");
}

#[test]
fn test_handler_error_stops_dispatch() {
    let (catalog, result) = parse_str(
        r#"<catalog name="c"><book><title>t</title></book><book id="2"/></catalog>"#,
    );

    assert_eq!(
        result.map_err(|e| e.kind),
        Err(ErrorKind::Handler(HandlerError::new(
            "<book> needs an 'id' attribute"
        )))
    );
    assert!(catalog.books.is_empty());
    assert!(catalog.stray_titles.is_empty());
}

#[test]
fn test_tiny_chunks_parse_identically() {
    let xml = r#"<catalog name="chunked"><book id="1"><title>A long enough title</title><author>Someone</author></book><notes>x <i>y</i></notes></catalog>"#;
    let resolver = MemoryResolver::new().with_document("main.xml", xml);

    let (tiny, result) = parse_with(resolver.clone(), "main.xml", ParserConfig::new().with_chunk_size(1));
    assert_eq!(result, Ok(()));
    let (normal, result) = parse_with(resolver, "main.xml", ParserConfig::default());
    assert_eq!(result, Ok(()));

    assert_eq!(tiny, normal);
}

#[test]
fn test_file_inclusion_relative_to_including_document() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("parts")).unwrap();
    fs::write(
        dir.path().join("main.xml"),
        format!(r#"<catalog name="files" {XI}><xi:include href="parts/books.xml"/></catalog>"#),
    )
    .unwrap();
    fs::write(
        dir.path().join("parts").join("books.xml"),
        format!(r#"<book id="1" {XI}><xi:include href="title.xml"/></book>"#),
    )
    .unwrap();
    fs::write(dir.path().join("parts").join("title.xml"), "<title>On disk</title>").unwrap();

    let registry = catalog_registry();
    let mut catalog = Catalog::default();
    let main = dir.path().join("main.xml");
    let result = ParserContext::new(&registry, &mut catalog).parse(&main.display().to_string());

    assert_eq!(result, Ok(()));
    assert_eq!(catalog.books[0].title, "On disk");
}

#[test]
fn test_included_document_with_two_roots_rejected() {
    let resolver = MemoryResolver::new()
        .with_document("main.xml", format!(r#"<catalog {XI}><xi:include href="books.xml"/></catalog>"#))
        .with_document("books.xml", "<book id=\"1\"/>\n<book id=\"2\"/>");
    let (catalog, result) = parse_with(resolver, "main.xml", ParserConfig::default());

    let err = result.unwrap_err();
    assert_eq!(
        err.kind,
        ErrorKind::Structural {
            message: "junk after document element".to_string()
        }
    );
    assert_eq!(err.trace[0], Location::new("books.xml", 2, 1));
    assert_eq!(catalog.books.len(), 1);
}

#[test]
fn test_file_self_inclusion_through_parent_directory_is_a_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let specs = dir.path().join("specs");
    fs::create_dir(&specs).unwrap();
    fs::write(
        specs.join("self.xml"),
        format!(r#"<catalog name="loop" {XI}><xi:include href="../specs/self.xml"/></catalog>"#),
    )
    .unwrap();

    let registry = catalog_registry();
    let mut catalog = Catalog::default();
    let root = specs.join("self.xml");
    let result = ParserContext::new(&registry, &mut catalog)
        .with_config(ParserConfig::new().with_max_include_depth(1000))
        .parse(&root.display().to_string());

    let err = result.unwrap_err();
    assert!(
        matches!(&err.kind, ErrorKind::Resource { href, reason } if href == "../specs/self.xml" && reason.contains("cycle")),
        "unexpected error: {err}"
    );
    assert_eq!(err.trace.len(), 1);
}
