use ego::{Block, BlockKind, Package, Pos, Template};
use proptest::prelude::*;

fn at(line: usize) -> Pos {
    Pos::new("page.ego", line)
}

fn concatenated_text(template: &Template) -> String {
    template
        .text_blocks()
        .map(|(_, b)| b.content())
        .collect::<Vec<_>>()
        .concat()
}

#[test]
fn declaration_block_is_found_anywhere() {
    let template = Template::new(
        "page.ego",
        vec![
            Block::text("<p>", at(1)),
            Block::declaration("func Page(c *Context)", at(2)),
        ],
    );
    let decl = template.declaration_block().expect("declaration");
    assert_eq!(decl.content(), "func Page(c *Context)");
    assert_eq!(decl.pos(), &at(2));
}

#[test]
fn declaration_block_missing() {
    let template = Template::new("page.ego", vec![Block::text("<p>", at(1))]);
    assert!(template.declaration_block().is_none());
}

#[test]
fn filtered_views_preserve_order() {
    let template = Template::new(
        "page.ego",
        vec![
            Block::header("import \"fmt\"", at(1)),
            Block::declaration("func Page(c *Context)", at(2)),
            Block::text("a", at(3)),
            Block::code("x := 1", at(4)),
            Block::header("import \"strings\"", at(5)),
            Block::print("x", at(6)),
            Block::text("b", at(7)),
            Block::write("raw", at(8)),
        ],
    );

    let headers: Vec<&str> = template.header_blocks().map(|b| b.content()).collect();
    assert_eq!(headers, vec!["import \"fmt\"", "import \"strings\""]);

    let texts: Vec<(usize, &str)> = template
        .text_blocks()
        .map(|(i, b)| (i, b.content()))
        .collect();
    assert_eq!(texts, vec![(2, "a"), (6, "b")]);

    let body: Vec<BlockKind> = template.non_header_blocks().map(|(_, b)| b.kind()).collect();
    assert_eq!(
        body,
        vec![
            BlockKind::Text,
            BlockKind::Code,
            BlockKind::Print,
            BlockKind::Text,
            BlockKind::Write,
        ]
    );
}

#[test]
fn normalize_merges_adjacent_text() {
    let mut template = Template::new(
        "page.ego",
        vec![
            Block::declaration("func Page(c *Context)", at(1)),
            Block::text("<ul>", at(2)),
            Block::text("\n", at(3)),
            Block::text("<li>", at(4)),
            Block::code("for _, x := range xs {", at(5)),
            Block::text("</ul>", at(6)),
        ],
    );
    template.normalize();

    assert_eq!(
        template.blocks,
        vec![
            Block::declaration("func Page(c *Context)", at(1)),
            Block::text("<ul>\n<li>", at(2)),
            Block::code("for _, x := range xs {", at(5)),
            Block::text("</ul>", at(6)),
        ]
    );
}

#[test]
fn normalize_does_not_merge_across_headers() {
    let mut template = Template::new(
        "page.ego",
        vec![
            Block::text("a", at(1)),
            Block::header("import \"fmt\"", at(2)),
            Block::text("b", at(3)),
        ],
    );
    template.normalize();
    assert_eq!(template.blocks.len(), 3);
}

#[test]
fn package_normalize_covers_every_template() {
    let mut package = Package::new(
        "views",
        vec![
            Template::new("a.ego", vec![Block::text("x", at(1)), Block::text("y", at(2))]),
            Template::new("b.ego", vec![Block::text("z", at(1)), Block::text("w", at(2))]),
        ],
    );
    package.normalize();
    assert!(package.templates.iter().all(|t| t.blocks.len() == 1));
    assert_eq!(package.templates[1].blocks[0].content(), "zw");
}

#[test]
fn block_kind_names() {
    for kind in BlockKind::ALL {
        assert_eq!(BlockKind::from_name(&kind.to_string()), Some(kind));
        assert_eq!(Block::new(kind, "", Pos::unknown()).kind(), kind);
    }
    assert_eq!(BlockKind::from_name("PRINT"), Some(BlockKind::Print));
    assert_eq!(BlockKind::from_name("comment"), None);
}

#[test]
fn pos_known_and_display() {
    assert!(at(3).is_known());
    assert!(!Pos::new("page.ego", 0).is_known());
    assert!(!Pos::new("", 4).is_known());
    assert_eq!(at(12).to_string(), "page.ego:12");
}

fn block_strategy() -> impl Strategy<Value = Block> {
    (0usize..6, "[a-c\\n ]{0,4}", 1usize..50).prop_map(|(kind, content, line)| {
        Block::new(BlockKind::ALL[kind], content, Pos::new("page.ego", line))
    })
}

proptest! {
    #[test]
    fn normalize_is_idempotent(blocks in prop::collection::vec(block_strategy(), 0..20)) {
        let mut once = Template::new("page.ego", blocks);
        once.normalize();
        let mut twice = once.clone();
        twice.normalize();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn normalize_preserves_text(blocks in prop::collection::vec(block_strategy(), 0..20)) {
        let original = Template::new("page.ego", blocks);
        let mut normalized = original.clone();
        normalized.normalize();

        prop_assert_eq!(concatenated_text(&original), concatenated_text(&normalized));
        prop_assert!(normalized
            .blocks
            .windows(2)
            .all(|pair| !(pair[0].is_text() && pair[1].is_text())));

        let non_text = |t: &Template| -> Vec<Block> {
            t.blocks.iter().filter(|b| !b.is_text()).cloned().collect()
        };
        prop_assert_eq!(non_text(&original), non_text(&normalized));
    }
}
