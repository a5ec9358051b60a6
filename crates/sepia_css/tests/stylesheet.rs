//! End-to-end scenarios: source text in, bytecode and compiled selectors
//! out.

use anyhow::Result;

use sepia_css::bytecode::{self, flags, item, tag, StyleBuffer, Unit};
use sepia_css::properties::PropertyId;
use sepia_css::selector::Specificity;
use sepia_css::stylesheet::{Level, RuleKind, Ruleset, Status, Stylesheet, StylesheetParams};
use sepia_css::parse_str;
use sepia_shared::fixed::Fixed;
use sepia_shared::interner::InternContext;

fn params() -> StylesheetParams {
    let mut params = StylesheetParams::new(Box::new(|_base, rel| Ok(rel.to_string())));
    params.level = Level::Css3;
    params
}

fn author_sheet(css: &str) -> Stylesheet {
    parse_str(css, params()).expect("parse failed")
}

fn first_ruleset(sheet: &Stylesheet) -> &Ruleset {
    sheet
        .rules()
        .iter()
        .find_map(|rule| match &rule.kind {
            RuleKind::Ruleset(ruleset) => Some(ruleset),
            _ => None,
        })
        .expect("no ruleset in sheet")
}

fn fixed_word(text: &str) -> u32 {
    Fixed::parse(text).unwrap().to_word()
}

// Every declaration must decode under the opcode table: known opcode, and a
// payload of exactly the length the value tag demands.
fn assert_well_formed(style: &StyleBuffer) {
    let mut words = 0usize;
    for (opv, payload) in style.declarations() {
        assert!((bytecode::get_opcode(opv) as usize) < 0x400);
        words += 1 + payload.len();
    }
    assert_eq!(words, style.words().len(), "trailing or dangling payload words");
}

#[test]
fn single_colour_declaration() -> Result<()> {
    let sheet = author_sheet("h1 { color: red; }");
    assert_eq!(sheet.rule_count(), 1);

    let ruleset = first_ruleset(&sheet);
    assert_eq!(ruleset.selectors.len(), 1);
    assert_eq!(ruleset.selectors[0].specificity, Specificity::new(0, 0, 1));

    let decls: Vec<_> = ruleset.style.declarations().collect();
    assert_eq!(decls.len(), 1);
    let (opv, payload) = decls[0];
    assert_eq!(bytecode::get_opcode(opv), PropertyId::Color.opcode());
    assert_eq!(bytecode::get_value(opv), tag::COLOR);
    assert_eq!(payload, &[0xFFFF0000]);
    Ok(())
}

#[test]
fn hex_colour_and_important_dimension() -> Result<()> {
    let sheet = author_sheet("p { color: #abc; font-size: 12pt !important; }");
    let ruleset = first_ruleset(&sheet);
    let decls: Vec<_> = ruleset.style.declarations().collect();
    assert_eq!(decls.len(), 2);

    let (opv, payload) = decls[0];
    assert_eq!(bytecode::get_opcode(opv), PropertyId::Color.opcode());
    assert!(!bytecode::is_important(opv));
    assert_eq!(payload, &[0xFFAABBCC]);

    let (opv, payload) = decls[1];
    assert_eq!(bytecode::get_opcode(opv), PropertyId::FontSize.opcode());
    assert!(bytecode::is_important(opv));
    assert_eq!(bytecode::get_value(opv), tag::DIMENSION);
    assert_eq!(payload, &[fixed_word("12"), Unit::Pt.word()]);
    Ok(())
}

#[test]
fn selector_group_specificities() -> Result<()> {
    let sheet = author_sheet(".a, #b > c + d { }");
    assert_eq!(sheet.rule_count(), 1);

    let ruleset = first_ruleset(&sheet);
    assert_eq!(ruleset.selectors.len(), 2);
    assert_eq!(ruleset.selectors[0].specificity, Specificity::new(0, 1, 0));
    assert_eq!(ruleset.selectors[1].specificity, Specificity::new(1, 0, 2));
    Ok(())
}

#[test]
fn border_radius_corner_mapping() -> Result<()> {
    let sheet = author_sheet("x { border-radius: 1px 2px 3px 4px / 5px; }");
    let ruleset = first_ruleset(&sheet);
    let decls: Vec<_> = ruleset.style.declarations().collect();
    assert_eq!(decls.len(), 4);

    let expected = [
        (PropertyId::BorderTopLeftRadius, "1"),
        (PropertyId::BorderTopRightRadius, "2"),
        (PropertyId::BorderBottomLeftRadius, "4"),
        (PropertyId::BorderBottomRightRadius, "3"),
    ];

    for ((opv, payload), (prop, x)) in decls.iter().zip(expected) {
        assert_eq!(bytecode::get_opcode(*opv), prop.opcode(), "corner {prop:?}");
        assert_eq!(bytecode::get_value(*opv), tag::LIST);
        assert_eq!(
            *payload,
            &[
                item::VALUE,
                fixed_word(x),
                Unit::Px.word(),
                item::VALUE,
                fixed_word("5"),
                Unit::Px.word(),
                item::END,
            ][..],
            "corner {prop:?}"
        );
    }
    Ok(())
}

#[test]
fn background_size_list() -> Result<()> {
    let sheet = author_sheet("x { background-size: auto 50%; }");
    let ruleset = first_ruleset(&sheet);
    let decls: Vec<_> = ruleset.style.declarations().collect();
    assert_eq!(decls.len(), 1);

    let (opv, payload) = decls[0];
    assert_eq!(bytecode::get_opcode(opv), PropertyId::BackgroundSize.opcode());
    assert_eq!(bytecode::get_value(opv), tag::LIST);
    assert_eq!(
        payload,
        &[
            item::KEYWORD_BASE,
            item::VALUE,
            fixed_word("50"),
            Unit::Pct.word(),
            item::END,
        ]
    );

    // negative sizes are rejected
    let sheet = author_sheet("x { background-size: -10px; }");
    assert_eq!(first_ruleset(&sheet).style.declarations().count(), 0);
    Ok(())
}

#[test]
fn invalid_declaration_is_rolled_back() -> Result<()> {
    let sheet = author_sheet("x { color: ; color: red; }");
    let ruleset = first_ruleset(&sheet);
    let decls: Vec<_> = ruleset.style.declarations().collect();
    assert_eq!(decls.len(), 1);
    assert_eq!(decls[0].1, &[0xFFFF0000]);
    assert_well_formed(&ruleset.style);
    assert!(!sheet.parse_log().is_empty());
    Ok(())
}

#[test]
fn invalid_declaration_between_valid_ones() -> Result<()> {
    let sheet = author_sheet("x { width: 10px; bogus-prop: 1 2 3; height: 20px; }");
    let ruleset = first_ruleset(&sheet);
    let decls: Vec<_> = ruleset.style.declarations().collect();
    assert_eq!(decls.len(), 2);
    assert_eq!(bytecode::get_opcode(decls[0].0), PropertyId::Width.opcode());
    assert_eq!(bytecode::get_opcode(decls[1].0), PropertyId::Height.opcode());
    assert_well_formed(&ruleset.style);
    Ok(())
}

#[test]
fn chunked_input_is_equivalent() -> Result<()> {
    let css = "@import url(base.css);\n\
               h1, .title { color: #abc; margin: 0 auto; }\n\
               @media screen and (min-width: 600px) { p { font-size: 120%; } }\n\
               x { border-radius: 1px 2px / 3px; background-size: cover; }";

    // a shared interning context keeps handles comparable across both sheets
    let intern = InternContext::new();

    let mut whole_params = params();
    whole_params.intern = Some(intern.clone());
    let whole = parse_str(css, whole_params)?;

    let mut chunk_params = params();
    chunk_params.intern = Some(intern);
    let mut chunked = Stylesheet::new(chunk_params)?;
    for byte in css.as_bytes() {
        match chunked.append_data(std::slice::from_ref(byte))? {
            Status::Ok | Status::NeedsData => {}
        }
    }
    chunked.data_done()?;

    assert_eq!(whole.rules(), chunked.rules());
    Ok(())
}

#[test]
fn declarations_preserve_source_order() -> Result<()> {
    let sheet = author_sheet("x { width: 1px; width: 2px; color: red; width: 3px; }");
    let ruleset = first_ruleset(&sheet);
    let widths: Vec<u32> = ruleset
        .style
        .declarations()
        .filter(|(opv, _)| bytecode::get_opcode(*opv) == PropertyId::Width.opcode())
        .map(|(_, payload)| payload[0])
        .collect();
    assert_eq!(widths, vec![fixed_word("1"), fixed_word("2"), fixed_word("3")]);
    Ok(())
}

#[test]
fn rules_preserve_source_order() -> Result<()> {
    let sheet = author_sheet("a {} b {} c {}");
    let indexes: Vec<u32> = sheet.rules().iter().map(|r| r.source_index).collect();
    assert_eq!(indexes, vec![0, 1, 2]);
    Ok(())
}

#[test]
fn property_names_and_keywords_fold_case() -> Result<()> {
    let sheet = author_sheet("x { COLOR: RED; DISPLAY: Block; }");
    let ruleset = first_ruleset(&sheet);
    let decls: Vec<_> = ruleset.style.declarations().collect();
    assert_eq!(decls.len(), 2);
    assert_eq!(decls[0].1, &[0xFFFF0000]);
    Ok(())
}

#[test]
fn class_names_keep_their_case() -> Result<()> {
    use sepia_css::selector::SimpleSelector;

    let sheet = author_sheet(".Menu {}");
    let ruleset = first_ruleset(&sheet);
    let SimpleSelector::Class(name) = &ruleset.selectors[0].compounds[0].simples[0] else {
        panic!("expected class selector");
    };
    assert_eq!(name.as_str(), "Menu");
    Ok(())
}

#[test]
fn inherit_sets_the_flag_without_payload() -> Result<()> {
    let sheet = author_sheet("x { color: inherit; margin: inherit; }");
    let ruleset = first_ruleset(&sheet);
    let decls: Vec<_> = ruleset.style.declarations().collect();

    // margin: inherit expands to its four longhands
    assert_eq!(decls.len(), 5);
    for (opv, payload) in decls {
        assert!(bytecode::is_inherit(opv));
        assert!(payload.is_empty());
    }
    Ok(())
}

#[test]
fn margin_shorthand_expands_by_side() -> Result<()> {
    let sheet = author_sheet("x { margin: 1px 2px 3px; }");
    let ruleset = first_ruleset(&sheet);
    let decls: Vec<_> = ruleset.style.declarations().collect();

    let expected = [
        (PropertyId::MarginTop, "1"),
        (PropertyId::MarginRight, "2"),
        (PropertyId::MarginBottom, "3"),
        (PropertyId::MarginLeft, "2"),
    ];
    assert_eq!(decls.len(), 4);
    for ((opv, payload), (prop, value)) in decls.iter().zip(expected) {
        assert_eq!(bytecode::get_opcode(*opv), prop.opcode());
        assert_eq!(*payload, &[fixed_word(value), Unit::Px.word()][..]);
    }
    Ok(())
}

#[test]
fn nth_child_arguments_reduce_to_a_b() -> Result<()> {
    use sepia_css::selector::{PseudoArg, SimpleSelector};

    let cases = [
        ("li:nth-child(2n+1) {}", 2, 1),
        ("li:nth-child(odd) {}", 2, 1),
        ("li:nth-child(even) {}", 2, 0),
        ("li:nth-child(7) {}", 0, 7),
        ("li:nth-child(-n-2) {}", -1, -2),
        ("li:nth-child(n) {}", 1, 0),
    ];

    for (css, a, b) in cases {
        let sheet = author_sheet(css);
        let ruleset = first_ruleset(&sheet);
        let simples = &ruleset.selectors[0].compounds[0].simples;
        let nth = simples
            .iter()
            .find_map(|s| match s {
                SimpleSelector::PseudoClass {
                    arg: Some(PseudoArg::Nth { a, b }),
                    ..
                } => Some((*a, *b)),
                _ => None,
            })
            .unwrap_or_else(|| panic!("no nth argument in {css}"));
        assert_eq!(nth, (a, b), "for {css}");
    }
    Ok(())
}

#[test]
fn not_contributes_inner_specificity() -> Result<()> {
    let sheet = author_sheet("a:not(.x) {}");
    let ruleset = first_ruleset(&sheet);
    assert_eq!(ruleset.selectors[0].specificity, Specificity::new(0, 1, 1));
    Ok(())
}

#[test]
fn invalid_selector_drops_the_whole_rule() -> Result<()> {
    let sheet = author_sheet("a > > b { color: red; } b { color: blue; }");
    assert_eq!(sheet.rule_count(), 1);
    let ruleset = first_ruleset(&sheet);
    assert_eq!(ruleset.selectors.len(), 1);
    assert_eq!(ruleset.style.declarations().count(), 1);
    Ok(())
}

#[test]
fn unknown_at_rule_is_skipped_whole() -> Result<()> {
    let sheet = author_sheet("@fancy { a { b: c } } h1 { color: red; }");
    assert_eq!(sheet.rule_count(), 1);
    assert!(matches!(sheet.rules()[0].kind, RuleKind::Ruleset(_)));
    assert!(!sheet.parse_log().is_empty());
    Ok(())
}

#[test]
fn media_rule_nests_rulesets() -> Result<()> {
    use sepia_css::stylesheet::MediaType;

    let sheet = author_sheet("@media screen and (min-width: 600px) { p { color: red; } }");
    assert_eq!(sheet.rule_count(), 1);

    let RuleKind::Media(media) = &sheet.rules()[0].kind else {
        panic!("expected media rule");
    };
    assert_eq!(media.queries.len(), 1);
    assert_eq!(media.queries[0].media_type, Some(MediaType::Screen));
    assert_eq!(media.queries[0].conditions.len(), 1);
    assert_eq!(media.rules.len(), 1);
    assert!(matches!(media.rules[0].kind, RuleKind::Ruleset(_)));
    Ok(())
}

#[test]
fn keyword_valued_media_features_are_stored() -> Result<()> {
    use sepia_css::stylesheet::{MediaFeature, MediaValue};

    let sheet = author_sheet(
        "@media screen and (overflow-block: paged) and (update-frequency: slow) and (overflow-inline: scroll) { p {} }",
    );
    let RuleKind::Media(media) = &sheet.rules()[0].kind else {
        panic!("expected media rule");
    };

    // recognized features must be compiled and stored, never forced to
    // "not all"
    let query = &media.queries[0];
    assert!(!query.never);
    assert_eq!(query.conditions.len(), 3);

    let expected = [
        (MediaFeature::OverflowBlock, "paged"),
        (MediaFeature::UpdateFrequency, "slow"),
        (MediaFeature::OverflowInline, "scroll"),
    ];
    for (condition, (feature, keyword)) in query.conditions.iter().zip(expected) {
        assert_eq!(condition.feature, feature);
        let Some(MediaValue::Ident(value)) = &condition.value else {
            panic!("expected keyword value for {feature:?}");
        };
        assert_eq!(value.as_str(), keyword);
    }
    Ok(())
}

#[test]
fn import_placement_is_enforced() -> Result<()> {
    let sheet = author_sheet("h1 {} @import url(late.css);");
    assert_eq!(sheet.rule_count(), 1);
    assert!(!sheet.parse_log().is_empty());

    let sheet = author_sheet("@import url(early.css); h1 {}");
    assert_eq!(sheet.rule_count(), 2);
    let RuleKind::Import(import) = &sheet.rules()[0].kind else {
        panic!("expected import rule");
    };
    assert_eq!(import.url.as_str(), "early.css");
    Ok(())
}

#[test]
fn import_feeds_the_client_callback() -> Result<()> {
    use std::cell::RefCell;
    use std::rc::Rc;

    let fetched: Rc<RefCell<Vec<String>>> = Rc::default();
    let record = Rc::clone(&fetched);

    let mut p = params();
    p.handlers.import = Some(Box::new(move |url, _media| {
        record.borrow_mut().push(url.to_string());
        Ok(())
    }));

    let _sheet = parse_str("@import url(a.css); @import \"b.css\";", p)?;
    assert_eq!(*fetched.borrow(), vec!["a.css".to_string(), "b.css".to_string()]);
    Ok(())
}

#[test]
fn charset_only_at_the_very_start() -> Result<()> {
    let sheet = author_sheet("@charset \"UTF-8\";\nh1 {}");
    assert!(matches!(sheet.rules()[0].kind, RuleKind::Charset { .. }));

    // anything before it, even whitespace, disqualifies it
    let sheet = author_sheet(" @charset \"UTF-8\";\nh1 {}");
    assert_eq!(sheet.rule_count(), 1);
    assert!(matches!(sheet.rules()[0].kind, RuleKind::Ruleset(_)));
    Ok(())
}

#[test]
fn namespaces_resolve_selector_prefixes() -> Result<()> {
    use sepia_css::selector::SimpleSelector;

    let sheet = author_sheet("@namespace svg url(http://www.w3.org/2000/svg);\nsvg|circle {}");
    assert_eq!(sheet.rule_count(), 2);

    let ruleset = first_ruleset(&sheet);
    let SimpleSelector::Type(qname) = &ruleset.selectors[0].compounds[0].simples[0] else {
        panic!("expected type selector");
    };
    assert_eq!(qname.ns.as_ref().unwrap().as_str(), "http://www.w3.org/2000/svg");
    assert_eq!(qname.local.as_ref().unwrap().as_str(), "circle");

    // undeclared prefix invalidates the rule
    let sheet = author_sheet("bogus|circle {}");
    assert_eq!(sheet.rule_count(), 0);
    Ok(())
}

#[test]
fn font_face_descriptors_are_recorded() -> Result<()> {
    let css = "@font-face {\n\
               font-family: \"Sepia Sans\";\n\
               src: url(sepia.woff) format(\"woff\"), local(\"Sepia Sans\");\n\
               font-weight: bold;\n\
               unicode-range: u+0-7F, u+4??;\n\
               }";
    let sheet = author_sheet(css);

    let RuleKind::FontFace(record) = &sheet.rules()[0].kind else {
        panic!("expected font-face rule");
    };
    assert_eq!(record.family.as_ref().unwrap().as_str(), "Sepia Sans");
    assert_eq!(record.srcs.len(), 2);
    assert_eq!(record.weight, Some(1));
    assert_eq!(record.unicode_ranges, vec![(0, 0x7f), (0x400, 0x4ff)]);
    Ok(())
}

#[test]
fn page_rules_compile_declarations() -> Result<()> {
    use sepia_css::stylesheet::PagePseudo;

    let sheet = author_sheet("@page :first { margin-top: 5cm; }");
    let RuleKind::Page(page) = &sheet.rules()[0].kind else {
        panic!("expected page rule");
    };
    assert_eq!(page.pseudo, Some(PagePseudo::First));

    let decls: Vec<_> = page.style.declarations().collect();
    assert_eq!(decls.len(), 1);
    assert_eq!(bytecode::get_opcode(decls[0].0), PropertyId::MarginTop.opcode());
    assert_eq!(decls[0].1, &[fixed_word("5"), Unit::Cm.word()]);
    Ok(())
}

#[test]
fn inline_style_mode_takes_a_bare_declaration_list() -> Result<()> {
    let mut p = params();
    p.inline_style = true;

    let sheet = parse_str("color: red; margin: 0", p)?;
    assert_eq!(sheet.rule_count(), 1);

    let ruleset = first_ruleset(&sheet);
    assert!(ruleset.selectors.is_empty());
    assert_eq!(ruleset.style.declarations().count(), 5);
    Ok(())
}

#[test]
fn quirks_mode_accepts_unitless_lengths() -> Result<()> {
    let strict = author_sheet("p { width: 5; }");
    assert_eq!(first_ruleset(&strict).style.declarations().count(), 0);
    assert!(!strict.quirks_used());

    let mut p = params();
    p.allow_quirks = true;
    let quirky = parse_str("p { width: 5; }", p)?;
    let decls: Vec<_> = first_ruleset(&quirky).style.declarations().collect();
    assert_eq!(decls.len(), 1);
    assert_eq!(decls[0].1, &[fixed_word("5"), Unit::Px.word()]);
    assert!(quirky.quirks_used());
    Ok(())
}

#[test]
fn needs_data_suspends_between_calls() -> Result<()> {
    let mut sheet = Stylesheet::new(params())?;
    assert_eq!(sheet.append_data(b"h1 { col")?, Status::NeedsData);
    assert_eq!(sheet.append_data(b"or: re")?, Status::NeedsData);
    assert_eq!(sheet.append_data(b"d; }")?, Status::NeedsData);
    sheet.data_done()?;

    assert_eq!(sheet.rule_count(), 1);
    let decls: Vec<_> = first_ruleset(&sheet).style.declarations().collect();
    assert_eq!(decls[0].1, &[0xFFFF0000]);
    Ok(())
}

#[test]
fn unit_category_mismatch_fails_the_declaration() -> Result<()> {
    let sheet = author_sheet("x { width: 5deg; padding-top: 2s; border-top-width: -1px; }");
    assert_eq!(first_ruleset(&sheet).style.declarations().count(), 0);
    Ok(())
}

#[test]
fn every_compiled_buffer_is_self_describing() -> Result<()> {
    let css = "a {\n\
        background: #eee url(bg.png) no-repeat fixed center;\n\
        border: thin solid rgb(1, 2, 3);\n\
        clip: rect(1px, auto, 2px, auto);\n\
        content: \"a\" counter(section, lower-roman) attr(title) open-quote;\n\
        counter-increment: section 2 page;\n\
        cursor: url(a.cur), pointer;\n\
        font: italic bold 12pt/1.5 \"Sepia Serif\", serif;\n\
        list-style: square inside url(dot.png);\n\
        opacity: 0.5;\n\
        outline: invert dotted thick;\n\
        quotes: \"<\" \">\";\n\
        text-decoration: underline overline;\n\
        vertical-align: -2px;\n\
        z-index: -4;\n\
        azimuth: center-left behind;\n\
        play-during: url(song.mid) mix repeat;\n\
        volume: 50%;\n\
        columns: auto 12em;\n\
        }";
    let sheet = author_sheet(css);
    let ruleset = first_ruleset(&sheet);

    assert_well_formed(&ruleset.style);
    // every listed declaration survived
    assert!(ruleset.style.declarations().count() >= 25);
    assert!(sheet.parse_log().is_empty(), "log: {:?}", sheet.parse_log());
    Ok(())
}

#[test]
fn language_level_gates_newer_properties() -> Result<()> {
    let mut p = params();
    p.level = Level::Css21;
    let sheet = parse_str("x { border-radius: 2px; opacity: 0.5; color: red; }", p)?;
    let decls: Vec<_> = first_ruleset(&sheet).style.declarations().collect();

    // only the CSS 2.1 property survives at level 2.1
    assert_eq!(decls.len(), 1);
    assert_eq!(bytecode::get_opcode(decls[0].0), PropertyId::Color.opcode());
    Ok(())
}

#[test]
fn flags_compose_for_important_inherit() -> Result<()> {
    let sheet = author_sheet("x { color: inherit !important; }");
    let decls: Vec<_> = first_ruleset(&sheet).style.declarations().collect();
    assert_eq!(decls.len(), 1);
    let (opv, payload) = decls[0];
    assert!(bytecode::is_important(opv));
    assert!(bytecode::is_inherit(opv));
    assert_eq!(bytecode::get_flags(opv), flags::IMPORTANT | flags::INHERIT);
    assert!(payload.is_empty());
    Ok(())
}
