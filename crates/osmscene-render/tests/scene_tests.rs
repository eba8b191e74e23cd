//! Integration tests for scene building through the style scene manager.

use osmscene_geo::{
    CancelToken, DataSource, DataSourceError, GeoBox, GeoCoordinate, GeoObject, MemoryDataSource, ObjectId,
    ObjectKey, ObjectKind, RelationMember, TagsCollection, WebMercator,
};
use osmscene_render::{
    FillReport, LineCap, LineJoin, Primitive, Rect, Scalar, SceneConfig, SceneError, StyleInterner, StyleSceneManager,
    TextHalo,
};
use osmscene_style::{ColorValue, Declaration, Rule, Selector, SelectorType, StyleSheet, StyleValue, TagCondition};
use proptest::prelude::*;

fn tags(pairs: &[(&str, &str)]) -> TagsCollection {
    pairs.iter().copied().collect()
}

fn text(value: &str) -> StyleValue {
    StyleValue::Text(value.to_string())
}

/// A closed square way of side `size` degrees with its south-west corner at
/// `(lat, lon)`.
fn square(id: i64, lat: f64, lon: f64, size: f64, pairs: &[(&str, &str)]) -> GeoObject {
    GeoObject::way(
        id,
        vec![
            GeoCoordinate::new(lat, lon),
            GeoCoordinate::new(lat, lon + size),
            GeoCoordinate::new(lat + size, lon + size),
            GeoCoordinate::new(lat + size, lon),
            GeoCoordinate::new(lat, lon),
        ],
        tags(pairs),
    )
}

fn road(id: i64, lat: f64, lon: f64, pairs: &[(&str, &str)]) -> GeoObject {
    GeoObject::way(
        id,
        vec![GeoCoordinate::new(lat, lon), GeoCoordinate::new(lat + 0.01, lon + 0.01)],
        tags(pairs),
    )
}

fn bbox(south: f64, west: f64, north: f64, east: f64) -> GeoBox {
    GeoBox::new(GeoCoordinate::new(south, west), GeoCoordinate::new(north, east))
}

/// Base style: buildings from zoom 14, highways with casing and labels,
/// amenities as icons, a black canvas.
fn city_style() -> StyleSheet {
    StyleSheet::new(vec![
        Rule::new(
            Selector::new(SelectorType::Canvas),
            vec![Declaration::new("fill-color", text("#000000"))],
        ),
        Rule::new(
            Selector::new(SelectorType::Area)
                .with_zoom(Some(14), None)
                .with_rule(TagCondition::exists("building")),
            vec![Declaration::new("fill-color", text("grey"))],
        ),
        Rule::new(
            Selector::new(SelectorType::Line).with_rule(TagCondition::exists("highway")),
            vec![
                Declaration::new("color", text("white")),
                Declaration::new("width", StyleValue::Number(4.0)),
                Declaration::new("z-index", StyleValue::Number(2.0)),
                Declaration::new("text", StyleValue::Tag("name".into())),
            ],
        ),
        Rule::new(
            Selector::new(SelectorType::Line).with_rule(TagCondition::equals("highway", "primary")),
            vec![
                Declaration::new("casing-width", StyleValue::Number(1.0)),
                Declaration::new("casing-color", text("#999999")),
            ],
        ),
        Rule::new(
            Selector::new(SelectorType::Node).with_rule(TagCondition::exists("amenity")),
            vec![
                Declaration::new("icon-image", text("amenity.png")),
                Declaration::new("z-index", StyleValue::Number(5.0)),
            ],
        ),
    ])
}

fn city() -> MemoryDataSource {
    let mut source = MemoryDataSource::new();
    source.add(square(1, 51.0, 3.7, 0.001, &[("building", "yes")]));
    source.add(road(2, 51.0, 3.7, &[("highway", "primary"), ("name", "Veldstraat")]));
    source.add(road(3, 51.002, 3.702, &[("highway", "residential")]));
    source.add(GeoObject::node(4, GeoCoordinate::new(51.001, 3.701), tags(&[("amenity", "cafe")])));
    source
}

fn manager() -> StyleSceneManager {
    StyleSceneManager::new(city_style(), SceneConfig::default()).unwrap()
}

fn fill(manager: &mut StyleSceneManager, source: &impl DataSource, bbox: &GeoBox) -> FillReport {
    manager.fill_scene(source, bbox, &WebMercator::default(), &CancelToken::new())
}

fn everything() -> Rect {
    Rect::new(-1.0, -1.0, 257.0, 257.0)
}

fn keys_at(manager: &StyleSceneManager, zoom: f32) -> Vec<i64> {
    manager
        .scene()
        .get(&everything(), zoom)
        .iter()
        .map(|p| p.key().id.0)
        .collect()
}

fn band_counts(manager: &StyleSceneManager) -> Vec<usize> {
    let scene = manager.scene();
    scene.zoom_bands().map(|band| scene.primitive_count(band)).collect()
}

#[test]
fn test_building_restricted_to_higher_bands() {
    let mut manager = manager();
    let _ = fill(&mut manager, &city(), &bbox(50.9, 3.6, 51.1, 3.8));
    let scene = manager.scene();

    assert_eq!(scene.band_for(13.0), Some(12.0));
    assert!(keys_at(&manager, 16.0).contains(&1));
    assert!(keys_at(&manager, 14.0).contains(&1));
    assert!(!keys_at(&manager, 13.0).contains(&1));
    assert!(!keys_at(&manager, 12.0).contains(&1));
    assert!(keys_at(&manager, 13.0).contains(&2));
}

#[test]
fn test_get_uses_nearest_lower_band() {
    let mut manager = manager();
    let _ = fill(&mut manager, &city(), &bbox(50.9, 3.6, 51.1, 3.8));
    let scene = manager.scene();

    let visible = scene.get(&everything(), 13.0);
    assert_eq!(visible.band(), Some(12.0));
    assert_eq!(visible.len(), scene.primitive_count(12.0));
    assert!(scene.primitive_count(14.0) > visible.len());
    assert!(scene.get(&everything(), 9.0).is_empty());
}

#[test]
fn test_fill_twice_is_idempotent() {
    let mut manager = manager();
    let source = city();
    let area = bbox(50.9, 3.6, 51.1, 3.8);
    let first = fill(&mut manager, &source, &area);
    let counts = band_counts(&manager);

    let second = fill(&mut manager, &source, &area);
    assert!(first.primitives_added > 0);
    assert_eq!(second.primitives_added, 0);
    assert_eq!(second.bands_skipped, 4);
    assert_eq!(band_counts(&manager), counts);
}

#[test]
fn test_overlapping_fill_adds_only_new_objects() {
    let mut manager = manager();
    let source = city();
    // Covers the building and the first road only.
    let _ = fill(&mut manager, &source, &bbox(50.999, 3.699, 51.0005, 3.7005));
    let partial = band_counts(&manager);

    let _ = fill(&mut manager, &source, &bbox(50.9, 3.6, 51.1, 3.8));
    let mut fresh = self::manager();
    let _ = fill(&mut fresh, &source, &bbox(50.9, 3.6, 51.1, 3.8));

    assert_eq!(band_counts(&manager), band_counts(&fresh));
    assert!(partial.iter().zip(band_counts(&manager)).all(|(a, b)| *a < b));
}

#[test]
fn test_disjoint_fills_union() {
    let mut source = MemoryDataSource::new();
    source.add(square(10, 10.0, 10.0, 0.01, &[("building", "yes")]));
    source.add(square(20, -10.0, -10.0, 0.01, &[("building", "yes")]));
    let mut manager = manager();

    let _ = fill(&mut manager, &source, &bbox(9.0, 9.0, 11.0, 11.0));
    assert_eq!(keys_at(&manager, 16.0), vec![10]);

    let _ = fill(&mut manager, &source, &bbox(-11.0, -11.0, -9.0, -9.0));
    let mut keys = keys_at(&manager, 16.0);
    keys.sort_unstable();
    assert_eq!(keys, vec![10, 20]);
}

#[test]
fn test_identical_line_styles_share_an_id() {
    let mut source = MemoryDataSource::new();
    source.add(road(1, 51.0, 3.7, &[("highway", "residential")]));
    source.add(road(2, 51.1, 3.8, &[("highway", "service")]));
    source.add(road(3, 51.2, 3.9, &[("highway", "primary")]));
    let mut manager = manager();
    let _ = fill(&mut manager, &source, &bbox(50.0, 3.0, 52.0, 4.0));

    let scene = manager.scene();
    let visible = scene.get(&everything(), 16.0);
    let line_id = |id: i64| {
        visible
            .iter()
            .filter_map(|p| match p {
                Primitive::Line { key, style, .. } if key.id.0 == id => Some(style.id()),
                _ => None,
            })
            .last()
    };
    assert_eq!(line_id(1), line_id(2));
    // The primary road's main line has the same stroke; only its casing differs.
    assert_eq!(line_id(1), line_id(3));
    // casing + residential stroke
    assert_eq!(manager.styles().lines.len(), 2);
}

#[test]
fn test_casing_is_drawn_below_its_line() {
    let mut source = MemoryDataSource::new();
    source.add(road(1, 51.0, 3.7, &[("highway", "primary")]));
    let mut manager = manager();
    let _ = fill(&mut manager, &source, &bbox(50.0, 3.0, 52.0, 4.0));

    let scene = manager.scene();
    let widths: Vec<f32> = scene
        .get(&everything(), 16.0)
        .iter()
        .filter_map(|p| match p {
            Primitive::Line { style, .. } => Some(style.style().width.get()),
            _ => None,
        })
        .collect();
    assert_eq!(widths, vec![6.0, 4.0]);
}

#[test]
fn test_label_needs_its_tag() {
    let mut manager = manager();
    let _ = fill(&mut manager, &city(), &bbox(50.9, 3.6, 51.1, 3.8));
    let scene = manager.scene();
    let labels: Vec<(i64, String)> = scene
        .get(&everything(), 16.0)
        .iter()
        .filter_map(|p| match p {
            Primitive::Text { key, text, .. } => Some((key.id.0, text.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(labels, vec![(2, "Veldstraat".to_string())]);
}

#[test]
fn test_drawing_order_follows_z_index() {
    let mut manager = manager();
    let _ = fill(&mut manager, &city(), &bbox(50.9, 3.6, 51.1, 3.8));
    let scene = manager.scene();
    let visible = scene.get(&everything(), 16.0);
    let z: Vec<f32> = visible.iter().map(Primitive::z_index).collect();
    assert!(z.windows(2).all(|w| w[0] <= w[1]), "{z:?}");
    assert!(matches!(visible.iter().last(), Some(Primitive::Icon { .. })));
}

#[test]
fn test_back_color_from_canvas() {
    assert_eq!(manager().scene().back_color(), Some(ColorValue::BLACK));
    let plain = StyleSceneManager::new(StyleSheet::default(), SceneConfig::default()).unwrap();
    assert_eq!(plain.scene().back_color(), None);
}

#[test]
fn test_opacity_folds_into_alpha() {
    let style = StyleSheet::new(vec![Rule::new(
        Selector::new(SelectorType::Area),
        vec![
            Declaration::new("fill-color", text("#ff0000")),
            Declaration::new("fill-opacity", StyleValue::Number(0.5)),
        ],
    )]);
    let mut source = MemoryDataSource::new();
    source.add(square(1, 0.0, 0.0, 0.01, &[("landuse", "grass")]));
    let mut manager = StyleSceneManager::new(style, SceneConfig::default()).unwrap();
    let _ = fill(&mut manager, &source, &bbox(-1.0, -1.0, 1.0, 1.0));

    let scene = manager.scene();
    let visible = scene.get(&everything(), 16.0);
    let Some(Primitive::Polygon { style, .. }) = visible.iter().next() else {
        panic!("expected a polygon");
    };
    assert_eq!(style.style().fill_color.a, 128);
}

#[test]
fn test_unusable_value_drops_only_that_property() {
    let style = StyleSheet::new(vec![Rule::new(
        Selector::new(SelectorType::Way),
        vec![
            Declaration::new("color", text("blue")),
            Declaration::new("width", text("wide")),
        ],
    )]);
    let mut source = MemoryDataSource::new();
    source.add(road(1, 0.0, 0.0, &[]));
    let mut manager = StyleSceneManager::new(style, SceneConfig::default()).unwrap();
    let report = fill(&mut manager, &source, &bbox(-1.0, -1.0, 1.0, 1.0));

    assert_eq!(report.primitives_added, 4);
    let scene = manager.scene();
    let visible = scene.get(&everything(), 16.0);
    let Some(Primitive::Line { style, .. }) = visible.iter().next() else {
        panic!("expected a line");
    };
    assert!((style.style().width.get() - 1.0).abs() < f32::EPSILON);
}

#[test]
fn test_relations_are_not_drawn() {
    let style = StyleSheet::new(vec![Rule::new(
        Selector::new(SelectorType::Relation),
        vec![Declaration::new("fill-color", text("red"))],
    )]);
    let mut source = MemoryDataSource::new();
    source.add(square(1, 0.0, 0.0, 0.01, &[]));
    source.add(GeoObject::relation(
        2,
        vec![RelationMember {
            member: ObjectKey {
                kind: ObjectKind::Way,
                id: ObjectId(1),
            },
            role: "outer".to_string(),
        }],
        tags(&[("type", "multipolygon"), ("landuse", "forest")]),
    ));
    let mut manager = StyleSceneManager::new(style, SceneConfig::default()).unwrap();
    let report = fill(&mut manager, &source, &bbox(-1.0, -1.0, 1.0, 1.0));
    assert_eq!(report.objects, 2);
    assert_eq!(report.primitives_added, 0);
}

/// Primitives at zoom 16 after filling `objects` near the origin.
fn draw(rules: Vec<Rule>, config: SceneConfig, objects: Vec<GeoObject>) -> Vec<Primitive> {
    let mut source = MemoryDataSource::new();
    for object in objects {
        source.add(object);
    }
    let mut manager = StyleSceneManager::new(StyleSheet::new(rules), config).unwrap();
    let _ = fill(&mut manager, &source, &bbox(-1.0, -1.0, 1.0, 1.0));
    manager.scene().get(&everything(), 16.0).iter().cloned().collect()
}

fn node_at(id: i64, pairs: &[(&str, &str)]) -> GeoObject {
    GeoObject::node(id, GeoCoordinate::new(0.0, f64::from(id as i32) * 0.01), tags(pairs))
}

fn node_rule(declarations: Vec<Declaration>) -> Rule {
    Rule::new(Selector::new(SelectorType::Node), declarations)
}

fn way_rule(declarations: Vec<Declaration>) -> Rule {
    Rule::new(Selector::new(SelectorType::Way), declarations)
}

fn red() -> ColorValue {
    ColorValue::parse("red").unwrap()
}

fn lines(primitives: &[Primitive]) -> Vec<osmscene_render::LineStyle> {
    primitives
        .iter()
        .filter_map(|p| match p {
            Primitive::Line { style, .. } => Some(style.style().clone()),
            _ => None,
        })
        .collect()
}

fn texts(primitives: &[Primitive]) -> Vec<(String, osmscene_render::TextStyle)> {
    primitives
        .iter()
        .filter_map(|p| match p {
            Primitive::Text { text, style, .. } => Some((text.clone(), style.style().clone())),
            _ => None,
        })
        .collect()
}

#[test]
fn test_numeric_looking_tags_label_verbatim() {
    let drawn = draw(
        vec![node_rule(vec![
            Declaration::new("text", StyleValue::Tag("ref".into())),
            Declaration::new("z-index", StyleValue::Tag("layer".into())),
        ])],
        SceneConfig::default(),
        vec![
            node_at(1, &[("ref", "007"), ("layer", "2")]),
            node_at(2, &[("ref", "1.50")]),
            node_at(3, &[("ref", "1e3")]),
            node_at(4, &[("ref", "+5")]),
        ],
    );
    let mut labels: Vec<String> = texts(&drawn).into_iter().map(|(text, _)| text).collect();
    labels.sort();
    assert_eq!(labels, vec!["+5", "007", "1.50", "1e3"]);

    let leading_zero = drawn
        .iter()
        .find(|p| matches!(p, Primitive::Text { text, .. } if text == "007"))
        .map(Primitive::z_index);
    assert_eq!(leading_zero, Some(2.0));
}

#[test]
fn test_labels_below_minimum_font_size_are_dropped() {
    let rules = vec![
        node_rule(vec![Declaration::new("text", text("Station"))]),
        Rule::new(
            Selector::new(SelectorType::Node).with_rule(TagCondition::exists("minor")),
            vec![Declaration::new("font-size", StyleValue::Number(4.0))],
        ),
    ];
    let objects = || vec![node_at(1, &[]), node_at(2, &[("minor", "yes")])];

    let labels = texts(&draw(rules.clone(), SceneConfig::default(), objects()));
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].1.font_size, Scalar::new(SceneConfig::default().default_font_size));

    let permissive = SceneConfig {
        min_label_font_size: 3.0,
        ..SceneConfig::default()
    };
    let mut sizes: Vec<f32> = texts(&draw(rules, permissive, objects()))
        .iter()
        .map(|(_, style)| style.font_size.get())
        .collect();
    sizes.sort_by(f32::total_cmp);
    assert_eq!(sizes, vec![4.0, 10.0]);
}

#[test]
fn test_text_halo() {
    let label = |extra: Vec<Declaration>| {
        let mut declarations = vec![Declaration::new("text", text("Markt"))];
        declarations.extend(extra);
        let drawn = draw(vec![node_rule(declarations)], SceneConfig::default(), vec![node_at(1, &[])]);
        texts(&drawn).pop().map(|(_, style)| style.halo)
    };

    assert_eq!(label(Vec::new()), Some(None));
    assert_eq!(
        label(vec![Declaration::new("text-halo-radius", StyleValue::Number(0.0))]),
        Some(None)
    );
    assert_eq!(
        label(vec![Declaration::new("text-halo-radius", StyleValue::Number(2.0))]),
        Some(Some(TextHalo {
            color: ColorValue::WHITE,
            radius: Scalar::new(2.0),
        }))
    );
    assert_eq!(
        label(vec![
            Declaration::new("text-halo-radius", StyleValue::Number(1.5)),
            Declaration::new("text-halo-color", text("red")),
        ]),
        Some(Some(TextHalo {
            color: red(),
            radius: Scalar::new(1.5),
        }))
    );
}

#[test]
fn test_dash_patterns() {
    let dashes = |value: StyleValue| {
        let drawn = draw(
            vec![way_rule(vec![
                Declaration::new("color", text("blue")),
                Declaration::new("dashes", value),
            ])],
            SceneConfig::default(),
            vec![road(1, 0.0, 0.0, &[])],
        );
        let strokes = lines(&drawn);
        assert_eq!(strokes.len(), 1, "the line is drawn whatever its dashes");
        strokes[0].dashes.iter().copied().map(Scalar::get).collect::<Vec<f32>>()
    };

    assert_eq!(dashes(text("4,2")), vec![4.0, 2.0]);
    assert_eq!(dashes(StyleValue::Numbers(vec![6.0, 3.0, 1.0, 3.0])), vec![6.0, 3.0, 1.0, 3.0]);
    assert!(dashes(text("4,-2")).is_empty());
    assert!(dashes(StyleValue::Number(0.0)).is_empty());
    assert!(dashes(text("dotted")).is_empty());
}

#[test]
fn test_line_cap_and_join_keywords() {
    let stroke = |cap: &str, join: &str| {
        let drawn = draw(
            vec![way_rule(vec![
                Declaration::new("color", text("blue")),
                Declaration::new("linecap", text(cap)),
                Declaration::new("linejoin", text(join)),
            ])],
            SceneConfig::default(),
            vec![road(1, 0.0, 0.0, &[])],
        );
        let line = lines(&drawn).pop().unwrap();
        (line.line_cap, line.line_join)
    };

    assert_eq!(stroke("none", "bevel"), (LineCap::Butt, LineJoin::Bevel));
    assert_eq!(stroke("square", "miter"), (LineCap::Square, LineJoin::Miter));
    assert_eq!(stroke(" round ", "round"), (LineCap::Round, LineJoin::Round));
    assert_eq!(stroke("pointy", "jagged"), (LineCap::default(), LineJoin::default()));
}

#[test]
fn test_node_point_from_color_or_width() {
    let point = |declarations: Vec<Declaration>| {
        let drawn = draw(vec![node_rule(declarations)], SceneConfig::default(), vec![node_at(1, &[])]);
        drawn.iter().find_map(|p| match p {
            Primitive::Point { style, .. } => Some((style.style().color, style.style().size.get())),
            _ => None,
        })
    };

    assert_eq!(point(vec![Declaration::new("color", text("red"))]), Some((red(), 1.0)));
    assert_eq!(
        point(vec![Declaration::new("width", StyleValue::Number(3.0))]),
        Some((ColorValue::BLACK, 3.0))
    );
    assert_eq!(point(vec![Declaration::new("z-index", StyleValue::Number(1.0))]), None);
}

#[test]
fn test_area_outline_needs_color() {
    let area = |declarations: Vec<Declaration>| {
        draw(
            vec![Rule::new(Selector::new(SelectorType::Area), declarations)],
            SceneConfig::default(),
            vec![square(1, 0.0, 0.0, 0.01, &[("landuse", "grass")])],
        )
    };

    let filled = area(vec![Declaration::new("fill-color", text("green"))]);
    assert_eq!(filled.len(), 1);
    assert!(matches!(filled[0], Primitive::Polygon { .. }));

    let outlined = area(vec![
        Declaration::new("fill-color", text("green")),
        Declaration::new("color", text("red")),
        Declaration::new("width", StyleValue::Number(2.0)),
    ]);
    assert_eq!(outlined.len(), 2);
    assert!(matches!(outlined[0], Primitive::Polygon { .. }));
    let outline = lines(&outlined);
    assert_eq!(outline.len(), 1);
    assert_eq!(outline[0].color, red());
    assert_eq!(outline[0].width, Scalar::new(2.0));

    let bare = area(vec![Declaration::new("color", text("red"))]);
    assert_eq!(lines(&bare).len(), 1);
    assert!(!bare.iter().any(|p| matches!(p, Primitive::Polygon { .. })));
}

/// A data source whose backing store is gone.
struct Offline;

impl DataSource for Offline {
    fn query(&self, _bbox: &GeoBox, _cancel: &CancelToken) -> Result<Vec<std::sync::Arc<GeoObject>>, DataSourceError> {
        Err(DataSourceError::Unavailable("disk detached".into()))
    }
}

#[test]
fn test_failed_query_leaves_box_uncovered() {
    let mut manager = manager();
    let area = bbox(50.9, 3.6, 51.1, 3.8);
    let failed = fill(&mut manager, &Offline, &area);
    assert!(failed.query_failed);
    assert_eq!(failed.bands_filled, 0);
    assert!(manager.scene().is_empty());

    let retried = fill(&mut manager, &city(), &area);
    assert_eq!(retried.bands_filled, 4);
    assert!(!manager.scene().is_empty());
}

#[test]
fn test_invalid_bands_fail_at_construction() {
    let config = SceneConfig::default().with_zoom_bands([10.0, 12.0]);
    assert!(matches!(
        StyleSceneManager::new(city_style(), config),
        Err(SceneError::NonDescendingZoomBands { .. })
    ));
    let empty = SceneConfig::default().with_zoom_bands(Vec::new());
    assert_eq!(
        StyleSceneManager::new(city_style(), empty).err(),
        Some(SceneError::NoZoomBands)
    );
}

proptest! {
    #[test]
    fn prop_interning_identity(
        a in (0u32..4, 1u8..4),
        b in (0u32..4, 1u8..4),
    ) {
        let line = |(color, width): (u32, u8)| osmscene_render::LineStyle {
            color: ColorValue::from_rgb(color),
            width: f32::from(width).into(),
            dashes: Vec::new(),
            line_cap: LineCap::default(),
            line_join: LineJoin::default(),
            z_index: 0.0_f32.into(),
        };
        let mut interner = StyleInterner::new();
        let first = interner.intern(line(a));
        let second = interner.intern(line(b));
        prop_assert_eq!(first == second, a == b);
        prop_assert_eq!(first.id() == second.id(), line(a) == line(b));
    }
}
