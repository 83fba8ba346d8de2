use pretty_assertions::assert_eq;
use version_bump::document::{
    get_value, locate, remove_block, set_value, BlockScope, Document, Locator, RemovalOutcome,
    ReplaceStrategy, ValueMode,
};
use version_bump::BumpError;

const HELM_VALUES: &str = "\
# Default values for the chart.
replicaCount: 1

image:
  repository: ghcr.io/org/server
  # Overrides the image tag whose default is the chart appVersion.
  tag: \"v2.4.1\"

sidecars:
  - name: proxy
    image: envoyproxy/envoy:v1.29.0   # keep in sync with mesh
    resources:
      limits:
        cpu: 100m
  - name: exporter
    image: prom/exporter:0.15.0



  - name: retired
    image: org/retired:1.0
";

const PACKAGE_JSON: &str = "{\n  \"name\": \"web\",\n  \"version\": \"3.1.0\",\n  \"private\": true\n}\n";

fn unchanged_lines(before: &str, after: &str, skip: usize) -> bool {
    before
        .lines()
        .zip(after.lines())
        .enumerate()
        .all(|(index, (a, b))| index == skip || a == b)
}

#[test]
fn test_nested_tag_update_touches_one_line() {
    let doc = Document::parse(HELM_VALUES);
    let locator = Locator::path("image.tag");
    assert_eq!(get_value(&doc, &locator).unwrap(), "v2.4.1");

    let (updated, change) = set_value(&doc, &locator, "v2.4.1", "v2.5.0", ValueMode::Plain).unwrap();
    assert_eq!(change.line, 6);
    assert_eq!(updated.line(6), "  tag: \"v2.5.0\"");
    assert!(unchanged_lines(HELM_VALUES, &updated.text(), 6));
    assert_eq!(updated.len(), doc.len());
}

#[test]
fn test_list_item_by_index_and_by_scope_agree() {
    let doc = Document::parse(HELM_VALUES);
    let by_index = locate(&doc, &Locator::path("sidecars.0.image")).unwrap();
    let by_scope = locate(
        &doc,
        &Locator::path("image").within(BlockScope::new("name", "proxy")),
    )
    .unwrap();
    assert_eq!(by_index, by_scope);
    assert_eq!(by_index, 10);
}

#[test]
fn test_composite_update_keeps_comment() {
    let doc = Document::parse(HELM_VALUES);
    let locator = Locator::path("image").within(BlockScope::new("name", "proxy"));

    let (updated, change) =
        set_value(&doc, &locator, "v1.29.0", "v1.30.2", ValueMode::Composite).unwrap();
    assert_eq!(change.strategy, ReplaceStrategy::Exact);
    assert_eq!(
        updated.line(10),
        "    image: envoyproxy/envoy:v1.30.2   # keep in sync with mesh"
    );
}

#[test]
fn test_set_is_idempotent_and_round_trips() {
    let doc = Document::parse(HELM_VALUES);
    let locator = Locator::path("sidecars.1.image");

    let (once, _) = set_value(&doc, &locator, "0.15.0", "0.16.0", ValueMode::Composite).unwrap();
    let (twice, change) = set_value(&once, &locator, "0.15.0", "0.16.0", ValueMode::Composite).unwrap();

    assert_eq!(once.text(), twice.text());
    assert_eq!(change.strategy, ReplaceStrategy::Unchanged);
    assert_eq!(get_value(&twice, &locator).unwrap(), "prom/exporter:0.16.0");
}

#[test]
fn test_remove_block_keeps_siblings_byte_identical() {
    let doc = Document::parse(HELM_VALUES);
    let (updated, outcome) = remove_block(&doc, "name", "exporter").unwrap();

    assert_eq!(outcome, RemovalOutcome::Removed { start_line: 14, line_count: 2 });
    assert_eq!(
        updated.text(),
        "\
# Default values for the chart.
replicaCount: 1

image:
  repository: ghcr.io/org/server
  # Overrides the image tag whose default is the chart appVersion.
  tag: \"v2.4.1\"

sidecars:
  - name: proxy
    image: envoyproxy/envoy:v1.29.0   # keep in sync with mesh
    resources:
      limits:
        cpu: 100m

  - name: retired
    image: org/retired:1.0
"
    );
}

#[test]
fn test_remove_block_is_idempotent() {
    let doc = Document::parse(HELM_VALUES);
    let (once, _) = remove_block(&doc, "name", "retired").unwrap();
    let (twice, outcome) = remove_block(&once, "name", "retired").unwrap();
    assert_eq!(outcome, RemovalOutcome::NotFound);
    assert_eq!(once, twice);
}

#[test]
fn test_json_document() {
    let doc = Document::parse(PACKAGE_JSON);
    let locator = Locator::path("version");
    assert_eq!(get_value(&doc, &locator).unwrap(), "3.1.0");

    let (updated, _) = set_value(&doc, &locator, "3.1.0", "3.2.0", ValueMode::Plain).unwrap();
    assert_eq!(
        updated.text(),
        "{\n  \"name\": \"web\",\n  \"version\": \"3.2.0\",\n  \"private\": true\n}\n"
    );
}

#[test]
fn test_missing_path_is_not_found() {
    let doc = Document::parse(HELM_VALUES);
    let err = locate(&doc, &Locator::path("image.digest")).unwrap_err();
    assert!(matches!(err, BumpError::NotFound { .. }));

    let err = locate(
        &doc,
        &Locator::path("image").within(BlockScope::new("name", "nope")),
    )
    .unwrap_err();
    assert!(matches!(err, BumpError::NotFound { .. }));
}

#[test]
fn test_nested_map_is_not_a_scalar_target() {
    let doc = Document::parse(HELM_VALUES);
    let err = locate(&doc, &Locator::path("image")).unwrap_err();
    assert!(matches!(err, BumpError::AmbiguousMatch { .. }));
}
