//! Pure tree-transformation properties: no archives, no disk.

use std::path::PathBuf;

use kmzkit::{Element, Error, expand_overlays, parse_kml, write_kml};

const TEMPLATE_KML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <name>Original</name>
    <GroundOverlay>
      <name>N56E29-001</name>
      <color>a0ffffff</color>
      <Icon>
        <href>base.png</href>
      </Icon>
      <LatLonBox>
        <north>56.5</north>
        <south>56.0</south>
        <east>29.5</east>
        <west>29.0</west>
      </LatLonBox>
    </GroundOverlay>
  </Document>
</kml>"#;

fn assets(names: &[&str]) -> Vec<PathBuf> {
    names.iter().map(PathBuf::from).collect()
}

fn overlay_names(group: &Element) -> Vec<String> {
    group
        .find_all("GroundOverlay")
        .iter()
        .map(|ov| ov.find_text("name").unwrap_or_default())
        .collect()
}

fn overlay_hrefs(group: &Element) -> Vec<String> {
    group
        .find_all("GroundOverlay")
        .iter()
        .map(|ov| ov.find_text("href").unwrap_or_default())
        .collect()
}

#[test]
fn tile_set_expands_sorts_and_dedups() {
    let mut root = parse_kml(TEMPLATE_KML).expect("parse template");
    let report = expand_overlays(
        &mut root,
        &assets(&["base.png", "N56E29-002.png", "N56E29-010.png"]),
        "N56E29",
    )
    .expect("expand");

    assert_eq!(report.template_asset.as_deref(), Some("base.png"));
    assert!(report.duplicate_skipped);
    assert_eq!(report.cloned, 2);
    assert_eq!(report.overlay_count, 3);

    let group = root.find("Document").expect("group");
    assert_eq!(group.child("name").unwrap().text(), "N56E29");
    assert_eq!(
        overlay_names(group),
        vec!["N56E29-001", "N56E29-002", "N56E29-010"]
    );
    assert_eq!(
        overlay_hrefs(group),
        vec!["base.png", "N56E29/N56E29-002.png", "N56E29/N56E29-010.png"]
    );
}

#[test]
fn dedup_never_duplicates_the_template_asset() {
    let mut root = parse_kml(TEMPLATE_KML).unwrap();
    expand_overlays(&mut root, &assets(&["base.png"]), "N56E29").unwrap();

    let referencing_base: Vec<_> = root
        .find_all("GroundOverlay")
        .into_iter()
        .filter(|ov| ov.find_text("href").is_some_and(|h| h.ends_with("base.png")))
        .collect();
    assert_eq!(referencing_base.len(), 1);
}

#[test]
fn completeness_one_overlay_per_asset() {
    for n in 1usize..=5 {
        let names: Vec<String> = (1..n).map(|i| format!("N56E29-{i:03}.png")).collect();
        let mut all: Vec<&str> = vec!["base.png"];
        all.extend(names.iter().map(String::as_str));

        let mut root = parse_kml(TEMPLATE_KML).unwrap();
        let report = expand_overlays(&mut root, &assets(&all), "N56E29").unwrap();
        assert_eq!(report.overlay_count, n);
        assert_eq!(root.find_all("GroundOverlay").len(), n);
    }
}

#[test]
fn unparseable_names_sort_last_in_insertion_order() {
    let mut root = parse_kml(TEMPLATE_KML).unwrap();
    expand_overlays(
        &mut root,
        &assets(&["zebra.png", "N56E29-002.png", "alpha.png"]),
        "N56E29",
    )
    .unwrap();

    // template (001) and 002 first; zebra/alpha keep clone order after them
    let group = root.find("Document").unwrap();
    assert_eq!(
        overlay_names(group),
        vec!["N56E29-001", "N56E29-002", "zebra", "alpha"]
    );
}

#[test]
fn folder_group_is_reused_not_replaced() {
    let kml = TEMPLATE_KML.replace("Document", "Folder");
    let mut root = parse_kml(&kml).unwrap();
    expand_overlays(&mut root, &assets(&["base.png", "N56E29-002.png"]), "N56E29").unwrap();

    assert!(root.find("Document").is_none());
    let folder = root.find("Folder").expect("folder kept");
    assert_eq!(folder.child("name").unwrap().text(), "N56E29");
    assert_eq!(folder.find_all("GroundOverlay").len(), 2);
}

#[test]
fn document_preferred_over_folder() {
    let kml = r#"<kml xmlns="http://www.opengis.net/kml/2.2">
  <Folder><name>f</name></Folder>
  <Document>
    <GroundOverlay><name>t-1</name><Icon><href>base.png</href></Icon></GroundOverlay>
  </Document>
</kml>"#;
    let mut root = parse_kml(kml).unwrap();
    expand_overlays(&mut root, &assets(&["a-2.png"]), "unit").unwrap();

    assert_eq!(root.find("Document").unwrap().child("name").unwrap().text(), "unit");
    // the folder is untouched
    assert_eq!(root.find("Folder").unwrap().child("name").unwrap().text(), "f");
}

#[test]
fn missing_group_is_synthesized_and_overlays_reparented() {
    let kml = r#"<kml xmlns="http://www.opengis.net/kml/2.2">
  <GroundOverlay>
    <name>N56E29-003</name>
    <Icon><href>base.png</href></Icon>
  </GroundOverlay>
</kml>"#;
    let mut root = parse_kml(kml).unwrap();
    expand_overlays(&mut root, &assets(&["base.png", "N56E29-001.png"]), "N56E29").unwrap();

    let docs = root.find_all("Document");
    assert_eq!(docs.len(), 1, "exactly one synthesized group");
    let group = docs[0];
    assert_eq!(group.child("name").unwrap().text(), "N56E29");
    assert_eq!(group.find_all("GroundOverlay").len(), 2);
    // nothing left outside the group
    assert_eq!(root.find_all("GroundOverlay").len(), 2);
    assert_eq!(overlay_names(group), vec!["N56E29-001", "N56E29-003"]);
}

#[test]
fn group_name_created_when_absent() {
    let kml = r#"<kml><Document>
  <GroundOverlay><name>x-1</name><Icon><href>a.png</href></Icon></GroundOverlay>
</Document></kml>"#;
    let mut root = parse_kml(kml).unwrap();
    expand_overlays(&mut root, &assets(&["a.png"]), "unit").unwrap();
    assert_eq!(root.find("Document").unwrap().child("name").unwrap().text(), "unit");
}

#[test]
fn clone_carries_geometry_verbatim() {
    let mut root = parse_kml(TEMPLATE_KML).unwrap();
    expand_overlays(&mut root, &assets(&["base.png", "N56E29-002.png"]), "N56E29").unwrap();

    for overlay in root.find_all("GroundOverlay") {
        assert_eq!(overlay.find_text("north"), Some("56.5".into()));
        assert_eq!(overlay.find_text("color"), Some("a0ffffff".into()));
    }
}

#[test]
fn no_overlay_is_an_explicit_error() {
    let mut root = parse_kml("<kml><Document><name>empty</name></Document></kml>").unwrap();
    let err = expand_overlays(&mut root, &assets(&["a.png"]), "unit").unwrap_err();
    assert!(matches!(err, Error::NoOverlayFound));
}

#[test]
fn transformed_document_survives_serialization() {
    let mut root = parse_kml(TEMPLATE_KML).unwrap();
    expand_overlays(&mut root, &assets(&["base.png", "N56E29-002.png"]), "N56E29").unwrap();

    let bytes = write_kml(&root).expect("serialize");
    let reparsed = parse_kml(&String::from_utf8(bytes).unwrap()).expect("reparse");
    let group = reparsed.find("Document").unwrap();
    assert_eq!(overlay_names(group), vec!["N56E29-001", "N56E29-002"]);
    assert_eq!(
        overlay_hrefs(group),
        vec!["base.png", "N56E29/N56E29-002.png"]
    );
}
