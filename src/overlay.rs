//! Ground-overlay document transformation.
//!
//! [`expand_overlays`] is the pure half: it rewrites a parsed KML tree so
//! that one template `GroundOverlay` becomes one overlay per image asset,
//! grouped, named, and ordered. [`copy_assets`] is the side-effecting half:
//! it copies the image files into the container's working directory. Keeping
//! them separate lets the tree transformation be tested without disk I/O.

use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::kml::Element;
use crate::util::{SORT_KEY_SENTINEL, trailing_number};

/// What [`expand_overlays`] did to the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandReport {
    /// Filename the template overlay's `<Icon><href>` pointed at, if any.
    pub template_asset: Option<String>,
    /// Overlay nodes cloned from the template.
    pub cloned: usize,
    /// Whether an input asset matched the template's filename and was not
    /// duplicated as a new node.
    pub duplicate_skipped: bool,
    /// Direct `GroundOverlay` children of the group after reordering.
    pub overlay_count: usize,
}

/// Expand a single-template overlay document across a set of image assets.
///
/// Given the root element of a parsed KML document:
///
/// 1. The first `GroundOverlay` anywhere in the tree is the template;
///    [`Error::NoOverlayFound`] if there is none.
/// 2. The group node is the first `Document`, else the first `Folder`; when
///    neither exists a `Document` is synthesized under the root and every
///    existing overlay is re-parented into it.
/// 3. The group's `<name>` becomes `unit_name`.
/// 4. Each asset whose filename differs from the template's current asset
///    gets a deep clone of the template with `<Icon><href>` rewritten to
///    `<unit_name>/<filename>` and `<name>` to the filename without its
///    extension. An asset matching the template is not duplicated.
/// 5. The group's overlay children are stable-sorted by the trailing number
///    in their `<name>` (names without one sort last, in insertion order).
///
/// No filesystem access: asset paths are only read for their filenames.
pub fn expand_overlays(
    root: &mut Element,
    assets: &[PathBuf],
    unit_name: &str,
) -> Result<ExpandReport> {
    let template = root
        .find("GroundOverlay")
        .cloned()
        .ok_or(Error::NoOverlayFound)?;

    if root.find("Document").is_none() && root.find("Folder").is_none() {
        tracing::debug!("no Document or Folder in KML; synthesizing one");
        let overlays = root.take_all("GroundOverlay");
        let mut group = Element::new("Document");
        for overlay in overlays {
            group.append_child(overlay);
        }
        root.append_child(group);
    }
    let group = find_group_mut(root)
        .ok_or_else(|| Error::InvalidKml("group node missing after synthesis".into()))?;

    group.set_child_text("name", unit_name);

    let template_asset = template
        .find("Icon")
        .and_then(|icon| icon.child("href"))
        .map(|href| basename(href.text().trim()).to_string())
        .filter(|name| !name.is_empty());

    let mut report = ExpandReport {
        template_asset: template_asset.clone(),
        cloned: 0,
        duplicate_skipped: false,
        overlay_count: 0,
    };

    for asset in assets {
        let filename = asset.file_name().map(|f| f.to_string_lossy().to_string());
        let Some(filename) = filename else { continue };

        if template_asset.as_deref() == Some(filename.as_str()) {
            // The template overlay already covers this asset.
            report.duplicate_skipped = true;
            continue;
        }

        let mut clone = template.clone();
        if let Some(icon) = clone.find_mut("Icon")
            && let Some(href) = icon.child_mut("href")
        {
            href.set_text(format!("{unit_name}/{filename}"));
        }
        if let Some(name) = clone.find_mut("name") {
            name.set_text(stem(&filename));
        }
        group.append_child(clone);
        report.cloned += 1;
    }

    reorder_overlays(group);
    report.overlay_count = group
        .children
        .iter()
        .filter(|node| matches!(node, crate::kml::Node::Element(el) if el.local_name() == "GroundOverlay"))
        .count();

    tracing::debug!(
        template = report.template_asset.as_deref().unwrap_or("(no asset reference)"),
        cloned = report.cloned,
        duplicate_skipped = report.duplicate_skipped,
        "expanded overlay document"
    );
    Ok(report)
}

/// First `Document` anywhere in the tree, else first `Folder`.
fn find_group_mut(root: &mut Element) -> Option<&mut Element> {
    if root.find("Document").is_some() {
        return root.find_mut("Document");
    }
    root.find_mut("Folder")
}

/// Stable-sort the group's direct `GroundOverlay` children by the trailing
/// number in their `<name>`. The overlays are detached and re-appended after
/// the group's other children; only child ordering changes, never node
/// structure.
fn reorder_overlays(group: &mut Element) {
    use crate::kml::Node;

    let mut overlays = Vec::new();
    let mut rest = Vec::new();
    for node in group.children.drain(..) {
        match node {
            Node::Element(el) if el.local_name() == "GroundOverlay" => overlays.push(el),
            node => rest.push(node),
        }
    }
    overlays.sort_by_key(|el| {
        el.find_text("name")
            .map(|name| trailing_number(&name))
            .unwrap_or(SORT_KEY_SENTINEL)
    });
    group.children = rest;
    for overlay in overlays {
        group.append_child(overlay);
    }
}

/// Copy every asset into `<kml_dir>/<unit_name>/`, creating the subfolder.
///
/// A source file missing on disk is logged and skipped; the document keeps
/// its reference to the filename. Returns the number of files copied. Other
/// I/O failures (permissions, full disk) propagate.
pub fn copy_assets(assets: &[PathBuf], kml_dir: &Path, unit_name: &str) -> io::Result<usize> {
    let dest_dir = kml_dir.join(unit_name);
    std::fs::create_dir_all(&dest_dir)?;

    let mut copied = 0;
    for asset in assets {
        let Some(filename) = asset.file_name() else { continue };
        if !asset.is_file() {
            tracing::warn!("asset file does not exist, skipping copy: {}", asset.display());
            continue;
        }
        std::fs::copy(asset, dest_dir.join(filename))?;
        copied += 1;
    }
    Ok(copied)
}

fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

fn stem(filename: &str) -> &str {
    filename
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .filter(|stem| !stem.is_empty())
        .unwrap_or(filename)
}
