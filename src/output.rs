//! CLI output formatting for all commands.
//!
//! # Output Format
//!
//! ## Resize, URLs, Paths
//!
//! Version names are left-aligned so the generated names line up:
//!
//! ```text
//! Generated 2 versions of avatar42
//!     source → avatar42.jpg
//!     thumb  → avatar42-thumb-100x100-crp-cen-nenl.jpg
//! ```
//!
//! ## Plan
//!
//! ```text
//! thumb: 400x300 jpeg → 100x100 jpeg
//!     Fit box: 100x100 (crop, center, no enlarge)
//!     Scaled: 133x100 at (-17, 0)
//! ```
//!
//! A version that needs no resampling shows `pass-through` instead of the
//! scaling line.
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::imaging::{Format, SizePlan, VersionConfig};
use std::collections::BTreeMap;
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn flag(on: bool, yes: &str, no: &str) -> String {
    if on { yes.to_string() } else { no.to_string() }
}

/// Format a version map under a header line.
///
/// Values that are empty (unknown paths) show as `(unknown)`.
pub fn format_version_map(header: &str, entries: &BTreeMap<String, String>) -> Vec<String> {
    let width = entries.keys().map(|k| k.chars().count()).max().unwrap_or(0);
    let mut lines = vec![header.to_string()];
    lines.extend(entries.iter().map(|(name, value)| {
        let value = if value.is_empty() { "(unknown)" } else { value };
        format!("{}{:<width$} → {}", indent(1), name, value)
    }));
    lines
}

pub fn print_version_map(header: &str, entries: &BTreeMap<String, String>) {
    for line in format_version_map(header, entries) {
        println!("{}", line);
    }
}

/// Header for a resize result.
pub fn resize_header(base_name: &str, count: usize) -> String {
    let noun = if count == 1 { "version" } else { "versions" };
    format!("Generated {} {} of {}", count, noun, base_name)
}

/// Format a sizing plan for one named version.
pub fn format_plan(name: &str, plan: &SizePlan, config: &VersionConfig) -> Vec<String> {
    let target_format: Format = config.convert_to().unwrap_or(plan.source_format);
    let target = plan.target();
    let mut lines = vec![format!(
        "{}: {}x{} {} → {}x{} {}",
        name,
        plan.original_width,
        plan.original_height,
        plan.source_format,
        target.width,
        target.height,
        target_format
    )];
    lines.push(format!(
        "{}Fit box: {}x{} ({}, {}, {})",
        indent(1),
        plan.fit_width,
        plan.fit_height,
        flag(config.is_crop_allowed(), "crop", "no crop"),
        flag(config.is_centering_allowed(), "center", "no center"),
        flag(config.is_enlarge_allowed(), "enlarge", "no enlarge"),
    ));
    if plan.must_resize {
        lines.push(format!(
            "{}Scaled: {}x{} at ({}, {})",
            indent(1),
            plan.lossless_width,
            plan.lossless_height,
            plan.offset_x,
            plan.offset_y
        ));
    } else if target_format == plan.source_format {
        lines.push(format!("{}pass-through (copied verbatim)", indent(1)));
    } else {
        lines.push(format!("{}pass-through (re-encoded as {})", indent(1), target_format));
    }
    lines
}

pub fn print_plan(name: &str, plan: &SizePlan, config: &VersionConfig) {
    for line in format_plan(name, plan, config) {
        println!("{}", line);
    }
}

/// Format the outcome of a restore request.
pub fn format_restore(file_name: &str, restored: Option<&Path>) -> String {
    match restored {
        Some(path) => format!("{} → {}", file_name, path.display()),
        None => format!("{}: no matching source or version", file_name),
    }
}

/// Format the outcome of a rotate request.
pub fn format_rotate(path: &Path, degrees: i32, rotated: bool) -> String {
    if rotated {
        format!("Rotated {} by {}°", path.display(), degrees)
    } else {
        format!("{}: not a file, nothing rotated", path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::{Dimensions, plan};

    fn map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn version_map_aligns_names() {
        let lines = format_version_map(
            "Generated 2 versions of p",
            &map(&[("source", "p.jpg"), ("thumb", "p-thumb.jpg")]),
        );
        assert_eq!(
            lines,
            vec![
                "Generated 2 versions of p",
                "    source → p.jpg",
                "    thumb  → p-thumb.jpg",
            ]
        );
    }

    #[test]
    fn version_map_marks_unknown_values() {
        let lines = format_version_map("Paths", &map(&[("source", "")]));
        assert_eq!(lines[1], "    source → (unknown)");
    }

    #[test]
    fn version_map_empty() {
        assert_eq!(format_version_map("Paths", &BTreeMap::new()), vec!["Paths"]);
    }

    #[test]
    fn resize_header_pluralizes() {
        assert_eq!(resize_header("p", 1), "Generated 1 version of p");
        assert_eq!(resize_header("p", 3), "Generated 3 versions of p");
    }

    #[test]
    fn plan_shows_scaling() {
        let config = VersionConfig::new()
            .with_width(Some(100))
            .with_height(Some(100))
            .with_crop(true);
        let p = plan(Dimensions { width: 400, height: 300 }, Format::Jpeg, &config).unwrap();
        let lines = format_plan("thumb", &p, &config);
        assert_eq!(lines[0], "thumb: 400x300 jpeg → 100x100 jpeg");
        assert_eq!(lines[1], "    Fit box: 100x100 (crop, center, no enlarge)");
        assert_eq!(lines[2], "    Scaled: 133x100 at (-17, 0)");
    }

    #[test]
    fn plan_shows_pass_through() {
        let config = VersionConfig::new().with_width(Some(500)).with_height(Some(500));
        let p = plan(Dimensions { width: 200, height: 100 }, Format::Png, &config).unwrap();
        let lines = format_plan("big", &p, &config);
        assert_eq!(lines[0], "big: 200x100 png → 200x100 png");
        assert_eq!(lines[2], "    pass-through (copied verbatim)");

        let converted = config.with_convert_to(Some(Format::Jpeg));
        let lines = format_plan("big", &p, &converted);
        assert_eq!(lines[0], "big: 200x100 png → 200x100 jpeg");
        assert_eq!(lines[2], "    pass-through (re-encoded as jpeg)");
    }

    #[test]
    fn restore_and_rotate_messages() {
        assert_eq!(
            format_restore("p-t.jpg", Some(Path::new("/img/p-t.jpg"))),
            "p-t.jpg → /img/p-t.jpg"
        );
        assert_eq!(
            format_restore("p-t.jpg", None),
            "p-t.jpg: no matching source or version"
        );
        assert_eq!(format_rotate(Path::new("a.jpg"), 90, true), "Rotated a.jpg by 90°");
        assert_eq!(
            format_rotate(Path::new("a.jpg"), 90, false),
            "a.jpg: not a file, nothing rotated"
        );
    }
}
