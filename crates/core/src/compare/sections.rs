//! Section-title set comparisons.

use std::collections::BTreeSet;

use crate::page::Sections;

fn title_set(sections: &Sections) -> BTreeSet<&str> {
    sections.titles().collect()
}

/// Jaccard similarity of the two section-title sets.
///
/// `0.0` when either page has no sections.
pub fn section_overlap(a: &Sections, b: &Sections) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let set_a = title_set(a);
    let set_b = title_set(b);

    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();

    if union == 0 { 0.0 } else { intersection as f64 / union as f64 }
}

/// Section titles present in `a` but not in `b`, sorted ascending.
pub fn unique_sections(a: &Sections, b: &Sections) -> Vec<String> {
    let set_b = title_set(b);
    title_set(a).into_iter().filter(|title| !set_b.contains(title)).map(str::to_string).collect()
}
