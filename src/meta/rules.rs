//! Revision-gated layout rules.
//!
//! Every shape difference between engine revisions lives in one ordered
//! table. Adding a revision is a table insertion.

use super::EngineVersion;

/// Layout decisions that apply from `floor` up to the next entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayoutRule {
    /// First engine revision this rule applies to.
    pub floor: EngineVersion,
    /// Container format emitted when re-encoding for this revision range.
    pub format: u32,
    /// Component lists store a class id in front of every pointer.
    pub explicit_component_class_ids: bool,
}

impl LayoutRule {
    const fn new(floor: EngineVersion, format: u32, explicit_component_class_ids: bool) -> Self {
        Self { floor, format, explicit_component_class_ids }
    }
}

/// Engine revision from which component lists drop their class ids.
pub const COMPONENT_CLASS_ID_THRESHOLD: EngineVersion = EngineVersion::new(5, 5, 0);

/// Ordered by `floor`.
pub const LAYOUT_RULES: &[LayoutRule] = &[
    LayoutRule::new(EngineVersion::new(5, 0, 0), 15, true),
    LayoutRule::new(COMPONENT_CLASS_ID_THRESHOLD, 17, false),
    LayoutRule::new(EngineVersion::new(2019, 1, 0), 19, false),
    // Formats 14, 16, 18 and 20 are read but never emitted.
    LayoutRule::new(EngineVersion::new(2019, 3, 0), 21, false),
    LayoutRule::new(EngineVersion::new(2020, 1, 0), 22, false),
];

/// Rule for an engine revision, or `None` when it predates every rule.
///
/// Only the numeric part takes part in the comparison, so prereleases of
/// a threshold revision already follow the new layout.
pub fn rule_for(version: &EngineVersion) -> Option<&'static LayoutRule> {
    LAYOUT_RULES
        .iter()
        .rev()
        .find(|rule| rule.floor.triple() <= version.triple())
}
