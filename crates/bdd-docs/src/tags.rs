//! Tag index over the flattened scenario list.
//!
//! Each scenario's effective tags are its own tags followed by its feature's
//! tags, duplicates preserved. A scenario joins one bucket per occurrence of
//! a tag in that list, so a tag shared by a scenario and its feature counts
//! twice.

use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeMap, SerializeStruct, Serializer};

use crate::model::ScenarioChild;

/// A tag name with the size of its bucket.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TagSummary {
    /// Tag name without the leading `@`.
    pub name: String,
    /// Number of memberships in the tag's bucket.
    pub count: usize,
}

/// Scenarios grouped by tag.
///
/// Serialises as `{ "scenaria": [...], "scenariaPerTag": {...}, "tags": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagIndex {
    scenaria: Vec<ScenarioChild>,
    buckets: BTreeMap<String, Vec<usize>>,
    tags: Vec<TagSummary>,
}

/// Index `scenarios` by their effective tags.
///
/// Each returned scenario's `tags` holds its effective tags. The index is
/// freshly allocated on every call.
#[must_use]
pub fn index(scenarios: Vec<ScenarioChild>) -> TagIndex {
    let mut buckets: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    let scenaria: Vec<_> = scenarios
        .into_iter()
        .enumerate()
        .map(|(position, mut scenario)| {
            scenario.tags = scenario.effective_tags();
            for tag in &scenario.tags {
                buckets.entry(tag.clone()).or_default().push(position);
            }
            scenario
        })
        .collect();

    let tags = buckets
        .iter()
        .map(|(name, members)| TagSummary {
            name: name.clone(),
            count: members.len(),
        })
        .collect();

    TagIndex {
        scenaria,
        buckets,
        tags,
    }
}

impl TagIndex {
    /// Every indexed scenario, in traversal order.
    #[must_use]
    pub fn scenaria(&self) -> &[ScenarioChild] {
        &self.scenaria
    }

    /// Tag summaries sorted ascending by name.
    #[must_use]
    pub fn tags(&self) -> &[TagSummary] {
        &self.tags
    }

    /// Members of the bucket for `tag`, one entry per membership.
    ///
    /// Returns an empty list for unknown tags.
    #[must_use]
    pub fn scenarios_for_tag(&self, tag: &str) -> Vec<&ScenarioChild> {
        self.buckets
            .get(tag)
            .map_or_else(Vec::new, |members| self.members(members))
    }

    fn members(&self, positions: &[usize]) -> Vec<&ScenarioChild> {
        positions
            .iter()
            .filter_map(|&position| self.scenaria.get(position))
            .collect()
    }
}

struct ScenariaPerTag<'a>(&'a TagIndex);

impl Serialize for ScenariaPerTag<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let index = self.0;
        let mut map = serializer.serialize_map(Some(index.buckets.len()))?;
        for (tag, positions) in &index.buckets {
            map.serialize_entry(tag, &index.members(positions))?;
        }
        map.end()
    }
}

impl Serialize for TagIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("TagIndex", 3)?;
        state.serialize_field("scenaria", &self.scenaria)?;
        state.serialize_field("scenariaPerTag", &ScenariaPerTag(self))?;
        state.serialize_field("tags", &self.tags)?;
        state.end()
    }
}
