//! Entity admission filter.

use mcbe_core::Entity;
use serde::{Deserialize, Serialize};

/// Filter deciding which entities an [`EntityRoster`](crate::EntityRoster)
/// admits. Empty lists impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityQuery {
    /// Admit only these type ids.
    pub types: Vec<String>,
    /// Reject these type ids.
    pub exclude_types: Vec<String>,
    /// Require every one of these families.
    pub families: Vec<String>,
    /// Reject entities in any of these families.
    pub exclude_families: Vec<String>,
    /// Require every one of these tags.
    pub tags: Vec<String>,
    /// Reject entities carrying any of these tags.
    pub exclude_tags: Vec<String>,
}

impl EntityQuery {
    /// Query admitting everything.
    pub fn any() -> Self {
        Self::default()
    }

    /// Restrict to `type_id` (may be called repeatedly).
    pub fn with_type(mut self, type_id: impl Into<String>) -> Self {
        self.types.push(type_id.into());
        self
    }

    /// Reject `type_id`.
    pub fn without_type(mut self, type_id: impl Into<String>) -> Self {
        self.exclude_types.push(type_id.into());
        self
    }

    /// Require `family`.
    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.families.push(family.into());
        self
    }

    /// Reject `family`.
    pub fn without_family(mut self, family: impl Into<String>) -> Self {
        self.exclude_families.push(family.into());
        self
    }

    /// Require `tag`.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Reject `tag`.
    pub fn without_tag(mut self, tag: impl Into<String>) -> Self {
        self.exclude_tags.push(tag.into());
        self
    }

    /// Whether `entity` passes every constraint.
    pub fn matches(&self, entity: &dyn Entity) -> bool {
        let type_id = entity.type_id();
        if !self.types.is_empty() && !self.types.iter().any(|t| t == type_id) {
            return false;
        }
        if self.exclude_types.iter().any(|t| t == type_id) {
            return false;
        }

        if !self.families.is_empty() || !self.exclude_families.is_empty() {
            let families = entity.type_families();
            if !self.families.iter().all(|f| families.contains(f)) {
                return false;
            }
            if self.exclude_families.iter().any(|f| families.contains(f)) {
                return false;
            }
        }

        if !self.tags.is_empty() || !self.exclude_tags.is_empty() {
            let tags = entity.tags();
            if !self.tags.iter().all(|t| tags.contains(t)) {
                return false;
            }
            if self.exclude_tags.iter().any(|t| tags.contains(t)) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcbe_testkit::MockEntity;

    #[test]
    fn empty_query_admits_everything() {
        let cow = MockEntity::new("c", "minecraft:cow");
        assert!(EntityQuery::any().matches(&*cow));
    }

    #[test]
    fn type_and_family_constraints_combine() {
        let zombie = MockEntity::new("z", "minecraft:zombie");
        zombie.set_families(["mob", "undead"]);
        let skeleton = MockEntity::new("s", "minecraft:skeleton");
        skeleton.set_families(["mob", "undead"]);
        let cow = MockEntity::new("c", "minecraft:cow");
        cow.set_families(["mob"]);

        let undead = EntityQuery::any()
            .with_family("undead")
            .without_type("minecraft:skeleton");
        assert!(undead.matches(&*zombie));
        assert!(!undead.matches(&*skeleton));
        assert!(!undead.matches(&*cow));
    }

    #[test]
    fn tags_are_required_and_excluded() {
        let boss = MockEntity::new("b", "minecraft:wither");
        boss.add_tag("boss");
        boss.add_tag("arena");
        let query = EntityQuery::any().with_tag("arena").without_tag("despawning");
        assert!(query.matches(&*boss));
        boss.add_tag("despawning");
        assert!(!query.matches(&*boss));
    }
}
