//! Per-cycle binding context
//!
//! Radio buttons sharing a submitted name within one form must observe each other's checked state.
//! That state lives in a [`BindSession`] passed down the tree while cascading, binding and
//! rendering, it is scoped to one bind/render cycle rather than shared process-wide.
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::fmt::Display;
use std::ops::Deref;
use std::sync::Arc;

use crate::element::generate_element_id;

/// Identity of a form, used to scope radio groups
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FormId(Arc<str>);

impl FormId {
    pub fn new(id: impl AsRef<str>) -> Self {
        FormId(Arc::from(id.as_ref()))
    }

    /// Create a form id from a freshly generated element id
    pub fn generate() -> Self {
        FormId::new(generate_element_id())
    }
}

impl Display for FormId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Deref for FormId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<&str> for FormId {
    fn from(id: &str) -> Self {
        FormId::new(id)
    }
}

/// The key of a radio group: owning form and resolved full name
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GroupKey {
    pub form: Option<FormId>,
    pub name: String,
}

impl GroupKey {
    pub fn new(form: Option<FormId>, name: impl Into<String>) -> Self {
        GroupKey {
            form,
            name: name.into(),
        }
    }
}

#[derive(Debug, Default)]
struct RadioGroup {
    members: BTreeSet<String>,
    value: Option<Value>,
}

/// Table of radio groups, keyed by owning form and full name
#[derive(Debug, Default)]
pub struct RadioGroups(HashMap<GroupKey, RadioGroup>);

impl RadioGroups {
    /// Attach a member to a group
    ///
    /// If the member belonged to a different group it is detached from it first, groups left
    /// without members are dropped.
    pub fn attach(&mut self, key: &GroupKey, member: &str, previous: Option<&GroupKey>) {
        if let Some(previous) = previous.filter(|prev| *prev != key) {
            if let Some(group) = self.0.get_mut(previous) {
                group.members.remove(member);
                if group.members.is_empty() {
                    self.0.remove(previous);
                }
            }
        }

        self.0
            .entry(key.clone())
            .or_default()
            .members
            .insert(member.to_string());
    }

    /// Detach a member from its group
    pub fn detach(&mut self, key: &GroupKey, member: &str) {
        if let Some(group) = self.0.get_mut(key) {
            group.members.remove(member);
            if group.members.is_empty() {
                self.0.remove(key);
            }
        }
    }

    /// Set the value selected for a group
    pub fn assign(&mut self, key: &GroupKey, value: Value) {
        self.0.entry(key.clone()).or_default().value = Some(value);
    }

    /// Return the value last assigned to the group, if any
    pub fn current(&self, key: &GroupKey) -> Option<&Value> {
        self.0.get(key).and_then(|group| group.value.as_ref())
    }

    /// Return the element ids of the group members
    pub fn members(&self, key: &GroupKey) -> Vec<String> {
        self.0
            .get(key)
            .map(|group| group.members.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// State shared by every node during one bind/render cycle
#[derive(Debug, Default)]
pub struct BindSession {
    radios: RadioGroups,
}

impl BindSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn radios(&self) -> &RadioGroups {
        &self.radios
    }

    pub fn radios_mut(&mut self) -> &mut RadioGroups {
        &mut self.radios
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn it_moves_members_between_groups() {
        let mut groups = RadioGroups::default();
        let old = GroupKey::new(None, "color");
        let new = GroupKey::new(Some(FormId::new("f1")), "color");

        groups.attach(&old, "element1", None);
        groups.attach(&old, "element2", None);
        groups.attach(&new, "element1", Some(&old));

        assert_eq!(groups.members(&old), vec!["element2"]);
        assert_eq!(groups.members(&new), vec!["element1"]);

        groups.attach(&new, "element2", Some(&old));
        assert_eq!(groups.members(&old), Vec::<String>::new());
        assert_eq!(groups.len(), 1);
    }

    #[test]
    fn it_tracks_the_group_value() {
        let mut groups = RadioGroups::default();
        let key = GroupKey::new(None, "answer");
        assert_eq!(groups.current(&key), None);

        groups.attach(&key, "element1", None);
        groups.assign(&key, json!("1"));
        assert_eq!(groups.current(&key), Some(&json!("1")));

        // re-attaching to the same group keeps its state
        groups.attach(&key, "element1", Some(&key));
        assert_eq!(groups.current(&key), Some(&json!("1")));
    }
}
