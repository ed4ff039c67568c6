use std::collections::HashMap;

/// Mapping between group ids and the member indices they contain, e.g.
/// tokens that share a word.
///
/// Built once from `(member, group)` pairs whenever the grouping changes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroupIndex {
    members: HashMap<String, Vec<usize>>,
    groups: HashMap<usize, String>,
}

impl GroupIndex {
    pub fn new<I, G>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (usize, G)>,
        G: Into<String>,
    {
        let mut index = Self::default();
        for (member, group) in pairs {
            let group = group.into();
            if let Some(previous) = index.groups.insert(member, group.clone()) {
                if let Some(list) = index.members.get_mut(&previous) {
                    list.retain(|m| *m != member);
                }
            }
            index.members.entry(group).or_default().push(member);
        }
        index.members.retain(|_, list| !list.is_empty());
        for list in index.members.values_mut() {
            list.sort_unstable();
        }
        index
    }

    /// Members of `group`, ascending.
    pub fn members(&self, group: &str) -> &[usize] {
        self.members.get(group).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn group_of(&self, member: usize) -> Option<&str> {
        self.groups.get(&member).map(String::as_str)
    }

    /// Every member sharing a group with `member`, itself included.
    pub fn siblings(&self, member: usize) -> &[usize] {
        self.group_of(member)
            .map(|group| self.members(group))
            .unwrap_or(&[])
    }

    pub fn group_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
