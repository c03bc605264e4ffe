use crate::Result;
use anyhow::{bail, ensure};
use serde::de::Error;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

/// Something stored in a collection and identified by a unique string `id`.
pub trait Item {
    /// A short name for the kind of item, used in messages, e.g. `"project"`.
    const KIND: &'static str;

    fn id(&self) -> &str;
}

/// An ordered collection of items with unique ids.
///
/// Order is the display order. It carries no meaning beyond that: new projects and transactions
/// go to the front, new users to the back.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Items<I>
where
    I: Item,
{
    data: Vec<I>,
}

impl<I> Items<I>
where
    I: Item,
{
    /// Creates a collection, failing if two items share an id.
    pub fn new(data: Vec<I>) -> Result<Self> {
        let mut seen = BTreeSet::new();
        for item in &data {
            ensure!(
                seen.insert(item.id()),
                "Duplicate {} id '{}'",
                I::KIND,
                item.id()
            );
        }
        Ok(Self { data })
    }

    pub fn data(&self) -> &[I] {
        &self.data
    }

    pub fn iter(&self) -> impl Iterator<Item = &I> {
        self.data.iter()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&I> {
        self.data.iter().find(|item| item.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Inserts `item` at the front.
    pub fn prepend(&mut self, item: I) -> Result<()> {
        self.check_new(&item)?;
        self.data.insert(0, item);
        Ok(())
    }

    /// Inserts `item` at the back.
    pub fn append(&mut self, item: I) -> Result<()> {
        self.check_new(&item)?;
        self.data.push(item);
        Ok(())
    }

    /// Replaces the item with the same id, keeping its position. Returns `false`, and changes
    /// nothing, when no item has that id.
    pub fn update(&mut self, item: I) -> bool {
        match self.data.iter_mut().find(|old| old.id() == item.id()) {
            Some(old) => {
                *old = item;
                true
            }
            None => false,
        }
    }

    /// Removes and returns the item with `id`, if there is one.
    pub fn delete(&mut self, id: &str) -> Option<I> {
        let ix = self.data.iter().position(|item| item.id() == id)?;
        Some(self.data.remove(ix))
    }

    /// Keeps only the items for which `f` returns `true` and returns how many were removed.
    pub fn retain<F>(&mut self, f: F) -> usize
    where
        F: FnMut(&I) -> bool,
    {
        let before = self.data.len();
        self.data.retain(f);
        before - self.data.len()
    }

    fn check_new(&self, item: &I) -> Result<()> {
        if item.id().is_empty() {
            bail!("A {} must have a non-empty id", I::KIND);
        }
        if self.contains(item.id()) {
            bail!("A {} with id '{}' already exists", I::KIND, item.id());
        }
        Ok(())
    }
}

impl<I> Default for Items<I>
where
    I: Item,
{
    fn default() -> Self {
        Self { data: Vec::new() }
    }
}

impl<'de, I> Deserialize<'de> for Items<I>
where
    I: Item + Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let data = Vec::<I>::deserialize(deserializer)?;
        Items::new(data).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Thing {
        id: String,
        n: u32,
    }

    impl Item for Thing {
        const KIND: &'static str = "thing";

        fn id(&self) -> &str {
            &self.id
        }
    }

    fn thing(id: &str, n: u32) -> Thing {
        Thing {
            id: id.to_string(),
            n,
        }
    }

    #[test]
    fn test_prepend_and_append_order() {
        let mut items = Items::default();
        items.prepend(thing("a", 1)).unwrap();
        items.prepend(thing("b", 2)).unwrap();
        items.append(thing("c", 3)).unwrap();
        let ids: Vec<&str> = items.iter().map(|t| t.id()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_duplicate_id_is_rejected() {
        let mut items = Items::new(vec![thing("a", 1)]).unwrap();
        let err = items.prepend(thing("a", 2)).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(items.len(), 1);
        assert!(Items::new(vec![thing("a", 1), thing("a", 2)]).is_err());
    }

    #[test]
    fn test_update_replaces_in_place() {
        let mut items = Items::new(vec![thing("a", 1), thing("b", 2)]).unwrap();
        assert!(items.update(thing("b", 20)));
        assert_eq!(items.data()[1].n, 20);
        assert!(!items.update(thing("zzz", 0)));
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_delete() {
        let mut items = Items::new(vec![thing("a", 1), thing("b", 2)]).unwrap();
        assert_eq!(items.delete("a"), Some(thing("a", 1)));
        assert_eq!(items.delete("a"), None);
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_deserialize_rejects_duplicates() {
        let json = r#"[{"id":"a","n":1},{"id":"a","n":2}]"#;
        assert!(serde_json::from_str::<Items<Thing>>(json).is_err());
        let json = r#"[{"id":"a","n":1},{"id":"b","n":2}]"#;
        let items: Items<Thing> = serde_json::from_str(json).unwrap();
        assert_eq!(serde_json::to_string(&items).unwrap(), json);
    }
}
