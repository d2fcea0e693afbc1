//! Insertion-ordered node arena with an id index.
//!
//! Iteration order is the order nodes were first inserted. Replacing a node
//! keeps its position, removing one shifts the nodes after it.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;

/// Anything stored in a [`NodeTable`] exposes its key.
pub trait Identified {
    fn id(&self) -> &str;
}

/// Flat id-keyed storage for model nodes.
///
/// Callers must not change a node's id through [`NodeTable::get_mut`];
/// re-insert it under the new id instead.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeTable<T> {
    nodes: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T> Default for NodeTable<T> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Identified> NodeTable<T> {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a node, replacing (in place) any node with the same id.
    /// Returns the replaced node.
    pub fn insert(&mut self, node: T) -> Option<T> {
        match self.index.get(node.id()) {
            Some(&pos) => Some(std::mem::replace(&mut self.nodes[pos], node)),
            None => {
                self.index.insert(node.id().to_string(), self.nodes.len());
                self.nodes.push(node);
                None
            }
        }
    }

    /// Removes the node with the given id.
    pub fn remove(&mut self, id: &str) -> Option<T> {
        let pos = self.index.remove(id)?;
        let removed = self.nodes.remove(pos);
        for node in &self.nodes[pos..] {
            if let Some(slot) = self.index.get_mut(node.id()) {
                *slot -= 1;
            }
        }
        Some(removed)
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.index.get(id).map(|&pos| &self.nodes[pos])
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        match self.index.get(id) {
            Some(&pos) => Some(&mut self.nodes[pos]),
            None => None,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Iterates nodes in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.nodes.iter()
    }

    /// Iterates node ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(Identified::id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl<T: Identified> FromIterator<T> for NodeTable<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut table = Self::new();
        for node in iter {
            table.insert(node);
        }
        table
    }
}

impl<'a, T> IntoIterator for &'a NodeTable<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

impl<T: Serialize> Serialize for NodeTable<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.nodes.iter())
    }
}

impl<'de, T: Identified + Deserialize<'de>> Deserialize<'de> for NodeTable<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<T>::deserialize(deserializer).map(|nodes| nodes.into_iter().collect())
    }
}
