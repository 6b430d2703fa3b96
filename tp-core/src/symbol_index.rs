use std::collections::HashMap;
use std::hash::Hash;

/// Bijective map between symbols and dense integer positions, in insertion order.
#[derive(Debug, Clone)]
pub struct SymbolIndex<K> {
    positions: HashMap<K, usize>,
    symbols: Vec<K>,
}

impl<K: Clone + Eq + Hash> SymbolIndex<K> {
    pub fn new() -> Self {
        Self {
            positions: HashMap::new(),
            symbols: Vec::new(),
        }
    }

    /// Returns the position of `symbol`, adding it at the end if it is new.
    pub fn insert(&mut self, symbol: &K) -> usize {
        if let Some(&idx) = self.positions.get(symbol) {
            return idx;
        }
        let idx = self.symbols.len();
        self.positions.insert(symbol.clone(), idx);
        self.symbols.push(symbol.clone());
        idx
    }

    pub fn position(&self, symbol: &K) -> Option<usize> {
        self.positions.get(symbol).copied()
    }

    pub fn symbol(&self, idx: usize) -> &K {
        &self.symbols[idx]
    }

    pub fn contains(&self, symbol: &K) -> bool {
        self.positions.contains_key(symbol)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbols(&self) -> &[K] {
        &self.symbols
    }
}

impl<K: Clone + Eq + Hash> Default for SymbolIndex<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, K: Clone + Eq + Hash + 'a> FromIterator<&'a K> for SymbolIndex<K> {
    fn from_iter<I: IntoIterator<Item = &'a K>>(iter: I) -> Self {
        let mut index = SymbolIndex::new();
        for symbol in iter {
            index.insert(symbol);
        }
        index
    }
}
