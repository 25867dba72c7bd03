/// The ordered list of logical items.
///
/// Items are node handles owned by the host document; the registry only tracks order and
/// identity. Removal is always by identity, since positions shift between mutation batches.
#[derive(Clone, Debug)]
pub struct Registry<N> {
    items: Vec<N>,
}

impl<N> Default for Registry<N> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<N: PartialEq> Registry<N> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&N> {
        self.items.get(index)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &N> + '_ {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[N] {
        &self.items
    }

    pub fn position(&self, node: &N) -> Option<usize> {
        self.items.iter().position(|n| n == node)
    }

    pub fn contains(&self, node: &N) -> bool {
        self.position(node).is_some()
    }

    /// Appends `node` unless it is already tracked.
    ///
    /// Returns `false` for a node that is already present, which keeps a node from being
    /// tracked (and rendered) twice.
    pub fn push(&mut self, node: N) -> bool {
        if self.contains(&node) {
            return false;
        }
        self.items.push(node);
        true
    }

    /// Removes `node` at its tracked position. Returns that position.
    pub fn remove(&mut self, node: &N) -> Option<usize> {
        let index = self.position(node)?;
        self.items.remove(index);
        Some(index)
    }
}
