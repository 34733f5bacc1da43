use std::collections::HashSet;

/// Multi-select over table rows, keyed by identifier.
#[derive(Debug, Default, Clone)]
pub struct Selection {
    selected: HashSet<String>,
}

impl Selection {
    pub fn toggle(&mut self, id: &str) {
        if !self.selected.remove(id) {
            self.selected.insert(id.to_owned());
        }
    }

    pub fn select_all(&mut self, ids: &[String]) {
        self.selected = ids.iter().cloned().collect();
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// A fully selected list toggles to empty, anything else selects
    /// everything.
    pub fn toggle_select_all(&mut self, all_ids: &[String]) {
        if self.selected.len() == all_ids.len() {
            self.clear();
        } else {
            self.select_all(all_ids);
        }
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn ids(&self) -> Vec<String> {
        self.selected.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}
