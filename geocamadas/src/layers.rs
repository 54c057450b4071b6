//! Jeu de couches actives (état du contrôleur de page)

use tracing::debug;

use crate::types::{GeoLayer, LayerSummary};
use crate::GeoError;

/// Collection ordonnée des couches affichées sur la carte.
///
/// Seul le propriétaire de ce jeu le modifie ; les composants reçoivent
/// une référence explicite et émettent des callbacks.
#[derive(Debug, Clone, Default)]
pub struct LayerSet {
    layers: Vec<GeoLayer>,
}

impl LayerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ajoute une couche ; refuse un identifiant déjà présent
    pub fn add(&mut self, layer: GeoLayer) -> Result<(), GeoError> {
        if self.contains(&layer.id) {
            return Err(GeoError::DuplicateLayer(layer.id));
        }
        debug!(layer = %layer.id, features = layer.feature_count(), "Layer added");
        self.layers.push(layer);
        Ok(())
    }

    /// Retire une couche (aucun effet de bord hors de ce jeu)
    pub fn remove(&mut self, layer_id: &str) -> Option<GeoLayer> {
        let index = self.layers.iter().position(|l| l.id == layer_id)?;
        debug!(layer = layer_id, "Layer removed");
        Some(self.layers.remove(index))
    }

    pub fn get(&self, layer_id: &str) -> Option<&GeoLayer> {
        self.layers.iter().find(|l| l.id == layer_id)
    }

    pub fn get_mut(&mut self, layer_id: &str) -> Option<&mut GeoLayer> {
        self.layers.iter_mut().find(|l| l.id == layer_id)
    }

    pub fn contains(&self, layer_id: &str) -> bool {
        self.get(layer_id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeoLayer> {
        self.layers.iter()
    }

    /// Couches visibles, dans l'ordre d'ajout
    pub fn visible(&self) -> impl Iterator<Item = &GeoLayer> {
        self.layers.iter().filter(|l| l.visible)
    }

    pub fn summaries(&self) -> Vec<LayerSummary> {
        self.layers.iter().map(GeoLayer::summary).collect()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_rejects_duplicate_id() {
        let mut set = LayerSet::new();
        set.add(GeoLayer::new("a", "A")).unwrap();
        let err = set.add(GeoLayer::new("a", "A bis")).unwrap_err();
        assert!(matches!(err, GeoError::DuplicateLayer(id) if id == "a"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_visible_keeps_order() {
        let mut set = LayerSet::new();
        set.add(GeoLayer::new("a", "A")).unwrap();
        set.add(GeoLayer::new("b", "B")).unwrap();
        set.add(GeoLayer::new("c", "C")).unwrap();
        set.get_mut("b").unwrap().set_visible(false);

        let ids: Vec<_> = set.visible().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, ["a", "c"]);
    }

    #[test]
    fn test_remove() {
        let mut set = LayerSet::new();
        set.add(GeoLayer::new("a", "A")).unwrap();
        assert!(set.remove("a").is_some());
        assert!(set.is_empty());
        assert!(set.remove("a").is_none());
    }
}
