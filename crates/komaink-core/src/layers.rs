//! Stacking-order registry.
//!
//! Every visual element gets a z-index inside the integer band of its layer.
//! Bands are disjoint, so slot growth in one layer never reaches the next:
//!
//! | Layer             | Band        | Overlap |
//! |-------------------|-------------|---------|
//! | `SceneBackground` | 0–99        | yes     |
//! | `ScenePanels`     | 100–399     | no      |
//! | `SceneImages`     | 400–699     | no      |
//! | `SceneSprites`    | 700–999     | no      |
//! | `DomBubbles`      | 1000–1999   | no      |
//! | `DomText`         | 2000–2999   | no      |
//! | `DomHandles`      | 3000–3999   | no      |
//! | `DomOverlays`     | 4000+       | yes     |

use crate::elements::{ElementId, ElementKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Named stacking layers. The first four come from the scene renderer, the
/// rest are DOM overlays drawn above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LayerType {
    SceneBackground,
    ScenePanels,
    SceneImages,
    SceneSprites,
    DomBubbles,
    DomText,
    DomHandles,
    DomOverlays,
}

impl LayerType {
    pub const ALL: [LayerType; 8] = [
        LayerType::SceneBackground,
        LayerType::ScenePanels,
        LayerType::SceneImages,
        LayerType::SceneSprites,
        LayerType::DomBubbles,
        LayerType::DomText,
        LayerType::DomHandles,
        LayerType::DomOverlays,
    ];

    /// Static configuration of the layer.
    pub fn spec(self) -> LayerSpec {
        match self {
            LayerType::SceneBackground => LayerSpec::new(0, 99, 50, true),
            LayerType::ScenePanels => LayerSpec::new(100, 399, 200, false),
            LayerType::SceneImages => LayerSpec::new(400, 699, 200, false),
            LayerType::SceneSprites => LayerSpec::new(700, 999, 200, false),
            LayerType::DomBubbles => LayerSpec::new(1000, 1999, 500, false),
            LayerType::DomText => LayerSpec::new(2000, 2999, 500, false),
            LayerType::DomHandles => LayerSpec::new(3000, 3999, 100, false),
            LayerType::DomOverlays => LayerSpec::new(4000, i32::MAX, 50, true),
        }
    }

    /// Whether the layer is drawn by the scene renderer rather than the DOM.
    pub fn is_scene(self) -> bool {
        matches!(
            self,
            LayerType::SceneBackground
                | LayerType::ScenePanels
                | LayerType::SceneImages
                | LayerType::SceneSprites
        )
    }

    /// Layer an element kind is placed on.
    pub fn for_kind(kind: ElementKind) -> Self {
        match kind {
            ElementKind::Panel => LayerType::ScenePanels,
            ElementKind::Image => LayerType::SceneImages,
            ElementKind::Sprite => LayerType::SceneSprites,
            ElementKind::Dialogue => LayerType::DomBubbles,
            ElementKind::Text => LayerType::DomText,
        }
    }
}

/// Band and capacity of one layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerSpec {
    pub base: i32,
    /// Last z-index of the band (inclusive).
    pub band_end: i32,
    /// Soft capacity; exceeding it only logs a warning.
    pub max_elements: usize,
    pub allows_overlap: bool,
}

impl LayerSpec {
    const fn new(base: i32, band_end: i32, max_elements: usize, allows_overlap: bool) -> Self {
        Self {
            base,
            band_end,
            max_elements,
            allows_overlap,
        }
    }
}

/// Priority tier inside a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Critical,
}

impl Priority {
    pub fn offset(self) -> i32 {
        match self {
            Priority::Low => 0,
            Priority::Normal => 10,
            Priority::High => 20,
            Priority::Critical => 30,
        }
    }
}

/// One registered element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    pub layer: LayerType,
    pub z_index: i32,
    pub priority: Priority,
}

/// Outcome of [`LayerManager::resolve_conflicts`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConflictReport {
    pub found: usize,
    pub resolved: usize,
}

/// Usage snapshot for one layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerStats {
    pub layer: LayerType,
    pub usage: usize,
    pub max_elements: usize,
    pub next_slot: i32,
}

#[derive(Debug, Clone, Copy, Default)]
struct LayerUsage {
    count: usize,
    next_slot: i32,
}

/// Z-index registry for one editing session.
#[derive(Debug, Clone, Default)]
pub struct LayerManager {
    registrations: HashMap<ElementId, Registration>,
    usage: HashMap<LayerType, LayerUsage>,
}

impl LayerManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `id` on `layer` and return its z-index.
    ///
    /// An id that is already registered is released first.
    pub fn assign_z_index(&mut self, id: ElementId, layer: LayerType, priority: Priority) -> i32 {
        self.release_z_index(id);
        let z_index = self.next_z_index(layer, priority);
        self.register(id, layer, priority, z_index);
        z_index
    }

    fn next_z_index(&mut self, layer: LayerType, priority: Priority) -> i32 {
        let spec = layer.spec();
        if spec.allows_overlap {
            return spec.base.saturating_add(priority.offset());
        }
        self.next_free(layer, priority)
    }

    /// Next value above the slot counter that nobody in the layer holds.
    ///
    /// When the counter would leave the band, the layer is compacted first.
    fn next_free(&mut self, layer: LayerType, priority: Priority) -> i32 {
        let spec = layer.spec();
        let floor = spec.base.saturating_add(priority.offset());
        let mut compacted = false;
        loop {
            let slot = self.usage.entry(layer).or_default().next_slot;
            let z_index = floor.saturating_add(slot);
            if z_index > spec.band_end && !compacted {
                self.compact(layer, None);
                compacted = true;
                continue;
            }
            if let Some(usage) = self.usage.get_mut(&layer) {
                usage.next_slot = slot.saturating_add(1);
            }
            if !self.is_taken(layer, z_index) {
                return z_index;
            }
        }
    }

    fn is_taken(&self, layer: LayerType, z_index: i32) -> bool {
        self.registrations
            .values()
            .any(|r| r.layer == layer && r.z_index == z_index)
    }

    /// Renumber a layer densely from its base, keeping the stacking order.
    /// `first`, when given, is placed below everything else.
    fn compact(&mut self, layer: LayerType, first: Option<ElementId>) {
        let mut members: Vec<(bool, i32, ElementId)> = self
            .registrations
            .iter()
            .filter(|(_, r)| r.layer == layer)
            .map(|(id, r)| (Some(*id) != first, r.z_index, *id))
            .collect();
        members.sort();
        let base = layer.spec().base;
        for (slot, (_, _, id)) in members.iter().enumerate() {
            if let Some(reg) = self.registrations.get_mut(id) {
                reg.z_index = base.saturating_add(slot as i32);
            }
        }
        let count = members.len() as i32;
        self.usage.entry(layer).or_default().next_slot = count;
        log::debug!("Compacted layer {:?} into {} slots", layer, count);
    }

    fn register(&mut self, id: ElementId, layer: LayerType, priority: Priority, z_index: i32) {
        let spec = layer.spec();
        let usage = self.usage.entry(layer).or_default();
        usage.count += 1;
        if usage.count > spec.max_elements {
            log::warn!(
                "Layer {:?} holds {} elements, above its limit of {}",
                layer,
                usage.count,
                spec.max_elements
            );
        }
        if z_index > spec.band_end {
            log::warn!("Layer {:?} z-index {} escaped its band (ends at {})", layer, z_index, spec.band_end);
        }
        self.registrations.insert(
            id,
            Registration {
                layer,
                z_index,
                priority,
            },
        );
    }

    /// Remove a registration. Unknown ids are ignored.
    pub fn release_z_index(&mut self, id: ElementId) {
        let Some(reg) = self.registrations.remove(&id) else {
            return;
        };
        if let Some(usage) = self.usage.get_mut(&reg.layer) {
            usage.count = usage.count.saturating_sub(1);
            if usage.count == 0 {
                usage.next_slot = 0;
            }
        }
    }

    /// Recompute the z-index of a registered element with a new priority.
    pub fn update_priority(&mut self, id: ElementId, priority: Priority) -> Option<i32> {
        let layer = self.registrations.get(&id)?.layer;
        Some(self.assign_z_index(id, layer, priority))
    }

    /// Move an element above everything else in its layer. Its priority is kept.
    pub fn bring_to_front(&mut self, id: ElementId) -> Option<i32> {
        let reg = *self.registrations.get(&id)?;
        let band_end = reg.layer.spec().band_end;
        if self.others_in_layer(id, reg.layer).max().is_some_and(|high| high >= band_end) {
            self.compact(reg.layer, None);
        }
        let current = self.registrations.get(&id)?.z_index;
        let z_index = match self.others_in_layer(id, reg.layer).max() {
            Some(high) if high >= current => high.saturating_add(1),
            _ => current,
        };
        self.set_registration(id, z_index, reg.priority);
        Some(z_index)
    }

    /// Move an element below everything else in its layer, at `Low` priority.
    pub fn send_to_back(&mut self, id: ElementId) -> Option<i32> {
        let reg = *self.registrations.get(&id)?;
        let base = reg.layer.spec().base;
        let z_index = match self.others_in_layer(id, reg.layer).min() {
            Some(low) if low > base => low - 1,
            Some(_) => {
                self.compact(reg.layer, Some(id));
                base
            }
            None => base,
        };
        self.set_registration(id, z_index, Priority::Low);
        Some(z_index)
    }

    fn others_in_layer(&self, id: ElementId, layer: LayerType) -> impl Iterator<Item = i32> + '_ {
        self.registrations
            .iter()
            .filter(move |(other, r)| **other != id && r.layer == layer)
            .map(|(_, r)| r.z_index)
    }

    fn set_registration(&mut self, id: ElementId, z_index: i32, priority: Priority) {
        if let Some(reg) = self.registrations.get_mut(&id) {
            reg.z_index = z_index;
            reg.priority = priority;
        }
    }

    /// Reassign every element whose z-index collides with an earlier one.
    ///
    /// The element keeping the shared value is the one with the smallest id,
    /// so the result does not depend on hash order.
    pub fn resolve_conflicts(&mut self) -> ConflictReport {
        let mut by_z: BTreeMap<i32, Vec<ElementId>> = BTreeMap::new();
        for (id, reg) in &self.registrations {
            by_z.entry(reg.z_index).or_default().push(*id);
        }

        let mut losers = Vec::new();
        let mut report = ConflictReport::default();
        for ids in by_z.values_mut() {
            if ids.len() < 2 {
                continue;
            }
            report.found += 1;
            ids.sort();
            losers.extend(ids.iter().skip(1).copied());
        }

        for id in losers {
            let Some(reg) = self.registrations.get(&id).copied() else {
                continue;
            };
            self.release_z_index(id);
            let z_index = self.next_free(reg.layer, reg.priority);
            self.register(id, reg.layer, reg.priority, z_index);
            report.resolved += 1;
        }

        if report.found > 0 {
            log::debug!("Resolved {} z-index conflicts ({} reassigned)", report.found, report.resolved);
        }
        report
    }

    /// Drop registrations for elements that no longer exist.
    pub fn cleanup(&mut self, is_alive: impl Fn(&ElementId) -> bool) -> usize {
        let stale: Vec<ElementId> = self
            .registrations
            .keys()
            .filter(|id| !is_alive(id))
            .copied()
            .collect();
        for id in &stale {
            self.release_z_index(*id);
        }
        if !stale.is_empty() {
            log::debug!("Released {} stale layer registrations", stale.len());
        }
        stale.len()
    }

    pub fn z_index_of(&self, id: ElementId) -> Option<i32> {
        self.registrations.get(&id).map(|r| r.z_index)
    }

    pub fn registration(&self, id: ElementId) -> Option<Registration> {
        self.registrations.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Per-layer usage.
    pub fn stats(&self) -> Vec<LayerStats> {
        LayerType::ALL
            .iter()
            .map(|&layer| {
                let usage = self.usage.get(&layer).copied().unwrap_or_default();
                LayerStats {
                    layer,
                    usage: usage.count,
                    max_elements: layer.spec().max_elements,
                    next_slot: usage.next_slot,
                }
            })
            .collect()
    }

    /// Forget everything (session teardown).
    pub fn clear(&mut self) {
        self.registrations.clear();
        self.usage.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use uuid::Uuid;

    #[test]
    fn test_bands_do_not_overlap() {
        let mut prev_end: Option<i32> = None;
        for layer in LayerType::ALL {
            let spec = layer.spec();
            if let Some(end) = prev_end {
                assert!(spec.base > end, "{layer:?} starts inside previous band");
            }
            let worst = spec.base + Priority::Critical.offset() + spec.max_elements as i32;
            if !spec.allows_overlap {
                assert!(worst <= spec.band_end, "{layer:?} can outgrow its band");
            }
            prev_end = Some(spec.band_end);
        }
    }

    #[test]
    fn test_assign_slots_increase() {
        let mut lm = LayerManager::new();
        let a = lm.assign_z_index(Uuid::new_v4(), LayerType::DomBubbles, Priority::Normal);
        let b = lm.assign_z_index(Uuid::new_v4(), LayerType::DomBubbles, Priority::Normal);
        assert_eq!(a, 1010);
        assert_eq!(b, 1011);
    }

    #[test]
    fn test_priority_offsets() {
        let mut lm = LayerManager::new();
        assert_eq!(lm.assign_z_index(Uuid::new_v4(), LayerType::ScenePanels, Priority::Low), 100);
        assert_eq!(lm.assign_z_index(Uuid::new_v4(), LayerType::ScenePanels, Priority::High), 121);
        assert_eq!(lm.assign_z_index(Uuid::new_v4(), LayerType::ScenePanels, Priority::Critical), 132);
    }

    #[test]
    fn test_overlap_layer_shares_value() {
        let mut lm = LayerManager::new();
        let a = lm.assign_z_index(Uuid::new_v4(), LayerType::DomOverlays, Priority::Normal);
        let b = lm.assign_z_index(Uuid::new_v4(), LayerType::DomOverlays, Priority::Normal);
        assert_eq!(a, 4010);
        assert_eq!(a, b);
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut lm = LayerManager::new();
        let id = Uuid::new_v4();
        lm.assign_z_index(id, LayerType::DomText, Priority::Normal);
        lm.release_z_index(id);
        lm.release_z_index(id);
        lm.release_z_index(Uuid::new_v4());
        assert!(lm.is_empty());
        let stats = lm.stats();
        let text = stats.iter().find(|s| s.layer == LayerType::DomText).unwrap();
        assert_eq!(text.usage, 0);
        assert_eq!(text.next_slot, 0);
    }

    #[test]
    fn test_soft_limit_still_allocates() {
        let mut lm = LayerManager::new();
        let max = LayerType::SceneBackground.spec().max_elements;
        for _ in 0..max + 5 {
            lm.assign_z_index(Uuid::new_v4(), LayerType::SceneBackground, Priority::Normal);
        }
        assert_eq!(lm.len(), max + 5);
    }

    #[test]
    fn test_update_priority() {
        let mut lm = LayerManager::new();
        let id = Uuid::new_v4();
        lm.assign_z_index(id, LayerType::SceneImages, Priority::Normal);
        let z = lm.update_priority(id, Priority::Critical).unwrap();
        assert!(z >= 430);
        assert_eq!(lm.z_index_of(id), Some(z));
        assert_eq!(lm.len(), 1);
        assert_eq!(lm.update_priority(Uuid::new_v4(), Priority::Low), None);
    }

    #[test]
    fn test_resolve_conflicts_unique() {
        let mut lm = LayerManager::new();
        let ids: Vec<_> = (0..4).map(|_| Uuid::new_v4()).collect();
        for id in &ids {
            lm.assign_z_index(*id, LayerType::DomOverlays, Priority::Normal);
        }
        let other = Uuid::new_v4();
        lm.assign_z_index(other, LayerType::DomBubbles, Priority::Normal);

        let report = lm.resolve_conflicts();
        assert_eq!(report.found, 1);
        assert_eq!(report.resolved, 3);

        let mut seen = HashSet::new();
        for id in ids.iter().chain(std::iter::once(&other)) {
            assert!(seen.insert(lm.z_index_of(*id).unwrap()));
        }
        assert_eq!(lm.resolve_conflicts(), ConflictReport::default());
    }

    #[test]
    fn test_cleanup_stale() {
        let mut lm = LayerManager::new();
        let keep = Uuid::new_v4();
        let drop = Uuid::new_v4();
        lm.assign_z_index(keep, LayerType::ScenePanels, Priority::Normal);
        lm.assign_z_index(drop, LayerType::ScenePanels, Priority::Normal);
        assert_eq!(lm.cleanup(|id| *id == keep), 1);
        assert!(lm.z_index_of(keep).is_some());
        assert!(lm.z_index_of(drop).is_none());
    }

    #[test]
    fn test_send_to_back_goes_below_all() {
        let mut lm = LayerManager::new();
        let ids: Vec<_> = (0..12).map(|_| Uuid::new_v4()).collect();
        for id in &ids {
            lm.assign_z_index(*id, LayerType::ScenePanels, Priority::Normal);
        }
        let z = lm.send_to_back(ids[3]).unwrap();
        assert_eq!(z, 109);
        assert_eq!(lm.registration(ids[3]).map(|r| r.priority), Some(Priority::Low));
        for id in ids.iter().filter(|&&id| id != ids[3]) {
            assert!(lm.z_index_of(*id).unwrap() > z);
        }
    }

    #[test]
    fn test_send_to_back_at_base_compacts() {
        let mut lm = LayerManager::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        lm.assign_z_index(a, LayerType::DomText, Priority::Low);
        lm.assign_z_index(b, LayerType::DomText, Priority::Normal);
        lm.assign_z_index(c, LayerType::DomText, Priority::Normal);
        assert_eq!(lm.z_index_of(a), Some(2000));
        assert_eq!(lm.send_to_back(c), Some(2000));
        assert_eq!(lm.z_index_of(a), Some(2001));
        assert_eq!(lm.z_index_of(b), Some(2002));
    }

    #[test]
    fn test_slot_churn_stays_in_band() {
        let mut lm = LayerManager::new();
        let kept = Uuid::new_v4();
        lm.assign_z_index(kept, LayerType::ScenePanels, Priority::Normal);
        let band_end = LayerType::ScenePanels.spec().band_end;
        for _ in 0..1000 {
            let id = Uuid::new_v4();
            let z = lm.assign_z_index(id, LayerType::ScenePanels, Priority::Normal);
            assert!(z <= band_end);
            assert!(z > lm.z_index_of(kept).unwrap());
            lm.release_z_index(id);
        }
        let image = lm.assign_z_index(Uuid::new_v4(), LayerType::SceneImages, Priority::Normal);
        let panel = lm.assign_z_index(Uuid::new_v4(), LayerType::ScenePanels, Priority::Normal);
        assert!(panel < image);
    }

    #[test]
    fn test_low_priority_skips_taken_values() {
        let mut lm = LayerManager::new();
        let ids: Vec<_> = (0..12).map(|_| Uuid::new_v4()).collect();
        for id in &ids {
            lm.assign_z_index(*id, LayerType::ScenePanels, Priority::Normal);
        }
        let low = lm.assign_z_index(Uuid::new_v4(), LayerType::ScenePanels, Priority::Low);
        assert!(ids.iter().all(|id| lm.z_index_of(*id) != Some(low)));
        assert_eq!(lm.resolve_conflicts(), ConflictReport::default());
    }

    #[test]
    fn test_bring_to_front() {
        let mut lm = LayerManager::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        lm.assign_z_index(a, LayerType::ScenePanels, Priority::Normal);
        lm.assign_z_index(b, LayerType::ScenePanels, Priority::Normal);
        let z = lm.bring_to_front(a).unwrap();
        assert!(z > lm.z_index_of(b).unwrap());
    }
}
