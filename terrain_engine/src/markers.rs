//! Positioned point records grouped by category. Records are fixed once
//! loaded; only group visibility, group opacity and per-marker scale change
//! during a session.

use glam::Vec3;
use serde::Serialize;
use terrain_formats::PointTable;

use crate::bounds::SceneBounds;
use crate::config::CategoryDef;
use crate::transform::{CoordinateTransformer, SurveyPoint};

/// Index into the configured category table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CategoryId(pub u16);

impl CategoryId {
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// `None` once a table index no longer fits the id.
    pub fn from_index(index: usize) -> Option<Self> {
        match u16::try_from(index) {
            Ok(raw) => Some(Self(raw)),
            Err(_) => {
                log::error!("category index {index} exceeds the {} category limit", u16::MAX);
                None
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MarkerId {
    pub category: CategoryId,
    pub index: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointRecord {
    pub position: Vec3,
    pub category: CategoryId,
    /// Detail content key, when the dataset names one.
    pub key: Option<String>,
    pub fields: Vec<(String, String)>,
}

impl PointRecord {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(column, _)| column.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct MarkerGroup {
    category: CategoryId,
    records: Vec<PointRecord>,
    /// Multiple of the frame's base marker size, one per record.
    scales: Vec<f32>,
    visible: bool,
    opacity: f32,
}

impl MarkerGroup {
    pub fn new(category: CategoryId) -> Self {
        Self {
            category,
            records: Vec::new(),
            scales: Vec::new(),
            visible: true,
            opacity: 1.0,
        }
    }

    /// Places every row of a parsed table. Rows the table already rejected
    /// never reach this point.
    pub fn from_table(
        category: CategoryId,
        table: &PointTable,
        transformer: &CoordinateTransformer,
    ) -> Self {
        let mut group = Self::new(category);
        for row in &table.rows {
            group.push(PointRecord {
                position: transformer.to_scene(SurveyPoint::new(row.x, row.y)),
                category,
                key: row.key.clone(),
                fields: row.fields.clone(),
            });
        }
        group
    }

    /// Records past the `MarkerId` index range are dropped with an error.
    pub fn push(&mut self, mut record: PointRecord) {
        if u32::try_from(self.records.len()).is_err() {
            log::error!(
                "category {:?} is full; dropping record at {:?}",
                self.category,
                record.position
            );
            return;
        }
        record.category = self.category;
        self.records.push(record);
        self.scales.push(1.0);
    }

    pub fn category(&self) -> CategoryId {
        self.category
    }

    pub fn records(&self) -> &[PointRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn scale(&self, index: usize) -> Option<f32> {
        self.scales.get(index).copied()
    }

    pub fn set_scale(&mut self, index: usize, scale: f32) {
        if let Some(slot) = self.scales.get_mut(index) {
            *slot = scale;
        }
    }

    pub fn bounds(&self) -> Option<SceneBounds> {
        SceneBounds::from_points(self.records.iter().map(|record| record.position))
    }
}

/// One group per configured category, indexed by `CategoryId`.
#[derive(Debug, Clone, Default)]
pub struct MarkerSet {
    groups: Vec<MarkerGroup>,
    /// Light/dark blend written by the mode crossfade; 0 is light.
    mode_blend: f32,
}

impl MarkerSet {
    pub fn with_categories(count: usize) -> Self {
        Self {
            groups: (0..count)
                .map_while(CategoryId::from_index)
                .map(MarkerGroup::new)
                .collect(),
            mode_blend: 0.0,
        }
    }

    /// Adds a group's records to the group of the same category, growing the
    /// table when the category is new.
    pub fn insert_group(&mut self, group: MarkerGroup) {
        let index = group.category().index();
        while self.groups.len() <= index {
            let Some(next) = CategoryId::from_index(self.groups.len()) else {
                return;
            };
            self.groups.push(MarkerGroup::new(next));
        }
        let target = &mut self.groups[index];
        for record in group.records {
            target.push(record);
        }
    }

    pub fn mode_blend(&self) -> f32 {
        self.mode_blend
    }

    pub fn set_mode_blend(&mut self, t: f32) {
        self.mode_blend = t.clamp(0.0, 1.0);
    }

    /// Display colour of a category's markers at the current mode blend.
    pub fn color(&self, category: &CategoryDef) -> [f32; 3] {
        category.color_at(self.mode_blend)
    }

    pub fn groups(&self) -> &[MarkerGroup] {
        &self.groups
    }

    pub fn groups_mut(&mut self) -> &mut [MarkerGroup] {
        &mut self.groups
    }

    pub fn group(&self, category: CategoryId) -> Option<&MarkerGroup> {
        self.groups.get(category.index())
    }

    pub fn group_mut(&mut self, category: CategoryId) -> Option<&mut MarkerGroup> {
        self.groups.get_mut(category.index())
    }

    pub fn record(&self, id: MarkerId) -> Option<&PointRecord> {
        self.group(id.category)?.records.get(id.index as usize)
    }

    pub fn scale(&self, id: MarkerId) -> Option<f32> {
        self.group(id.category)?.scale(id.index as usize)
    }

    pub fn set_scale(&mut self, id: MarkerId, scale: f32) {
        if let Some(group) = self.group_mut(id.category) {
            group.set_scale(id.index as usize, scale);
        }
    }

    pub fn is_visible(&self, id: MarkerId) -> bool {
        self.group(id.category)
            .is_some_and(|group| group.is_visible() && (id.index as usize) < group.len())
    }

    /// Flips a category's visibility and returns the new state, `None` for
    /// an unknown category.
    pub fn toggle(&mut self, category: CategoryId) -> Option<bool> {
        let group = self.group_mut(category)?;
        group.set_visible(!group.is_visible());
        Some(group.is_visible())
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(MarkerGroup::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn visible_len(&self) -> usize {
        self.groups
            .iter()
            .filter(|group| group.is_visible())
            .map(MarkerGroup::len)
            .sum()
    }

    /// Every marker of every visible group, in id order.
    pub fn visible_markers(&self) -> impl Iterator<Item = (MarkerId, &PointRecord)> + '_ {
        self.groups
            .iter()
            .filter(|group| group.is_visible())
            .flat_map(|group| {
                group
                    .records
                    .iter()
                    .enumerate()
                    .map_while(move |(index, record)| {
                        let id = MarkerId {
                            category: group.category,
                            index: u32::try_from(index).ok()?,
                        };
                        Some((id, record))
                    })
            })
    }

    pub fn bounds(&self) -> Option<SceneBounds> {
        self.groups
            .iter()
            .map(MarkerGroup::bounds)
            .fold(None, SceneBounds::union)
    }
}
