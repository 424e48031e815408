//! Entity catalog: the authored list of everything placed on the farm.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entity::EntityKind;
use crate::error::{FarmError, Result};
use crate::lifecycle::{
    Crop, CropParams, FruitProducer, Lifecycle, Producer, ResourceNode, StaticEntity,
};
use crate::math::{Millis, Vec2Fixed, WORLD_LIMIT};
use crate::movement::Facing;

/// Catalog identifier. Authoring tools emit either strings (`"tree_1"`) or
/// bare numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CatalogId {
    /// Numeric id.
    Number(u64),
    /// String id.
    Text(String),
}

impl fmt::Display for CatalogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

fn default_wood() -> Vec<String> {
    vec!["wood".to_string()]
}

fn default_stone() -> Vec<String> {
    vec!["stone".to_string()]
}

fn default_crop_type() -> String {
    "type1".to_string()
}

const fn default_max_stage() -> u8 {
    4
}

const fn default_rock_health() -> u32 {
    3
}

/// A plain tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeRecord {
    /// Catalog id.
    pub id: CatalogId,
    /// World position.
    pub position: Vec2Fixed,
    /// Visual variant ("oak", "pine", ...).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub tree_type: Option<String>,
    /// Items handed over when chopped.
    #[serde(default = "default_wood")]
    pub drop_items: Vec<String>,
}

/// A fruit tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FruitTreeRecord {
    /// Catalog id.
    pub id: CatalogId,
    /// World position.
    pub position: Vec2Fixed,
    /// Fruit handed over when shaken.
    pub fruit_type: String,
    /// Time to grow one fruit.
    pub fruit_growth_time: Millis,
    /// Cap on hanging fruit.
    pub max_fruits: u32,
    /// Fruit hanging at load.
    #[serde(default)]
    pub current_fruits: u32,
    /// Start of the current regeneration period.
    #[serde(default)]
    pub last_dropped: Option<Millis>,
    /// Season tag, carried for presentation only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<String>,
}

/// A breakable rock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RockRecord {
    /// Catalog id.
    pub id: CatalogId,
    /// World position.
    pub position: Vec2Fixed,
    /// Items dropped on every hit.
    #[serde(default = "default_stone")]
    pub drop_items: Vec<String>,
    /// Hits before the rock breaks.
    #[serde(default = "default_rock_health")]
    pub health: u32,
    /// Delay before a broken rock grows back.
    pub respawn_time: Millis,
}

/// A crop plot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropRecord {
    /// Catalog id.
    pub id: CatalogId,
    /// World position.
    pub position: Vec2Fixed,
    /// Crop variety; also the harvested product.
    #[serde(rename = "type", default = "default_crop_type")]
    pub crop_type: String,
    /// Stage at load.
    #[serde(default)]
    pub growth_stage: u8,
    /// Final stage.
    #[serde(default = "default_max_stage")]
    pub max_stage: u8,
    /// Time per stage.
    pub growth_time: Millis,
    /// First watering, if already planted.
    #[serde(default)]
    pub planted_time: Option<Millis>,
    /// Most recent watering; defaults to `plantedTime` for watered plots.
    #[serde(default)]
    pub last_watered: Option<Millis>,
    /// Watered for the current stage.
    #[serde(default)]
    pub watered: bool,
    /// Dead from neglect.
    #[serde(default)]
    pub withered: bool,
    /// Ripe.
    #[serde(default)]
    pub harvestable: bool,
}

/// A cow or chicken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimalRecord {
    /// Catalog id.
    pub id: CatalogId,
    /// Spawn position; also the centre of the wander radius.
    pub position: Vec2Fixed,
    /// Initial facing.
    #[serde(default)]
    pub direction: Facing,
    /// What the animal yields ("milk", "egg").
    pub product: String,
    /// Cooldown between products.
    pub production_time: Millis,
    /// Last production, if any.
    #[serde(default)]
    pub last_produced: Option<Millis>,
}

/// The whole catalog, one array per category.
///
/// # Example JSON
///
/// ```json
/// {
///   "trees": [{ "id": "tree_1", "position": { "x": 120, "y": 80 } }],
///   "rocks": [{ "id": 7, "position": { "x": 300, "y": 90 }, "respawnTime": 30000 }],
///   "cows": [{ "id": "cow_1", "position": { "x": 600, "y": 400 },
///              "product": "milk", "productionTime": 60000 }]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityCatalog {
    /// Plain trees.
    #[serde(default)]
    pub trees: Vec<TreeRecord>,
    /// Fruit trees.
    #[serde(default)]
    pub fruit_trees: Vec<FruitTreeRecord>,
    /// Rocks.
    #[serde(default)]
    pub rocks: Vec<RockRecord>,
    /// Crop plots.
    #[serde(default)]
    pub crops: Vec<CropRecord>,
    /// Cows.
    #[serde(default)]
    pub cows: Vec<AnimalRecord>,
    /// Chickens.
    #[serde(default)]
    pub chickens: Vec<AnimalRecord>,
}

/// A validated catalog entry, ready to spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySpec {
    /// Catalog id as text.
    pub label: String,
    /// Category.
    pub kind: EntityKind,
    /// Spawn position.
    pub position: Vec2Fixed,
    /// Initial facing for animals.
    pub facing: Option<Facing>,
    /// Initial lifecycle state.
    pub lifecycle: Lifecycle,
}

impl EntityCatalog {
    /// Parse a catalog from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(FarmError::CatalogParse)
    }

    /// Serialize the catalog to pretty JSON.
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(FarmError::CatalogParse)
    }

    /// Total number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.trees.len()
            + self.fruit_trees.len()
            + self.rocks.len()
            + self.crops.len()
            + self.cows.len()
            + self.chickens.len()
    }

    /// Whether the catalog has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ids(&self) -> impl Iterator<Item = &CatalogId> {
        self.trees
            .iter()
            .map(|r| &r.id)
            .chain(self.fruit_trees.iter().map(|r| &r.id))
            .chain(self.rocks.iter().map(|r| &r.id))
            .chain(self.crops.iter().map(|r| &r.id))
            .chain(self.cows.iter().map(|r| &r.id))
            .chain(self.chickens.iter().map(|r| &r.id))
    }

    fn placements(&self) -> impl Iterator<Item = (&CatalogId, Vec2Fixed)> {
        self.trees
            .iter()
            .map(|r| (&r.id, r.position))
            .chain(self.fruit_trees.iter().map(|r| (&r.id, r.position)))
            .chain(self.rocks.iter().map(|r| (&r.id, r.position)))
            .chain(self.crops.iter().map(|r| (&r.id, r.position)))
            .chain(self.cows.iter().map(|r| (&r.id, r.position)))
            .chain(self.chickens.iter().map(|r| (&r.id, r.position)))
    }

    /// Validate internal consistency.
    ///
    /// Checks for:
    /// - Duplicate ids across all categories
    /// - Positions beyond [`WORLD_LIMIT`]
    /// - Crop stages and flags that no sequence of actions could produce
    /// - Zero timers and empty capacities
    ///
    /// Returns a list of validation errors.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let mut seen = HashSet::new();
        for id in self.ids() {
            if !seen.insert(id.to_string()) {
                errors.push(format!("Duplicate catalog id '{id}'"));
            }
        }

        for (id, position) in self.placements() {
            if !position.within_world_limit() {
                errors.push(format!(
                    "'{id}' is placed beyond the world limit of {WORLD_LIMIT}"
                ));
            }
        }

        for crop in &self.crops {
            if crop.max_stage == 0 {
                errors.push(format!("Crop '{}' has max stage 0", crop.id));
            }
            if crop.growth_stage > crop.max_stage {
                errors.push(format!(
                    "Crop '{}' growth stage {} exceeds max stage {}",
                    crop.id, crop.growth_stage, crop.max_stage
                ));
            }
            if crop.harvestable && crop.growth_stage != crop.max_stage {
                errors.push(format!(
                    "Crop '{}' is harvestable below its max stage",
                    crop.id
                ));
            }
            if crop.harvestable && crop.withered {
                errors.push(format!("Crop '{}' is both harvestable and withered", crop.id));
            }
            if crop.growth_time == 0 {
                errors.push(format!("Crop '{}' has zero growth time", crop.id));
            }
        }

        for rock in &self.rocks {
            if rock.health == 0 {
                errors.push(format!("Rock '{}' has zero health", rock.id));
            }
        }

        for tree in &self.fruit_trees {
            if tree.max_fruits == 0 {
                errors.push(format!("Fruit tree '{}' has zero max fruits", tree.id));
            }
            if tree.current_fruits > tree.max_fruits {
                errors.push(format!(
                    "Fruit tree '{}' holds {} fruits but caps at {}",
                    tree.id, tree.current_fruits, tree.max_fruits
                ));
            }
        }

        for animal in self.cows.iter().chain(&self.chickens) {
            if animal.production_time == 0 {
                errors.push(format!("Animal '{}' has zero production time", animal.id));
            }
        }

        errors
    }

    /// Validate and convert every record into a spawnable spec.
    ///
    /// Records are emitted in category order (trees, fruit trees, rocks,
    /// crops, cows, chickens), then catalog order, so entity ids are stable
    /// for a given file.
    pub fn to_specs(&self, wither_after_ms: Millis) -> Result<Vec<EntitySpec>> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(FarmError::InvalidCatalog { errors });
        }

        let mut specs = Vec::with_capacity(self.len());
        specs.extend(self.trees.iter().map(|r| EntitySpec {
            label: r.id.to_string(),
            kind: EntityKind::Tree,
            position: r.position,
            facing: None,
            lifecycle: Lifecycle::Static(StaticEntity {
                drop_items: r.drop_items.clone(),
            }),
        }));
        specs.extend(self.fruit_trees.iter().map(|r| EntitySpec {
            label: r.id.to_string(),
            kind: EntityKind::FruitTree,
            position: r.position,
            facing: None,
            lifecycle: Lifecycle::FruitProducer(FruitProducer::new(
                r.fruit_type.clone(),
                r.current_fruits,
                r.max_fruits,
                r.fruit_growth_time,
                r.last_dropped,
            )),
        }));
        specs.extend(self.rocks.iter().map(|r| {
            let node = ResourceNode::new(r.drop_items.clone(), r.health, r.respawn_time);
            EntitySpec {
                label: r.id.to_string(),
                kind: EntityKind::Rock,
                position: r.position,
                facing: None,
                lifecycle: Lifecycle::ResourceNode(node),
            }
        }));
        specs.extend(self.crops.iter().map(|r| EntitySpec {
            label: r.id.to_string(),
            kind: EntityKind::Crop,
            position: r.position,
            facing: None,
            lifecycle: Lifecycle::Crop(crop_from_record(r, wither_after_ms)),
        }));
        for (kind, animals) in [(EntityKind::Cow, &self.cows), (EntityKind::Chicken, &self.chickens)]
        {
            specs.extend(animals.iter().map(|r| EntitySpec {
                label: r.id.to_string(),
                kind,
                position: r.position,
                facing: Some(r.direction),
                lifecycle: Lifecycle::Producer(Producer::new(
                    r.product.clone(),
                    r.production_time,
                    r.last_produced,
                )),
            }));
        }

        tracing::info!(entities = specs.len(), "Entity catalog converted");
        Ok(specs)
    }
}

fn crop_from_record(record: &CropRecord, wither_after_ms: Millis) -> Crop {
    let params = CropParams {
        max_stage: record.max_stage,
        growth_time_ms: record.growth_time,
        wither_after_ms,
    };
    let started = record.watered || record.withered || record.harvestable || record.growth_stage > 0;
    let planted_at = record.planted_time.or_else(|| started.then_some(0));
    let last_watered_at = record
        .last_watered
        .or_else(|| if record.watered { planted_at } else { None });

    Crop {
        growth_stage: record.growth_stage,
        planted_at,
        last_watered_at,
        watered: record.watered && !record.withered,
        withered: record.withered,
        harvestable: record.harvestable,
        ..Crop::unplanted(record.crop_type.clone(), params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::{CropPhase, LifecycleState};

    const SAMPLE: &str = r#"{
        "trees": [{ "id": "tree_1", "position": { "x": 120, "y": 80 } }],
        "fruitTrees": [{
            "id": "apple_1", "position": { "x": 200, "y": 80 },
            "fruitType": "apple", "fruitGrowthTime": 60000,
            "maxFruits": 3, "currentFruits": 2, "season": "summer"
        }],
        "rocks": [{ "id": 7, "position": { "x": 300, "y": 90 }, "health": 3, "respawnTime": 30000 }],
        "crops": [{ "id": "crop_1", "position": { "x": 410, "y": 310 }, "growthTime": 10000 }],
        "cows": [{
            "id": "cow_1", "position": { "x": 600, "y": 400 }, "direction": "left",
            "product": "milk", "productionTime": 60000
        }],
        "chickens": [{
            "id": "chicken_1", "position": { "x": 650, "y": 420 },
            "product": "egg", "productionTime": 30000, "lastProduced": 0
        }]
    }"#;

    #[test]
    fn test_parse_sample_catalog() {
        let catalog = EntityCatalog::from_json_str(SAMPLE).unwrap();
        assert_eq!(catalog.len(), 6);
        assert_eq!(catalog.trees[0].drop_items, vec!["wood".to_string()]);
        assert_eq!(catalog.rocks[0].id, CatalogId::Number(7));
        assert_eq!(catalog.crops[0].crop_type, "type1");
        assert_eq!(catalog.crops[0].max_stage, 4);
        assert_eq!(catalog.cows[0].direction, Facing::Left);
        assert_eq!(catalog.chickens[0].direction, Facing::Down);
        assert!(catalog.validate().is_empty());
    }

    #[test]
    fn test_missing_categories_default_empty() {
        let catalog = EntityCatalog::from_json_str(r#"{ "trees": [] }"#).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = EntityCatalog::from_json_str(r#"{ "rocks": [{ "id": 1 }] }"#).unwrap_err();
        assert!(matches!(err, FarmError::CatalogParse(_)));
    }

    #[test]
    fn test_specs_in_category_order() {
        let catalog = EntityCatalog::from_json_str(SAMPLE).unwrap();
        let specs = catalog.to_specs(300_000).unwrap();
        let kinds: Vec<EntityKind> = specs.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EntityKind::Tree,
                EntityKind::FruitTree,
                EntityKind::Rock,
                EntityKind::Crop,
                EntityKind::Cow,
                EntityKind::Chicken,
            ]
        );
        assert_eq!(specs[2].label, "7");
        assert_eq!(specs[4].facing, Some(Facing::Left));
        assert_eq!(
            specs[1].lifecycle.state(0),
            LifecycleState::Fruiting {
                fruits: 2,
                max_fruits: 3
            }
        );
    }

    #[test]
    fn test_validation_collects_every_problem() {
        let mut catalog = EntityCatalog::from_json_str(SAMPLE).unwrap();
        catalog.crops[0].growth_stage = 9;
        catalog.crops[0].harvestable = true;
        catalog.rocks[0].health = 0;
        catalog.trees.push(catalog.trees[0].clone());

        let err = catalog.to_specs(300_000).unwrap_err();
        let FarmError::InvalidCatalog { errors } = err else {
            panic!("expected InvalidCatalog, got {err:?}");
        };
        assert_eq!(errors.len(), 4, "{errors:#?}");
        assert!(errors.iter().any(|e| e.contains("Duplicate catalog id 'tree_1'")));
    }

    #[test]
    fn test_far_placement_rejected() {
        let catalog = EntityCatalog::from_json_str(
            r#"{
                "trees": [{ "id": "tree_far", "position": { "x": 50000, "y": 300 } }],
                "cows": [{
                    "id": "cow_far", "position": { "x": 600, "y": -16001 },
                    "product": "milk", "productionTime": 60000
                }]
            }"#,
        )
        .unwrap();

        let errors = catalog.validate();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("tree_far"));
        assert!(matches!(
            catalog.to_specs(300_000),
            Err(FarmError::InvalidCatalog { .. })
        ));
    }

    #[test]
    fn test_string_and_number_ids_collide() {
        let catalog = EntityCatalog {
            trees: vec![
                TreeRecord {
                    id: CatalogId::Number(1),
                    position: Vec2Fixed::ZERO,
                    tree_type: None,
                    drop_items: default_wood(),
                },
                TreeRecord {
                    id: CatalogId::Text("1".into()),
                    position: Vec2Fixed::ZERO,
                    tree_type: None,
                    drop_items: default_wood(),
                },
            ],
            ..EntityCatalog::default()
        };
        assert_eq!(catalog.validate().len(), 1);
    }

    #[test]
    fn test_watered_crop_record_is_planted() {
        let record = CropRecord {
            id: CatalogId::Text("c".into()),
            position: Vec2Fixed::ZERO,
            crop_type: "type2".into(),
            growth_stage: 2,
            max_stage: 4,
            growth_time: 1_000,
            planted_time: Some(500),
            last_watered: None,
            watered: true,
            withered: false,
            harvestable: false,
        };
        let crop = crop_from_record(&record, 300_000);
        assert_eq!(crop.phase(), CropPhase::Growing(2));
        assert_eq!(crop.last_watered_at, Some(500));
    }

    #[test]
    fn test_export_round_trip_keeps_camel_case() {
        let catalog = EntityCatalog::from_json_str(SAMPLE).unwrap();
        let json = catalog.to_json_string().unwrap();
        assert!(json.contains("\"fruitTrees\""));
        assert!(json.contains("\"respawnTime\""));
        assert_eq!(EntityCatalog::from_json_str(&json).unwrap(), catalog);
    }
}
