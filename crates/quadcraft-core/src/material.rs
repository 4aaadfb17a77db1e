use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::MaterialId;

/// Color used for material ids missing from the registry.
pub const FALLBACK_COLOR: [f32; 3] = [0.5, 0.5, 0.5];

/// A single material definition loaded from RON data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialDef {
    /// Stable material ID. 0 = air.
    pub id: u16,
    /// Human-readable name for debug display.
    pub name: String,
    /// Faces bordering this material stay visible.
    #[serde(default)]
    pub transparent: bool,
    /// Whether the material blocks movement. Meshing ignores it.
    #[serde(default = "default_solid")]
    pub solid: bool,
    /// RGB color (0.0–1.0 per channel).
    pub color: (f32, f32, f32),
}

fn default_solid() -> bool {
    true
}

/// Capability the mesher uses to resolve material properties.
///
/// Unknown ids must resolve to a fallback rather than fail: an opaque
/// material colored [`FALLBACK_COLOR`].
pub trait MaterialRegistry: Send + Sync {
    fn is_transparent(&self, id: MaterialId) -> bool;
    fn color(&self, id: MaterialId) -> [f32; 3];
}

/// Collection of material definitions indexed by ID.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterialTable {
    pub materials: Vec<MaterialDef>,
}

impl MaterialTable {
    /// Built-in block set: air, stone, dirt, grass, water, sand, glass.
    pub fn builtin() -> Self {
        let def = |id, name: &str, transparent, solid, color| MaterialDef {
            id,
            name: name.into(),
            transparent,
            solid,
            color,
        };
        Self {
            materials: vec![
                def(0, "air", true, false, (0.0, 0.0, 0.0)),
                def(1, "stone", false, true, (0.5, 0.5, 0.5)),
                def(2, "dirt", false, true, (0.6, 0.3, 0.1)),
                def(3, "grass", false, true, (0.3, 0.7, 0.2)),
                def(4, "water", true, false, (0.0, 0.3, 0.8)),
                def(5, "sand", false, true, (0.9, 0.8, 0.6)),
                def(6, "glass", true, true, (0.8, 0.9, 0.95)),
            ],
        }
    }

    /// Look up a material by ID. Returns None if not found.
    pub fn get(&self, id: u16) -> Option<&MaterialDef> {
        self.materials.iter().find(|m| m.id == id)
    }

    /// Look up a material by name.
    pub fn by_name(&self, name: &str) -> Option<&MaterialDef> {
        self.materials.iter().find(|m| m.name == name)
    }

    /// Get the maximum material ID in the table.
    pub fn max_id(&self) -> u16 {
        self.materials.iter().map(|m| m.id).max().unwrap_or(0)
    }

    /// Number of materials.
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

impl MaterialRegistry for MaterialTable {
    fn is_transparent(&self, id: MaterialId) -> bool {
        match self.get(id.0) {
            Some(m) => m.transparent,
            None => {
                log::debug!("unknown material {} treated as opaque", id.0);
                false
            }
        }
    }

    fn color(&self, id: MaterialId) -> [f32; 3] {
        self.get(id.0)
            .map(|m| [m.color.0, m.color.1, m.color.2])
            .unwrap_or(FALLBACK_COLOR)
    }
}

/// Parse a single materials RON string into a MaterialTable.
pub fn load_materials_from_str(ron_str: &str) -> Result<MaterialTable, ConfigError> {
    let options = ron::Options::default();
    let materials: Vec<MaterialDef> = options
        .from_str(ron_str)
        .map_err(|e| ConfigError::MaterialParseError(e.to_string()))?;
    Ok(MaterialTable { materials })
}

/// Load and merge multiple material sources. Later sources override
/// earlier entries with the same id.
pub fn load_all_materials(sources: &[&str]) -> Result<MaterialTable, ConfigError> {
    let mut merged = MaterialTable::default();
    for source in sources {
        let table = load_materials_from_str(source)?;
        for material in table.materials {
            if let Some(existing) = merged.materials.iter_mut().find(|m| m.id == material.id) {
                log::info!("material {} '{}' overridden", material.id, material.name);
                *existing = material;
            } else {
                merged.materials.push(material);
            }
        }
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GLASS_RON: &str = r#"[
        (id: 1, name: "marble", color: (0.9, 0.9, 0.9)),
        (id: 7, name: "ice", transparent: true, color: (0.7, 0.8, 1.0)),
    ]"#;

    #[test]
    fn test_builtin_matches_block_set() {
        let table = MaterialTable::builtin();
        assert_eq!(table.len(), 7);
        assert!(table.is_transparent(MaterialId(0)));
        assert!(!table.is_transparent(MaterialId(1)));
        assert!(table.is_transparent(MaterialId(4)));
        assert_eq!(table.by_name("sand").map(|m| m.id), Some(5));
    }

    #[test]
    fn test_unknown_material_falls_back() {
        let table = MaterialTable::builtin();
        assert!(!table.is_transparent(MaterialId(999)));
        assert_eq!(table.color(MaterialId(999)), FALLBACK_COLOR);
    }

    #[test]
    fn test_load_from_ron_defaults() {
        let table = load_materials_from_str(GLASS_RON).expect("valid RON");
        assert_eq!(table.len(), 2);
        let marble = table.get(1).expect("marble");
        assert!(!marble.transparent);
        assert!(marble.solid);
        assert!(table.get(7).expect("ice").transparent);
    }

    #[test]
    fn test_load_all_overrides_by_id() {
        let base = ron::to_string(&MaterialTable::builtin().materials).expect("serialize");
        let table = load_all_materials(&[&base, GLASS_RON]).expect("valid RON");
        assert_eq!(table.len(), 8);
        assert_eq!(table.get(1).map(|m| m.name.as_str()), Some("marble"));
        assert_eq!(table.max_id(), 7);
    }

    #[test]
    fn test_malformed_ron_is_an_error() {
        assert!(matches!(
            load_materials_from_str("[(id: )]"),
            Err(ConfigError::MaterialParseError(_))
        ));
    }
}
