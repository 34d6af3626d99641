//! Material, labor and equipment quantities derived from floor area and
//! floor count. The coefficients are fixed rules of thumb.

use crate::types::Material;
use serde::Serialize;

const CEMENT_T_PER_M2_FLOOR: f64 = 0.15;
const STEEL_T_PER_M2_FLOOR: f64 = 0.05;
const CONCRETE_M3_PER_M2_FLOOR: f64 = 0.5;
const BLOCKS_K_PER_M2_FLOOR: f64 = 1.2;
const PAINT_M2_PER_M2: f64 = 2.0;
const GLASS_M2_PER_M2: f64 = 0.15;
const WOOD_M2_PER_M2: f64 = 0.12;
const LABOR_H_PER_M2_FLOOR: f64 = 2.0;
const EQUIPMENT_DAYS_PER_FLOOR: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuantitySet {
    pub cement_tons: f64,
    pub steel_tons: f64,
    pub concrete_m3: f64,
    pub blocks_thousands: f64,
    pub tiles_m2: f64,
    pub paint_m2: f64,
    pub glass_m2: f64,
    pub wood_m2: f64,
    pub labor_hours: f64,
    pub equipment_days: f64,
}

impl QuantitySet {
    pub fn get(&self, material: Material) -> f64 {
        match material {
            Material::Cement => self.cement_tons,
            Material::Steel => self.steel_tons,
            Material::Concrete => self.concrete_m3,
            Material::Blocks => self.blocks_thousands,
            Material::Tiles => self.tiles_m2,
            Material::Paint => self.paint_m2,
            Material::Glass => self.glass_m2,
            Material::Wood => self.wood_m2,
            Material::Labor => self.labor_hours,
            Material::Equipment => self.equipment_days,
        }
    }
}

/// Structural items and labor scale with total built area (area x floors);
/// finishes scale with the footprint area only; equipment with floors.
pub fn estimate_quantities(area: f64, floors: u32) -> QuantitySet {
    let floors = f64::from(floors);
    let built = area * floors;
    QuantitySet {
        cement_tons: built * CEMENT_T_PER_M2_FLOOR,
        steel_tons: built * STEEL_T_PER_M2_FLOOR,
        concrete_m3: built * CONCRETE_M3_PER_M2_FLOOR,
        blocks_thousands: built * BLOCKS_K_PER_M2_FLOOR,
        tiles_m2: area,
        paint_m2: area * PAINT_M2_PER_M2,
        glass_m2: area * GLASS_M2_PER_M2,
        wood_m2: area * WOOD_M2_PER_M2,
        labor_hours: built * LABOR_H_PER_M2_FLOOR,
        equipment_days: floors * EQUIPMENT_DAYS_PER_FLOOR,
    }
}
