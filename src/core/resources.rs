//! Town resource registers
//!
//! Every counter is a bounded integer that can only change through its named
//! adjustment method, which clamps to the counter's range.

use crate::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A resource a card effect can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKind {
    Provision,
    Education,
    Happiness,
    FireSafetyRating,
    WindSpeed,
    Temperature,
    FirefightingEquipment,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 7] = [
        ResourceKind::Provision,
        ResourceKind::Education,
        ResourceKind::Happiness,
        ResourceKind::FireSafetyRating,
        ResourceKind::WindSpeed,
        ResourceKind::Temperature,
        ResourceKind::FirefightingEquipment,
    ];

    /// Inclusive `(min, max)` range of the register
    pub const fn bounds(self) -> (i32, i32) {
        match self {
            ResourceKind::Provision => (0, 25),
            ResourceKind::Education => (0, 50),
            ResourceKind::Happiness => (0, 25),
            ResourceKind::FireSafetyRating => (0, 100),
            ResourceKind::WindSpeed => (1, 4),
            ResourceKind::Temperature => (1, 5),
            ResourceKind::FirefightingEquipment => (0, 5),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ResourceKind::Provision => "Provisions",
            ResourceKind::Education => "Education",
            ResourceKind::Happiness => "Happiness",
            ResourceKind::FireSafetyRating => "Fire Safety Rating",
            ResourceKind::WindSpeed => "Wind Speed",
            ResourceKind::Temperature => "Temperature",
            ResourceKind::FirefightingEquipment => "Firefighting Equipment",
        }
    }
}

impl FromStr for ResourceKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "provision" | "provisions" => Ok(ResourceKind::Provision),
            "education" => Ok(ResourceKind::Education),
            "happiness" => Ok(ResourceKind::Happiness),
            "firesafetyrating" | "firesafety" => Ok(ResourceKind::FireSafetyRating),
            "windspeed" | "wind" => Ok(ResourceKind::WindSpeed),
            "temperature" | "temperatureseason" => Ok(ResourceKind::Temperature),
            "firefightingequipment" | "equipment" => Ok(ResourceKind::FirefightingEquipment),
            _ => Err(EngineError::InvalidCardFormat(format!(
                "Unknown resource '{s}'"
            ))),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Starting values for a new town
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartingResources {
    pub provisions: i32,
    pub education: i32,
    pub happiness: i32,
    pub fire_safety_rating: i32,
    pub wind_speed: i32,
    pub temperature: i32,
    pub firefighting_equipment: i32,
    pub average_fuel_load: f32,
}

impl Default for StartingResources {
    fn default() -> Self {
        StartingResources {
            provisions: 12,
            education: 20,
            happiness: 15,
            fire_safety_rating: 0,
            wind_speed: 2,
            temperature: 2,
            firefighting_equipment: 2,
            average_fuel_load: 2.0,
        }
    }
}

/// Upper bound of the averaged fuel load
pub const MAX_FUEL_LOAD: f32 = 4.0;

/// The town's shared resource state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TownResources {
    provisions: i32,
    education: i32,
    happiness: i32,
    fire_safety_rating: i32,
    wind_speed: i32,
    temperature: i32,
    firefighting_equipment: i32,
    average_fuel_load: f32,
}

fn clamp_to(kind: ResourceKind, value: i32) -> i32 {
    let (lo, hi) = kind.bounds();
    value.clamp(lo, hi)
}

/// Add `delta` to a register, clamp, and return the change actually applied
fn bump(register: &mut i32, kind: ResourceKind, delta: i32) -> i32 {
    let before = *register;
    *register = clamp_to(kind, before.saturating_add(delta));
    *register - before
}

impl TownResources {
    pub fn new(start: &StartingResources) -> Self {
        TownResources {
            provisions: clamp_to(ResourceKind::Provision, start.provisions),
            education: clamp_to(ResourceKind::Education, start.education),
            happiness: clamp_to(ResourceKind::Happiness, start.happiness),
            fire_safety_rating: clamp_to(ResourceKind::FireSafetyRating, start.fire_safety_rating),
            wind_speed: clamp_to(ResourceKind::WindSpeed, start.wind_speed),
            temperature: clamp_to(ResourceKind::Temperature, start.temperature),
            firefighting_equipment: clamp_to(
                ResourceKind::FirefightingEquipment,
                start.firefighting_equipment,
            ),
            average_fuel_load: start.average_fuel_load.clamp(0.0, MAX_FUEL_LOAD),
        }
    }

    pub fn provisions(&self) -> i32 {
        self.provisions
    }

    pub fn education(&self) -> i32 {
        self.education
    }

    pub fn happiness(&self) -> i32 {
        self.happiness
    }

    pub fn fire_safety_rating(&self) -> i32 {
        self.fire_safety_rating
    }

    pub fn wind_speed(&self) -> i32 {
        self.wind_speed
    }

    pub fn temperature(&self) -> i32 {
        self.temperature
    }

    pub fn firefighting_equipment(&self) -> i32 {
        self.firefighting_equipment
    }

    pub fn average_fuel_load(&self) -> f32 {
        self.average_fuel_load
    }

    pub fn get(&self, kind: ResourceKind) -> i32 {
        match kind {
            ResourceKind::Provision => self.provisions,
            ResourceKind::Education => self.education,
            ResourceKind::Happiness => self.happiness,
            ResourceKind::FireSafetyRating => self.fire_safety_rating,
            ResourceKind::WindSpeed => self.wind_speed,
            ResourceKind::Temperature => self.temperature,
            ResourceKind::FirefightingEquipment => self.firefighting_equipment,
        }
    }

    pub fn adjust_provisions(&mut self, delta: i32) -> i32 {
        bump(&mut self.provisions, ResourceKind::Provision, delta)
    }

    pub fn adjust_education(&mut self, delta: i32) -> i32 {
        bump(&mut self.education, ResourceKind::Education, delta)
    }

    pub fn adjust_happiness(&mut self, delta: i32) -> i32 {
        bump(&mut self.happiness, ResourceKind::Happiness, delta)
    }

    pub fn adjust_fire_safety_rating(&mut self, delta: i32) -> i32 {
        bump(
            &mut self.fire_safety_rating,
            ResourceKind::FireSafetyRating,
            delta,
        )
    }

    pub fn adjust_wind_speed(&mut self, delta: i32) -> i32 {
        bump(&mut self.wind_speed, ResourceKind::WindSpeed, delta)
    }

    pub fn adjust_temperature(&mut self, delta: i32) -> i32 {
        bump(&mut self.temperature, ResourceKind::Temperature, delta)
    }

    pub fn adjust_firefighting_equipment(&mut self, delta: i32) -> i32 {
        bump(
            &mut self.firefighting_equipment,
            ResourceKind::FirefightingEquipment,
            delta,
        )
    }

    /// Route a delta to the register's own adjustment; returns the applied change
    pub fn adjust(&mut self, kind: ResourceKind, delta: i32) -> i32 {
        match kind {
            ResourceKind::Provision => self.adjust_provisions(delta),
            ResourceKind::Education => self.adjust_education(delta),
            ResourceKind::Happiness => self.adjust_happiness(delta),
            ResourceKind::FireSafetyRating => self.adjust_fire_safety_rating(delta),
            ResourceKind::WindSpeed => self.adjust_wind_speed(delta),
            ResourceKind::Temperature => self.adjust_temperature(delta),
            ResourceKind::FirefightingEquipment => self.adjust_firefighting_equipment(delta),
        }
    }

    pub fn set_average_fuel_load(&mut self, load: f32) {
        self.average_fuel_load = if load.is_finite() {
            load.clamp(0.0, MAX_FUEL_LOAD)
        } else {
            0.0
        };
    }

    /// Fire-safety rating implied by the current registers (higher is riskier)
    ///
    /// `20 + fuel*10 + 2*(temperature*wind) - 2*(education/10) - 2*equipment`,
    /// rounded half-to-even and clamped to [0, 100].
    pub fn compute_fire_safety(&self) -> i32 {
        let raw = 20.0 + self.average_fuel_load * 10.0
            + 2.0 * (self.temperature * self.wind_speed) as f32
            - 2.0 * (self.education as f32 / 10.0)
            - 2.0 * self.firefighting_equipment as f32;
        clamp_to(ResourceKind::FireSafetyRating, raw.round_ties_even() as i32)
    }

    /// Store the rating from [`compute_fire_safety`](Self::compute_fire_safety)
    pub fn recalculate_fire_safety(&mut self) -> i32 {
        self.fire_safety_rating = self.compute_fire_safety();
        self.fire_safety_rating
    }

    pub fn snapshot(&self) -> ResourceSnapshot {
        ResourceSnapshot {
            provisions: self.provisions,
            education: self.education,
            happiness: self.happiness,
            fire_safety_rating: self.fire_safety_rating,
            wind_speed: self.wind_speed,
            temperature: self.temperature,
            firefighting_equipment: self.firefighting_equipment,
            average_fuel_load: self.average_fuel_load,
        }
    }
}

impl Default for TownResources {
    fn default() -> Self {
        TownResources::new(&StartingResources::default())
    }
}

/// Copy of every register, used for before/after reporting
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    pub provisions: i32,
    pub education: i32,
    pub happiness: i32,
    pub fire_safety_rating: i32,
    pub wind_speed: i32,
    pub temperature: i32,
    pub firefighting_equipment: i32,
    pub average_fuel_load: f32,
}

impl ResourceSnapshot {
    pub fn get(&self, kind: ResourceKind) -> i32 {
        match kind {
            ResourceKind::Provision => self.provisions,
            ResourceKind::Education => self.education,
            ResourceKind::Happiness => self.happiness,
            ResourceKind::FireSafetyRating => self.fire_safety_rating,
            ResourceKind::WindSpeed => self.wind_speed,
            ResourceKind::Temperature => self.temperature,
            ResourceKind::FirefightingEquipment => self.firefighting_equipment,
        }
    }

    /// One `Label: old -> new` line per register
    pub fn summary(before: &ResourceSnapshot, after: &ResourceSnapshot) -> String {
        let mut lines: Vec<String> = ResourceKind::ALL
            .iter()
            .map(|&kind| format!("{}: {} -> {}", kind.label(), before.get(kind), after.get(kind)))
            .collect();
        lines.push(format!(
            "Average Fuel Load: {:.2} -> {:.2}",
            before.average_fuel_load, after.average_fuel_load
        ));
        lines.join("\n")
    }
}
