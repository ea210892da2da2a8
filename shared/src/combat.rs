//! Combat damage math. Not wired into the live movement loop; the
//! surrounding game resolves turn-based encounters with it.
//!
//! The random roll is a parameter so both sides can replay an encounter
//! deterministically.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CombatResult {
    pub damage: i32,
    pub is_critical: bool,
    pub remaining_hp: i32,
}

/// Calculate damage from an attack. `roll` is uniform in [0, 1); rolls above
/// 0.9 are critical hits and double the base damage of
/// `max(1, attack_power - defense)`.
pub fn calculate_damage(attack_power: i32, defense: i32, roll: f64) -> CombatResult {
    let is_critical = roll > 0.9;
    let base_damage = (attack_power - defense).max(1);
    let damage = if is_critical { base_damage * 2 } else { base_damage };

    CombatResult {
        damage,
        is_critical,
        remaining_hp: 0,
    }
}

/// Apply damage to a target and return the updated HP, floored at zero.
pub fn resolve_combat(attack_power: i32, defense: i32, target_hp: i32, roll: f64) -> CombatResult {
    let mut result = calculate_damage(attack_power, defense, roll);
    result.remaining_hp = (target_hp - result.damage).max(0);
    result
}
