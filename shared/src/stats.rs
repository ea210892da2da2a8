//! Player progression math, used by the account endpoints around the core
//! game loop.

/// Experience required to reach a given level.
/// Level 1 = 100, scaling by 1.5x per level.
pub fn experience_required(level: i32) -> i64 {
    (100.0 * 1.5_f64.powi(level - 1)).floor() as i64
}

pub fn can_level_up(current_level: i32, current_exp: i64) -> bool {
    current_exp >= experience_required(current_level + 1)
}

/// Determine the level for a given total experience.
pub fn calculate_level(total_exp: i64) -> i32 {
    let mut level = 1;
    while total_exp >= experience_required(level + 1) {
        level += 1;
    }
    level
}
