use super::models::PlayerStats;

const SEPARATOR: &str = "|";

/// Deterministic duplicate-detection key for a match.
///
/// The two `(user_id, stats)` pairs are ordered by user id first, so the same
/// match submitted by either participant (with team1/team2 in either order)
/// yields the same string. Per-side fields are interleaved in a fixed order:
/// score, possession, shots, shots on target, saves, passes, tackles, fouls.
/// Optional and volatile fields are left out, so two matches that agree on
/// every listed field collide; that is accepted.
pub fn match_fingerprint(
    first_user: &str,
    first: &PlayerStats,
    second_user: &str,
    second: &PlayerStats,
) -> String {
    let (low_user, low, high_user, high) = if first_user <= second_user {
        (first_user, first, second_user, second)
    } else {
        (second_user, second, first_user, first)
    };

    let fields: [String; 18] = [
        low_user.to_string(),
        high_user.to_string(),
        low.score.to_string(),
        high.score.to_string(),
        low.possession.clone(),
        high.possession.clone(),
        low.shots.to_string(),
        high.shots.to_string(),
        low.shots_on_target.to_string(),
        high.shots_on_target.to_string(),
        low.saves.to_string(),
        high.saves.to_string(),
        low.passes.to_string(),
        high.passes.to_string(),
        low.tackles.to_string(),
        high.tackles.to_string(),
        low.fouls.to_string(),
        high.fouls.to_string(),
    ];

    fields.join(SEPARATOR)
}
