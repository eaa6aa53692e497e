// Pure derivations over users and match history. Nothing here touches
// storage; the service feeds in whatever slice of history the view needs.

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use std::collections::HashMap;

use super::window::months_before;
use crate::matches::{MatchModel, Outcome};
use crate::user::{percentage, AggregateStats, UserModel};

const RECENT_RIVAL_MATCHES: usize = 5;
const TREND_MONTHS: u32 = 6;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRow {
    pub rank: usize,
    pub user_id: String,
    pub name: String,
    pub avatar_url: String,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub matches_played: u32,
    /// Rounded wins / (wins + losses)
    pub win_rate: u32,
}

/// Ranks users by their stored lifetime totals
pub fn rank_all_time(users: &[UserModel]) -> Vec<LeaderboardRow> {
    rank(users.iter().map(|user| (user, user.stats.clone())).collect())
}

/// Windowed ranking, recomputed from the given matches.
///
/// Every user starts at zero and each match is replayed through the same
/// attribution as a commit, using the declared winner. Also returns the ids
/// of matches whose declared winner disagrees with the scoreline.
pub fn rank_window(users: &[UserModel], matches: &[MatchModel]) -> (Vec<LeaderboardRow>, Vec<String>) {
    let mut totals: HashMap<&str, AggregateStats> = users
        .iter()
        .map(|user| (user.id.as_str(), AggregateStats::default()))
        .collect();
    let mut divergent = Vec::new();

    for record in matches {
        if record.winner_diverges_from_score() {
            divergent.push(record.id.clone());
        }
        for user_id in &record.participants {
            let Some(total) = totals.get_mut(user_id.as_str()) else {
                continue;
            };
            if let (Some((own, other)), Some(outcome)) =
                (record.stats_for(user_id), record.outcome_for(user_id))
            {
                total.absorb(&AggregateStats::increment_for(own, other, outcome));
            }
        }
    }

    let rows = rank(
        users
            .iter()
            .map(|user| {
                let stats = totals.remove(user.id.as_str()).unwrap_or_default();
                (user, stats)
            })
            .collect(),
    );
    (rows, divergent)
}

fn rank(mut entries: Vec<(&UserModel, AggregateStats)>) -> Vec<LeaderboardRow> {
    entries.sort_by(|(_, a), (_, b)| {
        b.wins
            .cmp(&a.wins)
            .then_with(|| b.win_rate().total_cmp(&a.win_rate()))
    });

    entries
        .into_iter()
        .enumerate()
        .map(|(index, (user, stats))| LeaderboardRow {
            rank: index + 1,
            user_id: user.id.clone(),
            name: user.name.clone(),
            avatar_url: user.avatar_url.clone(),
            wins: stats.wins,
            losses: stats.losses,
            draws: stats.draws,
            goals_for: stats.goals_for,
            goals_against: stats.goals_against,
            matches_played: stats.matches_played(),
            win_rate: percentage(stats.wins, stats.wins.saturating_add(stats.losses)),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Count,
    Percent,
}

struct Category {
    title: &'static str,
    metric: fn(&AggregateStats) -> u32,
    unit: Unit,
}

#[rustfmt::skip]
const CATEGORIES: [Category; 13] = [
    Category { title: "Most Wins", metric: |s| s.wins, unit: Unit::Count },
    Category { title: "Most Losses", metric: |s| s.losses, unit: Unit::Count },
    Category { title: "Most Draws", metric: |s| s.draws, unit: Unit::Count },
    Category { title: "Best Passer", metric: |s| s.successful_passes, unit: Unit::Count },
    Category { title: "Most Violent", metric: |s| s.fouls, unit: Unit::Count },
    Category { title: "Best Shooter", metric: |s| s.shots_on_target, unit: Unit::Count },
    Category { title: "Most Goals For", metric: |s| s.goals_for, unit: Unit::Count },
    Category { title: "Most Goals Against", metric: |s| s.goals_against, unit: Unit::Count },
    Category { title: "Best Pass Accuracy", metric: AggregateStats::pass_accuracy, unit: Unit::Percent },
    Category { title: "Best Shot Accuracy", metric: AggregateStats::shot_accuracy, unit: Unit::Percent },
    Category { title: "Most Tackles", metric: |s| s.tackles, unit: Unit::Count },
    Category { title: "Most Saves", metric: |s| s.saves, unit: Unit::Count },
    Category { title: "Best Avg Possession", metric: AggregateStats::average_possession, unit: Unit::Percent },
];

/// Holder of one "best of" category
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BestOfCard {
    pub title: &'static str,
    pub user_id: String,
    pub name: String,
    pub avatar_url: String,
    pub value: u32,
    pub unit: Unit,
}

/// One card per category; ties go to the earliest registered user.
/// Empty when there are no users.
pub fn best_of(users: &[UserModel]) -> Vec<BestOfCard> {
    CATEGORIES
        .iter()
        .filter_map(|category| {
            let mut best: Option<(&UserModel, u32)> = None;
            for user in users {
                let value = (category.metric)(&user.stats);
                if best.map_or(true, |(_, top)| value > top) {
                    best = Some((user, value));
                }
            }
            best.map(|(user, value)| BestOfCard {
                title: category.title,
                user_id: user.id.clone(),
                name: user.name.clone(),
                avatar_url: user.avatar_url.clone(),
                value,
                unit: category.unit,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RivalRecord {
    pub opponent_id: String,
    pub opponent_name: String,
    pub matches: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub recent_matches: Vec<MatchModel>,
}

/// Head-to-head records for `user_id`, most-played opponent first.
///
/// `history` must be newest first; the recent list keeps that order.
pub fn rivals(user_id: &str, history: &[MatchModel], users: &[UserModel]) -> Vec<RivalRecord> {
    let mut records: Vec<RivalRecord> = Vec::new();

    for record in history {
        let (Some(opponent_id), Some(outcome), Some((own, other))) = (
            record.opponent_of(user_id),
            record.outcome_for(user_id),
            record.stats_for(user_id),
        ) else {
            continue;
        };

        let index = match records.iter().position(|r| r.opponent_id == opponent_id) {
            Some(index) => index,
            None => {
                let opponent_name = users
                    .iter()
                    .find(|u| u.id == opponent_id)
                    .map(|u| u.name.clone())
                    .unwrap_or_else(|| other.name.clone());
                records.push(RivalRecord {
                    opponent_id: opponent_id.to_string(),
                    opponent_name,
                    matches: 0,
                    wins: 0,
                    losses: 0,
                    draws: 0,
                    goals_for: 0,
                    goals_against: 0,
                    recent_matches: Vec::new(),
                });
                records.len() - 1
            }
        };

        let rival = &mut records[index];
        rival.matches = rival.matches.saturating_add(1);
        match outcome {
            Outcome::Win => rival.wins = rival.wins.saturating_add(1),
            Outcome::Loss => rival.losses = rival.losses.saturating_add(1),
            Outcome::Draw => rival.draws = rival.draws.saturating_add(1),
        }
        rival.goals_for = rival.goals_for.saturating_add(own.score);
        rival.goals_against = rival.goals_against.saturating_add(other.score);
        if rival.recent_matches.len() < RECENT_RIVAL_MATCHES {
            rival.recent_matches.push(record.clone());
        }
    }

    // Stable: equal counts keep most-recent-first order
    records.sort_by(|a, b| b.matches.cmp(&a.matches));
    records
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Defeat {
    pub match_id: String,
    pub margin: u32,
    /// Loser's score first, e.g. "0 - 5"
    pub score: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoserRow {
    pub user_id: String,
    pub name: String,
    pub avatar_url: String,
    pub losses: u32,
    pub goals_conceded: u32,
    pub biggest_defeat: Defeat,
}

/// Per-loser totals over decisive matches, most goals conceded first.
/// Users with no losses in the slice are left out.
pub fn losers(users: &[UserModel], matches: &[MatchModel]) -> Vec<LoserRow> {
    let mut rows: Vec<LoserRow> = Vec::new();

    for record in matches {
        let Some((winner_id, loser_id)) = record.winner_and_loser() else {
            continue;
        };
        let Some(user) = users.iter().find(|u| u.id == loser_id) else {
            continue;
        };
        let (Some((winner, _)), Some((loser, _))) =
            (record.stats_for(winner_id), record.stats_for(loser_id))
        else {
            continue;
        };

        let defeat = Defeat {
            match_id: record.id.clone(),
            margin: winner.score.saturating_sub(loser.score),
            score: format!("{} - {}", loser.score, winner.score),
        };

        match rows.iter_mut().find(|row| row.user_id == loser_id) {
            Some(row) => {
                row.losses = row.losses.saturating_add(1);
                row.goals_conceded = row.goals_conceded.saturating_add(winner.score);
                if defeat.margin > row.biggest_defeat.margin {
                    row.biggest_defeat = defeat;
                }
            }
            None => rows.push(LoserRow {
                user_id: user.id.clone(),
                name: user.name.clone(),
                avatar_url: user.avatar_url.clone(),
                losses: 1,
                goals_conceded: winner.score,
                biggest_defeat: defeat,
            }),
        }
    }

    rows.sort_by(|a, b| b.goals_conceded.cmp(&a.goals_conceded));
    rows
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthTrend {
    /// Short month name, e.g. "Jul"
    pub label: String,
    pub year: i32,
    pub month: u32,
    pub matches: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    /// Rounded wins / matches
    pub win_rate: u32,
}

/// The last six calendar months up to and including `now`'s, oldest first
pub fn trends(user_id: &str, history: &[MatchModel], now: DateTime<Utc>) -> Vec<MonthTrend> {
    let mut months: Vec<MonthTrend> = (0..TREND_MONTHS)
        .rev()
        .map(|back| {
            let (year, month) = months_before(now.year(), now.month(), back);
            MonthTrend {
                label: month_label(month).to_string(),
                year,
                month,
                matches: 0,
                wins: 0,
                losses: 0,
                draws: 0,
                goals_for: 0,
                goals_against: 0,
                win_rate: 0,
            }
        })
        .collect();

    for record in history {
        let Some(bucket) = months
            .iter_mut()
            .find(|m| m.year == record.date.year() && m.month == record.date.month())
        else {
            continue;
        };
        let (Some(outcome), Some((own, other))) =
            (record.outcome_for(user_id), record.stats_for(user_id))
        else {
            continue;
        };

        bucket.matches = bucket.matches.saturating_add(1);
        match outcome {
            Outcome::Win => bucket.wins = bucket.wins.saturating_add(1),
            Outcome::Loss => bucket.losses = bucket.losses.saturating_add(1),
            Outcome::Draw => bucket.draws = bucket.draws.saturating_add(1),
        }
        bucket.goals_for = bucket.goals_for.saturating_add(own.score);
        bucket.goals_against = bucket.goals_against.saturating_add(other.score);
    }

    for month in &mut months {
        month.win_rate = percentage(month.wins, month.matches);
    }
    months
}

fn month_label(month: u32) -> &'static str {
    const LABELS: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
    LABELS[(month.clamp(1, 12) - 1) as usize]
}
