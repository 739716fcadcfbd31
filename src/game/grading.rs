//! End-of-game grading
//!
//! Six weighted sub-scores are computed from town resources, statistics
//! replayed from the turn log, map damage counts and the fire chain. The
//! final score is their mean, banded into a letter grade. Everything here is
//! a pure function of its inputs.

use crate::config::{EndConditionConfig, GradingConfig};
use crate::core::{CardCode, Keyword, MapStatistics, Role, TownResources};
use crate::game::fire_chain::FireChain;
use crate::game::token::code_of;
use crate::game::turn_log::TurnLog;
use crate::loader::CardCatalog;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Resource level treated as "full marks" when normalizing
const NORMALIZE_CAP: f64 = 50.0;
/// Equipment level treated as full marks
const EQUIPMENT_CAP: f64 = 10.0;
/// Fraction of a keyword's cards that counts as full coverage
const COVERAGE_TARGET: f64 = 0.75;
/// Indigenous Leader cultural plays that count as full marks
const LEADER_CULTURAL_TARGET: f64 = 6.0;
/// AP per player-turn where the activity score starts / saturates
const ACTIVITY_FLOOR: f64 = 0.40;
const ACTIVITY_SPAN: f64 = 0.40;

fn clamp01(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

/// `num / den` clamped to [0, 1]; zero when the denominator is not positive
fn ratio(num: f64, den: f64) -> f64 {
    if den <= 0.0 {
        0.0
    } else {
        clamp01(num / den)
    }
}

/// Per-role participation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleActivity {
    pub plays: u32,
    pub action_points: u32,
}

/// Counters replayed from the turn log
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayStatistics {
    pub total_action_points: u32,
    pub total_money_spent: u32,
    pub total_turns: u32,
    pub unique_cultural_played: usize,
    pub total_cultural_cards: usize,
    pub leader_cultural_plays: u32,
    pub roles_using_cultural: usize,
    pub unique_outreach_played: usize,
    pub total_outreach_cards: usize,
    pub roles_using_outreach: usize,
    pub unique_preparation_played: usize,
    pub total_preparation_cards: usize,
    /// Distinct keyword categories played, out of [`Keyword::ALL`]
    pub action_types_used: usize,
    pub role_activity: [RoleActivity; 6],
}

impl PlayStatistics {
    /// Replay every logged token against the catalog
    ///
    /// `turns_played` counts every turn the game has gone through, including
    /// turns closed without a play. Tokens whose card is no longer in the
    /// catalog are skipped.
    pub fn from_turn_log(log: &TurnLog, catalog: &CardCatalog, turns_played: u32) -> Self {
        let logged = u32::try_from(log.turn_count()).unwrap_or(u32::MAX);
        let mut stats = PlayStatistics {
            total_turns: turns_played.max(logged).max(1),
            total_cultural_cards: catalog.count_with_keyword(Keyword::Cultural),
            total_outreach_cards: catalog.count_with_keyword(Keyword::Outreach),
            total_preparation_cards: catalog.count_with_keyword(Keyword::Preparation),
            ..Default::default()
        };

        let mut keywords_used: BTreeSet<Keyword> = BTreeSet::new();
        let mut cultural: BTreeSet<CardCode> = BTreeSet::new();
        let mut outreach: BTreeSet<CardCode> = BTreeSet::new();
        let mut preparation: BTreeSet<CardCode> = BTreeSet::new();
        let mut cultural_roles: BTreeSet<Role> = BTreeSet::new();
        let mut outreach_roles: BTreeSet<Role> = BTreeSet::new();

        for token in log.all_tokens() {
            let Some(card) = code_of(token).and_then(|code| catalog.get(&code)) else {
                continue;
            };
            let role = card.code.role();

            stats.total_action_points += card.action_points;
            stats.total_money_spent += card.money_cost;
            if let Some(role) = role {
                let activity = &mut stats.role_activity[role.index()];
                activity.plays += 1;
                activity.action_points += card.action_points;
            }
            keywords_used.extend(card.keywords.iter().copied());

            if card.has_keyword(Keyword::Cultural) {
                cultural.insert(card.code.clone());
                if let Some(role) = role {
                    cultural_roles.insert(role);
                }
                if role == Some(Role::IndigenousLeader) {
                    stats.leader_cultural_plays += 1;
                }
            }
            if card.has_keyword(Keyword::Outreach) {
                outreach.insert(card.code.clone());
                if let Some(role) = role {
                    outreach_roles.insert(role);
                }
            }
            if card.has_keyword(Keyword::Preparation) {
                preparation.insert(card.code.clone());
            }
        }

        stats.unique_cultural_played = cultural.len();
        stats.unique_outreach_played = outreach.len();
        stats.unique_preparation_played = preparation.len();
        stats.roles_using_cultural = cultural_roles.len();
        stats.roles_using_outreach = outreach_roles.len();
        stats.action_types_used = keywords_used.len();
        stats
    }
}

/// The three end-of-game conditions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndConditions {
    pub irreparable_cultural_loss: bool,
    pub infrastructure_collapse: bool,
    pub uncontrolled_fire: bool,
}

impl EndConditions {
    pub fn evaluate(map: &MapStatistics, chain: &FireChain, config: &EndConditionConfig) -> Self {
        let cultural_total = map.total_cultural_sites;
        let loss_threshold =
            (f64::from(cultural_total) * config.cultural_loss_fraction).ceil() as u32;
        let irreparable_cultural_loss =
            cultural_total > 0 && map.destroyed_cultural_sites >= loss_threshold;

        let failed = map.damaged_buildings + map.destroyed_buildings;
        let infrastructure_collapse = map.total_buildings > 0
            && f64::from(failed) / f64::from(map.total_buildings)
                >= config.infrastructure_collapse_ratio;

        EndConditions {
            irreparable_cultural_loss,
            infrastructure_collapse,
            uncontrolled_fire: chain.is_uncontrolled(config.fire_chain_threshold),
        }
    }

    pub fn any(&self) -> bool {
        self.irreparable_cultural_loss || self.infrastructure_collapse || self.uncontrolled_fire
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LetterGrade {
    S,
    A,
    B,
    C,
    D,
    E,
    F,
}

impl LetterGrade {
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 90.0 => LetterGrade::S,
            s if s >= 75.0 => LetterGrade::A,
            s if s >= 65.0 => LetterGrade::B,
            s if s >= 55.0 => LetterGrade::C,
            s if s >= 40.0 => LetterGrade::D,
            s if s >= 25.0 => LetterGrade::E,
            _ => LetterGrade::F,
        }
    }
}

impl fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// The six sub-scores, each in [0, 100]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GradeScores {
    pub cultural_safety: f64,
    pub indigenous_knowledge: f64,
    pub networks: f64,
    pub disaster_resilience: f64,
    pub community_led_action: f64,
    pub social_innovation: f64,
}

impl GradeScores {
    pub fn as_array(&self) -> [f64; 6] {
        [
            self.cultural_safety,
            self.indigenous_knowledge,
            self.networks,
            self.disaster_resilience,
            self.community_led_action,
            self.social_innovation,
        ]
    }

    pub fn mean(&self) -> f64 {
        (self.as_array().iter().sum::<f64>() / 6.0).clamp(0.0, 100.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeReport {
    pub end_conditions: EndConditions,
    pub scores: GradeScores,
    pub final_score: f64,
    pub letter: LetterGrade,
    /// Share of cultural sites still standing, 0-100
    pub cultural_site_integrity: f64,
    pub fire_chain: FireChain,
    pub statistics: PlayStatistics,
    pub map: MapStatistics,
}

fn percent(v: f64) -> f64 {
    (100.0 * v).clamp(0.0, 100.0)
}

/// Compute the full report
///
/// The fire-safety rating is a risk score, so disaster resilience credits
/// `1 - rating/100` rather than the rating itself. Activity is action points
/// per player-turn, `AP / (turns * players)`, not AP per turn scaled up by
/// the player count.
pub fn evaluate(
    town: &TownResources,
    stats: &PlayStatistics,
    map: &MapStatistics,
    chain: &FireChain,
    grading: &GradingConfig,
    end: &EndConditionConfig,
) -> GradeReport {
    let players = f64::from(grading.num_players);
    let happiness = ratio(f64::from(town.happiness()), NORMALIZE_CAP);
    let education = ratio(f64::from(town.education()), NORMALIZE_CAP);
    let provisions = ratio(f64::from(town.provisions()), NORMALIZE_CAP);
    let equipment = ratio(f64::from(town.firefighting_equipment()), EQUIPMENT_CAP);
    let fire_risk = f64::from(town.compute_fire_safety()) / 100.0;

    let surviving_sites = map
        .total_cultural_sites
        .saturating_sub(map.destroyed_cultural_sites);
    let integrity = ratio(
        f64::from(surviving_sites),
        f64::from(map.total_cultural_sites),
    );

    let cultural_coverage = clamp01(
        ratio(
            stats.unique_cultural_played as f64,
            stats.total_cultural_cards as f64,
        ) / COVERAGE_TARGET,
    );
    let cultural_safety = percent(0.6 * integrity + 0.4 * cultural_coverage);

    let leader = f64::from(stats.leader_cultural_plays).min(LEADER_CULTURAL_TARGET)
        / LEADER_CULTURAL_TARGET;
    let indigenous_knowledge = percent(
        0.5 * leader
            + 0.3 * integrity
            + 0.2 * ratio(stats.roles_using_cultural as f64, players),
    );

    let collaboration = 0.5 * ratio(stats.roles_using_outreach as f64, players)
        + 0.5 * ratio(
            stats.unique_outreach_played as f64,
            stats.total_outreach_cards as f64,
        );
    let networks = percent(0.3 * happiness + 0.4 * collaboration + 0.3 * education);

    let preparedness = clamp01(
        ratio(
            stats.unique_preparation_played as f64,
            stats.total_preparation_cards as f64,
        ) / COVERAGE_TARGET,
    );
    let disaster_resilience = percent(
        0.3 * education + 0.3 * (1.0 - fire_risk) + 0.2 * equipment + 0.2 * preparedness,
    );

    let ap_per_player_turn = ratio(
        f64::from(stats.total_action_points),
        f64::from(stats.total_turns) * players,
    );
    let activity = clamp01((ap_per_player_turn - ACTIVITY_FLOOR) / ACTIVITY_SPAN);
    let action_types = ratio(stats.action_types_used as f64, Keyword::ALL.len() as f64);
    let community_led_action =
        percent(0.4 * activity + 0.3 * provisions + 0.2 * action_types + 0.1 * happiness);

    let social_innovation = percent(0.4 * education + 0.4 * action_types + 0.2 * provisions);

    let scores = GradeScores {
        cultural_safety,
        indigenous_knowledge,
        networks,
        disaster_resilience,
        community_led_action,
        social_innovation,
    };
    let final_score = scores.mean();

    GradeReport {
        end_conditions: EndConditions::evaluate(map, chain, end),
        scores,
        final_score,
        letter: LetterGrade::from_score(final_score),
        cultural_site_integrity: percent(integrity),
        fire_chain: chain.clone(),
        statistics: stats.clone(),
        map: *map,
    }
}

impl GradeReport {
    /// Multi-line text summary
    pub fn render(&self) -> String {
        let s = &self.scores;
        let flag = |b: bool| if b { "YES" } else { "no" };
        [
            format!("Final score: {:.1} ({})", self.final_score, self.letter),
            format!("  Cultural safety:      {:.1}", s.cultural_safety),
            format!("  Indigenous knowledge: {:.1}", s.indigenous_knowledge),
            format!("  Networks:             {:.1}", s.networks),
            format!("  Disaster resilience:  {:.1}", s.disaster_resilience),
            format!("  Community-led action: {:.1}", s.community_led_action),
            format!("  Social innovation:    {:.1}", s.social_innovation),
            format!(
                "Irreparable cultural loss: {}",
                flag(self.end_conditions.irreparable_cultural_loss)
            ),
            format!(
                "Infrastructure collapse: {}",
                flag(self.end_conditions.infrastructure_collapse)
            ),
            format!(
                "Uncontrolled fire: {} (longest chain {})",
                flag(self.end_conditions.uncontrolled_fire),
                self.fire_chain.length
            ),
        ]
        .join("\n")
    }
}
