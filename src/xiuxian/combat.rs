//! Turn-based duel simulation.
//!
//! A [`Duel`] pits two [`Combatant`]s against each other for at most [`MAX_ROUNDS`] rounds.
//! In each round the challenger strikes first, and the defender strikes back only if it is
//! still standing. A plain strike deals `max(1, attack - defense + roll(-5, 5))`. Skills and
//! elixirs cast through [`crate::xiuxian::effect::apply_to_combat`] shape these strikes via
//! [`CombatState`]. Speed never changes the order; each point adds to evasion instead.

use std::mem;

use log::debug;

use crate::xiuxian::dice::Dice;
use crate::xiuxian::effect::{self, CombatEffectOutcome, Effect};
use crate::xiuxian::errors::XiuxianError;
use crate::xiuxian::types::{PlayerRecord, SkillDescriptor, StatKind};

pub const MAX_ROUNDS: u32 = 20;

/// Inclusive bounds of the per-strike damage variance.
pub const STRIKE_VARIANCE: (i64, i64) = (-5, 5);

/// Evasion chance granted per point of speed.
pub const EVASION_PER_SPEED: f64 = 0.005;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModifierAmount {
    Flat(f64),
    /// Fraction added to the stat multiplier, e.g. `0.5` for +50%.
    Percent(f64),
}

/// A timed stat modifier. `stat: None` applies to every stat.
#[derive(Debug, Clone, PartialEq)]
pub struct Modifier {
    pub stat: Option<StatKind>,
    pub amount: ModifierAmount,
    pub rounds_left: u32,
}

/// Shape of the next strike when a damage technique is pending.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrikeTechnique {
    pub hits: u32,
    pub multiplier: f64,
    /// Fraction of the defender's defense ignored, in `[0, 1]`.
    pub armor_pen: f64,
}

impl StrikeTechnique {
    pub fn plain() -> Self {
        Self {
            hits: 1,
            multiplier: 1.0,
            armor_pen: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Regen {
    pub percent: f64,
    pub rounds_left: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SecondWind {
    pub trigger_hp: f64,
    pub heal_percent: f64,
    pub used: bool,
}

/// Everything a duel tracks on top of the raw stat block.
#[derive(Debug, Clone, PartialEq)]
pub struct CombatState {
    pub modifiers: Vec<Modifier>,
    pub next_strike_multiplier: f64,
    pub pending_technique: Option<StrikeTechnique>,
    pub regen: Option<Regen>,
    pub stunned_rounds: u32,
    pub invincible_rounds: u32,
    pub second_wind: Option<SecondWind>,
    pub control_resistance: f64,
    pub thorns: f64,
}

impl Default for CombatState {
    fn default() -> Self {
        Self {
            modifiers: Vec::new(),
            next_strike_multiplier: 1.0,
            pending_technique: None,
            regen: None,
            stunned_rounds: 0,
            invincible_rounds: 0,
            second_wind: None,
            control_resistance: 0.0,
            thorns: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Combatant {
    pub name: String,
    pub hp: i64,
    pub max_hp: i64,
    pub attack: i64,
    pub defense: i64,
    pub state: CombatState,
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

impl Combatant {
    pub fn new(name: &str, hp: i64, max_hp: i64, attack: i64, defense: i64) -> Self {
        Self {
            name: name.to_string(),
            hp,
            max_hp,
            attack,
            defense,
            state: CombatState::default(),
        }
    }

    /// Snapshot of a player's current composed stats.
    pub fn from_player(player: &PlayerRecord) -> Self {
        Self::new(
            &player.display_name,
            to_i64(player.hp),
            to_i64(player.max_hp),
            to_i64(player.attack),
            to_i64(player.defense),
        )
    }

    pub fn is_down(&self) -> bool {
        self.hp <= 0
    }

    /// `(base + flat modifiers) * (1 + percent modifiers)` for `stat`.
    pub fn effective(&self, stat: StatKind, base: f64) -> f64 {
        let mut flat = 0.0;
        let mut percent = 0.0;
        for modifier in &self.state.modifiers {
            if modifier.stat.map_or(true, |s| s == stat) {
                match modifier.amount {
                    ModifierAmount::Flat(v) => flat += v,
                    ModifierAmount::Percent(v) => percent += v,
                }
            }
        }
        (base + flat) * (1.0 + percent)
    }

    fn heal(&mut self, amount: i64) -> i64 {
        let before = self.hp;
        self.hp = (self.hp + amount).min(self.max_hp);
        self.hp - before
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Challenger,
    Defender,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VictoryKind {
    Knockout,
    /// Round cap reached with strictly more HP left.
    Decision,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuelOutcome {
    Victory { winner: Side, by: VictoryKind },
    Draw,
}

impl DuelOutcome {
    pub fn winner(&self) -> Option<Side> {
        match self {
            DuelOutcome::Victory { winner, .. } => Some(*winner),
            DuelOutcome::Draw => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CombatEvent {
    Technique {
        side: Side,
        skill: String,
        outcome: CombatEffectOutcome,
    },
    /// A duel elixir taken before the first round.
    Elixir {
        side: Side,
        item: String,
        outcome: CombatEffectOutcome,
    },
    Strike {
        round: u32,
        attacker: Side,
        damage: i64,
        remaining_hp: i64,
    },
    Absorbed {
        round: u32,
        defender: Side,
    },
    Dodged {
        round: u32,
        defender: Side,
    },
    Stunned {
        round: u32,
        side: Side,
    },
    Reflected {
        round: u32,
        side: Side,
        damage: i64,
    },
    SecondWind {
        round: u32,
        side: Side,
        healed: i64,
    },
    Regenerated {
        round: u32,
        side: Side,
        healed: i64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DuelResult {
    pub rounds: u32,
    pub outcome: DuelOutcome,
    pub events: Vec<CombatEvent>,
    pub challenger_hp: i64,
    pub defender_hp: i64,
}

pub struct Duel {
    challenger: Combatant,
    defender: Combatant,
    events: Vec<CombatEvent>,
}

impl Duel {
    pub fn new(challenger: Combatant, defender: Combatant) -> Self {
        Self {
            challenger,
            defender,
            events: Vec::new(),
        }
    }

    pub fn combatant(&self, side: Side) -> &Combatant {
        match side {
            Side::Challenger => &self.challenger,
            Side::Defender => &self.defender,
        }
    }

    fn pair_mut(&mut self, side: Side) -> (&mut Combatant, &mut Combatant) {
        match side {
            Side::Challenger => (&mut self.challenger, &mut self.defender),
            Side::Defender => (&mut self.defender, &mut self.challenger),
        }
    }

    /// Cast `skill` for `side` before the first round. Passive skills are armed, active
    /// skills take effect once. Kinds with no combat meaning are skipped.
    pub fn prepare(&mut self, side: Side, skill: &SkillDescriptor, dice: &mut dyn Dice) {
        match &skill.effect {
            // Core stats are already folded into the composed block; the rest last all duel.
            Effect::AddFlatStat { value } => {
                let (caster, _) = self.pair_mut(side);
                for (stat, v) in value.iter().filter(|(stat, _)| !stat.is_core()) {
                    caster.state.modifiers.push(Modifier {
                        stat: Some(*stat),
                        amount: ModifierAmount::Flat(*v),
                        rounds_left: MAX_ROUNDS + 1,
                    });
                }
                return;
            }
            Effect::ExpRate { .. } | Effect::AddPercentStat { .. } => return,
            _ => {}
        }
        let (caster, target) = self.pair_mut(side);
        match effect::apply_to_combat(&skill.effect, caster, target, dice) {
            Ok(outcome) => self.events.push(CombatEvent::Technique {
                side,
                skill: skill.skill_name.clone(),
                outcome,
            }),
            Err(XiuxianError::NotApplicable(reason)) => {
                debug!("skill {} skipped in duel: {}", skill.skill_name, reason)
            }
            Err(e) => debug!("skill {} failed in duel: {}", skill.skill_name, e),
        }
    }

    /// Apply an elixir `side` takes before the first round.
    pub fn take_elixir(&mut self, side: Side, item_name: &str, effect: &Effect, dice: &mut dyn Dice) {
        let (caster, target) = self.pair_mut(side);
        match effect::apply_to_combat(effect, caster, target, dice) {
            Ok(outcome) => self.events.push(CombatEvent::Elixir {
                side,
                item: item_name.to_string(),
                outcome,
            }),
            Err(e) => debug!("elixir {} had no effect in duel: {}", item_name, e),
        }
    }

    fn either_down(&self) -> bool {
        self.challenger.is_down() || self.defender.is_down()
    }

    pub fn run(mut self, dice: &mut dyn Dice) -> DuelResult {
        let mut rounds = 0;
        if !self.either_down() {
            for round in 1..=MAX_ROUNDS {
                rounds = round;
                self.turn(round, Side::Challenger, dice);
                if self.either_down() {
                    break;
                }
                self.turn(round, Side::Defender, dice);
                if self.either_down() {
                    break;
                }
                self.end_round(round);
            }
        }

        let outcome = self.decide();
        debug!(
            "duel {} vs {} ended after {} rounds: {:?}",
            self.challenger.name, self.defender.name, rounds, outcome
        );
        DuelResult {
            rounds,
            outcome,
            events: self.events,
            challenger_hp: self.challenger.hp.max(0),
            defender_hp: self.defender.hp.max(0),
        }
    }

    fn decide(&self) -> DuelOutcome {
        let (a, b) = (&self.challenger, &self.defender);
        match (a.is_down(), b.is_down()) {
            (true, true) => DuelOutcome::Draw,
            (false, true) => DuelOutcome::Victory {
                winner: Side::Challenger,
                by: VictoryKind::Knockout,
            },
            (true, false) => DuelOutcome::Victory {
                winner: Side::Defender,
                by: VictoryKind::Knockout,
            },
            (false, false) if a.hp > b.hp => DuelOutcome::Victory {
                winner: Side::Challenger,
                by: VictoryKind::Decision,
            },
            (false, false) if b.hp > a.hp => DuelOutcome::Victory {
                winner: Side::Defender,
                by: VictoryKind::Decision,
            },
            (false, false) => DuelOutcome::Draw,
        }
    }

    fn turn(&mut self, round: u32, side: Side, dice: &mut dyn Dice) {
        let mut events = mem::take(&mut self.events);
        let (attacker, defender) = self.pair_mut(side);
        let target_side = other(side);

        if attacker.state.stunned_rounds > 0 {
            attacker.state.stunned_rounds -= 1;
            events.push(CombatEvent::Stunned { round, side });
            self.events = events;
            return;
        }

        let technique = attacker
            .state
            .pending_technique
            .take()
            .unwrap_or_else(StrikeTechnique::plain);
        let multiplier =
            technique.multiplier * mem::replace(&mut attacker.state.next_strike_multiplier, 1.0);

        for _ in 0..technique.hits {
            if defender.is_down() || attacker.is_down() {
                break;
            }
            if defender.state.invincible_rounds > 0 {
                events.push(CombatEvent::Absorbed {
                    round,
                    defender: target_side,
                });
                continue;
            }
            let dodge = defender.effective(StatKind::Dodge, 0.0)
                + defender.effective(StatKind::Speed, 0.0) * EVASION_PER_SPEED;
            if dodge > 0.0 && dice.chance() < dodge {
                events.push(CombatEvent::Dodged {
                    round,
                    defender: target_side,
                });
                continue;
            }

            let attack = attacker.effective(StatKind::Attack, attacker.attack as f64);
            let defense =
                defender.effective(StatKind::Defense, defender.defense as f64) * (1.0 - technique.armor_pen);
            let offset = dice.roll(STRIKE_VARIANCE.0, STRIKE_VARIANCE.1);
            let damage = strike_damage(attack, defense, offset, multiplier);
            defender.hp -= damage;
            events.push(CombatEvent::Strike {
                round,
                attacker: side,
                damage,
                remaining_hp: defender.hp.max(0),
            });

            if defender.state.thorns > 0.0 {
                let reflected = (damage as f64 * defender.state.thorns).floor() as i64;
                if reflected > 0 {
                    attacker.hp -= reflected;
                    events.push(CombatEvent::Reflected {
                        round,
                        side: target_side,
                        damage: reflected,
                    });
                }
            }

            try_second_wind(defender, round, target_side, &mut events);
            try_second_wind(attacker, round, side, &mut events);
        }
        self.events = events;
    }

    fn end_round(&mut self, round: u32) {
        for side in [Side::Challenger, Side::Defender] {
            let (combatant, _) = self.pair_mut(side);
            let mut healed = 0;
            if let Some(regen) = combatant.state.regen.as_mut() {
                let amount = (combatant.max_hp as f64 * regen.percent).floor() as i64;
                regen.rounds_left = regen.rounds_left.saturating_sub(1);
                if regen.rounds_left == 0 {
                    combatant.state.regen = None;
                }
                healed = combatant.heal(amount);
            }
            combatant.state.invincible_rounds = combatant.state.invincible_rounds.saturating_sub(1);
            combatant.state.modifiers.retain_mut(|m| {
                m.rounds_left = m.rounds_left.saturating_sub(1);
                m.rounds_left > 0
            });
            if healed > 0 {
                self.events.push(CombatEvent::Regenerated { round, side, healed });
            }
        }
    }
}

fn other(side: Side) -> Side {
    match side {
        Side::Challenger => Side::Defender,
        Side::Defender => Side::Challenger,
    }
}

/// `max(1, floor((attack - defense + offset) * multiplier))`.
pub fn strike_damage(attack: f64, defense: f64, offset: i64, multiplier: f64) -> i64 {
    let raw = ((attack - defense + offset as f64) * multiplier).floor() as i64;
    raw.max(1)
}

fn try_second_wind(combatant: &mut Combatant, round: u32, side: Side, events: &mut Vec<CombatEvent>) {
    let Some(wind) = combatant.state.second_wind.as_mut() else {
        return;
    };
    if wind.used || combatant.hp <= 0 {
        return;
    }
    if (combatant.hp as f64) < wind.trigger_hp * combatant.max_hp as f64 {
        wind.used = true;
        let amount = (combatant.max_hp as f64 * wind.heal_percent).floor() as i64;
        let healed = combatant.heal(amount);
        events.push(CombatEvent::SecondWind { round, side, healed });
    }
}
