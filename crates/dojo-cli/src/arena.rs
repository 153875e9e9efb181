//! Built-in pursuit/duel environment used by `dojo train`.
//!
//! Two teams fight on a circular floor. Each tick every living agent senses
//! its nearest opponent, thinks, moves, and optionally commits one of four
//! combat actions. Agents earn and lose fitness through reward events
//! published to their team's [`Population`].

use dojo_brain::ShapeMismatchError;
use dojo_evolution::{Agent, AgentIo, ArenaLayout, Population, RewardEvent};

pub(crate) const INPUT_LEN: usize = 6;
pub(crate) const OUTPUT_LEN: usize = 6;
pub(crate) const TICK_DT: f32 = 0.02;

const ARENA_RADIUS: f32 = 20.0;
const MOVE_SPEED: f32 = 5.0;
const MAX_HP: f32 = 3.0;
const ACTION_THRESHOLD: f32 = 0.2;

const LIGHT_RANGE: f32 = 1.8;
const HEAVY_RANGE: f32 = 1.2;
const LIGHT_DAMAGE: f32 = 1.0;
const HEAVY_DAMAGE: f32 = 2.0;
const BLOCK_DAMAGE_FACTOR: f32 = 0.5;

const DISTANCE_EPSILON: f32 = 1e-3;

/// Spawn layouts the scheduler rotates through between generations.
pub(crate) fn layouts() -> Vec<ArenaLayout> {
    vec![
        ArenaLayout::new(vec![vec![[-12.0, 0.0]], vec![[12.0, 0.0]]]),
        ArenaLayout::new(vec![
            vec![[-9.0, -9.0], [-9.0, 9.0]],
            vec![[9.0, 9.0], [9.0, -9.0]],
        ]),
        ArenaLayout::new(vec![vec![[0.0, -12.0]], vec![[0.0, 12.0]]]),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    None,
    LightAttack,
    HeavyAttack,
    Block,
    Parry,
}

/// Winner-take-all over the four action outputs. Nothing fires unless the
/// strongest output exceeds the trigger threshold.
pub(crate) fn decode_action(outputs: &[f32]) -> Action {
    let mut best = Action::None;
    let mut max_value = ACTION_THRESHOLD;
    for (index, &value) in outputs.iter().enumerate().skip(2) {
        if value > max_value {
            max_value = value;
            best = match index {
                2 => Action::LightAttack,
                3 => Action::HeavyAttack,
                4 => Action::Block,
                _ => Action::Parry,
            };
        }
    }
    best
}

#[derive(Debug, Clone, Copy)]
struct BotState {
    hp: f32,
    action: Action,
    parried: bool,
    prev_target_distance: Option<f32>,
}

impl BotState {
    fn fresh() -> Self {
        Self {
            hp: MAX_HP,
            action: Action::None,
            parried: false,
            prev_target_distance: None,
        }
    }
}

#[derive(Clone, Copy)]
struct Target {
    position: [f32; 2],
    hp: f32,
}

/// Per-agent sensing and actuation for one tick of the duel.
struct PursuitIo {
    dt: f32,
    target: Option<Target>,
    own_hp: f32,
    action: Action,
    hit_wall: bool,
}

impl AgentIo for PursuitIo {
    fn collect_inputs(&mut self, agent: &Agent, inputs: &mut Vec<f32>) {
        let position = agent.position();
        match self.target {
            Some(target) => {
                let dx = target.position[0] - position[0];
                let dy = target.position[1] - position[1];
                let span = 2.0 * ARENA_RADIUS;
                inputs.push(dx / span);
                inputs.push(dy / span);
                inputs.push(dx.hypot(dy) / span);
                inputs.push(self.own_hp / MAX_HP);
                inputs.push(target.hp / MAX_HP);
            }
            None => inputs.extend_from_slice(&[0.0; 5]),
        }
        // bias
        inputs.push(1.0);
    }

    fn apply_outputs(&mut self, agent: &mut Agent, outputs: &[f32]) {
        let position = agent.position();
        let mut next = [
            position[0] + outputs[0] * MOVE_SPEED * self.dt,
            position[1] + outputs[1] * MOVE_SPEED * self.dt,
        ];
        let radius = next[0].hypot(next[1]);
        if radius > ARENA_RADIUS {
            let scale = ARENA_RADIUS / radius;
            next = [next[0] * scale, next[1] * scale];
            self.hit_wall = true;
        }
        agent.set_position(next);
        self.action = decode_action(outputs);
    }
}

/// Combat state that lives outside the populations: hit points, the action
/// each agent committed this tick, and the distance memory driving the
/// approach/retreat shaping rewards.
pub(crate) struct Arena {
    states: Vec<Vec<BotState>>,
}

impl Arena {
    pub(crate) fn new(populations: &[Population]) -> Self {
        let states = populations
            .iter()
            .map(|population| vec![BotState::fresh(); population.len()])
            .collect();
        Self { states }
    }

    /// Resets combat state. Must run at every generation start, after the
    /// populations have been respawned.
    pub(crate) fn begin_generation(&mut self, populations: &[Population]) {
        for (states, population) in self.states.iter_mut().zip(populations) {
            states.clear();
            states.resize(population.len(), BotState::fresh());
        }
    }

    /// Advances the world by `dt` seconds: sense/think/move for every living
    /// agent, then resolve the committed attacks.
    pub(crate) fn step(
        &mut self,
        populations: &mut [Population],
        dt: f32,
    ) -> Result<(), ShapeMismatchError> {
        // Targeting reads last tick's world so agent order within a tick
        // does not matter.
        let snapshot: Vec<Vec<([f32; 2], bool)>> = populations
            .iter()
            .map(|population| {
                population
                    .agents()
                    .iter()
                    .map(|agent| (agent.position(), agent.is_alive()))
                    .collect()
            })
            .collect();

        let mut inputs = Vec::with_capacity(INPUT_LEN);
        for p in 0..populations.len() {
            for i in 0..populations[p].len() {
                if !populations[p].agents()[i].is_alive() {
                    continue;
                }
                let own_pos = snapshot[p][i].0;
                let target = nearest_opponent(&snapshot, p, own_pos).map(|(tp, ti, pos, _)| {
                    Target {
                        position: pos,
                        hp: self.states[tp][ti].hp,
                    }
                });
                let mut io = PursuitIo {
                    dt,
                    target,
                    own_hp: self.states[p][i].hp,
                    action: Action::None,
                    hit_wall: false,
                };
                inputs.clear();
                {
                    let agent = &mut populations[p].agents_mut()[i];
                    io.collect_inputs(agent, &mut inputs);
                    let outputs = agent.think(&inputs)?.to_vec();
                    io.apply_outputs(agent, &outputs);
                }
                self.states[p][i].action = io.action;
                self.states[p][i].parried = false;

                populations[p].publish(i, RewardEvent::TimeTick { delta_time: dt });
                if io.hit_wall {
                    populations[p].publish(i, RewardEvent::ObstacleContact);
                }
                if let Some(target) = io.target {
                    let new_pos = populations[p].agents()[i].position();
                    let current = planar_distance(new_pos, target.position);
                    if let Some(previous) = self.states[p][i].prev_target_distance {
                        let delta = previous - current;
                        if delta > DISTANCE_EPSILON {
                            populations[p].publish(i, RewardEvent::DistanceReduced { delta });
                        } else if delta < -DISTANCE_EPSILON {
                            populations[p]
                                .publish(i, RewardEvent::DistanceIncreased { delta: -delta });
                        }
                    }
                    self.states[p][i].prev_target_distance = Some(current);
                } else {
                    self.states[p][i].prev_target_distance = None;
                }
            }
        }

        self.resolve_attacks(populations);

        for p in 0..populations.len() {
            for i in 0..populations[p].len() {
                if populations[p].agents()[i].is_alive()
                    && self.states[p][i].action == Action::Parry
                    && !self.states[p][i].parried
                {
                    populations[p].publish(i, RewardEvent::ParryMiss);
                }
            }
        }
        Ok(())
    }

    fn resolve_attacks(&mut self, populations: &mut [Population]) {
        for p in 0..populations.len() {
            for i in 0..populations[p].len() {
                if !populations[p].agents()[i].is_alive() {
                    continue;
                }
                let (range, damage, whiff) = match self.states[p][i].action {
                    Action::LightAttack => (LIGHT_RANGE, LIGHT_DAMAGE, RewardEvent::WhiffLight),
                    Action::HeavyAttack => (HEAVY_RANGE, HEAVY_DAMAGE, RewardEvent::WhiffHeavy),
                    _ => continue,
                };
                let own_pos = populations[p].agents()[i].position();
                let Some((tp, ti, distance)) = nearest_living_opponent(populations, p, own_pos)
                else {
                    populations[p].publish(i, whiff);
                    continue;
                };
                if distance > range {
                    populations[p].publish(i, whiff);
                    continue;
                }
                if self.states[tp][ti].action == Action::Parry {
                    self.states[tp][ti].parried = true;
                    populations[tp].publish(ti, RewardEvent::ParrySuccess);
                    continue;
                }
                let factor = if self.states[tp][ti].action == Action::Block {
                    BLOCK_DAMAGE_FACTOR
                } else {
                    1.0
                };
                self.states[tp][ti].hp -= damage * factor;
                populations[p].publish(i, RewardEvent::Hit);
                if self.states[tp][ti].hp <= 0.0 {
                    populations[tp].agents_mut()[ti].kill();
                    populations[tp].publish(ti, RewardEvent::Death);
                    populations[p].publish(i, RewardEvent::Kill);
                }
            }
        }
    }
}

fn planar_distance(a: [f32; 2], b: [f32; 2]) -> f32 {
    (a[0] - b[0]).hypot(a[1] - b[1])
}

fn nearest_opponent(
    snapshot: &[Vec<([f32; 2], bool)>],
    own_pop: usize,
    own_pos: [f32; 2],
) -> Option<(usize, usize, [f32; 2], f32)> {
    let mut best: Option<(usize, usize, [f32; 2], f32)> = None;
    for (p, slots) in snapshot.iter().enumerate() {
        if p == own_pop {
            continue;
        }
        for (i, &(position, alive)) in slots.iter().enumerate() {
            if !alive {
                continue;
            }
            let distance = planar_distance(own_pos, position);
            if best.is_none_or(|(.., nearest)| distance < nearest) {
                best = Some((p, i, position, distance));
            }
        }
    }
    best
}

fn nearest_living_opponent(
    populations: &[Population],
    own_pop: usize,
    own_pos: [f32; 2],
) -> Option<(usize, usize, f32)> {
    let mut best: Option<(usize, usize, f32)> = None;
    for (p, population) in populations.iter().enumerate() {
        if p == own_pop {
            continue;
        }
        for (i, agent) in population.agents().iter().enumerate() {
            if !agent.is_alive() {
                continue;
            }
            let distance = planar_distance(own_pos, agent.position());
            if best.is_none_or(|(.., nearest)| distance < nearest) {
                best = Some((p, i, distance));
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use dojo_brain::{Seed, Topology};
    use dojo_evolution::{EvolutionConfig, NullGenomeStore, RewardWeights};

    use super::*;

    #[test]
    fn test_decode_action_below_threshold_is_none() {
        let outputs = [0.9, 0.9, 0.1, 0.15, 0.2, 0.05];
        assert_eq!(decode_action(&outputs), Action::None);
    }

    #[test]
    fn test_decode_action_picks_strongest() {
        let outputs = [0.0, 0.0, 0.3, 0.8, 0.5, 0.4];
        assert_eq!(decode_action(&outputs), Action::HeavyAttack);
        let outputs = [0.0, 0.0, 0.0, 0.0, 0.0, 0.21];
        assert_eq!(decode_action(&outputs), Action::Parry);
    }

    fn duel_populations(rng: &mut impl rand::Rng) -> Vec<Population> {
        let config = EvolutionConfig {
            generation_size: 1,
            elitism_count: 1,
            ..EvolutionConfig::default()
        };
        let topology = Topology::new(vec![INPUT_LEN, 4, OUTPUT_LEN]).unwrap();
        ["east", "west"]
            .into_iter()
            .map(|team| {
                Population::new(
                    team,
                    config.clone(),
                    RewardWeights::default(),
                    topology.clone(),
                    None,
                    Box::new(NullGenomeStore),
                    rng,
                )
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_step_charges_time_tick() {
        let seed: Seed = "00000000000000000000000000000042".parse().unwrap();
        let mut rng = seed.rng();
        let mut populations = duel_populations(&mut rng);
        populations[0].agents_mut()[0].set_position([-5.0, 0.0]);
        populations[1].agents_mut()[0].set_position([5.0, 0.0]);

        let mut arena = Arena::new(&populations);
        arena.begin_generation(&populations);
        arena.step(&mut populations, TICK_DT).unwrap();

        // TimeTick is weighted -1.0 by default, so a lone tick can only be
        // offset by shaping rewards, never left untouched.
        for population in &populations {
            assert_ne!(population.agents()[0].fitness(), 0.0);
        }
    }

    #[test]
    fn test_step_is_deterministic() {
        let seed: Seed = "000000000000000000000000000000aa".parse().unwrap();
        let run = || {
            let mut rng = seed.rng();
            let mut populations = duel_populations(&mut rng);
            populations[0].agents_mut()[0].set_position([-5.0, 0.0]);
            populations[1].agents_mut()[0].set_position([5.0, 0.0]);
            let mut arena = Arena::new(&populations);
            arena.begin_generation(&populations);
            for _ in 0..100 {
                arena.step(&mut populations, TICK_DT).unwrap();
            }
            populations
                .iter()
                .map(|p| (p.agents()[0].fitness(), p.agents()[0].position()))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }
}
