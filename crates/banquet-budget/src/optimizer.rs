//! Simulated-annealing budget optimizer, kept intact from the verified
//! original: same cooling schedule, neighbor rule, and cost function. See
//! DESIGN.md for why this stays as-is rather than being redesigned.

use crate::constraints::ServiceConstraints;
use banquet_types::Category;
use rand::Rng;
use std::collections::BTreeMap;

const INITIAL_TEMP: f64 = 100.0;
const FINAL_TEMP: f64 = 0.1;
const COOLING_FACTOR: f64 = 0.95;
const INNER_ITERATIONS: u32 = 100;
const MAX_ITERATIONS: u32 = 1000;
const STAGNATION_LIMIT: u32 = 5;

type State = BTreeMap<Category, f64>;

fn cost(
    state: &State,
    weights: &BTreeMap<Category, f64>,
    constraints: &BTreeMap<Category, ServiceConstraints>,
    total_budget: f64,
) -> f64 {
    let base_cost: f64 = state
        .iter()
        .map(|(k, s)| -weights.get(k).copied().unwrap_or(0.0) * (1.0 + s).ln())
        .sum();

    let mut constraint_penalty = 0.0;
    for (category, amount) in state {
        if let Some(c) = constraints.get(category) {
            if *amount < c.min_budget {
                constraint_penalty += (c.min_budget - amount) * 2.0;
            }
            if *amount > c.max_budget {
                constraint_penalty += (amount - c.max_budget) * 2.0;
            }
        }
    }

    let total: f64 = state.values().sum();
    let balance_penalty = if (total - total_budget).abs() > 0.01 {
        (total - total_budget).abs() * 10.0
    } else {
        0.0
    };

    base_cost + constraint_penalty + balance_penalty
}

fn neighbor(
    state: &State,
    constraints: &BTreeMap<Category, ServiceConstraints>,
    rng: &mut impl Rng,
) -> State {
    let mut new_state = state.clone();
    let categories: Vec<Category> = state.keys().copied().collect();
    let i = rng.gen_range(0..categories.len());
    let mut j = rng.gen_range(0..categories.len());
    while j == i {
        j = rng.gen_range(0..categories.len());
    }
    let (k1, k2) = (categories[i], categories[j]);

    let c1 = constraints.get(&k1).copied().unwrap_or_default();
    let c2 = constraints.get(&k2).copied().unwrap_or_default();
    let max_increase = (c1.max_budget - state[&k1]).min(state[&k2] - c2.min_budget);

    if max_increase > 0.0 {
        let upper = max_increase.min(10.0);
        let delta = if upper <= 0.1 { upper } else { rng.gen_range(0.1..=upper) };
        *new_state.get_mut(&k1).unwrap() += delta;
        *new_state.get_mut(&k2).unwrap() -= delta;
    }
    new_state
}

/// Clip `seed` into each category's `[min, max]` bound.
fn clipped_seed(seed: &State, constraints: &BTreeMap<Category, ServiceConstraints>) -> State {
    seed.iter()
        .map(|(k, v)| {
            let c = constraints.get(k).copied().unwrap_or_default();
            (*k, v.clamp(c.min_budget, c.max_budget.min(f64::MAX)))
        })
        .collect()
}

/// Round every component to an integer; any drift from `total_budget`
/// after rounding is added to the category with the highest weight.
fn normalize_state(state: &State, weights: &BTreeMap<Category, f64>, total_budget: u64) -> BTreeMap<Category, u64> {
    let mut rounded: BTreeMap<Category, i64> = state
        .iter()
        .map(|(k, v)| (*k, v.round() as i64))
        .collect();

    let total: i64 = rounded.values().sum();
    let diff = total_budget as i64 - total;
    if diff != 0 {
        let heaviest = weights
            .iter()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(k, _)| *k)
            .unwrap_or(Category::Venue);
        *rounded.entry(heaviest).or_insert(0) += diff;
    }

    rounded.into_iter().map(|(k, v)| (k, v.max(0) as u64)).collect()
}

/// Run simulated annealing over `seed`, returning the raw (un-rounded)
/// final state.
pub fn anneal(
    seed: &State,
    weights: &BTreeMap<Category, f64>,
    constraints: &BTreeMap<Category, ServiceConstraints>,
    total_budget: f64,
) -> State {
    let mut rng = rand::thread_rng();
    let mut current = clipped_seed(seed, constraints);
    let mut best = current.clone();
    let mut best_cost = cost(&best, weights, constraints, total_budget);

    let mut temperature = INITIAL_TEMP;
    let mut iteration = 0u32;
    let mut stagnant_cycles = 0u32;

    while temperature > FINAL_TEMP && iteration < MAX_ITERATIONS {
        let mut improved = false;
        for _ in 0..INNER_ITERATIONS {
            let candidate = neighbor(&current, constraints, &mut rng);
            let candidate_cost = cost(&candidate, weights, constraints, total_budget);
            let current_cost = cost(&current, weights, constraints, total_budget);
            let delta = candidate_cost - current_cost;

            if delta < 0.0 || rng.gen::<f64>() < (-delta / temperature).exp() {
                current = candidate;
                if candidate_cost < best_cost {
                    best = current.clone();
                    best_cost = candidate_cost;
                    improved = true;
                    stagnant_cycles = 0;
                }
            }

            iteration += 1;
            if iteration >= MAX_ITERATIONS {
                break;
            }
        }

        if !improved {
            stagnant_cycles += 1;
            if stagnant_cycles >= STAGNATION_LIMIT {
                break;
            }
        }
        temperature *= COOLING_FACTOR;
    }

    best
}

/// Optimize `seed` and round to an integer distribution summing exactly to
/// `total_budget`.
pub fn optimize(
    seed: &State,
    weights: &BTreeMap<Category, f64>,
    constraints: &BTreeMap<Category, ServiceConstraints>,
    total_budget: u64,
) -> BTreeMap<Category, u64> {
    let best = anneal(seed, weights, constraints, total_budget as f64);
    normalize_state(&best, weights, total_budget)
}

/// The weight-proportional integer split used when optimization produces
/// an invalid result: every category gets `round(weight * total_budget)`,
/// with the rounding residue pushed onto the heaviest category.
pub fn proportional_fallback(weights: &BTreeMap<Category, f64>, total_budget: u64) -> BTreeMap<Category, u64> {
    let state: State = weights.iter().map(|(k, w)| (*k, w * total_budget as f64)).collect();
    normalize_state(&state, weights, total_budget)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weights() -> BTreeMap<Category, f64> {
        let mut w = BTreeMap::new();
        w.insert(Category::Venue, 0.4);
        w.insert(Category::Catering, 0.35);
        w.insert(Category::Decor, 0.25);
        w
    }

    fn unbounded_constraints() -> BTreeMap<Category, ServiceConstraints> {
        Category::ALL.into_iter().map(|c| (c, ServiceConstraints::default())).collect()
    }

    fn even_seed(total: f64) -> State {
        Category::ALL.into_iter().map(|c| (c, total / 3.0)).collect()
    }

    #[test]
    fn optimized_distribution_sums_exactly_to_the_budget() {
        let w = weights();
        let constraints = unbounded_constraints();
        let seed = even_seed(30_000.0);
        let distribution = optimize(&seed, &w, &constraints, 30_000);
        let sum: u64 = distribution.values().sum();
        assert_eq!(sum, 30_000);
    }

    #[test]
    fn proportional_fallback_sums_exactly_to_the_budget() {
        let w = weights();
        let distribution = proportional_fallback(&w, 10_000);
        let sum: u64 = distribution.values().sum();
        assert_eq!(sum, 10_000);
    }

    #[test]
    fn tight_constraints_are_respected_after_optimization() {
        let w = weights();
        let mut constraints = unbounded_constraints();
        constraints.insert(Category::Venue, ServiceConstraints { min_budget: 10_000.0, max_budget: 15_000.0 });
        let seed = even_seed(30_000.0);
        let distribution = optimize(&seed, &w, &constraints, 30_000);
        let venue = distribution[&Category::Venue] as f64;
        assert!(venue >= 9_000.0 && venue <= 16_000.0);
    }
}
