//! Question generator registry: one strategy per skill id.
//!
//! Generators are pure functions of the random source. Every generated
//! question carries exactly four distinct options, one of them correct, with
//! distractors jittered in proportion to the answer's magnitude so they stay
//! plausible at any number range. Unknown skill ids resolve to a default
//! generator instead of failing, so session composition survives curriculum
//! drift.

mod algebra;
mod arithmetic;
mod fractions;
mod geometry;
mod reasoning;

use crate::models::{Difficulty, ErrorType, Question};
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use std::collections::BTreeSet;
use std::collections::HashMap;

pub trait QuestionGenerator: Send + Sync {
    fn generate(&self, skill_id: &str, rng: &mut dyn RngCore) -> Question;
}

impl<F> QuestionGenerator for F
where
    F: Fn(&str, &mut dyn RngCore) -> Question + Send + Sync,
{
    fn generate(&self, skill_id: &str, rng: &mut dyn RngCore) -> Question {
        self(skill_id, rng)
    }
}

/// Builds a question from a prompt, the correct answer and three distractors.
/// Options are shuffled before return. The caller guarantees the distractors
/// are distinct from each other and from the correct answer.
pub(crate) fn multiple_choice(
    rng: &mut dyn RngCore,
    prompt: String,
    correct: String,
    distractors: Vec<String>,
    hint: &str,
    skill_id: &str,
    error_type: ErrorType,
) -> Question {
    debug_assert_eq!(distractors.len(), 3);
    let mut options = Vec::with_capacity(4);
    options.push(correct.clone());
    for d in distractors {
        debug_assert!(d != correct && !options.contains(&d));
        options.push(d);
    }
    options.shuffle(rng);
    Question {
        prompt,
        correct,
        options,
        hint: hint.to_string(),
        skill_id: skill_id.to_string(),
        difficulty: Difficulty::Mid,
        error_type,
    }
}

/// One plausible wrong value near `correct`. The spread grows with the
/// answer's magnitude but never drops below `min_spread`.
pub(crate) fn jittered(rng: &mut dyn RngCore, correct: i64, min_spread: i64) -> i64 {
    let spread = min_spread.max(correct.abs() / 3);
    loop {
        let delta = rng.gen_range(-spread..=spread);
        if delta != 0 {
            return correct + delta;
        }
    }
}

/// Three distinct numeric distractors near `correct`.
pub(crate) fn numeric_distractors(
    rng: &mut dyn RngCore,
    correct: i64,
    min_spread: i64,
) -> Vec<String> {
    let mut values: BTreeSet<i64> = BTreeSet::new();
    while values.len() < 3 {
        values.insert(jittered(rng, correct, min_spread));
    }
    values.into_iter().map(|v| v.to_string()).collect()
}

/// Keeps the first three candidates that are distinct and not the correct
/// answer, then tops up from `fallback` until there are three.
pub(crate) fn fill_distinct(
    rng: &mut dyn RngCore,
    correct: &str,
    candidates: Vec<String>,
    mut fallback: impl FnMut(&mut dyn RngCore) -> String,
) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(3);
    for c in candidates {
        if out.len() == 3 {
            break;
        }
        if c != correct && !out.contains(&c) {
            out.push(c);
        }
    }
    while out.len() < 3 {
        let c = fallback(rng);
        if c != correct && !out.contains(&c) {
            out.push(c);
        }
    }
    out
}

/// Skill id -> generator map, built once at startup.
pub struct GeneratorRegistry {
    map: HashMap<&'static str, Box<dyn QuestionGenerator>>,
}

impl GeneratorRegistry {
    pub fn new() -> Self {
        fn boxed<F>(f: F) -> Box<dyn QuestionGenerator>
        where
            F: Fn(&str, &mut dyn RngCore) -> Question + Send + Sync + 'static,
        {
            Box::new(f)
        }

        let mut map: HashMap<&'static str, Box<dyn QuestionGenerator>> = HashMap::new();

        map.insert("g1_count_succ", boxed(arithmetic::counting_successor));
        map.insert("g1_add_10", boxed(|id, rng| arithmetic::addition(id, rng, 10)));
        map.insert("g1_sub_10", boxed(|id, rng| arithmetic::subtraction(id, rng, 10)));
        map.insert("g1_patterns", boxed(reasoning::pattern_continuation));

        map.insert("g2_place_value", boxed(arithmetic::place_value));
        map.insert("g2_add_100", boxed(|id, rng| arithmetic::addition(id, rng, 100)));
        map.insert("g2_sub_100", boxed(|id, rng| arithmetic::subtraction(id, rng, 100)));
        map.insert("g2_mul_groups", boxed(arithmetic::multiplication_groups));

        map.insert("g3_mul_facts_2_5", boxed(|id, rng| arithmetic::multiplication_facts(id, rng, 2, 5)));
        map.insert("g3_div_sharing", boxed(arithmetic::division_sharing));
        map.insert("g3_frac_halves", boxed(fractions::fraction_halves));
        map.insert("g3_area_rect", boxed(geometry::rectangle_area));

        map.insert("g4_mul_facts_6_9", boxed(|id, rng| arithmetic::multiplication_facts(id, rng, 6, 9)));
        map.insert("g4_mul_2digit", boxed(arithmetic::multiplication_2digit));
        map.insert("g4_frac_equiv", boxed(fractions::fraction_equivalence));
        map.insert("g4_decimals_01", boxed(fractions::decimal_larger_of_two));

        map.insert("g5_div_2digit", boxed(arithmetic::division_2digit));
        map.insert("g5_frac_add_like", boxed(fractions::fraction_add_like));
        map.insert("g5_dec_addsub", boxed(fractions::decimal_add_sub));
        map.insert("g5_percent_intro", boxed(|id, rng| {
            fractions::percent_of(id, rng, &[20, 40, 60, 80, 100], &[10, 50])
        }));

        map.insert("g6_order_ops", boxed(arithmetic::order_of_operations));
        map.insert("g6_dec_compare", boxed(fractions::decimal_compare));
        map.insert("g6_frac_equiv", boxed(fractions::fraction_equivalence));
        map.insert("g6_percent_simple", boxed(|id, rng| {
            fractions::percent_of(id, rng, &[40, 60, 80, 100, 120], &[10, 25, 50])
        }));

        map.insert("g7_int_ops", boxed(arithmetic::integer_ops));
        map.insert("g7_prop", boxed(algebra::proportionality));
        map.insert("g7_eq_1step", boxed(algebra::one_step_equation));
        map.insert("g7_area", boxed(geometry::rectangle_area));

        map.insert("g8_algebra_simplify", boxed(algebra::simplify_like_terms));
        map.insert("g8_eq_linear", boxed(algebra::linear_equation));
        map.insert("g8_functions_intro", boxed(algebra::evaluate_function));
        map.insert("g8_powers", boxed(arithmetic::powers));

        map.insert("g9_systems", boxed(algebra::linear_system));
        map.insert("g9_quadratic", boxed(algebra::quadratic_factoring));
        map.insert("g9_similarity", boxed(geometry::similarity));
        map.insert("g9_probability", boxed(reasoning::dice_probability));

        map.insert("em1_functions", boxed(algebra::evaluate_function));
        map.insert("em1_factor", boxed(algebra::quadratic_factoring));
        map.insert("em1_trig", boxed(geometry::pythagoras));
        map.insert("em1_stats", boxed(reasoning::mean_of_three));

        map.insert("em2_exp_log", boxed(algebra::exponent_equation));
        map.insert("em2_seq", boxed(algebra::arithmetic_progression));
        map.insert("em2_comb", boxed(reasoning::outfit_combinations));
        map.insert("em2_geo_analytic", boxed(geometry::squared_distance));

        map.insert("em3_prob", boxed(reasoning::dice_probability));
        map.insert("em3_matrices", boxed(algebra::matrix_addition));
        map.insert("em3_complex", boxed(algebra::complex_conjugate));
        map.insert("em3_limits", boxed(algebra::limit_intuition));

        map.insert("ob_patterns", boxed(reasoning::pattern_continuation));
        map.insert("ob_parity", boxed(reasoning::parity_pick));
        map.insert("ob_counting", boxed(reasoning::choice_counting));

        Self { map }
    }

    /// Generates a question for the skill at the requested difficulty.
    /// Unknown ids use the default generator but keep the requested tag.
    pub fn generate(
        &self,
        skill_id: &str,
        difficulty: Difficulty,
        rng: &mut dyn RngCore,
    ) -> Question {
        let mut question = match self.map.get(skill_id) {
            Some(generator) => generator.generate(skill_id, rng),
            None => arithmetic::order_of_operations(skill_id, rng),
        };
        question.difficulty = difficulty;
        question
    }

    pub fn contains(&self, skill_id: &str) -> bool {
        self.map.contains_key(skill_id)
    }

    pub fn skill_ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.map.keys().copied()
    }
}

impl Default for GeneratorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::thread_rng;

    #[test]
    fn test_every_catalog_skill_has_a_generator() {
        let registry = GeneratorRegistry::new();
        for skill in crate::content::SKILLS {
            assert!(registry.contains(skill.id), "no generator for {}", skill.id);
        }
    }

    #[test]
    fn test_every_generator_emits_four_distinct_options() {
        let registry = GeneratorRegistry::new();
        let mut rng = thread_rng();
        for skill_id in registry.skill_ids().collect::<Vec<_>>() {
            for _ in 0..40 {
                let q = registry.generate(skill_id, Difficulty::Mid, &mut rng);
                assert_eq!(q.options.len(), 4, "skill {}", skill_id);
                let distinct: BTreeSet<&String> = q.options.iter().collect();
                assert_eq!(distinct.len(), 4, "duplicate options for {}: {:?}", skill_id, q.options);
                assert_eq!(
                    q.options.iter().filter(|o| **o == q.correct).count(),
                    1,
                    "correct answer missing or doubled for {}",
                    skill_id
                );
                assert_eq!(q.skill_id, skill_id);
            }
        }
    }

    #[test]
    fn test_unknown_skill_falls_back_without_failing() {
        let registry = GeneratorRegistry::new();
        let mut rng = thread_rng();
        let q = registry.generate("g99_not_in_catalog", Difficulty::Easy, &mut rng);
        assert_eq!(q.skill_id, "g99_not_in_catalog");
        assert_eq!(q.options.len(), 4);
        assert_eq!(q.difficulty, Difficulty::Easy);
    }

    #[test]
    fn test_numeric_distractors_scale_with_magnitude() {
        let mut rng = thread_rng();
        for _ in 0..100 {
            let distractors = numeric_distractors(&mut rng, 9000, 5);
            for d in &distractors {
                let v: i64 = d.parse().unwrap();
                assert!(v != 9000);
                assert!((v - 9000).abs() <= 3000);
            }
        }
    }
}
