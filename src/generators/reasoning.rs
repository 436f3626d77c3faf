//! Reasoning, probability and statistics generators. Olympiad-style items
//! imitate the contest flavor without copying real questions.

use super::{fill_distinct, multiple_choice, numeric_distractors};
use crate::models::{ErrorType, Question};
use rand::{Rng, RngCore};

pub(crate) fn pattern_continuation(skill_id: &str, rng: &mut dyn RngCore) -> Question {
    let start: i64 = rng.gen_range(1..=5);
    let step: i64 = rng.gen_range(2..=5);
    let next = start + step * 3;
    let distractors = numeric_distractors(rng, next, 10);
    multiple_choice(
        rng,
        format!(
            "Continue the pattern: {}, {}, {}, __",
            start,
            start + step,
            start + step * 2
        ),
        next.to_string(),
        distractors,
        "Hint: look at how much each term changes.",
        skill_id,
        ErrorType::Conceptual,
    )
}

/// Pick the one number with the asked parity out of four.
pub(crate) fn parity_pick(skill_id: &str, rng: &mut dyn RngCore) -> Question {
    let want_even = rng.gen_bool(0.5);
    let correct: i64 = 2 * rng.gen_range(5..=49) + if want_even { 0 } else { 1 };
    let mut distractors: Vec<String> = Vec::new();
    while distractors.len() < 3 {
        // Opposite parity, so only one option qualifies
        let d = 2 * rng.gen_range(5..=49) + if want_even { 1 } else { 0 };
        let d = d.to_string();
        if !distractors.contains(&d) {
            distractors.push(d);
        }
    }
    multiple_choice(
        rng,
        format!(
            "Which of these numbers is {}?",
            if want_even { "even" } else { "odd" }
        ),
        correct.to_string(),
        distractors,
        "Hint: even numbers end in 0, 2, 4, 6 or 8.",
        skill_id,
        ErrorType::Conceptual,
    )
}

pub(crate) fn choice_counting(skill_id: &str, rng: &mut dyn RngCore) -> Question {
    let a: i64 = rng.gen_range(2..=5);
    let b: i64 = rng.gen_range(2..=5);
    let c: i64 = rng.gen_range(2..=5);
    let correct = a * b * c;
    let distractors = numeric_distractors(rng, correct, 12);
    multiple_choice(
        rng,
        format!(
            "Picking 1 item from each group ({} options, {} options and {} options), how many combinations are there?",
            a, b, c
        ),
        correct.to_string(),
        distractors,
        "Hint: multiply the option counts.",
        skill_id,
        ErrorType::Conceptual,
    )
}

pub(crate) fn outfit_combinations(skill_id: &str, rng: &mut dyn RngCore) -> Question {
    let shirts: i64 = rng.gen_range(2..=5);
    let pants: i64 = rng.gen_range(2..=5);
    let correct = shirts * pants;
    let distractors = numeric_distractors(rng, correct, 6);
    multiple_choice(
        rng,
        format!(
            "With {} shirts and {} pairs of pants, how many different outfits (1 shirt and 1 pair) are there?",
            shirts, pants
        ),
        correct.to_string(),
        distractors,
        "Hint: use the multiplication principle.",
        skill_id,
        ErrorType::Conceptual,
    )
}

pub(crate) fn dice_probability(skill_id: &str, rng: &mut dyn RngCore) -> Question {
    let favorable: i64 = rng.gen_range(1..=5);
    let correct = format!("{}/6", favorable);
    let candidates = vec![
        format!("{}/6", favorable + 1),
        format!("{}/7", favorable),
        "1/6".to_string(),
    ];
    let distractors = fill_distinct(rng, &correct, candidates, |rng| {
        format!("{}/{}", rng.gen_range(1..=6), rng.gen_range(5..=9))
    });
    multiple_choice(
        rng,
        format!(
            "Rolling a fair die, the probability of getting a number in {{1..{}}} is:",
            favorable
        ),
        correct,
        distractors,
        "Hint: probability = favorable cases / possible cases.",
        skill_id,
        ErrorType::Conceptual,
    )
}

pub(crate) fn mean_of_three(skill_id: &str, rng: &mut dyn RngCore) -> Question {
    let a: i64 = rng.gen_range(1..=9);
    let b: i64 = rng.gen_range(1..=9);
    let c: i64 = rng.gen_range(1..=9);
    let sum = a + b + c;
    // Display the mean with one decimal, trimming ".0"
    let correct = if sum % 3 == 0 {
        (sum / 3).to_string()
    } else {
        format!("{:.1}", sum as f64 / 3.0)
    };
    let candidates = vec![
        ((sum as f64 / 3.0).round() as i64).to_string(),
        sum.to_string(),
        format!("{:.1}", sum as f64 / 3.0 + 1.0),
    ];
    let distractors = fill_distinct(rng, &correct, candidates, |rng| {
        rng.gen_range(1..=12).to_string()
    });
    multiple_choice(
        rng,
        format!("What is the mean of {}, {} and {}?", a, b, c),
        correct,
        distractors,
        "Hint: add them up and divide by 3.",
        skill_id,
        ErrorType::Procedural,
    )
}
