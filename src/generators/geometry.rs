//! Geometry generators.

use super::{fill_distinct, multiple_choice, numeric_distractors};
use crate::models::{ErrorType, Question};
use rand::{Rng, RngCore};

pub(crate) fn rectangle_area(skill_id: &str, rng: &mut dyn RngCore) -> Question {
    let w: i64 = rng.gen_range(2..=10);
    let h: i64 = rng.gen_range(2..=10);
    let correct = w * h;
    // Classic confusions: sum of sides, perimeter
    let candidates = vec![(w + h).to_string(), (2 * (w + h)).to_string()];
    let distractors = fill_distinct(rng, &correct.to_string(), candidates, |rng| {
        (correct + rng.gen_range(1..=8)).to_string()
    });
    multiple_choice(
        rng,
        format!(
            "A rectangle is {} wide and {} tall. What is its area?",
            w, h
        ),
        correct.to_string(),
        distractors,
        "Hint: area of a rectangle = width × height.",
        skill_id,
        ErrorType::Conceptual,
    )
}

pub(crate) fn similarity(skill_id: &str, rng: &mut dyn RngCore) -> Question {
    let a: i64 = rng.gen_range(2..=6);
    let b: i64 = rng.gen_range(2..=6);
    let k: i64 = rng.gen_range(2..=5);
    let correct = b * k;
    let distractors = numeric_distractors(rng, correct, 10);
    multiple_choice(
        rng,
        format!(
            "In similar figures, {} cm maps to {} cm. What does {} cm map to?",
            a,
            a * k,
            b
        ),
        correct.to_string(),
        distractors,
        "Hint: use the same scale factor.",
        skill_id,
        ErrorType::Conceptual,
    )
}

pub(crate) fn pythagoras(skill_id: &str, rng: &mut dyn RngCore) -> Question {
    // Exact triples only, so the answer is a whole number
    const TRIPLES: [(i64, i64, i64); 3] = [(3, 4, 5), (6, 8, 10), (5, 12, 13)];
    let (a, b, hyp) = TRIPLES[rng.gen_range(0..TRIPLES.len())];
    let (given, correct) = if rng.gen_bool(0.5) { (a, b) } else { (b, a) };
    let distractors = numeric_distractors(rng, correct, 5);
    multiple_choice(
        rng,
        format!(
            "A right triangle has hypotenuse {} and one leg {}. How long is the other leg?",
            hyp, given
        ),
        correct.to_string(),
        distractors,
        "Hint: a² + b² = c².",
        skill_id,
        ErrorType::Conceptual,
    )
}

pub(crate) fn squared_distance(skill_id: &str, rng: &mut dyn RngCore) -> Question {
    let x1: i64 = rng.gen_range(-4..=4);
    let y1: i64 = rng.gen_range(-4..=4);
    let x2: i64 = rng.gen_range(-4..=4);
    let y2: i64 = rng.gen_range(-4..=4);
    let dx = x2 - x1;
    let dy = y2 - y1;
    let correct = dx * dx + dy * dy;
    let distractors = numeric_distractors(rng, correct, 10);
    multiple_choice(
        rng,
        format!(
            "The squared distance between ({},{}) and ({},{}) is:",
            x1, y1, x2, y2
        ),
        correct.to_string(),
        distractors,
        "Hint: d² = (Δx)² + (Δy)².",
        skill_id,
        ErrorType::Procedural,
    )
}
