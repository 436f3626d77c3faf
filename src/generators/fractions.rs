//! Fraction, decimal and percent generators.

use super::{fill_distinct, jittered, multiple_choice, numeric_distractors};
use crate::models::{ErrorType, Question};
use rand::{Rng, RngCore};

fn fraction(n: i64, d: i64) -> String {
    format!("{}/{}", n, d)
}

/// Tenths as a display string: 32 -> "3.2", 30 -> "3", -5 -> "-0.5".
fn fmt_tenths(t: i64) -> String {
    if t < 0 {
        return format!("-{}", fmt_tenths(-t));
    }
    if t % 10 == 0 {
        (t / 10).to_string()
    } else {
        format!("{}.{}", t / 10, t % 10)
    }
}

pub(crate) fn fraction_halves(skill_id: &str, rng: &mut dyn RngCore) -> Question {
    multiple_choice(
        rng,
        "Which fraction shows one half?".to_string(),
        "1/2".to_string(),
        vec!["1/3".to_string(), "2/3".to_string(), "1/4".to_string()],
        "Hint: one half means splitting into 2 equal parts.",
        skill_id,
        ErrorType::Conceptual,
    )
}

pub(crate) fn fraction_equivalence(skill_id: &str, rng: &mut dyn RngCore) -> Question {
    let n: i64 = rng.gen_range(1..=4);
    let d: i64 = rng.gen_range(n + 1..=6);
    let k: i64 = rng.gen_range(2..=4);
    let correct = fraction(n * k, d * k);
    let candidates = vec![
        fraction(n + 1, d),
        fraction(n, d + 1),
        fraction(n * (k + 1), d * k),
    ];
    let distractors = fill_distinct(rng, &correct, candidates, |rng| {
        fraction(rng.gen_range(1..=9), rng.gen_range(2..=9))
    });
    multiple_choice(
        rng,
        format!("Which fraction is equivalent to {}?", fraction(n, d)),
        correct,
        distractors,
        "Hint: multiply the top and the bottom by the same number.",
        skill_id,
        ErrorType::Conceptual,
    )
}

pub(crate) fn fraction_add_like(skill_id: &str, rng: &mut dyn RngCore) -> Question {
    const DENOMINATORS: [i64; 7] = [2, 3, 4, 5, 6, 8, 10];
    let d = DENOMINATORS[rng.gen_range(0..DENOMINATORS.len())];
    let n1: i64 = rng.gen_range(1..d);
    let mut n2: i64 = rng.gen_range(1..d);
    while n2 == n1 && d > 2 {
        n2 = rng.gen_range(1..d);
    }
    let correct = fraction(n1 + n2, d);
    let candidates = vec![fraction(n1 + n2, d + 1), fraction(n1, d), fraction(n2, d)];
    let distractors = fill_distinct(rng, &correct, candidates, |rng| {
        fraction(rng.gen_range(1..=2 * d), d + rng.gen_range(1..=3))
    });
    multiple_choice(
        rng,
        format!("Add: {} + {}", fraction(n1, d), fraction(n2, d)),
        correct,
        distractors,
        "Hint: same denominator, so add the numerators.",
        skill_id,
        ErrorType::Conceptual,
    )
}

/// "Which is larger" over two hundredth-precision decimals.
pub(crate) fn decimal_larger_of_two(skill_id: &str, rng: &mut dyn RngCore) -> Question {
    let a: i64 = rng.gen_range(10..=99);
    let mut b: i64 = rng.gen_range(10..=99);
    while b == a {
        b = rng.gen_range(10..=99);
    }
    let x = format!("0.{:02}", a);
    let y = format!("0.{:02}", b);
    let (correct, other) = if a > b { (x.clone(), y.clone()) } else { (y.clone(), x.clone()) };
    let distractors = fill_distinct(rng, &correct, vec![other], |rng| {
        format!("0.{:02}", rng.gen_range(10..=99))
    });
    multiple_choice(
        rng,
        format!("Which number is larger: {} or {}?", x, y),
        correct,
        distractors,
        "Hint: compare tenths first, then hundredths.",
        skill_id,
        ErrorType::PlaceValue,
    )
}

/// Comparison with trailing zeros, to probe the 0.5 = 0.50 misconception.
pub(crate) fn decimal_compare(skill_id: &str, rng: &mut dyn RngCore) -> Question {
    let whole: i64 = rng.gen_range(0..=9);
    if rng.gen_bool(0.5) {
        // Equal pair written two ways
        let tenth: i64 = rng.gen_range(1..=9);
        let n1 = format!("{}.{}0", whole, tenth);
        let n2 = format!("{}.{}", whole, tenth);
        let distractors = vec![n1.clone(), n2.clone(), format!("{}.0{}", whole, tenth)];
        multiple_choice(
            rng,
            format!("Which is larger: {} or {}?", n1, n2),
            "Equal".to_string(),
            distractors,
            "Hint: trailing zeros do not change the value (0.5 = 0.50).",
            skill_id,
            ErrorType::PlaceValue,
        )
    } else {
        let b: i64 = rng.gen_range(0..=9);
        let mut d: i64 = rng.gen_range(1..=9);
        while d == b {
            d = rng.gen_range(1..=9);
        }
        let n1 = format!("{}.{}0", whole, b);
        let n2 = format!("{}.{}0", whole, d);
        let (correct, other) = if b > d { (n1.clone(), n2.clone()) } else { (n2.clone(), n1.clone()) };
        let distractors = vec![other, "Equal".to_string(), format!("{}.{}{}", whole, b, d)];
        multiple_choice(
            rng,
            format!("Which is larger: {} or {}?", n1, n2),
            correct,
            distractors,
            "Hint: trailing zeros do not change the value (0.5 = 0.50).",
            skill_id,
            ErrorType::PlaceValue,
        )
    }
}

pub(crate) fn decimal_add_sub(skill_id: &str, rng: &mut dyn RngCore) -> Question {
    let a: i64 = rng.gen_range(10..=99);
    let b: i64 = rng.gen_range(10..=99);
    let (op, correct_tenths) = if rng.gen_bool(0.5) { ("+", a + b) } else { ("−", a - b) };
    let correct = fmt_tenths(correct_tenths);
    let distractors = fill_distinct(rng, &correct, Vec::new(), |rng| {
        fmt_tenths(correct_tenths + jittered(rng, 0, 5))
    });
    multiple_choice(
        rng,
        format!("{} {} {} = ?", fmt_tenths(a), op, fmt_tenths(b)),
        correct,
        distractors,
        "Hint: line up the decimal points.",
        skill_id,
        ErrorType::PlaceValue,
    )
}

pub(crate) fn percent_of(
    skill_id: &str,
    rng: &mut dyn RngCore,
    bases: &[i64],
    percents: &[i64],
) -> Question {
    let base = bases[rng.gen_range(0..bases.len())];
    let p = percents[rng.gen_range(0..percents.len())];
    let correct = base * p / 100;
    let distractors = numeric_distractors(rng, correct, 15);
    multiple_choice(
        rng,
        format!("{}% of {} = ?", p, base),
        correct.to_string(),
        distractors,
        "Hint: 50% is half; 25% is half of half; 10% is a tenth.",
        skill_id,
        ErrorType::Conceptual,
    )
}
