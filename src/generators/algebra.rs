//! Algebra and function generators.

use super::{fill_distinct, multiple_choice, numeric_distractors};
use crate::models::{ErrorType, Question};
use rand::{Rng, RngCore};

fn signed_term(b: i64) -> String {
    if b >= 0 {
        format!("+ {}", b)
    } else {
        format!("− {}", -b)
    }
}

pub(crate) fn proportionality(skill_id: &str, rng: &mut dyn RngCore) -> Question {
    let x1: i64 = rng.gen_range(2..=6);
    let k: i64 = rng.gen_range(2..=5);
    let y1 = x1 * k;
    let x2: i64 = rng.gen_range(2..=8);
    let correct = x2 * k;
    let distractors = numeric_distractors(rng, correct, 12);
    multiple_choice(
        rng,
        format!(
            "If {} becomes {}, what does {} become at the same rate?",
            x1, y1, x2
        ),
        correct.to_string(),
        distractors,
        "Hint: find the multiplying factor.",
        skill_id,
        ErrorType::Conceptual,
    )
}

pub(crate) fn one_step_equation(skill_id: &str, rng: &mut dyn RngCore) -> Question {
    let a: i64 = rng.gen_range(1..=9);
    let x: i64 = rng.gen_range(1..=12);
    let prompt = if rng.gen_bool(0.5) {
        format!("x + {} = {}. What is x?", a, x + a)
    } else {
        format!("x − {} = {}. What is x?", a, x - a)
    };
    let distractors = numeric_distractors(rng, x, 8);
    multiple_choice(
        rng,
        prompt,
        x.to_string(),
        distractors,
        "Hint: isolate x by doing the inverse operation.",
        skill_id,
        ErrorType::Procedural,
    )
}

pub(crate) fn simplify_like_terms(skill_id: &str, rng: &mut dyn RngCore) -> Question {
    let a: i64 = rng.gen_range(1..=9);
    let b: i64 = rng.gen_range(1..=9);
    let correct = format!("{}x", a + b);
    let candidates = vec![
        format!("{}x", a),
        format!("{}x", b),
        format!("{}x", a + b + 1),
    ];
    let distractors = fill_distinct(rng, &correct, candidates, |rng| {
        format!("{}x", rng.gen_range(1..=20))
    });
    multiple_choice(
        rng,
        format!("Simplify: {}x + {}x = ?", a, b),
        correct,
        distractors,
        "Hint: add the coefficients of like terms.",
        skill_id,
        ErrorType::Conceptual,
    )
}

pub(crate) fn linear_equation(skill_id: &str, rng: &mut dyn RngCore) -> Question {
    let a: i64 = rng.gen_range(2..=6);
    let x: i64 = rng.gen_range(1..=10);
    let b: i64 = rng.gen_range(-6..=6);
    let c = a * x + b;
    let distractors = numeric_distractors(rng, x, 8);
    multiple_choice(
        rng,
        format!("Solve: {}x {} = {}.", a, signed_term(b), c),
        x.to_string(),
        distractors,
        "Hint: move b across, then divide by a.",
        skill_id,
        ErrorType::Procedural,
    )
}

pub(crate) fn evaluate_function(skill_id: &str, rng: &mut dyn RngCore) -> Question {
    let a: i64 = rng.gen_range(-3..=5);
    let b: i64 = rng.gen_range(-6..=6);
    let x: i64 = rng.gen_range(-4..=4);
    let correct = a * x + b;
    let distractors = numeric_distractors(rng, correct, 12);
    multiple_choice(
        rng,
        format!("If f(x) = {}x {}, then f({}) = ?", a, signed_term(b), x),
        correct.to_string(),
        distractors,
        "Hint: substitute x and work it out.",
        skill_id,
        ErrorType::Procedural,
    )
}

pub(crate) fn linear_system(skill_id: &str, rng: &mut dyn RngCore) -> Question {
    let x: i64 = rng.gen_range(1..=8);
    let y: i64 = rng.gen_range(1..=8);
    let distractors = numeric_distractors(rng, x, 6);
    multiple_choice(
        rng,
        format!("If x + y = {} and x − y = {}, what is x?", x + y, x - y),
        x.to_string(),
        distractors,
        "Hint: add the two equations to eliminate y.",
        skill_id,
        ErrorType::Conceptual,
    )
}

pub(crate) fn quadratic_factoring(skill_id: &str, rng: &mut dyn RngCore) -> Question {
    let mut p: i64 = rng.gen_range(1..=6);
    let mut q: i64 = rng.gen_range(1..=6);
    if p > q {
        std::mem::swap(&mut p, &mut q);
    }
    let b = p + q;
    let c = p * q;
    let factored = |r: i64, s: i64| format!("(x+{})(x+{})", r.min(s), r.max(s));
    let correct = factored(p, q);
    let candidates = vec![factored(p + 1, q), factored(p, q + 1), factored(b, c)];
    let distractors = fill_distinct(rng, &correct, candidates, |rng| {
        factored(rng.gen_range(1..=8), rng.gen_range(1..=8))
    });
    multiple_choice(
        rng,
        format!("Factor: x² + {}x + {}", b, c),
        correct,
        distractors,
        "Hint: look for two numbers that add to b and multiply to c.",
        skill_id,
        ErrorType::Conceptual,
    )
}

pub(crate) fn arithmetic_progression(skill_id: &str, rng: &mut dyn RngCore) -> Question {
    let a1: i64 = rng.gen_range(1..=6);
    let r: i64 = rng.gen_range(2..=6);
    let n: i64 = rng.gen_range(3..=6);
    let an = a1 + (n - 1) * r;
    let distractors = numeric_distractors(rng, an, 10);
    multiple_choice(
        rng,
        format!(
            "In an arithmetic progression with a1 = {} and step {}, what is term {}?",
            a1, r, n
        ),
        an.to_string(),
        distractors,
        "Hint: a(n) = a1 + (n − 1) × step.",
        skill_id,
        ErrorType::Conceptual,
    )
}

pub(crate) fn exponent_equation(skill_id: &str, rng: &mut dyn RngCore) -> Question {
    let base: i64 = rng.gen_range(2..=5);
    let exp: u32 = rng.gen_range(2..=4);
    let value = base.pow(exp);
    let distractors = numeric_distractors(rng, exp as i64, 4);
    multiple_choice(
        rng,
        format!("If {}^x = {}, then x = ?", base, value),
        exp.to_string(),
        distractors,
        "Hint: which exponent produces the value?",
        skill_id,
        ErrorType::Conceptual,
    )
}

pub(crate) fn matrix_addition(skill_id: &str, rng: &mut dyn RngCore) -> Question {
    let a: i64 = rng.gen_range(0..=5);
    let b: i64 = rng.gen_range(0..=5);
    let c: i64 = rng.gen_range(0..=5);
    let d: i64 = rng.gen_range(0..=5);
    let matrix = |m: i64, n: i64, o: i64, p: i64| format!("[[{},{}],[{},{}]]", m, n, o, p);
    let correct = matrix(a + 1, b + 1, c + 1, d + 1);
    let candidates = vec![
        matrix(a + 1, b, c, d + 1),
        matrix(a, b, c, d),
        matrix(a + 2, b + 2, c + 2, d + 2),
    ];
    let distractors = fill_distinct(rng, &correct, candidates, |rng| {
        matrix(
            rng.gen_range(0..=7),
            rng.gen_range(0..=7),
            rng.gen_range(0..=7),
            rng.gen_range(0..=7),
        )
    });
    multiple_choice(
        rng,
        format!("{} + [[1,1],[1,1]] = ?", matrix(a, b, c, d)),
        correct,
        distractors,
        "Hint: add entry by entry.",
        skill_id,
        ErrorType::Conceptual,
    )
}

pub(crate) fn complex_conjugate(skill_id: &str, rng: &mut dyn RngCore) -> Question {
    let a: i64 = rng.gen_range(1..=6);
    let b: i64 = rng.gen_range(1..=6);
    let correct = format!("{} − {}i", a, b);
    let candidates = vec![
        format!("{} + {}i", a, b),
        format!("-{} − {}i", a, b),
        format!("{} − {}i", a, b + 1),
    ];
    let distractors = fill_distinct(rng, &correct, candidates, |rng| {
        format!("{} − {}i", rng.gen_range(1..=9), rng.gen_range(1..=9))
    });
    multiple_choice(
        rng,
        format!("If z = {} + {}i, the conjugate of z is:", a, b),
        correct,
        distractors,
        "Hint: the conjugate flips the sign of the imaginary part.",
        skill_id,
        ErrorType::Conceptual,
    )
}

pub(crate) fn limit_intuition(skill_id: &str, rng: &mut dyn RngCore) -> Question {
    let a: i64 = rng.gen_range(1..=8);
    let correct = a + 2;
    let distractors = numeric_distractors(rng, correct, 6);
    multiple_choice(
        rng,
        format!(
            "Intuition: as x gets close to {}, the value of (x + 2) gets close to:",
            a
        ),
        correct.to_string(),
        distractors,
        "Hint: plug in a value very near x.",
        skill_id,
        ErrorType::Conceptual,
    )
}
