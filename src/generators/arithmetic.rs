//! Whole-number arithmetic generators.

use super::{fill_distinct, jittered, multiple_choice, numeric_distractors};
use crate::models::{ErrorType, Question};
use rand::{Rng, RngCore};

pub(crate) fn counting_successor(skill_id: &str, rng: &mut dyn RngCore) -> Question {
    let n: i64 = rng.gen_range(0..=19);
    let correct = n + 1;
    let distractors = numeric_distractors(rng, correct, 4);
    multiple_choice(
        rng,
        format!("Which number comes right after {}?", n),
        correct.to_string(),
        distractors,
        "Hint: count one more.",
        skill_id,
        ErrorType::Conceptual,
    )
}

pub(crate) fn addition(skill_id: &str, rng: &mut dyn RngCore, max: i64) -> Question {
    let a = rng.gen_range(0..=max);
    let b = rng.gen_range(0..=max);
    let correct = a + b;
    let distractors = numeric_distractors(rng, correct, (max / 2).max(5));
    multiple_choice(
        rng,
        format!("{} + {} = ?", a, b),
        correct.to_string(),
        distractors,
        "Hint: put the two amounts together.",
        skill_id,
        ErrorType::FactRecall,
    )
}

pub(crate) fn subtraction(skill_id: &str, rng: &mut dyn RngCore, max: i64) -> Question {
    let a = rng.gen_range(0..=max);
    let b = rng.gen_range(0..=a);
    let correct = a - b;
    let distractors = numeric_distractors(rng, correct, (max / 2).max(5));
    multiple_choice(
        rng,
        format!("{} − {} = ?", a, b),
        correct.to_string(),
        distractors,
        "Hint: think of taking a part away.",
        skill_id,
        ErrorType::FactRecall,
    )
}

pub(crate) fn place_value(skill_id: &str, rng: &mut dyn RngCore) -> Question {
    let n: i64 = rng.gen_range(10..=99);
    let tens = n / 10;
    let ones = n % 10;
    let ask_tens = rng.gen_bool(0.5);
    let correct = if ask_tens { tens } else { ones };
    let prompt = if ask_tens {
        format!("In the number {}, how many tens are there?", n)
    } else {
        format!("In the number {}, how many ones are there?", n)
    };
    let candidates = vec![
        (correct + 1).to_string(),
        (correct - 1).max(0).to_string(),
        rng.gen_range(0..=9).to_string(),
    ];
    let distractors = fill_distinct(rng, &correct.to_string(), candidates, |rng| {
        rng.gen_range(0..=12).to_string()
    });
    multiple_choice(
        rng,
        prompt,
        correct.to_string(),
        distractors,
        "Hint: split the number into tens and ones.",
        skill_id,
        ErrorType::PlaceValue,
    )
}

pub(crate) fn multiplication_facts(
    skill_id: &str,
    rng: &mut dyn RngCore,
    min_a: i64,
    max_a: i64,
) -> Question {
    let a = rng.gen_range(min_a..=max_a);
    let b: i64 = rng.gen_range(0..=10);
    let correct = a * b;
    // Near-miss products: off-by-one on either factor
    let candidates = vec![
        (a * (b + 1).min(10)).to_string(),
        (a * (b - 1).max(0)).to_string(),
        ((a + 1) * b).to_string(),
    ];
    let distractors = fill_distinct(rng, &correct.to_string(), candidates, |rng| {
        jittered(rng, correct, 9).to_string()
    });
    multiple_choice(
        rng,
        format!("{} × {} = ?", a, b),
        correct.to_string(),
        distractors,
        "Hint: use the times table or repeated addition.",
        skill_id,
        ErrorType::FactRecall,
    )
}

pub(crate) fn multiplication_groups(skill_id: &str, rng: &mut dyn RngCore) -> Question {
    let groups: i64 = rng.gen_range(2..=6);
    let each: i64 = rng.gen_range(2..=6);
    let correct = groups * each;
    let distractors = numeric_distractors(rng, correct, 6);
    multiple_choice(
        rng,
        format!("{} groups of {} make how many in total?", groups, each),
        correct.to_string(),
        distractors,
        "Hint: it is a multiplication, groups × amount.",
        skill_id,
        ErrorType::Conceptual,
    )
}

pub(crate) fn multiplication_2digit(skill_id: &str, rng: &mut dyn RngCore) -> Question {
    let a: i64 = rng.gen_range(10..=99);
    let b: i64 = rng.gen_range(2..=9);
    let correct = a * b;
    let distractors = numeric_distractors(rng, correct, 40);
    multiple_choice(
        rng,
        format!("{} × {} = ?", a, b),
        correct.to_string(),
        distractors,
        "Hint: break it apart (e.g. 23×4 = 20×4 + 3×4).",
        skill_id,
        ErrorType::Procedural,
    )
}

pub(crate) fn division_sharing(skill_id: &str, rng: &mut dyn RngCore) -> Question {
    let each: i64 = rng.gen_range(2..=6);
    let groups: i64 = rng.gen_range(2..=6);
    let total = each * groups;
    let distractors = numeric_distractors(rng, groups, 4);
    multiple_choice(
        rng,
        format!(
            "If {} candies are split into groups of {}, how many groups are there?",
            total, each
        ),
        groups.to_string(),
        distractors,
        "Hint: division is sharing into equal parts.",
        skill_id,
        ErrorType::Conceptual,
    )
}

pub(crate) fn division_2digit(skill_id: &str, rng: &mut dyn RngCore) -> Question {
    let b: i64 = rng.gen_range(2..=9);
    let q: i64 = rng.gen_range(2..=20);
    let a = b * q;
    let distractors = numeric_distractors(rng, q, 8);
    multiple_choice(
        rng,
        format!("{} ÷ {} = ?", a, b),
        q.to_string(),
        distractors,
        "Hint: think of the times table in reverse.",
        skill_id,
        ErrorType::FactRecall,
    )
}

pub(crate) fn order_of_operations(skill_id: &str, rng: &mut dyn RngCore) -> Question {
    let a: i64 = rng.gen_range(2..=9);
    let b: i64 = rng.gen_range(2..=9);
    let c: i64 = rng.gen_range(1..=9);
    let (expr, correct) = if rng.gen_bool(0.5) {
        (format!("({} + {}) × {}", a, b, c), (a + b) * c)
    } else {
        (format!("{} + {} × {}", a, b, c), a + b * c)
    };
    let distractors = numeric_distractors(rng, correct, 15);
    multiple_choice(
        rng,
        format!("{} = ?", expr),
        correct.to_string(),
        distractors,
        "Hint: multiply before adding, unless parentheses say otherwise.",
        skill_id,
        ErrorType::Procedural,
    )
}

pub(crate) fn integer_ops(skill_id: &str, rng: &mut dyn RngCore) -> Question {
    let a: i64 = rng.gen_range(-10..=10);
    let b: i64 = rng.gen_range(-10..=10);
    let (op, correct) = if rng.gen_bool(0.5) { ("+", a + b) } else { ("−", a - b) };
    let distractors = numeric_distractors(rng, correct, 10);
    multiple_choice(
        rng,
        format!("{} {} {} = ?", a, op, b),
        correct.to_string(),
        distractors,
        "Hint: watch the signs.",
        skill_id,
        ErrorType::Procedural,
    )
}

pub(crate) fn powers(skill_id: &str, rng: &mut dyn RngCore) -> Question {
    let base: i64 = rng.gen_range(2..=6);
    let exp: u32 = rng.gen_range(2..=4);
    let correct = base.pow(exp);
    let distractors = numeric_distractors(rng, correct, 20);
    multiple_choice(
        rng,
        format!("{}^{} = ?", base, exp),
        correct.to_string(),
        distractors,
        "Hint: a power is the number multiplied by itself.",
        skill_id,
        ErrorType::FactRecall,
    )
}
