//! Curriculum catalog: skills, grade tracks, units and their nodes.
//!
//! Content is compiled in. Each grade track holds four units; each unit holds
//! four nodes (two lessons, a review, a boss). The boss of unit N gates
//! unit N+1.

/// Display metadata for one skill.
pub struct SkillInfo {
    pub id: &'static str,
    pub title: &'static str,
    pub axis: &'static str,
}

pub const SKILLS: &[SkillInfo] = &[
    // Early elementary
    SkillInfo { id: "g1_count_succ", title: "Counting: successor", axis: "number-sense" },
    SkillInfo { id: "g1_add_10", title: "Addition up to 10", axis: "operations" },
    SkillInfo { id: "g1_sub_10", title: "Subtraction up to 10", axis: "operations" },
    SkillInfo { id: "g1_patterns", title: "Simple patterns", axis: "reasoning" },
    SkillInfo { id: "g2_place_value", title: "Place value (tens/ones)", axis: "number-sense" },
    SkillInfo { id: "g2_add_100", title: "Addition up to 100", axis: "operations" },
    SkillInfo { id: "g2_sub_100", title: "Subtraction up to 100", axis: "operations" },
    SkillInfo { id: "g2_mul_groups", title: "Multiplication as groups", axis: "operations" },
    SkillInfo { id: "g3_mul_facts_2_5", title: "Times tables 2-5", axis: "operations" },
    SkillInfo { id: "g3_div_sharing", title: "Division: sharing", axis: "operations" },
    SkillInfo { id: "g3_frac_halves", title: "Fractions: halves and thirds", axis: "fractions" },
    SkillInfo { id: "g3_area_rect", title: "Area/perimeter: rectangle", axis: "geometry" },
    SkillInfo { id: "g4_mul_facts_6_9", title: "Times tables 6-9", axis: "operations" },
    SkillInfo { id: "g4_mul_2digit", title: "Multiplication (2 digits)", axis: "operations" },
    SkillInfo { id: "g4_frac_equiv", title: "Fractions: equivalence", axis: "fractions" },
    SkillInfo { id: "g4_decimals_01", title: "Decimals: tenths/hundredths", axis: "decimals" },
    SkillInfo { id: "g5_div_2digit", title: "Division (2 digits)", axis: "operations" },
    SkillInfo { id: "g5_frac_add_like", title: "Fractions: same-denominator sum", axis: "fractions" },
    SkillInfo { id: "g5_dec_addsub", title: "Decimals: add/subtract", axis: "decimals" },
    SkillInfo { id: "g5_percent_intro", title: "Percent: first notions", axis: "percent" },
    // Middle school
    SkillInfo { id: "g6_order_ops", title: "Order of operations", axis: "pre-algebra" },
    SkillInfo { id: "g6_dec_compare", title: "Decimals: compare", axis: "decimals" },
    SkillInfo { id: "g6_frac_equiv", title: "Fractions: equivalence", axis: "fractions" },
    SkillInfo { id: "g6_percent_simple", title: "Percent 10/25/50", axis: "percent" },
    SkillInfo { id: "g7_int_ops", title: "Integers: operations", axis: "pre-algebra" },
    SkillInfo { id: "g7_prop", title: "Proportionality", axis: "pre-algebra" },
    SkillInfo { id: "g7_eq_1step", title: "Equations: one step", axis: "algebra" },
    SkillInfo { id: "g7_area", title: "Basic areas", axis: "geometry" },
    SkillInfo { id: "g8_algebra_simplify", title: "Algebra: simplify", axis: "algebra" },
    SkillInfo { id: "g8_eq_linear", title: "Linear equations", axis: "algebra" },
    SkillInfo { id: "g8_functions_intro", title: "Functions: evaluate", axis: "functions" },
    SkillInfo { id: "g8_powers", title: "Powers", axis: "pre-algebra" },
    SkillInfo { id: "g9_systems", title: "Linear systems (simple)", axis: "algebra" },
    SkillInfo { id: "g9_quadratic", title: "Quadratics: factoring", axis: "algebra" },
    SkillInfo { id: "g9_similarity", title: "Similarity", axis: "geometry" },
    SkillInfo { id: "g9_probability", title: "Basic probability", axis: "probability" },
    // High school
    SkillInfo { id: "em1_functions", title: "Linear/quadratic functions", axis: "functions" },
    SkillInfo { id: "em1_factor", title: "Factoring", axis: "algebra" },
    SkillInfo { id: "em1_trig", title: "Basic trigonometry", axis: "geometry" },
    SkillInfo { id: "em1_stats", title: "Statistics: mean/median", axis: "statistics" },
    SkillInfo { id: "em2_exp_log", title: "Exponentials and logs", axis: "functions" },
    SkillInfo { id: "em2_seq", title: "Arithmetic progressions", axis: "functions" },
    SkillInfo { id: "em2_comb", title: "Combinatorics", axis: "probability" },
    SkillInfo { id: "em2_geo_analytic", title: "Analytic geometry", axis: "geometry" },
    SkillInfo { id: "em3_prob", title: "Probability (advanced)", axis: "probability" },
    SkillInfo { id: "em3_matrices", title: "Matrices (basics)", axis: "algebra" },
    SkillInfo { id: "em3_complex", title: "Complex numbers (basics)", axis: "algebra" },
    SkillInfo { id: "em3_limits", title: "Pre-calculus: limits", axis: "functions" },
    // Open weekly events
    SkillInfo { id: "ob_patterns", title: "Olympiad-style: patterns", axis: "reasoning" },
    SkillInfo { id: "ob_parity", title: "Olympiad-style: parity", axis: "reasoning" },
    SkillInfo { id: "ob_counting", title: "Olympiad-style: counting", axis: "reasoning" },
];

/// Display title for a skill id; unknown ids render as themselves.
pub fn skill_title(skill_id: &str) -> &str {
    SKILLS
        .iter()
        .find(|s| s.id == skill_id)
        .map(|s| s.title)
        .unwrap_or(skill_id)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Lesson,
    Review,
    Boss,
}

#[derive(Clone, Debug)]
pub struct Node {
    pub node_id: String,
    pub kind: NodeKind,
    pub title: &'static str,
}

#[derive(Clone, Debug)]
pub struct Unit {
    pub unit_id: String,
    pub title: &'static str,
    pub skill_ids: Vec<&'static str>,
}

impl Unit {
    fn new(track_key: &str, idx: usize, title: &'static str, skill_ids: &[&'static str]) -> Self {
        Self {
            unit_id: format!("{}_u{}", track_key, idx),
            title,
            skill_ids: skill_ids.to_vec(),
        }
    }

    /// The four playable nodes of this unit, boss last.
    pub fn nodes(&self) -> Vec<Node> {
        vec![
            Node { node_id: format!("{}_l1", self.unit_id), kind: NodeKind::Lesson, title: "Lesson 1" },
            Node { node_id: format!("{}_l2", self.unit_id), kind: NodeKind::Lesson, title: "Lesson 2" },
            Node { node_id: format!("{}_r1", self.unit_id), kind: NodeKind::Review, title: "Review" },
            Node { node_id: format!("{}_b1", self.unit_id), kind: NodeKind::Boss, title: "Boss (80%)" },
        ]
    }

    /// Node that gates the next unit.
    pub fn boss_node_id(&self) -> String {
        format!("{}_b1", self.unit_id)
    }
}

#[derive(Clone, Debug)]
pub struct Track {
    pub track_key: &'static str,
    pub grade_year: u8,
    pub units: Vec<Unit>,
}

/// Builds the full track catalog.
pub fn tracks() -> Vec<Track> {
    fn track(key: &'static str, grade_year: u8, units: &[(&'static str, &[&'static str])]) -> Track {
        Track {
            track_key: key,
            grade_year,
            units: units
                .iter()
                .enumerate()
                .map(|(i, (title, skills))| Unit::new(key, i + 1, title, skills))
                .collect(),
        }
    }

    vec![
        track("g1", 1, &[
            ("Counting and successor", &["g1_count_succ"]),
            ("Addition up to 10", &["g1_add_10"]),
            ("Subtraction up to 10", &["g1_sub_10"]),
            ("Patterns", &["g1_patterns"]),
        ]),
        track("g2", 2, &[
            ("Place value", &["g2_place_value"]),
            ("Addition up to 100", &["g2_add_100"]),
            ("Subtraction up to 100", &["g2_sub_100"]),
            ("Multiplication as groups", &["g2_mul_groups"]),
        ]),
        track("g3", 3, &[
            ("Times tables 2-5", &["g3_mul_facts_2_5"]),
            ("Division: sharing", &["g3_div_sharing"]),
            ("Fractions: halves and thirds", &["g3_frac_halves"]),
            ("Area and perimeter", &["g3_area_rect"]),
        ]),
        track("g4", 4, &[
            ("Times tables 6-9", &["g4_mul_facts_6_9"]),
            ("Multiplication (2 digits)", &["g4_mul_2digit"]),
            ("Fractions: equivalence", &["g4_frac_equiv"]),
            ("Decimals: tenths/hundredths", &["g4_decimals_01"]),
        ]),
        track("g5", 5, &[
            ("Division (2 digits)", &["g5_div_2digit"]),
            ("Fractions: same-denominator sum", &["g5_frac_add_like"]),
            ("Decimals: add and subtract", &["g5_dec_addsub"]),
            ("Percent: first notions", &["g5_percent_intro"]),
        ]),
        track("g6", 6, &[
            ("Order of operations", &["g6_order_ops"]),
            ("Decimals: compare", &["g6_dec_compare"]),
            ("Fractions: equivalence", &["g6_frac_equiv"]),
            ("Percent 10/25/50", &["g6_percent_simple"]),
        ]),
        track("g7", 7, &[
            ("Integers: operations", &["g7_int_ops"]),
            ("Proportionality", &["g7_prop"]),
            ("Equations: one step", &["g7_eq_1step"]),
            ("Basic areas", &["g7_area"]),
        ]),
        track("g8", 8, &[
            ("Algebra: simplify", &["g8_algebra_simplify"]),
            ("Linear equations", &["g8_eq_linear"]),
            ("Functions: evaluate", &["g8_functions_intro"]),
            ("Powers", &["g8_powers"]),
        ]),
        track("g9", 9, &[
            ("Linear systems", &["g9_systems"]),
            ("Quadratics: factoring", &["g9_quadratic"]),
            ("Similarity", &["g9_similarity"]),
            ("Basic probability", &["g9_probability"]),
        ]),
        track("em1", 10, &[
            ("Functions (linear/quadratic)", &["em1_functions"]),
            ("Factoring", &["em1_factor"]),
            ("Basic trigonometry", &["em1_trig"]),
            ("Statistics (mean/median)", &["em1_stats"]),
        ]),
        track("em2", 11, &[
            ("Exponentials and logs", &["em2_exp_log"]),
            ("Arithmetic progressions", &["em2_seq"]),
            ("Combinatorics", &["em2_comb"]),
            ("Analytic geometry", &["em2_geo_analytic"]),
        ]),
        track("em3", 12, &[
            ("Probability (advanced)", &["em3_prob"]),
            ("Matrices", &["em3_matrices"]),
            ("Complex numbers", &["em3_complex"]),
            ("Pre-calculus: limits", &["em3_limits"]),
        ]),
    ]
}

/// Track key for a grade year; out-of-range grades land on g6.
pub fn track_key_from_grade(grade_year: u8) -> &'static str {
    match grade_year {
        1 => "g1",
        2 => "g2",
        3 => "g3",
        4 => "g4",
        5 => "g5",
        6 => "g6",
        7 => "g7",
        8 => "g8",
        9 => "g9",
        10 => "em1",
        11 => "em2",
        12 => "em3",
        _ => "g6",
    }
}

pub fn grade_label(grade_year: u8) -> String {
    match grade_year {
        1..=9 => format!("grade {}", grade_year),
        10 => "HS year 1".to_string(),
        11 => "HS year 2".to_string(),
        12 => "HS year 3".to_string(),
        g => format!("{}", g),
    }
}

pub fn track_label(track_key: &str) -> String {
    match track_key {
        "em1" => "HS year 1".to_string(),
        "em2" => "HS year 2".to_string(),
        "em3" => "HS year 3".to_string(),
        k if k.starts_with('g') => format!("grade {}", &k[1..]),
        k => k.to_string(),
    }
}
