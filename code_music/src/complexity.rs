// Structural complexity of a piece of source code, used to set the tempo.
//
// Four signals are counted with regular expressions over the raw text:
// function definitions, class definitions, loop keywords and conditional
// keywords. The patterns deliberately have no word boundaries, so `elif x`
// counts as a conditional and `platform ` does not count as a loop while
// `therefor ` does. Counts are weighted, scaled by 1/10 and clamped into
// [MIN_FACTOR, MAX_FACTOR].
//
// The regexes are compiled once per process and only ever read.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Lower clamp of the complexity factor. Also the value for empty text.
pub const MIN_FACTOR: f64 = 0.5;
/// Upper clamp of the complexity factor.
pub const MAX_FACTOR: f64 = 2.0;

const FUNCTION_WEIGHT: usize = 2;
const CLASS_WEIGHT: usize = 3;
const LOOP_WEIGHT: usize = 1;
const CONDITIONAL_WEIGHT: usize = 1;

static FUNCTION_DEF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"def\s+\w+\s*\(").expect("function pattern is valid"));
static CLASS_DEF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"class\s+\w+\s*[:\(]").expect("class pattern is valid"));
static LOOP_KEYWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(for|while)\s+").expect("loop pattern is valid"));
static CONDITIONAL_KEYWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"if\s+").expect("conditional pattern is valid"));

/// Raw pattern counts for one input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexityReport {
    pub functions: usize,
    pub classes: usize,
    pub loops: usize,
    pub conditionals: usize,
}

impl ComplexityReport {
    /// Count all four signals in `text`.
    pub fn analyze(text: &str) -> Self {
        ComplexityReport {
            functions: FUNCTION_DEF.find_iter(text).count(),
            classes: CLASS_DEF.find_iter(text).count(),
            loops: LOOP_KEYWORD.find_iter(text).count(),
            conditionals: CONDITIONAL_KEYWORD.find_iter(text).count(),
        }
    }

    /// functions×2 + classes×3 + loops + conditionals.
    pub fn weighted_count(&self) -> usize {
        self.functions * FUNCTION_WEIGHT
            + self.classes * CLASS_WEIGHT
            + self.loops * LOOP_WEIGHT
            + self.conditionals * CONDITIONAL_WEIGHT
    }

    /// The clamped complexity factor.
    pub fn factor(&self) -> f64 {
        (self.weighted_count() as f64 / 10.0).clamp(MIN_FACTOR, MAX_FACTOR)
    }
}

/// Complexity factor of `text`, always within [MIN_FACTOR, MAX_FACTOR].
pub fn analyze_complexity(text: &str) -> f64 {
    ComplexityReport::analyze(text).factor()
}
