//! Dice expressions: `N 'd' M [('kh'|'kl') K] [('+'|'-') X]`.
//!
//! Parsed by hand rather than with a regex crate, matching the split the rest of
//! this corpus draws between the pure domain layer (no regex dependency) and the
//! engine layer (which does reach for one, for input classification).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::random::RandomSource;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceParseError {
    #[error("empty dice formula")]
    Empty,
    #[error("invalid dice format: {0}")]
    InvalidFormat(String),
    #[error("dice count must be at least 1")]
    InvalidDiceCount,
    #[error("die size must be at least 2")]
    InvalidDieSize,
    #[error("keep count must be between 1 and the number of dice rolled")]
    InvalidKeepCount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeepRule {
    Highest(u8),
    Lowest(u8),
}

/// A parsed dice expression like `4d6kh3+2`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceFormula {
    pub dice_count: u8,
    pub die_size: u8,
    pub keep: Option<KeepRule>,
    pub modifier: i32,
}

impl DiceFormula {
    pub fn new(dice_count: u8, die_size: u8, modifier: i32) -> Result<Self, DiceParseError> {
        if dice_count == 0 {
            return Err(DiceParseError::InvalidDiceCount);
        }
        if die_size < 2 {
            return Err(DiceParseError::InvalidDieSize);
        }
        Ok(Self {
            dice_count,
            die_size,
            keep: None,
            modifier,
        })
    }

    /// Parse `N d M [kh K | kl K] [+X | -X]`. Case-insensitive, surrounding
    /// whitespace ignored. Any other shape is `InvalidFormat`.
    pub fn parse(input: &str) -> Result<Self, DiceParseError> {
        let input = input.trim().to_lowercase();
        if input.is_empty() {
            return Err(DiceParseError::Empty);
        }

        let d_pos = input
            .find('d')
            .ok_or_else(|| DiceParseError::InvalidFormat(format!("missing 'd' in '{input}'")))?;

        let dice_count_str = &input[..d_pos];
        let dice_count: u8 = if dice_count_str.is_empty() {
            1
        } else {
            dice_count_str
                .parse()
                .map_err(|_| DiceParseError::InvalidFormat(format!("bad dice count '{dice_count_str}'")))?
        };
        if dice_count == 0 {
            return Err(DiceParseError::InvalidDiceCount);
        }

        let mut rest = &input[d_pos + 1..];

        let keep = if let Some(kh_pos) = rest.find("kh") {
            let (die_str, after) = (&rest[..kh_pos], &rest[kh_pos + 2..]);
            let (k_str, tail) = split_on_modifier(after);
            let k: u8 = k_str
                .parse()
                .map_err(|_| DiceParseError::InvalidFormat(format!("bad keep count '{k_str}'")))?;
            rest = die_str;
            let trailer = tail;
            let keep = Some(KeepRule::Highest(k));
            return finish_parse(rest, keep, trailer, dice_count);
        } else if let Some(kl_pos) = rest.find("kl") {
            let (die_str, after) = (&rest[..kl_pos], &rest[kl_pos + 2..]);
            let (k_str, tail) = split_on_modifier(after);
            let k: u8 = k_str
                .parse()
                .map_err(|_| DiceParseError::InvalidFormat(format!("bad keep count '{k_str}'")))?;
            rest = die_str;
            let trailer = tail;
            let keep = Some(KeepRule::Lowest(k));
            return finish_parse(rest, keep, trailer, dice_count);
        } else {
            None
        };

        finish_parse(rest, keep, "", dice_count)
    }

    pub fn roll(&self, random: &dyn RandomSource) -> DiceRollResult {
        let mut individual_rolls: Vec<i32> = (0..self.dice_count)
            .map(|_| random.gen_range(1, self.die_size as i32))
            .collect();

        let kept: Vec<i32> = match self.keep {
            None => individual_rolls.clone(),
            Some(KeepRule::Highest(k)) => {
                let mut sorted = individual_rolls.clone();
                sorted.sort_unstable_by(|a, b| b.cmp(a));
                sorted.into_iter().take(k as usize).collect()
            }
            Some(KeepRule::Lowest(k)) => {
                let mut sorted = individual_rolls.clone();
                sorted.sort_unstable();
                sorted.into_iter().take(k as usize).collect()
            }
        };
        individual_rolls.sort_unstable_by(|a, b| b.cmp(a));

        let dice_total: i32 = kept.iter().sum();
        let total = dice_total + self.modifier;

        DiceRollResult {
            formula: self.clone(),
            individual_rolls,
            dice_total,
            modifier_applied: self.modifier,
            total,
        }
    }

    pub fn min_roll(&self) -> i32 {
        let count = self.keep.map(keep_count).unwrap_or(self.dice_count) as i32;
        count + self.modifier
    }

    pub fn max_roll(&self) -> i32 {
        let count = self.keep.map(keep_count).unwrap_or(self.dice_count) as i32;
        count * self.die_size as i32 + self.modifier
    }

    /// Canonical rendering; parsing this string again yields an equal formula.
    pub fn display(&self) -> String {
        let mut s = format!("{}d{}", self.dice_count, self.die_size);
        match self.keep {
            Some(KeepRule::Highest(k)) => s.push_str(&format!("kh{k}")),
            Some(KeepRule::Lowest(k)) => s.push_str(&format!("kl{k}")),
            None => {}
        }
        if self.modifier > 0 {
            s.push_str(&format!("+{}", self.modifier));
        } else if self.modifier < 0 {
            s.push_str(&self.modifier.to_string());
        }
        s
    }

    /// Double the dice (not the modifier) for a critical hit: `"1d8+3"` -> `"2d8+3"`.
    pub fn doubled(&self) -> Self {
        Self {
            dice_count: self.dice_count.saturating_mul(2),
            die_size: self.die_size,
            keep: self.keep,
            modifier: self.modifier,
        }
    }
}

fn keep_count(rule: KeepRule) -> u8 {
    match rule {
        KeepRule::Highest(k) | KeepRule::Lowest(k) => k,
    }
}

fn split_on_modifier(s: &str) -> (&str, &str) {
    if let Some(p) = s.find('+') {
        (&s[..p], &s[p..])
    } else if let Some(p) = s.rfind('-') {
        if p == 0 {
            (s, "")
        } else {
            (&s[..p], &s[p..])
        }
    } else {
        (s, "")
    }
}

fn finish_parse(
    die_size_str: &str,
    keep: Option<KeepRule>,
    trailer: &str,
    dice_count: u8,
) -> Result<DiceFormula, DiceParseError> {
    let (die_str, modifier) = if let Some(rest) = trailer.strip_prefix('+') {
        let m: i32 = rest
            .parse()
            .map_err(|_| DiceParseError::InvalidFormat(format!("bad modifier '+{rest}'")))?;
        (die_size_str, m)
    } else if let Some(rest) = trailer.strip_prefix('-') {
        let m: i32 = rest
            .parse()
            .map_err(|_| DiceParseError::InvalidFormat(format!("bad modifier '-{rest}'")))?;
        (die_size_str, -m)
    } else if trailer.is_empty() {
        if let Some(plus_pos) = die_size_str.find('+') {
            let (d, m) = die_size_str.split_at(plus_pos);
            let modifier: i32 = m[1..]
                .parse()
                .map_err(|_| DiceParseError::InvalidFormat(format!("bad modifier '{m}'")))?;
            (d, modifier)
        } else if let Some(minus_pos) = die_size_str.rfind('-') {
            if minus_pos == 0 {
                (die_size_str, 0)
            } else {
                let (d, m) = die_size_str.split_at(minus_pos);
                let modifier: i32 = m
                    .parse()
                    .map_err(|_| DiceParseError::InvalidFormat(format!("bad modifier '{m}'")))?;
                (d, modifier)
            }
        } else {
            (die_size_str, 0)
        }
    } else {
        return Err(DiceParseError::InvalidFormat(trailer.to_string()));
    };

    let die_size: u8 = die_str
        .parse()
        .map_err(|_| DiceParseError::InvalidFormat(format!("bad die size '{die_str}'")))?;
    if die_size < 2 {
        return Err(DiceParseError::InvalidDieSize);
    }

    if let Some(rule) = keep {
        let k = keep_count(rule);
        if k == 0 || k > dice_count {
            return Err(DiceParseError::InvalidKeepCount);
        }
    }

    Ok(DiceFormula {
        dice_count,
        die_size,
        keep,
        modifier,
    })
}

impl std::fmt::Display for DiceFormula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRollResult {
    pub formula: DiceFormula,
    pub individual_rolls: Vec<i32>,
    pub dice_total: i32,
    pub modifier_applied: i32,
    pub total: i32,
}

impl DiceRollResult {
    pub fn is_natural_20(&self) -> bool {
        self.formula.die_size == 20
            && self.formula.dice_count == 1
            && self.individual_rolls.first() == Some(&20)
    }

    pub fn is_natural_1(&self) -> bool {
        self.formula.die_size == 20
            && self.formula.dice_count == 1
            && self.individual_rolls.first() == Some(&1)
    }
}

/// Roll `1d20 + modifier`.
pub fn roll_d20(modifier: i32, random: &dyn RandomSource) -> DiceRollResult {
    DiceFormula::new(1, 20, modifier)
        .expect("1d20 is always a valid formula")
        .roll(random)
}

/// Roll 1d20 twice, keep the higher.
pub fn roll_with_advantage(modifier: i32, random: &dyn RandomSource) -> DiceRollResult {
    let a = roll_d20(modifier, random);
    let b = roll_d20(modifier, random);
    if a.total >= b.total {
        a
    } else {
        b
    }
}

/// Roll 1d20 twice, keep the lower.
pub fn roll_with_disadvantage(modifier: i32, random: &dyn RandomSource) -> DiceRollResult {
    let a = roll_d20(modifier, random);
    let b = roll_d20(modifier, random);
    if a.total <= b.total {
        a
    } else {
        b
    }
}

/// Resolve an advantage/disadvantage pair the way every d20 roll in this system
/// does: both flags set cancels out to a straight roll.
pub fn roll_d20_resolved(
    modifier: i32,
    advantage: bool,
    disadvantage: bool,
    random: &dyn RandomSource,
) -> DiceRollResult {
    match (advantage, disadvantage) {
        (true, false) => roll_with_advantage(modifier, random),
        (false, true) => roll_with_disadvantage(modifier, random),
        _ => roll_d20(modifier, random),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StepRandom(std::cell::RefCell<Vec<i32>>);
    impl RandomSource for StepRandom {
        fn gen_range(&self, _min: i32, _max: i32) -> i32 {
            self.0.borrow_mut().remove(0)
        }
        fn gen_probability(&self) -> f64 {
            0.0
        }
    }

    #[test]
    fn parse_simple() {
        let f = DiceFormula::parse("1d20").unwrap();
        assert_eq!(f, DiceFormula::new(1, 20, 0).unwrap());
    }

    #[test]
    fn parse_shorthand() {
        let f = DiceFormula::parse("d20").unwrap();
        assert_eq!(f.dice_count, 1);
    }

    #[test]
    fn parse_with_modifier() {
        let f = DiceFormula::parse("2d6+3").unwrap();
        assert_eq!(f.dice_count, 2);
        assert_eq!(f.die_size, 6);
        assert_eq!(f.modifier, 3);
    }

    #[test]
    fn parse_negative_modifier() {
        let f = DiceFormula::parse("1d20-3").unwrap();
        assert_eq!(f.modifier, -3);
    }

    #[test]
    fn parse_keep_highest() {
        let f = DiceFormula::parse("4d6kh3").unwrap();
        assert_eq!(f.keep, Some(KeepRule::Highest(3)));
    }

    #[test]
    fn parse_keep_lowest_with_modifier() {
        let f = DiceFormula::parse("2d20kl1+5").unwrap();
        assert_eq!(f.keep, Some(KeepRule::Lowest(1)));
        assert_eq!(f.modifier, 5);
    }

    #[test]
    fn parse_empty_is_error() {
        assert_eq!(DiceFormula::parse(""), Err(DiceParseError::Empty));
    }

    #[test]
    fn parse_zero_dice_is_error() {
        assert_eq!(DiceFormula::parse("0d20"), Err(DiceParseError::InvalidDiceCount));
    }

    #[test]
    fn roundtrip_display_then_reparse() {
        for s in ["1d20", "2d6+3", "1d20-3", "4d6kh3", "2d20kl1+5"] {
            let f = DiceFormula::parse(s).unwrap();
            let rendered = f.display();
            let reparsed = DiceFormula::parse(&rendered).unwrap();
            assert_eq!(f, reparsed);
        }
    }

    #[test]
    fn keep_highest_takes_largest_rolls() {
        let f = DiceFormula::parse("4d6kh3").unwrap();
        let rng = StepRandom(std::cell::RefCell::new(vec![1, 2, 3, 6]));
        let result = f.roll(&rng);
        assert_eq!(result.dice_total, 2 + 3 + 6);
    }

    #[test]
    fn doubled_doubles_dice_not_modifier() {
        let f = DiceFormula::new(1, 8, 3).unwrap();
        let d = f.doubled();
        assert_eq!(d.dice_count, 2);
        assert_eq!(d.modifier, 3);
    }

    #[test]
    fn natural_20_and_1_detection() {
        let rng20 = StepRandom(std::cell::RefCell::new(vec![20]));
        let result = roll_d20(5, &rng20);
        assert!(result.is_natural_20());

        let rng1 = StepRandom(std::cell::RefCell::new(vec![1]));
        let result = roll_d20(5, &rng1);
        assert!(result.is_natural_1());
    }

    #[test]
    fn advantage_disadvantage_cancel_to_straight_roll() {
        let rng = StepRandom(std::cell::RefCell::new(vec![10]));
        let r = roll_d20_resolved(0, true, true, &rng);
        assert_eq!(r.total, 10);
    }
}
