//! Random password generation.

use rand::{Rng, rngs::OsRng, seq::SliceRandom};
use zeroize::Zeroizing;

use crate::error::GeneratorError;

pub const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
pub const NUMBERS: &str = "0123456789";
pub const SYMBOLS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

pub const MIN_LENGTH: usize = 8;
pub const MAX_LENGTH: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub length: usize,
    pub uppercase: bool,
    pub lowercase: bool,
    pub numbers: bool,
    pub symbols: bool,
    /// Characters that must never appear in the output.
    pub exclude: String,
    /// Forbid two equal adjacent characters.
    pub no_repeating: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            length: 16,
            uppercase: true,
            lowercase: true,
            numbers: true,
            symbols: true,
            exclude: String::new(),
            no_repeating: true,
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<(), GeneratorError> {
        if !(MIN_LENGTH..=MAX_LENGTH).contains(&self.length) {
            return Err(GeneratorError::InvalidLength {
                min: MIN_LENGTH,
                max: MAX_LENGTH,
                actual: self.length,
            });
        }
        if self.selected_sets().is_empty() {
            return Err(GeneratorError::NoCharacterSets);
        }
        Ok(())
    }

    fn selected_sets(&self) -> Vec<&'static str> {
        [
            (self.uppercase, UPPERCASE),
            (self.lowercase, LOWERCASE),
            (self.numbers, NUMBERS),
            (self.symbols, SYMBOLS),
        ]
        .into_iter()
        .filter_map(|(on, set)| on.then_some(set))
        .collect()
    }

    /// Selected sets with excluded characters removed; fully excluded sets are dropped.
    fn groups(&self) -> Vec<Vec<u8>> {
        self.selected_sets()
            .into_iter()
            .map(|set| {
                set.bytes()
                    .filter(|b| !self.exclude.as_bytes().contains(b))
                    .collect::<Vec<u8>>()
            })
            .filter(|group| !group.is_empty())
            .collect()
    }
}

/// Generate a password according to `config`.
///
/// Every selected character set that still has characters after exclusions
/// contributes at least one character; the rest are drawn uniformly from the
/// combined pool and the result is shuffled.
pub fn generate_password(config: &GeneratorConfig) -> Result<Zeroizing<String>, GeneratorError> {
    config.validate()?;

    let groups = config.groups();
    let pool = groups.concat();
    if pool.is_empty() {
        return Err(GeneratorError::EmptyCharacterPool);
    }
    if config.no_repeating && pool.len() < 2 {
        return Err(GeneratorError::RepeatsUnavoidable);
    }

    let mut rng = OsRng;
    let mut password = Zeroizing::new(Vec::with_capacity(config.length));

    for group in &groups {
        password.push(pick(group, &mut rng));
    }
    while password.len() < config.length {
        password.push(pick(&pool, &mut rng));
    }

    password.shuffle(&mut rng);

    if config.no_repeating {
        break_repeats(&mut password, &pool, &mut rng);
    }

    Ok(Zeroizing::new(password.iter().map(|&b| char::from(b)).collect()))
}

fn pick<R: Rng>(chars: &[u8], rng: &mut R) -> u8 {
    chars[rng.gen_range(0..chars.len())]
}

/// Replaces every character equal to its left neighbour.
///
/// The replaced character survives in the left neighbour, so set coverage is
/// kept. Requires a pool of at least two characters.
fn break_repeats<R: Rng>(password: &mut [u8], pool: &[u8], rng: &mut R) {
    for i in 1..password.len() {
        if password[i] != password[i - 1] {
            continue;
        }

        let prev = password[i - 1];
        let next = password.get(i + 1).copied();

        let both: Vec<u8> = pool
            .iter()
            .copied()
            .filter(|&c| c != prev && Some(c) != next)
            .collect();
        let candidates = if both.is_empty() {
            pool.iter().copied().filter(|&c| c != prev).collect::<Vec<u8>>()
        } else {
            both
        };

        password[i] = pick(&candidates, rng);
    }
}
