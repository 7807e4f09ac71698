use anyhow::{Context, Result, bail};
use lifepath_game::seed::WORD_LIST;
use lifepath_game::{Philosopher, decode_journey_code};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Default seed when nothing usable was passed.
pub const DEFAULT_SEED: u64 = 1337;

/// Seed metadata for automated runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedInfo {
    pub seed: u64,
    pub code: Option<String>,
    /// Philosopher fixed by a journey code.
    pub philosopher: Option<Philosopher>,
}

impl SeedInfo {
    #[must_use]
    pub const fn from_numeric(seed: u64) -> Self {
        Self {
            seed,
            code: None,
            philosopher: None,
        }
    }

    #[must_use]
    pub const fn from_journey_code(seed: u64, philosopher: Philosopher, code: String) -> Self {
        Self {
            seed,
            code: Some(code),
            philosopher: Some(philosopher),
        }
    }

    /// Label used in reports: the journey code when there is one.
    #[must_use]
    pub fn label(&self) -> String {
        self.code
            .clone()
            .unwrap_or_else(|| self.seed.to_string())
    }
}

fn looks_like_journey_code(token: &str) -> bool {
    static SHAPE: OnceLock<Option<Regex>> = OnceLock::new();
    SHAPE
        .get_or_init(|| Regex::new(r"^(?i)[a-z]{2}-[a-z]+\d{2}$").ok())
        .as_ref()
        .is_some_and(|shape| shape.is_match(token))
}

/// Resolve CLI seed arguments into canonical seed metadata.
///
/// Supports literal integers, journey codes, and `all`, which expands to every
/// journey code for every philosopher.
///
/// # Errors
///
/// Returns an error for a token that is neither a number nor a valid journey code.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<SeedInfo>> {
    let mut pending: Vec<SeedInfo> = Vec::new();
    let mut request_all = false;

    for token in tokens.iter().map(|t| t.trim()) {
        if token.is_empty() {
            continue;
        }

        if token.eq_ignore_ascii_case("all") {
            request_all = true;
            continue;
        }

        if let Ok(value) = token.parse::<i64>() {
            pending.push(SeedInfo::from_numeric(value.unsigned_abs()));
            continue;
        }

        if let Ok(value) = token.parse::<u64>() {
            pending.push(SeedInfo::from_numeric(value));
            continue;
        }

        if looks_like_journey_code(token)
            && let Some((philosopher, seed)) = decode_journey_code(token)
        {
            pending.push(SeedInfo::from_journey_code(
                seed,
                philosopher,
                token.to_ascii_uppercase(),
            ));
            continue;
        }

        bail!("Unrecognized seed token: {token}");
    }

    if request_all {
        pending.extend(generate_all_journey_seeds()?);
    }

    let mut deduped: Vec<SeedInfo> = Vec::new();
    let mut index: HashMap<(u64, Option<Philosopher>), usize> = HashMap::new();

    for info in pending {
        let key = (info.seed, info.philosopher);
        if let Some(&existing) = index.get(&key) {
            if let Some(entry) = deduped.get_mut(existing)
                && entry.code.is_none()
                && info.code.is_some()
            {
                *entry = info;
            }
        } else {
            index.insert(key, deduped.len());
            deduped.push(info);
        }
    }

    if deduped.is_empty() {
        deduped.push(SeedInfo::from_numeric(DEFAULT_SEED));
    }

    Ok(deduped)
}

fn generate_all_journey_seeds() -> Result<Vec<SeedInfo>> {
    let mut seeds = Vec::with_capacity(Philosopher::ALL.len() * WORD_LIST.len() * 100);

    for philosopher in Philosopher::ALL {
        for word in WORD_LIST {
            for suffix in 0..100 {
                let code = format!("{}-{word}{suffix:02}", philosopher.code_tag());
                let (decoded, seed) = decode_journey_code(&code)
                    .with_context(|| format!("failed to decode journey code: {code}"))?;
                seeds.push(SeedInfo::from_journey_code(seed, decoded, code));
            }
        }
    }

    Ok(seeds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_numeric_and_journey_code() {
        let raw = vec![
            "42".to_string(),
            "-7".to_string(),
            "kz-lotus42".to_string(),
        ];
        let seeds = resolve_seed_inputs(&raw).unwrap();
        assert!(seeds.iter().any(|s| s.seed == 42 && s.code.is_none()));
        assert!(seeds.iter().any(|s| s.seed == 7 && s.philosopher.is_none()));
        assert!(seeds.iter().any(|s| {
            s.code.as_deref() == Some("KZ-LOTUS42") && s.philosopher == Some(Philosopher::Kongzi)
        }));
    }

    #[test]
    fn rejects_garbage_tokens() {
        let err = resolve_seed_inputs(&["XX-LOTUS42".to_string()]).unwrap_err();
        assert_eq!(err.to_string(), "Unrecognized seed token: XX-LOTUS42");
        assert!(resolve_seed_inputs(&["banana".to_string()]).is_err());
    }

    #[test]
    fn dedupes_and_defaults() {
        let seeds = resolve_seed_inputs(&["5".to_string(), "5".to_string()]).unwrap();
        assert_eq!(seeds, vec![SeedInfo::from_numeric(5)]);
        let seeds = resolve_seed_inputs(&[String::new()]).unwrap();
        assert_eq!(seeds, vec![SeedInfo::from_numeric(DEFAULT_SEED)]);
    }

    #[test]
    fn expands_all_journey_codes() {
        let seeds = resolve_seed_inputs(&["all".to_string()]).unwrap();
        assert_eq!(seeds.len(), Philosopher::ALL.len() * WORD_LIST.len() * 100);
        assert!(seeds.iter().all(|s| s.code.is_some()));
        assert_eq!(seeds[0].label(), "KZ-LOTUS00");
    }
}
