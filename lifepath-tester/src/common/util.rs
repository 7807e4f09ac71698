use chrono::Utc;

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Wall-clock entropy for journeys started without an explicit seed.
pub fn entropy_seed() -> u64 {
    let now = Utc::now();
    let nanos = now.timestamp_nanos_opt().unwrap_or_else(|| now.timestamp_millis());
    nanos.unsigned_abs() ^ u64::from(std::process::id()).rotate_left(32)
}
