/// Lowercases and strips everything but ASCII alphanumerics and dots, so that
/// `Files.List` and `files.list` compare equal while segment boundaries stay.
fn normalize_name(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '.')
        .collect()
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

fn score(input: &str, candidate: &str) -> Option<usize> {
    let a = normalize_name(input);
    let b = normalize_name(candidate);
    if a.is_empty() || b.is_empty() {
        return None;
    }
    if a == b {
        return Some(0);
    }
    // A matching last segment ("list" vs "files.list") is a strong signal.
    let tail_a = a.rsplit('.').next().unwrap_or(&a);
    let tail_b = b.rsplit('.').next().unwrap_or(&b);
    if a.ends_with(&b) || b.ends_with(&a) {
        return Some(1);
    }
    let distance = levenshtein(&a, &b);
    if tail_a == tail_b {
        return Some(distance.min(2));
    }
    Some(distance)
}

fn max_distance(input: &str) -> usize {
    let len = normalize_name(input).len();
    match len {
        0 => 0,
        1..=4 => 1,
        5..=8 => 2,
        _ => ((len as f32) * 0.35).floor().max(3.0) as usize,
    }
}

/// Ranks `candidates` by closeness to `input`, best first.
pub fn suggest(input: &str, candidates: &[String], limit: usize) -> Vec<String> {
    if input.trim().is_empty() || candidates.is_empty() {
        return Vec::new();
    }
    let allowed = max_distance(input);
    let mut scored: Vec<(&String, usize)> = candidates
        .iter()
        .filter_map(|candidate| {
            score(input, candidate)
                .filter(|s| *s <= allowed)
                .map(|s| (candidate, s))
        })
        .collect();
    scored.sort_by(|a, b| {
        a.1.cmp(&b.1)
            .then_with(|| a.0.len().cmp(&b.0.len()))
            .then_with(|| a.0.cmp(b.0))
    });

    let mut out: Vec<String> = Vec::new();
    for (candidate, _) in scored {
        if out.contains(candidate) {
            continue;
        }
        out.push(candidate.clone());
        if out.len() >= limit.max(1) {
            break;
        }
    }
    out
}
