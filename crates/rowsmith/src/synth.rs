use chrono::Utc;
use rand::{Rng, RngCore};
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

use rowsmith_core::{Column, ColumnKind, SeededColumn, SynthesisOptions, UniqueConstraint, Value};

// Alphabetical characters with duplicates approximating English letter
// frequency, plus a few non-ASCII letters mixed in at a low rate.
const WORD_CHARS: &str = "aabcdeeeefghhijklmmnnoopqrrsstttuvwxyz";
const ACCENT_CHARS: &str = "øüéà";

// Strings longer than this are broken into words and capitalized.
const MULTIWORD_LEN: usize = 30;

const DEFAULT_TEXT_LEN: usize = 90;
const MAX_UNIQUE_ATTEMPTS: u32 = 128;
const MAX_BINARY_FILL: u64 = 64;

/// Produce a value for one non-foreign-key column.
///
/// Precedence: explicit override, then collision avoidance for a seeded
/// unique column, then column-name heuristics, then type defaults.
pub(crate) fn synthesize(
    column: &Column,
    uniques: &mut [UniqueConstraint],
    options: &SynthesisOptions,
    rng: &mut ChaCha8Rng,
) -> Value {
    if let Some(value) = options.column_value(&column.name) {
        return value.clone();
    }

    if let Some(seeded) = uniques.iter_mut().find_map(|unique| {
        unique
            .seeded
            .as_mut()
            .filter(|seeded| seeded.column.eq_ignore_ascii_case(&column.name))
    }) {
        return distinct_value(column, seeded, rng);
    }

    if let Some(value) = heuristic_value(column, options, rng) {
        return value;
    }

    default_value(column, rng)
}

/// A value distinct from everything already stored in the seeded column.
///
/// Retries with perturbation; when the attempt budget runs out the last
/// candidate is returned and the engine's own constraint reports the
/// collision.
fn distinct_value(column: &Column, seeded: &mut SeededColumn, rng: &mut ChaCha8Rng) -> Value {
    let mut attempt = 0_u32;
    loop {
        let candidate = unique_candidate(column, rng, attempt);
        let key = candidate.collision_key();
        if !seeded.existing.contains(&key) || attempt >= MAX_UNIQUE_ATTEMPTS {
            seeded.existing.insert(key);
            return candidate;
        }
        attempt += 1;
    }
}

fn unique_candidate(column: &Column, rng: &mut ChaCha8Rng, attempt: u32) -> Value {
    match column.kind {
        ColumnKind::Integer | ColumnKind::Flag => {
            let bound = 100_i64 << attempt.min(24);
            Value::Int(rng.random_range(0..bound))
        }
        ColumnKind::FixedChar => {
            let len = column.max_length.unwrap_or(1) as usize;
            Value::Text(random_text_exact(len, rng, false))
        }
        _ => {
            let max = text_budget(column);
            let mut text = random_text_up_to(max, rng, false);
            if attempt > 0 {
                append_within(&mut text, &attempt.to_string(), max);
            }
            Value::Text(text)
        }
    }
}

fn append_within(text: &mut String, suffix: &str, max: usize) {
    while text.chars().count() + suffix.len() > max {
        if text.pop().is_none() {
            return;
        }
    }
    text.push_str(suffix);
}

fn heuristic_value(
    column: &Column,
    options: &SynthesisOptions,
    rng: &mut ChaCha8Rng,
) -> Option<Value> {
    let name = column.name.to_lowercase();
    match column.kind {
        ColumnKind::Integer => {
            if name.contains("amount") {
                Some(Value::Int(rng.random_range(500..10000)))
            } else if name.contains("month") {
                Some(Value::Int(rng.random_range(1..13)))
            } else if name.contains("year") {
                Some(Value::Int(rng.random_range(2017..2038)))
            } else {
                None
            }
        }
        ColumnKind::Text | ColumnKind::FixedChar => {
            let value = if name.contains("country") {
                "US".to_string()
            } else if name.contains("currency") {
                "USD".to_string()
            } else if name.contains("culture") {
                "en-US".to_string()
            } else if name.contains("email") {
                format!(
                    "{}{}",
                    random_text_exact(20, rng, false),
                    options.default_email_domain
                )
            } else if name.contains("guid") {
                random_uuid(rng).to_string()
            } else if name.contains("url") || name.contains("link") {
                options.default_url.clone()
            } else if name.contains("iban") {
                "DK5000400440116243".to_string()
            } else {
                return None;
            };
            Some(Value::Text(clamp_text(value, column)))
        }
        _ => None,
    }
}

fn default_value(column: &Column, rng: &mut ChaCha8Rng) -> Value {
    match column.kind {
        ColumnKind::Integer => {
            if column.is_primary_key && !column.is_auto_generated {
                Value::Int(rng.random_range(1..i64::from(i32::MAX)))
            } else {
                Value::Int(rng.random_range(0..100))
            }
        }
        ColumnKind::Text => {
            if column.is_primary_key && !column.is_auto_generated {
                Value::Text(clamp_text(random_uuid(rng).to_string(), column))
            } else {
                Value::Text(random_text_up_to(text_budget(column), rng, true))
            }
        }
        ColumnKind::FixedChar => {
            let len = column.max_length.unwrap_or(1) as usize;
            if column.is_primary_key && !column.is_auto_generated {
                let mut id = random_uuid(rng).to_string();
                if id.len() < len {
                    let fill = random_text_exact(len - id.len(), rng, false);
                    id.push_str(&fill);
                }
                id.truncate(len);
                Value::Text(id)
            } else {
                Value::Text(random_text_exact(len, rng, false))
            }
        }
        ColumnKind::Temporal => match column.data_type.as_str() {
            "date" => Value::Date(Utc::now().date_naive()),
            "time" => Value::Time(Utc::now().naive_utc().time()),
            _ => Value::DateTime(Utc::now().naive_utc()),
        },
        ColumnKind::Binary => match column.max_length {
            Some(16) => Value::Bytes(random_uuid(rng).into_bytes().to_vec()),
            length => {
                let len = length.unwrap_or(16).min(MAX_BINARY_FILL) as usize;
                Value::Bytes(vec![0; len])
            }
        },
        ColumnKind::Flag => Value::Int(rng.random_range(0..2)),
        ColumnKind::Json => Value::Json(serde_json::json!({})),
    }
}

fn text_budget(column: &Column) -> usize {
    match column.max_length {
        Some(max) if max < 200 => max as usize,
        _ => DEFAULT_TEXT_LEN,
    }
}

fn clamp_text(value: String, column: &Column) -> String {
    match column.max_length {
        Some(max) if (value.chars().count() as u64) > max => {
            value.chars().take(max as usize).collect()
        }
        _ => value,
    }
}

/// A random string of some length in `max/2..max`.
fn random_text_up_to(max: usize, rng: &mut ChaCha8Rng, allow_whitespace: bool) -> String {
    let len = if max <= 1 {
        max
    } else {
        rng.random_range(max / 2..max)
    };
    random_text_exact(len, rng, allow_whitespace)
}

/// A random pseudo-word (or pseudo-sentence, when whitespace is allowed
/// and the string is long enough) of exactly `len` characters.
fn random_text_exact(len: usize, rng: &mut ChaCha8Rng, allow_whitespace: bool) -> String {
    let letters: Vec<char> = WORD_CHARS.chars().collect();
    let accents: Vec<char> = ACCENT_CHARS.chars().collect();

    let mut out = String::with_capacity(len);
    let mut prev_space = false;
    for i in 0..len {
        let want_space = allow_whitespace
            && i > 0
            && i < len.saturating_sub(2)
            && !prev_space
            && (rng.random_range(0..20) >= 15 || i % MULTIWORD_LEN == 0);
        if want_space {
            prev_space = true;
            out.push(' ');
            continue;
        }

        let special = rng.random_range(0..100) > 97;
        let mut ch = if special {
            accents[rng.random_range(0..accents.len())]
        } else {
            letters[rng.random_range(0..letters.len())]
        };

        if i == 0 && len > MULTIWORD_LEN {
            ch = ch.to_uppercase().next().unwrap_or(ch);
        }

        prev_space = false;
        out.push(ch);
    }
    out
}

/// A fresh identifier drawn from the resolution RNG, with RFC 4122
/// version and variant bits set.
pub(crate) fn random_uuid(rng: &mut ChaCha8Rng) -> Uuid {
    let mut bytes = [0_u8; 16];
    rng.fill_bytes(&mut bytes);
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;
    Uuid::from_bytes(bytes)
}
