//! Генерация slug для публичной ссылки на событие.
//!
//! Slug = нормализованный заголовок + `-` + случайный суффикс из
//! [`SUFFIX_LEN`] символов `[a-z0-9]`. Источник случайности передаётся
//! явно, с фиксированным seed генерация полностью воспроизводима.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use tracing::{error, warn};

use crate::error::{CoreError, CoreResult};
use crate::store::EventStore;

pub const DEFAULT_BASE: &str = "event";
pub const SUFFIX_LEN: usize = 6;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;
const MAX_BASE_LEN: usize = 60;
const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Нижний регистр, ASCII буквы и цифры, остальное схлопывается в один `-`.
/// Пустой результат заменяется на [`DEFAULT_BASE`].
pub fn slugify(title: &str) -> String {
    let mut base = String::with_capacity(title.len());
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            base.push(ch.to_ascii_lowercase());
        } else if !base.is_empty() && !base.ends_with('-') {
            base.push('-');
        }
    }

    if base.len() > MAX_BASE_LEN {
        base.truncate(MAX_BASE_LEN);
    }
    let base = base.trim_end_matches('-');

    if base.is_empty() {
        DEFAULT_BASE.to_string()
    } else {
        base.to_string()
    }
}

pub struct SlugGenerator {
    rng: Mutex<StdRng>,
    max_attempts: u32,
}

impl SlugGenerator {
    pub fn new(rng: StdRng, max_attempts: u32) -> Self {
        Self {
            rng: Mutex::new(rng),
            max_attempts: max_attempts.max(1),
        }
    }

    /// `Some(seed)` - детерминированная последовательность, `None` - seed из ОС.
    pub fn from_seed(seed: Option<u64>, max_attempts: u32) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(rng, max_attempts)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    fn suffix(&self) -> String {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        (0..SUFFIX_LEN)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
            .collect()
    }

    /// Кандидат без проверки уникальности.
    pub fn candidate(&self, title: &str) -> String {
        format!("{}-{}", slugify(title), self.suffix())
    }

    /// Перебирает суффиксы, пока slug не окажется свободным. Исчерпание
    /// попыток при такой энтропии означает неисправность, а не ошибку клиента.
    pub async fn generate_unique(&self, events: &dyn EventStore, title: &str) -> CoreResult<String> {
        for attempt in 1..=self.max_attempts {
            let slug = self.candidate(title);
            if !events.slug_exists(&slug).await? {
                return Ok(slug);
            }
            warn!(slug = %slug, attempt, "slug collision, drawing a new suffix");
        }

        error!(title = %title, attempts = self.max_attempts, "slug generation exhausted its retry budget");
        Err(CoreError::Internal(format!(
            "no free slug after {} attempts",
            self.max_attempts
        )))
    }
}
