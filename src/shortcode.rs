//! Random public short urls.
//!
//! Codes are `SHORT_URL_LEN` characters drawn uniformly from
//! `SHORT_URL_ALPHABET`. Uniqueness is checked against the owning table and
//! generation gives up after `MAX_SHORT_URL_ATTEMPTS` collisions.

use rand::Rng;
use std::future::Future;

use crate::constants::{MAX_SHORT_URL_ATTEMPTS, SHORT_URL_ALPHABET, SHORT_URL_LEN};
use crate::db::Db;
use crate::error::{AppError, Result};

/// Tables that carry a unique `url` column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortUrlTable {
    Notes,
}

impl ShortUrlTable {
    fn exists_query(self) -> &'static str {
        match self {
            ShortUrlTable::Notes => "SELECT 1 FROM notes WHERE url = ? LIMIT 1",
        }
    }
}

/// Draw one candidate code
pub fn random_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..SHORT_URL_LEN)
        .map(|_| SHORT_URL_ALPHABET[rng.gen_range(0..SHORT_URL_ALPHABET.len())] as char)
        .collect()
}

/// Generate codes until `is_taken` reports a free one
pub async fn generate_unique<F, Fut>(mut is_taken: F) -> Result<String>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    for attempt in 1..=MAX_SHORT_URL_ATTEMPTS {
        let code = random_code(&mut rand::thread_rng());
        if !is_taken(code.clone()).await? {
            return Ok(code);
        }
        tracing::warn!("Short url collision on attempt {}: {}", attempt, code);
    }

    Err(AppError::ShortUrlExhausted(MAX_SHORT_URL_ATTEMPTS))
}

/// Generate a url not yet used by any row of `table`
pub async fn generate_url(db: &Db, table: ShortUrlTable) -> Result<String> {
    let query = table.exists_query();
    generate_unique(|code| async move {
        let row = sqlx::query(query).bind(code).fetch_optional(db).await?;
        Ok::<_, AppError>(row.is_some())
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn in_alphabet(code: &str) -> bool {
        code.bytes().all(|b| SHORT_URL_ALPHABET.contains(&b))
    }

    #[test]
    fn test_alphabet_is_alphanumeric() {
        assert_eq!(SHORT_URL_ALPHABET.len(), 62);
        assert!(SHORT_URL_ALPHABET.iter().all(|b| b.is_ascii_alphanumeric()));
        let distinct: HashSet<_> = SHORT_URL_ALPHABET.iter().collect();
        assert_eq!(distinct.len(), 62);
    }

    #[test]
    fn test_random_code_shape() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let code = random_code(&mut rng);
            assert_eq!(code.len(), SHORT_URL_LEN);
            assert!(in_alphabet(&code));
        }
    }

    #[test]
    fn test_random_code_covers_alphabet() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = HashSet::new();
        for _ in 0..1000 {
            seen.extend(random_code(&mut rng).bytes());
        }
        assert_eq!(seen.len(), 62);
    }

    #[tokio::test]
    async fn test_generate_unique_never_repeats() {
        let mut issued = HashSet::new();
        for _ in 0..1000 {
            let code = generate_unique(|c| {
                let taken = issued.contains(&c);
                async move { Ok::<_, AppError>(taken) }
            })
            .await
            .unwrap();
            assert!(issued.insert(code));
        }
        assert_eq!(issued.len(), 1000);
    }

    #[tokio::test]
    async fn test_generate_unique_retries_on_collision() {
        let mut calls = 0;
        let code = generate_unique(|_| {
            calls += 1;
            let taken = calls < 3;
            async move { Ok::<_, AppError>(taken) }
        })
        .await
        .unwrap();

        assert_eq!(calls, 3);
        assert_eq!(code.len(), SHORT_URL_LEN);
    }

    #[tokio::test]
    async fn test_generate_unique_gives_up() {
        let mut calls = 0;
        let result = generate_unique(|_| {
            calls += 1;
            async { Ok::<_, AppError>(true) }
        })
        .await;

        assert!(matches!(
            result,
            Err(AppError::ShortUrlExhausted(MAX_SHORT_URL_ATTEMPTS))
        ));
        assert_eq!(calls, MAX_SHORT_URL_ATTEMPTS);
    }

    #[tokio::test]
    async fn test_generate_unique_propagates_errors() {
        let result = generate_unique(|_| async { Err::<bool, _>(AppError::NotLoggedIn) }).await;
        assert!(matches!(result, Err(AppError::NotLoggedIn)));
    }
}
