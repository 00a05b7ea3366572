//! Startup seeding of residency listings.
//!
//! The seed file is a JSON array of create payloads. Seeding only runs
//! against an empty residency table; entries that fail validation are logged
//! and skipped.

use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::ResidencyDraft;
use crate::domain::ports::{ResidencyCommand, ResidencyRepository, ResidencyRepositoryError};

/// Errors returned while executing startup seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Seed file could not be read.
    #[error("failed to read seed file at {path}: {source}")]
    Read {
        /// Seed file location.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// Seed file is not a JSON array.
    #[error("seed file at {path} is not a JSON array: {source}")]
    Parse {
        /// Seed file location.
        path: PathBuf,
        /// Parser failure.
        #[source]
        source: serde_json::Error,
    },
    /// The existing listing count could not be read.
    #[error("failed to count residencies: {0}")]
    Count(#[from] ResidencyRepositoryError),
}

/// Outcome of a seeding run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The table already held listings.
    AlreadySeeded {
        /// Listings found before seeding.
        existing: u64,
    },
    /// Entries were processed.
    Applied {
        /// Entries stored.
        inserted: usize,
        /// Entries rejected by validation or uniqueness.
        skipped: usize,
    },
}

/// Load `path` into an empty residency store.
///
/// # Examples
///
/// ```rust,no_run
/// use std::path::Path;
/// use std::sync::Arc;
///
/// use mockable::DefaultClock;
/// use rental_backend::domain::ResidencyService;
/// use rental_backend::outbound::persistence::{DbPool, DieselResidencyRepository, DieselUserRepository};
/// use rental_backend::seed::seed_residencies;
///
/// # async fn run(pool: DbPool) -> Result<(), Box<dyn std::error::Error>> {
/// let residencies = Arc::new(DieselResidencyRepository::new(pool.clone()));
/// let users = Arc::new(DieselUserRepository::new(pool));
/// let service = ResidencyService::new(residencies.clone(), users, Arc::new(DefaultClock));
/// seed_residencies(Path::new("residencies.json"), residencies.as_ref(), &service).await?;
/// # Ok(())
/// # }
/// ```
pub async fn seed_residencies<R>(
    path: &Path,
    repository: &R,
    command: &dyn ResidencyCommand,
) -> Result<SeedOutcome, SeedError>
where
    R: ResidencyRepository + ?Sized,
{
    let existing = repository.count().await?;
    if existing > 0 {
        info!(existing, "residencies already present; seeding skipped");
        return Ok(SeedOutcome::AlreadySeeded { existing });
    }

    let drafts = load_seed_file(path)?;
    let total = drafts.len();
    let mut inserted = 0;
    for (index, draft) in drafts.into_iter().enumerate() {
        match command.create(draft).await {
            Ok(residency) => {
                inserted += 1;
                info!(id = %residency.id, title = %residency.title, "seeded residency");
            }
            Err(error) => {
                warn!(index, code = ?error.code(), message = %error.message(), "skipping seed entry");
            }
        }
    }

    let skipped = total - inserted;
    info!(inserted, skipped, path = %path.display(), "residency seeding applied");
    Ok(SeedOutcome::Applied { inserted, skipped })
}

fn load_seed_file(path: &Path) -> Result<Vec<ResidencyDraft>, SeedError> {
    let read_error = |source| SeedError::Read {
        path: path.to_path_buf(),
        source,
    };
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path.file_name().ok_or_else(|| {
        read_error(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "seed path must be a file",
        ))
    })?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(read_error)?;
    let payload = dir.read(Path::new(file_name)).map_err(read_error)?;
    serde_json::from_slice(&payload).map_err(|source| SeedError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
