//! In-process adapter implementing both repository ports.
//!
//! Single-process and non-durable: state lives behind one mutex and is lost
//! when the store is dropped. It backs handler and service tests and is never
//! wired into the production server.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    ResidencyRepository, ResidencyRepositoryError, UserRepository, UserRepositoryError,
};
use crate::domain::{
    Booking, EmailAddress, EnsuredUser, FavouriteToggle, NewResidency, ProfileUpdate, Residency,
    ResidencyId, User,
};

#[derive(Debug, Default)]
struct State {
    residencies: Vec<Residency>,
    users: BTreeMap<EmailAddress, User>,
}

/// Mutex-guarded store for residencies and users.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, String> {
        self.state
            .lock()
            .map_err(|_| "in-memory store lock poisoned".to_owned())
    }
}

#[async_trait]
impl ResidencyRepository for InMemoryStore {
    async fn insert(
        &self,
        residency: &NewResidency,
        created_at: DateTime<Utc>,
    ) -> Result<Residency, ResidencyRepositoryError> {
        let mut state = self.lock().map_err(ResidencyRepositoryError::query)?;
        let duplicate = !residency.address.is_empty()
            && state.residencies.iter().any(|existing| {
                existing.address == residency.address
                    && existing.owner_email == residency.owner_email
            });
        if duplicate {
            return Err(ResidencyRepositoryError::duplicate(
                "residencies_address_owner_key",
            ));
        }

        let stored = Residency {
            id: ResidencyId::random(),
            title: residency.title.clone(),
            description: residency.description.clone(),
            price: residency.price,
            address: residency.address.clone(),
            city: residency.city.clone(),
            country: residency.country.clone(),
            image: residency.image.clone(),
            facilities: residency.facilities.clone(),
            owner_email: residency.owner_email.clone(),
            created_at,
            updated_at: created_at,
        };
        state.residencies.push(stored.clone());
        Ok(stored)
    }

    async fn list_newest_first(&self) -> Result<Vec<Residency>, ResidencyRepositoryError> {
        let state = self.lock().map_err(ResidencyRepositoryError::query)?;
        let mut listed: Vec<Residency> = state.residencies.iter().rev().cloned().collect();
        // Stable sort keeps later inserts first among equal timestamps.
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(listed)
    }

    async fn find_by_id(
        &self,
        id: &ResidencyId,
    ) -> Result<Option<Residency>, ResidencyRepositoryError> {
        let state = self.lock().map_err(ResidencyRepositoryError::query)?;
        Ok(state
            .residencies
            .iter()
            .find(|residency| &residency.id == id)
            .cloned())
    }

    async fn count(&self) -> Result<u64, ResidencyRepositoryError> {
        let state = self.lock().map_err(ResidencyRepositoryError::query)?;
        Ok(state.residencies.len() as u64)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn ensure(&self, email: &EmailAddress) -> Result<EnsuredUser, UserRepositoryError> {
        let mut state = self.lock().map_err(UserRepositoryError::query)?;
        let created = !state.users.contains_key(email);
        let user = state
            .users
            .entry(email.clone())
            .or_insert_with(|| User::stub(email.clone()))
            .clone();
        Ok(EnsuredUser { user, created })
    }

    async fn find(&self, email: &EmailAddress) -> Result<Option<User>, UserRepositoryError> {
        let state = self.lock().map_err(UserRepositoryError::query)?;
        Ok(state.users.get(email).cloned())
    }

    async fn update_profile(
        &self,
        email: &EmailAddress,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut state = self.lock().map_err(UserRepositoryError::query)?;
        Ok(state.users.get_mut(email).map(|user| {
            update.apply_to(user);
            user.clone()
        }))
    }

    async fn insert_booking(
        &self,
        email: &EmailAddress,
        booking: &Booking,
    ) -> Result<bool, UserRepositoryError> {
        let mut state = self.lock().map_err(UserRepositoryError::query)?;
        let user = state
            .users
            .get_mut(email)
            .ok_or_else(|| UserRepositoryError::query(format!("unknown user {email}")))?;
        if user
            .booked_visits
            .iter()
            .any(|existing| existing.residency_id == booking.residency_id)
        {
            return Ok(false);
        }
        user.booked_visits.push(*booking);
        Ok(true)
    }

    async fn delete_booking(
        &self,
        email: &EmailAddress,
        residency_id: &ResidencyId,
    ) -> Result<bool, UserRepositoryError> {
        let mut state = self.lock().map_err(UserRepositoryError::query)?;
        let Some(user) = state.users.get_mut(email) else {
            return Ok(false);
        };
        let before = user.booked_visits.len();
        user.booked_visits
            .retain(|booking| &booking.residency_id != residency_id);
        Ok(user.booked_visits.len() < before)
    }

    async fn list_bookings(
        &self,
        email: &EmailAddress,
    ) -> Result<Vec<Booking>, UserRepositoryError> {
        let state = self.lock().map_err(UserRepositoryError::query)?;
        Ok(state
            .users
            .get(email)
            .map(|user| user.booked_visits.clone())
            .unwrap_or_default())
    }

    async fn toggle_favourite(
        &self,
        email: &EmailAddress,
        residency_id: &ResidencyId,
    ) -> Result<FavouriteToggle, UserRepositoryError> {
        let mut state = self.lock().map_err(UserRepositoryError::query)?;
        let user = state
            .users
            .get_mut(email)
            .ok_or_else(|| UserRepositoryError::query(format!("unknown user {email}")))?;
        let added = if user.favourite_residency_ids.remove(residency_id) {
            false
        } else {
            user.favourite_residency_ids.insert(*residency_id);
            true
        };
        Ok(FavouriteToggle {
            added,
            favourites: user.favourite_residency_ids.clone(),
        })
    }

    async fn list_favourites(
        &self,
        email: &EmailAddress,
    ) -> Result<BTreeSet<ResidencyId>, UserRepositoryError> {
        let state = self.lock().map_err(UserRepositoryError::query)?;
        Ok(state
            .users
            .get(email)
            .map(|user| user.favourite_residency_ids.clone())
            .unwrap_or_default())
    }
}
