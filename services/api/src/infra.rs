use chrono::{TimeZone, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use propmatch::preferences::{
    AuthError, AuthenticatedUser, IdentityProvider, InvestorId, InvestorPreference, MailError,
    MailMessage, MailSender, PreferenceRepository, UpsertOutcome, UserProfile, UserType,
};
use propmatch::properties::{
    Availability, Property, PropertyRepository, PropertyStatus, PropertyType, RepositoryError,
};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryPreferenceRepository {
    records: Arc<Mutex<HashMap<InvestorId, InvestorPreference>>>,
}

impl PreferenceRepository for InMemoryPreferenceRepository {
    fn fetch(&self, investor: &InvestorId) -> Result<Option<InvestorPreference>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(investor).cloned())
    }

    fn upsert(&self, record: InvestorPreference) -> Result<UpsertOutcome, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let created = !guard.contains_key(&record.investor_id);
        guard.insert(record.investor_id.clone(), record.clone());
        Ok(UpsertOutcome { record, created })
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryPropertyRepository {
    listings: Arc<Mutex<Vec<Property>>>,
}

impl PropertyRepository for InMemoryPropertyRepository {
    fn insert(&self, property: Property) -> Result<Property, RepositoryError> {
        let mut guard = self.listings.lock().expect("listing mutex poisoned");
        if guard.iter().any(|existing| existing.id == property.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(property.clone());
        Ok(property)
    }

    fn active(&self) -> Result<Vec<Property>, RepositoryError> {
        let guard = self.listings.lock().expect("listing mutex poisoned");
        Ok(guard
            .iter()
            .filter(|listing| listing.status == PropertyStatus::Active)
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub(crate) struct RecordingMailSender {
    sent: Arc<Mutex<Vec<MailMessage>>>,
}

impl MailSender for RecordingMailSender {
    fn send(&self, message: MailMessage) -> Result<(), MailError> {
        let mut guard = self.sent.lock().expect("mail mutex poisoned");
        guard.push(message);
        Ok(())
    }
}

impl RecordingMailSender {
    #[cfg(test)]
    pub(crate) fn sent(&self) -> Vec<MailMessage> {
        self.sent.lock().expect("mail mutex poisoned").clone()
    }
}

/// Token-table identity provider standing in for the external auth service.
#[derive(Default, Clone)]
pub(crate) struct StaticIdentityProvider {
    tokens: Arc<Mutex<HashMap<String, AuthenticatedUser>>>,
    profiles: Arc<Mutex<HashMap<String, UserProfile>>>,
}

impl StaticIdentityProvider {
    pub(crate) fn register(&self, token: &str, profile: UserProfile) {
        let user = AuthenticatedUser {
            user_id: profile.user_id.clone(),
            email: profile.email.clone(),
        };
        self.tokens
            .lock()
            .expect("token mutex poisoned")
            .insert(token.to_string(), user);
        self.profiles
            .lock()
            .expect("profile mutex poisoned")
            .insert(profile.user_id.clone(), profile);
    }
}

impl IdentityProvider for StaticIdentityProvider {
    fn authenticate(&self, bearer_token: &str) -> Result<AuthenticatedUser, AuthError> {
        self.tokens
            .lock()
            .expect("token mutex poisoned")
            .get(bearer_token)
            .cloned()
            .ok_or(AuthError::Unauthenticated)
    }

    fn profile(&self, user_id: &str) -> Result<UserProfile, AuthError> {
        self.profiles
            .lock()
            .expect("profile mutex poisoned")
            .get(user_id)
            .cloned()
            .ok_or(AuthError::UnknownUser)
    }
}

/// Development fixtures: a demo investor token and a handful of active
/// listings so the matching endpoints answer out of the box.
pub(crate) fn seed_demo_data(
    listings: &InMemoryPropertyRepository,
    identity: &StaticIdentityProvider,
) {
    identity.register(
        "demo-investor-token",
        UserProfile {
            user_id: "demo-investor".to_string(),
            user_type: UserType::Investor,
            full_name: "Demo Investor".to_string(),
            email: "investor@propmatch.local".to_string(),
            phone: None,
        },
    );

    let seeds = [
        (
            "prop-manchester-01",
            "Manchester",
            "12 Whitworth Street",
            "M1 3BB",
            None,
            165_000,
            2,
            PropertyType::Flat,
        ),
        (
            "prop-manchester-02",
            "Manchester",
            "4 Chapel Wharf",
            "M3 5JF",
            Some("Salford"),
            210_000,
            3,
            PropertyType::Apartment,
        ),
        (
            "prop-london-01",
            "London",
            "81 Borough High Street",
            "SE1 1NH",
            None,
            295_000,
            1,
            PropertyType::Studio,
        ),
        (
            "prop-leeds-01",
            "Leeds",
            "7 Wellington Place",
            "LS1 4AP",
            None,
            120_000,
            2,
            PropertyType::Terraced,
        ),
    ];

    for (index, (id, city, address, postcode, authority, rent, bedrooms, kind)) in
        seeds.into_iter().enumerate()
    {
        let inserted = listings.insert(Property {
            id: id.to_string(),
            city: city.to_string(),
            address: address.to_string(),
            postcode: postcode.to_string(),
            local_authority: authority.map(str::to_string),
            monthly_rent_pence: rent,
            bedrooms,
            property_type: kind,
            status: PropertyStatus::Active,
            availability: Availability::Vacant,
            created_at: Utc
                .with_ymd_and_hms(2026, 1, 1, 12, 0, 0)
                .single()
                .expect("valid seed timestamp")
                + chrono::Duration::days(index as i64),
        });
        inserted.expect("demo listing ids are unique");
    }
}
