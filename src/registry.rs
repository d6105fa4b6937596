//! Model verification registry.
//!
//! Tracks, per entity type, the schema versions it has gone through and the
//! verifications (initial, review, audit) recorded against each version.
//! The registry is an explicit value populated at start-up; entity types
//! themselves carry only their name and field list via [`Entity`].

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::{self, Write};

pub const DEFAULT_VERSION: &str = "1.0.0";
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A named field and its type, as shown in version history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldInfo {
    pub name: String,
    pub kind: String,
}

impl FieldInfo {
    pub fn new(name: &str, kind: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: kind.to_string(),
        }
    }
}

/// A persisted entity type that can be registered.
pub trait Entity {
    const NAME: &'static str;

    fn fields() -> Vec<FieldInfo>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VerificationType {
    #[default]
    Initial,
    Review,
    Audit,
}

impl fmt::Display for VerificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VerificationType::Initial => "initial",
            VerificationType::Review => "review",
            VerificationType::Audit => "audit",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verification {
    pub verified_by: Option<String>,
    pub verification_type: VerificationType,
    pub date: NaiveDateTime,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionInfo {
    pub version: String,
    pub initial_description: String,
    pub created_date: NaiveDateTime,
    pub fields: Vec<FieldInfo>,
}

/// What to record for one verification.
#[derive(Debug, Clone)]
pub struct VerificationRequest {
    pub description: String,
    pub version: String,
    pub verified_by: Option<String>,
    pub verification_type: VerificationType,
}

impl VerificationRequest {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            version: DEFAULT_VERSION.to_string(),
            verified_by: None,
            verification_type: VerificationType::Initial,
        }
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn verified_by(mut self, who: impl Into<String>) -> Self {
        self.verified_by = Some(who.into());
        self
    }

    pub fn kind(mut self, kind: VerificationType) -> Self {
        self.verification_type = kind;
        self
    }
}

#[derive(Debug, Clone, Default)]
struct ModelRecord {
    history: Vec<VersionInfo>,
    verifications: BTreeMap<String, Vec<Verification>>,
}

#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: BTreeMap<String, ModelRecord>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the store's entity types at their initial version.
    pub fn builtin() -> Self {
        use crate::store::{CountryStat, TimeFrame};

        let mut registry = Self::new();
        registry.verify::<TimeFrame>(VerificationRequest::new(
            "Year/month bucket shared by country stats",
        ));
        registry.verify::<CountryStat>(VerificationRequest::new(
            "Monthly arrivals per country, unique per country id and time frame",
        ));
        registry
    }

    /// Record a verification for `E` stamped with the current local time.
    pub fn verify<E: Entity>(&mut self, request: VerificationRequest) {
        self.verify_at(E::NAME, E::fields(), request, Local::now().naive_local());
    }

    /// Record a verification against a named model.
    ///
    /// The verification is always appended under its version. A history
    /// entry is appended only when the version differs from the latest one.
    pub fn verify_at(
        &mut self,
        model: &str,
        fields: Vec<FieldInfo>,
        request: VerificationRequest,
        now: NaiveDateTime,
    ) {
        let record = self.models.entry(model.to_string()).or_default();

        record
            .verifications
            .entry(request.version.clone())
            .or_default()
            .push(Verification {
                verified_by: request.verified_by,
                verification_type: request.verification_type,
                date: now,
                description: request.description.clone(),
            });

        let is_new_version = record
            .history
            .last()
            .map_or(true, |latest| latest.version != request.version);
        if is_new_version {
            record.history.push(VersionInfo {
                version: request.version,
                initial_description: request.description,
                created_date: now,
                fields,
            });
        }
    }

    pub fn model_names(&self) -> Vec<&str> {
        self.models.keys().map(String::as_str).collect()
    }

    pub fn version_history(&self, model: &str) -> &[VersionInfo] {
        self.models
            .get(model)
            .map(|r| r.history.as_slice())
            .unwrap_or_default()
    }

    /// Verifications for one version, or for every version when `None`.
    pub fn verifications(&self, model: &str, version: Option<&str>) -> Vec<&Verification> {
        let Some(record) = self.models.get(model) else {
            return Vec::new();
        };
        match version {
            Some(v) => record
                .verifications
                .get(v)
                .map(|list| list.iter().collect())
                .unwrap_or_default(),
            None => record.verifications.values().flatten().collect(),
        }
    }

    /// Human-readable history with the verifications of each version.
    pub fn render_history(&self, model: &str) -> Option<String> {
        let record = self.models.get(model)?;
        let mut out = String::new();
        // Writing into a String never fails.
        write_history(&mut out, record).ok()?;
        Some(out)
    }
}

fn write_history(out: &mut impl Write, record: &ModelRecord) -> fmt::Result {
    for version in &record.history {
        writeln!(out, "\nVersion: {}", version.version)?;
        writeln!(out, "Created: {}", version.created_date.format(DATE_FORMAT))?;
        writeln!(out, "Initial Description: {}", version.initial_description)?;
        writeln!(out, "\nFields:")?;
        for field in &version.fields {
            writeln!(out, "  - {}: {}", field.name, field.kind)?;
        }

        writeln!(out, "\nVerifications:")?;
        let verifications = record
            .verifications
            .get(&version.version)
            .map(Vec::as_slice)
            .unwrap_or_default();
        for (idx, v) in verifications.iter().enumerate() {
            writeln!(out, "  {}. Date: {}", idx + 1, v.date.format(DATE_FORMAT))?;
            writeln!(out, "     Type: {}", v.verification_type)?;
            writeln!(
                out,
                "     By: {}",
                v.verified_by.as_deref().unwrap_or("unknown")
            )?;
            writeln!(out, "     Notes: {}", v.description)?;
        }
        writeln!(out, "{}", "-".repeat(50))?;
    }
    Ok(())
}
