use serde::Deserialize;

use crate::error::AppError;

/// Raw query string of a lookup request.
#[derive(Debug, Default, Deserialize)]
pub struct LocationParams {
    pub location_codes: Option<String>,
    pub fields: Option<String>,
}

/// Which optional parts of a record the caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fields {
    pub url: bool,
    pub location: bool,
    pub hours: bool,
}

impl Default for Fields {
    /// No `fields` parameter means url only.
    fn default() -> Self {
        Self {
            url: true,
            location: false,
            hours: false,
        }
    }
}

impl Fields {
    pub fn parse(raw: Option<&str>) -> Self {
        let requested: Vec<&str> = raw
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|field| !field.is_empty())
            .collect();

        if requested.is_empty() {
            return Self::default();
        }

        let mut fields = Self {
            url: false,
            location: false,
            hours: false,
        };
        for field in requested {
            match field {
                "url" => fields.url = true,
                "location" => fields.location = true,
                "hours" => fields.hours = true,
                other => tracing::debug!("Ignoring unknown field {:?}", other),
            }
        }
        fields
    }

    /// Address or hours need the facilities API.
    pub fn needs_branch_data(&self) -> bool {
        self.location || self.hours
    }
}

/// A validated lookup: distinct codes in request order plus the field set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationQuery {
    pub codes: Vec<String>,
    pub fields: Fields,
}

impl LocationQuery {
    pub fn new(codes: Vec<String>, fields: Fields) -> Self {
        Self { codes, fields }
    }

    pub fn from_params(params: &LocationParams) -> Result<Self, AppError> {
        let mut codes: Vec<String> = Vec::new();
        for code in params
            .location_codes
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|code| !code.is_empty())
        {
            if !codes.iter().any(|seen| seen == code) {
                codes.push(code.to_string());
            }
        }

        if codes.is_empty() {
            return Err(AppError::missing_location_codes());
        }

        Ok(Self {
            codes,
            fields: Fields::parse(params.fields.as_deref()),
        })
    }
}
