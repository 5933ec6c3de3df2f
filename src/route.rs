//! Hash-route parsing for dashboard permalinks
//!
//! A permalink has the form `#/branch/platform/test/startdate/enddate`.
//! Every segment is optional and trailing segments may be left off; one
//! route table maps each position to the field it fills, so a path of any
//! depth up to five segments resolves through the same code.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("route has {found} segments, at most {max} are allowed")]
    TooManySegments { found: usize, max: usize },

    #[error("route must start with '/' or '#/': {0}")]
    MissingLeadingSlash(String),
}

/// Route field filled by a path position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteField {
    Branch,
    Platform,
    Test,
    StartDate,
    EndDate,
}

/// Path position → field, in order
pub const ROUTE_TABLE: [RouteField; 5] = [
    RouteField::Branch,
    RouteField::Platform,
    RouteField::Test,
    RouteField::StartDate,
    RouteField::EndDate,
];

/// Values selected by a permalink
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteParams {
    pub branch: Option<String>,
    pub platform: Option<String>,
    pub test: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl RouteParams {
    /// Parse `#/a/b/c/d/e`, `/a/b` or `#/`
    ///
    /// Empty segments are treated as absent.
    pub fn parse(route: &str) -> Result<Self, RouteError> {
        let path = route.strip_prefix('#').unwrap_or(route);
        let path = path
            .strip_prefix('/')
            .ok_or_else(|| RouteError::MissingLeadingSlash(route.to_string()))?;

        let segments: Vec<&str> = if path.is_empty() {
            Vec::new()
        } else {
            path.split('/').collect()
        };

        if segments.len() > ROUTE_TABLE.len() {
            return Err(RouteError::TooManySegments {
                found: segments.len(),
                max: ROUTE_TABLE.len(),
            });
        }

        let mut params = RouteParams::default();
        for (field, segment) in ROUTE_TABLE.iter().zip(segments) {
            if !segment.is_empty() {
                *params.slot(*field) = Some(segment.to_string());
            }
        }
        Ok(params)
    }

    fn slot(&mut self, field: RouteField) -> &mut Option<String> {
        match field {
            RouteField::Branch => &mut self.branch,
            RouteField::Platform => &mut self.platform,
            RouteField::Test => &mut self.test,
            RouteField::StartDate => &mut self.start_date,
            RouteField::EndDate => &mut self.end_date,
        }
    }

    pub fn get(&self, field: RouteField) -> Option<&str> {
        match field {
            RouteField::Branch => self.branch.as_deref(),
            RouteField::Platform => self.platform.as_deref(),
            RouteField::Test => self.test.as_deref(),
            RouteField::StartDate => self.start_date.as_deref(),
            RouteField::EndDate => self.end_date.as_deref(),
        }
    }

    /// Permalink for these params, always with all five positions
    pub fn to_hash(&self) -> String {
        let segments: Vec<&str> = ROUTE_TABLE
            .iter()
            .map(|field| self.get(*field).unwrap_or(""))
            .collect();
        format!("#/{}", segments.join("/"))
    }
}
