//! Role assignment for the variables of a classic file.
//!
//! Every variable gets exactly one [`VariableRole`] in a single pass, then
//! each role is checked for cardinality: one variable per coordinate axis
//! and one data variable.

use std::fmt;

use netcdf_parser::Variable;
use serde::{Deserialize, Serialize};

use crate::config::GridConfig;
use crate::error::{GridError, GridResult};

/// What a variable contributes to the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariableRole {
    Latitude,
    Longitude,
    Time,
    Data,
    /// Ignored; only assigned when the data variable is named explicitly.
    Auxiliary,
}

impl VariableRole {
    /// The coordinate role implied by a variable name, if any.
    pub fn coordinate(name: &str) -> Option<Self> {
        match name {
            "latitude" | "lat" => Some(VariableRole::Latitude),
            "longitude" | "lng" | "long" => Some(VariableRole::Longitude),
            "time" => Some(VariableRole::Time),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            VariableRole::Latitude => "latitude",
            VariableRole::Longitude => "longitude",
            VariableRole::Time => "time",
            VariableRole::Data => "data",
            VariableRole::Auxiliary => "auxiliary",
        }
    }
}

impl fmt::Display for VariableRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The variables selected for each role.
#[derive(Debug, Clone)]
pub struct Classification<'a> {
    pub latitude: &'a Variable,
    pub longitude: &'a Variable,
    pub time: &'a Variable,
    pub data: &'a Variable,
    /// Role of every variable, in file order.
    pub roles: Vec<(&'a str, VariableRole)>,
}

/// Assign a role to every variable and select one variable per role.
pub fn classify<'a>(variables: &'a [Variable], config: &GridConfig) -> GridResult<Classification<'a>> {
    let explicit = config.data_variable.as_deref();

    let roles: Vec<(&'a Variable, VariableRole)> = variables
        .iter()
        .map(|var| {
            let role = if explicit == Some(var.name.as_str()) {
                VariableRole::Data
            } else if let Some(role) = VariableRole::coordinate(&var.name) {
                role
            } else if explicit.is_some() {
                VariableRole::Auxiliary
            } else {
                VariableRole::Data
            };
            (var, role)
        })
        .collect();

    if let Some(name) = explicit {
        if !roles.iter().any(|(_, role)| *role == VariableRole::Data) {
            return Err(GridError::MissingDataVariable(name.to_string()));
        }
    }

    let latitude = single_coordinate(&roles, VariableRole::Latitude)?;
    let longitude = single_coordinate(&roles, VariableRole::Longitude)?;
    let time = single_coordinate(&roles, VariableRole::Time)?;

    let candidates = with_role(&roles, VariableRole::Data);
    let data = match candidates.as_slice() {
        [] => return Err(GridError::NoDataVariable),
        [data] => *data,
        many => {
            return Err(GridError::AmbiguousDataVariable(
                many.iter().map(|v| v.name.clone()).collect(),
            ))
        }
    };

    Ok(Classification {
        latitude,
        longitude,
        time,
        data,
        roles: roles
            .iter()
            .map(|(var, role)| (var.name.as_str(), *role))
            .collect(),
    })
}

fn with_role<'a>(roles: &[(&'a Variable, VariableRole)], wanted: VariableRole) -> Vec<&'a Variable> {
    roles
        .iter()
        .filter(|(_, role)| *role == wanted)
        .map(|(var, _)| *var)
        .collect()
}

fn single_coordinate<'a>(
    roles: &[(&'a Variable, VariableRole)],
    role: VariableRole,
) -> GridResult<&'a Variable> {
    match with_role(roles, role).as_slice() {
        [] => Err(GridError::MissingCoordinate(role)),
        [var] => Ok(*var),
        many => Err(GridError::DuplicateCoordinate {
            role,
            names: many.iter().map(|v| v.name.clone()).collect(),
        }),
    }
}
