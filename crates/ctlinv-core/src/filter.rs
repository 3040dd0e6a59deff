//! Regex admission filters for hosts and groups

use ctlinv_api::script::ROOT_GROUP;
use regex::Regex;

use crate::config::FilterOptions;
use crate::error::{InventoryError, Result};

/// Compiled host, host-group and group patterns
///
/// An unset pattern admits everything. Patterns are unanchored, so they
/// match anywhere in the name unless they carry their own `^`/`$`.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    hosts: Option<Regex>,
    hostgroups: Option<Regex>,
    groups: Option<Regex>,
}

impl FilterSet {
    /// Compile the three optional patterns
    ///
    /// Empty strings count as unset.
    ///
    /// # Errors
    /// Returns `InventoryError::Config` naming the option whose pattern
    /// does not compile.
    pub fn new(
        hosts: Option<&str>,
        hostgroups: Option<&str>,
        groups: Option<&str>,
    ) -> Result<Self> {
        Ok(Self {
            hosts: compile("hosts_filter", hosts)?,
            hostgroups: compile("hostgroups_filter", hostgroups)?,
            groups: compile("groups_filter", groups)?,
        })
    }

    /// Compile the patterns held by resolved options
    ///
    /// # Errors
    /// See [`FilterSet::new`].
    pub fn from_options(options: &FilterOptions) -> Result<Self> {
        Self::new(
            options.hosts.as_deref(),
            options.hostgroups.as_deref(),
            options.groups.as_deref(),
        )
    }

    /// Whether the group itself is kept. The root group always is.
    pub fn admit_group(&self, name: &str) -> bool {
        name == ROOT_GROUP || self.groups.as_ref().is_none_or(|re| re.is_match(name))
    }

    /// Whether this group's host list is scanned for candidate hosts
    pub fn admit_hosts_in_group(&self, group: &str) -> bool {
        self.hostgroups.as_ref().is_none_or(|re| re.is_match(group))
    }

    /// Whether a host name survives the host filter
    pub fn admit_host(&self, name: &str) -> bool {
        self.hosts.as_ref().is_none_or(|re| re.is_match(name))
    }

    /// True when no pattern is set
    pub fn is_empty(&self) -> bool {
        self.hosts.is_none() && self.hostgroups.is_none() && self.groups.is_none()
    }
}

fn compile(option: &str, pattern: Option<&str>) -> Result<Option<Regex>> {
    match pattern {
        None | Some("") => Ok(None),
        Some(pattern) => Regex::new(pattern)
            .map(Some)
            .map_err(|e| InventoryError::Config(format!("invalid {option} regex: {e}"))),
    }
}
