use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Log severity levels, RFC 5424 order. Wire values are 0 (emergency)
/// through 7 (debug).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Emergency,
    Alert,
    Critical,
    Error,
    Warning,
    Notice,
    Info,
    Debug,
}

impl Severity {
    pub const ALL: [Severity; 8] = [
        Severity::Emergency,
        Severity::Alert,
        Severity::Critical,
        Severity::Error,
        Severity::Warning,
        Severity::Notice,
        Severity::Info,
        Severity::Debug,
    ];

    pub fn wire(&self) -> u8 {
        *self as u8
    }

    pub fn from_wire(value: u8) -> Option<Severity> {
        Severity::ALL.get(value as usize).copied()
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Emergency => "emergency",
            Severity::Alert => "alert",
            Severity::Critical => "critical",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Notice => "notice",
            Severity::Info => "info",
            Severity::Debug => "debug",
        }
    }

    pub fn parse(name: &str) -> Option<Severity> {
        Severity::ALL.iter().copied().find(|s| s.label() == name)
    }
}

/// Fields the result ordering can key on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderField {
    Time,
    Severity,
    Type,
    User,
    Hostname,
}

impl OrderField {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderField::Time => "time",
            OrderField::Severity => "severity",
            OrderField::Type => "type",
            OrderField::User => "user",
            OrderField::Hostname => "hostname",
        }
    }

    pub fn parse(name: &str) -> Option<OrderField> {
        match name {
            "time" => Some(OrderField::Time),
            "severity" => Some(OrderField::Severity),
            "type" => Some(OrderField::Type),
            "user" => Some(OrderField::User),
            "hostname" => Some(OrderField::Hostname),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// One (field, direction) entry in the result ordering sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: OrderField,
    pub direction: SortDirection,
}

/// "Any" vs. a non-empty set of specific severity levels. Exactly one
/// of the two holds at all times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeveritySelection {
    Any,
    Levels(BTreeSet<Severity>),
}

impl SeveritySelection {
    pub fn is_any(&self) -> bool {
        matches!(self, SeveritySelection::Any)
    }

    /// Check or uncheck one specific level. Unchecking the last level
    /// restores "any". Returns true if the selection changed.
    pub fn toggle(&mut self, level: Severity, checked: bool) -> bool {
        match self {
            SeveritySelection::Any => {
                if checked {
                    *self = SeveritySelection::Levels(BTreeSet::from([level]));
                    true
                } else {
                    false
                }
            }
            SeveritySelection::Levels(levels) => {
                let changed = if checked {
                    levels.insert(level)
                } else {
                    levels.remove(&level)
                };
                if levels.is_empty() {
                    *self = SeveritySelection::Any;
                }
                changed
            }
        }
    }

    /// Explicitly check the "any" box, discarding specific levels.
    pub fn set_any(&mut self) -> bool {
        if self.is_any() {
            false
        } else {
            *self = SeveritySelection::Any;
            true
        }
    }
}

/// Same any/some exclusivity as severity, over free-form message-type tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSelection {
    Any,
    Tags(BTreeSet<String>),
}

impl TypeSelection {
    pub fn is_any(&self) -> bool {
        matches!(self, TypeSelection::Any)
    }

    pub fn toggle(&mut self, tag: &str, checked: bool) -> bool {
        match self {
            TypeSelection::Any => {
                if checked {
                    *self = TypeSelection::Tags(BTreeSet::from([tag.to_string()]));
                    true
                } else {
                    false
                }
            }
            TypeSelection::Tags(tags) => {
                let changed = if checked {
                    tags.insert(tag.to_string())
                } else {
                    tags.remove(tag)
                };
                if tags.is_empty() {
                    *self = TypeSelection::Any;
                }
                changed
            }
        }
    }

    pub fn set_any(&mut self) -> bool {
        if self.is_any() {
            false
        } else {
            *self = TypeSelection::Any;
            true
        }
    }
}

/// At most one of role or uid identifies "who"; selecting one clears
/// the other.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Who {
    #[default]
    Anyone,
    Role(String),
    Uid(u64),
}

/// The structured representation of the user's current search
/// conditions and ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct Criteria {
    /// Relative duration in seconds, mutually exclusive with the
    /// absolute time window.
    pub time_range: Option<u64>,
    /// Absolute window as Unix timestamps; `time_from <= time_to`
    /// whenever both are set.
    pub time_from: Option<i64>,
    pub time_to: Option<i64>,
    pub severity: SeveritySelection,
    pub types: TypeSelection,
    pub who: Who,
    pub hostname: Option<String>,
    pub location: Option<String>,
    pub referer: Option<String>,
    /// Ordered (field, direction) slots; a field appears at most once.
    pub order_by: Vec<Option<OrderBy>>,
}

impl Default for Criteria {
    fn default() -> Self {
        Self {
            time_range: None,
            time_from: None,
            time_to: None,
            severity: SeveritySelection::Any,
            types: TypeSelection::Any,
            who: Who::Anyone,
            hostname: None,
            location: None,
            referer: None,
            order_by: vec![Some(OrderBy {
                field: OrderField::Time,
                direction: SortDirection::Asc,
            })],
        }
    }
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore every condition and the ordering to defaults.
    pub fn reset(&mut self) -> bool {
        let fresh = Criteria::default();
        if *self == fresh {
            false
        } else {
            *self = fresh;
            true
        }
    }

    /// Set the relative duration; clears the absolute window.
    pub fn set_time_range(&mut self, seconds: Option<u64>) -> bool {
        let mut changed = self.time_range != seconds;
        self.time_range = seconds;
        if seconds.is_some() {
            changed |= self.time_from.take().is_some();
            changed |= self.time_to.take().is_some();
        }
        changed
    }

    /// Set the absolute window start; clears the relative duration.
    pub fn set_time_from(&mut self, ts: Option<i64>) -> bool {
        let mut changed = self.time_from != ts;
        self.time_from = ts;
        if ts.is_some() {
            changed |= self.time_range.take().is_some();
        }
        changed
    }

    /// Set the absolute window end; clears the relative duration.
    pub fn set_time_to(&mut self, ts: Option<i64>) -> bool {
        let mut changed = self.time_to != ts;
        self.time_to = ts;
        if ts.is_some() {
            changed |= self.time_range.take().is_some();
        }
        changed
    }

    pub fn set_role(&mut self, role: Option<String>) -> bool {
        let next = match role {
            Some(r) => Who::Role(r),
            None => Who::Anyone,
        };
        if self.who == next {
            false
        } else {
            self.who = next;
            true
        }
    }

    pub fn set_uid(&mut self, uid: Option<u64>) -> bool {
        let next = match uid {
            Some(u) => Who::Uid(u),
            None => Who::Anyone,
        };
        if self.who == next {
            false
        } else {
            self.who = next;
            true
        }
    }

    pub fn set_hostname(&mut self, value: Option<String>) -> bool {
        if self.hostname == value {
            false
        } else {
            self.hostname = value;
            true
        }
    }

    pub fn set_location(&mut self, value: Option<String>) -> bool {
        if self.location == value {
            false
        } else {
            self.location = value;
            true
        }
    }

    pub fn set_referer(&mut self, value: Option<String>) -> bool {
        if self.referer == value {
            false
        } else {
            self.referer = value;
            true
        }
    }

    /// Assign one order-by slot. Entering a field already present in
    /// another slot clears that other slot, so each field appears at
    /// most once across the sequence.
    pub fn set_order_slot(&mut self, slot: usize, entry: Option<OrderBy>) -> bool {
        if self.order_by.len() <= slot {
            self.order_by.resize(slot + 1, None);
        }
        let mut changed = false;
        if let Some(new) = &entry {
            for (i, existing) in self.order_by.iter_mut().enumerate() {
                if i != slot && existing.map(|e| e.field) == Some(new.field) {
                    *existing = None;
                    changed = true;
                }
            }
        }
        if self.order_by[slot] != entry {
            self.order_by[slot] = entry;
            changed = true;
        }
        changed
    }

    /// The effective ordering sequence, empty slots skipped.
    pub fn ordering(&self) -> Vec<OrderBy> {
        self.order_by.iter().flatten().copied().collect()
    }

    /// Whether any condition at all is set. The ordering does not
    /// count; it never narrows the result set.
    pub fn has_conditions(&self) -> bool {
        self.time_range.is_some()
            || self.time_from.is_some()
            || self.time_to.is_some()
            || !self.severity.is_any()
            || !self.types.is_any()
            || self.who != Who::Anyone
            || self.hostname.is_some()
            || self.location.is_some()
            || self.referer.is_some()
    }

    /// Conditions as the wire payload the four sync operations carry.
    pub fn conditions_payload(&self) -> Value {
        let mut conditions = serde_json::Map::new();
        if let Some(range) = self.time_range {
            conditions.insert("time_range".into(), json!(range));
        }
        if let Some(from) = self.time_from {
            conditions.insert("time_from".into(), json!(from));
        }
        if let Some(to) = self.time_to {
            conditions.insert("time_to".into(), json!(to));
        }
        if let SeveritySelection::Levels(levels) = &self.severity {
            let wire: Vec<u8> = levels.iter().map(|s| s.wire()).collect();
            conditions.insert("severity".into(), json!(wire));
        }
        if let TypeSelection::Tags(tags) = &self.types {
            conditions.insert("type".into(), json!(tags));
        }
        match &self.who {
            Who::Anyone => {}
            Who::Role(role) => {
                conditions.insert("role".into(), json!(role));
            }
            Who::Uid(uid) => {
                conditions.insert("uid".into(), json!(uid));
            }
        }
        if let Some(hostname) = &self.hostname {
            conditions.insert("hostname".into(), json!(hostname));
        }
        if let Some(location) = &self.location {
            conditions.insert("location".into(), json!(location));
        }
        if let Some(referer) = &self.referer {
            conditions.insert("referer".into(), json!(referer));
        }
        Value::Object(conditions)
    }

    /// Ordering as the wire payload: an array of [field, direction]
    /// pairs in sequence order.
    pub fn order_by_payload(&self) -> Value {
        let pairs: Vec<Value> = self
            .ordering()
            .iter()
            .map(|o| json!([o.field.as_str(), o.direction.as_str()]))
            .collect();
        Value::Array(pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_any_plus_time_ascending() {
        let criteria = Criteria::default();
        assert!(criteria.severity.is_any());
        assert!(criteria.types.is_any());
        assert_eq!(criteria.who, Who::Anyone);
        assert!(!criteria.has_conditions());
        assert_eq!(
            criteria.ordering(),
            vec![OrderBy {
                field: OrderField::Time,
                direction: SortDirection::Asc,
            }]
        );
    }

    #[test]
    fn time_range_and_window_are_mutually_exclusive() {
        let mut criteria = Criteria::default();
        assert!(criteria.set_time_from(Some(1000)));
        assert!(criteria.set_time_to(Some(2000)));
        assert!(criteria.set_time_range(Some(3600)));
        assert!(criteria.time_from.is_none());
        assert!(criteria.time_to.is_none());

        assert!(criteria.set_time_from(Some(1000)));
        assert!(criteria.time_range.is_none());
    }

    #[test]
    fn severity_toggle_clears_and_restores_any() {
        let mut sel = SeveritySelection::Any;
        assert!(sel.toggle(Severity::Error, true));
        assert!(!sel.is_any());
        assert!(sel.toggle(Severity::Warning, true));
        assert!(sel.toggle(Severity::Error, false));
        assert!(!sel.is_any());
        assert!(sel.toggle(Severity::Warning, false));
        assert!(sel.is_any());
    }

    #[test]
    fn unchecking_under_any_is_a_noop() {
        let mut sel = SeveritySelection::Any;
        assert!(!sel.toggle(Severity::Debug, false));
        assert!(sel.is_any());
    }

    #[test]
    fn role_and_uid_are_exclusive() {
        let mut criteria = Criteria::default();
        assert!(criteria.set_uid(Some(42)));
        assert_eq!(criteria.who, Who::Uid(42));
        assert!(criteria.set_role(Some("editor".to_string())));
        assert_eq!(criteria.who, Who::Role("editor".to_string()));
    }

    #[test]
    fn order_slot_clears_duplicate_field() {
        let mut criteria = Criteria::default();
        // Slot 0 defaults to time ASC; entering time in slot 1 clears slot 0.
        assert!(criteria.set_order_slot(
            1,
            Some(OrderBy {
                field: OrderField::Time,
                direction: SortDirection::Desc,
            })
        ));
        assert_eq!(criteria.order_by[0], None);
        assert_eq!(
            criteria.ordering(),
            vec![OrderBy {
                field: OrderField::Time,
                direction: SortDirection::Desc,
            }]
        );
    }

    #[test]
    fn reset_restores_default_state() {
        let mut criteria = Criteria::default();
        criteria.set_time_range(Some(900));
        criteria.severity.toggle(Severity::Error, true);
        criteria.set_hostname(Some("web01".to_string()));
        assert!(criteria.reset());
        assert_eq!(criteria, Criteria::default());
        assert!(!criteria.reset());
    }

    #[test]
    fn conditions_payload_omits_unset_keys() {
        let mut criteria = Criteria::default();
        criteria.set_uid(Some(7));
        criteria.severity.toggle(Severity::Error, true);
        criteria.severity.toggle(Severity::Critical, true);

        let payload = criteria.conditions_payload();
        assert_eq!(payload["uid"], 7);
        assert_eq!(payload["severity"], json!([2, 3]));
        assert!(payload.get("time_range").is_none());
        assert!(payload.get("type").is_none());
    }

    #[test]
    fn order_by_payload_is_pairs_in_sequence_order() {
        let mut criteria = Criteria::default();
        criteria.set_order_slot(
            1,
            Some(OrderBy {
                field: OrderField::Severity,
                direction: SortDirection::Desc,
            }),
        );
        assert_eq!(
            criteria.order_by_payload(),
            json!([["time", "ASC"], ["severity", "DESC"]])
        );
    }

    #[test]
    fn severity_wire_round_trip() {
        for level in Severity::ALL {
            assert_eq!(Severity::from_wire(level.wire()), Some(level));
        }
        assert_eq!(Severity::from_wire(8), None);
    }
}
