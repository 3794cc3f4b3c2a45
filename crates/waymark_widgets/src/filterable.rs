//! Filterable list model
//!
//! Holds a data set, a set of named filter groups, and a sorter, and keeps
//! two derived lists:
//!
//! - the filtered cache, updated every time a filter changes
//! - the rendered list, the cache sorted by the active sorter, updated only
//!   when changes are applied
//!
//! Splitting the two lets a view collect several filter changes and reveal
//! them in one go.
//!
//! # Example
//!
//! ```ignore
//! let mut list = Filterable::new(
//!     films,
//!     [
//!         ("tags", FilterGroup::selection(Vec::<String>::new(), ["drama", "mystery"])),
//!         ("isFree", FilterGroup::toggle(false)),
//!     ],
//!     vec![Sorter::Natural, "title:asc".parse()?],
//! );
//!
//! list.toggle("tags", Some("drama"))?;
//! list.apply();
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use indexmap::IndexMap;
use tracing::debug;

use crate::error::{Result, WidgetError};

/// A field read from a record
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FieldValue<'a> {
    Bool(bool),
    Number(f64),
    Text(&'a str),
    Tags(&'a [String]),
}

impl FieldValue<'_> {
    fn is_truthy(&self) -> bool {
        match self {
            FieldValue::Bool(b) => *b,
            FieldValue::Number(n) => *n != 0.0 && !n.is_nan(),
            FieldValue::Text(s) => !s.is_empty(),
            FieldValue::Tags(tags) => !tags.is_empty(),
        }
    }
}

/// Items that can be filtered and sorted by field name
pub trait Record {
    fn field(&self, key: &str) -> Option<FieldValue<'_>>;
}

/// Current value of a filter group
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilterState {
    /// On/off filter; when on, items need a truthy field
    Toggle(bool),
    /// Selected options; when any are selected, items need one of them
    Selection(Vec<String>),
}

/// Options a filter group offers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroupOptions<'a> {
    Toggle([bool; 2]),
    Selection(&'a [String]),
}

/// Custom predicate: `(state, field key, item) -> keep`
pub type Matcher<T> = Rc<dyn Fn(&FilterState, &str, &T) -> bool>;

/// A named filter
pub struct FilterGroup<T> {
    state: FilterState,
    options: Vec<String>,
    matcher: Option<Matcher<T>>,
}

impl<T: Record> FilterGroup<T> {
    pub fn toggle(on: bool) -> Self {
        Self {
            state: FilterState::Toggle(on),
            options: Vec::new(),
            matcher: None,
        }
    }

    pub fn selection<S, O>(selected: S, options: O) -> Self
    where
        S: IntoIterator,
        S::Item: Into<String>,
        O: IntoIterator,
        O::Item: Into<String>,
    {
        Self {
            state: FilterState::Selection(selected.into_iter().map(Into::into).collect()),
            options: options.into_iter().map(Into::into).collect(),
            matcher: None,
        }
    }

    /// Replace the default predicate
    pub fn with_matcher<F>(mut self, matcher: F) -> Self
    where
        F: Fn(&FilterState, &str, &T) -> bool + 'static,
    {
        self.matcher = Some(Rc::new(matcher));
        self
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn options(&self) -> GroupOptions<'_> {
        match self.state {
            FilterState::Toggle(_) => GroupOptions::Toggle([false, true]),
            FilterState::Selection(_) => GroupOptions::Selection(&self.options),
        }
    }

    fn matches(&self, key: &str, item: &T) -> bool {
        if let Some(matcher) = &self.matcher {
            return matcher(&self.state, key, item);
        }
        match &self.state {
            FilterState::Toggle(on) => !on || item.field(key).is_some_and(|v| v.is_truthy()),
            FilterState::Selection(selected) => {
                selected.is_empty()
                    || match item.field(key) {
                        Some(FieldValue::Tags(tags)) => tags.iter().any(|t| selected.contains(t)),
                        Some(FieldValue::Text(text)) => selected.iter().any(|s| s == text),
                        _ => false,
                    }
            }
        }
    }
}

impl<T> fmt::Debug for FilterGroup<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterGroup")
            .field("state", &self.state)
            .field("options", &self.options)
            .field("custom_matcher", &self.matcher.is_some())
            .finish()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// How the rendered list is ordered
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Sorter {
    /// Keep data order
    Natural,
    /// Order by a field; strings compare case-insensitively
    Field { key: String, order: SortOrder },
}

impl FromStr for Sorter {
    type Err = WidgetError;

    /// `natural`, `<field>`, `<field>:asc`, or `<field>:desc`
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s == "natural" {
            return Ok(Sorter::Natural);
        }
        let (key, order) = match s.split_once(':') {
            Some((key, "asc")) => (key, SortOrder::Ascending),
            Some((key, "desc")) => (key, SortOrder::Descending),
            Some(_) => return Err(WidgetError::InvalidSorter(s.to_string())),
            None => (s, SortOrder::Ascending),
        };
        if key.is_empty() {
            return Err(WidgetError::InvalidSorter(s.to_string()));
        }
        Ok(Sorter::Field {
            key: key.to_string(),
            order,
        })
    }
}

impl fmt::Display for Sorter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sorter::Natural => f.write_str("natural"),
            Sorter::Field {
                key,
                order: SortOrder::Ascending,
            } => write!(f, "{}:asc", key),
            Sorter::Field {
                key,
                order: SortOrder::Descending,
            } => write!(f, "{}:desc", key),
        }
    }
}

fn compare_fields(a: Option<FieldValue<'_>>, b: Option<FieldValue<'_>>) -> Ordering {
    use FieldValue::*;

    match (a, b) {
        (Some(Text(x)), Some(Text(y))) => x.to_lowercase().cmp(&y.to_lowercase()),
        (Some(Number(x)), Some(Number(y))) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(Bool(x)), Some(Bool(y))) => x.cmp(&y),
        (Some(Tags(x)), Some(Tags(y))) => x.cmp(y),
        // Missing fields sort last
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

/// Filtered and sorted view over a data set
pub struct Filterable<T> {
    data: Vec<T>,
    groups: IndexMap<String, FilterGroup<T>>,
    sorters: Vec<Sorter>,
    sorter: Sorter,
    filtered: Vec<T>,
    rendered: Vec<T>,
    pending: bool,
}

impl<T: Record + Clone> Filterable<T> {
    /// Build the model; the first sorter is active (natural if none given)
    pub fn new<K>(
        data: Vec<T>,
        groups: impl IntoIterator<Item = (K, FilterGroup<T>)>,
        sorters: Vec<Sorter>,
    ) -> Self
    where
        K: Into<String>,
    {
        let sorters = if sorters.is_empty() {
            vec![Sorter::Natural]
        } else {
            sorters
        };
        let mut list = Self {
            data,
            groups: groups.into_iter().map(|(k, g)| (k.into(), g)).collect(),
            sorter: sorters[0].clone(),
            sorters,
            filtered: Vec::new(),
            rendered: Vec::new(),
            pending: false,
        };
        list.filtered = list.filter();
        list.rendered = list.sort();
        list
    }

    /// Items currently shown
    pub fn rendered(&self) -> &[T] {
        &self.rendered
    }

    /// Items passing the current filters, not yet applied
    pub fn filtered(&self) -> &[T] {
        &self.filtered
    }

    pub fn sorter(&self) -> &Sorter {
        &self.sorter
    }

    pub fn sorters(&self) -> &[Sorter] {
        &self.sorters
    }

    pub fn group(&self, name: &str) -> Option<&FilterGroup<T>> {
        self.groups.get(name)
    }

    pub fn groups(&self) -> impl Iterator<Item = (&str, &FilterGroup<T>)> {
        self.groups.iter().map(|(k, g)| (k.as_str(), g))
    }

    /// Whether filter changes are waiting for [`apply`](Self::apply)
    pub fn has_pending_changes(&self) -> bool {
        self.pending
    }

    /// Flip a toggle group, or add/remove `option` in a selection group
    pub fn toggle(&mut self, group: &str, option: Option<&str>) -> Result<()> {
        let entry = self
            .groups
            .get_mut(group)
            .ok_or_else(|| WidgetError::UnknownFilterGroup(group.to_string()))?;

        match &mut entry.state {
            FilterState::Toggle(on) => *on = !*on,
            FilterState::Selection(selected) => {
                let option = option.ok_or_else(|| WidgetError::MissingOption(group.to_string()))?;
                match selected.iter().position(|s| s == option) {
                    Some(index) => {
                        selected.remove(index);
                    }
                    None => selected.push(option.to_string()),
                }
            }
        }

        debug!(group, ?option, "filter changed");
        self.filtered = self.filter();
        self.pending = true;
        Ok(())
    }

    /// Toggle and apply in one step
    pub fn toggle_and_apply(&mut self, group: &str, option: Option<&str>) -> Result<()> {
        self.toggle(group, option)?;
        self.apply();
        Ok(())
    }

    /// Change the sorter and apply immediately
    pub fn set_sorter(&mut self, sorter: Sorter) {
        self.sorter = sorter;
        self.apply();
    }

    /// Sort the filtered cache into the rendered list
    pub fn apply(&mut self) {
        self.rendered = self.sort();
        self.pending = false;
    }

    /// Swap in a new data set, keeping filters and sorter
    pub fn set_data(&mut self, data: Vec<T>) {
        self.data = data;
        self.filtered = self.filter();
        self.apply();
    }

    fn filter(&self) -> Vec<T> {
        self.data
            .iter()
            .filter(|item| self.groups.iter().all(|(key, g)| g.matches(key, item)))
            .cloned()
            .collect()
    }

    fn sort(&self) -> Vec<T> {
        let mut sorted = self.filtered.clone();
        if let Sorter::Field { key, order } = &self.sorter {
            // sort_by is stable, equal items keep data order
            sorted.sort_by(|a, b| {
                let ord = compare_fields(a.field(key), b.field(key));
                match order {
                    SortOrder::Ascending => ord,
                    SortOrder::Descending => ord.reverse(),
                }
            });
        }
        sorted
    }
}
